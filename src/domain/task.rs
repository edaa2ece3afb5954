//! Social tasks and the tracker that holds their completion state
//!
//! A participant earns airdrop eligibility by completing a fixed set of
//! social tasks (follow an account, join a channel, ...). Opening a task only
//! records the visit; completion comes from a [`TaskVerificationResult`]
//! produced by an external verifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AirdropError;

/// Unique identifier of a task within a task set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Static description of a task as configured in `[[airdrop.tasks]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: TaskId,
    pub title: String,
    /// External link the participant is sent to
    pub link: String,
    /// Tokens credited when the task is completed
    pub reward: u64,
}

/// A task together with its completion state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub link: String,
    pub reward: u64,
    pub completed: bool,
}

impl From<TaskDefinition> for Task {
    fn from(def: TaskDefinition) -> Self {
        Self {
            id: def.id,
            title: def.title,
            link: def.link,
            reward: def.reward,
            completed: false,
        }
    }
}

/// Outcome reported by a task verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskVerificationResult {
    pub task_id: TaskId,
    pub verified: bool,
    pub checked_at: DateTime<Utc>,
}

impl TaskVerificationResult {
    pub fn approved(task_id: TaskId) -> Self {
        Self {
            task_id,
            verified: true,
            checked_at: Utc::now(),
        }
    }

    pub fn rejected(task_id: TaskId) -> Self {
        Self {
            task_id,
            verified: false,
            checked_at: Utc::now(),
        }
    }
}

/// What happened when a participant opened a task link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOpened {
    /// Visit recorded; completion waits for the verifier
    PendingVerification { link: String },
    /// Task was already completed, nothing to verify
    AlreadyCompleted { link: String },
}

impl TaskOpened {
    pub fn link(&self) -> &str {
        match self {
            TaskOpened::PendingVerification { link } | TaskOpened::AlreadyCompleted { link } => link,
        }
    }

    pub fn needs_verification(&self) -> bool {
        matches!(self, TaskOpened::PendingVerification { .. })
    }
}

/// Aggregate completion progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
    pub rounded_percentage: u32,
}

impl TaskProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            completed,
            total,
            percentage,
            rounded_percentage: percentage.round() as u32,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

/// Ordered, fixed set of tasks with their completion flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTracker {
    tasks: Vec<Task>,
}

impl TaskTracker {
    /// Build a tracker from task definitions, all incomplete.
    ///
    /// Order of `definitions` is the display order.
    pub fn new(definitions: impl IntoIterator<Item = TaskDefinition>) -> Result<Self, AirdropError> {
        let mut tasks: Vec<Task> = Vec::new();
        for def in definitions {
            if tasks.iter().any(|t| t.id == def.id) {
                return Err(AirdropError::DuplicateTask(def.id));
            }
            tasks.push(def.into());
        }
        if tasks.is_empty() {
            return Err(AirdropError::EmptyTaskSet);
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> Result<&mut Task, AirdropError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| AirdropError::TaskNotFound(id.clone()))
    }

    /// Record that the participant navigated to the task's link
    pub fn mark_task_opened(&mut self, id: &TaskId) -> Result<TaskOpened, AirdropError> {
        let task = self.get_mut(id)?;
        let link = task.link.clone();
        if task.completed {
            Ok(TaskOpened::AlreadyCompleted { link })
        } else {
            Ok(TaskOpened::PendingVerification { link })
        }
    }

    /// Apply a verifier outcome. Returns true if the task became completed
    /// by this call.
    ///
    /// Completion is monotonic: a rejected result never clears a flag.
    pub fn apply_verification(&mut self, result: &TaskVerificationResult) -> Result<bool, AirdropError> {
        let task = self.get_mut(&result.task_id)?;
        if task.completed || !result.verified {
            return Ok(false);
        }
        task.completed = true;
        Ok(true)
    }

    pub fn progress(&self) -> TaskProgress {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        TaskProgress::new(completed, self.tasks.len())
    }

    /// Sum of rewards over completed tasks
    pub fn total_reward_earned(&self) -> u64 {
        self.tasks
            .iter()
            .filter(|t| t.completed)
            .fold(0u64, |sum, t| sum.saturating_add(t.reward))
    }

    /// Ids of completed tasks in display order
    pub fn completed_ids(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id.clone())
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_definitions() -> Vec<TaskDefinition> {
    [
        ("follow_x", 250),
        ("join_telegram", 150),
        ("retweet", 200),
        ("join_discord", 300),
        ("subscribe_youtube", 200),
    ]
    .into_iter()
    .map(|(id, reward)| TaskDefinition {
        id: TaskId::from(id),
        title: id.replace('_', " "),
        link: format!("https://example.com/{}", id),
        reward,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> TaskTracker {
        TaskTracker::new(sample_definitions()).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_duplicate_sets() {
        assert_eq!(
            TaskTracker::new(Vec::new()).unwrap_err(),
            AirdropError::EmptyTaskSet
        );

        let mut defs = sample_definitions();
        defs.push(defs[0].clone());
        assert_eq!(
            TaskTracker::new(defs).unwrap_err(),
            AirdropError::DuplicateTask(TaskId::from("follow_x"))
        );
    }

    #[test]
    fn test_keeps_display_order() {
        let binding = tracker();
        let ids: Vec<&str> = binding.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            ["follow_x", "join_telegram", "retweet", "join_discord", "subscribe_youtube"]
        );
    }

    #[test]
    fn test_open_unknown_task() {
        let mut t = tracker();
        let err = t.mark_task_opened(&TaskId::from("nope")).unwrap_err();
        assert_eq!(err, AirdropError::TaskNotFound(TaskId::from("nope")));
    }

    #[test]
    fn test_open_does_not_complete() {
        let mut t = tracker();
        let opened = t.mark_task_opened(&TaskId::from("retweet")).unwrap();
        assert!(opened.needs_verification());
        assert_eq!(opened.link(), "https://example.com/retweet");
        assert_eq!(t.progress().completed, 0);
    }

    #[test]
    fn test_verification_completes_once() {
        let mut t = tracker();
        let id = TaskId::from("retweet");
        assert!(t.apply_verification(&TaskVerificationResult::approved(id.clone())).unwrap());
        assert!(!t.apply_verification(&TaskVerificationResult::approved(id.clone())).unwrap());
        assert_eq!(t.progress().completed, 1);

        let opened = t.mark_task_opened(&id).unwrap();
        assert_eq!(
            opened,
            TaskOpened::AlreadyCompleted {
                link: "https://example.com/retweet".to_string()
            }
        );
    }

    #[test]
    fn test_rejection_never_clears_completion() {
        let mut t = tracker();
        let id = TaskId::from("join_discord");
        assert!(!t.apply_verification(&TaskVerificationResult::rejected(id.clone())).unwrap());
        assert!(!t.get(&id).unwrap().completed);

        t.apply_verification(&TaskVerificationResult::approved(id.clone())).unwrap();
        t.apply_verification(&TaskVerificationResult::rejected(id.clone())).unwrap();
        assert!(t.get(&id).unwrap().completed);
    }

    #[test]
    fn test_progress_percentages() {
        let mut t = tracker();
        for id in ["follow_x", "join_telegram"] {
            t.apply_verification(&TaskVerificationResult::approved(TaskId::from(id)))
                .unwrap();
        }
        let p = t.progress();
        assert_eq!(p.completed, 2);
        assert_eq!(p.total, 5);
        assert!((p.percentage - 40.0).abs() < f64::EPSILON);
        assert_eq!(p.rounded_percentage, 40);
        assert_eq!(p.remaining(), 3);
        assert!(!p.is_complete());

        let third = TaskProgress::new(1, 3);
        assert_eq!(third.rounded_percentage, 33);
    }

    #[test]
    fn test_total_reward_counts_only_completed() {
        let mut t = tracker();
        assert_eq!(t.total_reward_earned(), 0);

        t.apply_verification(&TaskVerificationResult::approved(TaskId::from("join_discord")))
            .unwrap();
        assert_eq!(t.total_reward_earned(), 300);

        for def in sample_definitions() {
            t.apply_verification(&TaskVerificationResult::approved(def.id)).unwrap();
        }
        assert_eq!(t.total_reward_earned(), 1100);
    }

    #[test]
    fn test_total_reward_saturates() {
        let defs = [("big", u64::MAX), ("small", 1)].map(|(id, reward)| TaskDefinition {
            id: TaskId::from(id),
            title: id.to_string(),
            link: format!("https://example.com/{}", id),
            reward,
        });
        let mut t = TaskTracker::new(defs).unwrap();
        t.apply_verification(&TaskVerificationResult::approved(TaskId::from("big"))).unwrap();
        t.apply_verification(&TaskVerificationResult::approved(TaskId::from("small"))).unwrap();
        assert_eq!(t.total_reward_earned(), u64::MAX);
    }
}
