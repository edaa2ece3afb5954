//! Request and response bodies of the REST API

use serde::{Deserialize, Serialize};

use crate::domain::TaskOpened;
use crate::store::{ParticipantRecord, ParticipantSummary};

#[derive(Debug, Clone, Deserialize)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpVerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsCreateRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOpenResponse {
    pub task_id: String,
    #[serde(flatten)]
    pub opened: TaskOpened,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantsResponse {
    pub summary: ParticipantSummary,
    pub participants: Vec<ParticipantRecord>,
}
