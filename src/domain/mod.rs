//! Core domain types for memedrop

mod claim;
mod error;
mod gate;
mod session;
pub(crate) mod task;

pub use claim::{ClaimReceipt, ClaimState, VerificationState};
pub use error::AirdropError;
pub use gate::{can_claim, GatePhase, GateStatus};
pub use session::{AirdropSession, SessionSnapshot};
pub use task::{
    Task, TaskDefinition, TaskId, TaskOpened, TaskProgress, TaskTracker, TaskVerificationResult,
};
