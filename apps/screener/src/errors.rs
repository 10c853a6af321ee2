use thiserror::Error;
use uuid::Uuid;

use crate::driver::decode::ResultDecodeError;
use crate::driver::DriverError;
use crate::engine::ExecutionStatus;

/// Pipeline-level error type. Driver and decode failures pass through with
/// their own detail; remote terminal failures carry the engine-reported cause.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("execution {execution_id} ended {status:?}: {detail}")]
    ExecutionFailed {
        execution_id: Uuid,
        status: ExecutionStatus,
        detail: String,
    },

    #[error(transparent)]
    Decode(#[from] ResultDecodeError),
}
