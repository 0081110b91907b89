//! Configuration workflow stages and their reported state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transport::Method;

/// One step of the configuration activation workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Verify,
    Save,
    Activate,
}

impl Stage {
    /// All stages in the order they must run.
    pub const ORDER: [Stage; 3] = [Stage::Verify, Stage::Save, Stage::Activate];

    /// The operation name the device reports, also the `action` query value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Verify => "verify",
            Stage::Save => "save",
            Stage::Activate => "activate",
        }
    }

    /// The verb that submits this stage.
    pub fn method(&self) -> Method {
        match self {
            Stage::Verify | Stage::Save => Method::Put,
            Stage::Activate => Method::Post,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a polled stage stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Pending,
    /// Terminal failure with the status the device reported.
    Failed(String),
}

/// The `operationState` of a long-running configuration operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub operation: String,
    pub status: String,
}

impl OperationState {
    /// Create an operation state.
    pub fn new(operation: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: status.into(),
        }
    }

    /// Interpret this state for the stage being awaited.
    ///
    /// A state that belongs to another operation is still pending.
    pub fn outcome_for(&self, stage: Stage) -> StageOutcome {
        if self.operation != stage.as_str() {
            return StageOutcome::Pending;
        }

        let status = self.status.to_ascii_lowercase();
        match status.as_str() {
            "success" => StageOutcome::Succeeded,
            "failure" | "failed" | "error" => StageOutcome::Failed(self.status.clone()),
            _ => StageOutcome::Pending,
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation={} status={}", self.operation, self.status)
    }
}
