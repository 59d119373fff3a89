//! Server-tracked long-running operations and their status classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-tracked asynchronous job (service start, project delete, ...).
///
/// Observed, never mutated: once a terminal phase is reported the server is
/// not expected to move it again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    #[serde(default)]
    pub action_name: String,
    pub status: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl Operation {
    /// Classify the server-reported status string.
    pub fn phase(&self) -> OperationPhase {
        OperationPhase::from_status(&self.status)
    }
}

/// The three partitions of an operation status that matter to a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    /// Not finished yet; keep waiting.
    Pending,
    /// Terminal, success.
    Succeeded,
    /// Terminal, failure.
    Failed,
}

impl OperationPhase {
    /// Map a raw status string to a phase.
    ///
    /// The server is authoritative and may introduce new transitional
    /// statuses at any time, so anything unrecognized stays `Pending`
    /// rather than being mis-read as terminal.
    pub fn from_status(status: &str) -> Self {
        match status {
            "SUCCESS" | "FINISHED" => Self::Succeeded,
            "FAILED" | "ERROR" | "CANCELLED" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_are_terminal() {
        assert_eq!(OperationPhase::from_status("SUCCESS"), OperationPhase::Succeeded);
        assert_eq!(OperationPhase::from_status("FINISHED"), OperationPhase::Succeeded);
        assert!(OperationPhase::Succeeded.is_terminal());
    }

    #[test]
    fn failure_statuses_are_terminal() {
        for status in ["FAILED", "ERROR", "CANCELLED"] {
            assert_eq!(OperationPhase::from_status(status), OperationPhase::Failed);
        }
    }

    #[test]
    fn known_transitional_statuses_are_pending() {
        for status in ["PENDING", "RUNNING", "QUEUED", ""] {
            assert_eq!(OperationPhase::from_status(status), OperationPhase::Pending);
        }
    }

    #[test]
    fn unknown_statuses_default_to_pending() {
        // New server-side states must never be treated as terminal.
        for status in ["REBALANCING", "success", "Finished", "CANCELLING"] {
            let phase = OperationPhase::from_status(status);
            assert_eq!(phase, OperationPhase::Pending, "status {status:?}");
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn operation_decodes_from_minimal_payload() {
        let op: Operation = serde_json::from_str(r#"{"id":"op-1","status":"RUNNING"}"#)
            .expect("minimal operation should decode");
        assert_eq!(op.id, "op-1");
        assert_eq!(op.phase(), OperationPhase::Pending);
        assert!(op.created.is_none());
        assert!(op.finished.is_none());
    }

    #[test]
    fn operation_decodes_timestamps() {
        let op: Operation = serde_json::from_str(
            r#"{
                "id": "op-2",
                "actionName": "stack.start",
                "status": "SUCCESS",
                "projectId": "proj-1",
                "serviceId": "svc-1",
                "created": "2024-03-01T12:00:00Z",
                "started": "2024-03-01T12:00:01Z",
                "finished": "2024-03-01T12:00:09Z"
            }"#,
        )
        .expect("full operation should decode");
        assert_eq!(op.action_name, "stack.start");
        assert_eq!(op.phase(), OperationPhase::Succeeded);
        assert!(op.started.unwrap() < op.finished.unwrap());
    }
}
