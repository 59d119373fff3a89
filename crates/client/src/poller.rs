//! Long-running operation poller.
//!
//! Write endpoints return an operation id; the actual work finishes later.
//! `wait_for_operation` checks immediately, then re-checks on the poll
//! schedule until the operation reaches a terminal phase or the caller's
//! deadline passes. The deadline triggers one last status fetch so an
//! operation that completed during the final sleep is still reported as
//! its real outcome rather than a timeout.

use std::time::Duration;

use reqwest::Method;
use tokio::time::Instant;
use skylift_domain::{ApiError, ApiResult, Operation, OperationPhase};
use tracing::{debug, instrument, warn};

use crate::endpoints::operation_path;
use crate::executor::ApiClient;

impl ApiClient {
    /// Wait until operation `operation_id` finishes or `timeout` elapses.
    ///
    /// Returns the terminal operation on success, `OperationFailed` when the
    /// server reports failure, `Timeout` when the deadline passes with the
    /// operation still pending, and `Cancelled` when the client's
    /// cancellation token fires during a wait.
    #[instrument(skip(self))]
    pub async fn wait_for_operation(
        &self,
        operation_id: &str,
        timeout: Duration,
    ) -> ApiResult<Operation> {
        let policy = self.poll_policy;
        let deadline = Instant::now() + timeout;
        let mut last_status = String::from("UNKNOWN");

        // First check happens immediately; a fast operation never waits
        // out a full poll interval.
        match self.fetch_before(operation_id, deadline).await {
            None => return self.final_check(operation_id, last_status).await,
            Some(Ok(operation)) => {
                last_status = operation.status.clone();
                if let Some(done) = terminal_outcome(operation) {
                    return done;
                }
            }
            Some(Err(err)) => debug!(error = %err, "initial status check failed, will poll"),
        }

        let mut attempt = 0u32;
        loop {
            tokio::select! {
                () = tokio::time::sleep_until(deadline) => {
                    return self.final_check(operation_id, last_status).await;
                }
                () = self.cancel.cancelled() => return Err(ApiError::Cancelled),
                () = tokio::time::sleep(policy.interval(attempt)) => {}
            }
            attempt += 1;

            match self.fetch_before(operation_id, deadline).await {
                None => return self.final_check(operation_id, last_status).await,
                Some(Ok(operation)) => {
                    last_status = operation.status.clone();
                    debug!(status = %last_status, attempt, "operation status");
                    if let Some(done) = terminal_outcome(operation) {
                        return done;
                    }
                }
                // Transient fetch failures count as still-pending; the
                // deadline bounds how long they can go on.
                Some(Err(err)) => {
                    debug!(error = %err, attempt, "status check failed, will poll");
                }
            }
        }
    }

    /// Status fetch raced against the deadline. `None` means the deadline
    /// fired mid-fetch and the fetch was abandoned; only `final_check` may
    /// run past the deadline.
    async fn fetch_before(
        &self,
        operation_id: &str,
        deadline: Instant,
    ) -> Option<ApiResult<Operation>> {
        tokio::select! {
            res = self.get_operation(operation_id) => Some(res),
            () = tokio::time::sleep_until(deadline) => None,
        }
    }

    /// One last fetch after the deadline, exempt from cancellation and
    /// retries, bounded only by the transport timeout.
    async fn final_check(&self, operation_id: &str, last_status: String) -> ApiResult<Operation> {
        let fetched = self
            .send_once(Method::GET, &operation_path(operation_id), None)
            .await
            .and_then(|bytes| self.decode::<Operation>(&operation_path(operation_id), &bytes));
        match fetched {
            Ok(operation) => match operation.phase() {
                OperationPhase::Succeeded => {
                    warn!(status = %operation.status, "operation finished at the deadline");
                    Ok(operation)
                }
                OperationPhase::Failed => {
                    warn!(status = %operation.status, "operation failed at the deadline");
                    Err(ApiError::OperationFailed {
                        id: operation.id,
                        status: operation.status,
                    })
                }
                OperationPhase::Pending => Err(ApiError::Timeout {
                    id: operation_id.to_owned(),
                    last_status: operation.status,
                }),
            },
            Err(err) => {
                debug!(error = %err, "final status check failed");
                Err(ApiError::Timeout { id: operation_id.to_owned(), last_status })
            }
        }
    }
}

/// `Some(result)` when the operation has reached a terminal phase.
fn terminal_outcome(operation: Operation) -> Option<ApiResult<Operation>> {
    match operation.phase() {
        OperationPhase::Succeeded => Some(Ok(operation)),
        OperationPhase::Failed => Some(Err(ApiError::OperationFailed {
            id: operation.id,
            status: operation.status,
        })),
        OperationPhase::Pending => None,
    }
}
