//! Configuration activation workflow.
//!
//! Verify, save and activate are asynchronous jobs on the device. Each is
//! submitted, answered with a status link, and then polled until it reports
//! success, reports failure, or runs out of time. Activation runs the three
//! stages strictly in order and stops at the first one that does not succeed.

use std::future::Future;

use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, instrument, warn};

use sbc_core::error::StageError;
use sbc_core::{Error, Method, OperationState, Result, Stage, StageOutcome};

use crate::client::expect_status;
use crate::config::PollPolicy;
use crate::endpoints;
use crate::session::DeviceSession;
use crate::xml::XmlDocument;

/// Submit a job, then poll its link until `check` accepts a snapshot.
///
/// The first poll happens right after submission, later ones `interval`
/// apart. `check` returns `Ok(true)` when done, `Ok(false)` to keep polling
/// and an error to stop. Once `timeout` has passed since submission the loop
/// stops with [`StageError::TimedOut`]; a poll still in flight at that point
/// is abandoned.
pub async fn submit_and_await<L, R, S, SF, P, PF, C>(
    stage: Stage,
    policy: PollPolicy,
    submit: S,
    mut poll: P,
    mut check: C,
) -> Result<R>
where
    L: Clone,
    S: FnOnce() -> SF,
    SF: Future<Output = Result<L>>,
    P: FnMut(L) -> PF,
    PF: Future<Output = Result<R>>,
    C: FnMut(&R) -> Result<bool>,
{
    let link = submit().await?;

    let started = Instant::now();
    let deadline = started + policy.timeout();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let snapshot = match timeout_at(deadline, poll(link.clone())).await {
            Ok(snapshot) => snapshot?,
            Err(_) => return Err(timed_out(stage, started)),
        };

        if check(&snapshot)? {
            debug!(%stage, attempt, "Stage complete");
            return Ok(snapshot);
        }

        sleep(policy.interval()).await;
        if Instant::now() >= deadline {
            return Err(timed_out(stage, started));
        }
    }
}

fn timed_out(stage: Stage, started: Instant) -> Error {
    let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    warn!(%stage, waited_ms, "Stage timed out");
    StageError::TimedOut { stage, waited_ms }.into()
}

fn check_state(stage: Stage, state: &OperationState) -> Result<bool> {
    match state.outcome_for(stage) {
        StageOutcome::Succeeded => Ok(true),
        StageOutcome::Pending => Ok(false),
        StageOutcome::Failed(status) => {
            warn!(%stage, %status, "Stage reported failure");
            Err(StageError::Failed {
                stage,
                detail: format!("device reported status '{}'", status),
            }
            .into())
        }
    }
}

impl DeviceSession {
    /// Verify the staged configuration.
    pub async fn verify_configuration(&self) -> Result<()> {
        self.run_stage(Stage::Verify).await.map(|_| ())
    }

    /// Save the staged configuration.
    pub async fn save_configuration(&self) -> Result<()> {
        self.run_stage(Stage::Save).await.map(|_| ())
    }

    /// Verify, save and activate the staged configuration.
    ///
    /// A stage is only submitted once the previous one has succeeded. The
    /// error of the first stage that did not succeed is returned.
    #[instrument(skip(self), fields(host = %self.client().config().host))]
    pub async fn activate_configuration(&self) -> Result<()> {
        for stage in Stage::ORDER {
            if let Err(e) = self.run_stage(stage).await {
                warn!(%stage, error = %e, "Configuration activation aborted");
                return Err(e);
            }
        }

        info!("Configuration activated");
        Ok(())
    }

    /// Submit one stage and wait for the device to report its outcome.
    ///
    /// Stages are independent here; ordering is up to the caller.
    #[instrument(skip(self), fields(host = %self.client().config().host))]
    pub async fn run_stage(&self, stage: Stage) -> Result<OperationState> {
        let policy = self.client().config().activation.for_stage(stage);

        let state = submit_and_await(
            stage,
            policy,
            move || self.submit_stage(stage),
            move |link| self.poll_stage(stage, link),
            move |state| check_state(stage, state),
        )
        .await?;

        info!(%stage, "Stage succeeded");
        Ok(state)
    }

    async fn submit_stage(&self, stage: Stage) -> Result<String> {
        debug!(%stage, "Submitting stage");
        let url = self.client().api_url(&endpoints::management(stage));
        let response = self.send(stage.method(), url, None).await?;
        let response = expect_status(stage.as_str(), response, |s| (200..300).contains(&s))?;

        let doc = XmlDocument::parse(&response.body)?;
        let link = endpoints::parse_operation_link(&doc)?;
        debug!(%stage, %link, "Stage submitted");
        Ok(link)
    }

    async fn poll_stage(&self, stage: Stage, link: String) -> Result<OperationState> {
        let response = self.send(Method::Get, link, None).await?;
        if response.status != 200 {
            warn!(
                %stage,
                status = response.status,
                reason = %response.reason,
                "Stage status check refused"
            );
            return Err(StageError::Failed {
                stage,
                detail: format!(
                    "status check returned HTTP {} {}",
                    response.status, response.reason
                ),
            }
            .into());
        }

        let doc = XmlDocument::parse(&response.body)?;
        let state = endpoints::parse_operation_state(&doc)?;
        debug!(%stage, %state, "Stage status");
        Ok(state)
    }
}
