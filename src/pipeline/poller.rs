use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::errors::ScanGateError;
use crate::models::xml::parse_document;
use crate::models::{PrescanModule, PrescanResults};
use crate::service::ScanService;
use super::clock::Clock;
use super::interrupt::{interruptible, interruptible_sleep};
use super::state::PollOutcome;

/// Wait between prescan result fetches. The attempt budget is expressed in
/// minutes, so this is not configurable.
pub const PRESCAN_POLL_INTERVAL: Duration = Duration::from_secs(60);

pub struct PrescanPoller {
    service: Arc<dyn ScanService>,
    clock: Arc<dyn Clock>,
    cancel_token: CancellationToken,
    verbose: bool,
}

impl PrescanPoller {
    pub fn new(
        service: Arc<dyn ScanService>,
        clock: Arc<dyn Clock>,
        cancel_token: CancellationToken,
        verbose: bool,
    ) -> Self {
        Self {
            service,
            clock,
            cancel_token,
            verbose,
        }
    }

    /// Start the prescan and wait for its module list. Running out of
    /// attempts is an error.
    pub async fn run(&self, app_id: &str, attempt_budget: u32) -> Result<Vec<PrescanModule>, ScanGateError> {
        info!(app_id = %app_id, budget_minutes = attempt_budget, "Starting execution of prescan");
        interruptible(&self.cancel_token, "starting prescan", self.service.begin_prescan(app_id)).await?;

        match self.poll(app_id, attempt_budget).await? {
            PollOutcome::Ready(modules) => {
                info!(modules = modules.len(), "Prescan is finished");
                Ok(modules)
            }
            PollOutcome::TimedOut { attempts } => Err(ScanGateError::PrescanTimeout { attempts }),
        }
    }

    /// Fetch results until they parse or the budget runs out. An unparsable
    /// document only means the prescan is still running.
    pub async fn poll(&self, app_id: &str, attempt_budget: u32) -> Result<PollOutcome, ScanGateError> {
        let mut attempts_left = attempt_budget;
        while attempts_left > 0 {
            let xml = interruptible(
                &self.cancel_token,
                "fetching prescan results",
                self.service.get_prescan_results(app_id),
            )
            .await?;
            if self.verbose {
                info!(document = %xml, "Prescan results response");
            }
            info!(attempts_left, "Checked prescan results");

            match parse_document::<PrescanResults>(&xml, "prescanresults") {
                Ok(results) => return Ok(PollOutcome::Ready(results.modules)),
                Err(e) => debug!(reason = %e, "Prescan results not available yet"),
            }

            attempts_left -= 1;
            interruptible_sleep(self.clock.as_ref(), &self.cancel_token, PRESCAN_POLL_INTERVAL).await?;
        }
        Ok(PollOutcome::TimedOut { attempts: attempt_budget })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::clock::ManualClock;
    use crate::service::fake::{prescan_xml, ScriptedService, PRESCAN_NOT_READY};
    use chrono::Utc;

    fn poller(service: Arc<ScriptedService>, clock: Arc<ManualClock>) -> PrescanPoller {
        PrescanPoller::new(service, clock, CancellationToken::new(), false)
    }

    #[tokio::test]
    async fn test_ready_after_k_unparsable_responses() {
        let k = 3;
        let mut responses: Vec<String> = vec![PRESCAN_NOT_READY.to_string(); k];
        responses.push(prescan_xml(&[("5", "JVM", false)]));
        let service = Arc::new(ScriptedService::new().with_prescan_responses(responses));
        let clock = Arc::new(ManualClock::new(Utc::now()));

        let modules = poller(service.clone(), clock.clone()).run("1", 10).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(service.prescan_fetches(), k + 1);
        assert_eq!(clock.sleeps(), vec![PRESCAN_POLL_INTERVAL; k]);
    }

    #[tokio::test]
    async fn test_ready_on_first_attempt_never_sleeps() {
        let service = Arc::new(
            ScriptedService::new().with_prescan_responses([prescan_xml(&[("5", "JVM", false)])]),
        );
        let clock = Arc::new(ManualClock::new(Utc::now()));
        poller(service.clone(), clock.clone()).run("1", 1).await.unwrap();
        assert!(service.prescan_started());
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_budget_times_out() {
        let service = Arc::new(ScriptedService::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let err = poller(service.clone(), clock.clone()).run("1", 4).await.unwrap_err();
        assert!(matches!(err, ScanGateError::PrescanTimeout { attempts: 4 }));
        assert_eq!(service.prescan_fetches(), 4);
        assert_eq!(clock.total_slept(), PRESCAN_POLL_INTERVAL * 4);
    }

    #[tokio::test]
    async fn test_zero_budget_times_out_without_fetching() {
        let service = Arc::new(ScriptedService::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let outcome = poller(service.clone(), clock).poll("1", 0).await.unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 0 });
        assert_eq!(service.prescan_fetches(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_polling() {
        let service = Arc::new(ScriptedService::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let token = CancellationToken::new();
        token.cancel();
        let poller = PrescanPoller::new(service.clone(), clock, token, false);
        let err = poller.run("1", 5).await.unwrap_err();
        assert!(matches!(err, ScanGateError::Interrupted(_)));
        assert_eq!(service.prescan_fetches(), 0);
    }
}
