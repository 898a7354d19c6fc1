//! Periodic polling runtime.

use async_trait::async_trait;
use std::{fmt::Display, sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// A unit of periodic work.
///
/// [`PollingService::action`] is one tick. Ticks of the same service never overlap.
#[async_trait]
pub trait PollingService: Send + 'static {
    /// The error returned by a failed tick.
    type Error: Display + Send;

    /// A short name identifying the service in logs and metrics.
    fn name(&self) -> &'static str;

    /// Runs a single tick.
    async fn action(&mut self) -> Result<(), Self::Error>;

    /// Handles the error of a failed tick. The next tick is scheduled regardless.
    fn handle_error(&mut self, error: Self::Error) {
        warn!(target: "polling", service = self.name(), %error, "Polling tick failed");
    }
}

/// Drives a [`PollingService`] on the tokio runtime.
///
/// The next tick is scheduled `polling_interval` after the previous one resolved. The service is
/// held behind an async mutex so its owner can inspect it between ticks.
#[derive(Debug)]
pub struct PeriodicPollingService<S> {
    service: Arc<Mutex<S>>,
    polling_interval: Duration,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl<S: PollingService> PeriodicPollingService<S> {
    /// Wraps `service`, ticking every `polling_interval` once started.
    pub fn new(service: S, polling_interval: Duration) -> Self {
        Self::from_shared(Arc::new(Mutex::new(service)), polling_interval)
    }

    /// Wraps an already shared `service`.
    pub const fn from_shared(service: Arc<Mutex<S>>, polling_interval: Duration) -> Self {
        Self { service, polling_interval, running: None }
    }

    /// Returns a handle to the wrapped service.
    pub fn service(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.service)
    }

    /// Returns true if the service was started and not stopped since.
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Starts ticking. Calling `start` on a running service does nothing.
    pub fn start(&mut self) {
        if self.running.is_some() {
            debug!(target: "polling", "Polling service already started");
            return;
        }

        let cancellation = CancellationToken::new();
        let handle = tokio::spawn(Self::run(
            Arc::clone(&self.service),
            self.polling_interval,
            cancellation.clone(),
        ));
        self.running = Some((cancellation, handle));
    }

    /// Stops ticking and waits for an in-flight tick to finish. Calling `stop` on a stopped
    /// service does nothing.
    pub async fn stop(&mut self) {
        let Some((cancellation, handle)) = self.running.take() else {
            return;
        };
        cancellation.cancel();
        if let Err(err) = handle.await {
            error!(target: "polling", %err, "Polling task terminated abnormally");
        }
    }

    async fn run(service: Arc<Mutex<S>>, polling_interval: Duration, cancellation: CancellationToken) {
        let name = service.lock().await.name();
        info!(target: "polling", service = name, ?polling_interval, "Starting polling service");

        loop {
            if cancellation.is_cancelled() {
                break;
            }

            {
                let mut service = service.lock().await;
                if let Err(err) = service.action().await {
                    coordinator_macros::inc!(
                        counter,
                        crate::Metrics::POLLING_TICK_ERRORS,
                        "service",
                        name
                    );
                    service.handle_error(err);
                }
            }

            tokio::select! {
                biased;
                _ = cancellation.cancelled() => break,
                _ = tokio::time::sleep(polling_interval) => {}
            }
        }

        info!(target: "polling", service = name, "Polling service stopped");
    }
}

impl<S> Drop for PeriodicPollingService<S> {
    fn drop(&mut self) {
        if let Some((cancellation, _)) = &self.running {
            cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingService {
        ticks: Arc<AtomicUsize>,
        failures: usize,
        fail_every_tick: bool,
    }

    #[async_trait]
    impl PollingService for CountingService {
        type Error = String;

        fn name(&self) -> &'static str {
            "counting"
        }

        async fn action(&mut self) -> Result<(), Self::Error> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            if self.fail_every_tick { Err("boom".to_string()) } else { Ok(()) }
        }

        fn handle_error(&mut self, _: Self::Error) {
            self.failures += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_interval() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let service = CountingService { ticks: Arc::clone(&ticks), ..Default::default() };
        let mut poller = PeriodicPollingService::new(service, Duration::from_millis(10));

        poller.start();
        tokio::time::sleep(Duration::from_millis(35)).await;

        // Ticks at 0, 10, 20 and 30ms.
        assert_eq!(ticks.load(Ordering::SeqCst), 4);
        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_are_idempotent() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let service = CountingService { ticks: Arc::clone(&ticks), ..Default::default() };
        let mut poller = PeriodicPollingService::new(service, Duration::from_millis(10));

        poller.stop().await;
        assert!(!poller.is_running());

        poller.start();
        poller.start();
        assert!(poller.is_running());
        tokio::time::sleep(Duration::from_millis(15)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        poller.stop().await;
        poller.stop().await;
        assert!(!poller.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        poller.start();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ticks_are_handled_and_rescheduled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let service = CountingService {
            ticks: Arc::clone(&ticks),
            fail_every_tick: true,
            ..Default::default()
        };
        let mut poller = PeriodicPollingService::new(service, Duration::from_millis(10));

        poller.start();
        tokio::time::sleep(Duration::from_millis(25)).await;
        poller.stop().await;

        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert_eq!(poller.service().lock().await.failures, 3);
    }
}
