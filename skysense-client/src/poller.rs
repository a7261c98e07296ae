use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use skysense_api::models::Id;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::api::TelemetrySource;
use crate::error::{Error, Result};
use crate::guard::SessionGuard;
use crate::storage::LocalStorage;
use crate::view::DeviceSnapshot;

/// Refresh cadence of the telemetry screen.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Lifecycle of one screen's poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Active,
    Refreshing,
    Stopped,
}

/// View state published to the screen.
///
/// `loading` holds until the first result lands. Later failures keep the
/// stale snapshot and set `error`; later successes clear it.
#[derive(Debug, Clone)]
pub struct PollState {
    pub loading: bool,
    pub snapshot: Option<DeviceSnapshot>,
    pub error: Option<Error>,
}

struct Lifecycle {
    phase: PollPhase,
    device_id: Option<Id>,
}

struct PollerInner<S: LocalStorage> {
    source: Arc<dyn TelemetrySource>,
    guard: Arc<SessionGuard<S>>,
    state: watch::Sender<PollState>,
    lifecycle: Mutex<Lifecycle>,
    /// Next fetch sequence number; the most recently started fetch holds
    /// `seq - 1`.
    seq: AtomicU64,
    manual_refresh: AtomicBool,
}

/// Interval-driven fetch loop bound to one screen's visible lifetime.
///
/// Fetches immediately on `start`, then once per interval until `stop`.
/// Ticks never wait for earlier fetches, so responses can complete out of
/// order; only the most recently started fetch may publish its result.
pub struct Poller<S: LocalStorage> {
    inner: Arc<PollerInner<S>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: LocalStorage + 'static> Poller<S> {
    pub fn new(source: Arc<dyn TelemetrySource>, guard: Arc<SessionGuard<S>>) -> Self {
        let (state, _) = watch::channel(PollState {
            loading: true,
            snapshot: None,
            error: None,
        });

        Self {
            inner: Arc::new(PollerInner {
                source,
                guard,
                state,
                lifecycle: Mutex::new(Lifecycle {
                    phase: PollPhase::Idle,
                    device_id: None,
                }),
                seq: AtomicU64::new(0),
                manual_refresh: AtomicBool::new(false),
            }),
            ticker: Mutex::new(None),
        }
    }

    /// Begins polling `device_id`: one immediate fetch, then one per
    /// `interval`. A second `start` on a live poller is ignored.
    pub async fn start(&self, device_id: Id, interval: Duration) {
        {
            let mut lifecycle = self.inner.lifecycle.lock().await;
            if lifecycle.phase != PollPhase::Idle {
                tracing::warn!(device_id, "start ignored: poller is not idle");
                return;
            }
            lifecycle.phase = PollPhase::Active;
            lifecycle.device_id = Some(device_id);
        }

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let seq = inner.next_seq();
                let fetcher = inner.clone();
                tokio::spawn(async move {
                    let result = fetcher.fetch(device_id).await;
                    fetcher.publish(seq, result).await;
                });
            }
        });

        *self.ticker.lock().await = Some(handle);
    }

    /// One out-of-band fetch sharing the automatic sequence space. Ignored
    /// unless active, and while another manual refresh is in flight.
    pub async fn refresh_now(&self) {
        let device_id = {
            let mut lifecycle = self.inner.lifecycle.lock().await;
            let (PollPhase::Active, Some(device_id)) = (lifecycle.phase, lifecycle.device_id)
            else {
                tracing::debug!(phase = ?lifecycle.phase, "manual refresh ignored");
                return;
            };

            if self
                .inner
                .manual_refresh
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                tracing::debug!("manual refresh already in flight");
                return;
            }

            lifecycle.phase = PollPhase::Refreshing;
            device_id
        };

        let seq = self.inner.next_seq();
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let result = inner.fetch(device_id).await;
            inner.publish(seq, result).await;

            inner.manual_refresh.store(false, Ordering::SeqCst);
            let mut lifecycle = inner.lifecycle.lock().await;
            if lifecycle.phase == PollPhase::Refreshing {
                lifecycle.phase = PollPhase::Active;
            }
        });
    }

    /// Cancels the interval. In-flight fetches run to completion but their
    /// results are discarded.
    pub async fn stop(&self) {
        {
            let mut lifecycle = self.inner.lifecycle.lock().await;
            if lifecycle.phase == PollPhase::Stopped {
                return;
            }
            lifecycle.phase = PollPhase::Stopped;
        }

        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }

        tracing::debug!("poller stopped");
    }

    pub async fn phase(&self) -> PollPhase {
        self.inner.lifecycle.lock().await.phase
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }
}

impl<S: LocalStorage> Drop for Poller<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}

impl<S: LocalStorage + 'static> PollerInner<S> {
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Resolves the bearer token at fetch time so a re-login is picked up
    /// without restarting the poller.
    async fn fetch(&self, device_id: Id) -> Result<DeviceSnapshot> {
        let token = self
            .guard
            .store()
            .token()
            .await?
            .ok_or_else(|| Error::auth("no session token"))?;

        let response = self.source.device_telemetry(&token, device_id).await?;

        Ok(DeviceSnapshot::from_response(response))
    }

    /// Applies one fetch outcome under the discard rules: nothing lands
    /// after `stop`, and a result loses to any fetch started after it.
    /// Rejected tokens reach the session guard even from losing fetches.
    async fn publish(&self, seq: u64, result: Result<DeviceSnapshot>) {
        if self.lifecycle.lock().await.phase == PollPhase::Stopped {
            tracing::debug!(seq, "fetch result discarded: poller stopped");
            return;
        }

        if let Err(err) = &result {
            if err.is_auth() {
                self.guard.on_auth_failure().await;
            }
        }

        if seq + 1 != self.seq.load(Ordering::SeqCst) {
            tracing::debug!(seq, "fetch result discarded: superseded");
            return;
        }

        self.state.send_modify(|state| {
            state.loading = false;
            match result {
                Ok(snapshot) => {
                    state.snapshot = Some(snapshot);
                    state.error = None;
                }
                Err(err) => {
                    tracing::error!("telemetry fetch failed: {err}");
                    state.error = Some(err);
                }
            }
        });
    }
}
