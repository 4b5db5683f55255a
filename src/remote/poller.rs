//! Background status polling.
//!
//! One thread asks the transport for the current playback every interval and
//! forwards the observation to the UI thread over a channel. Tick failures are
//! counted and logged at debug level only; the next tick simply tries again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::transport::RemoteTransport;
use super::types::CurrentPlayback;

/// Granularity at which the sleeping poller notices a stop request.
const STOP_CHECK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// `None` means the service reported no playback at all.
    Playback(Option<CurrentPlayback>),
}

pub struct PollerHandle {
    running: Arc<AtomicBool>,
    failures: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Number of ticks that failed since the poller started.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Clear the running flag and wait for the thread. An in-flight
    /// transport call finishes first.
    pub fn stop(&mut self) {
        if self.is_running() {
            log::debug!("stopping status poller");
        }
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one poll: forward the observation, or count the failure.
/// Returns `false` once nobody is listening anymore.
fn tick(
    transport: &dyn RemoteTransport,
    tx: &Sender<PollEvent>,
    failures: &AtomicU64,
) -> bool {
    match transport.current_playback() {
        Ok(observed) => tx.send(PollEvent::Playback(observed)).is_ok(),
        Err(e) => {
            let n = failures.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("status poll failed ({n} so far): {e}");
            true
        }
    }
}

/// Sleep up to `interval`, waking early if `running` is cleared.
fn wait(running: &AtomicBool, interval: Duration) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(STOP_CHECK.min(deadline - now));
    }
}

/// Start polling on a dedicated thread. The first tick runs immediately.
pub fn spawn_poller(
    transport: Arc<dyn RemoteTransport>,
    interval: Duration,
    tx: Sender<PollEvent>,
) -> std::io::Result<PollerHandle> {
    let running = Arc::new(AtomicBool::new(true));
    let failures = Arc::new(AtomicU64::new(0));

    let running_for_thread = running.clone();
    let failures_for_thread = failures.clone();
    let join = thread::Builder::new()
        .name("remote-poller".to_string())
        .spawn(move || {
            log::debug!("status poller started, interval {interval:?}");
            while running_for_thread.load(Ordering::Relaxed) {
                if !tick(transport.as_ref(), &tx, &failures_for_thread) {
                    break;
                }
                wait(&running_for_thread, interval);
            }
            running_for_thread.store(false, Ordering::Relaxed);
            log::debug!("status poller stopped");
        })?;

    Ok(PollerHandle {
        running,
        failures,
        join: Some(join),
    })
}
