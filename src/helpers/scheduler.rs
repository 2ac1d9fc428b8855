use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, trace, warn};

use crate::adapters::SiteAdapter;
use crate::bridge::transport::SignalSender;
use crate::data::ObjectType;
use crate::error::AdapterError;

/// Cooperative cancellation shared by the bridge and its poll tasks
///
/// Cancelling wakes every waiter immediately instead of letting it sleep out
/// the current interval.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    // dropping the sender disconnects the channel, which wakes all receivers
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("Cancellation requested");
        }
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `timeout` unless cancelled first
    ///
    /// Returns true if the token was cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.receiver.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
            _ => true,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    /// The page was not ready; polling continues
    NotReady,
    Failed(String),
    Panicked(String),
}

/// Run a single `update` cycle, containing errors and panics
///
/// `update` is skipped while the adapter reports that it is not ready.
pub fn run_cycle(adapter: &mut dyn SiteAdapter) -> CycleOutcome {
    let cycle = AssertUnwindSafe(|| {
        if !adapter.is_ready() {
            return Err(AdapterError::NotReady);
        }
        adapter.update()
    });
    match panic::catch_unwind(cycle) {
        Ok(Ok(())) => CycleOutcome::Completed,
        Ok(Err(AdapterError::NotReady)) => CycleOutcome::NotReady,
        Ok(Err(e)) => CycleOutcome::Failed(e.to_string()),
        Err(payload) => {
            let message = if let Some(text) = payload.downcast_ref::<&str>() {
                text.to_string()
            } else if let Some(text) = payload.downcast_ref::<String>() {
                text.clone()
            } else {
                "unknown panic".to_string()
            };
            CycleOutcome::Panicked(message)
        }
    }
}

/// A site adapter polled on its own thread with a fixed delay between cycles
///
/// Each cycle runs to completion before the delay starts, so cycles of one
/// adapter never overlap. The next cycle is scheduled regardless of how the
/// previous one ended.
pub struct PollTask {
    name: String,
    token: CancellationToken,
    handle: Option<JoinHandle<u64>>,
}

impl PollTask {
    /// Start the adapter and begin polling
    ///
    /// Warnings about failed cycles go to the host through `signals` when
    /// given, and to the local log in any case.
    pub fn spawn(
        mut adapter: Box<dyn SiteAdapter>,
        interval: Duration,
        token: CancellationToken,
        signals: Option<SignalSender>,
    ) -> std::io::Result<PollTask> {
        let name = adapter.name().to_string();
        let thread_token = token.clone();
        let thread_name = name.clone();

        let handle = thread::Builder::new()
            .name(format!("poll-{}", name))
            .spawn(move || {
                info!("Starting site adapter {}", thread_name);
                if let Err(e) = adapter.start() {
                    report(&signals, &format!("Adapter {} failed to start: {}", thread_name, e));
                }

                let mut cycles: u64 = 0;
                while !thread_token.is_cancelled() {
                    cycles += 1;
                    match run_cycle(adapter.as_mut()) {
                        CycleOutcome::Completed => trace!("{} cycle {} completed", thread_name, cycles),
                        CycleOutcome::NotReady => debug!("{} not ready yet, polling again", thread_name),
                        CycleOutcome::Failed(e) => {
                            report(&signals, &format!("Update of {} failed: {}", thread_name, e))
                        }
                        CycleOutcome::Panicked(e) => {
                            report(&signals, &format!("Update of {} panicked: {}", thread_name, e))
                        }
                    }

                    if thread_token.wait(interval) {
                        break;
                    }
                }

                info!("Site adapter {} stopped after {} cycles", thread_name, cycles);
                cycles
            })?;

        Ok(PollTask {
            name,
            token,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|handle| handle.is_finished()).unwrap_or(true)
    }

    /// Cancel the task and wait for the running cycle to end
    ///
    /// Returns the number of cycles that ran. The token is shared, so this
    /// also stops every other task on the same token.
    pub fn stop(&mut self) -> Option<u64> {
        self.token.cancel();
        self.join()
    }

    /// Wait for the task to end without cancelling it
    pub fn join(&mut self) -> Option<u64> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(cycles) => Some(cycles),
            Err(_) => {
                warn!("Poll thread {} ended abnormally", self.name);
                None
            }
        }
    }
}

// The token may be shared with other tasks, so an unjoined task is detached
// here and ends when its token is cancelled.
impl Drop for PollTask {
    fn drop(&mut self) {
        if self.handle.take().is_some() {
            debug!("Poll task {} detached", self.name);
        }
    }
}

fn report(signals: &Option<SignalSender>, text: &str) {
    match signals {
        Some(signals) => signals.warning(ObjectType::Api, text),
        None => warn!("{}", text),
    }
}
