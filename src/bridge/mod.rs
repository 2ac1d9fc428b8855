//! The command and property bridge between a site script and the host

pub mod changeset;
pub mod codec;
pub mod dispatcher;
pub mod envelope;
pub mod host;
pub mod object;
pub mod operations;
pub mod registry;
pub mod tracker;
pub mod transport;

pub use changeset::ChangeSet;
pub use codec::{EnvelopeCodec, PayloadCodec};
pub use dispatcher::{Dispatcher, FailureMarker};
pub use envelope::CommandEnvelope;
pub use host::{HostCommand, HostEvent, PlayerAction};
pub use object::{shared, BridgeObject, ObservableObject, SharedObject};
pub use operations::{Arguments, OperationTable};
pub use registry::{Registration, RegistrationPolicy, Registry, RegistryHandle};
pub use tracker::ChangeTracker;
pub use transport::{ChannelTransport, NullTransport, SignalSender, Transport};

use std::sync::{Arc, Mutex};
use log::{debug, info, warn};

use crate::adapters::{NullActions, SiteAdapter};
use crate::config::BridgeConfig;
use crate::helpers::scheduler::{CancellationToken, PollTask};
use crate::objects::{ApiObject, Player, Playlist, Tracklist};

/// Script-side facade: owns the registry, the dispatcher and the poll tasks
///
/// Created at startup with the host's transport; `shutdown` (or dropping the
/// bridge) stops all poll tasks and clears the registry.
pub struct Bridge {
    config: BridgeConfig,
    signals: SignalSender,
    registry: Registry,
    dispatcher: Dispatcher,
    token: CancellationToken,
    tasks: Mutex<Vec<PollTask>>,
}

impl Bridge {
    pub fn new(transport: Arc<dyn Transport>, config: BridgeConfig) -> Self {
        let signals = SignalSender::new(transport).with_forward_diagnostics(config.forward_diagnostics);
        let registry = Registry::new(config.registration_policy, signals.clone());
        let dispatcher = Dispatcher::new(registry.clone(), signals.clone(), config.failure_marker);

        let api = ApiObject::new(signals.clone(), registry.downgrade());
        registry.register(shared(api));

        info!("Bridge {} created", crate::objects::api::VERSION);
        Bridge {
            config,
            signals,
            registry,
            dispatcher,
            token: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Sender for objects created outside the bridge
    pub fn signals(&self) -> &SignalSender {
        &self.signals
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Register an observable object under its type tag
    pub fn register(&self, object: SharedObject) -> Registration {
        self.registry.register(object)
    }

    /// A player wired to this bridge's sender and seek threshold
    pub fn new_player(&self) -> Player {
        Player::new(self.signals.clone(), Box::new(NullActions))
            .with_seek_threshold(self.config.seek_threshold_us)
    }

    pub fn new_playlist(&self) -> Playlist {
        Playlist::new(self.signals.clone(), Box::new(NullActions))
    }

    pub fn new_tracklist(&self) -> Tracklist {
        Tracklist::new(self.signals.clone(), Box::new(NullActions))
    }

    /// Handle one inbound message from the host and return the reply
    ///
    /// Never fails; problems are answered with the configured failure marker.
    pub fn receive(&self, message: &str) -> String {
        self.dispatcher.handle_message(message)
    }

    /// Flush the pending changes of every registered object
    ///
    /// Objects flush one after the other; no ordering across types is implied.
    pub fn flush_all(&self) -> usize {
        let mut flushed = 0;
        for object in self.registry.objects() {
            match object.write() {
                Ok(mut object) => {
                    if object.send_property_change() {
                        flushed += 1;
                    }
                }
                Err(_) => warn!("Skipping flush of an inaccessible object"),
            };
        }
        flushed
    }

    /// Start polling a site adapter with the configured interval
    pub fn start_adapter(&self, adapter: Box<dyn SiteAdapter>) -> std::io::Result<()> {
        let name = adapter.name().to_string();
        let task = PollTask::spawn(
            adapter,
            self.config.poll_interval(),
            self.token.clone(),
            Some(self.signals.clone()),
        )?;
        debug!("Poll task for {} started", name);

        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| {
            warn!("Task list poisoned, recovering it for {}", name);
            poisoned.into_inner()
        });
        tasks.push(task);
        Ok(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop all poll tasks and tear down the registry
    pub fn shutdown(&self) {
        if self.token.is_cancelled() && self.registry.is_empty() {
            return;
        }
        info!("Shutting down bridge");
        self.token.cancel();

        let tasks: Vec<PollTask> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for mut task in tasks {
            if let Some(cycles) = task.join() {
                debug!("Poll task {} ran {} cycles", task.name(), cycles);
            }
        }

        self.registry.clear();
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
