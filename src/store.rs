use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::events::FlagEvent;
use crate::flags::{FeatureFlags, FlagMetadataMap, FlagOverrides};

#[derive(Debug)]
pub(crate) enum StoreSignal {
    Dispatch(FlagEvent),
    GetFlags(OneshotSender<FeatureFlags>),
    GetLoadedFlags(OneshotSender<FlagOverrides>),
    GetOverriddenFlags(OneshotSender<FlagOverrides>),
    GetServerFlags(OneshotSender<FlagOverrides>),
    GetShowSettings(OneshotSender<bool>),
    GetAutoDarkModeAllowed(OneshotSender<bool>),
    GetMetadata(OneshotSender<FlagMetadataMap>),
    QueryLoadStatus(OneshotSender<LoadStatus>),
    Subscribe(OneshotSender<broadcast::Receiver<FlagEvent>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadStatus {
    Pending,
    Loaded,
}

#[derive(Error, Debug)]
pub(crate) enum StoreError {
    #[error("Replying with a selector value failed: {0}")]
    Reply(String),
}

/// The central application state: flag defaults, the partial set loaded from
/// the data source, and user overrides. Events are reduced into state before
/// they are broadcast, so effects observing an event always read
/// post-reduction state through the selectors.
pub(crate) struct Store {
    defaults: FeatureFlags,
    loaded: FlagOverrides,
    overrides: FlagOverrides,
    metadata: FlagMetadataMap,
    loaded_once: bool,
    incoming: mpsc::Receiver<StoreSignal>,
    internal: mpsc::Receiver<StoreSignal>,
    events: broadcast::Sender<FlagEvent>,
}

impl Store {
    pub(crate) fn new(
        defaults: FeatureFlags,
        metadata: FlagMetadataMap,
        incoming: mpsc::Receiver<StoreSignal>,
        internal: mpsc::Receiver<StoreSignal>,
        events: broadcast::Sender<FlagEvent>,
    ) -> Self {
        Self {
            defaults,
            loaded: FlagOverrides::default(),
            overrides: FlagOverrides::default(),
            metadata,
            loaded_once: false,
            incoming,
            internal,
            events,
        }
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub(crate) async fn execute(mut self) -> Result<(), StoreError> {
        loop {
            tokio::select! {
                biased;
                signal = self.incoming.recv() => {
                    let Some(signal) = signal else {
                        tracing::debug!("Store clients hung up, shutting down");

                        return Ok(());
                    };

                    self.handle_signal(signal)?;
                },
                signal = self.internal.recv() => {
                    let Some(signal) = signal else {
                        tracing::debug!("Effect actors hung up, shutting down");

                        return Ok(());
                    };

                    self.handle_signal(signal)?;
                },
            };
        }
    }

    fn handle_signal(&mut self, signal: StoreSignal) -> Result<(), StoreError> {
        match signal {
            StoreSignal::Dispatch(event) => {
                self.reduce(&event);

                if let Err(e) = self.events.send(event) {
                    tracing::trace!(%e, "No effect actors are subscribed to flag events");
                }
            }
            StoreSignal::GetFlags(reply) => reply
                .send(self.resolved())
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::GetLoadedFlags(reply) => reply
                .send(self.loaded.clone())
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::GetOverriddenFlags(reply) => reply
                .send(self.overrides.clone())
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::GetServerFlags(reply) => reply
                .send(self.server_flags())
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::GetShowSettings(reply) => reply
                .send(self.resolved().show_settings)
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::GetAutoDarkModeAllowed(reply) => reply
                .send(self.resolved().allow_auto_dark_mode)
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::GetMetadata(reply) => reply
                .send(self.metadata.clone())
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::QueryLoadStatus(reply) => reply
                .send(if self.loaded_once {
                    LoadStatus::Loaded
                } else {
                    LoadStatus::Pending
                })
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
            StoreSignal::Subscribe(reply) => reply
                .send(self.events.subscribe())
                .map_err(|e| StoreError::Reply(format!("{e:?}")))?,
        }

        Ok(())
    }

    fn reduce(&mut self, event: &FlagEvent) {
        match event {
            FlagEvent::PartialFlagsLoaded { flags } => {
                self.loaded.merge_from(flags);
                self.loaded_once = true;
            }
            FlagEvent::OverrideChanged { flags } => {
                self.overrides.merge_from(flags);
            }
            FlagEvent::OverridesReset { flags } => {
                for flag in flags {
                    self.overrides.clear(*flag);
                }
            }
            FlagEvent::AllOverridesReset => {
                self.overrides = FlagOverrides::default();
            }
        }
    }

    fn resolved(&self) -> FeatureFlags {
        let mut flags = self.defaults.clone();
        self.loaded.apply_to(&mut flags);
        self.overrides.apply_to(&mut flags);
        flags
    }

    fn server_flags(&self) -> FlagOverrides {
        let mut merged = self.loaded.clone();
        merged.merge_from(&self.overrides);
        merged.retain_send_to_server(&self.metadata)
    }
}
