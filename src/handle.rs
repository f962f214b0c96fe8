use tokio::sync::broadcast;
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::Sender as OneshotSender;
use tokio::sync::oneshot::channel as oneshot;

use crate::events::FlagEvent;
use crate::flags::{FeatureFlags, FlagMetadataMap, FlagName, FlagOverrides};
use crate::store::{LoadStatus, StoreSignal};

#[derive(thiserror::Error, Debug)]
pub enum HandleError {
    #[error("Timed out waiting for the initial flag load: {0:?}")]
    WaitForLoad(#[from] tokio::time::error::Elapsed),

    #[error("Failed to subscribe to the store for flag events")]
    SubscribeFailed,

    #[error(transparent)]
    Subscription(#[from] tokio::sync::broadcast::error::RecvError),

    #[error("Failed to signal the store: '{0}'")]
    SendToStore(String),

    #[error(transparent)]
    Response(#[from] tokio::sync::oneshot::error::RecvError),
}

/// The client side of the store: dispatches flag events and reads the
/// store's derived views. Cheap to clone; the store shuts down once every
/// handle is dropped.
#[derive(Clone)]
pub struct Handle {
    to_store: Sender<StoreSignal>,
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").finish()
    }
}

impl Handle {
    pub(crate) fn new(to_store: Sender<StoreSignal>) -> Self {
        Self { to_store }
    }

    /// Dispatch a raw event into the store.
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn dispatch(&self, event: FlagEvent) {
        if let Err(e) = self.to_store.send(StoreSignal::Dispatch(event)).await {
            tracing::error!(error = ?e, "Failed to enqueue a flag event");
        }
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn override_flags(&self, flags: FlagOverrides) {
        self.dispatch(FlagEvent::OverrideChanged { flags }).await;
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn reset_overrides(&self, flags: Vec<FlagName>) {
        self.dispatch(FlagEvent::OverridesReset { flags }).await;
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn reset_all_overrides(&self) {
        self.dispatch(FlagEvent::AllOverridesReset).await;
    }

    /// The fully resolved flag set.
    pub async fn flags(&self) -> Option<FeatureFlags> {
        self.select(StoreSignal::GetFlags).await
    }

    /// The partial set loaded from the data source so far.
    pub async fn loaded_flags(&self) -> Option<FlagOverrides> {
        self.select(StoreSignal::GetLoadedFlags).await
    }

    /// The currently active user overrides.
    pub async fn overridden_flags(&self) -> Option<FlagOverrides> {
        self.select(StoreSignal::GetOverriddenFlags).await
    }

    /// The server-reportable subset of loaded values and overrides.
    pub async fn flags_to_send_to_server(&self) -> Option<FlagOverrides> {
        self.select(StoreSignal::GetServerFlags).await
    }

    pub async fn show_settings_enabled(&self) -> Option<bool> {
        self.select(StoreSignal::GetShowSettings).await
    }

    pub async fn auto_dark_mode_allowed(&self) -> Option<bool> {
        self.select(StoreSignal::GetAutoDarkModeAllowed).await
    }

    pub async fn metadata(&self) -> Option<FlagMetadataMap> {
        self.select(StoreSignal::GetMetadata).await
    }

    /// Subscribe to the store's event stream. Events are delivered after
    /// they have been reduced into store state.
    pub async fn subscribe(&self) -> Option<broadcast::Receiver<FlagEvent>> {
        self.select(StoreSignal::Subscribe).await
    }

    /// Wait until the initial flag load has been reduced into the store,
    /// optionally bounded by a timeout.
    pub async fn wait_for_load(
        &self,
        duration: Option<std::time::Duration>,
    ) -> Result<(), HandleError> {
        let subscription = self.subscribe().await;

        let (tx, rx) = oneshot();
        self.to_store
            .send(StoreSignal::QueryLoadStatus(tx))
            .await
            .map_err(|e| HandleError::SendToStore(format!("{e:?}")))?;

        if rx.await? == LoadStatus::Loaded {
            return Ok(());
        }

        let Some(mut subscription) = subscription else {
            return Err(HandleError::SubscribeFailed);
        };

        let loaded = async move {
            loop {
                if let FlagEvent::PartialFlagsLoaded { .. } = subscription.recv().await? {
                    return Ok::<(), broadcast::error::RecvError>(());
                }
            }
        };

        if let Some(duration) = duration {
            Ok(tokio::time::timeout(duration, loaded).await??)
        } else {
            Ok(loaded.await?)
        }
    }

    async fn select<T>(
        &self,
        make_signal: impl FnOnce(OneshotSender<T>) -> StoreSignal,
    ) -> Option<T> {
        let (tx, rx) = oneshot();

        self.to_store
            .send(make_signal(tx))
            .await
            .inspect_err(|e| tracing::trace!(%e, "Error sending the selector request"))
            .ok()?;

        rx.await
            .inspect_err(|e| tracing::trace!(%e, "Error waiting for the selector value"))
            .ok()
    }
}
