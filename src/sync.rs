use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::oneshot::channel as oneshot;

use crate::events::FlagEvent;
use crate::flags::{FeatureFlags, FlagOverrides};
use crate::force_svg::ForceSvgSource;
use crate::legacy::LegacyWidget;
use crate::source::FlagDataSource;
use crate::store::StoreSignal;

#[derive(Error, Debug)]
pub(crate) enum SyncError {
    #[error(transparent)]
    StoreSend(#[from] mpsc::error::SendError<StoreSignal>),

    #[error(transparent)]
    SelectorRecv(#[from] tokio::sync::oneshot::error::RecvError),
}

/// Synchronizes the flag data source, the force-SVG source, and the legacy
/// widget with the store. Data source failures are logged and swallowed;
/// they never surface as events.
pub(crate) struct FlagSync<D: FlagDataSource, F: ForceSvgSource, W: LegacyWidget> {
    data_source: D,
    force_svg: F,
    widget: W,
    events: broadcast::Receiver<FlagEvent>,
    store: mpsc::Sender<StoreSignal>,
}

impl<D: FlagDataSource, F: ForceSvgSource, W: LegacyWidget> FlagSync<D, F, W> {
    pub(crate) fn new(
        data_source: D,
        force_svg: F,
        widget: W,
        events: broadcast::Receiver<FlagEvent>,
        store: mpsc::Sender<StoreSignal>,
    ) -> Self {
        Self {
            data_source,
            force_svg,
            widget,
            events,
            store,
        }
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub(crate) async fn execute(mut self) -> Result<(), SyncError> {
        self.load_initial_flags().await?;

        loop {
            match self.events.recv().await {
                Ok(event) => self.handle_event(event).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Flag sync fell behind the event stream");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Store hung up, shutting down the flag sync");

                    return Ok(());
                }
            }
        }
    }

    /// Fetch the persisted flags once, reconcile the force-SVG flag with its
    /// dedicated source, and dispatch exactly one partial-load event.
    async fn load_initial_flags(&mut self) -> Result<(), SyncError> {
        let mut flags = self
            .data_source
            .fetch_flags()
            .await
            .inspect_err(|e| tracing::debug!(%e, "Fetching flags from the data source failed"))
            .unwrap_or_default();

        // The fetched value wins when present; otherwise the dedicated
        // source is authoritative. Exactly one of the two happens.
        match flags.force_svg {
            Some(value) => self.force_svg.set_flag(value),
            None => flags.force_svg = Some(self.force_svg.get_flag()),
        }

        self.store
            .send(StoreSignal::Dispatch(FlagEvent::PartialFlagsLoaded {
                flags,
            }))
            .await?;

        Ok(())
    }

    async fn handle_event(&mut self, event: FlagEvent) -> Result<(), SyncError> {
        match event {
            FlagEvent::PartialFlagsLoaded { .. } => {
                self.update_legacy_widget().await?;
            }
            FlagEvent::OverrideChanged { flags } => {
                if let Err(e) = self.data_source.persist_overrides(flags).await {
                    tracing::debug!(%e, "Persisting flag overrides failed");
                }
            }
            FlagEvent::OverridesReset { flags } => {
                for flag in flags {
                    if let Err(e) = self.data_source.reset_override(flag).await {
                        tracing::debug!(%flag, %e, "Resetting a flag override failed");
                    }
                }
            }
            FlagEvent::AllOverridesReset => {
                if let Err(e) = self.data_source.reset_all_overrides().await {
                    tracing::debug!(%e, "Resetting all flag overrides failed");
                }
            }
        }

        Ok(())
    }

    /// Push the store-resolved flags into the legacy widget. The event
    /// payload is deliberately not used: an in-flight partial load can carry
    /// stale values for fields the store already knows.
    async fn update_legacy_widget(&mut self) -> Result<(), SyncError> {
        let flags = self.select_flags().await?;
        let server_flags = self.select_server_flags().await?;

        self.widget.set_flags(&flags, &server_flags);

        Ok(())
    }

    async fn select_flags(&self) -> Result<FeatureFlags, SyncError> {
        let (tx, rx) = oneshot();
        self.store.send(StoreSignal::GetFlags(tx)).await?;
        Ok(rx.await?)
    }

    async fn select_server_flags(&self) -> Result<FlagOverrides, SyncError> {
        let (tx, rx) = oneshot();
        self.store.send(StoreSignal::GetServerFlags(tx)).await?;
        Ok(rx.await?)
    }
}
