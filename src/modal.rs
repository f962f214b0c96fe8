use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::oneshot::channel as oneshot;

use crate::dialog::{DialogHandle, DialogHost, PageReloader};
use crate::events::FlagEvent;
use crate::flags::FlagName;
use crate::store::StoreSignal;

/// How long to wait after a dialog closes before reloading. The delay lets
/// the show-settings reset reach persisted state before the reload destroys
/// in-memory state.
const RELOAD_DELAY: Duration = Duration::from_millis(1);

#[derive(Error, Debug)]
pub(crate) enum ModalError {
    #[error(transparent)]
    StoreSend(#[from] mpsc::error::SendError<StoreSignal>),

    #[error(transparent)]
    SelectorRecv(#[from] tokio::sync::oneshot::error::RecvError),
}

/// Observes the show-settings flag and drives the settings dialog
/// lifecycle. While a dialog is open this actor awaits its close future and
/// processes no further events, so a second dialog can never be presented on
/// top of the first.
pub(crate) struct ModalTrigger<H: DialogHost, R: PageReloader> {
    dialog: H,
    reloader: Arc<R>,
    events: broadcast::Receiver<FlagEvent>,
    store: mpsc::Sender<StoreSignal>,
}

impl<H: DialogHost, R: PageReloader> ModalTrigger<H, R> {
    pub(crate) fn new(
        dialog: H,
        reloader: R,
        events: broadcast::Receiver<FlagEvent>,
        store: mpsc::Sender<StoreSignal>,
    ) -> Self {
        Self {
            dialog,
            reloader: Arc::new(reloader),
            events,
            store,
        }
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub(crate) async fn execute(mut self) -> Result<(), ModalError> {
        if self.show_settings_enabled().await? {
            self.run_dialog().await?;
        }

        loop {
            match self.events.recv().await {
                Ok(_) => {
                    if self.show_settings_enabled().await? {
                        self.run_dialog().await?;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Modal trigger fell behind the event stream");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Store hung up, shutting down the modal trigger");

                    return Ok(());
                }
            }
        }
    }

    /// Present one dialog, wait for the user to dismiss it, reset the
    /// show-settings flag, and schedule the reload.
    async fn run_dialog(&mut self) -> Result<(), ModalError> {
        let handle = self.dialog.open();

        handle.closed().await;

        self.store
            .send(StoreSignal::Dispatch(FlagEvent::OverridesReset {
                flags: vec![FlagName::ShowSettings],
            }))
            .await?;

        // The selector round-trip goes through the same ordered channel as
        // the reset, so once it answers the reset has been reduced and
        // buffered events can no longer observe the flag as set.
        if self.show_settings_enabled().await? {
            tracing::warn!("The show-settings flag is still set after its override was reset");
        }

        let reloader = Arc::clone(&self.reloader);
        tokio::spawn(async move {
            tokio::time::sleep(RELOAD_DELAY).await;
            reloader.reload();
        });

        Ok(())
    }

    async fn show_settings_enabled(&self) -> Result<bool, ModalError> {
        let (tx, rx) = oneshot();
        self.store.send(StoreSignal::GetShowSettings(tx)).await?;
        Ok(rx.await?)
    }
}
