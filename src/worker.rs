use tokio::sync::broadcast;
use tokio::sync::mpsc::channel;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::Handle;
use crate::dialog::{DialogHost, PageReloader};
use crate::flags::{FeatureFlags, FlagMetadataMap};
use crate::force_svg::ForceSvgSource;
use crate::legacy::LegacyWidget;
use crate::modal::{ModalError, ModalTrigger};
use crate::source::FlagDataSource;
use crate::store::{Store, StoreError};
use crate::sync::{FlagSync, SyncError};

pub struct Worker {
    store_task: JoinHandle<Result<(), StoreError>>,
    sync_task: JoinHandle<Result<(), SyncError>>,
    modal_task: JoinHandle<Result<(), ModalError>>,
}

impl Worker {
    #[cfg_attr(
        feature = "tracing-instrument",
        tracing::instrument(skip(
            defaults,
            metadata,
            data_source,
            force_svg,
            widget,
            dialog,
            reloader
        ))
    )]
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new<
        D: FlagDataSource,
        F: ForceSvgSource,
        W: LegacyWidget,
        H: DialogHost,
        R: PageReloader,
    >(
        defaults: FeatureFlags,
        metadata: FlagMetadataMap,
        event_capacity: usize,
        data_source: D,
        force_svg: F,
        widget: W,
        dialog: H,
        reloader: R,
    ) -> (Handle, Worker) {
        // Message flow:
        //
        // Handle ------------> Store --broadcast--> FlagSync
        //                        ^              `--> ModalTrigger
        //                        |                        |
        //                        `--- internal channel ---'

        let (to_store, incoming) = channel(1000);
        let (to_store_internal, internal) = channel(1000);
        let (event_tx, _) = broadcast::channel(event_capacity);

        // Both actors subscribe before the store can dispatch anything, so
        // the initial partial-load event is never missed.
        let sync_events = event_tx.subscribe();
        let modal_events = event_tx.subscribe();

        let store = Store::new(defaults, metadata, incoming, internal, event_tx);
        let sync = FlagSync::new(
            data_source,
            force_svg,
            widget,
            sync_events,
            to_store_internal.clone(),
        );
        let modal = ModalTrigger::new(dialog, reloader, modal_events, to_store_internal);

        let handle = Handle::new(to_store);

        let span = tracing::debug_span!("spawned worker");

        let store_task = tokio::spawn(store.execute().instrument(span.clone()));
        let sync_task = tokio::spawn(sync.execute().instrument(span.clone()));
        let modal_task = tokio::spawn(modal.execute().instrument(span));

        let worker = Self {
            store_task,
            sync_task,
            modal_task,
        };

        (handle, worker)
    }

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
    pub async fn wait(self) {
        // Note these three tasks have to shut down in this order.
        //
        // They are all tokio::spawn'd, so they are all executing in the
        // background, without needing to be awaited.
        //
        // The Store won't shut down while any Handles are still out there.
        // The FlagSync and ModalTrigger tasks won't shut down until the
        // Store drops the event broadcaster.
        if let Err(e) = self.store_task.await {
            tracing::trace!(%e, "The flag store task ended with an error");
        }

        if let Err(e) = self.sync_task.await {
            tracing::trace!(%e, "The flag sync task ended with an error");
        }

        if let Err(e) = self.modal_task.await {
            tracing::trace!(%e, "The modal trigger task ended with an error");
        }
    }
}
