use crate::dialog::{DialogHost, PageReloader};
use crate::flags::{FeatureFlags, FlagMetadataMap, default_metadata};
use crate::force_svg::ForceSvgSource;
use crate::legacy::LegacyWidget;
use crate::source::FlagDataSource;
use crate::{Handle, Worker};

pub struct Builder {
    defaults: FeatureFlags,
    metadata: FlagMetadataMap,
    event_capacity: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            defaults: FeatureFlags::default(),
            metadata: default_metadata(),
            event_capacity: 64,
        }
    }

    /// Replace the built-in flag defaults.
    pub fn set_defaults(mut self, defaults: FeatureFlags) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the per-flag metadata map.
    pub fn set_metadata(mut self, metadata: FlagMetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// Capacity of the broadcast event stream. Effects that lag further
    /// than this behind the store will drop events.
    pub fn set_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    /// Wire the store and effect actors to the given collaborators and
    /// spawn them. Must be called from within a tokio runtime.
    #[cfg_attr(
        feature = "tracing-instrument",
        tracing::instrument(skip(self, data_source, force_svg, widget, dialog, reloader))
    )]
    pub fn build_with<
        D: FlagDataSource,
        F: ForceSvgSource,
        W: LegacyWidget,
        H: DialogHost,
        R: PageReloader,
    >(
        self,
        data_source: D,
        force_svg: F,
        widget: W,
        dialog: H,
        reloader: R,
    ) -> (Handle, Worker) {
        Worker::new(
            self.defaults,
            self.metadata,
            self.event_capacity,
            data_source,
            force_svg,
            widget,
            dialog,
            reloader,
        )
    }
}
