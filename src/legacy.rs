use crate::flags::{FeatureFlags, FlagOverrides};

/// The bridge to a non-reactive UI widget that has to be updated with an
/// imperative call. It always receives the store's resolved values, never a
/// raw event payload.
pub trait LegacyWidget: Send + Sync + 'static {
    fn set_flags(&self, flags: &FeatureFlags, server_flags: &FlagOverrides);
}

/// A widget bridge that goes nowhere, for deployments without the legacy
/// surface.
#[derive(Default)]
pub struct Disconnected;

impl LegacyWidget for Disconnected {
    fn set_flags(&self, _flags: &FeatureFlags, _server_flags: &FlagOverrides) {}
}
