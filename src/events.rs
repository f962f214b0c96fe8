use crate::flags::{FlagName, FlagOverrides};

/// Events flowing through the store. Each is reduced into store state first
/// and then broadcast to the effect actors.
#[derive(Clone, Debug, PartialEq)]
pub enum FlagEvent {
    /// An incremental flag load completed. Emitted exactly once per data
    /// source fetch; the payload may be a strict subset of the flag set.
    PartialFlagsLoaded { flags: FlagOverrides },

    /// The user changed one or more flag overrides.
    OverrideChanged { flags: FlagOverrides },

    /// The named overrides should be cleared back to their defaults.
    OverridesReset { flags: Vec<FlagName> },

    /// Every override should be cleared.
    AllOverridesReset,
}
