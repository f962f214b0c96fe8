mod builder;
pub mod dialog;
mod events;
pub mod flags;
pub mod force_svg;
mod handle;
pub mod legacy;
mod modal;
pub mod source;
mod store;
mod sync;
mod worker;

pub use builder::Builder;
pub use events::FlagEvent;
pub use flags::{FeatureFlags, FlagMetadata, FlagMetadataMap, FlagName, FlagOverrides};
pub use handle::{Handle, HandleError};
pub use worker::Worker;

#[cfg(test)]
mod test;
