mod generic;
pub use generic::Generic;

mod json_file;
pub use json_file::JsonFile;

use crate::flags::{FlagName, FlagOverrides};

/// The persistence backend for feature flags. `fetch_flags` is called once
/// at startup; the persist/reset operations mirror the override lifecycle.
pub trait FlagDataSource: Send + Sync + 'static {
    type Error: std::fmt::Debug + std::fmt::Display;

    fn fetch_flags(
        &self,
    ) -> impl std::future::Future<Output = Result<FlagOverrides, Self::Error>> + Send;

    fn persist_overrides(
        &mut self,
        overrides: FlagOverrides,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

    fn reset_override(
        &mut self,
        flag: FlagName,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

    fn reset_all_overrides(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}
