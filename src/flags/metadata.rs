use std::collections::BTreeMap;

use super::FlagName;

/// Per-flag metadata: the query parameter a flag can be overridden from, and
/// whether an overridden value is reported back to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagMetadata {
    pub query_param: Option<&'static str>,
    pub send_to_server: bool,
}

pub type FlagMetadataMap = BTreeMap<FlagName, FlagMetadata>;

pub fn default_metadata() -> FlagMetadataMap {
    FlagMetadataMap::from([
        (
            FlagName::EnabledExperimentalPlugins,
            FlagMetadata {
                query_param: Some("experimentalPlugin"),
                send_to_server: false,
            },
        ),
        (
            FlagName::InHostedNotebook,
            FlagMetadata {
                query_param: None,
                send_to_server: false,
            },
        ),
        (
            FlagName::ForceSvg,
            FlagMetadata {
                query_param: Some("forceSVG"),
                send_to_server: false,
            },
        ),
        (
            FlagName::ScalarsBatchSize,
            FlagMetadata {
                query_param: Some("scalarsBatchSize"),
                send_to_server: true,
            },
        ),
        (
            FlagName::AllowAutoDarkMode,
            FlagMetadata {
                query_param: Some("darkMode"),
                send_to_server: false,
            },
        ),
        (
            FlagName::ShowSettings,
            FlagMetadata {
                query_param: Some("showFlags"),
                send_to_server: false,
            },
        ),
    ])
}
