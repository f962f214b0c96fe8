mod metadata;
pub use metadata::{FlagMetadata, FlagMetadataMap, default_metadata};

use serde::{Deserialize, Serialize};

/// The fully resolved feature-flag set, as seen by the rest of the
/// application: defaults, then data-source-loaded values, then user
/// overrides.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureFlags {
    pub enabled_experimental_plugins: Vec<String>,
    pub in_hosted_notebook: bool,
    pub force_svg: bool,
    pub scalars_batch_size: Option<u64>,
    pub allow_auto_dark_mode: bool,
    pub show_settings: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enabled_experimental_plugins: Vec::new(),
            in_hosted_notebook: false,
            force_svg: false,
            scalars_batch_size: None,
            allow_auto_dark_mode: true,
            show_settings: false,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FlagName {
    EnabledExperimentalPlugins,
    InHostedNotebook,
    ForceSvg,
    ScalarsBatchSize,
    AllowAutoDarkMode,
    ShowSettings,
}

impl FlagName {
    pub const ALL: [FlagName; 6] = [
        FlagName::EnabledExperimentalPlugins,
        FlagName::InHostedNotebook,
        FlagName::ForceSvg,
        FlagName::ScalarsBatchSize,
        FlagName::AllowAutoDarkMode,
        FlagName::ShowSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagName::EnabledExperimentalPlugins => "enabledExperimentalPlugins",
            FlagName::InHostedNotebook => "inHostedNotebook",
            FlagName::ForceSvg => "forceSvg",
            FlagName::ScalarsBatchSize => "scalarsBatchSize",
            FlagName::AllowAutoDarkMode => "allowAutoDarkMode",
            FlagName::ShowSettings => "showSettings",
        }
    }
}

impl std::fmt::Display for FlagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial view of [`FeatureFlags`]: incremental loads and user overrides
/// both arrive in this shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_experimental_plugins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_hosted_notebook: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_svg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalars_batch_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_dark_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_settings: Option<bool>,
}

impl FlagOverrides {
    /// Write every set field on top of `flags`.
    pub fn apply_to(&self, flags: &mut FeatureFlags) {
        if let Some(v) = &self.enabled_experimental_plugins {
            flags.enabled_experimental_plugins = v.clone();
        }
        if let Some(v) = self.in_hosted_notebook {
            flags.in_hosted_notebook = v;
        }
        if let Some(v) = self.force_svg {
            flags.force_svg = v;
        }
        if let Some(v) = self.scalars_batch_size {
            flags.scalars_batch_size = Some(v);
        }
        if let Some(v) = self.allow_auto_dark_mode {
            flags.allow_auto_dark_mode = v;
        }
        if let Some(v) = self.show_settings {
            flags.show_settings = v;
        }
    }

    /// Merge `other` into `self`; fields set on `other` win.
    pub fn merge_from(&mut self, other: &FlagOverrides) {
        if other.enabled_experimental_plugins.is_some() {
            self.enabled_experimental_plugins = other.enabled_experimental_plugins.clone();
        }
        if other.in_hosted_notebook.is_some() {
            self.in_hosted_notebook = other.in_hosted_notebook;
        }
        if other.force_svg.is_some() {
            self.force_svg = other.force_svg;
        }
        if other.scalars_batch_size.is_some() {
            self.scalars_batch_size = other.scalars_batch_size;
        }
        if other.allow_auto_dark_mode.is_some() {
            self.allow_auto_dark_mode = other.allow_auto_dark_mode;
        }
        if other.show_settings.is_some() {
            self.show_settings = other.show_settings;
        }
    }

    pub fn clear(&mut self, flag: FlagName) {
        match flag {
            FlagName::EnabledExperimentalPlugins => self.enabled_experimental_plugins = None,
            FlagName::InHostedNotebook => self.in_hosted_notebook = None,
            FlagName::ForceSvg => self.force_svg = None,
            FlagName::ScalarsBatchSize => self.scalars_batch_size = None,
            FlagName::AllowAutoDarkMode => self.allow_auto_dark_mode = None,
            FlagName::ShowSettings => self.show_settings = None,
        }
    }

    pub fn is_set(&self, flag: FlagName) -> bool {
        match flag {
            FlagName::EnabledExperimentalPlugins => self.enabled_experimental_plugins.is_some(),
            FlagName::InHostedNotebook => self.in_hosted_notebook.is_some(),
            FlagName::ForceSvg => self.force_svg.is_some(),
            FlagName::ScalarsBatchSize => self.scalars_batch_size.is_some(),
            FlagName::AllowAutoDarkMode => self.allow_auto_dark_mode.is_some(),
            FlagName::ShowSettings => self.show_settings.is_some(),
        }
    }

    pub fn names(&self) -> Vec<FlagName> {
        FlagName::ALL
            .into_iter()
            .filter(|name| self.is_set(*name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    /// Keep only the fields whose metadata marks them as server-reportable.
    pub fn retain_send_to_server(mut self, metadata: &FlagMetadataMap) -> FlagOverrides {
        for name in FlagName::ALL {
            let reportable = metadata.get(&name).is_some_and(|m| m.send_to_server);
            if !reportable {
                self.clear(name);
            }
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overrides_win_over_loaded_values() {
        let mut flags = FeatureFlags::default();

        let loaded = FlagOverrides {
            in_hosted_notebook: Some(false),
            force_svg: Some(true),
            ..Default::default()
        };
        let overrides = FlagOverrides {
            in_hosted_notebook: Some(true),
            ..Default::default()
        };

        loaded.apply_to(&mut flags);
        overrides.apply_to(&mut flags);

        assert!(flags.in_hosted_notebook);
        assert!(flags.force_svg);
    }

    #[test]
    fn merge_from_prefers_other() {
        let mut base = FlagOverrides {
            scalars_batch_size: Some(5),
            show_settings: Some(false),
            ..Default::default()
        };
        base.merge_from(&FlagOverrides {
            scalars_batch_size: Some(10),
            ..Default::default()
        });

        assert_eq!(base.scalars_batch_size, Some(10));
        assert_eq!(base.show_settings, Some(false));
    }

    #[test]
    fn server_subset_is_filtered_by_metadata() {
        let overrides = FlagOverrides {
            in_hosted_notebook: Some(true),
            scalars_batch_size: Some(10),
            ..Default::default()
        };

        let subset = overrides.retain_send_to_server(&default_metadata());

        assert_eq!(
            subset,
            FlagOverrides {
                scalars_batch_size: Some(10),
                ..Default::default()
            }
        );
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let overrides = FlagOverrides {
            force_svg: Some(true),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_string(&overrides).unwrap(),
            r#"{"forceSvg":true}"#
        );
    }
}
