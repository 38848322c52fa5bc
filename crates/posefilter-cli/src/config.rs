mod defaults;

use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use posefilter::core::io::container::ContainerFormat;
use posefilter::engine::config::{SelectionConfig, SelectionConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialContainerConfig {
    delimiter: Option<String>,
    name_label: Option<String>,
    energy_label: Option<String>,
    block_start_marker: Option<String>,
    fixed_content_marker: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSelectionConfig {
    rmsd_threshold: Option<f64>,
}

/// Settings read from the optional TOML file and `-S` overrides. Missing values fall
/// back to built-in defaults when the final configuration is produced.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    container: Option<PartialContainerConfig>,
    selection: Option<PartialSelectionConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn container_format(&self) -> ContainerFormat {
        let defaults = DefaultsConfig::default().container;
        let file = self.container.clone().unwrap_or_default();
        ContainerFormat {
            delimiter: file.delimiter.unwrap_or(defaults.delimiter),
            name_label: file.name_label.unwrap_or(defaults.name_label),
            energy_label: file.energy_label.unwrap_or(defaults.energy_label),
            block_start_marker: file
                .block_start_marker
                .unwrap_or(defaults.block_start_marker),
            fixed_content_marker: file
                .fixed_content_marker
                .unwrap_or(defaults.fixed_content_marker),
        }
    }

    /// Produces the selection settings; `cli_threshold` wins over the file value.
    pub fn selection_config(&self, cli_threshold: Option<f64>) -> Result<SelectionConfig> {
        let threshold = cli_threshold
            .or(self.selection.as_ref().and_then(|s| s.rmsd_threshold))
            .unwrap_or(DefaultsConfig::default().rmsd_threshold);

        SelectionConfigBuilder::new()
            .rmsd_threshold(threshold)
            .format(self.container_format())
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "container.delimiter" => {
                    self.container.get_or_insert_with(Default::default).delimiter =
                        Some(value_str.to_string());
                }
                "container.name-label" => {
                    self.container.get_or_insert_with(Default::default).name_label =
                        Some(value_str.to_string());
                }
                "container.energy-label" => {
                    self.container.get_or_insert_with(Default::default).energy_label =
                        Some(value_str.to_string());
                }
                "container.block-start-marker" => {
                    self.container
                        .get_or_insert_with(Default::default)
                        .block_start_marker = Some(value_str.to_string());
                }
                "container.fixed-content-marker" => {
                    self.container
                        .get_or_insert_with(Default::default)
                        .fixed_content_marker = Some(value_str.to_string());
                }
                "selection.rmsd-threshold" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .rmsd_threshold = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
            debug!(key, value = value_str, "Applied configuration override.");
        }
        Ok(())
    }
}
