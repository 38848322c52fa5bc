use crate::core::io::container::ContainerFormat;
use std::collections::HashSet;
use thiserror::Error;

/// Default RMSD acceptance threshold in Angstrom.
pub const DEFAULT_RMSD_THRESHOLD: f64 = 2.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Poses farther than this from the reference are never candidates.
    pub rmsd_threshold: f64,
    pub format: ContainerFormat,
}

#[derive(Default)]
pub struct SelectionConfigBuilder {
    rmsd_threshold: Option<f64>,
    format: Option<ContainerFormat>,
}

impl SelectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rmsd_threshold(mut self, threshold: f64) -> Self {
        self.rmsd_threshold = Some(threshold);
        self
    }
    pub fn format(mut self, format: ContainerFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn build(self) -> Result<SelectionConfig, ConfigError> {
        let rmsd_threshold = self
            .rmsd_threshold
            .ok_or(ConfigError::MissingParameter("rmsd_threshold"))?;
        if !rmsd_threshold.is_finite() || rmsd_threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "rmsd_threshold",
                reason: format!("expected a finite, non-negative distance, got {}", rmsd_threshold),
            });
        }
        Ok(SelectionConfig {
            rmsd_threshold,
            format: self.format.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Compound names whose best pose is wanted.
    pub names_of_interest: HashSet<String>,
    pub format: ContainerFormat,
}

#[derive(Default)]
pub struct IndexConfigBuilder {
    names_of_interest: HashSet<String>,
    format: Option<ContainerFormat>,
}

impl IndexConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names_of_interest.insert(name.into());
        self
    }
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names_of_interest
            .extend(names.into_iter().map(Into::into));
        self
    }
    pub fn format(mut self, format: ContainerFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn build(self) -> Result<IndexConfig, ConfigError> {
        if self.names_of_interest.is_empty() {
            return Err(ConfigError::MissingParameter("names_of_interest"));
        }
        Ok(IndexConfig {
            names_of_interest: self.names_of_interest,
            format: self.format.unwrap_or_default(),
        })
    }
}

/// Settings of the parallel substructure screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenConfig {
    /// Molecules heavier than this are skipped before matching.
    pub max_weight: Option<f64>,
    /// Keep molecules that do *not* match.
    pub reverse: bool,
    /// Worker count; `None` uses one worker per logical core.
    pub threads: Option<usize>,
}
