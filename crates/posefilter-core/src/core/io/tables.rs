//! Tabular toolkit results consumed in place of a live toolkit session.
//!
//! Two CSV layouts are supported:
//!
//! - **RMSD table** (`index,rmsd`): one row per container record; an empty `rmsd`
//!   marks a record the query pattern did not match.
//! - **Interaction table** (`index,pose,residue,interaction`): one row per perceived
//!   interaction, where `index` identifies the pose within its container. A row with
//!   empty `residue` and `interaction` records a pose with no interactions at all.

use crate::core::models::pose::PoseRecord;
use crate::core::toolkit::{
    HBondDirection, InteractionClass, InteractionHint, PerceivedPose, RmsdSource, ToolkitError,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

#[derive(Debug, Deserialize)]
struct RmsdRow {
    index: usize,
    rmsd: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum InteractionName {
    SaltBridge,
    HbondDonor,
    HbondAcceptor,
    PiStacking,
    CationPi,
    HalogenBond,
}

impl From<InteractionName> for InteractionClass {
    fn from(name: InteractionName) -> Self {
        match name {
            InteractionName::SaltBridge => InteractionClass::SaltBridge,
            InteractionName::HbondDonor => {
                InteractionClass::HydrogenBond(HBondDirection::LigandDonates)
            }
            InteractionName::HbondAcceptor => {
                InteractionClass::HydrogenBond(HBondDirection::LigandAccepts)
            }
            InteractionName::PiStacking => InteractionClass::PiStacking,
            InteractionName::CationPi => InteractionClass::CationPi,
            InteractionName::HalogenBond => InteractionClass::HalogenBond,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    index: usize,
    pose: String,
    residue: Option<i32>,
    interaction: Option<InteractionName>,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn open(path: &Path) -> Result<std::fs::File, TableError> {
    std::fs::File::open(path).map_err(|e| TableError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Per-record RMSD values keyed by `sequence_index`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RmsdTable {
    values: HashMap<usize, Option<f64>>,
}

impl RmsdTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut values = HashMap::new();
        for (row, result) in csv_reader(reader).deserialize::<RmsdRow>().enumerate() {
            let record = result?;
            if values.insert(record.index, record.rmsd).is_some() {
                return Err(TableError::InvalidRow {
                    row: row + 1,
                    message: format!("duplicate record index {}", record.index),
                });
            }
        }
        Ok(Self { values })
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        Self::from_reader(open(path)?)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl RmsdSource for RmsdTable {
    fn rmsd(&mut self, record: &PoseRecord) -> Result<Option<f64>, ToolkitError> {
        match self.values.get(&record.sequence_index) {
            Some(value) => Ok(*value),
            None => {
                debug!(
                    index = record.sequence_index,
                    "No RMSD row for record; treating it as a pattern mismatch."
                );
                Ok(None)
            }
        }
    }
}

/// Reads perceived interactions grouped per pose `index`, in order of first appearance.
///
/// Rows of different poses are never merged, even when the poses share a title. Pose
/// titles are cut at the first whitespace.
pub fn read_interaction_table<R: Read>(reader: R) -> Result<Vec<PerceivedPose>, TableError> {
    let mut poses: Vec<PerceivedPose> = Vec::new();
    let mut positions: HashMap<usize, usize> = HashMap::new();

    for (row, result) in csv_reader(reader)
        .deserialize::<InteractionRow>()
        .enumerate()
    {
        let record = result?;
        let title = record
            .pose
            .split_whitespace()
            .next()
            .ok_or_else(|| TableError::InvalidRow {
                row: row + 1,
                message: "empty pose title".to_string(),
            })?
            .to_string();

        let position = match positions.get(&record.index) {
            Some(&position) => {
                if poses[position].title != title {
                    return Err(TableError::InvalidRow {
                        row: row + 1,
                        message: format!(
                            "pose {} is titled both '{}' and '{}'",
                            record.index, poses[position].title, title
                        ),
                    });
                }
                position
            }
            None => {
                positions.insert(record.index, poses.len());
                poses.push(PerceivedPose {
                    sequence_index: record.index,
                    title,
                    hints: Vec::new(),
                });
                poses.len() - 1
            }
        };

        match (record.residue, record.interaction) {
            (Some(residue), Some(name)) => poses[position]
                .hints
                .push(InteractionHint::new(residue, name.into())),
            (None, None) => {}
            _ => {
                return Err(TableError::InvalidRow {
                    row: row + 1,
                    message: "residue and interaction must both be present or both be empty"
                        .to_string(),
                });
            }
        }
    }
    Ok(poses)
}

pub fn read_interaction_table_from_path(path: &Path) -> Result<Vec<PerceivedPose>, TableError> {
    read_interaction_table(open(path)?)
}
