use crate::core::geometry::{self, GeometryError};
use crate::core::models::pose::PoseRecord;
use nalgebra::Point3;
use std::fmt;
use thiserror::Error;

/// Failures reported by the external modeling toolkit.
///
/// These are boundary failures: no partial result is meaningful without a valid
/// protein, reference or query pattern, so callers treat them as fatal to the run.
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Unable to read structure from '{path}': {message}")]
    Structure { path: String, message: String },
    #[error("Unable to parse pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("Cannot initialize interaction site: {0}")]
    ActiveSite(String),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Toolkit failure: {0}")]
    Other(String),
}

/// Direction of an intermolecular hydrogen bond, seen from the ligand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HBondDirection {
    LigandDonates,
    LigandAccepts,
}

/// The class of one perceived protein-ligand interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionClass {
    SaltBridge,
    HydrogenBond(HBondDirection),
    PiStacking,
    CationPi,
    HalogenBond,
}

impl fmt::Display for InteractionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionClass::SaltBridge => "salt-bridge",
            InteractionClass::HydrogenBond(HBondDirection::LigandDonates) => "hbond-donor",
            InteractionClass::HydrogenBond(HBondDirection::LigandAccepts) => "hbond-acceptor",
            InteractionClass::PiStacking => "pi-stacking",
            InteractionClass::CationPi => "cation-pi",
            InteractionClass::HalogenBond => "halogen-bond",
        };
        f.write_str(name)
    }
}

/// One interaction perceived between a protein residue and a candidate pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionHint {
    pub residue_number: i32,
    pub class: InteractionClass,
}

impl InteractionHint {
    pub fn new(residue_number: i32, class: InteractionClass) -> Self {
        Self {
            residue_number,
            class,
        }
    }
}

/// All interactions perceived for one pose.
///
/// Several poses may share a title; `sequence_index` tells them apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerceivedPose {
    pub sequence_index: usize,
    pub title: String,
    pub hints: Vec<InteractionHint>,
}

/// Substructure matching against one pose of the comparison container.
pub trait PatternMatcher {
    /// Coordinates of the atoms mapped by the first pattern match, in mapping order.
    ///
    /// Returns `Ok(None)` when the pattern does not match the pose.
    fn matched_coordinates(
        &mut self,
        record: &PoseRecord,
    ) -> Result<Option<Vec<Point3<f64>>>, ToolkitError>;
}

/// Per-record distance to the reference structure.
pub trait RmsdSource {
    /// Returns `Ok(None)` when the query pattern does not match the pose.
    fn rmsd(&mut self, record: &PoseRecord) -> Result<Option<f64>, ToolkitError>;
}

/// An [`RmsdSource`] computed from pattern-matched coordinates against a fixed
/// reference subset.
pub struct MatchedRmsd<M> {
    reference: Vec<Point3<f64>>,
    matcher: M,
}

impl<M: PatternMatcher> MatchedRmsd<M> {
    pub fn new(reference: Vec<Point3<f64>>, matcher: M) -> Self {
        Self { reference, matcher }
    }
}

impl<M: PatternMatcher> RmsdSource for MatchedRmsd<M> {
    fn rmsd(&mut self, record: &PoseRecord) -> Result<Option<f64>, ToolkitError> {
        match self.matcher.matched_coordinates(record)? {
            Some(coords) => Ok(Some(geometry::rmsd(&self.reference, &coords)?)),
            None => Ok(None),
        }
    }
}

/// Substructure query used by the parallel screen.
pub trait SubstructureQuery: Sync {
    type Molecule: Send;

    /// Prepares a molecule for matching (e.g. adding explicit hydrogens).
    fn prepare(&self, _molecule: &mut Self::Molecule) {}

    fn matches(&self, molecule: &Self::Molecule) -> bool;

    fn molecular_weight(&self, molecule: &Self::Molecule) -> f64;
}
