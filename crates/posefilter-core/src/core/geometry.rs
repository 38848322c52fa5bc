use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GeometryError {
    #[error("Cannot compute RMSD over an empty atom mapping")]
    Empty,
    #[error("Atom mapping length mismatch: reference has {reference} atoms, candidate has {candidate}")]
    LengthMismatch { reference: usize, candidate: usize },
}

/// Root-mean-square deviation between two matched coordinate sets.
///
/// Pairs are taken in order; the coordinates are compared in place, without any
/// superposition.
pub fn rmsd(reference: &[Point3<f64>], candidate: &[Point3<f64>]) -> Result<f64, GeometryError> {
    if reference.is_empty() {
        return Err(GeometryError::Empty);
    }
    if reference.len() != candidate.len() {
        return Err(GeometryError::LengthMismatch {
            reference: reference.len(),
            candidate: candidate.len(),
        });
    }

    let sum_sq: f64 = reference
        .iter()
        .zip(candidate)
        .map(|(r, c)| nalgebra::distance_squared(r, c))
        .sum();

    Ok((sum_sq / reference.len() as f64).sqrt())
}
