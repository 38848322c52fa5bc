//! # Workflows Module
//!
//! End-to-end procedures built from the scanners in [`crate::engine`]. Each workflow
//! owns its I/O handles for the duration of one call and reports progress through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! - **Best pose** ([`best_pose`]) - RMSD acceptance plus energy ranking over a pose
//!   container, followed by verbatim extraction of the selected records.
//! - **Interaction** ([`interaction`]) - Constraint filtering of perceived interactions
//!   and best-header retrieval for a list of compound names.
//! - **Screen** ([`screen`]) - Substructure screen of a molecule set on a worker pool.

pub mod best_pose;
pub mod interaction;
pub mod screen;
