//! # Engine Module
//!
//! Single-pass, forward-only scanners over the pose container and the state they fold
//! into.
//!
//! - **Records** ([`records`]) - Assembles classified lines into [`PoseRecord`]s and
//!   extracts selected records verbatim.
//! - **Index** ([`index`]) - The Pose Index Builder: minimum-energy record per compound of
//!   interest, with an auditable early-termination state machine.
//! - **Selector** ([`selector`]) - The Best-Pose Selector: RMSD acceptance combined with
//!   energy ranking.
//! - **Configuration** ([`config`]), **Errors** ([`error`]) and **Progress**
//!   ([`progress`]) shared by all workflows.
//!
//! [`PoseRecord`]: crate::core::models::pose::PoseRecord

pub mod config;
pub mod error;
pub mod index;
pub mod progress;
pub mod records;
pub mod selector;
