//! # posefilter Core Library
//!
//! Streaming triage of docking-screen output: interaction constraints, best-pose
//! selection by geometric agreement with a reference, and rewriting of the
//! header-framed pose container.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: the interaction constraint
//!   mini-language, line classification and rewriting of the pose container, matched-atom
//!   geometry, and the capability contract of the external modeling toolkit.
//!
//! - **[`engine`]: The Logic Core.** Single-pass, forward-only scanners that fold the
//!   container into a `PoseIndex` or a best-pose selection, together with configuration,
//!   error and progress types.
//!
//! - **[`workflows`]: The Public API.** Complete procedures (best-pose selection,
//!   interaction filtering, header retrieval, substructure screening) that tie the
//!   `engine` and `core` layers together.

pub mod core;
pub mod engine;
pub mod workflows;
