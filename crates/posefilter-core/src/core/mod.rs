//! # Core Module
//!
//! Stateless building blocks shared by the scanning engine and the workflows.
//!
//! - **Constraints** ([`constraints`]) - The residue interaction mini-language, its parser
//!   and its pure evaluator.
//! - **Container I/O** ([`io`]) - Gzip-transparent streams, line classification of the
//!   header-framed pose container, block reordering and toolkit result tables.
//! - **Models** ([`models`]) - The pose record data model.
//! - **Geometry** ([`geometry`]) - Root-mean-square deviation over matched atoms.
//! - **Toolkit** ([`toolkit`]) - The capability contract of the external modeling toolkit.

pub mod constraints;
pub mod geometry;
pub mod io;
pub mod models;
pub mod toolkit;
