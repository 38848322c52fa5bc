//! Input/output for the header-framed pose container and for toolkit result tables.
//!
//! The container is line-oriented ASCII, usually gzip-compressed on disk. Every pose
//! starts with a block of header lines prefixed by a ten-`#` delimiter, followed by the
//! pose's structure block. [`container`] classifies lines in a single forward pass,
//! [`reorder`] rewrites the relative order of header and structure blocks, and
//! [`compress`] makes compression transparent to both.

pub mod compress;
pub mod container;
pub mod reorder;
pub mod tables;
