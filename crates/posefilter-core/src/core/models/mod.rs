//! Data models for poses read from the docking container.

pub mod pose;
