//! Core data models for the bucket mirroring daemon.
//!
//! These entities describe what one sync cycle sees and produces. None of
//! them is persisted: listing pages are consumed as they arrive and the
//! cycle report is dropped once it has been logged.

pub mod object;
pub mod report;
