//! Periodic S3 bucket mirroring: list a bucket on a fixed interval and
//! materialize each object under a local root, downloading only what is
//! missing locally or differs in size.

pub mod config;
pub mod models;
pub mod services;
