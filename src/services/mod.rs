//! Service layer: the remote-store seam, the sync engine, and the loop that
//! drives it.

pub mod remote;
pub mod scheduler;
pub mod sync_service;
