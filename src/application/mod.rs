//! Application layer: the post manager and the ports it drives.

pub mod error;
mod lock;
pub mod manager;
pub mod query_cache;
pub mod remote;
pub mod view_state;
