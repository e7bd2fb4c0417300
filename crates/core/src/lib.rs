//! Domain types shared by the record store and the HTTP API.
//!
//! Nothing in this crate touches the filesystem or the network.

pub mod error;
pub mod record;
pub mod types;
