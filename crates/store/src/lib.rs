//! File-backed record store.
//!
//! The backing CSV file is the only persistent state. Every operation loads
//! the current file into a [`Table`]; mutations rewrite the whole file.

pub mod error;
pub mod store;
pub mod table;

pub use error::{StoreError, StoreResult};
pub use store::CsvStore;
pub use table::Table;
