use std::sync::Arc;

use friends_store::CsvStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the store sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record store over the backing CSV file.
    pub store: Arc<CsvStore>,
}
