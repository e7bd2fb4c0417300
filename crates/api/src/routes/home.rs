use axum::{routing::get, Json, Router};

use crate::state::AppState;

/// GET / -- welcome message.
async fn home_page() -> Json<&'static str> {
    Json("Basic CSV Reading and Writing API using Flask")
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home_page))
}
