//! Quick-add tracking logs: water, exercise and body weight. Small enough
//! that each table keeps its dto, repo and handlers in one file.

use crate::state::AppState;
use axum::Router;

pub mod exercise;
pub mod water;
pub mod weight;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(water::routes())
        .merge(exercise::routes())
        .merge(weight::routes())
}
