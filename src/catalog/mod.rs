pub mod client;
pub mod controller;
pub mod dto;
pub mod handlers;
pub mod offers;
mod page;
pub mod sort;

use crate::state::AppState;
use axum::Router;

/// JSON endpoints, mounted under the API prefix.
pub fn router() -> Router<AppState> {
    handlers::api_routes()
}

/// Server-rendered storefront.
pub fn pages() -> Router<AppState> {
    handlers::page_routes()
}
