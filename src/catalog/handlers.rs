use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    catalog::{
        controller::RefreshOutcome,
        dto::{CatalogView, ProductCard, SelectCategoryRequest},
        page,
        sort::{SortDirective, SortField, SortOrder},
    },
    state::AppState,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/categories", get(list_categories))
        .route("/catalog", get(get_catalog))
        .route("/category", post(select_category))
        .route("/sort", post(select_sort))
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(storefront))
        .route("/category/:name", get(pick_category))
        .route("/sort/:field/:order", get(pick_sort))
        .route("/menu/categories", get(toggle_categories))
        .route("/menu/sort", get(toggle_sort))
}

// --- json ---

pub async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductCard>> {
    Json(state.catalog.cards().await)
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.categories().await)
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogView> {
    Json(state.catalog.snapshot().await)
}

#[instrument(skip(state))]
pub async fn select_category(
    State(state): State<AppState>,
    Json(body): Json<SelectCategoryRequest>,
) -> Json<CatalogView> {
    let outcome = state.catalog.select_category(body.category).await;
    log_outcome(outcome);
    Json(state.catalog.snapshot().await)
}

#[instrument(skip(state))]
pub async fn select_sort(
    State(state): State<AppState>,
    Json(directive): Json<SortDirective>,
) -> Json<CatalogView> {
    let outcome = state.catalog.select_sort(directive).await;
    log_outcome(outcome);
    Json(state.catalog.snapshot().await)
}

// --- page ---

pub async fn storefront(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.catalog.snapshot().await))
}

#[instrument(skip(state))]
pub async fn pick_category(State(state): State<AppState>, Path(name): Path<String>) -> Redirect {
    log_outcome(state.catalog.select_category(name).await);
    Redirect::to("/")
}

#[instrument(skip(state))]
pub async fn pick_sort(
    State(state): State<AppState>,
    Path((field, order)): Path<(SortField, SortOrder)>,
) -> Redirect {
    let outcome = state
        .catalog
        .select_sort(SortDirective::new(field, order))
        .await;
    log_outcome(outcome);
    Redirect::to("/")
}

pub async fn toggle_categories(State(state): State<AppState>) -> Redirect {
    state.catalog.toggle_category_menu().await;
    Redirect::to("/")
}

pub async fn toggle_sort(State(state): State<AppState>) -> Redirect {
    state.catalog.toggle_sort_menu().await;
    Redirect::to("/")
}

// Failures are already logged by the controller; the page keeps the last good list.
fn log_outcome(outcome: RefreshOutcome) {
    info!(?outcome, "selection applied");
}
