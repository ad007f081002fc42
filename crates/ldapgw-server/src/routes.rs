//! Router and request handlers.

use crate::auth::RequireBindCredentials;
use crate::error::WebError;
use crate::models::{LdifParams, ModifyRequest, SearchRequest};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ldapgw_core::Error;
use ldapgw_directory::{ModifyOutcome, SearchOutcome};
use validator::Validate;

/// Content type for LDIF responses and request bodies.
const LDIF_CONTENT_TYPE: &str = "application/ldif";

/// Builds the API router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(search_query).post(search_body))
        .route(
            "/api/search/ldif",
            get(search_ldif_query).post(search_ldif_body),
        )
        .route("/api/modify", post(modify))
        .route("/api/modify/ldif", post(modify_ldif))
        .with_state(state)
}

async fn search_body(
    State(state): State<AppState>,
    RequireBindCredentials(credentials): RequireBindCredentials,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, WebError> {
    request.validate().map_err(Error::from)?;
    let outcome = state
        .gateway()
        .search(&request.into_spec(), &credentials)
        .await?;
    Ok(Json(outcome))
}

async fn search_query(
    State(state): State<AppState>,
    RequireBindCredentials(credentials): RequireBindCredentials,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchOutcome>, WebError> {
    request.validate().map_err(Error::from)?;
    let outcome = state
        .gateway()
        .search(&request.into_spec(), &credentials)
        .await?;
    Ok(Json(outcome))
}

async fn search_ldif_body(
    State(state): State<AppState>,
    RequireBindCredentials(credentials): RequireBindCredentials,
    Json(request): Json<SearchRequest>,
) -> Result<Response, WebError> {
    request.validate().map_err(Error::from)?;
    let ldif = state
        .gateway()
        .search_to_ldif(&request.into_spec(), &credentials)
        .await?;
    Ok(ldif_response(ldif))
}

async fn search_ldif_query(
    State(state): State<AppState>,
    RequireBindCredentials(credentials): RequireBindCredentials,
    Query(request): Query<SearchRequest>,
) -> Result<Response, WebError> {
    request.validate().map_err(Error::from)?;
    let ldif = state
        .gateway()
        .search_to_ldif(&request.into_spec(), &credentials)
        .await?;
    Ok(ldif_response(ldif))
}

async fn modify(
    State(state): State<AppState>,
    RequireBindCredentials(credentials): RequireBindCredentials,
    Json(request): Json<ModifyRequest>,
) -> Result<Json<ModifyOutcome>, WebError> {
    request.validate().map_err(Error::from)?;
    let spec = request.into_spec()?;
    let outcome = state.gateway().modify(&spec, &credentials).await?;
    Ok(Json(outcome))
}

async fn modify_ldif(
    State(state): State<AppState>,
    RequireBindCredentials(credentials): RequireBindCredentials,
    Query(params): Query<LdifParams>,
    body: String,
) -> Result<Json<ModifyOutcome>, WebError> {
    let outcome = state
        .gateway()
        .apply_ldif(&params.uri, &body, &credentials)
        .await?;
    Ok(Json(outcome))
}

fn ldif_response(ldif: String) -> Response {
    ([(header::CONTENT_TYPE, LDIF_CONTENT_TYPE)], ldif).into_response()
}
