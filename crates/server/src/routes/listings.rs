use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use models::listing::CreateListingInput;
use serde_json::{json, Value};
use service::auth::domain::BearerToken;

use crate::errors::ApiError;
use crate::routes::auth::{authorization, ServerState};

/// The token is only checked for presence up front; it is resolved after the
/// body validates, so malformed listings never reach the identity provider.
#[utoipa::path(
    post,
    path = "/api/listings",
    tag = "listings",
    security(("bearer" = [])),
    request_body = crate::openapi::CreateListingRequest,
    responses(
        (status = 200, description = "Listing stored", body = crate::openapi::ListingCreated),
        (status = 400, description = "Invalid listing", body = crate::openapi::ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = crate::openapi::ErrorBody),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorBody)
    )
)]
pub async fn create_listing(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Result<Json<CreateListingInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let token = BearerToken::from_header(authorization(&headers))?;
    let Json(input) = body.map_err(|_| ApiError::bad_request("Invalid JSON"))?;
    let draft = input.validate()?;

    let identity = state.resolver.resolve_token(&token).await?;
    let listing_id = state.resources.create_listing(&identity, draft).await?;
    Ok(Json(json!({
        "listing_id": listing_id,
        "status": "success",
        "message": "Listing created successfully."
    })))
}
