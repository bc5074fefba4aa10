/// Collection management endpoints
///
/// # Endpoints
///
/// - `GET /api/collections` - List own collections
/// - `POST /api/collections` - Create a collection
/// - `GET /api/collections/:id` - Get one collection
/// - `DELETE /api/collections/:id` - Delete a collection and its items
///
/// Every operation is scoped to the authenticated user; somebody else's
/// collection id behaves exactly like an unknown one (404).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use curio_shared::{
    auth::middleware::AuthContext,
    models::collection::{Collection, CreateCollection},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create collection request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Category; unknown categories are accepted as-is
    #[validate(length(min = 1, max = 64, message = "Category must be 1-64 characters"))]
    pub category: String,

    /// Optional description
    pub description: Option<String>,
}

/// Delete collection response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCollectionResponse {
    /// Confirmation message
    pub message: String,
}

/// Lists the authenticated user's collections, newest first
///
/// Each collection carries its current `item_count`.
pub async fn list_collections(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Collection>>> {
    let collections = Collection::list_by_user(&state.db, auth.user_id).await?;

    Ok(Json(collections))
}

/// Creates a new collection
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCollectionRequest>,
) -> ApiResult<Json<Collection>> {
    req.validate()?;

    if !curio_shared::models::collection::is_known_category(&req.category) {
        tracing::debug!(category = %req.category, "Creating collection with unknown category");
    }

    let collection = Collection::create(
        &state.db,
        CreateCollection {
            user_id: auth.user_id,
            name: req.name,
            category: req.category,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(collection))
}

/// Gets a single collection by id
///
/// # Errors
///
/// - `404 Not Found`: Unknown id, or a collection owned by another user
pub async fn get_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Collection>> {
    let collection = Collection::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Collection not found".to_string()))?;

    Ok(Json(collection))
}

/// Deletes a collection and every item inside it
///
/// The item cascade happens in the same statement via the foreign key, so a
/// concurrent item insert either lands before the delete (and is removed
/// with the collection) or fails its foreign key check.
///
/// # Errors
///
/// - `404 Not Found`: Unknown id, or a collection owned by another user
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteCollectionResponse>> {
    let deleted = Collection::delete(&state.db, auth.user_id, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Collection not found".to_string()));
    }

    Ok(Json(DeleteCollectionResponse {
        message: "Collection deleted".to_string(),
    }))
}
