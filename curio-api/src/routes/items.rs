/// Item management endpoints
///
/// # Endpoints
///
/// - `GET /api/items` - List owned (non-wishlist) items
/// - `POST /api/items` - Create an item
/// - `GET /api/items/collection/:collection_id` - Items in one collection
/// - `GET /api/items/status/:status` - Filter by status (wishlist, selling, owned, all)
/// - `GET /api/items/search?q=` - Case-insensitive substring search
/// - `GET /api/items/:id` - Get one item
/// - `PUT /api/items/:id` - Partial update
/// - `DELETE /api/items/:id` - Delete an item
///
/// Every operation is scoped to the authenticated user.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use curio_shared::{
    auth::middleware::AuthContext,
    models::{
        collection::Collection,
        item::{self, CreateItem, Item, ItemCondition, UpdateItem},
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create item request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Collection to file the item under
    pub collection_id: Option<Uuid>,

    /// Description
    pub description: Option<String>,

    /// Encoded images (data URIs), at most 5
    #[serde(default)]
    pub images: Vec<String>,

    /// Barcode
    #[validate(length(max = 128, message = "Barcode must be at most 128 characters"))]
    pub barcode: Option<String>,

    /// Purchase price (defaults to 0)
    #[serde(default)]
    pub purchase_price: Decimal,

    /// Current value (defaults to 0)
    #[serde(default)]
    pub current_value: Decimal,

    /// Asking price; a positive value marks the item as for sale
    pub asking_price: Option<Decimal>,

    /// Condition grade (defaults to good)
    #[serde(default)]
    pub condition: ItemCondition,

    /// Wishlist flag
    #[serde(default)]
    pub is_wishlist: bool,

    /// Free-form key/value metadata (defaults to an empty object)
    #[serde(default = "default_custom_fields")]
    pub custom_fields: serde_json::Value,
}

fn default_custom_fields() -> serde_json::Value {
    serde_json::json!({})
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring to match against name, description, and barcode
    #[serde(default)]
    pub q: String,
}

/// Delete item response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteItemResponse {
    /// Confirmation message
    pub message: String,
}

/// Checks price fields for negative values
fn validate_prices(
    purchase_price: Option<Decimal>,
    current_value: Option<Decimal>,
    asking_price: Option<Decimal>,
) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    let checks = [
        ("purchase_price", purchase_price),
        ("current_value", current_value),
        ("asking_price", asking_price),
    ];

    for (field, value) in checks {
        if let Some(value) = value {
            if value < Decimal::ZERO {
                errors.push(ValidationErrorDetail {
                    field: field.to_string(),
                    message: "Price must not be negative".to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(errors))
    }
}

/// Checks an item name without going through the derive
///
/// The length limit counts characters, matching the `validator` rule on
/// `CreateItemRequest`, so a multibyte name passes or fails the same way
/// on create and update.
fn validate_name(name: &str) -> Result<(), ApiError> {
    let chars = name.chars().count();
    if chars == 0 || chars > 255 {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "name".to_string(),
            message: "Name must be 1-255 characters".to_string(),
        }]));
    }

    Ok(())
}

/// Requires the metadata value to be a JSON object
fn validate_custom_fields(custom_fields: &serde_json::Value) -> Result<(), ApiError> {
    if !custom_fields.is_object() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "custom_fields".to_string(),
            message: "custom_fields must be a JSON object".to_string(),
        }]));
    }

    Ok(())
}

/// Checks the image list against the count and size guards
fn validate_images(images: &[String]) -> Result<(), ApiError> {
    item::validate_images(images).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "images".to_string(),
            message,
        }])
    })
}

/// Verifies that a referenced collection exists and belongs to the user
///
/// A collection id pointing at another user's collection is rejected the
/// same way as an unknown one.
async fn check_collection_ownership(
    state: &AppState,
    user_id: Uuid,
    collection_id: Uuid,
) -> Result<(), ApiError> {
    let owned = Collection::find_by_id(&state.db, user_id, collection_id)
        .await?
        .is_some();

    if !owned {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "collection_id".to_string(),
            message: "Collection not found".to_string(),
        }]));
    }

    Ok(())
}

/// Lists the authenticated user's owned items, newest first
///
/// Wishlist items are excluded here; fetch them via `/status/wishlist`.
pub async fn list_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = Item::list_by_user(&state.db, auth.user_id).await?;

    Ok(Json(items))
}

/// Creates a new item
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed, including a
///   collection_id that doesn't resolve to one of the user's collections
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<Json<Item>> {
    req.validate()?;
    validate_images(&req.images)?;
    validate_custom_fields(&req.custom_fields)?;
    validate_prices(
        Some(req.purchase_price),
        Some(req.current_value),
        req.asking_price,
    )?;

    if let Some(collection_id) = req.collection_id {
        check_collection_ownership(&state, auth.user_id, collection_id).await?;
    }

    let item = Item::create(
        &state.db,
        CreateItem {
            user_id: auth.user_id,
            collection_id: req.collection_id,
            name: req.name,
            description: req.description,
            images: req.images,
            barcode: req.barcode,
            purchase_price: req.purchase_price,
            current_value: req.current_value,
            asking_price: req.asking_price,
            condition: req.condition,
            is_wishlist: req.is_wishlist,
            custom_fields: req.custom_fields,
        },
    )
    .await?;

    Ok(Json(item))
}

/// Lists items in one of the user's collections
///
/// # Errors
///
/// - `404 Not Found`: Unknown collection, or one owned by another user
pub async fn list_items_by_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(collection_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Item>>> {
    // 404 before listing so an empty collection and a foreign one differ
    Collection::find_by_id(&state.db, auth.user_id, collection_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Collection not found".to_string()))?;

    let items = Item::list_by_collection(&state.db, auth.user_id, collection_id).await?;

    Ok(Json(items))
}

/// Lists items filtered by status
///
/// Recognized statuses:
/// - `wishlist`: items flagged as wishlist
/// - `selling`: items with a positive asking price
/// - `owned`: non-wishlist items (same as `GET /api/items`)
/// - `all`: everything, wishlist included
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status
pub async fn list_items_by_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(status): Path<String>,
) -> ApiResult<Json<Vec<Item>>> {
    let items = match status.as_str() {
        "wishlist" => Item::list_wishlist(&state.db, auth.user_id).await?,
        "selling" => Item::list_selling(&state.db, auth.user_id).await?,
        "owned" => Item::list_by_user(&state.db, auth.user_id).await?,
        "all" => Item::list_all(&state.db, auth.user_id).await?,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown status '{}' (expected wishlist, selling, owned, or all)",
                other
            )))
        }
    };

    Ok(Json(items))
}

/// Searches the user's items by substring
///
/// Matches name, description, and barcode case-insensitively. An empty or
/// whitespace-only query returns every item the user has.
pub async fn search_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Item>>> {
    let q = params.q.trim();

    let items = if q.is_empty() {
        Item::list_all(&state.db, auth.user_id).await?
    } else {
        Item::search(&state.db, auth.user_id, q).await?
    };

    Ok(Json(items))
}

/// Gets a single item by id
///
/// # Errors
///
/// - `404 Not Found`: Unknown id, or an item owned by another user
pub async fn get_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Item>> {
    let item = Item::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(item))
}

/// Partially updates an item
///
/// Only the fields present in the body are written. An empty body is a
/// no-op that returns the current item.
///
/// # Errors
///
/// - `404 Not Found`: Unknown id, or an item owned by another user
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItem>,
) -> ApiResult<Json<Item>> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }

    if let Some(images) = &req.images {
        validate_images(images)?;
    }

    if let Some(custom_fields) = &req.custom_fields {
        validate_custom_fields(custom_fields)?;
    }

    validate_prices(
        req.purchase_price,
        req.current_value,
        req.asking_price.flatten(),
    )?;

    if let Some(Some(collection_id)) = req.collection_id {
        check_collection_ownership(&state, auth.user_id, collection_id).await?;
    }

    if req.is_empty() {
        // Nothing to write; still 404 for an id the user doesn't own
        let item = Item::find_by_id(&state.db, auth.user_id, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;
        return Ok(Json(item));
    }

    let item = Item::update(&state.db, auth.user_id, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(item))
}

/// Deletes an item
///
/// # Errors
///
/// - `404 Not Found`: Unknown id, or an item owned by another user
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteItemResponse>> {
    let deleted = Item::delete(&state.db, auth.user_id, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }

    Ok(Json(DeleteItemResponse {
        message: "Item deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_counts_characters() {
        assert!(validate_name("Chrono Trigger").is_ok());
        assert!(validate_name("").is_err());

        // 200 two-byte characters: 400 bytes but only 200 chars, so valid
        let accented = "é".repeat(200);
        assert_eq!(accented.len(), 400);
        assert!(validate_name(&accented).is_ok());

        let too_long = "é".repeat(256);
        assert!(validate_name(&too_long).is_err());
    }

    #[test]
    fn test_validate_custom_fields_requires_object() {
        assert!(validate_custom_fields(&serde_json::json!({})).is_ok());
        assert!(validate_custom_fields(&serde_json::json!({"region": "PAL"})).is_ok());

        assert!(validate_custom_fields(&serde_json::json!("PAL")).is_err());
        assert!(validate_custom_fields(&serde_json::json!([1, 2])).is_err());
        assert!(validate_custom_fields(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_create_item_request_defaults_custom_fields() {
        let req: CreateItemRequest =
            serde_json::from_str(r#"{"name": "Chrono Trigger"}"#).unwrap();
        assert_eq!(req.custom_fields, serde_json::json!({}));
    }
}
