/// Share endpoints
///
/// Sharing a collection issues a random code that grants read-only access
/// to anyone holding it, no account required.
///
/// # Endpoints
///
/// - `POST /api/share/collection/:id` - Generate a share code (authenticated)
/// - `GET /api/share/:code` - Public read-only view of a shared collection
///
/// Sharing again replaces the previous code, so a code can be revoked by
/// reissuing. The public view shows the same items the owner sees for the
/// collection but redacts owner identity, purchase prices, asking prices,
/// barcodes, and wishlist flags.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use curio_shared::{
    auth::middleware::AuthContext,
    models::{collection::Collection, item::{Item, ItemCondition}},
    share,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attempts before giving up on share code generation
///
/// A collision on a 12-character base62 code is vanishingly rare; more than
/// one retry in a row means something is wrong.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Share collection response
#[derive(Debug, Serialize, Deserialize)]
pub struct ShareCollectionResponse {
    /// The collection the code points at
    pub collection_id: Uuid,

    /// The active share code for the collection
    pub share_code: String,
}

/// Public view of a shared collection
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedCollectionResponse {
    /// The shared collection, redacted for public viewing
    pub collection: SharedCollectionInfo,

    /// Items in the collection, redacted for public viewing
    pub items: Vec<SharedItem>,
}

/// Public collection metadata
///
/// The owner's user id is deliberately absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedCollectionInfo {
    /// Collection ID
    pub id: Uuid,

    /// Collection name
    pub name: String,

    /// Category
    pub category: String,

    /// Description
    pub description: String,

    /// Number of items shown
    pub item_count: i64,
}

/// Public view of one item
///
/// Shows the current value only; purchase price, asking price, and barcode
/// stay private to the owner.
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedItem {
    /// Item ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Description
    pub description: String,

    /// Encoded images
    pub images: Vec<String>,

    /// Estimated current value
    pub current_value: Decimal,

    /// Condition grade
    pub condition: ItemCondition,

    /// Free-form key/value metadata
    pub custom_fields: serde_json::Value,

    /// When the item was added
    pub created_at: DateTime<Utc>,
}

impl From<Item> for SharedItem {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            images: item.images,
            current_value: item.current_value,
            condition: item.condition,
            custom_fields: item.custom_fields,
            created_at: item.created_at,
        }
    }
}

/// Whether an error is a unique violation on the share code column
fn is_share_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .constraint()
            .map(|c| c.contains("share_code"))
            .unwrap_or(false),
        _ => false,
    }
}

/// Generates (or regenerates) a share code for a collection
///
/// Always issues a fresh code; any previously issued code stops working
/// immediately. Retries on the off chance the random code collides with an
/// existing one.
///
/// # Errors
///
/// - `404 Not Found`: Unknown collection, or one owned by another user
pub async fn share_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShareCollectionResponse>> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = share::generate_share_code();

        match Collection::set_share_code(&state.db, auth.user_id, id, &code).await {
            Ok(true) => {
                return Ok(Json(ShareCollectionResponse {
                    collection_id: id,
                    share_code: code,
                }));
            }
            Ok(false) => {
                return Err(ApiError::NotFound("Collection not found".to_string()));
            }
            Err(err) if is_share_code_collision(&err) => continue,
            Err(err) => return Err(err.into()),
        }
    }

    Err(ApiError::InternalError(
        "Could not generate a unique share code".to_string(),
    ))
}

/// Public read-only view of a shared collection
///
/// No authentication. Malformed codes get the same 404 as unknown ones, so
/// the response doesn't leak which codes are syntactically plausible.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or malformed share code
pub async fn view_shared_collection(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<SharedCollectionResponse>> {
    if !share::validate_share_code_format(&code) {
        return Err(ApiError::NotFound("Shared collection not found".to_string()));
    }

    let collection = Collection::find_by_share_code(&state.db, &code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shared collection not found".to_string()))?;

    let items: Vec<SharedItem> = Item::list_by_collection_unscoped(&state.db, collection.id)
        .await?
        .into_iter()
        .map(SharedItem::from)
        .collect();

    Ok(Json(SharedCollectionResponse {
        collection: SharedCollectionInfo {
            id: collection.id,
            name: collection.name,
            category: collection.category,
            description: collection.description,
            item_count: items.len() as i64,
        },
        items,
    }))
}
