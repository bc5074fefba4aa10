/// Item model and database operations
///
/// An item is a single collectible record: photos, barcode, prices,
/// condition grade, and a wishlist flag. Items optionally belong to a
/// collection owned by the same user; an item with no collection is
/// "uncategorized".
///
/// Images are self-describing encoded strings (data URIs) stored inline on
/// the row. The store treats them as opaque blobs and only enforces a count
/// and total-size guard.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE item_condition AS ENUM (
///     'mint', 'near_mint', 'excellent', 'good', 'fair', 'poor'
/// );
///
/// CREATE TABLE items (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     collection_id UUID REFERENCES collections(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     images TEXT[] NOT NULL DEFAULT '{}',
///     barcode VARCHAR(128),
///     purchase_price NUMERIC(12,2) NOT NULL DEFAULT 0,
///     current_value NUMERIC(12,2) NOT NULL DEFAULT 0,
///     asking_price NUMERIC(12,2),
///     condition item_condition NOT NULL DEFAULT 'good',
///     is_wishlist BOOLEAN NOT NULL DEFAULT FALSE,
///     custom_fields JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum number of images per item
pub const MAX_IMAGES_PER_ITEM: usize = 5;

/// Maximum combined size of an item's encoded images (10 MiB)
///
/// Guard against unbounded payloads; base64 data URIs from a phone camera
/// land well under this.
pub const MAX_TOTAL_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Condition grading of an item's physical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Mint,
    NearMint,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ItemCondition {
    /// Converts condition to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::Mint => "mint",
            ItemCondition::NearMint => "near_mint",
            ItemCondition::Excellent => "excellent",
            ItemCondition::Good => "good",
            ItemCondition::Fair => "fair",
            ItemCondition::Poor => "poor",
        }
    }
}

impl Default for ItemCondition {
    fn default() -> Self {
        ItemCondition::Good
    }
}

/// Item model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Unique item ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Collection this item belongs to (None = uncategorized)
    pub collection_id: Option<Uuid>,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Encoded image blobs (data URIs), 0..=5 per item
    pub images: Vec<String>,

    /// Optional barcode string
    pub barcode: Option<String>,

    /// What the owner paid (non-negative)
    pub purchase_price: Decimal,

    /// Estimated current value (non-negative)
    pub current_value: Decimal,

    /// Asking price when the item is listed for sale
    pub asking_price: Option<Decimal>,

    /// Condition grade
    pub condition: ItemCondition,

    /// Desired-but-not-owned flag
    pub is_wishlist: bool,

    /// Free-form key/value metadata, always a JSON object
    pub custom_fields: serde_json::Value,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    /// Owning user
    pub user_id: Uuid,

    /// Collection to file the item under, if any
    pub collection_id: Option<Uuid>,

    /// Display name
    pub name: String,

    /// Description (defaults to empty)
    pub description: Option<String>,

    /// Encoded images
    pub images: Vec<String>,

    /// Barcode
    pub barcode: Option<String>,

    /// Purchase price (defaults to 0)
    pub purchase_price: Decimal,

    /// Current value (defaults to 0)
    pub current_value: Decimal,

    /// Asking price, when listing for sale
    pub asking_price: Option<Decimal>,

    /// Condition grade (defaults to good)
    pub condition: ItemCondition,

    /// Wishlist flag
    pub is_wishlist: bool,

    /// Free-form key/value metadata
    pub custom_fields: serde_json::Value,
}

/// Deserializes a nullable update field, keeping explicit `null` distinct
/// from an absent key
///
/// A bare `Option<Option<T>>` won't do: serde folds JSON `null` into the
/// outer `None`, making `Some(None)` unreachable. Routing through a plain
/// `Option<T>` first and wrapping the result preserves the distinction;
/// the absent-key case is handled by `#[serde(default)]` on the field.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Input for partially updating an item
///
/// All fields are optional; only provided fields are written. Nullable
/// columns use the double-`Option` pattern: a missing JSON key deserializes
/// to `None` (leave untouched) while an explicit `null` deserializes to
/// `Some(None)` (clear the value).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    /// Move to another collection (`Some(None)` = uncategorized)
    #[serde(default, deserialize_with = "double_option")]
    pub collection_id: Option<Option<Uuid>>,

    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Replace the image list
    pub images: Option<Vec<String>>,

    /// New barcode (`Some(None)` = clear)
    #[serde(default, deserialize_with = "double_option")]
    pub barcode: Option<Option<String>>,

    /// New purchase price
    pub purchase_price: Option<Decimal>,

    /// New current value
    pub current_value: Option<Decimal>,

    /// New asking price (`Some(None)` = no longer for sale)
    #[serde(default, deserialize_with = "double_option")]
    pub asking_price: Option<Option<Decimal>>,

    /// New condition grade
    pub condition: Option<ItemCondition>,

    /// New wishlist flag
    pub is_wishlist: Option<bool>,

    /// Replace the metadata object wholesale
    pub custom_fields: Option<serde_json::Value>,
}

impl UpdateItem {
    /// Whether the update carries at least one field
    pub fn is_empty(&self) -> bool {
        self.collection_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.images.is_none()
            && self.barcode.is_none()
            && self.purchase_price.is_none()
            && self.current_value.is_none()
            && self.asking_price.is_none()
            && self.condition.is_none()
            && self.is_wishlist.is_none()
            && self.custom_fields.is_none()
    }
}

/// Validates an item's image list against the count and size guards
///
/// # Errors
///
/// Returns a human-readable message describing the violated limit
pub fn validate_images(images: &[String]) -> Result<(), String> {
    if images.len() > MAX_IMAGES_PER_ITEM {
        return Err(format!(
            "At most {} images per item (got {})",
            MAX_IMAGES_PER_ITEM,
            images.len()
        ));
    }

    let total_bytes: usize = images.iter().map(|i| i.len()).sum();
    if total_bytes > MAX_TOTAL_IMAGE_BYTES {
        return Err(format!(
            "Images exceed the {} MiB total size limit",
            MAX_TOTAL_IMAGE_BYTES / (1024 * 1024)
        ));
    }

    Ok(())
}

/// Escapes LIKE/ILIKE metacharacters in a user-supplied search query
///
/// Backslash, percent, and underscore would otherwise act as wildcards
/// inside the pattern.
pub fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

const SELECT_COLUMNS: &str = r#"
    id, user_id, collection_id, name, description, images, barcode,
    purchase_price, current_value, asking_price, condition, is_wishlist,
    custom_fields, created_at, updated_at
"#;

impl Item {
    /// Creates a new item
    pub async fn create(pool: &PgPool, data: CreateItem) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO items (user_id, collection_id, name, description, images, barcode,
                               purchase_price, current_value, asking_price, condition,
                               is_wishlist, custom_fields)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let item = sqlx::query_as::<_, Item>(&query)
            .bind(data.user_id)
            .bind(data.collection_id)
            .bind(data.name)
            .bind(data.description.unwrap_or_default())
            .bind(data.images)
            .bind(data.barcode)
            .bind(data.purchase_price)
            .bind(data.current_value)
            .bind(data.asking_price)
            .bind(data.condition)
            .bind(data.is_wishlist)
            .bind(data.custom_fields)
            .fetch_one(pool)
            .await?;

        Ok(item)
    }

    /// Lists a user's owned (non-wishlist) items, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE user_id = $1 AND is_wishlist = FALSE
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Lists every item a user owns, wishlist included
    pub async fn list_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Lists items in a collection, scoped to the owning user
    pub async fn list_by_collection(
        pool: &PgPool,
        user_id: Uuid,
        collection_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE user_id = $1 AND collection_id = $2
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .bind(collection_id)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Lists items in a collection without user scoping
    ///
    /// Only used by the public share view, after the share code has been
    /// resolved to a collection.
    pub async fn list_by_collection_unscoped(
        pool: &PgPool,
        collection_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE collection_id = $1
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(collection_id)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Lists a user's wishlist items
    pub async fn list_wishlist(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE user_id = $1 AND is_wishlist = TRUE
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Lists a user's for-sale items (asking price set and positive)
    pub async fn list_selling(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE user_id = $1 AND asking_price > 0
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Finds an item by ID, scoped to the owning user
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE id = $1 AND user_id = $2
            "#,
            SELECT_COLUMNS
        );

        let item = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(item)
    }

    /// Case-insensitive substring search over name, description, and barcode
    ///
    /// The query is escaped so LIKE metacharacters are matched literally.
    /// Each item appears at most once even when several fields match.
    pub async fn search(
        pool: &PgPool,
        user_id: Uuid,
        search_query: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(search_query));

        let query = format!(
            r#"
            SELECT {} FROM items
            WHERE user_id = $1
              AND (name ILIKE $2 OR description ILIKE $2 OR barcode ILIKE $2)
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .bind(pattern)
            .fetch_all(pool)
            .await?;

        Ok(items)
    }

    /// Partially updates an item, scoped to the owning user
    ///
    /// Only the provided fields are written; everything else keeps its
    /// current value. `updated_at` is always bumped.
    ///
    /// # Returns
    ///
    /// The updated item, or `None` on missing/foreign id.
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build a dynamic update statement from the provided fields,
        // following positional bind order: $1 = id, $2 = user_id, then one
        // placeholder per set field.
        let mut query = String::from("UPDATE items SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.collection_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", collection_id = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.images.is_some() {
            bind_count += 1;
            query.push_str(&format!(", images = ${}", bind_count));
        }
        if data.barcode.is_some() {
            bind_count += 1;
            query.push_str(&format!(", barcode = ${}", bind_count));
        }
        if data.purchase_price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", purchase_price = ${}", bind_count));
        }
        if data.current_value.is_some() {
            bind_count += 1;
            query.push_str(&format!(", current_value = ${}", bind_count));
        }
        if data.asking_price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", asking_price = ${}", bind_count));
        }
        if data.condition.is_some() {
            bind_count += 1;
            query.push_str(&format!(", condition = ${}", bind_count));
        }
        if data.is_wishlist.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_wishlist = ${}", bind_count));
        }
        if data.custom_fields.is_some() {
            bind_count += 1;
            query.push_str(&format!(", custom_fields = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {}",
            SELECT_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, Item>(&query).bind(id).bind(user_id);

        if let Some(collection_id) = data.collection_id {
            q = q.bind(collection_id);
        }
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(images) = data.images {
            q = q.bind(images);
        }
        if let Some(barcode) = data.barcode {
            q = q.bind(barcode);
        }
        if let Some(purchase_price) = data.purchase_price {
            q = q.bind(purchase_price);
        }
        if let Some(current_value) = data.current_value {
            q = q.bind(current_value);
        }
        if let Some(asking_price) = data.asking_price {
            q = q.bind(asking_price);
        }
        if let Some(condition) = data.condition {
            q = q.bind(condition);
        }
        if let Some(is_wishlist) = data.is_wishlist {
            q = q.bind(is_wishlist);
        }
        if let Some(custom_fields) = data.custom_fields {
            q = q.bind(custom_fields);
        }

        let item = q.fetch_optional(pool).await?;

        Ok(item)
    }

    /// Deletes an item, scoped to the owning user
    ///
    /// # Returns
    ///
    /// `true` if the item was deleted, `false` on missing/foreign id.
    /// Two concurrent deletes are safe: the loser sees `false`.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_as_str() {
        assert_eq!(ItemCondition::Mint.as_str(), "mint");
        assert_eq!(ItemCondition::NearMint.as_str(), "near_mint");
        assert_eq!(ItemCondition::Poor.as_str(), "poor");
    }

    #[test]
    fn test_condition_default_is_good() {
        assert_eq!(ItemCondition::default(), ItemCondition::Good);
    }

    #[test]
    fn test_condition_serde_roundtrip() {
        let json = serde_json::to_string(&ItemCondition::NearMint).unwrap();
        assert_eq!(json, "\"near_mint\"");

        let parsed: ItemCondition = serde_json::from_str("\"mint\"").unwrap();
        assert_eq!(parsed, ItemCondition::Mint);

        // Unknown grades are rejected at the boundary
        assert!(serde_json::from_str::<ItemCondition>("\"pristine\"").is_err());
    }

    #[test]
    fn test_update_item_is_empty() {
        assert!(UpdateItem::default().is_empty());

        let update = UpdateItem {
            is_wishlist: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_item_double_option_deserialization() {
        // Missing key: leave the field untouched
        let update: UpdateItem = serde_json::from_str(r#"{"name": "Chrono Trigger"}"#).unwrap();
        assert_eq!(update.name.as_deref(), Some("Chrono Trigger"));
        assert!(update.collection_id.is_none());
        assert!(update.barcode.is_none());

        // Explicit null: clear the field
        let update: UpdateItem = serde_json::from_str(r#"{"barcode": null}"#).unwrap();
        assert_eq!(update.barcode, Some(None));

        // Explicit value
        let update: UpdateItem = serde_json::from_str(r#"{"barcode": "0123456789"}"#).unwrap();
        assert_eq!(update.barcode, Some(Some("0123456789".to_string())));

        // Clearing the asking price takes the item off the selling list
        let update: UpdateItem = serde_json::from_str(r#"{"asking_price": null}"#).unwrap();
        assert_eq!(update.asking_price, Some(None));
        assert!(!update.is_empty());

        // Moving to uncategorized
        let update: UpdateItem = serde_json::from_str(r#"{"collection_id": null}"#).unwrap();
        assert_eq!(update.collection_id, Some(None));
    }

    #[test]
    fn test_update_item_custom_fields() {
        let update: UpdateItem =
            serde_json::from_str(r#"{"custom_fields": {"region": "PAL"}}"#).unwrap();
        assert_eq!(
            update.custom_fields,
            Some(serde_json::json!({"region": "PAL"}))
        );
        assert!(!update.is_empty());
    }

    #[test]
    fn test_validate_images_count_limit() {
        let ok: Vec<String> = (0..5).map(|i| format!("data:image/png;base64,{}", i)).collect();
        assert!(validate_images(&ok).is_ok());

        let too_many: Vec<String> = (0..6).map(|i| format!("data:image/png;base64,{}", i)).collect();
        let err = validate_images(&too_many).unwrap_err();
        assert!(err.contains("At most 5"));
    }

    #[test]
    fn test_validate_images_size_limit() {
        let huge = vec!["x".repeat(MAX_TOTAL_IMAGE_BYTES + 1)];
        let err = validate_images(&huge).unwrap_err();
        assert!(err.contains("size limit"));

        assert!(validate_images(&[]).is_ok());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("mario"), "mario");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
