/// Collection model and database operations
///
/// A collection is a named grouping of items owned by one user. The
/// `item_count` field is derived: every query computes it with a correlated
/// COUNT over the items table, so it can never drift from the number of
/// items referencing the collection.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE collections (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     category VARCHAR(64) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     share_code VARCHAR(32) UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Categories the app knows about and offers in its picker
///
/// The category column is an open enumeration: unknown values are accepted
/// so older servers keep working when the client adds new categories.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "video games",
    "trading cards",
    "comics",
    "coins",
    "stamps",
    "toys",
    "vinyl records",
    "books",
    "memorabilia",
    "other",
];

/// Checks whether a category is in the known set (case-insensitive)
pub fn is_known_category(category: &str) -> bool {
    KNOWN_CATEGORIES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(category))
}

/// Collection model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    /// Unique collection ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Category (open enumeration, see [`KNOWN_CATEGORIES`])
    pub category: String,

    /// Free-form description
    pub description: String,

    /// Active share code, if the collection has been shared
    pub share_code: Option<String>,

    /// When the collection was created
    pub created_at: DateTime<Utc>,

    /// Number of items currently referencing this collection (derived)
    pub item_count: i64,
}

/// Input for creating a new collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Category
    pub category: String,

    /// Optional description (defaults to empty)
    pub description: Option<String>,
}

/// Columns selected by every collection query, including the derived count
const SELECT_COLUMNS: &str = r#"
    c.id, c.user_id, c.name, c.category, c.description, c.share_code, c.created_at,
    (SELECT COUNT(*) FROM items i WHERE i.collection_id = c.id) AS item_count
"#;

impl Collection {
    /// Creates a new collection
    ///
    /// The returned collection has `item_count = 0` by construction.
    pub async fn create(pool: &PgPool, data: CreateCollection) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            WITH inserted AS (
                INSERT INTO collections (user_id, name, category, description)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {} FROM inserted c
            "#,
            SELECT_COLUMNS
        );

        let collection = sqlx::query_as::<_, Collection>(&query)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.category)
            .bind(data.description.unwrap_or_default())
            .fetch_one(pool)
            .await?;

        Ok(collection)
    }

    /// Lists all collections owned by a user, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM collections c
            WHERE c.user_id = $1
            ORDER BY c.created_at DESC
            "#,
            SELECT_COLUMNS
        );

        let collections = sqlx::query_as::<_, Collection>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(collections)
    }

    /// Finds a collection by ID, scoped to the owning user
    ///
    /// Returns `None` both when the id is unknown and when the collection
    /// belongs to a different user.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM collections c
            WHERE c.id = $1 AND c.user_id = $2
            "#,
            SELECT_COLUMNS
        );

        let collection = sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(collection)
    }

    /// Finds a collection by its share code (no user scoping; public path)
    pub async fn find_by_share_code(
        pool: &PgPool,
        share_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM collections c
            WHERE c.share_code = $1
            "#,
            SELECT_COLUMNS
        );

        let collection = sqlx::query_as::<_, Collection>(&query)
            .bind(share_code)
            .fetch_optional(pool)
            .await?;

        Ok(collection)
    }

    /// Deletes a collection, scoped to the owning user
    ///
    /// Items referencing the collection are removed in the same statement
    /// via the `ON DELETE CASCADE` foreign key, so the cascade is atomic.
    ///
    /// # Returns
    ///
    /// `true` if the collection was deleted, `false` if it didn't exist or
    /// belongs to someone else.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets (or replaces) the share code on a collection
    ///
    /// Overwrites any previous code: only one code is active per collection
    /// at a time, and old codes stop working immediately.
    ///
    /// # Returns
    ///
    /// `true` if the collection was updated, `false` on missing/foreign id.
    pub async fn set_share_code(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        share_code: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE collections SET share_code = $3 WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .bind(share_code)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_known_category() {
        assert!(is_known_category("video games"));
        assert!(is_known_category("Video Games"));
        assert!(is_known_category("COINS"));

        assert!(!is_known_category("spaceships"));
        assert!(!is_known_category(""));
    }

    #[test]
    fn test_known_categories_are_lowercase() {
        for category in KNOWN_CATEGORIES {
            assert_eq!(*category, category.to_lowercase().as_str());
        }
    }

    // Integration tests for database operations live in curio-api/tests/
}
