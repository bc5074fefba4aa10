/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - JWT token generation
/// - Request building helpers

use axum::body::Body;
use axum::http::{header, Request};
use curio_api::app::{build_router, AppState};
use curio_api::config::Config;
use curio_shared::auth::jwt::{create_token, Claims, TokenType};
use curio_shared::auth::password;
use curio_shared::models::collection::{Collection, CreateCollection};
use curio_shared::models::item::{CreateItem, Item, ItemCondition};
use curio_shared::models::user::{CreateUser, User};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh test user
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../curio-shared/migrations").run(&db).await?;

        // Create test user with a real password hash so login tests work
        let user = User::create(
            &db,
            CreateUser {
                username: format!("test-{}", Uuid::new_v4()),
                email: None,
                password_hash: password::hash_password("pw123")?,
            },
        )
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Delete test user (cascades to collections and items)
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Builds a JSON request with an optional bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

/// Reads a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper to create a test collection
pub async fn create_test_collection(
    ctx: &TestContext,
    name: &str,
    category: &str,
) -> anyhow::Result<Collection> {
    let collection = Collection::create(
        &ctx.db,
        CreateCollection {
            user_id: ctx.user.id,
            name: name.to_string(),
            category: category.to_string(),
            description: None,
        },
    )
    .await?;

    Ok(collection)
}

/// Helper to create a test item
pub async fn create_test_item(
    ctx: &TestContext,
    name: &str,
    collection_id: Option<Uuid>,
    is_wishlist: bool,
) -> anyhow::Result<Item> {
    let item = Item::create(
        &ctx.db,
        CreateItem {
            user_id: ctx.user.id,
            collection_id,
            name: name.to_string(),
            description: None,
            images: vec![],
            barcode: None,
            purchase_price: Decimal::ZERO,
            current_value: Decimal::ZERO,
            asking_price: None,
            condition: ItemCondition::Good,
            is_wishlist,
            custom_fields: serde_json::json!({}),
        },
    )
    .await?;

    Ok(item)
}
