/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use curio_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = curio_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use curio_shared::auth::{jwt, middleware::AuthContext};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register        # Create account (public)
///     │   ├── POST /login           # Get tokens (public)
///     │   ├── POST /refresh         # Exchange refresh token (public)
///     │   └── GET  /me              # Current user (authenticated)
///     ├── /collections/
///     │   ├── GET    /              # List own collections
///     │   ├── POST   /              # Create collection
///     │   ├── GET    /:id           # Get one collection
///     │   └── DELETE /:id           # Delete collection (+items)
///     ├── /items/
///     │   ├── GET    /              # List owned (non-wishlist) items
///     │   ├── POST   /              # Create item
///     │   ├── GET    /collection/:collection_id
///     │   ├── GET    /status/:status  # wishlist | selling | owned | all
///     │   ├── GET    /search?q=     # Substring search
///     │   ├── GET    /:id           # Get one item
///     │   ├── PUT    /:id           # Partial update
///     │   └── DELETE /:id           # Delete item
///     └── /share/
///         ├── POST /collection/:id  # Generate share code (authenticated)
///         └── GET  /:code           # Public shared view (no auth)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register/login/refresh are public, /me requires a token
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    // Collection routes (require JWT authentication)
    let collection_routes = Router::new()
        .route("/", get(routes::collections::list_collections))
        .route("/", post(routes::collections::create_collection))
        .route("/:id", get(routes::collections::get_collection))
        .route("/:id", delete(routes::collections::delete_collection))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Item routes (require JWT authentication)
    let item_routes = Router::new()
        .route("/", get(routes::items::list_items))
        .route("/", post(routes::items::create_item))
        .route(
            "/collection/:collection_id",
            get(routes::items::list_items_by_collection),
        )
        .route("/status/:status", get(routes::items::list_items_by_status))
        .route("/search", get(routes::items::search_items))
        .route("/:id", get(routes::items::get_item))
        .route("/:id", put(routes::items::update_item))
        .route("/:id", delete(routes::items::delete_item))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Share routes: generating a code requires auth, viewing is public
    let share_routes = Router::new()
        .route("/:code", get(routes::share::view_shared_collection))
        .merge(
            Router::new()
                .route("/collection/:id", post(routes::share::share_collection))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    // Build complete /api surface
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/collections", collection_routes)
        .nest("/items", item_routes)
        .nest("/share", share_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates JWT token from Authorization header,
/// then injects AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Expected Bearer token".to_string())
        })?;

    // Validate token
    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // Create auth context
    let auth_context = AuthContext::from_jwt(claims.sub);

    // Insert into request extensions
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
