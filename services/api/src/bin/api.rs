//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::SqliteStore,
    config::Config,
    error::ApiError,
    notify::{Notifier, TracingObserver},
    web::{
        assignments::{
            create_assignment_handler, delete_assignment_handler, get_assignment_handler,
            list_assignments_handler, update_assignment_handler, ApiDoc,
        },
        auth::{
            ensure_admin_exists, ensure_superadmin_exists, login_handler, logout_handler,
            register_handler,
        },
        directory::{
            create_department_handler, create_device_handler, create_employee_handler,
            delete_department_handler, delete_device_handler, delete_employee_handler,
            get_department_handler, get_device_handler, get_employee_handler,
            list_departments_handler, list_devices_handler, list_employees_handler,
            update_department_handler, update_device_handler, update_employee_handler,
        },
        middleware::require_auth,
        state::AppState,
        users::{delete_user_handler, list_users_handler},
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use inventory_core::ports::NotificationSink;
use inventory_core::service::AssignmentService;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;
    let store = Arc::new(SqliteStore::new(pool));
    info!("Running database migrations...");
    store
        .run_migrations()
        .await
        .map_err(|e| ApiError::Internal(format!("migration failed: {e}")))?;
    info!("Database migrations complete.");

    // --- 3. Seed Default Accounts (idempotent) ---
    ensure_admin_exists(store.as_ref()).await?;
    ensure_superadmin_exists(store.as_ref()).await?;

    // --- 4. Wire Up Notifications and the Assignment Service ---
    let notifier = Arc::new(Notifier::new());
    notifier.register(Arc::new(TracingObserver));
    let sink: Arc<dyn NotificationSink> = notifier;
    let assignments = Arc::new(AssignmentService::new(store.clone(), sink));

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        assignments,
        users: store.clone(),
        directory: store,
        config: config.clone(),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid CORS_ORIGIN: {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/assignments",
            get(list_assignments_handler).post(create_assignment_handler),
        )
        .route(
            "/assignments/{id}",
            get(get_assignment_handler)
                .put(update_assignment_handler)
                .patch(update_assignment_handler)
                .delete(delete_assignment_handler),
        )
        .route(
            "/departments",
            get(list_departments_handler).post(create_department_handler),
        )
        .route(
            "/departments/{id}",
            get(get_department_handler)
                .put(update_department_handler)
                .patch(update_department_handler)
                .delete(delete_department_handler),
        )
        .route(
            "/employees",
            get(list_employees_handler).post(create_employee_handler),
        )
        .route(
            "/employees/{id}",
            get(get_employee_handler)
                .put(update_employee_handler)
                .patch(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .route(
            "/devices",
            get(list_devices_handler).post(create_device_handler),
        )
        .route(
            "/devices/{id}",
            get(get_device_handler)
                .put(update_device_handler)
                .patch(update_device_handler)
                .delete(delete_device_handler),
        )
        .route("/users", get(list_users_handler))
        .route("/users/{id}", axum::routing::delete(delete_user_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
