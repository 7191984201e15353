//! SmartPark Central Service
//!
//! Parking-lot management backend: gate coordination, slot allocation,
//! wallet-based fare payment and ANPR plate detection.
//! Reads configuration from TOML file (~/.config/smartpark/config.toml).

use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use smartpark::application::{NoopNotifier, Notifier, ParkingService, PlateDetector, WalletService};
use smartpark::auth::JwtConfig;
use smartpark::config::AppConfig;
use smartpark::infrastructure::anpr::AnprClient;
use smartpark::infrastructure::database::migrator::Migrator;
use smartpark::infrastructure::push::PushClient;
use smartpark::{
    create_api_router, default_config_path, init_database, DatabaseConfig, SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("SMARTPARK_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting SmartPark Central Service...");
    smartpark::api::handlers::health::mark_started();

    // ── Build sub-configs from AppConfig ───────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        expiration_hours: app_cfg.security.jwt_expiration_hours,
        issuer: "smartpark".to_string(),
    };
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    create_default_admin(&db, &app_cfg).await;

    let repos: Arc<dyn smartpark::domain::RepositoryProvider> =
        Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // ── Outbound integrations ──────────────────────────────────
    let notifier: Arc<dyn Notifier> = match (&app_cfg.push.endpoint, &app_cfg.push.api_key) {
        (Some(endpoint), Some(api_key)) => {
            info!("Push delivery enabled via {}", endpoint);
            Arc::new(PushClient::new(endpoint, api_key, Arc::clone(&repos)))
        }
        _ => {
            info!("Push delivery disabled (no endpoint configured)");
            Arc::new(NoopNotifier)
        }
    };

    let detector: Option<Arc<dyn PlateDetector>> = match &app_cfg.anpr.base_url {
        Some(base_url) => {
            info!("Plate detection enabled via {}", base_url);
            Some(Arc::new(AnprClient::new(
                base_url,
                Duration::from_secs(app_cfg.anpr.timeout_seconds),
            )))
        }
        None => {
            info!("Plate detection disabled (no base_url configured)");
            None
        }
    };

    // ── Services ───────────────────────────────────────────────
    let wallet_service = Arc::new(WalletService::new(
        Arc::clone(&repos),
        Arc::clone(&notifier),
        app_cfg.wallet.low_balance_threshold,
    ));
    let parking_service = Arc::new(ParkingService::new(
        Arc::clone(&repos),
        Arc::clone(&wallet_service),
        notifier,
    ));

    // ── REST API server ────────────────────────────────────────
    let api_router = create_api_router(
        repos,
        parking_service,
        wallet_service,
        detector,
        jwt_config,
        app_cfg.security.bcrypt_cost,
    );

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    axum::serve(listener, api_router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("SmartPark Central Service shutdown complete");
    Ok(())
}

/// Create the bootstrap dashboard account if no admin exists
async fn create_default_admin(db: &sea_orm::DatabaseConnection, app_cfg: &AppConfig) {
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use smartpark::auth::hash_password;
    use smartpark::infrastructure::database::entities::admin_user::{self, AdminRole};

    let admin_count = admin_user::Entity::find().count(db).await.unwrap_or(0);
    if admin_count > 0 {
        return;
    }

    info!("Creating default admin user...");

    let password_hash = match hash_password(&app_cfg.admin.password, app_cfg.security.bcrypt_cost) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    let now = chrono::Utc::now();
    let admin = admin_user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(app_cfg.admin.username.clone()),
        email: Set(app_cfg.admin.email.clone()),
        password_hash: Set(password_hash),
        role: Set(AdminRole::Admin),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
    };

    match admin.insert(db).await {
        Ok(created) => info!(
            "Default admin '{}' created (change the password immediately)",
            created.username
        ),
        Err(e) => error!("Failed to create default admin: {}", e),
    }
}
