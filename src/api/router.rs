//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::{
    ApiResponse, LotDto, PaginatedResponse, PaginationParams, SessionDto, SlotDto, TransactionDto,
    WalletDto,
};
use crate::api::handlers::{
    anpr, app, app_auth, auth, dashboard, gate, health, lots, sessions, wallet,
};
use crate::application::services::parking::{
    EntryGrant, EntryOutcome, ExitOutcome, ExitSummary, GateAction,
};
use crate::application::{ParkingService, PlateDetector, WalletService};
use crate::auth::jwt::JwtConfig;
use crate::auth::middleware::{admin_auth_middleware, user_auth_middleware, AuthState};
use crate::domain::RepositoryProvider;

/// Unified state for all mobile-app routes (auth + lots + vehicles +
/// sessions + wallet). Axum extracts the specific handler state via
/// `FromRef`, so the whole `/api/v1/app` tree lives in ONE router and
/// matchit sees every parametric segment together.
#[derive(Clone)]
pub struct AppUnifiedState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub wallet: Arc<WalletService>,
    pub auth: AuthState,
    pub bcrypt_cost: u32,
}

impl FromRef<AppUnifiedState> for app::AppState {
    fn from_ref(s: &AppUnifiedState) -> Self {
        app::AppState {
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<AppUnifiedState> for app_auth::AppAuthState {
    fn from_ref(s: &AppUnifiedState) -> Self {
        app_auth::AppAuthState {
            repos: Arc::clone(&s.repos),
            jwt_config: s.auth.jwt_config.clone(),
            bcrypt_cost: s.bcrypt_cost,
        }
    }
}

impl FromRef<AppUnifiedState> for wallet::WalletHandlerState {
    fn from_ref(s: &AppUnifiedState) -> Self {
        wallet::WalletHandlerState {
            wallet: Arc::clone(&s.wallet),
        }
    }
}

impl FromRef<AppUnifiedState> for AuthState {
    fn from_ref(s: &AppUnifiedState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Gate
        gate::gate_entry,
        gate::gate_exit,
        // ANPR
        anpr::anpr_detect,
        anpr::anpr_entry,
        anpr::anpr_exit,
        // Admin auth
        auth::login,
        auth::get_current_admin,
        // Lots
        lots::create_lot,
        lots::list_lots,
        lots::get_lot,
        lots::update_lot,
        lots::create_slots,
        lots::list_slots,
        lots::get_slot_session,
        // Sessions
        sessions::list_sessions,
        // Dashboard
        dashboard::overview,
        // App auth
        app_auth::app_register,
        app_auth::app_login,
        app_auth::set_fcm_token,
        // App
        app::app_list_lots,
        app::app_get_lot,
        app::link_vehicle,
        app::unlink_vehicle,
        app::app_active_sessions,
        app::app_session_history,
        // Wallet
        wallet::get_wallet,
        wallet::start_topup,
        wallet::verify_payment,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            PaginatedResponse<SessionDto>,
            PaginationParams,
            // Domain DTOs
            LotDto,
            SlotDto,
            SessionDto,
            WalletDto,
            TransactionDto,
            // Gate
            gate::EntryRequest,
            gate::ExitRequest,
            GateAction,
            EntryGrant,
            ExitSummary,
            EntryOutcome,
            ExitOutcome,
            // ANPR
            anpr::DetectionDto,
            anpr::AnprEntryResponse,
            anpr::AnprExitResponse,
            // Admin auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::AdminInfo,
            // Lots
            lots::CreateLotRequest,
            lots::UpdateLotRequest,
            lots::CreateSlotsRequest,
            // Dashboard
            dashboard::DashboardOverview,
            // App auth
            app_auth::AppRegisterRequest,
            app_auth::AppLoginRequest,
            app_auth::AppLoginResponse,
            app_auth::AppUserInfo,
            app_auth::FcmTokenRequest,
            // App
            app::LinkVehicleRequest,
            // Wallet
            wallet::WalletView,
            wallet::TopupRequest,
            wallet::TopupOrder,
            wallet::VerifyPaymentRequest,
            // Health
            health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service availability check."),
        (name = "Gate", description = "Entry/exit events from gate hardware. Responses carry a gate directive: `OPEN_ENTRY_GATE`, `DENY_ENTRY`, `OPEN_EXIT_GATE` or `DENY_EXIT`. Denials are 200 responses with `success: false`."),
        (name = "ANPR", description = "Camera-driven gate events. The image goes to the plate-detection service; the best read with status `OK` drives the same flow as the plain gate endpoints."),
        (name = "Authentication", description = "Dashboard login (JWT). The token goes in the `Authorization: Bearer <token>` header. Roles: `admin`, `operator`."),
        (name = "Lots", description = "Parking lot and slot administration. Slots are provisioned in bulk per vehicle type; numbering continues after the highest existing slot."),
        (name = "Sessions", description = "Parking session listing for the dashboard. Status `IN` while parked, `OUT` after exit. Payment: `PENDING`, `PAID`, `UNPAID`, `NO_USER`."),
        (name = "Dashboard", description = "Fleet-wide counters: occupancy, utilization, today's entries/exits and revenue (midnight UTC reset)."),
        (name = "App Auth", description = "Mobile-app accounts: registration, login (JWT with role `user`), push-token registration."),
        (name = "App", description = "Mobile-app surface: open lots with availability, vehicle plate linking (plates are globally unique), own session history."),
        (name = "Wallet", description = "Wallet balance and ledger. Fares are debited on exit when the balance covers them. Top-up is a two-step stub: create an order, then verify the payment to credit the balance. Amounts are in minor currency units."),
    ),
    info(
        title = "SmartPark Central Service API",
        version = "1.0.0",
        description = "REST API for parking-lot management: gate coordination, slot allocation, wallet-based fare payment and ANPR-driven plate detection.

## Authentication

Two JWT audiences share one issuer:
- **Dashboard** (`admin`/`operator` roles): `POST /api/v1/auth/login`
- **Mobile app** (`user` role): `POST /api/v1/app/auth/login`

Pass the token in the `Authorization: Bearer <token>` header. Gate and ANPR endpoints are unauthenticated; they are meant for trusted gate hardware on a private network.

## Response format

All REST responses are wrapped:
```json
{\"success\": true, \"data\": {...}, \"error\": null}
```

Gate endpoints return the directive at the top level instead:
```json
{\"success\": true, \"message\": \"Entry allowed\", \"action\": \"OPEN_ENTRY_GATE\", \"data\": {...}}
```

## Pagination

List endpoints accept `page` (from 1) and `limit` (default 50, max 100).",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

/// Build the application router.
///
/// Public: health, gate, ANPR. Admin routes require a staff JWT, app
/// routes require a `user` JWT.
pub fn create_api_router(
    repos: Arc<dyn RepositoryProvider>,
    parking: Arc<ParkingService>,
    wallet_service: Arc<WalletService>,
    detector: Option<Arc<dyn PlateDetector>>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_state = AuthState {
        jwt_config: jwt_config.clone(),
    };

    // Public gate routes
    let gate_routes = Router::new()
        .route("/entry", post(gate::gate_entry))
        .route("/exit", post(gate::gate_exit))
        .with_state(gate::GateState {
            parking: Arc::clone(&parking),
        });

    let anpr_routes = Router::new()
        .route("/detect", post(anpr::anpr_detect))
        .route("/entry", post(anpr::anpr_entry))
        .route("/exit", post(anpr::anpr_exit))
        .with_state(anpr::AnprState {
            parking: Arc::clone(&parking),
            detector,
        });

    // Dashboard auth routes
    let admin_auth_state = auth::AdminAuthState {
        repos: Arc::clone(&repos),
        jwt_config: jwt_config.clone(),
    };
    let admin_auth_routes = Router::new()
        .route("/login", post(auth::login))
        .with_state(admin_auth_state.clone());
    let admin_auth_protected = Router::new()
        .route("/me", get(auth::get_current_admin))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            admin_auth_middleware,
        ))
        .with_state(admin_auth_state);

    // Lot administration (protected)
    let lot_routes = Router::new()
        .route("/", post(lots::create_lot).get(lots::list_lots))
        .route("/{id}", get(lots::get_lot).patch(lots::update_lot))
        .route("/{id}/slots", post(lots::create_slots).get(lots::list_slots))
        .route("/{id}/slots/{slot_number}/session", get(lots::get_slot_session))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            admin_auth_middleware,
        ))
        .with_state(lots::LotAdminState {
            repos: Arc::clone(&repos),
        });

    // Session listing (protected)
    let session_routes = Router::new()
        .route("/", get(sessions::list_sessions))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            admin_auth_middleware,
        ))
        .with_state(sessions::SessionAdminState {
            repos: Arc::clone(&repos),
        });

    // Dashboard (protected)
    let dashboard_routes = Router::new()
        .route("/overview", get(dashboard::overview))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            admin_auth_middleware,
        ))
        .with_state(dashboard::DashboardState {
            repos: Arc::clone(&repos),
        });

    // ── Mobile app: ONE router with unified state ───────────────────
    let app_unified = AppUnifiedState {
        repos: Arc::clone(&repos),
        wallet: wallet_service,
        auth: auth_state.clone(),
        bcrypt_cost,
    };

    let app_public_routes = Router::new()
        .route("/auth/register", post(app_auth::app_register))
        .route("/auth/login", post(app_auth::app_login))
        .with_state(app_unified.clone());

    let app_protected_routes = Router::new()
        .route("/lots", get(app::app_list_lots))
        .route("/lots/{id}", get(app::app_get_lot))
        .route("/vehicles", post(app::link_vehicle))
        .route("/vehicles/{plate}", delete(app::unlink_vehicle))
        .route("/sessions/active", get(app::app_active_sessions))
        .route("/sessions/history", get(app::app_session_history))
        .route("/wallet", get(wallet::get_wallet))
        .route("/wallet/topup", post(wallet::start_topup))
        .route("/wallet/verify-payment", post(wallet::verify_payment))
        .route("/fcm-token", post(app_auth::set_fcm_token))
        .layer(middleware::from_fn_with_state(
            auth_state,
            user_auth_middleware,
        ))
        .with_state(app_unified);

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(health::health_check))
        // Gate hardware
        .nest("/api/v1/gate", gate_routes)
        .nest("/api/v1/anpr", anpr_routes)
        // Dashboard
        .nest("/api/v1/auth", admin_auth_routes)
        .nest("/api/v1/auth", admin_auth_protected)
        .nest("/api/v1/lots", lot_routes)
        .nest("/api/v1/sessions", session_routes)
        .nest("/api/v1/dashboard", dashboard_routes)
        // Mobile app
        .nest("/api/v1/app", app_public_routes)
        .nest("/api/v1/app", app_protected_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
