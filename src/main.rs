//! MemberPay service binary.
//!
//! Wires configuration, the Postgres pool, gateway clients, the
//! accounts client, and the notification worker into the verification
//! router, then serves it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::HeaderValue;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memberpay::adapters::accounts::{AccountsConfig, HttpAccountService};
use memberpay::adapters::gateways::{
    FlutterwaveConfig, FlutterwaveGateway, GatewayRegistry, PaystackConfig, PaystackGateway,
};
use memberpay::adapters::http::{verification_router, VerificationAppState};
use memberpay::adapters::notify::{ChannelNotifier, HttpNotificationSink, NotifySinkConfig};
use memberpay::adapters::postgres::{
    PostgresMembershipStore, PostgresPaymentRepository, PostgresReferralStore,
};
use memberpay::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = connect_database(&config).await?;

    let state = build_state(&config, pool);

    let app = build_router(&config, state);

    let addr = config.server.socket_addr()?;
    info!(%addr, environment = ?config.server.environment, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn connect_database(config: &AppConfig) -> Result<PgPool, Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    Ok(pool)
}

fn build_registry(config: &AppConfig) -> GatewayRegistry {
    let mut registry = GatewayRegistry::new();

    let paystack = &config.gateways.paystack;
    if paystack.is_enabled() {
        let mut gw_config = PaystackConfig::new(paystack.secret_key.clone());
        if let Some(url) = &paystack.api_base_url {
            gw_config = gw_config.with_base_url(url.clone());
        }
        registry = registry.with_client(Arc::new(PaystackGateway::new(gw_config)));
        info!("paystack gateway registered");
    }

    let flutterwave = &config.gateways.flutterwave;
    if flutterwave.is_enabled() {
        let mut gw_config = FlutterwaveConfig::new(flutterwave.secret_key.clone());
        if let Some(url) = &flutterwave.api_base_url {
            gw_config = gw_config.with_base_url(url.clone());
        }
        registry = registry.with_client(Arc::new(FlutterwaveGateway::new(gw_config)));
        info!("flutterwave gateway registered");
    }

    registry
}

fn build_state(config: &AppConfig, pool: PgPool) -> VerificationAppState {
    let accounts = HttpAccountService::new(AccountsConfig {
        base_url: config.accounts.base_url.clone(),
        service_token: SecretString::new(config.accounts.service_token.clone()),
    });

    let sink = HttpNotificationSink::new(NotifySinkConfig {
        base_url: config.notify.base_url.clone(),
        service_token: SecretString::new(config.notify.service_token.clone()),
    });
    // The worker handle is detached; the queue lives for the process.
    let (notifier, _worker) =
        ChannelNotifier::spawn_with_capacity(Arc::new(sink), config.notify.queue_capacity);

    VerificationAppState {
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        registry: Arc::new(build_registry(config)),
        memberships: Arc::new(PostgresMembershipStore::new(pool.clone())),
        referrals: Arc::new(PostgresReferralStore::new(pool)),
        accounts: Arc::new(accounts),
        notifier: Arc::new(notifier),
        commission_policy: config.commissions.policy(),
    }
}

fn build_router(config: &AppConfig, state: VerificationAppState) -> Router {
    let cors = cors_layer(config);

    verification_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
