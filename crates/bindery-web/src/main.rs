mod api;
mod auth;
mod config;
mod db;
mod dto;
mod error;
mod middleware;
mod providers;
mod state;
mod static_files;

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::middleware::from_fn;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bindery_core::{LoginRateLimiter, RateLimitPolicy};

use crate::config::ServerConfig;
use crate::db::Database;
use crate::providers::{EmailClient, MailingListClient, PaymentsClient};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bindery_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let tls_config = config.tls.clone();
    let tls_enabled = tls_config.cert_path.is_some() && tls_config.key_path.is_some();

    let login_limiter = Arc::new(LoginRateLimiter::new(RateLimitPolicy {
        max_attempts: config.rate_limit.max_login_attempts,
        window_seconds: config.rate_limit.window_seconds,
    }));

    // One connection pool shared by every provider client.
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()?;

    let state = AppState {
        payments: PaymentsClient::new(http.clone(), &config.payments),
        email: EmailClient::new(http.clone(), &config.email),
        mailing_list: MailingListClient::new(http.clone(), &config.mailing_list),
        db: Database::new(http, &config.database),
        login_limiter: login_limiter.clone(),
        config: Arc::new(config),
    };

    // Sweep rate-limit entries whose attempts have all aged out.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            login_limiter.sweep(crate::auth::unix_now());
        }
    });

    // Same-origin usage only: no origins are allowed, the layer just scopes
    // methods/headers for the occasional preflight.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ]);

    // Bot guard only on the form routes, not the rest of the API.
    let form_routes = api::form_router().layer(from_fn(middleware::bot_guard::bot_guard));

    let base_router = axum::Router::new()
        .nest(
            "/api",
            api::public_router().merge(form_routes).merge(api::admin_router()),
        )
        .fallback(static_files::static_handler);

    let app = if tls_enabled {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers_with_hsts))
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    } else {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers))
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    };

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;
        tracing::info!("bindery-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("bindery-web listening on http://{}", bind_addr);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await?;
    }

    Ok(())
}
