//! Server mode
//!
//! Builds the shared services, starts the background tasks and runs the
//! HTTP server until a shutdown signal arrives.

use actix_governor::Governor;
use actix_web::{
    App, HttpServer,
    middleware::{Condition, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::api;
use crate::config::AppConfig;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// This function:
/// 1. Prepares the clock cache, registry, link service and sweeper
/// 2. Configures and starts the HTTP server
/// 3. Stops everything on Ctrl+C / SIGTERM
///
/// The sweeper dying is fatal: the server is stopped and an error returned,
/// since without eviction the registry grows without bound.
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: AppConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config).map_err(|e| {
        error!("Server startup failed: {:#}", e);
        e
    })?;

    let links = web::Data::from(startup.link_service.clone());
    let body_limit = config.server.body_limit;
    let rate_limit_enabled = config.rate_limit.enabled;
    let governor_config = api::rate_limiter(&config.rate_limit).context("Failed to build rate limiter")?;

    if rate_limit_enabled {
        info!(
            "Rate limiting enabled: {} requests per {}s per client",
            config.rate_limit.burst_size, config.rate_limit.period_secs
        );
    } else {
        warn!("Rate limiting is disabled");
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(rate_limit_enabled, Governor::new(&governor_config)))
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .configure(|cfg| api::configure(cfg, links.clone(), body_limit))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    let server_handle = server.handle();
    let (sweeper_stop, mut sweeper_task) = startup.sweeper.into_parts();

    tokio::select! {
        res = server => {
            res.context("HTTP server terminated with an error")?;
        }
        _ = lifetime::shutdown::wait_for_shutdown_signal() => {
            server_handle.stop(true).await;
            info!("HTTP server stopped");
        }
        joined = &mut sweeper_task => {
            match joined {
                Ok(()) => error!("Expired link sweeper exited unexpectedly"),
                Err(e) => error!("Expired link sweeper crashed: {}", e),
            }
            server_handle.stop(false).await;
            startup.clock.stop();
            anyhow::bail!("expired link sweeper terminated, refusing to run without eviction");
        }
    }

    lifetime::shutdown::stop_background_tasks(sweeper_stop, sweeper_task, &startup.clock).await;
    info!(
        "Shutdown complete, {} links discarded",
        startup.registry.len()
    );
    Ok(())
}
