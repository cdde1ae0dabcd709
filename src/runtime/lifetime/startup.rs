use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::services::{CodeGenerator, ExpirationSweeper, LinkService, SweeperHandle};
use crate::storage::Registry;
use crate::system::ClockCache;

/// 启动后共享的服务对象
pub struct StartupContext {
    pub clock: Arc<ClockCache>,
    pub registry: Arc<Registry>,
    pub link_service: Arc<LinkService>,
    pub sweeper: SweeperHandle,
}

/// 准备服务器启动的上下文
///
/// 顺序：校验配置 → 构建注册表与生成器 → 启动时钟 → 启动过期清理任务。
/// 必须在 Tokio 运行时中调用。
pub fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config.validate().context("Invalid configuration")?;

    let clock = Arc::new(ClockCache::new());
    let registry = Arc::new(Registry::new());

    let generator = Arc::new(
        CodeGenerator::from_config(&config.links, Arc::clone(&registry), Arc::clone(&clock))
            .context("Failed to create short code generator")?,
    );
    if !generator.alphabet().is_modulo_unbiased() {
        info!(
            "Alphabet size {} does not divide 256, using rejection sampling",
            generator.alphabet().len()
        );
    }

    let link_service = Arc::new(LinkService::new(Arc::clone(&registry), generator));

    clock.start().context("Failed to start clock cache")?;

    let sweeper = Arc::new(ExpirationSweeper::from_config(
        &config.links,
        Arc::clone(&registry),
        Arc::clone(&clock),
    ))
    .spawn()
    .context("Failed to start expired link sweeper")?;

    info!(
        "Links expire after {}s, code length {}, alphabet size {}",
        config.links.retention_secs,
        config.links.code_length,
        config.links.alphabet.len()
    );
    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        clock,
        registry,
        link_service,
        sweeper,
    })
}
