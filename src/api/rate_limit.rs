//! 按客户端 IP 限流

use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};
use governor::middleware::NoOpMiddleware;
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::errors::{LinkError, Result};

pub type RateLimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// 创建请求限流配置
///
/// 每个对端 IP 最多突发 `burst_size` 次请求，令牌每 `period_secs / burst_size`
/// 补充一个。超限返回 HTTP 429 Too Many Requests。
///
/// 限流状态保存在配置中，每个 worker 用 `Governor::new(&config)` 包装后共享同一份计数。
pub fn rate_limiter(config: &RateLimitConfig) -> Result<RateLimiterConfig> {
    let interval_ms = config.replenish_interval_ms();
    let governor_config = GovernorConfigBuilder::default()
        .milliseconds_per_request(interval_ms)
        .burst_size(config.burst_size.max(1))
        .finish()
        .ok_or_else(|| LinkError::config("invalid rate limit configuration"))?;

    debug!(
        "Rate limiter created: burst {}, one token every {}ms",
        config.burst_size, interval_ms
    );
    Ok(governor_config)
}
