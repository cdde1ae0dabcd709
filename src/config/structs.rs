use serde::{Deserialize, Serialize};

use crate::errors::{LinkError, Result};

/// 默认短码字符表（64 个字符，整除 256，取模无偏差）
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，例如 EL__SERVER__PORT=9999
pub const ENV_PREFIX: &str = "EL";

/// 应用配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量、请求体大小限制
/// - links: 短码长度、字符表、保留时间、清理周期
/// - rate_limit: 按客户端 IP 限流
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// 指定的文件不存在时忽略，解析失败时返回错误。
    pub fn load_from(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 EL，分隔符 __
            // 不开启 try_parsing：值保持字符串，反序列化时再按字段类型转换，
            // 否则 "0123456789" 这样的字符表会被当成整数丢掉前导 0
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config = settings.try_deserialize::<AppConfig>()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        config.validate()?;
        Ok(config)
    }

    /// 从默认路径加载
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn validate(&self) -> Result<()> {
        self.links.validate()?;
        self.rate_limit.validate()?;
        if self.server.body_limit == 0 {
            return Err(LinkError::config("server.body_limit must be greater than 0"));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// JSON 请求体最大字节数
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

/// 短链接核心配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
    /// 保留窗口（秒），存活时间达到该值的记录会在下一次清理时删除
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u32,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// 生成短码时的最大碰撞重试次数
    #[serde(default = "default_max_generate_attempts")]
    pub max_generate_attempts: u32,
}

impl LinksConfig {
    pub fn validate(&self) -> Result<()> {
        if self.code_length == 0 {
            return Err(LinkError::config("links.code_length must be at least 1"));
        }
        if self.retention_secs == 0 {
            return Err(LinkError::config("links.retention_secs must be at least 1"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(LinkError::config(
                "links.sweep_interval_secs must be at least 1",
            ));
        }
        if self.max_generate_attempts == 0 {
            return Err(LinkError::config(
                "links.max_generate_attempts must be at least 1",
            ));
        }
        crate::services::Alphabet::new(&self.alphabet)?;
        Ok(())
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 限流配置：每个客户端 IP 在 `period_secs` 内最多 `burst_size` 次请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.burst_size == 0 || self.period_secs == 0 {
            return Err(LinkError::config(
                "rate_limit.burst_size and rate_limit.period_secs must be greater than 0",
            ));
        }
        Ok(())
    }

    /// 令牌补充间隔（毫秒）
    pub fn replenish_interval_ms(&self) -> u64 {
        (self.period_secs * 1000 / u64::from(self.burst_size.max(1))).max(1)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_body_limit() -> usize {
    4096
}

fn default_code_length() -> usize {
    6
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_retention_secs() -> u32 {
    3 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    30 * 60
}

fn default_max_generate_attempts() -> u32 {
    16
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_burst_size() -> u32 {
    34
}

fn default_period_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            body_limit: default_body_limit(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            alphabet: default_alphabet(),
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_generate_attempts: default_max_generate_attempts(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            burst_size: default_burst_size(),
            period_secs: default_period_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.body_limit, 4096);
        assert_eq!(config.links.code_length, 6);
        assert_eq!(config.links.alphabet.len(), 64);
        assert_eq!(config.links.retention_secs, 10_800);
        assert_eq!(config.links.sweep_interval_secs, 1_800);
        assert_eq!(config.rate_limit.burst_size, 34);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_links_config() {
        let mut config = AppConfig::default();
        config.links.code_length = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.links.alphabet = "aa".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.links.max_generate_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_rate_limit_skips_validation() {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.burst_size = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_replenish_interval() {
        let rate = RateLimitConfig::default();
        assert_eq!(rate.replenish_interval_ms(), 60_000 / 34);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = AppConfig::generate_sample_config();
        assert!(sample.contains("[links]"));
        let parsed: AppConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.links.alphabet, DEFAULT_ALPHABET);
    }
}
