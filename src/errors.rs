use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    CollisionRetryExhausted(String),
    NotFound(String),
    ClockNotStarted(String),
    InvalidInput(String),
    Config(String),
}

impl LinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkError::CollisionRetryExhausted(_) => "E001",
            LinkError::NotFound(_) => "E002",
            LinkError::ClockNotStarted(_) => "E003",
            LinkError::InvalidInput(_) => "E004",
            LinkError::Config(_) => "E005",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkError::CollisionRetryExhausted(_) => "Collision Retry Exhausted",
            LinkError::NotFound(_) => "Link Not Found",
            LinkError::ClockNotStarted(_) => "Clock Not Started",
            LinkError::InvalidInput(_) => "Invalid Input",
            LinkError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkError::CollisionRetryExhausted(msg) => msg,
            LinkError::NotFound(msg) => msg,
            LinkError::ClockNotStarted(msg) => msg,
            LinkError::InvalidInput(msg) => msg,
            LinkError::Config(msg) => msg,
        }
    }

    /// 是否为内部故障（对外返回 500）
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LinkError::CollisionRetryExhausted(_) | LinkError::ClockNotStarted(_)
        )
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkError {}

// 便捷的构造函数
impl LinkError {
    pub fn collision_retry_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkError::CollisionRetryExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkError::NotFound(msg.into())
    }

    pub fn clock_not_started<T: Into<String>>(msg: T) -> Self {
        LinkError::ClockNotStarted(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        LinkError::InvalidInput(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkError::Config(msg.into())
    }
}

impl From<config::ConfigError> for LinkError {
    fn from(err: config::ConfigError) -> Self {
        LinkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LinkError {
    fn from(err: toml::ser::Error) -> Self {
        LinkError::Config(err.to_string())
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
