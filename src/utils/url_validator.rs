//! URL 验证模块
//!
//! 在进入核心之前校验目标地址：只接受带主机名的 http/https 绝对地址。

use url::Url;

use crate::errors::LinkError;

/// URL 验证错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    DangerousProtocol(String),
    InvalidProtocol(String),
    InvalidFormat(String),
    MissingHost,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::DangerousProtocol(proto) => write!(f, "Dangerous protocol blocked: {}", proto),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
            Self::MissingHost => write!(f, "URL must contain a host"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for LinkError {
    fn from(err: UrlValidationError) -> Self {
        LinkError::invalid_input(err.to_string())
    }
}

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

/// 验证目标 URL
///
/// 1. 去除首尾空白后不为空
/// 2. 可以被解析为绝对 URL
/// 3. 协议不是危险协议，且必须是 http / https
/// 4. 包含主机名
pub fn validate_url(raw: &str) -> Result<(), UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url = Url::parse(raw).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    // Url 会把 scheme 统一转成小写
    let scheme = url.scheme();
    if DANGEROUS_PROTOCOLS.contains(&scheme) {
        return Err(UrlValidationError::DangerousProtocol(format!("{}:", scheme)));
    }
    if scheme != "http" && scheme != "https" {
        return Err(UrlValidationError::InvalidProtocol(format!("{}:", scheme)));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
