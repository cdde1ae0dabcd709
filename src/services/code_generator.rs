//! Short code generation
//!
//! Codes are drawn byte by byte from the thread-local CSPRNG and mapped onto the
//! alphabet. The generated code is claimed through
//! [`Registry::insert_if_absent`], so two concurrent generators can never end up
//! with the same code.

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::LinksConfig;
use crate::errors::{LinkError, Result};
use crate::storage::{Record, Registry};
use crate::system::ClockCache;

/// 短码字符表
///
/// 字符表大小整除 256 时直接取模（无偏差）；否则丢弃落在
/// 最大整倍数之外的字节（拒绝采样）。
#[derive(Debug, Clone)]
pub struct Alphabet {
    chars: Vec<u8>,
    members: [bool; 256],
    /// 可接受的字节上界（不含），等于不超过 256 的字符表大小的最大整倍数
    accept_below: u16,
}

impl Alphabet {
    /// URL 路径中无需转义的字符
    const URL_SAFE_SYMBOLS: &'static [u8] = b"-_.~";

    pub fn new(chars: &str) -> Result<Self> {
        let bytes = chars.as_bytes();
        if bytes.is_empty() {
            return Err(LinkError::config("alphabet must not be empty"));
        }
        if bytes.len() > 256 {
            return Err(LinkError::config(format!(
                "alphabet has {} characters, at most 256 are supported",
                bytes.len()
            )));
        }

        let mut members = [false; 256];
        for &b in bytes {
            if !(b.is_ascii_alphanumeric() || Self::URL_SAFE_SYMBOLS.contains(&b)) {
                return Err(LinkError::config(format!(
                    "alphabet character {:?} is not URL-safe (allowed: A-Z a-z 0-9 - _ . ~)",
                    b as char
                )));
            }
            if members[b as usize] {
                return Err(LinkError::config(format!(
                    "alphabet contains duplicate character {:?}",
                    b as char
                )));
            }
            members[b as usize] = true;
        }

        let len = bytes.len() as u16;
        Ok(Self {
            chars: bytes.to_vec(),
            members,
            accept_below: 256 / len * len,
        })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    #[inline]
    pub fn contains(&self, c: u8) -> bool {
        self.members[c as usize]
    }

    /// 字符表大小是否整除 256（即每个随机字节都可用）
    pub fn is_modulo_unbiased(&self) -> bool {
        self.accept_below == 256
    }

    /// 把一个随机字节映射为字符，拒绝采样时返回 `None`
    #[inline]
    pub fn map_byte(&self, byte: u8) -> Option<u8> {
        if u16::from(byte) >= self.accept_below {
            return None;
        }
        Some(self.chars[byte as usize % self.chars.len()])
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        // 默认字符表是编译期常量，校验必然通过
        Self::new(crate::config::DEFAULT_ALPHABET).unwrap_or_else(|e| unreachable!("{e}"))
    }
}

/// Claims fresh short codes in a [`Registry`].
pub struct CodeGenerator {
    registry: Arc<Registry>,
    clock: Arc<ClockCache>,
    alphabet: Alphabet,
    code_length: usize,
    max_attempts: u32,
}

impl CodeGenerator {
    pub fn new(
        registry: Arc<Registry>,
        clock: Arc<ClockCache>,
        alphabet: Alphabet,
        code_length: usize,
        max_attempts: u32,
    ) -> Self {
        Self {
            registry,
            clock,
            alphabet,
            code_length: code_length.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(
        config: &LinksConfig,
        registry: Arc<Registry>,
        clock: Arc<ClockCache>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            registry,
            clock,
            Alphabet::new(&config.alphabet)?,
            config.code_length,
            config.max_generate_attempts,
        ))
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Draws a random code without touching the registry.
    pub fn random_code(&self) -> String {
        let mut code = String::with_capacity(self.code_length);
        while code.len() < self.code_length {
            if let Some(c) = self.alphabet.map_byte(rand::random::<u8>()) {
                code.push(c as char);
            }
        }
        code
    }

    /// Generates a code and stores `resource` under it.
    ///
    /// The record is stamped with the cached clock value. Collisions are retried
    /// up to the configured attempt cap, after which the call fails with
    /// [`LinkError::CollisionRetryExhausted`].
    ///
    /// # Errors
    /// - `ClockNotStarted` if the clock cache was never started
    /// - `CollisionRetryExhausted` if every attempt hit an existing code
    pub fn generate(&self, resource: &str) -> Result<String> {
        let now = self.clock.try_now()?;

        for attempt in 1..=self.max_attempts {
            let code = self.random_code();
            if self
                .registry
                .insert_if_absent(&code, Record::new(resource, now))
            {
                if attempt > 1 {
                    debug!("Claimed short code {} after {} attempts", code, attempt);
                }
                return Ok(code);
            }
            debug!("Short code collision on attempt {}: {}", attempt, code);
        }

        error!(
            "Failed to claim a free short code after {} attempts ({} links stored)",
            self.max_attempts,
            self.registry.len()
        );
        Err(LinkError::collision_retry_exhausted(format!(
            "no free short code found after {} attempts",
            self.max_attempts
        )))
    }

    /// Returns true if `code` has the configured length and only alphabet characters.
    pub fn is_well_formed(&self, code: &str) -> bool {
        code.len() == self.code_length && code.bytes().all(|b| self.alphabet.contains(b))
    }
}
