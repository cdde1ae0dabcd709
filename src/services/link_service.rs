//! Link service
//!
//! The surface the HTTP layer calls into: create a short link for an already
//! validated resource, resolve a code back to its resource.

use std::sync::Arc;

use tracing::{error, info, trace};

use crate::errors::{LinkError, Result};
use crate::storage::Registry;

use super::code_generator::CodeGenerator;

pub struct LinkService {
    registry: Arc<Registry>,
    generator: Arc<CodeGenerator>,
}

impl LinkService {
    pub fn new(registry: Arc<Registry>, generator: Arc<CodeGenerator>) -> Self {
        Self {
            registry,
            generator,
        }
    }

    /// Creates a short link for `original_resource`.
    ///
    /// The caller is expected to have validated the resource already; only an
    /// empty resource is rejected here.
    pub fn create_short_link(&self, original_resource: &str) -> Result<String> {
        if original_resource.trim().is_empty() {
            return Err(LinkError::invalid_input("resource must not be empty"));
        }

        match self.generator.generate(original_resource) {
            Ok(code) => {
                info!("Short link created: {} -> {}", code, original_resource);
                Ok(code)
            }
            Err(e) => {
                error!("Failed to create short link: {}", e);
                Err(e)
            }
        }
    }

    /// Resolves `code` to its original resource.
    ///
    /// Absent or already swept codes yield `None`. Malformed codes are expected
    /// to be rejected by the caller through [`is_well_formed`](Self::is_well_formed);
    /// passing one here is a plain miss.
    pub fn resolve_short_link(&self, code: &str) -> Option<String> {
        let resolved = self.registry.get(code).map(|record| record.resource);
        if resolved.is_none() {
            trace!("Short link not found: {}", code);
        }
        resolved
    }

    /// Checks code length and character set against the generator settings.
    pub fn is_well_formed(&self, code: &str) -> bool {
        self.generator.is_well_formed(code)
    }

    pub fn code_length(&self) -> usize {
        self.generator.code_length()
    }

    pub fn link_count(&self) -> usize {
        self.registry.len()
    }
}
