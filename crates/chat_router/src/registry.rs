//! Section -> handler registration table

use std::collections::HashMap;
use std::sync::Arc;

use chat_core::callback::SECTION_NAV;

use crate::handler::Handler;
use crate::nav::NavHandler;

/// Built once at startup, then frozen behind an `Arc` and shared by every
/// dispatch. Reads need no locking.
#[derive(Debug)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// A registry with the built-in `nav` section.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(SECTION_NAV, Arc::new(NavHandler));
        registry
    }

    /// A registry with no sections at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for `section`. Registering the same section again
    /// replaces the earlier handler, which is returned.
    pub fn register(
        &mut self,
        section: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        let section = section.into();
        let previous = self.handlers.insert(section.clone(), handler);
        if previous.is_some() {
            tracing::warn!(section = %section, "handler re-registered, last registration wins");
        } else {
            tracing::debug!(section = %section, "handler registered");
        }
        previous
    }

    /// Builder-style `register`.
    pub fn with(mut self, section: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.register(section, handler);
        self
    }

    pub fn get(&self, section: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(section).cloned()
    }

    pub fn contains(&self, section: &str) -> bool {
        self.handlers.contains_key(section)
    }

    /// Registered section names, sorted.
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        sections.sort_unstable();
        sections
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
