//! Engine configuration.
//!
//! Defaults reproduce the unbounded behaviour of the minimal core; limits
//! turn unbounded growth into an `OUT_OF_MEMORY` / `STACK_OVERFLOW` error
//! returned from `exec`.

use std::env;

use wjit_error::{Error, Result};
use wjit_logging::{LogFormat, LogLevel};

/// Initial number of value-stack slots
pub const DEFAULT_STACK_SLOTS: usize = 100;

/// Tunables for an [`Engine`](crate::engine::Engine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Initial value-stack capacity, in slots
    pub initial_stack_slots: usize,
    /// Largest capacity `growStack` may reach
    pub max_stack_slots:     Option<usize>,
    /// Largest size, in pages, `growMemory` may reach
    pub max_memory_pages:    Option<u64>,
    /// Level for [`wjit_logging::init_tracing`]
    pub log_level:           LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_stack_slots: DEFAULT_STACK_SLOTS,
            max_stack_slots:     None,
            max_memory_pages:    None,
            log_level:           LogLevel::Info,
        }
    }
}

impl EngineConfig {
    /// Set the initial value-stack capacity
    pub fn with_initial_stack_slots(mut self, slots: usize) -> Self {
        self.initial_stack_slots = slots;
        self
    }

    /// Bound value-stack growth
    pub fn with_max_stack_slots(mut self, slots: usize) -> Self {
        self.max_stack_slots = Some(slots);
        self
    }

    /// Bound memory growth
    pub fn with_max_memory_pages(mut self, pages: u64) -> Self {
        self.max_memory_pages = Some(pages);
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.initial_stack_slots == 0 {
            return Err(Error::config_error("initial_stack_slots must be non-zero"));
        }
        if self.max_stack_slots.is_some_and(|max| max < self.initial_stack_slots) {
            return Err(Error::config_error("max_stack_slots is below initial_stack_slots"));
        }
        Ok(())
    }

    /// Defaults overridden by `WJIT_STACK_SLOTS`, `WJIT_MAX_STACK_SLOTS`,
    /// `WJIT_MAX_MEMORY_PAGES` and `WJIT_LOG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`EngineConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup("WJIT_STACK_SLOTS") {
            config.initial_stack_slots = parse_number(&value, "WJIT_STACK_SLOTS is not a number")?;
        }
        if let Some(value) = lookup("WJIT_MAX_STACK_SLOTS") {
            config.max_stack_slots =
                Some(parse_number(&value, "WJIT_MAX_STACK_SLOTS is not a number")?);
        }
        if let Some(value) = lookup("WJIT_MAX_MEMORY_PAGES") {
            config.max_memory_pages =
                Some(parse_number(&value, "WJIT_MAX_MEMORY_PAGES is not a number")?);
        }
        if let Some(value) = lookup("WJIT_LOG") {
            config.log_level = value.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Install the global subscriber at [`EngineConfig::log_level`], in the
    /// format named by `RUST_LOG_FORMAT`. Returns `false` if one was already
    /// installed.
    pub fn init_tracing(&self) -> bool {
        wjit_logging::init_tracing(self.log_level, LogFormat::from_env())
    }
}

fn parse_number<T: core::str::FromStr>(value: &str, message: &'static str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::config_error(message))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.initial_stack_slots, 100);
        assert!(config.max_stack_slots.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("WJIT_STACK_SLOTS", "16"),
            ("WJIT_MAX_STACK_SLOTS", " 64 "),
            ("WJIT_MAX_MEMORY_PAGES", "10"),
            ("WJIT_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            EngineConfig::default()
                .with_initial_stack_slots(16)
                .with_max_stack_slots(64)
                .with_max_memory_pages(10)
                .with_log_level(LogLevel::Debug)
        );
    }

    #[test]
    fn test_from_lookup_rejects_malformed_values() {
        let err = EngineConfig::from_lookup(lookup(&[("WJIT_STACK_SLOTS", "lots")])).unwrap_err();
        assert_eq!(err.code, wjit_error::codes::CONFIG_ERROR);

        assert!(EngineConfig::from_lookup(lookup(&[("WJIT_LOG", "loud")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[("WJIT_STACK_SLOTS", "0")])).is_err());
    }

    #[test]
    fn test_validate_rejects_max_below_initial() {
        let config = EngineConfig::default().with_max_stack_slots(50);
        assert!(config.validate().is_err());
    }
}
