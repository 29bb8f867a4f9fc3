//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the coordinator as an
//! `Arc<CoreConfig>`. Nothing in this crate reads process-wide environment variables on its own:
//! binaries hand a lookup function to [`CoreConfig::from_lookup`], and tests hand it a map.

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_DEPARTMENT_CAPACITY, DEFAULT_MUTATION_HISTORY, ENV_API_BASE_URL,
    ENV_DEPARTMENT_CAPACITY, ENV_MOVE_FAILURE_POLICY, ENV_MUTATION_HISTORY,
    ENV_REQUEST_TIMEOUT_SECS,
};
use crate::error::{ConfigError, ConfigResult};
use std::str::FromStr;
use std::time::Duration;

/// What happens to an optimistic move when persisting it fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveFailurePolicy {
    /// Leave the patient where the move put it. The board may then disagree with the backend
    /// until the next load.
    #[default]
    Keep,
    /// Put the patient back at its original department and position.
    Rollback,
}

impl FromStr for MoveFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(MoveFailurePolicy::Keep),
            "rollback" => Ok(MoveFailurePolicy::Rollback),
            _ => Err(ConfigError::UnknownMoveFailurePolicy(s.to_string())),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base_url: String,
    request_timeout: Option<Duration>,
    department_capacity: usize,
    move_failure_policy: MoveFailurePolicy,
    mutation_history: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig` for the backend at `api_base_url`, with defaults for
    /// everything else.
    pub fn new(api_base_url: impl Into<String>) -> ConfigResult<Self> {
        let api_base_url = api_base_url.into().trim().to_string();
        if api_base_url.is_empty() {
            return Err(ConfigError::InvalidInput(
                "api_base_url cannot be empty".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            request_timeout: None,
            department_capacity: DEFAULT_DEPARTMENT_CAPACITY,
            move_failure_policy: MoveFailurePolicy::default(),
            mutation_history: DEFAULT_MUTATION_HISTORY,
        })
    }

    /// Resolve configuration from a key lookup such as `|key| std::env::var(key).ok()`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let cfg = Self::new(api_base_url_from_env_value(lookup(ENV_API_BASE_URL)))?
            .with_request_timeout(request_timeout_from_env_value(lookup(
                ENV_REQUEST_TIMEOUT_SECS,
            ))?)
            .with_department_capacity(department_capacity_from_env_value(lookup(
                ENV_DEPARTMENT_CAPACITY,
            ))?)
            .with_move_failure_policy(move_failure_policy_from_env_value(lookup(
                ENV_MOVE_FAILURE_POLICY,
            ))?)
            .with_mutation_history(mutation_history_from_env_value(lookup(
                ENV_MUTATION_HISTORY,
            ))?);

        Ok(cfg)
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_department_capacity(mut self, capacity: usize) -> Self {
        self.department_capacity = capacity;
        self
    }

    pub fn with_move_failure_policy(mut self, policy: MoveFailurePolicy) -> Self {
        self.move_failure_policy = policy;
        self
    }

    /// The journal always keeps at least one entry.
    pub fn with_mutation_history(mut self, entries: usize) -> Self {
        self.mutation_history = entries.max(1);
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn department_capacity(&self) -> usize {
        self.department_capacity
    }

    pub fn move_failure_policy(&self) -> MoveFailurePolicy {
        self.move_failure_policy
    }

    pub fn mutation_history(&self) -> usize {
        self.mutation_history
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive_number(key: &'static str, value: Option<String>) -> ConfigResult<Option<u64>> {
    present(value)
        .map(|v| match v.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber { key, value: v }),
        })
        .transpose()
}

/// Base URL of the patients backend; falls back to [`DEFAULT_API_BASE_URL`].
pub fn api_base_url_from_env_value(value: Option<String>) -> String {
    present(value).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Optional transport timeout in whole seconds.
pub fn request_timeout_from_env_value(value: Option<String>) -> ConfigResult<Option<Duration>> {
    Ok(positive_number(ENV_REQUEST_TIMEOUT_SECS, value)?.map(Duration::from_secs))
}

pub fn department_capacity_from_env_value(value: Option<String>) -> ConfigResult<usize> {
    Ok(positive_number(ENV_DEPARTMENT_CAPACITY, value)?
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_DEPARTMENT_CAPACITY))
}

pub fn move_failure_policy_from_env_value(
    value: Option<String>,
) -> ConfigResult<MoveFailurePolicy> {
    present(value)
        .map(|v| v.parse::<MoveFailurePolicy>())
        .transpose()
        .map(Option::unwrap_or_default)
}

pub fn mutation_history_from_env_value(value: Option<String>) -> ConfigResult<usize> {
    Ok(positive_number(ENV_MUTATION_HISTORY, value)?
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_MUTATION_HISTORY))
}
