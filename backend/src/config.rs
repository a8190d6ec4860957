//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SCAFFOLD_*` environment variables and config
//! files. Every field is optional; accessors fall back to the defaults below.

use std::convert::Infallible;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer, Serialize};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGINS: &str = "*";
const DEFAULT_CORS_METHODS: &str = "*";
const DEFAULT_CORS_HEADERS: &str = "*";
const DEFAULT_CORS_ALLOW_CREDENTIALS: bool = true;
const DEFAULT_CORS_MAX_AGE_SECS: usize = 3600;
const DEFAULT_CORE_WORKERS: usize = 5;
const DEFAULT_MAX_WORKERS: usize = 100;
const DEFAULT_QUEUE_CAPACITY: usize = 300;
const DEFAULT_AWAIT_TERMINATION_SECS: u64 = 120;
const DEFAULT_TASK_NAME_PREFIX: &str = "async-task-";

/// List-valued setting.
///
/// Accepts either a sequence or a single comma-separated string, so
/// `SCAFFOLD_CORS_ALLOWED_ORIGINS=https://a.example,https://b.example`, a
/// config-file array and a `--cors-allowed-origins` flag all load.
///
/// # Examples
/// ```
/// use scaffold::config::ListSetting;
///
/// let list: ListSetting = "GET, POST,,".parse().unwrap_or_default();
/// assert_eq!(list.entries(), ["GET", "POST"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListSetting(Vec<String>);

impl ListSetting {
    /// Non-empty, trimmed entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    fn split(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl FromStr for ListSetting {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::split(raw))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Joined(String),
    Items(Vec<String>),
}

impl<'de> Deserialize<'de> for ListSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawList::deserialize(deserializer)? {
            RawList::Joined(raw) => Self::split(&raw),
            RawList::Items(items) => Self::split(&items.join(",")),
        })
    }
}

fn list_or(setting: Option<&ListSetting>, default: &str) -> Vec<String> {
    setting
        .cloned()
        .unwrap_or_else(|| ListSetting::split(default))
        .into_vec()
}

/// Configuration values for the HTTP listener, CORS and the task executor.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCAFFOLD")]
pub struct AppSettings {
    /// Interface the listener binds to.
    pub host: Option<String>,
    /// Port the listener binds to.
    pub port: Option<u16>,
    /// Allowed origins. `*` accepts any origin; `https://*.example.com`
    /// style patterns match subdomains.
    pub cors_allowed_origins: Option<ListSetting>,
    /// Allowed methods, or `*`.
    pub cors_allowed_methods: Option<ListSetting>,
    /// Allowed request headers, or `*`.
    pub cors_allowed_headers: Option<ListSetting>,
    /// Whether CORS responses allow credentials. Defaults to `true`.
    pub cors_allow_credentials: Option<bool>,
    /// Preflight cache lifetime in seconds.
    pub cors_max_age: Option<usize>,
    /// Workers kept for immediate task execution.
    pub executor_core_workers: Option<usize>,
    /// Upper bound on concurrently running tasks.
    pub executor_max_workers: Option<usize>,
    /// Tasks allowed to wait for a core worker.
    pub executor_queue_capacity: Option<usize>,
    /// Shutdown grace period in seconds.
    pub executor_await_termination_secs: Option<u64>,
    /// Prefix for task names in logs.
    pub executor_task_name_prefix: Option<String>,
}

impl AppSettings {
    /// Host and port the listener binds to.
    pub fn bind_addr(&self) -> (String, u16) {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST).to_owned();
        (host, self.port.unwrap_or(DEFAULT_PORT))
    }

    /// CORS policy described by these settings.
    pub fn cors(&self) -> CorsSettings {
        CorsSettings {
            allowed_origins: list_or(self.cors_allowed_origins.as_ref(), DEFAULT_CORS_ORIGINS),
            allowed_methods: list_or(self.cors_allowed_methods.as_ref(), DEFAULT_CORS_METHODS),
            allowed_headers: list_or(self.cors_allowed_headers.as_ref(), DEFAULT_CORS_HEADERS),
            allow_credentials: self
                .cors_allow_credentials
                .unwrap_or(DEFAULT_CORS_ALLOW_CREDENTIALS),
            max_age: self.cors_max_age.unwrap_or(DEFAULT_CORS_MAX_AGE_SECS),
        }
    }

    /// Task executor sizing described by these settings.
    pub fn executor(&self) -> ExecutorSettings {
        ExecutorSettings {
            core_workers: self.executor_core_workers.unwrap_or(DEFAULT_CORE_WORKERS),
            max_workers: self.executor_max_workers.unwrap_or(DEFAULT_MAX_WORKERS),
            queue_capacity: self
                .executor_queue_capacity
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
            await_termination: Duration::from_secs(
                self.executor_await_termination_secs
                    .unwrap_or(DEFAULT_AWAIT_TERMINATION_SECS),
            ),
            task_name_prefix: self
                .executor_task_name_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_TASK_NAME_PREFIX.to_owned()),
        }
    }
}

/// Resolved cross-origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsSettings {
    /// Origins, origin patterns or `*`.
    pub allowed_origins: Vec<String>,
    /// Methods or `*`.
    pub allowed_methods: Vec<String>,
    /// Headers or `*`.
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds.
    pub max_age: usize,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_CORS_ORIGINS.to_owned()],
            allowed_methods: vec![DEFAULT_CORS_METHODS.to_owned()],
            allowed_headers: vec![DEFAULT_CORS_HEADERS.to_owned()],
            allow_credentials: DEFAULT_CORS_ALLOW_CREDENTIALS,
            max_age: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

/// Resolved executor sizing.
///
/// `max_workers` includes the core workers; the difference is the overflow
/// capacity used once the queue is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub core_workers: usize,
    pub max_workers: usize,
    pub queue_capacity: usize,
    pub await_termination: Duration,
    pub task_name_prefix: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            core_workers: DEFAULT_CORE_WORKERS,
            max_workers: DEFAULT_MAX_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            await_termination: Duration::from_secs(DEFAULT_AWAIT_TERMINATION_SECS),
            task_name_prefix: DEFAULT_TASK_NAME_PREFIX.to_owned(),
        }
    }
}
