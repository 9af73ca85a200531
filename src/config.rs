use crate::{
    error::{
        Error,
        Result,
    },
    http_transport::{
        DEFAULT_ENDPOINT,
        DEFAULT_TIMEOUT,
    },
};
use serde::Deserialize;
use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    time::Duration,
};

/// Settings for an [`HttpDatapointSink`](crate::HttpDatapointSink).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    pub auth_token: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout. Given in milliseconds when deserialized.
    #[serde(default = "default_timeout", rename = "timeout_ms", deserialize_with = "deserialize_millis")]
    pub timeout: Duration,

    #[serde(default)]
    pub self_metrics: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl SinkConfig {
    pub fn new(auth_token: impl ToString) -> Self {
        Self {
            auth_token: auth_token.to_string(),
            endpoint: default_endpoint(),
            timeout: DEFAULT_TIMEOUT,
            self_metrics: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth_token.is_empty() {
            return Err(Error::Config("auth_token"));
        }
        Ok(())
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// Key/value configuration handed over by a host.
pub trait ConfigSource {
    fn get_string(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Settings of the [`Publisher`](crate::Publisher), read from a host's
/// plugin configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PublisherConfig {
    pub token: String,
    /// Reported as the `host` dimension of every datapoint.
    pub hostname: String,
    pub endpoint: Option<String>,
}

impl PublisherConfig {
    /// Reads `token` (required), `hostname` and `endpoint`. Without a
    /// configured hostname the local node name is used, or `localhost` if
    /// that cannot be determined.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self> {
        let token = source
            .get_string("token")
            .filter(|token| !token.is_empty())
            .ok_or(Error::Config("token"))?;
        let hostname = source
            .get_string("hostname")
            .filter(|hostname| !hostname.is_empty())
            .unwrap_or_else(local_hostname);
        let endpoint = source.get_string("endpoint").filter(|endpoint| !endpoint.is_empty());

        Ok(Self {
            token,
            hostname,
            endpoint,
        })
    }

    pub fn sink_config(&self) -> SinkConfig {
        let mut config = SinkConfig::new(&self.token);
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        config
    }
}

pub(crate) fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(err) => {
            warn!(?err, "cannot determine hostname, using localhost");
            "localhost".to_string()
        }
    }
}
