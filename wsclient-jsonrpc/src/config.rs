use crate::error::*;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::path::Path;
use std::time::Duration;

/// Everything needed to construct a client for one service endpoint.
///
/// There is no default URL and no default timeout.  Without a timeout a call waits as long as the
/// server takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The single endpoint every call is POSTed to
    pub url: String,

    /// Static token sent in the `Authorization` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Overall per-request timeout.  Written as (possibly fractional) seconds in config files.
    #[serde(
        rename = "timeout_secs",
        default,
        skip_serializing_if = "Option::is_none",
        with = "fractional_secs"
    )]
    pub timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: None,
            user_agent: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
        serde_json::from_str(&contents).context(ParseConfigSnafu { path })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn parse_url(&self) -> Result<reqwest::Url, ConfigError> {
        reqwest::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }

    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            ensure!(!timeout.is_zero(), ZeroTimeoutSnafu);
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build().context(HttpClientSnafu)
    }
}

mod fractional_secs {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        timeout: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match timeout {
            Some(timeout) => serializer.serialize_some(&timeout.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}
