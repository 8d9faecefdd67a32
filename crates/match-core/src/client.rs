use crate::config::ClientConfig;
use crate::credentials::ApiKey;
use crate::rate::RateGate;
use crate::transport::{HttpTransport, Transport, TransportError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} has no `{field}` field")]
    MissingField { what: String, field: &'static str },
}

/// How a player is identified when listing their matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRef<'a> {
    Puuid(&'a str),
    Name(&'a str),
}

/// Match-history API client. Every request passes through the client's own
/// `RateGate`; methods take `&mut self`, so one client serves one caller.
pub struct RiotClient {
    key: ApiKey,
    config: ClientConfig,
    gate: RateGate,
    transport: Box<dyn Transport>,
}

impl RiotClient {
    pub fn new(key: ApiKey, config: ClientConfig) -> anyhow::Result<Self> {
        Ok(Self::with_transport(key, config, HttpTransport::new()?))
    }

    pub fn with_transport(
        key: ApiKey,
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Self {
        let gate = RateGate::from_config(&config.gate);
        Self {
            key,
            config,
            gate,
            transport: Box::new(transport),
        }
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url_for(&self, host: &str, route: &str) -> String {
        let base = match &self.config.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", host, self.config.domain),
        };
        let sep = if route.contains('?') { '&' } else { '?' };
        format!(
            "{base}/{route}{sep}api_key={}",
            urlencoding::encode(self.key.expose())
        )
    }

    fn redact(&self, url: &str) -> String {
        let key = urlencoding::encode(self.key.expose());
        url.replace(&*key, "***")
    }

    pub async fn get(&mut self, host: &str, route: &str) -> Result<Value, ClientError> {
        self.fetch(host, route).await
    }

    /// Waits for the gate, sends one request and charges the gate for it
    /// whatever the outcome. Only status 200 counts as success.
    async fn fetch<T: DeserializeOwned>(
        &mut self,
        host: &str,
        route: &str,
    ) -> Result<T, ClientError> {
        let url = self.url_for(host, route);
        let shown = self.redact(&url);

        let poll = self.config.gate.poll_interval();
        self.gate
            .await_admission(poll, |waited| {
                info!(waited_secs = waited.as_secs_f64(), "waiting for rate gate");
            })
            .await;
        let result = self.transport.get(&url).await;
        self.gate.record_admission();

        let (short, long) = self.gate.usage();
        debug!(
            url = %shown,
            short_count = short.count,
            short_limit = short.limit,
            long_count = long.count,
            long_limit = long.limit,
            "request sent"
        );

        let response = result.map_err(|source| ClientError::Transport {
            url: shown.clone(),
            source,
        })?;
        if response.status != 200 {
            warn!(url = %shown, status = response.status, "unexpected status");
            return Err(ClientError::Status {
                url: shown,
                status: response.status,
            });
        }
        serde_json::from_slice(&response.body).map_err(|source| ClientError::Decode {
            url: shown,
            source,
        })
    }

    pub async fn user_info(&mut self, username: &str) -> Result<Value, ClientError> {
        let route = format!(
            "lol/summoner/v4/summoners/by-name/{}",
            urlencoding::encode(username)
        );
        let platform = self.config.platform.clone();
        self.get(&platform, &route).await
    }

    pub async fn user_puuid(&mut self, username: &str) -> Result<String, ClientError> {
        let info = self.user_info(username).await?;
        match info.get("puuid").and_then(Value::as_str) {
            Some(puuid) => Ok(puuid.to_string()),
            None => Err(ClientError::MissingField {
                what: format!("summoner {username}"),
                field: "puuid",
            }),
        }
    }

    /// Ranked match ids for a player, newest first as the API returns them.
    pub async fn user_match_ids(
        &mut self,
        user: UserRef<'_>,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, ClientError> {
        let puuid = match user {
            UserRef::Puuid(puuid) => puuid.to_string(),
            UserRef::Name(name) => self.user_puuid(name).await?,
        };
        let route = format!(
            "lol/match/v5/matches/by-puuid/{puuid}/ids?type=ranked&start={start}&count={count}"
        );
        let region = self.config.region.clone();
        self.fetch(&region, &route).await
    }

    pub async fn match_stats(&mut self, match_id: &str) -> Result<Value, ClientError> {
        let route = format!("lol/match/v5/matches/{match_id}");
        let region = self.config.region.clone();
        self.get(&region, &route).await
    }

    /// Fetches the id list, then every match in order. Pauses before each
    /// `batch_size`-th match on top of what the gate enforces.
    pub async fn load_matches(
        &mut self,
        username: &str,
        start: u32,
        count: u32,
    ) -> Result<Vec<Value>, ClientError> {
        let ids = self
            .user_match_ids(UserRef::Name(username), start, count)
            .await?;
        let total = ids.len();
        let batch = self.config.batch_size;
        let pause = self.config.batch_pause();

        let mut matches = Vec::with_capacity(total);
        for (i, id) in ids.iter().enumerate() {
            if batch > 0 && (i + 1) % batch == 0 && !pause.is_zero() {
                info!(pause_secs = pause.as_secs_f64(), "pausing between match batches");
                tokio::time::sleep(pause).await;
            }
            matches.push(self.match_stats(id).await?);
            info!(loaded = i + 1, total, "matches loaded");
        }
        Ok(matches)
    }
}
