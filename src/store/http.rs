//! Session store backed by a realtime-database style REST endpoint.
//!
//! `GET {base}/races.json` answers with the whole `races` tree, `GET {base}/races/{id}.json` with
//! a single record. Both answer `null` when nothing is stored under the path.

use std::time::Duration;

use log::{debug, info};
use serde::de::DeserializeOwned;
use url::Url;

use super::{RawCatalog, SessionStore};
use crate::RacewatchError;
use crate::session::RawSessionRecord;

const RACES_PATH: &str = "races";

pub struct HttpSessionStore {
    base_url: Url,
    agent: ureq::Agent,
}

impl HttpSessionStore {
    /// Create a store client for `base_url`, e.g. `https://my-project.firebaseio.com`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RacewatchError> {
        let base_url = Url::parse(base_url).map_err(|e| RacewatchError::InvalidUserInput {
            field: "store_url".to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(RacewatchError::InvalidUserInput {
                field: "store_url".to_string(),
                reason: format!("{} is not an http(s) URL", base_url),
            });
        }
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Ok(Self { base_url, agent })
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, RacewatchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RacewatchError::InvalidUserInput {
                field: "store_url".to_string(),
                reason: format!("{} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, RacewatchError> {
        debug!("GET {}", url);
        let response = match self.agent.get(url.as_str()).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(RacewatchError::StoreStatus {
                    url: url.to_string(),
                    status,
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(RacewatchError::StoreUnreachable {
                    url: url.to_string(),
                    reason: transport.to_string(),
                });
            }
        };
        // the races tree grows without bound, parse it from the stream
        response.into_json::<T>().map_err(|e| {
            let reason = e.to_string();
            match e.into_inner().map(|inner| inner.downcast::<serde_json::Error>()) {
                Some(Ok(source)) => RacewatchError::MalformedResponse {
                    url: url.to_string(),
                    source: *source,
                },
                _ => RacewatchError::StoreUnreachable {
                    url: url.to_string(),
                    reason,
                },
            }
        })
    }
}

impl SessionStore for HttpSessionStore {
    fn fetch_all(&self) -> Result<RawCatalog, RacewatchError> {
        let url = self.url_for(&[&format!("{}.json", RACES_PATH)])?;
        let races: Option<RawCatalog> = self.get_json(&url)?;
        let races = races.unwrap_or_default();
        info!("Fetched {} sessions from {}", races.len(), self.base_url);
        Ok(races)
    }

    fn fetch_session(&self, id: &str) -> Result<Option<RawSessionRecord>, RacewatchError> {
        let url = self.url_for(&[RACES_PATH, &format!("{}.json", id)])?;
        self.get_json(&url)
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}
