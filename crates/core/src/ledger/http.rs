//! HTTP ledger client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::session::SessionLog;

use super::traits::StatusLedger;
use super::types::{LedgerOutcome, LedgerUpdate};
use super::LedgerError;

/// Command name understood by the ledger endpoint.
const UPDATE_COMMAND: &str = "updateLedger";

/// Ledger client issuing one GET per update.
pub struct HttpLedger {
    client: Client,
    config: LedgerConfig,
    token: String,
}

impl HttpLedger {
    /// Create a new HttpLedger with the given configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        let token = integrity_token(&config.credential);

        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Build the request for an update. Parameters are form-encoded.
    pub fn build_request(&self, update: &LedgerUpdate) -> Result<reqwest::Request, reqwest::Error> {
        let date = update.date.canonical();
        let column = update.column.name();
        self.client
            .get(&self.config.url)
            .query(&[
                ("cmd", UPDATE_COMMAND),
                ("date", date.as_str()),
                ("column", column.as_str()),
                ("value", update.value.as_str()),
                ("hash", self.token.as_str()),
            ])
            .build()
    }
}

/// Hex MD5 of the shared credential, appended to every request.
pub fn integrity_token(credential: &str) -> String {
    format!("{:x}", md5::compute(credential.as_bytes()))
}

#[async_trait]
impl StatusLedger for HttpLedger {
    fn name(&self) -> &str {
        "http"
    }

    async fn update(&self, update: &LedgerUpdate, log: &dyn SessionLog) -> LedgerOutcome {
        log.info(&format!(
            "ledger update {} {}={}",
            update.date, update.column, update.value
        ));

        let request = match self.build_request(update) {
            Ok(request) => request,
            Err(e) => {
                let reason = format!("failed to build ledger request: {}", e);
                log.warning(&reason);
                return LedgerOutcome::Failed { reason };
            }
        };

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("ledger request timed out after {}s", self.config.timeout_secs)
                } else if e.is_connect() {
                    format!("ledger connection failed: {}", e)
                } else {
                    format!("ledger request failed: {}", e)
                };
                log.warning(&reason);
                return LedgerOutcome::Failed { reason };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(column = %update.column, status = status.as_u16(), "Ledger response");

        if status.is_success() {
            log.info(&format!("ledger response: {}", body.trim()));
            LedgerOutcome::Recorded {
                status: status.as_u16(),
                body,
            }
        } else {
            let reason = format!(
                "ledger returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            );
            log.warning(&reason);
            LedgerOutcome::Failed { reason }
        }
    }
}
