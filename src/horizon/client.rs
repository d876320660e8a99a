use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::HorizonError;
use super::models::{AccountRecord, AccountResponse, Problem, SubmitResponse};
use crate::config::{HttpConfig, NetworkProfile};

/// The two Horizon calls the tool needs
#[async_trait]
pub trait Horizon: Send + Sync {
    /// Load an account's current state
    async fn load_account(&self, account_id: &str) -> Result<AccountRecord, HorizonError>;

    /// Submit a base64 transaction envelope
    async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmitResponse, HorizonError>;

    /// Whether the account exists (is funded) on the network
    async fn account_exists(&self, account_id: &str) -> Result<bool, HorizonError> {
        match self.load_account(account_id).await {
            Ok(_) => Ok(true),
            Err(HorizonError::AccountNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// reqwest-backed Horizon client
#[derive(Debug, Clone)]
pub struct HorizonClient {
    http: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HorizonClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HorizonError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stellar-tx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HorizonError::Transport {
                endpoint: base_url.to_string(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn from_profile(profile: &NetworkProfile, http: &HttpConfig) -> Result<Self, HorizonError> {
        Self::new(&profile.horizon_url, Duration::from_secs(http.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-success response into an error, preferring result codes.
    async fn error_from_response(&self, url: &str, resp: reqwest::Response) -> HorizonError {
        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return HorizonError::from_reqwest(e, url, self.timeout_secs),
        };
        let problem: Problem = serde_json::from_str(&body).unwrap_or_default();

        if let Some(extras) = problem.extras.clone() {
            if let Some(codes) = extras.result_codes {
                return HorizonError::SubmissionRejected {
                    title: problem.title.clone().unwrap_or_else(|| "Transaction Failed".to_string()),
                    codes,
                    result_xdr: extras.result_xdr,
                };
            }
        }

        HorizonError::UnexpectedStatus {
            endpoint: url.to_string(),
            status: status.as_u16(),
            message: problem.message(&body),
        }
    }
}

#[async_trait]
impl Horizon for HorizonClient {
    async fn load_account(&self, account_id: &str) -> Result<AccountRecord, HorizonError> {
        let url = self.endpoint(&format!("accounts/{}", account_id));
        debug!(url = %url, "Loading account");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| HorizonError::from_reqwest(e, &url, self.timeout_secs))?;

        match resp.status() {
            StatusCode::OK => {
                let raw: AccountResponse = resp
                    .json()
                    .await
                    .map_err(|e| HorizonError::from_reqwest(e, &url, self.timeout_secs))?;
                let sequence = raw.sequence.parse::<i64>().map_err(|e| HorizonError::Decode {
                    endpoint: url.clone(),
                    message: format!("sequence '{}' is not an integer: {}", raw.sequence, e),
                })?;
                debug!(account = %raw.account_id, sequence, "Account loaded");
                Ok(AccountRecord {
                    account_id: raw.account_id,
                    sequence,
                })
            }
            StatusCode::NOT_FOUND => Err(HorizonError::AccountNotFound {
                account: account_id.to_string(),
            }),
            _ => Err(self.error_from_response(&url, resp).await),
        }
    }

    async fn submit_transaction(&self, envelope_xdr: &str) -> Result<SubmitResponse, HorizonError> {
        let url = self.endpoint("transactions");
        debug!(url = %url, "Submitting transaction");

        let resp = self
            .http
            .post(&url)
            .form(&[("tx", envelope_xdr)])
            .send()
            .await
            .map_err(|e| HorizonError::from_reqwest(e, &url, self.timeout_secs))?;

        if !resp.status().is_success() {
            let err = self.error_from_response(&url, resp).await;
            warn!(category = err.category(), error = %err, "Submission failed");
            return Err(err);
        }

        resp.json()
            .await
            .map_err(|e| HorizonError::from_reqwest(e, &url, self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const ACCOUNT: &str = "GAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCBPSL";

    fn client(server: &mockito::ServerGuard) -> HorizonClient {
        HorizonClient::new(&format!("{}/", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_load_account_parses_string_sequence() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/accounts/{}", ACCOUNT).as_str())
            .with_status(200)
            .with_header("content-type", "application/hal+json")
            .with_body(format!(
                r#"{{"id":"{0}","account_id":"{0}","sequence":"4294967296","balances":[]}}"#,
                ACCOUNT
            ))
            .create_async()
            .await;

        let account = client(&server).load_account(ACCOUNT).await.unwrap();
        assert_eq!(account.account_id, ACCOUNT);
        assert_eq!(account.sequence, 4_294_967_296);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_account() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/accounts/{}", ACCOUNT).as_str())
            .with_status(404)
            .with_body(r#"{"type":"https://stellar.org/horizon-errors/not_found","title":"Resource Missing","status":404}"#)
            .create_async()
            .await;

        let horizon = client(&server);
        let err = horizon.load_account(ACCOUNT).await.unwrap_err();
        assert!(matches!(err, HorizonError::AccountNotFound { account } if account == ACCOUNT));
        assert!(!horizon.account_exists(ACCOUNT).await.unwrap());
    }

    #[tokio::test]
    async fn test_account_exists_propagates_server_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/accounts/{}", ACCOUNT).as_str())
            .with_status(503)
            .with_body(r#"{"title":"Service Unavailable","status":503,"detail":"Horizon is down"}"#)
            .create_async()
            .await;

        let err = client(&server).account_exists(ACCOUNT).await.unwrap_err();
        match err {
            HorizonError::UnexpectedStatus { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Horizon is down");
            }
            other => panic!("Expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_sequence_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/accounts/{}", ACCOUNT).as_str())
            .with_status(200)
            .with_body(format!(r#"{{"account_id":"{}","sequence":"abc"}}"#, ACCOUNT))
            .create_async()
            .await;

        let err = client(&server).load_account(ACCOUNT).await.unwrap_err();
        assert_eq!(err.category(), "decode");
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/transactions")
            .match_body(Matcher::UrlEncoded("tx".into(), "AAAA+/==".into()))
            .with_status(200)
            .with_body(r#"{"hash":"3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889","ledger":7,"successful":true}"#)
            .create_async()
            .await;

        let resp = client(&server).submit_transaction("AAAA+/==").await.unwrap();
        assert_eq!(
            resp.hash,
            "3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889"
        );
        assert_eq!(resp.ledger, 7);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_rejected_with_result_codes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/transactions")
            .with_status(400)
            .with_body(r#"{
                "type": "https://stellar.org/horizon-errors/transaction_failed",
                "title": "Transaction Failed",
                "status": 400,
                "extras": {
                    "result_codes": {"transaction": "tx_failed", "operations": ["op_underfunded"]},
                    "result_xdr": "AAAAAAAAAGT/////AAAAAQAAAAAAAAAB/////gAAAAA="
                }
            }"#)
            .create_async()
            .await;

        let err = client(&server).submit_transaction("AAAA").await.unwrap_err();
        match err {
            HorizonError::SubmissionRejected { title, codes, result_xdr } => {
                assert_eq!(title, "Transaction Failed");
                assert_eq!(codes.transaction, "tx_failed");
                assert_eq!(codes.operations, vec!["op_underfunded".to_string()]);
                assert!(result_xdr.is_some());
            }
            other => panic!("Expected SubmissionRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_error_without_codes_keeps_raw_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/transactions")
            .with_status(502)
            .with_body("upstream connect error")
            .create_async()
            .await;

        let err = client(&server).submit_transaction("AAAA").await.unwrap_err();
        match err {
            HorizonError::UnexpectedStatus { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream connect error");
            }
            other => panic!("Expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let horizon = HorizonClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = horizon.load_account(ACCOUNT).await.unwrap_err();
        assert!(err.is_network_error());
    }
}
