use super::error::ApiError;
use super::types::*;
use super::CampaignApi;
use crate::token::TokenStore;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// REST namespace of the campaign plugin, appended to the backend base URL.
pub const REST_NAMESPACE: &str = "wp-json/netapp-campaign/v1";

const SESSION_HEADER: &str = "X-Session-Token";
const NONCE_HEADER: &str = "X-WP-Nonce";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the campaign backend.
///
/// Holds the shared token store; every authenticated request attaches the
/// stored token as a bearer credential and, for older backend builds, as a
/// custom header. Cookies are kept so same-domain session cookies ride along.
#[derive(Clone)]
pub struct CampaignClient {
    endpoint: String,
    http: reqwest::Client,
    tokens: TokenStore,
    nonce: Option<String>,
}

impl CampaignClient {
    pub fn new(base: &str, tokens: TokenStore, nonce: Option<String>) -> anyhow::Result<Self> {
        // Validate early; after this every endpoint is plain string appending.
        let parsed = Url::parse(base)?;
        let endpoint = format!("{}/{REST_NAMESPACE}/", parsed.as_str().trim_end_matches('/'));
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            endpoint,
            http,
            tokens,
            nonce,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut rb = self.http.request(method, format!("{}{path}", self.endpoint));
        if let Some(nonce) = &self.nonce {
            rb = rb.header(NONCE_HEADER, nonce);
        }
        if let Some(token) = self.tokens.get() {
            rb = rb
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header(SESSION_HEADER, token);
        }
        rb
    }

    async fn execute<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ApiError> {
        let resp = rb
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("API request failed: {status}"));
            return Err(ApiError::classify(status.as_u16(), message));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Transport(format!("malformed response body: {e}")))
    }

    /// Upsert an identity with the backend. Optional fields are omitted from
    /// the request body entirely rather than sent as null.
    pub async fn register(&self, req: &RegisterRequest) -> Result<SessionResponse, ApiError> {
        self.execute(self.request(Method::POST, "register").json(req))
            .await
    }

    /// Create (or refresh) a session for an email. The returned token is
    /// persisted before the response is handed back.
    pub async fn create_session(&self, email: &str) -> Result<SessionResponse, ApiError> {
        let resp: SessionResponse = self
            .execute(
                self.request(Method::POST, "session")
                    .json(&serde_json::json!({ "email": email })),
            )
            .await?;
        if resp.success {
            if let Some(token) = &resp.token {
                self.tokens.set(token);
            }
        }
        Ok(resp)
    }

    /// Speculative session probe used on every startup. Never fails: an absent
    /// token short-circuits without touching the network, and every transport,
    /// status, or parse problem resolves to `{success: false}` with the stored
    /// token cleared.
    pub async fn get_session(&self) -> SessionResponse {
        if self.tokens.get().is_none() {
            return SessionResponse::absent();
        }
        match self
            .execute::<SessionResponse>(self.request(Method::GET, "session"))
            .await
        {
            Ok(resp) => {
                if !resp.success || resp.session.is_none() {
                    self.tokens.clear();
                } else if let Some(token) = &resp.token {
                    // Backend rotated the token; keep the fresh one.
                    self.tokens.set(token);
                }
                resp
            }
            Err(e) => {
                tracing::debug!("session probe failed, treating as signed out: {e}");
                self.tokens.clear();
                SessionResponse::absent()
            }
        }
    }

    pub async fn get_dashboard(&self) -> Result<DashboardResponse, ApiError> {
        self.execute(self.request(Method::GET, "dashboard")).await
    }

    pub async fn get_day(&self, day_number: u32) -> Result<DayDetail, ApiError> {
        let env: DayEnvelope = self
            .execute(self.request(Method::GET, &format!("day/{day_number}")))
            .await?;
        let day = match env.day {
            Some(day) if env.success => day,
            // Soft rejection: a 200 envelope carrying the backend's reason.
            _ => {
                return Err(ApiError::Backend {
                    status: 200,
                    message: env
                        .message
                        .unwrap_or_else(|| format!("day {day_number} unavailable")),
                })
            }
        };
        if !day.already_answered && day.correct_answer.is_some() {
            // Server-side invariant tripwire: open questions must not carry
            // the answer.
            tracing::warn!(day = day_number, "backend leaked correct answer for an open day");
        }
        Ok(day)
    }

    pub async fn submit_answer(
        &self,
        day_number: u32,
        answer: &str,
    ) -> Result<AnswerResponse, ApiError> {
        if answer.trim().is_empty() {
            return Err(ApiError::Validation("no answer selected".into()));
        }
        self.execute(self.request(Method::POST, "answer").json(&AnswerRequest {
            day_number,
            answer: answer.to_string(),
        }))
        .await
    }

    pub async fn get_progress(&self) -> Result<Option<Progress>, ApiError> {
        let env: ProgressEnvelope = self.execute(self.request(Method::GET, "progress")).await?;
        Ok(env.progress)
    }
}

#[async_trait]
impl CampaignApi for CampaignClient {
    async fn register(&self, req: &RegisterRequest) -> Result<SessionResponse, ApiError> {
        CampaignClient::register(self, req).await
    }

    async fn create_session(&self, email: &str) -> Result<SessionResponse, ApiError> {
        CampaignClient::create_session(self, email).await
    }

    async fn get_session(&self) -> SessionResponse {
        CampaignClient::get_session(self).await
    }

    async fn get_dashboard(&self) -> Result<DashboardResponse, ApiError> {
        CampaignClient::get_dashboard(self).await
    }

    async fn get_day(&self, day_number: u32) -> Result<DayDetail, ApiError> {
        CampaignClient::get_day(self, day_number).await
    }

    async fn submit_answer(&self, day_number: u32, answer: &str) -> Result<AnswerResponse, ApiError> {
        CampaignClient::submit_answer(self, day_number, answer).await
    }

    async fn get_progress(&self) -> Result<Option<Progress>, ApiError> {
        CampaignClient::get_progress(self).await
    }

    fn forget_token(&self) {
        self.tokens.clear();
    }
}
