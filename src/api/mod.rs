pub mod client;
pub mod error;
pub mod types;

pub use client::CampaignClient;
pub use error::ApiError;

use async_trait::async_trait;
use types::{AnswerResponse, DashboardResponse, DayDetail, Progress, RegisterRequest, SessionResponse};

/// Seam between the calendar state machine and the HTTP client, so the
/// machine can be driven by a scripted stand-in under test.
///
/// `get_session` carries the one no-throw contract: it must resolve for any
/// transport outcome. Everything else fails with a structured [`ApiError`].
#[async_trait]
pub trait CampaignApi: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<SessionResponse, ApiError>;

    async fn create_session(&self, email: &str) -> Result<SessionResponse, ApiError>;

    async fn get_session(&self) -> SessionResponse;

    async fn get_dashboard(&self) -> Result<DashboardResponse, ApiError>;

    async fn get_day(&self, day_number: u32) -> Result<DayDetail, ApiError>;

    async fn submit_answer(&self, day_number: u32, answer: &str) -> Result<AnswerResponse, ApiError>;

    async fn get_progress(&self) -> Result<Option<Progress>, ApiError>;

    /// Drop the stored session token. Used when any call reports an
    /// authentication failure.
    fn forget_token(&self);
}
