use serde::{Deserialize, Serialize};

/// Default tile count assumed by the UI shell until a dashboard reports one.
pub const DEFAULT_TOTAL_DAYS: u32 = 12;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionInfo {
    pub id: u64,
    pub email: String,
    pub campaign_id: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub session: Option<SessionInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SessionResponse {
    /// The no-session result used for every swallowed `get_session` failure.
    pub fn absent() -> Self {
        Self::default()
    }
}

/// One calendar slot as reported by the dashboard. Read-only on the client.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CampaignDay {
    pub day_number: u32,
    #[serde(default)]
    pub day_date: Option<String>,
    pub prize_name: String,
    #[serde(default)]
    pub prize_image: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    pub is_available: bool,
    pub is_locked: bool,
    pub is_completed: bool,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardResponse {
    pub success: bool,
    pub campaign_id: u64,
    #[serde(default)]
    pub current_day: Option<u32>,
    pub days: Vec<CampaignDay>,
    #[serde(default)]
    pub total_days: Option<u32>,
}

impl DashboardResponse {
    /// Total tile count: explicit field, else the day list length, else the
    /// UI default. Once obtained it overrides any hardcoded default downstream.
    pub fn effective_total_days(&self) -> u32 {
        self.total_days
            .filter(|n| *n > 0)
            .or_else(|| u32::try_from(self.days.len()).ok().filter(|n| *n > 0))
            .unwrap_or(DEFAULT_TOTAL_DAYS)
    }
}

/// Expanded view of one day, fetched on demand.
///
/// `correct_answer` / `correct_answer_text` are only present once
/// `already_answered` is true; the backend withholds them for open questions.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DayDetail {
    pub day_number: u32,
    #[serde(default)]
    pub day_date: Option<String>,
    pub prize_name: String,
    #[serde(default)]
    pub prize_image: Option<String>,
    pub question: String,
    pub answer_a: String,
    pub answer_b: String,
    pub answer_c: String,
    pub answer_d: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub correct_answer_text: Option<String>,
    pub already_answered: bool,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

impl DayDetail {
    /// Option letters paired with their display text, in submission order.
    pub fn options(&self) -> [(&'static str, &str); 4] {
        [
            ("A", self.answer_a.as_str()),
            ("B", self.answer_b.as_str()),
            ("C", self.answer_c.as_str()),
            ("D", self.answer_d.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DayEnvelope {
    pub success: bool,
    #[serde(default)]
    pub day: Option<DayDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerRequest {
    pub day_number: u32,
    pub answer: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnswerResponse {
    pub success: bool,
    pub is_correct: bool,
    pub correct_answer: String,
    pub correct_answer_text: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProgressEnvelope {
    pub success: bool,
    #[serde(default)]
    pub progress: Option<Progress>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Progress {
    pub total_days: u32,
    pub completed_days: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub completed_day_numbers: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_total_prefers_explicit_field() {
        let dash = DashboardResponse {
            success: true,
            campaign_id: 1,
            current_day: Some(1),
            days: Vec::new(),
            total_days: Some(24),
        };
        assert_eq!(dash.effective_total_days(), 24);
    }

    #[test]
    fn effective_total_falls_back_to_day_count_then_default() {
        let day = CampaignDay {
            day_number: 1,
            day_date: None,
            prize_name: "Mug".into(),
            prize_image: None,
            is_current: true,
            is_available: true,
            is_locked: false,
            is_completed: false,
            is_correct: None,
        };
        let mut dash = DashboardResponse {
            success: true,
            campaign_id: 1,
            current_day: Some(1),
            days: vec![day; 9],
            total_days: None,
        };
        assert_eq!(dash.effective_total_days(), 9);
        dash.days.clear();
        assert_eq!(dash.effective_total_days(), DEFAULT_TOTAL_DAYS);
    }

    #[test]
    fn unanswered_day_detail_parses_without_answer_fields() {
        // Contract with the backend: open questions never carry the answer.
        let body = serde_json::json!({
            "day_number": 3,
            "day_date": "2025-12-03",
            "prize_name": "Headphones",
            "prize_image": null,
            "question": "Which feature requires multi-admin approval?",
            "answer_a": "Encryption",
            "answer_b": "MAV",
            "answer_c": "Monitoring",
            "answer_d": "Backups",
            "already_answered": false,
            "user_answer": null,
            "is_correct": null
        });
        let detail: DayDetail = serde_json::from_value(body).unwrap();
        assert!(!detail.already_answered);
        assert!(detail.correct_answer.is_none());
        assert!(detail.correct_answer_text.is_none());
        assert_eq!(detail.options()[1], ("B", "MAV"));
    }

    #[test]
    fn register_request_omits_absent_fields() {
        let req = RegisterRequest {
            email: "a@b.com".into(),
            full_name: Some("Jane Doe".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["full_name"], "Jane Doe");
        assert!(body.get("company").is_none());
        assert!(body.get("business_phone").is_none());
    }
}
