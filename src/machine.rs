use crate::api::error::looks_like_auth;
use crate::api::types::{
    AnswerResponse, CampaignDay, DayDetail, RegisterRequest, DEFAULT_TOTAL_DAYS,
};
use crate::api::CampaignApi;
use crate::util::is_valid_email;

/// Which identity form the user must fill in.
///
/// `IdentityOnly` asks for name + email (the backend already knows the user or
/// merely needs a fresh session). `Full` collects company and job title too,
/// because the backend has no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    IdentityOnly,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarState {
    CheckingSession,
    NeedsIdentity(RegistrationMode),
    Dashboard,
    QuestionOpen,
    ResultShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarEvent {
    SessionAbsent,
    DashboardLoaded,
    DashboardFailed,
    DayOpened,
    QuestionClosed,
    AnswerResolved,
    ResultClosed,
    AuthFailed,
}

/// The single transition function. Pairs not listed keep the current state,
/// so stray events can never wedge the machine.
pub fn transition(state: &CalendarState, event: &CalendarEvent) -> CalendarState {
    use CalendarEvent as E;
    use CalendarState as S;
    match (state, event) {
        (S::CheckingSession, E::SessionAbsent) => S::NeedsIdentity(RegistrationMode::IdentityOnly),
        (_, E::DashboardLoaded) => S::Dashboard,
        (_, E::DashboardFailed) => S::NeedsIdentity(RegistrationMode::Full),
        (S::Dashboard, E::DayOpened) => S::QuestionOpen,
        (S::QuestionOpen, E::QuestionClosed) => S::Dashboard,
        (S::QuestionOpen, E::AnswerResolved) => S::ResultShown,
        (S::ResultShown, E::ResultClosed) => S::Dashboard,
        (_, E::AuthFailed) => S::NeedsIdentity(RegistrationMode::IdentityOnly),
        _ => state.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A dismissable user-visible message. Every failure produces one; nothing is
/// silently dropped except the session probe's designed-in swallow.
#[derive(Debug, Clone)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Raw identity form input; empty strings mean the field was left blank.
#[derive(Debug, Clone, Default)]
pub struct IdentityForm {
    pub email: String,
    pub full_name: String,
    pub company: String,
    pub job_title: String,
    pub business_phone: String,
}

impl IdentityForm {
    fn to_register_request(&self, mode: RegistrationMode) -> RegisterRequest {
        let opt = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        match mode {
            RegistrationMode::Full => RegisterRequest {
                email: self.email.trim().to_string(),
                full_name: opt(&self.full_name),
                company: opt(&self.company),
                job_title: opt(&self.job_title),
                business_phone: opt(&self.business_phone),
            },
            // Existing users still send the name so the backend can update it.
            RegistrationMode::IdentityOnly => RegisterRequest {
                email: self.email.trim().to_string(),
                full_name: opt(&self.full_name),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer_text: String,
}

/// Long-lived session machine for the calendar UI.
///
/// Owns the visible state, the cached dashboard snapshot, and the currently
/// open day. Intent methods mirror user actions; each one validates locally,
/// calls the API seam, queues notices, and applies [`transition`] events.
/// There is no terminal state: after startup it cycles between `Dashboard`,
/// `QuestionOpen` and `ResultShown` for the life of the process.
pub struct CalendarMachine<A: CampaignApi> {
    api: A,
    state: CalendarState,
    days: Vec<CampaignDay>,
    current_day: Option<u32>,
    total_days: u32,
    open_day: Option<DayDetail>,
    last_result: Option<AnswerOutcome>,
    loading_day: Option<u32>,
    notices: Vec<Notice>,
}

impl<A: CampaignApi> CalendarMachine<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: CalendarState::CheckingSession,
            days: Vec::new(),
            current_day: None,
            total_days: DEFAULT_TOTAL_DAYS,
            open_day: None,
            last_result: None,
            loading_day: None,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    pub fn days(&self) -> &[CampaignDay] {
        &self.days
    }

    pub fn current_day(&self) -> Option<u32> {
        self.current_day
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    /// The detail for the currently open question, if any.
    pub fn question(&self) -> Option<&DayDetail> {
        self.open_day.as_ref()
    }

    pub fn last_result(&self) -> Option<&AnswerOutcome> {
        self.last_result.as_ref()
    }

    /// Day number with an in-flight detail fetch, for a keyed spinner.
    pub fn loading_day(&self) -> Option<u32> {
        self.loading_day
    }

    /// Drain queued notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply(&mut self, event: CalendarEvent) {
        let next = transition(&self.state, &event);
        if next != self.state {
            tracing::debug!(?event, from = ?self.state, to = ?next, "state transition");
            self.state = next;
        }
    }

    fn auth_failure(&mut self, message: impl Into<String>) {
        self.api.forget_token();
        self.open_day = None;
        self.last_result = None;
        self.notices.push(Notice::error("Error", message.into()));
        self.apply(CalendarEvent::AuthFailed);
    }

    fn store_snapshot(&mut self, dash: crate::api::types::DashboardResponse) {
        self.total_days = dash.effective_total_days();
        self.current_day = dash.current_day;
        self.days = dash.days;
    }

    /// Startup probe. Valid session leads into a dashboard load; anything else
    /// asks for identity without the full registration form yet.
    pub async fn start(&mut self) {
        let resp = self.api.get_session().await;
        if resp.success && resp.session.is_some() {
            self.load_dashboard().await;
        } else {
            self.apply(CalendarEvent::SessionAbsent);
        }
    }

    async fn load_dashboard(&mut self) {
        match self.api.get_dashboard().await {
            Ok(dash) if dash.success => {
                self.store_snapshot(dash);
                self.apply(CalendarEvent::DashboardLoaded);
            }
            Ok(_) => self.apply(CalendarEvent::DashboardFailed),
            Err(e) if e.is_auth() => self.auth_failure(e.to_string()),
            Err(e) => {
                // Token may have gone stale between the probe and this fetch;
                // the backend may not know the user at all, so ask for the
                // full registration form.
                self.notices
                    .push(Notice::error("Error", format!("Failed to load calendar: {e}")));
                self.apply(CalendarEvent::DashboardFailed);
            }
        }
    }

    /// Submit the identity form shown in `NeedsIdentity`. Registers the user
    /// (field set depends on the mode), creates a session, then loads the
    /// dashboard.
    pub async fn submit_identity(&mut self, form: &IdentityForm) {
        let CalendarState::NeedsIdentity(mode) = self.state else {
            return;
        };

        if form.full_name.trim().is_empty() {
            self.notices.push(Notice::error(
                "Missing Information",
                "Please enter your full name",
            ));
            return;
        }
        if mode == RegistrationMode::Full
            && (form.company.trim().is_empty() || form.job_title.trim().is_empty())
        {
            self.notices.push(Notice::error(
                "Missing Information",
                "Please fill in all required fields",
            ));
            return;
        }
        if !is_valid_email(form.email.trim()) {
            self.notices.push(Notice::error(
                "Invalid Email",
                "Please enter a valid email address",
            ));
            return;
        }

        let req = form.to_register_request(mode);
        if let Err(e) = self.api.register(&req).await {
            self.notices.push(Notice::error("Error", e.to_string()));
            return;
        }

        match self.api.create_session(req.email.as_str()).await {
            Ok(resp) if resp.success && resp.token.is_some() => {
                let welcome = match mode {
                    RegistrationMode::Full => "Registration successful! Loading your game...",
                    RegistrationMode::IdentityOnly => "Welcome! Loading your game...",
                };
                self.notices.push(Notice::info("Success!", welcome));
                self.load_dashboard().await;
            }
            Ok(resp) => {
                let message = resp
                    .message
                    .unwrap_or_else(|| "Failed to create session".to_string());
                self.notices.push(Notice::error("Error", message));
            }
            Err(e) => self.notices.push(Notice::error("Error", e.to_string())),
        }
    }

    /// Click a calendar tile. Locked, unavailable and completed days are
    /// rejected locally without a network call.
    pub async fn open_day(&mut self, day_number: u32) {
        if self.state != CalendarState::Dashboard {
            return;
        }
        let Some(day) = self.days.iter().find(|d| d.day_number == day_number) else {
            self.notices
                .push(Notice::error("Error", "That day is not on the calendar"));
            return;
        };
        if day.is_locked || !day.is_available {
            self.notices
                .push(Notice::error("Day Locked", "This day is not yet available"));
            return;
        }
        if day.is_completed {
            self.notices.push(Notice::info(
                "Already Answered",
                "You have already answered this day's question",
            ));
            return;
        }

        self.loading_day = Some(day_number);
        let result = self.api.get_day(day_number).await;
        self.loading_day = None;
        match result {
            Ok(detail) => {
                self.open_day = Some(detail);
                self.last_result = None;
                self.apply(CalendarEvent::DayOpened);
            }
            Err(e) if e.is_auth() => self.auth_failure(e.to_string()),
            Err(e) => self
                .notices
                .push(Notice::error("Error", format!("Failed to load day details: {e}"))),
        }
    }

    /// Submit the selected option for the open question. The result merge
    /// happens before the background dashboard refresh.
    pub async fn submit_answer(&mut self, choice: &str) {
        if self.state != CalendarState::QuestionOpen || self.open_day.is_none() {
            return;
        }
        if choice.trim().is_empty() {
            self.notices.push(Notice::error(
                "Select an answer",
                "Please select an answer before submitting",
            ));
            return;
        }
        let day_number = self.open_day.as_ref().map(|d| d.day_number).unwrap_or(0);

        match self.api.submit_answer(day_number, choice.trim()).await {
            Ok(resp) if resp.success => {
                self.merge_answer(choice.trim(), &resp);
                self.apply(CalendarEvent::AnswerResolved);
                self.refresh_dashboard().await;
            }
            Ok(resp) => {
                let message = resp
                    .message
                    .unwrap_or_else(|| "Failed to submit answer".to_string());
                if looks_like_auth(&message) {
                    self.auth_failure(message);
                } else {
                    self.notices.push(Notice::error("Error", message));
                }
            }
            Err(e) if e.is_auth() => self.auth_failure(e.to_string()),
            Err(e) => self.notices.push(Notice::error("Error", e.to_string())),
        }
    }

    fn merge_answer(&mut self, choice: &str, resp: &AnswerResponse) {
        if let Some(detail) = self.open_day.as_mut() {
            detail.already_answered = true;
            detail.is_correct = Some(resp.is_correct);
            detail.user_answer = Some(choice.to_string());
            detail.correct_answer = Some(resp.correct_answer.clone());
            detail.correct_answer_text = Some(resp.correct_answer_text.clone());
        }
        self.last_result = Some(AnswerOutcome {
            is_correct: resp.is_correct,
            correct_answer_text: resp.correct_answer_text.clone(),
        });
    }

    /// Re-fetch the snapshot without a state transition, so tiles reflect the
    /// new completed flag the next time the grid is shown.
    async fn refresh_dashboard(&mut self) {
        match self.api.get_dashboard().await {
            Ok(dash) if dash.success => self.store_snapshot(dash),
            Ok(_) => tracing::warn!("dashboard refresh reported failure"),
            Err(e) if e.is_auth() => self.auth_failure(e.to_string()),
            Err(e) => tracing::warn!("dashboard refresh failed: {e}"),
        }
    }

    /// Close the question without answering, back to the grid.
    pub fn cancel_question(&mut self) {
        if self.state != CalendarState::QuestionOpen {
            return;
        }
        self.open_day = None;
        self.apply(CalendarEvent::QuestionClosed);
    }

    /// Dismiss the result view and return to the grid, refreshing it.
    pub async fn close_result(&mut self) {
        if self.state != CalendarState::ResultShown {
            return;
        }
        self.open_day = None;
        self.last_result = None;
        self.apply(CalendarEvent::ResultClosed);
        self.refresh_dashboard().await;
    }
}
