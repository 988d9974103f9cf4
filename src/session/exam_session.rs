use crate::config::Config;
use crate::dto::exam_dto::SubmitAttemptRequest;
use crate::error::{Error, Result};
use crate::models::certificate::{CertificateState, ExamCertificate};
use crate::models::exam::{Exam, Question};
use crate::models::exam_attempt::{AttemptStatus, ExamAttempt};
use crate::services::exam_service::ExamBackend;
use crate::services::grading_service::{GradedAnswer, GradingService};
use crate::utils::in_flight::InFlight;
use crate::utils::time;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Submitted { passed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    First,
    Last,
    To(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Backend,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub score: u32,
    pub passed: bool,
    pub score_source: ScoreSource,
    pub status: AttemptStatus,
    pub submitted_at: DateTime<Utc>,
    pub certificate: Option<ExamCertificate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    NoLimit,
    Running(Duration),
    /// Limit passed but enforcement is off; the attempt stays open.
    Expired,
    AutoSubmitted,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub include_answers: bool,
    pub auto_submit_on_timeout: bool,
    pub certificate_poll_interval: std::time::Duration,
    pub certificate_max_polls: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            include_answers: true,
            auto_submit_on_timeout: false,
            certificate_poll_interval: std::time::Duration::from_secs(2),
            certificate_max_polls: 10,
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            include_answers: config.include_answers,
            auto_submit_on_timeout: config.auto_submit_on_timeout,
            certificate_poll_interval: config.certificate_poll_interval(),
            certificate_max_polls: config.certificate_max_polls,
        }
    }
}

/// Client-side state of one user working through an exam.
///
/// `NotStarted -> InProgress -> Submitted`. Answers may only change while
/// `InProgress`; a failed submission leaves the session `InProgress` with
/// every answer intact. A failed attempt may be retaken, which asks the
/// backend for a fresh attempt and clears the answers.
pub struct ExamSession<B: ExamBackend> {
    backend: B,
    options: SessionOptions,
    exam: Option<Exam>,
    questions: Vec<Question>,
    attempt: Option<ExamAttempt>,
    answers: Vec<Option<usize>>,
    current_index: usize,
    state: SessionState,
    result: Option<AttemptResult>,
    is_submitting: bool,
}

impl<B: ExamBackend> ExamSession<B> {
    pub fn new(backend: B, options: SessionOptions) -> Self {
        Self {
            backend,
            options,
            exam: None,
            questions: Vec::new(),
            attempt: None,
            answers: Vec::new(),
            current_index: 0,
            state: SessionState::NotStarted,
            result: None,
            is_submitting: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn exam(&self) -> Option<&Exam> {
        self.exam.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn attempt(&self) -> Option<&ExamAttempt> {
        self.attempt.as_ref()
    }

    pub fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn all_answered(&self) -> bool {
        self.answers.iter().all(|a| a.is_some())
    }

    pub async fn load_exam(&mut self, exam_id: &str) -> Result<&Exam> {
        let exam = self
            .backend
            .get_exam(exam_id, self.options.include_answers)
            .await?;
        info!(exam_id, questions = exam.questions.len(), "Exam loaded");
        self.install_exam(exam);
        self.attempt = None;
        self.result = None;
        self.state = SessionState::NotStarted;
        self.loaded_exam()
    }

    /// Opens a backend attempt for the loaded exam.
    pub async fn start(&mut self) -> Result<()> {
        if self.state != SessionState::NotStarted {
            return Err(Error::InvalidState(
                "An attempt is already open for this exam".to_string(),
            ));
        }
        let exam_id = self.loaded_exam()?.id.clone();
        let attempt = self.backend.start_attempt(&exam_id).await?;
        self.begin(attempt);
        Ok(())
    }

    /// Restores a session from an existing attempt without resubmitting it.
    pub async fn resume(&mut self, attempt_id: &str) -> Result<()> {
        let attempt = self.backend.get_attempt(attempt_id).await?;
        let exam = self
            .backend
            .get_exam(&attempt.exam_id, self.options.include_answers)
            .await?;
        self.install_exam(exam);
        self.answers = attempt.answer_slots(self.questions.len());

        if attempt.is_submitted() {
            let result = self.reconcile(&attempt)?;
            self.state = SessionState::Submitted { passed: result.passed };
            self.result = Some(result);
        } else {
            self.state = SessionState::InProgress;
            self.result = None;
        }
        info!(attempt_id, state = ?self.state, "Exam attempt resumed");
        self.attempt = Some(attempt);
        Ok(())
    }

    pub fn select_answer(&mut self, question_index: usize, option_index: usize) -> Result<()> {
        self.ensure_in_progress()?;
        let slot = self.answers.get_mut(question_index).ok_or_else(|| {
            Error::validation(format!("Question {} does not exist", question_index + 1))
        })?;
        *slot = Some(option_index);
        debug!(question_index, option_index, "Answer selected");
        Ok(())
    }

    pub fn clear_answer(&mut self, question_index: usize) -> Result<()> {
        self.ensure_in_progress()?;
        let slot = self.answers.get_mut(question_index).ok_or_else(|| {
            Error::validation(format!("Question {} does not exist", question_index + 1))
        })?;
        *slot = None;
        Ok(())
    }

    /// Moves the question cursor, clamped to the question list.
    pub fn navigate(&mut self, nav: Navigation) -> usize {
        let last = self.questions.len().saturating_sub(1);
        self.current_index = match nav {
            Navigation::Next => (self.current_index + 1).min(last),
            Navigation::Previous => self.current_index.saturating_sub(1),
            Navigation::First => 0,
            Navigation::Last => last,
            Navigation::To(i) => i.min(last),
        };
        self.current_index
    }

    pub fn compute_local_score(&self) -> u32 {
        GradingService::compute_score(&self.questions, &self.answers)
    }

    pub async fn submit(&mut self) -> Result<&AttemptResult> {
        self.submit_inner(false).await
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let limit = self.exam.as_ref()?.time_limit?;
        let attempt = self.attempt.as_ref()?;
        Some(time::remaining(attempt.started_at, Duration::minutes(limit as i64), now))
    }

    /// Reports the timer and, when enforcement is enabled, closes an
    /// expired attempt as timed out.
    pub async fn check_timeout(&mut self, now: DateTime<Utc>) -> Result<TimerStatus> {
        if self.state != SessionState::InProgress {
            return Ok(TimerStatus::NoLimit);
        }
        let Some(left) = self.time_remaining(now) else {
            return Ok(TimerStatus::NoLimit);
        };
        if left > Duration::zero() {
            return Ok(TimerStatus::Running(left));
        }
        if !self.options.auto_submit_on_timeout {
            return Ok(TimerStatus::Expired);
        }
        warn!(attempt_id = ?self.attempt.as_ref().map(|a| &a.id), "Time limit reached; submitting attempt");
        self.submit_inner(true).await?;
        Ok(TimerStatus::AutoSubmitted)
    }

    pub async fn retake(&mut self) -> Result<()> {
        match self.state {
            SessionState::Submitted { passed: false } => {}
            SessionState::Submitted { passed: true } => {
                return Err(Error::InvalidState(
                    "A passed exam cannot be retaken".to_string(),
                ))
            }
            _ => {
                return Err(Error::InvalidState(
                    "Only a submitted attempt can be retaken".to_string(),
                ))
            }
        }
        let exam_id = self.loaded_exam()?.id.clone();
        let attempt = self.backend.start_attempt(&exam_id).await?;
        self.result = None;
        self.begin(attempt);
        Ok(())
    }

    pub fn certificate_state(&self) -> CertificateState {
        match &self.result {
            Some(AttemptResult { passed: true, certificate: Some(cert), .. }) => {
                CertificateState::Issued(cert.clone())
            }
            Some(AttemptResult { passed: true, certificate: None, .. }) => CertificateState::Generating,
            _ => CertificateState::NotEligible,
        }
    }

    /// Re-reads the submitted attempt to pick up a certificate the backend
    /// attached after submission.
    pub async fn refresh(&mut self) -> Result<CertificateState> {
        if !matches!(self.state, SessionState::Submitted { .. }) {
            return Err(Error::InvalidState(
                "Only a submitted attempt has a result to refresh".to_string(),
            ));
        }
        let attempt_id = self.open_attempt_id()?;
        let attempt = self.backend.get_attempt(&attempt_id).await?;
        if let Some(result) = self.result.as_mut() {
            if attempt.certificate.is_some() {
                result.certificate = attempt.certificate.clone();
            }
        }
        self.attempt = Some(attempt);
        Ok(self.certificate_state())
    }

    /// Polls until the certificate is issued or the poll budget runs out,
    /// returning the last observed state either way.
    pub async fn await_certificate(&mut self) -> Result<CertificateState> {
        let mut state = self.certificate_state();
        for poll in 0..self.options.certificate_max_polls {
            if state.is_settled() {
                break;
            }
            if poll > 0 {
                tokio::time::sleep(self.options.certificate_poll_interval).await;
            }
            state = self.refresh().await?;
            debug!(poll, settled = state.is_settled(), "Polled for certificate");
        }
        Ok(state)
    }

    pub fn review(&self) -> Result<Vec<GradedAnswer>> {
        if !matches!(self.state, SessionState::Submitted { .. }) {
            return Err(Error::InvalidState(
                "Answers can only be reviewed after submission".to_string(),
            ));
        }
        Ok(GradingService::grade(&self.questions, &self.answers))
    }

    async fn submit_inner(&mut self, timed_out: bool) -> Result<&AttemptResult> {
        self.ensure_in_progress()?;
        if self.is_submitting {
            return Err(Error::InvalidState(
                "A submission is already in flight".to_string(),
            ));
        }
        let attempt_id = self.open_attempt_id()?;
        let mut request = SubmitAttemptRequest::from_slots(&self.questions, &self.answers);
        if timed_out {
            request = request.timed_out();
        }

        let outcome = {
            let _in_flight = InFlight::raise(&mut self.is_submitting);
            self.backend.submit_attempt(&attempt_id, &request).await
        };

        let attempt = match outcome {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!(%attempt_id, error = %e, "Exam submission failed; attempt left open");
                return Err(Error::Submission(Box::new(e)));
            }
        };

        let mut result = self.reconcile(&attempt)?;
        if timed_out {
            result.status = AttemptStatus::TimedOut;
        }
        info!(
            %attempt_id,
            score = result.score,
            passed = result.passed,
            source = ?result.score_source,
            "Exam attempt submitted"
        );
        self.state = SessionState::Submitted { passed: result.passed };
        self.attempt = Some(attempt);
        Ok(self.result.insert(result))
    }

    /// Prefers the backend's score and verdict, falling back to local grading.
    fn reconcile(&self, attempt: &ExamAttempt) -> Result<AttemptResult> {
        let exam = self.loaded_exam()?;
        let (score, score_source) = match attempt.reported_score() {
            Some(score) => (score, ScoreSource::Backend),
            None => (self.compute_local_score(), ScoreSource::Local),
        };
        let passed = attempt
            .passed
            .unwrap_or_else(|| GradingService::is_passing(score, exam.passing_score));
        let status = match attempt.status {
            AttemptStatus::InProgress => AttemptStatus::Submitted,
            other => other,
        };
        Ok(AttemptResult {
            score,
            passed,
            score_source,
            status,
            submitted_at: attempt.submitted_at.unwrap_or_else(time::now),
            certificate: attempt.certificate.clone(),
        })
    }

    fn install_exam(&mut self, exam: Exam) {
        self.questions = exam.ordered_questions();
        self.answers = vec![None; self.questions.len()];
        self.current_index = 0;
        self.exam = Some(exam);
    }

    fn begin(&mut self, attempt: ExamAttempt) {
        self.answers = vec![None; self.questions.len()];
        self.current_index = 0;
        self.state = SessionState::InProgress;
        info!(attempt_id = %attempt.id, exam_id = %attempt.exam_id, "Exam attempt in progress");
        self.attempt = Some(attempt);
    }

    fn loaded_exam(&self) -> Result<&Exam> {
        self.exam
            .as_ref()
            .ok_or_else(|| Error::InvalidState("No exam has been loaded".to_string()))
    }

    fn open_attempt_id(&self) -> Result<String> {
        self.attempt
            .as_ref()
            .map(|a| a.id.clone())
            .ok_or_else(|| Error::InvalidState("No attempt has been started".to_string()))
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::NotStarted => Err(Error::InvalidState(
                "The attempt has not been started".to_string(),
            )),
            SessionState::Submitted { .. } => Err(Error::InvalidState(
                "The attempt has already been submitted".to_string(),
            )),
        }
    }
}
