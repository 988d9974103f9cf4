mod common;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use homecare_client::error::Error;
use homecare_client::models::certificate::CertificateState;
use homecare_client::models::exam_attempt::AttemptStatus;
use homecare_client::session::exam_session::{Navigation, ScoreSource, SessionState};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Backend {
    starts: usize,
    submits: usize,
    fail_first_submit: bool,
    answers: HashMap<String, Vec<i64>>,
    attempt_reads: usize,
    started_for: Vec<String>,
}

type Shared = Arc<Mutex<Backend>>;

fn exam_json() -> JsonValue {
    json!({
        "id": "exam-7",
        "title": "Fall Prevention",
        "questions": [
            { "id": "q1", "prompt": "Lock the bed wheels?", "options": ["Yes", "No"], "correctAnswer": 0 },
            { "id": "q2", "prompt": "Leave the call light within reach?", "options": ["No", "Yes"], "correctAnswer": 1 }
        ],
        "passingScore": 80,
        "timeLimit": 30,
        "status": "PUBLISHED",
        "questionOrder": ["q2", "q1"]
    })
}

fn graded(answers: &[i64]) -> (u32, bool) {
    let correct = [("q2", 1), ("q1", 0)];
    let hits = answers
        .iter()
        .zip(correct.iter())
        .filter(|(a, (_, c))| **a == *c)
        .count() as u32;
    let score = hits * 50;
    (score, score >= 80)
}

fn attempt_json(id: &str, answers: Option<&Vec<i64>>, certificate: bool) -> JsonValue {
    let mut attempt = json!({
        "id": id,
        "examId": "exam-7",
        "userId": 5,
        "startedAt": chrono::Utc::now().to_rfc3339(),
        "status": "IN_PROGRESS",
        "answers": []
    });
    if let Some(answers) = answers {
        let (score, passed) = graded(answers);
        attempt["answers"] = json!(answers);
        attempt["status"] = json!("SUBMITTED");
        attempt["submittedAt"] = json!(chrono::Utc::now().to_rfc3339());
        attempt["score"] = json!(score);
        attempt["passed"] = json!(passed);
        if passed && certificate {
            attempt["certificate"] = json!({
                "id": "cert-1",
                "attemptId": id,
                "status": "PENDING",
                "score": score,
                "certificateNumber": "HC-7-0001",
                "issuedAt": chrono::Utc::now().to_rfc3339()
            });
        }
    }
    attempt
}

async fn get_exam(Path(id): Path<String>) -> (StatusCode, Json<JsonValue>) {
    if id != "exam-7" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Exam not found" })));
    }
    (StatusCode::OK, Json(json!({ "success": true, "data": exam_json() })))
}

async fn start_attempt(
    State(state): State<Shared>,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    let mut backend = state.lock().unwrap();
    backend.starts += 1;
    let exam_id = body["examId"].as_str().unwrap_or_default().to_string();
    backend.started_for.push(exam_id);
    let id = format!("att-{}", backend.starts);
    (StatusCode::CREATED, Json(json!({ "data": attempt_json(&id, None, false) })))
}

async fn submit_attempt(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    let mut backend = state.lock().unwrap();
    backend.submits += 1;
    if backend.fail_first_submit && backend.submits == 1 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Scheduled maintenance" })),
        );
    }
    let answers: Vec<i64> = body["answers"]
        .as_array()
        .map(|items| items.iter().map(|a| a["answer"].as_i64().unwrap_or(-1)).collect())
        .unwrap_or_default();
    let attempt = attempt_json(&id, Some(&answers), false);
    backend.answers.insert(id, answers);
    (StatusCode::OK, Json(attempt))
}

async fn get_attempt(State(state): State<Shared>, Path(id): Path<String>) -> (StatusCode, Json<JsonValue>) {
    let mut backend = state.lock().unwrap();
    backend.attempt_reads += 1;
    let with_certificate = backend.attempt_reads >= 2;
    match backend.answers.get(&id) {
        Some(answers) => (StatusCode::OK, Json(attempt_json(&id, Some(answers), with_certificate))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Attempt not found" }))),
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/exams-v2/:id", get(get_exam))
        .route("/api/attempts", post(start_attempt))
        .route("/api/attempts/:id", get(get_attempt))
        .route("/api/attempts/:id/submit", post(submit_attempt))
        .with_state(state)
}

#[tokio::test]
async fn pass_after_retrying_a_failed_submission() {
    let state: Shared = Arc::new(Mutex::new(Backend {
        fail_first_submit: true,
        ..Default::default()
    }));
    let client = common::spawn_backend(router(state.clone())).await;
    let mut session = client.exam_session();

    session.load_exam("exam-7").await.unwrap();
    assert_eq!(session.questions()[0].id, "q2");
    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::InProgress);

    session.select_answer(0, 1).unwrap();
    session.navigate(Navigation::Next);
    session.select_answer(session.current_index(), 0).unwrap();

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, Error::Submission(ref inner) if matches!(**inner, Error::Server { status: 503, .. })));
    assert!(err.is_retryable());
    assert_eq!(session.state(), SessionState::InProgress);
    assert_eq!(session.answers(), &[Some(1), Some(0)]);

    let result = session.submit().await.unwrap().clone();
    assert_eq!(result.score, 100);
    assert!(result.passed);
    assert_eq!(result.score_source, ScoreSource::Backend);
    assert_eq!(result.status, AttemptStatus::Submitted);
    assert_eq!(state.lock().unwrap().answers["att-1"], vec![1, 0]);

    assert_eq!(session.certificate_state(), CertificateState::Generating);
    match session.await_certificate().await.unwrap() {
        CertificateState::Issued(cert) => assert_eq!(cert.certificate_number, "HC-7-0001"),
        other => panic!("expected an issued certificate, got {:?}", other),
    }
}

#[tokio::test]
async fn failing_attempt_can_be_retaken_with_a_new_backend_attempt() {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));
    let client = common::spawn_backend(router(state.clone())).await;
    let mut session = client.exam_session();

    session.load_exam("exam-7").await.unwrap();
    session.start().await.unwrap();
    session.select_answer(0, 0).unwrap();
    let result = session.submit().await.unwrap().clone();
    assert_eq!(result.score, 0);
    assert!(!result.passed);
    assert_eq!(session.certificate_state(), CertificateState::NotEligible);

    session.retake().await.unwrap();
    assert_eq!(session.attempt().unwrap().id, "att-2");
    assert_eq!(session.answers(), &[None, None]);
    assert_eq!(state.lock().unwrap().started_for, vec!["exam-7", "exam-7"]);
}

#[tokio::test]
async fn result_page_reload_does_not_resubmit() {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));
    let client = common::spawn_backend(router(state.clone())).await;

    let mut first = client.exam_session();
    first.load_exam("exam-7").await.unwrap();
    first.start().await.unwrap();
    first.select_answer(0, 1).unwrap();
    first.submit().await.unwrap();

    let mut reloaded = client.exam_session();
    reloaded.resume("att-1").await.unwrap();
    assert_eq!(reloaded.state(), SessionState::Submitted { passed: false });
    assert_eq!(reloaded.result().unwrap().score, 50);
    assert_eq!(reloaded.answers(), &[Some(1), None]);
    assert_eq!(state.lock().unwrap().submits, 1);
}

#[tokio::test]
async fn unknown_exam_surfaces_not_found() {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));
    let client = common::spawn_backend(router(state)).await;
    let mut session = client.exam_session();
    assert!(matches!(session.load_exam("nope").await, Err(Error::NotFound(_))));
    assert_eq!(session.state(), SessionState::NotStarted);
}
