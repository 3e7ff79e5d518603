use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checkup_admin::api::{
    AdminQuery, AdminResource, ApiClient, ApiError, ApiRequest, ApiResponse, AuthSession,
    HttpTransport, Method, RequestBody, SessionFile, UploadKind,
};
use checkup_questionnaire::{AuthEvent, AuthEvents, TemplateForm};
use serde_json::json;
use tempfile::TempDir;

type Sent = Arc<Mutex<Vec<(ApiRequest, Option<String>)>>>;

/// Replays canned responses in order and records what was sent.
struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    sent: Sent,
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        self.sent
            .lock()
            .unwrap()
            .push((request.clone(), bearer.map(str::to_string)));
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request"))
    }
}

fn reply(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse {
        status,
        body: serde_json::to_vec(&body).unwrap(),
    }
}

fn template_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "testKey": "heart",
        "title": title,
        "carouselTitle": "",
        "carouselSubtitle": "",
        "description": "",
        "benefits": [],
        "doctors": [],
        "free": true,
        "isActive": true,
        "questions": []
    })
}

struct Harness {
    _dir: TempDir,
    session_path: std::path::PathBuf,
    sent: Sent,
    events: AuthEvents,
}

impl Harness {
    fn new(logged_in: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let session_path = dir.path().join("session.json");
        if logged_in {
            SessionFile::new(&session_path)
                .save(&AuthSession {
                    access_token: "access-1".into(),
                    refresh_token: "refresh-1".into(),
                    user: json!({ "email": "admin@example.com" }),
                })
                .unwrap();
        }
        Self {
            _dir: dir,
            session_path,
            sent: Arc::default(),
            events: AuthEvents::new(),
        }
    }

    fn client(&self, responses: Vec<ApiResponse>) -> ApiClient {
        let transport = ScriptedTransport {
            responses: Mutex::new(responses.into()),
            sent: Arc::clone(&self.sent),
        };
        ApiClient::new(
            Box::new(transport),
            SessionFile::new(&self.session_path),
            self.events.clone(),
        )
        .with_grace(Duration::ZERO)
    }

    fn sent(&self) -> Vec<(ApiRequest, Option<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[test]
fn authenticated_requests_carry_the_bearer_token() {
    let harness = Harness::new(true);
    let mut client = harness.client(vec![reply(200, json!([template_json("t1", "Heart")]))]);

    let templates = client.list_templates(true).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, "t1");
    assert_eq!(templates[0].form.title, "Heart");

    let sent = harness.sent();
    assert_eq!(sent[0].0.path, "/checkup-template/active");
    assert_eq!(sent[0].1.as_deref(), Some("access-1"));
}

#[test]
fn login_is_anonymous_and_persists_the_session() {
    let harness = Harness::new(false);
    let mut client = harness.client(vec![reply(
        201,
        json!({ "access_token": "a", "refresh_token": "r", "user": { "role": "admin" } }),
    )]);
    assert!(!client.is_logged_in());

    client.login("admin@example.com", "secret").unwrap();

    let sent = harness.sent();
    assert_eq!(sent[0].0.method, Method::Post);
    assert!(!sent[0].0.authenticated);
    assert_eq!(sent[0].1, None);
    let stored = SessionFile::new(&harness.session_path).load().unwrap();
    assert_eq!(stored.access_token, "a");
}

#[test]
fn rejected_token_is_refreshed_and_the_request_retried_once() {
    let harness = Harness::new(true);
    let mut client = harness.client(vec![
        reply(401, json!({ "message": "Unauthorized" })),
        reply(200, json!({ "access_token": "access-2", "refresh_token": "refresh-2" })),
        reply(200, template_json("t1", "Heart")),
    ]);

    let template = client.get_template("t1").unwrap();
    assert_eq!(template.id, "t1");

    let sent = harness.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].0.path, "/auth/refresh");
    assert_eq!(
        sent[1].0.body,
        RequestBody::Json(json!({ "refresh_token": "refresh-1" }))
    );
    assert_eq!(sent[2].1.as_deref(), Some("access-2"));

    let stored = SessionFile::new(&harness.session_path).load().unwrap();
    assert_eq!(stored.refresh_token, "refresh-2");
}

#[test]
fn failed_refresh_announces_expiry_then_clears_the_session() {
    let harness = Harness::new(true);
    let seen = Arc::new(AtomicUsize::new(0));
    let session_path = harness.session_path.clone();
    let observer = Arc::clone(&seen);
    let _subscription = harness.events.subscribe(move |event| {
        let AuthEvent::SessionExpired { request_path } = event;
        assert_eq!(request_path, "/checkup-template/t1");
        // The event fires before the stored session goes away.
        assert!(session_path.exists());
        observer.fetch_add(1, Ordering::SeqCst);
    });

    let mut client = harness.client(vec![
        reply(403, json!({ "message": "Forbidden" })),
        reply(401, json!({ "message": "INVALID_REFRESH_TOKEN" })),
    ]);
    let form = TemplateForm::default();
    let err = client.update_template("t1", &form).unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(!client.is_logged_in());
    assert!(!harness.session_path.exists());
}

#[test]
fn second_rejection_after_refresh_is_not_retried_again() {
    let harness = Harness::new(true);
    let mut client = harness.client(vec![
        reply(401, json!({})),
        reply(200, json!({ "access_token": "access-2", "refresh_token": "refresh-2" })),
        reply(403, json!({ "message": "ADMIN_ONLY" })),
    ]);

    let err = client.delete_template("t1").unwrap_err();
    assert_eq!(err.server_code(), Some("ADMIN_ONLY"));
    assert!(err.is_auth_failure());
    assert_eq!(harness.sent().len(), 3);
}

#[test]
fn anonymous_rejection_skips_the_interceptor() {
    let harness = Harness::new(false);
    let mut client = harness.client(vec![reply(401, json!({ "message": "INVALID_CREDENTIALS" }))]);

    let err = client.login("admin@example.com", "wrong").unwrap_err();
    assert_eq!(err.server_code(), Some("INVALID_CREDENTIALS"));
    assert_eq!(harness.sent().len(), 1);
}

#[test]
fn server_error_code_is_surfaced() {
    let harness = Harness::new(true);
    let mut client = harness.client(vec![reply(
        409,
        json!({ "statusCode": 409, "message": "TEST_KEY_ALREADY_EXISTS" }),
    )]);

    let err = client.create_template(&TemplateForm::default()).unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 409, .. }));
    assert_eq!(err.server_code(), Some("TEST_KEY_ALREADY_EXISTS"));
}

#[test]
fn oversized_upload_never_reaches_the_network() {
    let harness = Harness::new(true);
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("photo.png");
    std::fs::write(&image, vec![0u8; 600 * 1024]).unwrap();
    let document = dir.path().join("notes.pdf");
    std::fs::write(&document, b"%PDF").unwrap();

    let mut client = harness.client(Vec::new());
    let err = client
        .upload_image(&image, UploadKind::QuestionImage)
        .unwrap_err();
    assert!(matches!(err, ApiError::Upload(_)));
    let err = client
        .upload_image(&document, UploadKind::TemplateHero)
        .unwrap_err();
    assert!(matches!(err, ApiError::Upload(_)));
    assert!(harness.sent().is_empty());
}

#[test]
fn upload_sends_a_single_file_part() {
    let harness = Harness::new(true);
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("hero.jpg");
    std::fs::write(&image, vec![1u8; 1024]).unwrap();

    let mut client = harness.client(vec![reply(
        201,
        json!({ "url": "https://cdn.example.com/hero.jpg" }),
    )]);
    let url = client.upload_image(&image, UploadKind::TemplateHero).unwrap();
    assert_eq!(url, "https://cdn.example.com/hero.jpg");

    let sent = harness.sent();
    match &sent[0].0.body {
        RequestBody::File {
            file_name, mime, bytes, ..
        } => {
            assert_eq!(file_name, "hero.jpg");
            assert_eq!(mime, "image/jpeg");
            assert_eq!(bytes.len(), 1024);
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
}

#[test]
fn paged_admin_listing_adds_filters() {
    let harness = Harness::new(true);
    let mut client = harness.client(vec![
        reply(200, json!({ "items": [], "total": 0 })),
        reply(200, json!({ "total": 12 })),
    ]);

    let query = AdminQuery {
        page: 2,
        limit: 50,
        filter: Some("pending".into()),
    };
    client
        .admin_list(AdminResource::DoctorApplications, &query)
        .unwrap();
    client.admin_list(AdminResource::Statistics, &query).unwrap();

    let sent = harness.sent();
    assert_eq!(
        sent[0].0.query,
        vec![
            ("status".to_string(), "pending".to_string()),
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "50".to_string()),
        ]
    );
    assert!(sent[1].0.query.is_empty());
}
