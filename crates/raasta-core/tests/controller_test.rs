#![allow(clippy::unwrap_used)]
// End-to-end tests for `Controller` against a wiremock service.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use raasta_api::RaastaClient;
use raasta_core::{
    AppEvent, ClientConfig, Controller, CoreError, GenerationRequest, LoginState, ManualClock,
    MemorySettings, RateLimitPolicy, SessionState, SessionTransition, SkillStatus,
};

const NOW: i64 = 1_700_000_000_000;

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    controller: Controller,
    clock: Arc<ManualClock>,
}

async fn setup_with(configure: impl FnOnce(&mut ClientConfig)) -> Harness {
    let server = MockServer::start().await;
    let url = Url::parse(&server.uri()).unwrap();
    let mut config = ClientConfig {
        url: url.clone(),
        // Only the immediate first tick runs during a test.
        monitor_interval: Duration::from_secs(3600),
        ..ClientConfig::default()
    };
    configure(&mut config);

    let clock = Arc::new(ManualClock::new(NOW));
    let client = RaastaClient::with_client(reqwest::Client::new(), &url);
    let controller = Controller::from_parts(
        config,
        client,
        Arc::new(MemorySettings::new()),
        clock.clone(),
    );
    Harness {
        server,
        controller,
        clock,
    }
}

async fn setup() -> Harness {
    setup_with(|_| {}).await
}

fn questionnaire() -> GenerationRequest {
    GenerationRequest {
        goal: "Data Science".into(),
        interests: String::new(),
        education: "Bachelors".into(),
        location: "Lahore".into(),
        lang: Some("en".into()),
    }
}

/// Two milestones, four skills, every field present so the document
/// serialises back unchanged.
fn four_skill_roadmap() -> Value {
    let skill = |id: &str, rating: f64| {
        json!({
            "id": id,
            "title": format!("Skill {id}"),
            "description": "Learn it",
            "salary_pkr": "150,000",
            "future_growth_rating": rating,
            "job_opportunities": ["Analyst"],
            "resources": [{ "name": "Docs", "url": "https://example.org" }],
            "status": "incomplete"
        })
    };
    json!({
        "name": "Data Scientist",
        "summary": "From zero to hired",
        "milestones": [
            { "title": "Foundations", "skills": [skill("py", 4.5), skill("stats", 3.5)] },
            { "title": "Applied", "skills": [skill("ml", 4.5), skill("viz", 2.5)] }
        ]
    })
}

async fn mount_generate(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_session(server: &MockServer, expires_at: i64) {
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "email": "sana@example.pk",
            "expiresAt": expires_at
        })))
        .mount(server)
        .await;
}

fn drain(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ── Generation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_as_guest_replaces_store_without_sync() {
    let h = setup().await;
    mount_generate(&h.server, four_skill_roadmap()).await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let roadmap = h.controller.generate(questionnaire()).await.unwrap();
    h.controller.flush_sync().await;

    assert_eq!(roadmap.name, "Data Scientist");
    assert_eq!(roadmap.skill_count(), 4);
    assert_eq!(h.controller.progress(), 0);
    assert_eq!(h.controller.limiter().remaining(), Some(49));
}

#[tokio::test]
async fn test_generate_when_signed_in_saves_same_document() {
    let h = setup().await;
    mount_session(&h.server, NOW + 3_600_000).await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(json!({
            "goal": "Data Science",
            "interests": "",
            "education": "Bachelors",
            "location": "Lahore",
            "lang": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(four_skill_roadmap()))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_json(json!({ "roadmap": four_skill_roadmap() })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = h.controller.bootstrap().await;
    assert!(session.is_authenticated());

    h.controller.generate(questionnaire()).await.unwrap();
    h.controller.flush_sync().await;

    assert_eq!(h.controller.progress(), 0);
}

#[tokio::test]
async fn test_generate_surfaces_server_error_and_keeps_store() {
    let h = setup().await;
    h.controller.open_document(four_skill_roadmap()).unwrap();
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "error": "Model overloaded" })),
        )
        .mount(&h.server)
        .await;

    let err = h.controller.generate(questionnaire()).await.unwrap_err();

    assert_eq!(err.alert().title, "Error");
    assert_eq!(err.alert().message, "Model overloaded");
    assert_eq!(h.controller.roadmap().unwrap().name, "Data Scientist");
    assert_eq!(h.controller.limiter().remaining(), Some(50));
}

#[tokio::test]
async fn test_generate_without_error_body_uses_generic_message() {
    let h = setup().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let err = h.controller.generate(questionnaire()).await.unwrap_err();
    assert_eq!(err.to_string(), "Generation failed");
}

#[tokio::test]
async fn test_generate_rejects_document_without_milestones() {
    let h = setup().await;
    mount_generate(&h.server, json!({ "name": "Broken" })).await;

    let err = h.controller.generate(questionnaire()).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid structure");
    assert!(h.controller.roadmap().is_none());
    assert_eq!(h.controller.limiter().remaining(), Some(50));
}

#[tokio::test]
async fn test_generate_rate_limited_without_network_call() {
    let h = setup_with(|c| {
        c.rate_limit = RateLimitPolicy {
            max_generations: 2,
            window: Duration::from_secs(3600),
        };
    })
    .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(four_skill_roadmap()))
        .expect(2)
        .mount(&h.server)
        .await;

    h.controller.generate(questionnaire()).await.unwrap();
    h.controller.generate(questionnaire()).await.unwrap();
    let err = h.controller.generate(questionnaire()).await.unwrap_err();

    assert!(matches!(err, CoreError::RateLimited { limit: 2 }));
    assert_eq!(err.alert().title, "Limit Reached");

    h.clock.advance(Duration::from_secs(3601));
    assert!(h.controller.limiter().check_usage_limit());
}

#[tokio::test]
async fn test_admin_override_ignores_limit() {
    let h = setup_with(|c| {
        c.admin_override = true;
        c.rate_limit.max_generations = 1;
    })
    .await;
    mount_generate(&h.server, four_skill_roadmap()).await;

    for _ in 0..3 {
        h.controller.generate(questionnaire()).await.unwrap();
    }
    assert_eq!(h.controller.limiter().remaining(), None);
}

// ── Toggle and completion ───────────────────────────────────────────

#[tokio::test]
async fn test_toggle_syncs_and_announces_completion_once() {
    let h = setup().await;
    mount_session(&h.server, NOW + 3_600_000).await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&h.server)
        .await;

    h.controller.bootstrap().await;
    h.controller.open_document(four_skill_roadmap()).unwrap();
    let mut rx = h.controller.events();

    for id in ["py", "stats", "ml", "viz"] {
        h.controller.toggle_skill(id).await.unwrap();
    }
    let again = h.controller.toggle_skill("viz").await.unwrap();
    h.controller.flush_sync().await;

    assert_eq!(again.status, SkillStatus::Incomplete);
    assert_eq!(again.progress, 75);
    let completions = drain(&mut rx)
        .into_iter()
        .filter(|e| *e == AppEvent::CompletionReached)
        .count();
    assert_eq!(completions, 1);
}

#[tokio::test]
async fn test_complete_document_announces_completion_on_open() {
    let h = setup().await;
    let mut rx = h.controller.events();

    let mut doc = four_skill_roadmap();
    for milestone in doc["milestones"].as_array_mut().unwrap() {
        for skill in milestone["skills"].as_array_mut().unwrap() {
            skill["status"] = json!("completed");
        }
    }
    h.controller.open_document(doc).unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![
            AppEvent::RoadmapReplaced {
                name: "Data Scientist".into(),
                progress: 100,
            },
            AppEvent::CompletionReached,
        ]
    );

    // Already announced for this instance.
    h.controller.toggle_skill("py").await.unwrap();
    let outcome = h.controller.toggle_skill("py").await.unwrap();
    assert_eq!(outcome.progress, 100);
    assert!(!outcome.completion_reached);
}

#[tokio::test]
async fn test_toggle_unknown_skill() {
    let h = setup().await;
    h.controller.open_document(four_skill_roadmap()).unwrap();

    let err = h.controller.toggle_skill("nope").await.unwrap_err();
    assert!(matches!(err, CoreError::SkillNotFound { .. }));
}

// ── Restore and export ──────────────────────────────────────────────

#[tokio::test]
async fn test_restore_rejects_invalid_file_and_keeps_store() {
    let h = setup().await;
    h.controller.open_document(four_skill_roadmap()).unwrap();

    let err = h
        .controller
        .restore_from_str(r#"{"milestones": "not-an-array"}"#)
        .await
        .unwrap_err();

    assert_eq!(err.alert().title, "Invalid File");
    assert_eq!(h.controller.roadmap().unwrap().name, "Data Scientist");

    let err = h.controller.restore_from_str("not json").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidRoadmap { .. }));
}

#[tokio::test]
async fn test_export_then_restore_keeps_progress() {
    let h = setup().await;
    h.controller.open_document(four_skill_roadmap()).unwrap();
    h.controller.toggle_skill("py").await.unwrap();

    let exported = h.controller.export_json().unwrap();
    h.controller.open_document(four_skill_roadmap()).unwrap();
    assert_eq!(h.controller.progress(), 0);

    h.controller.restore_from_str(&exported).await.unwrap();
    assert_eq!(h.controller.progress(), 25);
}

#[tokio::test]
async fn test_export_without_roadmap() {
    let h = setup().await;
    assert!(matches!(
        h.controller.export_json(),
        Err(CoreError::NoRoadmap)
    ));
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bootstrap_loads_nested_saved_roadmap() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "email": "sana@example.pk",
            "data": { "career_roadmap": four_skill_roadmap() }
        })))
        .mount(&h.server)
        .await;

    let session = h.controller.bootstrap().await;

    assert_eq!(
        session,
        SessionState::Authenticated {
            email: "sana@example.pk".into(),
            expires_at: None,
        }
    );
    assert!(!h.controller.is_monitoring().await);
    assert_eq!(h.controller.roadmap().unwrap().skill_count(), 4);
}

#[tokio::test]
async fn test_bootstrap_guest_and_unreachable_are_harmless() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    assert_eq!(h.controller.bootstrap().await, SessionState::Guest);

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;
    assert_eq!(h.controller.bootstrap().await, SessionState::Guest);
}

// ── Login ───────────────────────────────────────────────────────────

async fn mount_login(server: &MockServer, expires_at: i64) {
    Mock::given(method("POST"))
        .and(path("/send-otp"))
        .and(body_json(json!({ "email": "sana@example.pk" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dev_otp": "123456" })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/verify-otp"))
        .and(body_json(json!({ "email": "sana@example.pk", "otp": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "sana@example.pk",
            "expiresAt": expires_at
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/verify-otp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid code" })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_with_roadmap_in_memory_saves_it() {
    let h = setup().await;
    mount_login(&h.server, NOW + 3_600_000).await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_json(json!({ "roadmap": four_skill_roadmap() })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    h.controller.open_document(four_skill_roadmap()).unwrap();
    let mut rx = h.controller.events();

    let sent = h
        .controller
        .request_login_code(" sana@example.pk ")
        .await
        .unwrap();
    assert_eq!(sent.dev_otp.as_deref(), Some("123456"));
    assert_eq!(
        h.controller.login_state().await,
        LoginState::OtpPending {
            email: "sana@example.pk".into()
        }
    );

    let session = h.controller.verify_login_code("123456").await.unwrap();

    assert!(session.is_authenticated());
    assert!(h.controller.is_monitoring().await);
    let alerts: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Alert(a) => Some(a.title),
            _ => None,
        })
        .collect();
    assert_eq!(alerts, vec!["Success".to_owned()]);
}

#[tokio::test]
async fn test_login_without_roadmap_bootstraps() {
    let h = setup().await;
    mount_login(&h.server, NOW + 3_600_000).await;
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "email": "sana@example.pk",
            "expiresAt": NOW + 3_600_000,
            "data": four_skill_roadmap()
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.controller.request_login_code("sana@example.pk").await.unwrap();
    h.controller.verify_login_code("123456").await.unwrap();

    assert_eq!(h.controller.roadmap().unwrap().name, "Data Scientist");
}

#[tokio::test]
async fn test_login_keeps_deadline_when_load_omits_it() {
    let h = setup().await;
    mount_login(&h.server, NOW + 3_600_000).await;
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "email": "sana@example.pk"
        })))
        .mount(&h.server)
        .await;

    h.controller.request_login_code("sana@example.pk").await.unwrap();
    let session = h.controller.verify_login_code("123456").await.unwrap();

    assert_eq!(session.expires_at(), Some(NOW + 3_600_000));
    assert_eq!(h.controller.session().expires_at(), Some(NOW + 3_600_000));

    h.clock.set(NOW + 3_600_001);
    assert_eq!(
        h.controller.check_session().await,
        Some(SessionTransition::Expired)
    );
}

#[tokio::test]
async fn test_wrong_code_keeps_otp_pending() {
    let h = setup().await;
    mount_login(&h.server, NOW + 3_600_000).await;

    h.controller.request_login_code("sana@example.pk").await.unwrap();
    let err = h.controller.verify_login_code("000000").await.unwrap_err();

    assert_eq!(err.alert().title, "Login Error");
    assert_eq!(err.alert().message, "Invalid code");
    assert!(matches!(
        h.controller.login_state().await,
        LoginState::OtpPending { .. }
    ));
    assert_eq!(h.controller.session(), SessionState::Guest);
}

#[tokio::test]
async fn test_bodiless_unauthorized_verify_uses_generic_message() {
    let h = setup().await;
    Mock::given(method("POST"))
        .and(path("/send-otp"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/verify-otp"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    h.controller.request_login_code("sana@example.pk").await.unwrap();
    let err = h.controller.verify_login_code("123456").await.unwrap_err();

    assert_eq!(err.alert().title, "Login Error");
    assert_eq!(err.alert().message, "Could not verify email. Please try again.");
    assert_eq!(h.controller.session(), SessionState::Guest);
}

#[tokio::test]
async fn test_blank_email_and_code_rejected_locally() {
    let h = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.controller.request_login_code("   ").await.unwrap_err();
    assert_eq!(err.alert().message, "Please enter a valid email.");

    let err = h.controller.verify_login_code("").await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn test_send_otp_failure_stays_in_email_entry() {
    let h = setup().await;
    Mock::given(method("POST"))
        .and(path("/send-otp"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let err = h.controller.request_login_code("sana@example.pk").await.unwrap_err();

    assert_eq!(
        err.alert().message,
        "Could not send a login code. Please try again."
    );
    assert_eq!(h.controller.login_state().await, LoginState::EmailEntry);
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_resets_even_when_remote_fails() {
    let h = setup().await;
    mount_session(&h.server, NOW + 3_600_000).await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    h.controller.bootstrap().await;
    h.controller.open_document(four_skill_roadmap()).unwrap();
    assert!(h.controller.is_monitoring().await);

    h.controller.logout().await.unwrap();

    assert_eq!(h.controller.session(), SessionState::Guest);
    assert!(h.controller.roadmap().is_none());
    assert!(!h.controller.is_monitoring().await);
}

// ── Session expiry ──────────────────────────────────────────────────

#[tokio::test]
async fn test_expiry_warning_then_forced_logout() {
    let h = setup().await;
    mount_session(&h.server, NOW + 601_000).await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    h.controller.bootstrap().await;
    tokio::task::yield_now().await;
    let mut rx = h.controller.events();

    assert_eq!(h.controller.check_session().await, None);
    assert!(drain(&mut rx).is_empty());

    h.clock.advance(Duration::from_secs(1));
    h.controller.check_session().await;
    let events = drain(&mut rx);
    assert!(events.contains(&AppEvent::ExpiryWarning {
        remaining: Duration::from_secs(600)
    }));
    assert!(matches!(
        h.controller.session(),
        SessionState::WarningIssued { .. }
    ));

    h.clock.advance(Duration::from_secs(1));
    h.controller.check_session().await;
    assert!(drain(&mut rx).is_empty());

    h.clock.set(NOW + 601_000);
    h.controller.check_session().await;
    let events = drain(&mut rx);
    assert!(events.contains(&AppEvent::SessionExpired));
    assert!(h.controller.session().is_expired());
    assert!(!h.controller.is_monitoring().await);

    let err = h.controller.generate(questionnaire()).await.unwrap_err();
    assert!(matches!(err, CoreError::SessionExpired));
}

#[tokio::test]
async fn test_monitor_task_expires_session() {
    let h = setup_with(|c| c.monitor_interval = Duration::from_millis(10)).await;
    mount_session(&h.server, NOW + 1_000).await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;

    let mut rx = h.controller.events();
    h.controller.bootstrap().await;
    h.clock.advance(Duration::from_secs(2));

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if rx.recv().await.unwrap() == AppEvent::SessionExpired {
                break;
            }
        }
    })
    .await
    .unwrap();

    assert!(h.controller.session().is_expired());
}

#[tokio::test]
async fn test_reload_leaves_expired_state() {
    let h = setup().await;
    mount_session(&h.server, NOW + 1_000).await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;

    h.controller.bootstrap().await;
    h.clock.advance(Duration::from_secs(5));
    h.controller.check_session().await;
    assert!(h.controller.session().is_expired());

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    assert_eq!(h.controller.reload().await, SessionState::Guest);
    assert!(matches!(
        h.controller.toggle_skill("py").await,
        Err(CoreError::NoRoadmap)
    ));
}
