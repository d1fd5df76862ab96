//! Integration tests for the school admin backend and resource client.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::client::{ClientError, Scope, Session, Status};
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::models::{Division, House, Reason, Teacher};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_global_kinds(Vec::new()).await
    }

    async fn with_global_kinds(global_unique_kinds: Vec<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
            global_unique_kinds,
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn session(&self, admin: &str) -> Session {
        let session = Session::new(&self.base_url).unwrap();
        session.set_scope(Some(Scope::new(admin).unwrap())).await;
        session
    }
}

fn division(name: &str, from: f64, upto: f64) -> Division {
    Division {
        name: name.to_string(),
        percent_from: from,
        percent_upto: upto,
    }
}

fn teacher(name: &str, email: &str, username: &str) -> Teacher {
    Teacher {
        teacher_code: None,
        name: name.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        phone: None,
        subject: None,
        gender: None,
        joining_date: None,
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_create_and_list_over_http() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/divisions"))
        .json(&json!({
            "adminID": "A1",
            "name": "First",
            "percentFrom": 60,
            "percentUpto": 100
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Division created successfully");
    assert_eq!(body["data"]["name"], "First");
    assert_eq!(body["data"]["adminID"], "A1");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());

    let resp = fixture
        .client
        .get(fixture.url("/api/divisions/A1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["percentFrom"], 60.0);
}

#[tokio::test]
async fn test_duplicate_name_conflicts() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;
    let store = &session.divisions;

    store.create(division("First", 60.0, 100.0)).await.unwrap();

    let err = store
        .create(division("First", 50.0, 59.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Conflict(_)));
    assert_eq!(err.to_string(), "Division with this name already exists");

    let state = store.snapshot().await;
    assert_eq!(state.status(), Status::Failed);
    assert_eq!(state.records().len(), 1);
    assert_eq!(
        state.error(),
        Some("Division with this name already exists")
    );

    // The server list is unchanged too.
    let records = store.fetch().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields.percent_from, 60.0);
}

#[tokio::test]
async fn test_duplicate_over_http_is_409() {
    let fixture = TestFixture::new().await;
    let body = json!({ "adminID": "A1", "name": "Green" });

    let first = fixture
        .client
        .post(fixture.url("/api/houses"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = fixture
        .client
        .post(fixture.url("/api/houses"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);

    let body: Value = second.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "House with this name already exists");
}

#[tokio::test]
async fn test_update_missing_record() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;
    let store = &session.divisions;

    store.create(division("First", 60.0, 100.0)).await.unwrap();

    let err = store
        .update("no-such-id", division("Second", 45.0, 59.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let state = store.snapshot().await;
    assert_eq!(state.status(), Status::Failed);
    assert_eq!(state.records().len(), 1);
    assert_eq!(state.records()[0].fields.name, "First");
}

#[tokio::test]
async fn test_update_leaves_others_unchanged() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;
    let store = &session.houses;

    let red = store
        .create(House {
            name: "Red".to_string(),
            color: Some("#FF0000".to_string()),
        })
        .await
        .unwrap();
    let blue = store
        .create(House {
            name: "Blue".to_string(),
            color: None,
        })
        .await
        .unwrap();

    let updated = store
        .update(
            &red.id,
            House {
                name: "Crimson".to_string(),
                color: Some("#DC143C".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, red.id);
    assert_eq!(updated.created_at, red.created_at);

    let state = store.snapshot().await;
    assert_eq!(state.status(), Status::Succeeded);
    let records = state.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].fields.name, "Crimson");
    assert_eq!(records[1], blue);
}

#[tokio::test]
async fn test_update_can_keep_own_unique_value() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;

    let first = session
        .divisions
        .create(division("First", 60.0, 100.0))
        .await
        .unwrap();

    // Same name, new range.
    let updated = session
        .divisions
        .update(&first.id, division("First", 65.0, 100.0))
        .await
        .unwrap();
    assert_eq!(updated.fields.percent_from, 65.0);
}

#[tokio::test]
async fn test_delete_then_list() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;
    let store = &session.divisions;

    let first = store.create(division("First", 60.0, 100.0)).await.unwrap();
    store.create(division("Second", 45.0, 59.0)).await.unwrap();

    store.delete(&first.id).await.unwrap();

    let state = store.snapshot().await;
    assert_eq!(state.status(), Status::Succeeded);
    let names: Vec<&str> = state
        .records()
        .iter()
        .map(|r| r.fields.name.as_str())
        .collect();
    assert_eq!(names, vec!["Second"]);

    // A second delete is reported as 404 by the server but succeeds for the client.
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/divisions/{}", first.id)))
        .query(&[("adminID", "A1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    store.delete(&first.id).await.unwrap();
    assert_eq!(store.snapshot().await.records().len(), 1);
}

#[tokio::test]
async fn test_delete_frees_unique_value() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;

    let first = session
        .divisions
        .create(division("First", 60.0, 100.0))
        .await
        .unwrap();
    session.divisions.delete(&first.id).await.unwrap();

    session
        .divisions
        .create(division("First", 60.0, 100.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_scopes_are_isolated() {
    let fixture = TestFixture::new().await;
    let a1 = fixture.session("A1").await;
    let a2 = fixture.session("A2").await;

    a1.divisions
        .create(division("First", 60.0, 100.0))
        .await
        .unwrap();

    // Same name under another admin is allowed by default.
    a2.divisions
        .create(division("First", 55.0, 100.0))
        .await
        .unwrap();

    let a1_records = a1.divisions.fetch().await.unwrap();
    let a2_records = a2.divisions.fetch().await.unwrap();
    assert_eq!(a1_records.len(), 1);
    assert_eq!(a2_records.len(), 1);
    assert_eq!(a2_records[0].admin_id, "A2");

    // A2 cannot delete A1's record.
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/divisions/{}", a1_records[0].id)))
        .query(&[("adminID", "A2")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(a1.divisions.fetch().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_switching_scope_clears_cache() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;

    session
        .reasons
        .create(Reason {
            title: "Late arrival".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(session.reasons.snapshot().await.records().len(), 1);

    session.set_scope(Some(Scope::new("A2").unwrap())).await;
    let state = session.reasons.snapshot().await;
    assert_eq!(state.status(), Status::Idle);
    assert!(state.records().is_empty());

    assert!(session.reasons.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_global_uniqueness_for_configured_kind() {
    let fixture = TestFixture::with_global_kinds(vec!["teachers".to_string()]).await;
    let a1 = fixture.session("A1").await;
    let a2 = fixture.session("A2").await;

    a1.teachers
        .create(teacher("Asha Rao", "asha@school.test", "asha"))
        .await
        .unwrap();

    let err = a2
        .teachers
        .create(teacher("Asha R", "ASHA@school.test", "asha2"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Conflict("Teacher with this email already exists".to_string())
    );

    // Other kinds stay per-admin.
    a1.divisions
        .create(division("First", 60.0, 100.0))
        .await
        .unwrap();
    a2.divisions
        .create(division("First", 60.0, 100.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_teacher_codes_are_generated() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;
    let store = &session.teachers;

    let first = store
        .create(teacher("Asha Rao", "asha@school.test", "asha"))
        .await
        .unwrap();
    let second = store
        .create(teacher("Vikram Das", "vikram@school.test", "vikram"))
        .await
        .unwrap();
    assert_eq!(first.fields.teacher_code.as_deref(), Some("TCH0001"));
    assert_eq!(second.fields.teacher_code.as_deref(), Some("TCH0002"));

    // A client-supplied code on update does not replace the generated one.
    let mut edited = teacher("Asha Rao", "asha.rao@school.test", "asha");
    edited.teacher_code = Some("TCH9999".to_string());
    let updated = store.update(&first.id, edited).await.unwrap();
    assert_eq!(updated.fields.teacher_code.as_deref(), Some("TCH0001"));
    assert_eq!(updated.fields.email, "asha.rao@school.test");
}

#[tokio::test]
async fn test_invalid_payload_is_rejected() {
    let fixture = TestFixture::new().await;

    // Inverted percent range
    let resp = fixture
        .client
        .post(fixture.url("/api/divisions"))
        .json(&json!({
            "adminID": "A1",
            "name": "Broken",
            "percentFrom": 80,
            "percentUpto": 20
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Missing scope key
    let resp = fixture
        .client
        .post(fixture.url("/api/divisions"))
        .json(&json!({ "name": "First", "percentFrom": 60, "percentUpto": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown discount type
    let resp = fixture
        .client
        .post(fixture.url("/api/discounts"))
        .json(&json!({
            "adminID": "A1",
            "name": "Sibling",
            "discountType": "bogus",
            "amount": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .get(fixture.url("/api/divisions/A1"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_validation_sends_nothing() {
    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;

    let err = session
        .divisions
        .create(division("", 10.0, 20.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(session.divisions.snapshot().await.status(), Status::Failed);
    assert!(session.divisions.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_view_over_fetched_records() {
    use crate::view::{render, ListQuery, SortSpec};

    let fixture = TestFixture::new().await;
    let session = fixture.session("A1").await;

    for (name, from, upto) in [
        ("First", 60.0, 100.0),
        ("Second", 45.0, 59.0),
        ("Third", 33.0, 44.0),
    ] {
        session
            .divisions
            .create(division(name, from, upto))
            .await
            .unwrap();
    }

    let state = session.divisions.snapshot().await;
    let query = ListQuery::default()
        .search("ir", &["name"])
        .sorted(SortSpec::newest())
        .page(1, 10);
    let page = render(state.records(), &query);

    assert_eq!(page.total_items, 2);
    let names: Vec<&str> = page.items.iter().map(|r| r.fields.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "First"]);
}
