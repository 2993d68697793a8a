//! Integration tests for the configuration backend.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, ConfigStore};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");

        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
            // long enough that only an explicit invalidation refreshes reads
            cache_ttl: Duration::from_secs(3600),
            store_timeout: Duration::from_secs(10),
            warnings: Vec::new(),
        };

        let app = create_router(AppState::new(ConfigStore::new(pool), config));

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn save_draft(&self, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url("/api/admin/config/draft"))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn publish(&self, body: Option<Value>) -> (u16, Value) {
        let mut request = self.client.post(self.url("/api/admin/config/publish"));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let resp = request.send().await.unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
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
async fn test_admin_requires_psk() {
    let fixture = TestFixture::with_psk(Some("secret-key".to_string())).await;
    let client = Client::new();

    let resp = client
        .get(fixture.url("/api/admin/config/draft-state"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = client
        .get(fixture.url("/api/admin/config/draft-state"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(fixture.url("/api/admin/config/draft-state"))
        .header("authorization", "Bearer secret-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_public_config_needs_no_psk() {
    let fixture = TestFixture::with_psk(Some("secret-key".to_string())).await;

    let resp = Client::new()
        .get(fixture.url("/api/public/config"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_open_admin_without_psk() {
    let fixture = TestFixture::with_psk(None).await;
    let (status, _) = fixture.get("/api/admin/config/draft-state").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_fresh_system_publish_flow() {
    let fixture = TestFixture::new().await;

    // Nothing stored yet: admin read is NotFound, visitors get defaults
    let (status, body) = fixture.get("/api/admin/config").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = fixture.get("/api/public/config").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["source"], "defaults");
    assert_eq!(body["data"]["version"], 0);
    assert_eq!(body["data"]["config"]["theme"]["accentColor"], "#135BEC");
    assert_eq!(body["data"]["config"]["theme"]["defaultMode"], "light");

    let (status, body) = fixture
        .save_draft(json!({
            "theme": {"accentColor": "#FF0000", "defaultMode": "dark", "font": "inter"}
        }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["revision"], 1);
    assert_eq!(body["revisionId"], 1);
    assert_eq!(body["data"]["warnings"], json!([]));

    let (_, body) = fixture.get("/api/admin/config/draft-state").await;
    assert_eq!(body["data"]["hasUnpublishedChanges"], true);
    assert_eq!(body["data"]["publishedVersion"], 0);
    assert_eq!(body["data"]["draftJson"]["theme"]["accentColor"], "#FF0000");

    let (status, body) = fixture.publish(None).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["version"], 1);

    let (_, body) = fixture.get("/api/public/config").await;
    assert_eq!(body["data"]["source"], "published");
    assert_eq!(body["data"]["version"], 1);
    assert_eq!(body["revisionId"], 1);
    assert_eq!(body["data"]["config"]["theme"]["accentColor"], "#FF0000");
    assert_eq!(body["data"]["config"]["theme"]["defaultMode"], "dark");

    let (_, body) = fixture.get("/api/admin/config/draft-state").await;
    assert_eq!(body["data"]["hasUnpublishedChanges"], false);
    assert!(body["data"]["publishedAt"].is_string());
}

#[tokio::test]
async fn test_draft_save_preserves_sibling_documents() {
    let fixture = TestFixture::new().await;

    fixture
        .save_draft(json!({
            "navConfig": {"links": [{"label": "Work", "href": "/work"}]},
            "pages": {"writing": {"pageSize": 20}}
        }))
        .await;
    let (status, _) = fixture
        .save_draft(json!({
            "theme": {"accentColor": "#00AA00"},
            "pages": {"contact": {"email": "me@example.com"}}
        }))
        .await;
    assert_eq!(status, 200);

    let (_, body) = fixture.get("/api/admin/config").await;
    let draft = &body["data"]["draft"];
    assert_eq!(draft["navConfig"]["links"].as_array().unwrap().len(), 1);
    assert_eq!(draft["navConfig"]["links"][0]["label"], "Work");
    assert_eq!(draft["pages"]["writing"]["pageSize"], 20);
    assert_eq!(draft["pages"]["contact"]["contactInfo"]["email"]["value"], "me@example.com");
    assert_eq!(draft["theme"]["accentColor"], "#00AA00");
    assert!(body["data"]["published"].is_null());
}

#[tokio::test]
async fn test_stale_revision_is_a_conflict() {
    let fixture = TestFixture::new().await;

    fixture.save_draft(json!({"seo": {"title": "First"}})).await;
    let (status, _) = fixture
        .save_draft(json!({"seo": {"title": "Second"}, "expectedRevision": 1}))
        .await;
    assert_eq!(status, 200);

    let (status, body) = fixture
        .save_draft(json!({"seo": {"title": "Stale"}, "expectedRevision": 1}))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "WRITE_CONFLICT");
    assert_eq!(body["error"]["details"]["currentRevision"], 2);
    assert_eq!(body["revisionId"], 2);

    let (status, body) = fixture.publish(Some(json!({"expectedRevision": 1}))).await;
    assert_eq!(status, 409);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Reload and reapply"));

    let (status, body) = fixture.publish(Some(json!({"expectedRevision": 2}))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["version"], 1);
}

#[tokio::test]
async fn test_publish_validation_errors_are_listed() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .save_draft(json!({
            "theme": {"accentColor": "red"},
            "seo": {"title": "x".repeat(61)}
        }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["warnings"].as_array().unwrap().len(), 2);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/config/validate"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["valid"], false);

    let (status, body) = fixture.publish(None).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["error"]["details"]["errors"],
        json!([
            "theme.accentColor: must be a #RRGGBB hex colour",
            "seo.title: must be at most 60 characters"
        ])
    );

    // Nothing went live
    let (_, body) = fixture.get("/api/public/config").await;
    assert_eq!(body["data"]["source"], "defaults");
}

#[tokio::test]
async fn test_publish_without_draft() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.publish(None).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "NOTHING_TO_PUBLISH");
}

#[tokio::test]
async fn test_invalid_requests() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.save_draft(json!({"expectedRevision": 0})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/config/publish"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_republish_serves_latest_and_mirrors_contact_flag() {
    let fixture = TestFixture::new().await;

    fixture
        .save_draft(json!({"pages": {"contact": {"email": ""}}}))
        .await;
    fixture.publish(None).await;
    let (_, body) = fixture.get("/api/public/config").await;
    assert_eq!(body["data"]["showContactInNav"], false);

    fixture
        .save_draft(json!({"pages": {"contact": {"email": "hi@example.com"}}}))
        .await;
    // The cached projection still serves version 1 until the next publish
    let (_, body) = fixture.get("/api/public/config").await;
    assert_eq!(body["data"]["version"], 1);

    let (_, body) = fixture.publish(None).await;
    assert_eq!(body["data"]["version"], 2);

    let (_, body) = fixture.get("/api/public/config").await;
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["showContactInNav"], true);
    assert_eq!(
        body["data"]["config"]["pages"]["contact"]["ctas"][0]["href"],
        "mailto:hi@example.com"
    );
}

#[tokio::test]
async fn test_cache_invalidate_endpoint() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/cache/invalidate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["revisionId"], 0);
}
