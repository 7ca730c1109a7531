//! Route handlers for the HTTP API.

pub mod admin;
pub mod email;
pub mod health;
pub mod menu;
pub mod votes;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use media_host::validation::MAX_FILE_SIZE;

use crate::state::AppState;

/// Multipart overhead allowed on top of the file itself.
const UPLOAD_OVERHEAD: usize = 64 * 1024;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Public
        .route("/api/votes/today", get(votes::today))
        .route("/api/votes", post(votes::submit))
        .route("/api/menu", get(menu::show))
        // Admin
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/history", get(admin::history))
        .route("/api/admin/export.csv", get(admin::export_csv))
        .route("/api/admin/export/today.txt", get(admin::export_today))
        .route("/api/admin/votes/reset", post(admin::reset_today))
        .route("/api/admin/retention/sweep", post(admin::retention_sweep))
        .route(
            "/api/admin/menu",
            post(menu::upload)
                .delete(menu::delete)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + UPLOAD_OVERHEAD)),
        )
        .route("/api/admin/email/config", get(email::status).post(email::setup))
        .route("/api/admin/email/stop", post(email::stop))
        .route("/api/admin/email/send", post(email::send_now))
        .route("/api/admin/email/logs", get(email::logs))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use cafeteria_core::{collections, DateKey, MenuResolver, Repository};
    use chrono::{NaiveDate, NaiveDateTime};
    use media_host::{MediaClient, MediaConfig};
    use mock_store::{MemoryLocalStore, MemoryRemoteStore, RecordingMailer};
    use reporter::{ReportScheduler, Reporter};
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;
    use crate::auth::ADMIN_PASSWORD_HEADER;
    use crate::state::{AppState, Settings};

    const PASSWORD: &str = "s3cret";

    // Wednesday noon.
    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn evening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap()
    }

    struct Harness {
        state: AppState,
        remote: Arc<MemoryRemoteStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness(clock: fn() -> NaiveDateTime) -> Harness {
        let remote = Arc::new(MemoryRemoteStore::new());
        let local = Arc::new(MemoryLocalStore::new());
        let repo = Repository::new(remote.clone(), local);
        let mailer = Arc::new(RecordingMailer::new());

        let reporter = Reporter::new(repo.clone(), mailer.clone()).with_send_delay(Duration::ZERO);
        let mut settings = Settings::new(SecretString::from(PASSWORD.to_string()));
        settings.clock = clock;

        let state = AppState::new(
            repo,
            MenuResolver::new(remote.clone()),
            MediaClient::new(MediaConfig::new("", "")).unwrap(),
            ReportScheduler::new(reporter),
            settings,
        );
        Harness { state, remote, mailer }
    }

    async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router().with_state(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn admin_get(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header(ADMIN_PASSWORD_HEADER, PASSWORD)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value, admin: bool) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if admin {
            builder = builder.header(ADMIN_PASSWORD_HEADER, PASSWORD);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(noon);
        let (status, body) = call(&h.state, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_vote_then_duplicate() {
        let h = harness(noon);

        let (status, body) = call(
            &h.state,
            post_json("/api/votes", json!({"name": "Alice", "choice": "oui"}), false),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["stored"], "remote");
        assert_eq!(body["stats"]["oui_count"], 1);

        let (status, _) = call(
            &h.state,
            post_json("/api/votes", json!({"name": " alice ", "choice": "non"}), false),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = call(&h.state, get("/api/votes/today")).await;
        assert_eq!(body["date"], "2025-03-05");
        assert_eq!(body["stats"]["total"], 1);
        assert_eq!(body["open"], true);
        assert_eq!(body["countdown"]["hours"], 7);
    }

    #[tokio::test]
    async fn test_vote_rejected_after_close_and_bad_choice() {
        let h = harness(evening);
        let (status, body) = call(
            &h.state,
            post_json("/api/votes", json!({"name": "Bob", "choice": "oui"}), false),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("19:00"));

        let h = harness(noon);
        let (status, _) = call(
            &h.state,
            post_json("/api/votes", json!({"name": "Bob", "choice": "peut-être"}), false),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_vote_survives_remote_outage() {
        let h = harness(noon);
        h.remote.set_available(false);

        let (status, body) = call(
            &h.state,
            post_json("/api/votes", json!({"name": "Alice", "choice": "non"}), false),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["stored"], "local");

        let (_, body) = call(&h.state, get("/api/votes/today")).await;
        assert_eq!(body["stats"]["non_count"], 1);
    }

    #[tokio::test]
    async fn test_menu_default_and_bilingual() {
        let h = harness(noon);

        let (status, body) = call(&h.state, get("/api/menu?lang=nl")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "default");
        assert_eq!(body["kind"], "image");
        assert!(!body["url"].as_str().unwrap().is_empty());

        h.remote.seed(
            collections::MENU_FILES,
            "2025-03-05",
            json!({
                "fileURL_fr": "https://res.cloudinary.com/demo/raw/upload/menu_fr.pdf",
                "fileType_fr": "pdf",
                "date": "2025-03-05"
            }),
        );
        let (_, body) = call(&h.state, get("/api/menu?lang=nl")).await;
        assert_eq!(body["source"], "today");
        assert_eq!(body["kind"], "pdf");
        assert_eq!(body["url"], "https://res.cloudinary.com/demo/raw/upload/menu_fr.pdf");
        assert_eq!(body["preview_url"], body["url"]);
        assert!(body["thumbnail_url"].is_string());

        let (status, _) = call(&h.state, get("/api/menu?lang=de")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_menu_verify_reports_unreachable_file() {
        let h = harness(noon);
        h.remote.seed(
            collections::MENU_FILES,
            "2025-03-05",
            json!({"fileURL": "http://127.0.0.1:9/menu.png", "fileType": "image", "date": "2025-03-05"}),
        );

        let (_, body) = call(&h.state, get("/api/menu")).await;
        assert!(body["available"].is_null());

        let (status, body) = call(&h.state, get("/api/menu?verify=true")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "http://127.0.0.1:9/menu.png");
        assert_eq!(body["available"], false);
    }

    #[tokio::test]
    async fn test_admin_requires_password() {
        let h = harness(noon);
        let (status, _) = call(&h.state, get("/api/admin/stats")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::post("/api/admin/login")
            .header(ADMIN_PASSWORD_HEADER, "wrong")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::post("/api/admin/login")
            .header(ADMIN_PASSWORD_HEADER, PASSWORD)
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_stats_and_reset() {
        let h = harness(noon);
        for (name, choice) in [("a", "oui"), ("b", "oui"), ("c", "oui"), ("d", "non")] {
            call(
                &h.state,
                post_json("/api/votes", json!({"name": name, "choice": choice}), false),
            )
            .await;
        }

        let (status, body) = call(&h.state, admin_get("/api/admin/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["today"]["total"], 4);
        assert_eq!(body["today"]["oui_percent"], 75);
        assert_eq!(body["today"]["non_percent"], 25);

        let (status, body) = call(&h.state, post_json("/api/admin/votes/reset", json!({}), true)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reset"], true);

        let (_, body) = call(&h.state, admin_get("/api/admin/stats")).await;
        assert_eq!(body["today"]["total"], 0);
    }

    #[tokio::test]
    async fn test_csv_export() {
        let h = harness(noon);
        call(
            &h.state,
            post_json("/api/votes", json!({"name": "Alice", "choice": "oui"}), false),
        )
        .await;

        let response = router()
            .with_state(h.state.clone())
            .oneshot(admin_get("/api/admin/export.csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Date,Mangent,Ne mangent pas,Total,Pourcentage cantine"));
        assert!(text.contains("2025-03-05"));
    }

    #[tokio::test]
    async fn test_retention_sweep() {
        let h = harness(noon);
        let old: DateKey = "2025-01-01".parse().unwrap();
        h.remote.seed(
            collections::VOTES,
            &old.to_string(),
            json!({"votes": {"oui": [], "non": []}, "date": "2025-01-01"}),
        );

        let (status, body) =
            call(&h.state, post_json("/api/admin/retention/sweep", json!({}), true)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cutoff"], "2025-02-03");
        assert_eq!(body["removed"], 1);
        assert!(h.remote.snapshot(collections::VOTES, "2025-01-01").is_none());
    }

    #[tokio::test]
    async fn test_email_setup_status_and_stop() {
        let h = harness(noon);

        let (status, body) = call(
            &h.state,
            post_json(
                "/api/admin/email/config",
                json!({
                    "recipients": ["chef@cantine.be", "CHEF@cantine.be", ""],
                    "time": "18:00",
                    "days": [5, 1, 3]
                }),
                true,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["duplicates_removed"], true);
        assert_eq!(body["config"]["recipients"], json!(["chef@cantine.be"]));
        assert_eq!(body["config"]["days"], json!([1, 3, 5]));
        assert_eq!(body["next_send"], "2025-03-05T18:00:00");
        assert!(h.state.scheduler.is_armed());

        let (_, body) = call(&h.state, admin_get("/api/admin/email/config")).await;
        assert_eq!(body["armed"], true);
        assert_eq!(body["config"]["enabled"], true);
        assert_eq!(body["day_names"], json!(["Lundi", "Mercredi", "Vendredi"]));

        let (status, body) = call(&h.state, post_json("/api/admin/email/stop", json!({}), true)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["was_armed"], true);
        assert!(!h.state.scheduler.is_armed());

        let (_, body) = call(&h.state, admin_get("/api/admin/email/config")).await;
        assert_eq!(body["config"]["enabled"], false);
        assert!(body["next_send"].is_null());
    }

    #[tokio::test]
    async fn test_email_setup_validation() {
        let h = harness(noon);
        let (status, _) = call(
            &h.state,
            post_json(
                "/api/admin/email/config",
                json!({"recipients": ["chef@cantine.be"], "time": "18:00", "days": []}),
                true,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &h.state,
            post_json(
                "/api/admin/email/config",
                json!({"recipients": ["not-an-email"], "time": "18:00", "days": [1]}),
                true,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!h.state.scheduler.is_armed());
    }

    #[tokio::test]
    async fn test_manual_send_and_logs() {
        let h = harness(noon);

        let (status, _) = call(
            &h.state,
            post_json(
                "/api/admin/email/send",
                json!({"recipients": ["a@x.be", "A@x.be"]}),
                true,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(h.mailer.sent().is_empty());

        let (status, body) = call(
            &h.state,
            post_json(
                "/api/admin/email/send",
                json!({"recipients": ["a@x.be", "b@x.be"]}),
                true,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], 2);
        assert_eq!(body["failed"], 0);

        let (status, body) = call(&h.state, admin_get("/api/admin/email/logs")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["source"], "manual");
        assert_eq!(body[0]["success_count"], 2);
    }

    #[tokio::test]
    async fn test_upload_without_host_config() {
        let h = harness(noon);
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"menu.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::post("/api/admin/menu")
            .header(ADMIN_PASSWORD_HEADER, PASSWORD)
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        let (status, body) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("not configured"));

        let request = Request::post("/api/admin/menu")
            .header(ADMIN_PASSWORD_HEADER, PASSWORD)
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(format!("--{}--\r\n", boundary)))
            .unwrap();
        let (status, _) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_menu() {
        let h = harness(noon);
        h.remote.seed(
            collections::MENU_FILES,
            "2025-03-05",
            json!({"fileURL": "https://x/menu.png", "fileType": "image", "date": "2025-03-05"}),
        );
        let request = Request::delete("/api/admin/menu")
            .header(ADMIN_PASSWORD_HEADER, PASSWORD)
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);
        assert_eq!(h.remote.count(collections::MENU_FILES), 0);
    }
}
