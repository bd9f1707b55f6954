use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use expodesk_auth::Authenticator;
use expodesk_backend_api::{build_router, AppState, OAuthStateStore};
use expodesk_config::{AppConfig, DatabaseConfig};
use expodesk_mailer::Mailer;
use expodesk_vision::VisionClient;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

struct TestContext {
    _temp_dir: TempDir,
    pool: SqlitePool,
    router: Router,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let config = AppConfig::default();

        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("backend_api.sqlite");
        let database = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 5,
        };

        let pool = expodesk_database::initialize_database(&database).await?;

        let authenticator = Authenticator::new(pool.clone(), config.auth.clone());
        let mailer = Mailer::new(&config.mailer);
        let vision = VisionClient::new(&config.vision);

        let state = AppState::with_oauth_store(
            pool.clone(),
            authenticator,
            mailer,
            vision,
            OAuthStateStore::default(),
        );

        Ok(Self {
            _temp_dir: temp_dir,
            pool,
            router: build_router(state),
        })
    }

    /// Insert a user plus a live session, returning (user id, session token).
    async fn seed_user(&self, email: &str, role: &str) -> TestResult<(i64, String)> {
        let now = chrono::Utc::now();
        let expires = now + chrono::Duration::hours(1);

        let result = sqlx::query(
            "INSERT INTO users (public_id, email, display_name, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(format!("pub_{email}"))
        .bind(email)
        .bind("Seeded User")
        .bind(role)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;
        let user_id = result.last_insert_rowid();

        let token = format!("token_{email}");
        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339())
        .bind(expires.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok((user_id, token))
    }

    async fn seed_organizer(&self, user_id: i64, approved: bool) -> TestResult<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO organizers (user_id, name, company, email, phone, approved, approved_at, created_at)
             VALUES (?, 'Sato Hanako', 'Harborview Expo KK', 'organizer@example.com', '03-1234-5678', ?, ?, ?)",
        )
        .bind(user_id)
        .bind(approved)
        .bind(approved.then(|| now.clone()))
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn seed_exhibitor(&self, user_id: i64, company: &str) -> TestResult<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO exhibitors (user_id, company, contact_name, email, phone, created_at)
             VALUES (?, ?, 'Yamada Taro', 'shop@example.com', '06-9876-5432', ?)",
        )
        .bind(user_id)
        .bind(company)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn seed_event(&self, organizer_id: i64, name: &str, status: &str) -> TestResult<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO events (organizer_id, name, description, status, created_at)
             VALUES (?, ?, 'seeded event', ?, ?)",
        )
        .bind(organizer_id)
        .bind(name)
        .bind(status)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn seed_application(&self, exhibitor_id: i64, event_id: i64) -> TestResult<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO applications (exhibitor_id, event_id, status, applied_at)
             VALUES (?, ?, 'pending', ?)",
        )
        .bind(exhibitor_id)
        .bind(event_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// A fully provisioned organizer with an approved, open event.
    async fn seed_organizer_with_event(&self) -> TestResult<(String, i64, i64)> {
        let (user_id, token) = self.seed_user("organizer@example.com", "member").await?;
        let organizer_id = self.seed_organizer(user_id, true).await?;
        let event_id = self.seed_event(organizer_id, "Spring Expo", "approved").await?;
        Ok((token, organizer_id, event_id))
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResult<(StatusCode, Vec<u8>, axum::http::HeaderMap)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await?.to_bytes().to_vec();
        Ok((status, bytes, headers))
    }

    async fn get(&self, path: &str, token: Option<&str>) -> TestResult<(StatusCode, Value)> {
        let (status, bytes, _) = self.request("GET", path, token, None).await?;
        Ok((status, parse_json(&bytes)))
    }

    async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResult<(StatusCode, Value)> {
        let (status, bytes, _) = self.request("POST", path, token, body).await?;
        Ok((status, parse_json(&bytes)))
    }
}

fn parse_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn health_check_answers_without_auth() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn portal_routes_require_a_session() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, _) = ctx.get("/api/organizer/events", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.get("/api/notifications", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_accepted_as_credential() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.seed_user("cookie@example.com", "member").await?;

    let request = Request::builder()
        .method("GET")
        .uri("/api/notifications/unread-count")
        .header(header::COOKIE, format!("expodesk_session={token}"))
        .body(Body::empty())?;
    let response = ctx.router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn line_login_is_unavailable_without_credentials() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, _) = ctx.get("/api/auth/line?portal=organizer", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn oauth_callback_rejects_unknown_state() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .get("/api/auth/line/callback?code=abc&state=bogus", None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("OAuth state"));
    Ok(())
}

#[tokio::test]
async fn me_reports_portal_registration_flags() -> TestResult {
    let ctx = TestContext::new().await?;
    let (user_id, token) = ctx.seed_user("flags@example.com", "member").await?;

    let (status, body) = ctx.get("/api/auth/me", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["organizer_registered"], false);
    assert_eq!(body["exhibitor_registered"], false);

    ctx.seed_organizer(user_id, false).await?;
    let (_, body) = ctx.get("/api/auth/me", Some(&token)).await?;
    assert_eq!(body["organizer_registered"], true);
    Ok(())
}

#[tokio::test]
async fn organizer_registration_flows_through_admin_approval() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, admin_token) = ctx.seed_user("admin@example.com", "admin").await?;
    let (_, organizer_token) = ctx.seed_user("newcomer@example.com", "member").await?;

    let (status, profile) = ctx
        .post(
            "/api/organizer/profile",
            Some(&organizer_token),
            Some(json!({
                "name": "Sato Hanako",
                "company": "Harborview Expo KK",
                "email": "hanako@harborview.example",
                "phone": "03-1234-5678"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["approved"], false);

    // Not approved yet: organizer routes are forbidden.
    let (status, _) = ctx.get("/api/organizer/events", Some(&organizer_token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The admin sees the pending profile and approves it.
    let (status, pending) = ctx.get("/api/admin/organizers", Some(&admin_token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["organizers"].as_array().unwrap().len(), 1);

    let organizer_id = profile["id"].as_i64().unwrap();
    let (status, body) = ctx
        .post(
            &format!("/api/admin/organizers/{organizer_id}/approve"),
            Some(&admin_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = ctx.get("/api/organizer/events", Some(&organizer_token)).await?;
    assert_eq!(status, StatusCode::OK);

    // Approval produced a notification for the organizer account.
    let (_, unread) = ctx
        .get("/api/notifications/unread-count", Some(&organizer_token))
        .await?;
    assert!(unread["unread_count"].as_i64().unwrap() >= 1);
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_regular_members() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.seed_user("member@example.com", "member").await?;

    let (status, _) = ctx.get("/api/admin/organizers", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post(
            "/api/email/send",
            Some(&token),
            Some(json!({"to": "a@b.c", "subject": "s", "html": "<p>x</p>"})),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn event_review_moves_event_into_store_listing() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, admin_token) = ctx.seed_user("admin@example.com", "admin").await?;
    let (organizer_user, organizer_token) =
        ctx.seed_user("organizer@example.com", "member").await?;
    ctx.seed_organizer(organizer_user, true).await?;
    let (store_user, store_token) = ctx.seed_user("shop@example.com", "member").await?;
    ctx.seed_exhibitor(store_user, "Yamada Foods").await?;

    let (status, event) = ctx
        .post(
            "/api/organizer/events",
            Some(&organizer_token),
            Some(json!({"name": "Autumn Fair", "description": "food and crafts"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "pending");

    // Pending events are not visible to exhibitors.
    let (_, listing) = ctx.get("/api/store/events", Some(&store_token)).await?;
    assert_eq!(listing["events"].as_array().unwrap().len(), 0);

    let event_id = event["id"].as_i64().unwrap();
    let (status, _) = ctx
        .post(
            &format!("/api/admin/events/{event_id}/approve"),
            Some(&admin_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = ctx.get("/api/store/events", Some(&store_token)).await?;
    assert_eq!(listing["events"].as_array().unwrap().len(), 1);

    // A second review attempt is rejected.
    let (status, _) = ctx
        .post(
            &format!("/api/admin/events/{event_id}/reject"),
            Some(&admin_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn application_submission_and_review() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, _, event_id) = ctx.seed_organizer_with_event().await?;
    let (store_user, store_token) = ctx.seed_user("shop@example.com", "member").await?;
    ctx.seed_exhibitor(store_user, "Yamada Foods").await?;

    let (status, application) = ctx
        .post(
            "/api/store/applications",
            Some(&store_token),
            Some(json!({"eventId": event_id})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(application["status"], "pending");

    // Duplicate application is a validation error.
    let (status, body) = ctx
        .post(
            "/api/store/applications",
            Some(&store_token),
            Some(json!({"eventId": event_id})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already applied"));

    let application_id = application["id"].as_i64().unwrap();
    let (status, review) = ctx
        .post(
            &format!("/api/organizer/applications/{application_id}/approve"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["status"], "approved");

    // The exhibitor sees the reviewed application and got notified.
    let (_, mine) = ctx.get("/api/store/applications", Some(&store_token)).await?;
    assert_eq!(mine["applications"][0]["status"], "approved");
    assert_eq!(mine["applications"][0]["event_name"], "Spring Expo");

    let (_, unread) = ctx
        .get("/api/notifications/unread-count", Some(&store_token))
        .await?;
    assert_eq!(unread["unread_count"].as_i64().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn closing_applications_is_single_shot_and_owner_only() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, _, event_id) = ctx.seed_organizer_with_event().await?;

    for (index, company) in ["Yamada Foods", "Suzuki Crafts", "Tanaka Tools"]
        .iter()
        .enumerate()
    {
        let (user_id, _) = ctx
            .seed_user(&format!("shop{index}@example.com"), "member")
            .await?;
        let exhibitor_id = ctx.seed_exhibitor(user_id, company).await?;
        ctx.seed_application(exhibitor_id, event_id).await?;
    }

    // A different organizer cannot close this event.
    let (other_user, other_token) = ctx.seed_user("rival@example.com", "member").await?;
    ctx.seed_organizer(other_user, true).await?;
    let (status, _) = ctx
        .post(
            &format!("/api/organizer/events/{event_id}/close-applications"),
            Some(&other_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The rejected close must not have stamped anything.
    let closed_at: Option<String> =
        sqlx::query_scalar("SELECT application_closed_at FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_one(&ctx.pool)
            .await?;
    assert!(closed_at.is_none());

    let (status, body) = ctx
        .post(
            &format!("/api/organizer/events/{event_id}/close-applications"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["applications"].as_array().unwrap().len(), 3);
    assert!(body["closedAt"].as_str().is_some());

    // Second close: already closed, no further write.
    let (status, body) = ctx
        .post(
            &format!("/api/organizer/events/{event_id}/close-applications"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already closed"));
    Ok(())
}

#[tokio::test]
async fn csv_export_is_bom_prefixed_and_localized() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, _, event_id) = ctx.seed_organizer_with_event().await?;

    for (index, company) in ["Yamada Foods", "Suzuki Crafts", "Tanaka Tools"]
        .iter()
        .enumerate()
    {
        let (user_id, _) = ctx
            .seed_user(&format!("shop{index}@example.com"), "member")
            .await?;
        let exhibitor_id = ctx.seed_exhibitor(user_id, company).await?;
        ctx.seed_application(exhibitor_id, event_id).await?;
    }

    let (status, bytes, headers) = ctx
        .request(
            "POST",
            &format!("/api/organizer/events/{event_id}/export-csv"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()?
        .starts_with("text/csv"));

    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");

    let text = String::from_utf8(bytes[3..].to_vec())?;
    assert!(text.starts_with("\"申込ID\""));
    assert_eq!(text.lines().count(), 4);
    assert_eq!(text.matches("\"審査中\"").count(), 3);
    Ok(())
}

#[tokio::test]
async fn close_and_export_succeeds_with_advisory_email() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, _, event_id) = ctx.seed_organizer_with_event().await?;

    let (user_id, _) = ctx.seed_user("shop@example.com", "member").await?;
    let exhibitor_id = ctx.seed_exhibitor(user_id, "Yamada Foods").await?;
    ctx.seed_application(exhibitor_id, event_id).await?;

    let (status, body) = ctx
        .post(
            &format!("/api/organizer/events/{event_id}/close-and-export"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["applicationCount"], 1);
    // The mailer is unconfigured: dispatch degrades to a log line and the
    // email step still counts as successful.
    assert_eq!(body["emailSent"], true);
    assert!(body["closedAt"].as_str().is_some());

    // The event is now closed, so a repeat is rejected.
    let (status, _) = ctx
        .post(
            &format!("/api/organizer/events/{event_id}/close-and-export"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn sheets_export_is_a_stub() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, _, event_id) = ctx.seed_organizer_with_event().await?;

    let (status, body) = ctx
        .post(
            &format!("/api/organizer/events/{event_id}/export-sheets"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("not available"));
    Ok(())
}

#[tokio::test]
async fn email_dispatch_without_provider_reports_success() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, admin_token) = ctx.seed_user("admin@example.com", "admin").await?;

    let (status, body) = ctx
        .post(
            "/api/email/send",
            Some(&admin_token),
            Some(json!({
                "to": "organizer@example.com",
                "subject": "お知らせ",
                "html": "<p>hello</p>"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("emailId").is_none());
    Ok(())
}

#[tokio::test]
async fn email_dispatch_validates_the_recipient() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, admin_token) = ctx.seed_user("admin@example.com", "admin").await?;

    let (status, _) = ctx
        .post(
            "/api/email/send",
            Some(&admin_token),
            Some(json!({"to": "not-an-address", "subject": "s", "html": ""})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn document_verification_requires_model_credentials() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx.seed_user("shop@example.com", "member").await?;

    let (status, body) = ctx
        .post(
            "/api/store/documents/verify",
            Some(&token),
            Some(json!({"image": "https://files.example/doc.png", "documentType": "registry"})),
        )
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not configured"));

    let (status, _) = ctx
        .post(
            "/api/store/documents/verify",
            Some(&token),
            Some(json!({"image": "", "documentType": "registry"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn document_urls_are_validated_and_stored() -> TestResult {
    let ctx = TestContext::new().await?;
    let (user_id, token) = ctx.seed_user("shop@example.com", "member").await?;
    ctx.seed_exhibitor(user_id, "Yamada Foods").await?;

    let (status, _) = ctx
        .post(
            "/api/store/documents",
            Some(&token),
            Some(json!({"kind": "registry", "url": "ftp://nope"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .post(
            "/api/store/documents",
            Some(&token),
            Some(json!({"kind": "registry", "url": "https://files.example/registry.pdf"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, profile) = ctx.get("/api/store/profile", Some(&token)).await?;
    assert_eq!(
        profile["registry_document_url"],
        "https://files.example/registry.pdf"
    );
    Ok(())
}

#[tokio::test]
async fn notifications_can_be_listed_and_marked_read() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, _, event_id) = ctx.seed_organizer_with_event().await?;
    let (store_user, store_token) = ctx.seed_user("shop@example.com", "member").await?;
    ctx.seed_exhibitor(store_user, "Yamada Foods").await?;

    // A submission notifies the organizer.
    let (status, _) = ctx
        .post(
            "/api/store/applications",
            Some(&store_token),
            Some(json!({"eventId": event_id})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = ctx
        .get("/api/notifications?unread_only=true", Some(&organizer_token))
        .await?;
    let notifications = listed["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "application_submitted");
    assert_eq!(notifications[0]["user_type"], "organizer");

    let notification_id = notifications[0]["id"].as_i64().unwrap();

    // Another user cannot mark it read.
    let (status, _) = ctx
        .post(
            &format!("/api/notifications/{notification_id}/read"),
            Some(&store_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .post(
            &format!("/api/notifications/{notification_id}/read"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, unread) = ctx
        .get("/api/notifications/unread-count", Some(&organizer_token))
        .await?;
    assert_eq!(unread["unread_count"].as_i64().unwrap(), 0);
    Ok(())
}

#[tokio::test]
async fn applications_to_closed_or_unapproved_events_are_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let (organizer_token, organizer_id, open_event) = ctx.seed_organizer_with_event().await?;
    let pending_event = ctx.seed_event(organizer_id, "Pending Fair", "pending").await?;

    let (store_user, store_token) = ctx.seed_user("shop@example.com", "member").await?;
    ctx.seed_exhibitor(store_user, "Yamada Foods").await?;

    let (status, _) = ctx
        .post(
            "/api/store/applications",
            Some(&store_token),
            Some(json!({"eventId": pending_event})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Close the open event, then try to apply.
    let (status, _) = ctx
        .post(
            &format!("/api/organizer/events/{open_event}/close-applications"),
            Some(&organizer_token),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .post(
            "/api/store/applications",
            Some(&store_token),
            Some(json!({"eventId": open_event})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("closed"));

    let (status, _) = ctx
        .post(
            "/api/store/applications",
            Some(&store_token),
            Some(json!({"eventId": 9999})),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
