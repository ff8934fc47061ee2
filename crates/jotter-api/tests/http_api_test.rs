//! End-to-end HTTP tests.
//!
//! Each test boots the full router (middleware included) on an ephemeral
//! port, backed by the in-memory store, and drives it with reqwest.

use std::collections::HashMap;

use reqwest::{header, Method, StatusCode};
use serde_json::{json, Value};

use jotter_api::{build_router, ApiConfig, AppState, Stores};
use jotter_db::MemoryStore;

const PASSWORD: &str = "Str0ng!pass";

fn test_config(extra: &[(&str, &str)]) -> ApiConfig {
    let mut vars: HashMap<String, String> = [
        ("SESSION_SECRET", "test-secret-test-secret-test-secret!"),
        ("PASSWORD_HASH_MEMORY_KIB", "1024"),
        ("PASSWORD_HASH_ITERATIONS", "1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    ApiConfig::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

/// Start a server and return its base URL.
async fn spawn_app(extra: &[(&str, &str)]) -> String {
    let config = test_config(extra);
    let state = AppState::new(Stores::memory(MemoryStore::new()), &config).expect("state");
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    format!("http://{}", addr)
}

/// Minimal browser stand-in: remembers the session cookie between calls.
struct Client {
    base: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl Client {
    fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(token) = &self.token {
            req = req.header(header::COOKIE, format!("authToken={}", token));
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.expect("request");
        let status = resp.status();

        if let Some(cookie) = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let value = cookie
                .split(';')
                .next()
                .and_then(|pair| pair.strip_prefix("authToken="))
                .unwrap_or_default();
            self.token = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }

        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&mut self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    async fn post(&mut self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn patch(&mut self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(body)).await
    }

    async fn put(&mut self, path: &str) -> (StatusCode, Value) {
        self.send(Method::PUT, path, None).await
    }

    async fn delete(&mut self, path: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, None).await
    }

    async fn register(&mut self, username: &str) -> (StatusCode, Value) {
        self.post(
            "/auth/register",
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "username": username,
                "emailAddress": format!("{}@example.com", username),
                "password": PASSWORD,
                "avatar": "https://example.com/a.png",
            }),
        )
        .await
    }

    async fn login(&mut self, identifier: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/auth/login",
            json!({ "identifier": identifier, "password": password }),
        )
        .await
    }

    /// Register and log in; returns the user's id.
    async fn sign_up(&mut self, username: &str) -> String {
        let (status, _) = self.register(username).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(username, PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["user"]["id"].as_str().expect("user id").to_string()
    }

    async fn create_note(&mut self, title: &str, content: &str) -> String {
        let (status, body) = self
            .post("/notes", json!({ "entryTitle": title, "content": content }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Note created successfully");
        body["note"]["id"].as_str().expect("note id").to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let base = spawn_app(&[]).await;
    let (status, body) = Client::new(&base).get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_sets_cookie() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);

    let (status, body) = client.register("ada").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Account created successfully");

    let resp = reqwest::Client::new()
        .post(format!("{}/auth/login", base))
        .json(&json!({ "username": "ada", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("authToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=1814400"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], "ada");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_body_with_username_and_email() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.register("ada").await;

    let (status, body) = client
        .post(
            "/auth/login",
            json!({
                "username": "ada",
                "emailAddress": "ada@example.com",
                "password": PASSWORD,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ada");
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.register("ada").await;

    let (status, body) = client
        .post(
            "/auth/register",
            json!({
                "firstName": "Eve",
                "lastName": "Other",
                "username": "eve",
                "emailAddress": "ada@example.com",
                "password": PASSWORD,
                "avatar": "x.png",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "The Email Address you provided is already associated with an account"
    );

    // The would-be account cannot log in.
    let (status, _) = client.login("eve", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_registration_field() {
    let base = spawn_app(&[]).await;
    let (status, body) = Client::new(&base)
        .post("/auth/register", json!({ "firstName": "Ada" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Last name is required");
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.register("ada").await;

    let wrong = client.login("ada", "Wr0ng!pass").await;
    let unknown = client.login("nobody", PASSWORD).await;
    assert_eq!(wrong, unknown);
    assert_eq!(wrong.0, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.1["message"], "Wrong Login Credentials");
}

#[tokio::test]
async fn test_notes_require_authentication() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    let (status, _) = client.get("/notes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    client.token = Some("not.a.token".to_string());
    let (status, _) = client.get("/notes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;
    let token = client.token.clone().unwrap();

    let resp = reqwest::Client::new()
        .get(format!("{}/notes", base))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_list_pin_flow() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    let user_id = client.sign_up("ada").await;

    let note_id = client.create_note("A", "B").await;

    let (status, list) = client.get("/notes").await;
    assert_eq!(status, StatusCode::OK);
    let notes = list.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], note_id.as_str());
    assert_eq!(notes[0]["userId"], user_id.as_str());
    assert_eq!(notes[0]["authorFirstName"], "Ada");
    assert_eq!(notes[0]["pinned"], false);
    assert_eq!(notes[0]["bookmarked"], false);

    let (status, body) = client.put(&format!("/notes/{}/pin", note_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Note pinned successfully", "pinned": true })
    );
    let (_, list) = client.get("/notes").await;
    assert_eq!(list[0]["pinned"], true);

    let (_, body) = client.put(&format!("/notes/{}/pin", note_id)).await;
    assert_eq!(
        body,
        json!({ "message": "Note unpinned successfully", "pinned": false })
    );
    let (_, list) = client.get("/notes").await;
    assert_eq!(list[0]["pinned"], false);
}

#[tokio::test]
async fn test_bookmark_listing() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;
    let note_id = client.create_note("A", "B").await;

    let (_, body) = client.put(&format!("/notes/{}/bookmark", note_id)).await;
    assert_eq!(
        body,
        json!({ "message": "Note bookmarked successfully", "bookmarked": true })
    );
    let (status, list) = client.get("/notes/bookmarks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["bookmarked"], true);

    let (_, pinned) = client.get("/notes/pinned").await;
    assert!(pinned.as_array().unwrap().is_empty());

    let (_, body) = client.put(&format!("/notes/{}/bookmark", note_id)).await;
    assert_eq!(body["message"], "Bookmark removed successfully");
    assert_eq!(body["bookmarked"], false);
}

#[tokio::test]
async fn test_trash_recover_purge_lifecycle() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;
    let note_id = client.create_note("A", "B").await;
    let (_, original) = client.get(&format!("/notes/{}", note_id)).await;

    // Purging an active note is refused.
    let (status, body) = client.delete(&format!("/notes/permanent/{}", note_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Note not found in trash");

    let (status, body) = client.put(&format!("/notes/{}/trash", note_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note moved to trash");

    let (status, _) = client.get(&format!("/notes/{}", note_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = client.get("/notes").await;
    assert!(list.as_array().unwrap().is_empty());
    let (_, trash) = client.get("/notes/trash").await;
    assert_eq!(trash[0]["id"], note_id.as_str());

    let (status, _) = client.put(&format!("/notes/{}/pin", note_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client
        .patch(&format!("/notes/recover/{}", note_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note recovered successfully");
    let (_, recovered) = client.get(&format!("/notes/{}", note_id)).await;
    assert_eq!(recovered, original);

    client.put(&format!("/notes/{}/trash", note_id)).await;
    let (status, body) = client.delete(&format!("/notes/permanent/{}", note_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note permanently deleted");
    let (status, _) = client.get(&format!("/notes/{}", note_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_notes_report_not_found() {
    let base = spawn_app(&[]).await;
    let mut owner = Client::new(&base);
    owner.sign_up("owner").await;
    let note_id = owner.create_note("mine", "body").await;

    let mut other = Client::new(&base);
    other.sign_up("other").await;

    let (status, body) = other
        .patch(&format!("/notes/{}", note_id), json!({ "entryTitle": "stolen" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Note not found");

    let (status, _) = other.put(&format!("/notes/{}/trash", note_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Reading an active note is allowed for any signed-in user.
    let (status, body) = other.get(&format!("/notes/{}", note_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entryTitle"], "mine");
}

#[tokio::test]
async fn test_pin_scope_owner() {
    let base = spawn_app(&[("PIN_SCOPE", "owner")]).await;
    let mut owner = Client::new(&base);
    owner.sign_up("owner").await;
    let note_id = owner.create_note("mine", "body").await;

    let mut other = Client::new(&base);
    other.sign_up("other").await;
    let (status, _) = other.put(&format!("/notes/{}/pin", note_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = other.put(&format!("/notes/{}/bookmark", note_id)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_note_id() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;

    let (status, body) = client.get("/notes/12345").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid note ID");
}

#[tokio::test]
async fn test_update_note() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;
    let note_id = client.create_note("A", "B").await;

    let (status, body) = client
        .patch(
            &format!("/notes/{}", note_id),
            json!({ "content": "", "synopsis": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note updated successfully");
    assert_eq!(body["note"]["entryTitle"], "A");
    assert_eq!(body["note"]["content"], "");
    assert_eq!(body["note"]["synopsis"], "short");
}

#[tokio::test]
async fn test_update_note_null_keeps_stored_values() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;
    let (status, body) = client
        .post(
            "/notes",
            json!({ "entryTitle": "A", "synopsis": "S", "content": "B" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = body["note"]["id"].as_str().unwrap().to_string();

    let (status, body) = client
        .patch(
            &format!("/notes/{}", note_id),
            json!({ "entryTitle": null, "synopsis": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["entryTitle"], "A");
    assert_eq!(body["note"]["synopsis"], "S");
    assert_eq!(body["note"]["content"], "B");
}

#[tokio::test]
async fn test_change_password_and_logout() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;

    let (status, body) = client
        .patch(
            "/auth/password",
            json!({ "previousPassword": "Wr0ng!pass", "newPassword": "N3w!password" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Previous password is incorrect");

    let (status, _) = client
        .patch(
            "/auth/password",
            json!({ "previousPassword": PASSWORD, "newPassword": "N3w!password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = client.post("/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    assert!(client.token.is_none());

    let (status, _) = client.login("ada", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = client.login("ada@example.com", "N3w!password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_endpoints() {
    let base = spawn_app(&[]).await;
    let mut client = Client::new(&base);
    client.sign_up("ada").await;

    let (status, profile) = client.get("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "ada");
    assert!(profile.get("passwordHash").is_none());

    let (status, body) = client
        .patch("/users", json!({ "firstName": "Augusta" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["profile"]["firstName"], "Augusta");
    assert_eq!(body["profile"]["username"], "ada");

    let token = client.token.clone();
    let (status, body) = client.delete("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account deleted successfully");
    assert!(client.token.is_none());

    // The old token still verifies but the account is gone.
    client.token = token;
    let (status, body) = client.get("/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Profile not found");
    let (status, _) = client.login("ada", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let base = spawn_app(&[]).await;
    let resp = reqwest::Client::new()
        .post(format!("{}/auth/login", base))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let base = spawn_app(&[]).await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    let id = resp.headers().get("x-request-id").expect("request id");
    assert!(!id.to_str().unwrap().is_empty());
}
