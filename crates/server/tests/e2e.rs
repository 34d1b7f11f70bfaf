use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use configs::{AppConfig, AuthConfig, DatabaseConfig};
use server::routes::{self, auth::ServerState};

const SU_EMAIL: &str = "admin@example.com";
const SU_PASSWORD: &str = "changethis";

struct TestApp {
    base: String,
    http: Client,
    state: ServerState,
}

impl TestApp {
    async fn spawn() -> anyhow::Result<Self> {
        let cfg = AppConfig {
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
                max_connections: 1,
                min_connections: 1,
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret: "e2e-secret".into(),
                first_superuser_email: Some(SU_EMAIL.into()),
                first_superuser_password: Some(SU_PASSWORD.into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = server::startup::prepare_state(&cfg).await?;
        let app = routes::build_router(state.clone(), tower_http::cors::CorsLayer::very_permissive());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base: format!("http://{addr}/api/v1"), http: Client::new(), state })
    }

    async fn user_token(&self, email: &str) -> anyhow::Result<String> {
        self.state.auth.create_user(email, "Passw0rd!", None, false).await?;
        self.login(email, "Passw0rd!").await
    }

    async fn login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let res = self
            .http
            .post(format!("{}/login/access-token", self.base))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["access_token"].as_str().unwrap_or_default().to_string())
    }

    async fn call(&self, method: reqwest::Method, path: &str, token: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut req = self.http.request(method, format!("{}{}", self.base, path)).bearer_auth(token);
        if let Some(b) = body {
            req = req.json(&b);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text).unwrap_or(Value::String(text)) };
        Ok((status, value))
    }

    async fn create(&self, token: &str, name: &str) -> anyhow::Result<Value> {
        let (status, body) = self
            .call(reqwest::Method::POST, "/locations/", token, Some(location_body(name)))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "create failed: {status} {body}");
        Ok(body)
    }
}

fn location_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "loading dock",
        "latitude": -6.9175,
        "longitude": 107.6191,
        "datetime": "2024-06-01T08:30:00+00:00"
    })
}

fn id_of(v: &Value) -> String {
    v["id"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn ownership_is_enforced_across_operations() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u1 = app.user_token("u1@example.com").await?;
    let u2 = app.user_token("u2@example.com").await?;
    let su = app.login(SU_EMAIL, SU_PASSWORD).await?;

    let created = app.create(&u1, "Warehouse A").await?;
    let path = format!("/locations/{}", id_of(&created));

    let (status, body) = app.call(reqwest::Method::GET, &path, &u2, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Not enough permissions");

    let (status, _) = app.call(reqwest::Method::PUT, &path, &u2, Some(json!({"name": "stolen"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.call(reqwest::Method::DELETE, &path, &u2, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call(reqwest::Method::GET, &path, &su, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Warehouse A");
    assert_eq!(body["owner_id"], created["owner_id"]);

    let (status, body) = app.call(reqwest::Method::GET, &path, &u1, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Warehouse A");
    Ok(())
}

#[tokio::test]
async fn unknown_id_is_not_found_before_ownership() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u2 = app.user_token("u2@example.com").await?;
    let path = format!("/locations/{}", uuid::Uuid::new_v4());

    let (status, body) = app.call(reqwest::Method::GET, &path, &u2, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Location not found");
    let (status, _) = app.call(reqwest::Method::PUT, &path, &u2, Some(json!({"name": "x"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(reqwest::Method::DELETE, &path, &u2, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_is_scoped_and_count_ignores_paging() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u1 = app.user_token("u1@example.com").await?;
    let u2 = app.user_token("u2@example.com").await?;
    let su = app.login(SU_EMAIL, SU_PASSWORD).await?;

    for i in 0..3 {
        app.create(&u1, &format!("u1-{i}")).await?;
    }
    app.create(&u2, "u2-0").await?;

    let (status, body) = app.call(reqwest::Method::GET, "/locations/", &u1, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let (_, body) = app.call(reqwest::Method::GET, "/locations/", &u2, None).await?;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "u2-0");

    let (_, body) = app.call(reqwest::Method::GET, "/locations/", &su, None).await?;
    assert_eq!(body["count"], 4);

    let (_, body) = app.call(reqwest::Method::GET, "/locations/?skip=1&limit=1", &u1, None).await?;
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = app.call(reqwest::Method::GET, "/locations/?skip=10", &u1, None).await?;
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (status, _) = app.call(reqwest::Method::GET, "/locations/?skip=-1", &u1, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_applies_only_supplied_fields() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u1 = app.user_token("u1@example.com").await?;
    let u2 = app.user_token("u2@example.com").await?;
    let created = app.create(&u1, "Warehouse A").await?;
    let path = format!("/locations/{}", id_of(&created));

    let u2_id = app.state.auth.authenticate(&u2).await?.id;
    let (status, body) = app
        .call(reqwest::Method::PUT, &path, &u1, Some(json!({"latitude": 3.5, "owner_id": u2_id, "id": uuid::Uuid::new_v4()})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latitude"], 3.5);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["owner_id"], created["owner_id"]);
    assert_eq!(body["name"], "Warehouse A");
    assert_eq!(body["description"], "loading dock");
    assert_eq!(body["longitude"], created["longitude"]);

    let (status, body) = app.call(reqwest::Method::PUT, &path, &u1, Some(json!({"description": null}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["description"].is_null());
    assert_eq!(body["latitude"], 3.5);

    let (status, _) = app.call(reqwest::Method::PUT, &path, &u1, Some(json!({"name": null}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app.call(reqwest::Method::PUT, &path, &u1, Some(json!({"longitude": 500.0}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.call(reqwest::Method::GET, &path, &u1, None).await?;
    assert_eq!(body["name"], "Warehouse A");
    assert_eq!(body["latitude"], 3.5);
    Ok(())
}

#[tokio::test]
async fn create_validates_input() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u1 = app.user_token("u1@example.com").await?;

    let mut no_name = location_body("x");
    if let Some(obj) = no_name.as_object_mut() {
        obj.remove("name");
    }
    let (status, body) = app.call(reqwest::Method::POST, "/locations/", &u1, Some(no_name)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("name")));

    let mut bad_lat = location_body("Warehouse A");
    bad_lat["latitude"] = json!(91.0);
    let (status, body) = app.call(reqwest::Method::POST, "/locations/", &u1, Some(bad_lat)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _) = app.call(reqwest::Method::POST, "/locations/", &u1, Some(location_body(""))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.call(reqwest::Method::GET, "/locations/", &u1, None).await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn delete_twice_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u1 = app.user_token("u1@example.com").await?;
    let created = app.create(&u1, "Warehouse A").await?;
    let path = format!("/locations/{}", id_of(&created));

    let (status, body) = app.call(reqwest::Method::DELETE, &path, &u1, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Location deleted successfully");

    let (status, _) = app.call(reqwest::Method::GET, &path, &u1, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(reqwest::Method::DELETE, &path, &u1, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_requests_get_a_detail_body() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let u1 = app.user_token("u1@example.com").await?;

    let (status, body) = app
        .call(reqwest::Method::POST, "/locations/", &u1, Some(json!({"latitude": 1.0})))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("missing field")));

    let (status, body) = app.call(reqwest::Method::GET, "/locations/not-a-uuid", &u1, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = app.call(reqwest::Method::GET, "/locations/?limit=many", &u1, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let res = app
        .http
        .post(format!("{}/locations/", app.base))
        .bearer_auth(&u1)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{bad json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["detail"].is_string());
    Ok(())
}
