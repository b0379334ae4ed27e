use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use kortex::config::Config;
use tower::ServiceExt;

/// Bootstrap admin credentials (must match `AuthConfig::default`)
const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

async fn spawn_app() -> Router {
    let db_path = std::env::temp_dir().join(format!("kortex-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = kortex::api::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");

    kortex::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).expect("response body is not JSON")
}

async fn register(app: &Router, username: &str, password: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": username, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    response.status()
}

async fn login(
    app: &Router,
    username: &str,
    password: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "username={username}&password={password}"
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_json(response).await)
}

/// Log in and return the bearer token, panicking on failure
async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn get_with_token(app: &Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_json(response).await)
}

async fn post_with_token(
    app: &Router,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"));

    let request = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_bootstrap_admin_can_login() {
    let app = spawn_app().await;

    let (status, body) = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["is_admin"], true);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;

    assert_eq!(register(&app, "bob", "pw1").await, StatusCode::OK);
    assert_eq!(register(&app, "bob", "pw2").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_credentials_are_undifferentiated() {
    let app = spawn_app().await;

    let (unknown_status, unknown_body) = login(&app, "nobody", "whatever").await;
    let (wrong_status, wrong_body) = login(&app, ADMIN_USER, "wrong-password").await;

    // Unknown user and wrong password must be indistinguishable
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_body["error"], wrong_body["error"]);
}

#[tokio::test]
async fn test_register_approve_marker_flow() {
    let app = spawn_app().await;

    assert_eq!(register(&app, "bob", "pw1").await, StatusCode::OK);

    // Approval gate: correct credentials, but account still pending
    let (status, _) = login(&app, "bob", "pw1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = login_token(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let (status, pending) = get_with_token(&app, "/admin/pending", &admin_token).await;
    assert_eq!(status, StatusCode::OK);
    let bob = pending
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "bob")
        .expect("bob should be pending");
    let bob_id = bob["id"].as_i64().unwrap();

    let (status, body) = post_with_token(
        &app,
        &format!("/admin/approve/{bob_id}"),
        &admin_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User bob approved");

    let (status, body) = login(&app, "bob", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], false);
    let bob_token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = post_with_token(
        &app,
        "/markers",
        &bob_token,
        Some(serde_json::json!({
            "lat": 1.0,
            "lon": 2.0,
            "type": "enemy",
            "label": "Tank"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Marker added");

    let (status, markers) = get_with_token(&app, "/markers", &bob_token).await;
    assert_eq!(status, StatusCode::OK);

    let markers = markers.as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["lat"], 1.0);
    assert_eq!(markers[0]["lon"], 2.0);
    assert_eq!(markers[0]["type"], "enemy");
    assert_eq!(markers[0]["label"], "Tank");
    assert_eq!(markers[0]["description"], serde_json::Value::Null);
    assert_eq!(markers[0]["created_by"], "bob");
    assert!(markers[0]["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_markers_require_token() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/markers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = get_with_token(&app, "/markers", "not-a-real-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_non_admins() {
    let app = spawn_app().await;

    register(&app, "carol", "pw").await;
    let admin_token = login_token(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let (_, pending) = get_with_token(&app, "/admin/pending", &admin_token).await;
    let carol_id = pending
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "carol")
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    post_with_token(
        &app,
        &format!("/admin/approve/{carol_id}"),
        &admin_token,
        None,
    )
    .await;

    // Carol holds a perfectly valid token, just no admin flag
    let carol_token = login_token(&app, "carol", "pw").await;

    let (status, _) = get_with_token(&app, "/admin/pending", &carol_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        post_with_token(&app, "/admin/approve/1", &carol_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_approving_unknown_user_is_not_found() {
    let app = spawn_app().await;

    let admin_token = login_token(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let (status, body) =
        post_with_token(&app, "/admin/approve/9999", &admin_token, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_marker_description_is_stored() {
    let app = spawn_app().await;

    let admin_token = login_token(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let (status, _) = post_with_token(
        &app,
        "/markers",
        &admin_token,
        Some(serde_json::json!({
            "lat": 50.4501,
            "lon": 30.5234,
            "type": "unit",
            "label": "HQ",
            "description": "Forward command post"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, markers) = get_with_token(&app, "/markers", &admin_token).await;
    let markers = markers.as_array().unwrap();

    assert_eq!(markers[0]["description"], "Forward command post");
    assert_eq!(markers[0]["created_by"], "admin");
}

#[tokio::test]
async fn test_markers_are_shared_across_users() {
    let app = spawn_app().await;

    let admin_token = login_token(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    register(&app, "dave", "pw").await;
    let (_, pending) = get_with_token(&app, "/admin/pending", &admin_token).await;
    let dave_id = pending
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "dave")
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    post_with_token(&app, &format!("/admin/approve/{dave_id}"), &admin_token, None).await;
    let dave_token = login_token(&app, "dave", "pw").await;

    post_with_token(
        &app,
        "/markers",
        &admin_token,
        Some(serde_json::json!({
            "lat": 0.0, "lon": 0.0, "type": "ally", "label": "Alpha"
        })),
    )
    .await;
    post_with_token(
        &app,
        "/markers",
        &dave_token,
        Some(serde_json::json!({
            "lat": 1.0, "lon": 1.0, "type": "target", "label": "Bravo"
        })),
    )
    .await;

    // Everyone sees the shared map, insertion order preserved
    let (_, markers) = get_with_token(&app, "/markers", &dave_token).await;
    let markers = markers.as_array().unwrap();

    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0]["label"], "Alpha");
    assert_eq!(markers[0]["created_by"], "admin");
    assert_eq!(markers[1]["label"], "Bravo");
    assert_eq!(markers[1]["created_by"], "dave");
}
