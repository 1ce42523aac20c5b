use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub async fn read_json(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends a request with a bearer token; a `null` body sends nothing.
pub async fn send(app: &Router, method: &str, uri: &str, token: &str, body: Value) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));
    let req = if body.is_null() {
        builder.body(Body::empty()).unwrap()
    } else {
        builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };
    app.clone().oneshot(req).await.unwrap()
}

/// Registers an account and returns its access token.
pub async fn register(app: &Router, email: &str, role: &str) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"email": email, "password": "harbor-lights", "role": role}).to_string(),
        ))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), 201);
    read_json(res).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Registers a host with a business profile and one active experience.
/// Returns the host's token and the experience id.
pub async fn host_with_experience(app: &Router, email: &str) -> (String, String) {
    let host = register(app, email, "host").await;
    let res = send(app, "POST", "/api/business/profile", &host, json!({"business_name": "Reef Runners"})).await;
    assert_eq!(res.status(), 201);
    let res = send(
        app,
        "POST",
        "/api/business/experiences",
        &host,
        json!({
            "title": "Sunset sail",
            "location": "North Pier",
            "activity_type": "sailing",
            "difficulty_level": "beginner",
            "price_per_person": 60.0,
            "duration_hours": 2.5,
            "max_guests": 8
        }),
    )
    .await;
    assert_eq!(res.status(), 201);
    let exp_id = read_json(res).await["id"].as_str().unwrap().to_string();
    (host, exp_id)
}
