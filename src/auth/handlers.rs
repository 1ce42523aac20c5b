use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{check_credentials, hash_password, is_valid_email, normalize_email, verify_password},
        repo::{NewUser, Role, User},
    },
    error::{ApiError, ApiResult},
    state::AppState,
    wire::clean_optional,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id, user.role)?;
    let refresh_token = keys.sign_refresh(user.id, user.role)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);
    state.throttle(&format!("register:{email}")).await?;

    if let Err(reason) = check_credentials(&email, &payload.password) {
        warn!(email = %email, reason, "registration rejected");
        return Err(ApiError::bad_request(reason));
    }
    let role = payload.role.unwrap_or(Role::Customer);
    if role == Role::Admin {
        warn!(email = %email, "admin self-registration refused");
        return Err(ApiError::bad_request("Role must be customer or host"));
    }

    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash,
            full_name: clean_optional(payload.full_name),
            role,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);
    state.throttle(&format!("login:{email}")).await?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    // Role may have changed since the refresh token was issued.
    let user = state
        .store
        .find_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store
        .find_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState, test_support::read_json};

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let app = build_app(AppState::fake());

        let res = app
            .clone()
            .oneshot(post(
                "/api/auth/register",
                json!({"email": " Captain@Reef.io ", "password": "longenough", "role": "host"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let body = read_json(res).await;
        assert_eq!(body["user"]["email"], "captain@reef.io");
        assert_eq!(body["user"]["role"], "host");

        let res = app
            .clone()
            .oneshot(post(
                "/api/auth/login",
                json!({"email": "captain@reef.io", "password": "longenough"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let token = read_json(res).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(read_json(res).await["email"], "captain@reef.io");
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_admins() {
        let app = build_app(AppState::fake());
        let body = json!({"email": "a@b.io", "password": "longenough"});

        let res = app.clone().oneshot(post("/api/auth/register", body.clone())).await.unwrap();
        assert_eq!(res.status(), 201);
        let res = app.clone().oneshot(post("/api/auth/register", body)).await.unwrap();
        assert_eq!(res.status(), 409);
        assert_eq!(read_json(res).await["success"], false);

        let res = app
            .oneshot(post(
                "/api/auth/register",
                json!({"email": "root@b.io", "password": "longenough", "role": "admin"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let app = build_app(AppState::fake());
        app.clone()
            .oneshot(post(
                "/api/auth/register",
                json!({"email": "c@d.io", "password": "longenough"}),
            ))
            .await
            .unwrap();
        let res = app
            .oneshot(post(
                "/api/auth/login",
                json!({"email": "c@d.io", "password": "nope-nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), 401);
    }

    #[tokio::test]
    async fn refresh_issues_a_working_access_token() {
        let app = build_app(AppState::fake());
        let res = app
            .clone()
            .oneshot(post(
                "/api/auth/register",
                json!({"email": "tide@reef.io", "password": "longenough"}),
            ))
            .await
            .unwrap();
        let body = read_json(res).await;
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();
        let access_token = body["access_token"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(post("/api/auth/refresh", json!({"refresh_token": refresh_token})))
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let renewed = read_json(res).await;
        assert_eq!(renewed["user"]["email"], "tide@reef.io");
        let token = renewed["access_token"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        // an access token is not accepted where a refresh token is expected
        let res = app
            .oneshot(post("/api/auth/refresh", json!({"refresh_token": access_token})))
            .await
            .unwrap();
        assert_eq!(res.status(), 401);
    }
}
