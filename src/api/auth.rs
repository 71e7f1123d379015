use axum::{extract::State, http::StatusCode, routing::get, routing::post, Extension, Json, Router};
use bcrypt::{hash, verify, DEFAULT_COST};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::config::Config;
use crate::utils::api_response::ApiResponse;

/// Represents a request to register a new user.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,
    /// User password
    pub password: String,
    /// Role assigned to the user ("admin" or "member")
    pub role: Option<String>,
}

/// JWT claims used for authentication.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject - user ID
    pub sub: String,
    /// The username of the authenticated user
    pub username: String,
    /// The role assigned to the user
    pub role: String,
    /// Expiration timestamp (UNIX time)
    pub exp: usize,
}

/// Represents a request to log in.
#[derive(Serialize, Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response carrying the JWT.
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
}

/// Handles user login.
///
/// Returns a JWT on success, `401` on bad credentials.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid username or password"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn login(
    State(pool): State<PgPool>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiResponse<()>> {
    let config = Config::get();

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, role FROM users WHERE username = $1",
    )
    .bind(&payload.username)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    let Some(user) = user else {
        warn!("Login attempt for non-existent user: {}", payload.username);
        return Err(ApiResponse::error(
            StatusCode::UNAUTHORIZED,
            "Invalid username or password",
            None,
        ));
    };

    match verify(&payload.password, &user.password_hash) {
        Ok(true) => {
            let claims = Claims {
                sub: user.id,
                username: user.username.clone(),
                role: user.role.clone(),
                exp: chrono::Utc::now().timestamp() as usize + 36000, // 10 hour expiration
            };
            let token = encode(
                &Header::default(),
                &claims,
                &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            )
            .map_err(|e| {
                ApiResponse::<()>::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Token generation failed",
                    Some(json!({ "error": e.to_string() })),
                )
            })?;

            info!("Login successful for user: {}", payload.username);
            Ok(Json(LoginResponse {
                token,
                role: user.role,
            }))
        }
        Ok(false) => {
            warn!("Invalid password attempt for user: {}", payload.username);
            Err(ApiResponse::error(
                StatusCode::UNAUTHORIZED,
                "Invalid username or password",
                None,
            ))
        }
        Err(e) => {
            error!("Password verification error: {}", e);
            Err(ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password verification error",
                None,
            ))
        }
    }
}

/// Handles user registration.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<String>, ApiResponse<()>> {
    let password_hash = hash(&payload.password, DEFAULT_COST).map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to hash password",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    let id = Uuid::new_v4().to_string();
    let role = payload.role.unwrap_or_else(|| "member".to_string());
    sqlx::query("INSERT INTO users (id, username, password_hash, role) VALUES ($1, $2, $3, $4)")
        .bind(&id)
        .bind(&payload.username)
        .bind(&password_hash)
        .bind(&role)
        .execute(&pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => ApiResponse::<()>::error(
                StatusCode::CONFLICT,
                "Username already taken",
                None,
            ),
            e => ApiResponse::<()>::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to register user",
                Some(json!({ "error": e.to_string() })),
            ),
        })?;

    info!("Registered new user: {}", payload.username);
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "User registered successfully",
        id,
    ))
}

/// Who am I (requires a valid token)
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(Extension(claims): Extension<Claims>) -> ApiResponse<serde_json::Value> {
    ApiResponse::success(
        StatusCode::OK,
        "Current user",
        json!({
            "userId": claims.sub,
            "username": claims.username,
            "role": claims.role,
        }),
    )
}

/// Public authentication routes
pub fn auth_routes() -> Router<PgPool> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Routes that require a valid token
pub fn secure_auth_routes() -> Router<PgPool> {
    Router::new().route("/auth/me", get(me))
}

#[derive(OpenApi)]
#[openapi(
    paths(login, register, me),
    components(schemas(RegisterRequest, LoginRequest, LoginResponse))
)]
pub struct AuthDoc;
