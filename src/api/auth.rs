use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::config::Config;
use crate::crypto::{hash_password, token, verify_password};
use crate::db::models::User;
use crate::db::{NewUser, UserRepository};
use crate::error::AppError;

/// Accepts common notations: +12345678901, (123) 456-7890, 123.456.7890
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$").unwrap()
});

const MIN_PASSWORD_LEN: usize = 6;
const AVATAR_BASE_URL: &str = "https://avatar.iran.liara.run/public";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User attributes safe to return to clients. The password hash stays
/// server-side.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub profile_pic: String,
    pub phone: String,
    pub email: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            profile_pic: user.profile_pic.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
        }
    }
}

/// Trimmed, non-empty field value, or None.
fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn default_avatar(gender: &str, username: &str) -> String {
    let style = if gender == "male" { "boy" } else { "girl" };
    format!("{}/{}?username={}", AVATAR_BASE_URL, style, username)
}

/// Build the Set-Cookie value carrying a fresh session token.
fn session_cookie(user_id: &str, config: &Config) -> Result<String, AppError> {
    let token = token::issue_token(user_id, &config.jwt_secret, config.session_expiry_days)?;
    let max_age = config.session_expiry_days * 24 * 60 * 60;

    Ok(format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        token::SESSION_COOKIE,
        token,
        max_age
    ))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let missing = || {
        AppError::Validation(
            "fullName, username, password, confirmPassword, gender and phone are required"
                .to_string(),
        )
    };

    let full_name = non_empty(req.full_name.as_deref()).ok_or_else(missing)?;
    let username = non_empty(req.username.as_deref()).ok_or_else(missing)?;
    let password = non_empty(req.password.as_deref()).ok_or_else(missing)?;
    let confirm_password = non_empty(req.confirm_password.as_deref()).ok_or_else(missing)?;
    let gender = non_empty(req.gender.as_deref()).ok_or_else(missing)?;
    let phone = non_empty(req.phone.as_deref()).ok_or_else(missing)?;
    // Blank email is treated as not given.
    let email = non_empty(req.email.as_deref());

    if password != confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    if !PHONE_RE.is_match(&phone) {
        return Err(AppError::Validation(
            "Invalid phone number format".to_string(),
        ));
    }

    if gender != "male" && gender != "female" {
        return Err(AppError::Validation(
            "Gender must be male or female".to_string(),
        ));
    }

    if UserRepository::get_by_username(&state.db, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Username already exists".to_string()));
    }

    if UserRepository::get_by_phone(&state.db, &phone)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(
            "Phone number already in use".to_string(),
        ));
    }

    if let Some(email) = &email {
        if UserRepository::get_by_email(&state.db, email).await?.is_some() {
            return Err(AppError::Validation("Email already in use".to_string()));
        }
    }

    let password_hash = hash_password(&password)?;
    let profile_pic = default_avatar(&gender, &username);

    let user = UserRepository::create(
        &state.db,
        NewUser {
            full_name,
            username,
            phone,
            email,
            password_hash,
            gender,
            profile_pic,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "new account created");

    let cookie = session_cookie(&user.id, &state.config)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&user)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Either field works as the login identifier.
    let login_field = non_empty(req.username.as_deref())
        .or_else(|| non_empty(req.email.as_deref()))
        .ok_or_else(|| {
            AppError::Validation("Username/email and password are required".to_string())
        })?;
    let password = non_empty(req.password.as_deref()).ok_or_else(|| {
        AppError::Validation("Username/email and password are required".to_string())
    })?;

    let user = match UserRepository::get_by_username(&state.db, &login_field).await? {
        Some(user) => Some(user),
        None => UserRepository::get_by_email(&state.db, &login_field).await?,
    };

    // Unknown user and wrong password answer identically, so a caller
    // cannot probe which usernames exist.
    let user = user.ok_or_else(|| AppError::Validation("Invalid credentials".to_string()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Validation("Invalid credentials".to_string()));
    }

    tracing::debug!(user_id = %user.id, "login succeeded");

    let cookie = session_cookie(&user.id, &state.config)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&user)),
    ))
}

/// POST /api/auth/logout
pub async fn logout() -> impl IntoResponse {
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        token::SESSION_COOKIE
    );

    (
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}
