use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password, MIN_PASSWORD_LEN},
    repo::UserRepository,
    repo_types::{NewUser, User},
};
use crate::error::{AppError, AppResult};

pub const MAX_USERNAME_LEN: usize = 100;

const BAD_CREDENTIALS: &str = "Incorrect email or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_token(keys: &JwtKeys, user_id: Uuid) -> AppResult<String> {
    keys.sign(user_id)
        .map_err(|e| AppError::internal(format!("token signing failed: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn register(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> AppResult<AuthResponse> {
    let (Some(username), Some(email), Some(password)) = (
        non_empty(req.username),
        non_empty(req.email),
        non_empty(req.password),
    ) else {
        return Err(AppError::validation(
            "username, email, and password are required",
        ));
    };

    let username = username.trim().to_string();
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation(
            "Username cannot be more than 100 characters",
        ));
    }

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Please provide a valid email"));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::conflict("Email already in use"));
    }

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?;
    let user = users
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    let token = issue_token(keys, user.id)?;
    info!(user_id = %user.id, "user registered");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn login(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<AuthResponse> {
    let password = req.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (non_empty(req.email), password) else {
        return Err(AppError::validation("Please provide email and password"));
    };
    let email = normalize_email(&email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!("login for unknown email");
        return Err(AppError::auth(BAD_CREDENTIALS));
    };

    let matches = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("stored password hash unreadable: {e}")))?;
    if !matches {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::auth(BAD_CREDENTIALS));
    }

    let token = issue_token(keys, user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn current_user(users: &dyn UserRepository, user_id: Uuid) -> AppResult<User> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}
