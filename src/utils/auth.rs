use crate::error::{AppError, AppResult};
use crate::models::Claims;
use actix_web::{http::header, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

/// Issues a signed token for `user_id`, returning it with its expiry (unix seconds).
pub fn create_jwt(user_id: &str, secret: &str, expires_in: &str) -> AppResult<(String, i64)> {
    let expiration = parse_duration(expires_in)?;
    let now = Utc::now();
    let exp = now
        .checked_add_signed(expiration)
        .ok_or_else(|| AppError::InternalServerError("Invalid expiration time".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, exp))
}

pub fn verify_jwt(token: &str, secret: &str) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn parse_duration(duration_str: &str) -> AppResult<Duration> {
    let duration_str = duration_str.trim();

    let (value, unit): (&str, fn(i64) -> Duration) =
        if let Some(hours) = duration_str.strip_suffix('h') {
            (hours, Duration::hours)
        } else if let Some(days) = duration_str.strip_suffix('d') {
            (days, Duration::days)
        } else if let Some(minutes) = duration_str.strip_suffix('m') {
            (minutes, Duration::minutes)
        } else {
            // Bare numbers are hours
            (duration_str, Duration::hours)
        };

    let value: i64 = value
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid duration format".to_string()))?;

    Ok(unit(value))
}

/// Token from `Authorization: Bearer ...`, falling back to the `token` cookie.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| req.cookie("token").map(|c| c.value().to_string()))
}
