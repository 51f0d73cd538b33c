//! Fixtures shared by handler and service tests.

use std::io::Cursor;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use ::image::{DynamicImage, ImageFormat, RgbImage};
use actix_web::http::header;
use rust_decimal::Decimal;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::Database;
use crate::models::{RecipeForm, User};
use crate::services::AuthService;
use crate::utils::auth::create_jwt;
use crate::AppState;

pub const TEST_PASSWORD: &str = "testpass123";
pub const MULTIPART_BOUNDARY: &str = "----recipe-api-test-boundary";

pub async fn test_db() -> Database {
    let db = Database::new("sqlite::memory:").await.unwrap();
    db.run_migrations().await.unwrap();
    db
}

/// [`AppState`] for one test. The media root is a temp directory that is
/// removed when this is dropped.
pub struct TestState {
    state: AppState,
    _media_root: TempDir,
}

impl Deref for TestState {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}

pub async fn test_state() -> TestState {
    let media_root = tempfile::tempdir().unwrap();
    let config = Config {
        secret_key: "test-secret".to_string(),
        media_root: media_root.path().to_path_buf(),
        ..Config::default()
    };

    TestState {
        state: AppState {
            db: test_db().await,
            config: Arc::new(config),
        },
        _media_root: media_root,
    }
}

pub async fn create_user(db: &Database, email: &str) -> User {
    AuthService::new(db)
        .register(email, "Test User", TEST_PASSWORD)
        .await
        .unwrap()
}

pub fn token_for(state: &AppState, user: &User) -> String {
    create_jwt(&user.id, &state.config.secret_key, &state.config.jwt_expires_in)
        .unwrap()
        .0
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Minimal valid create payload.
pub fn recipe_form(title: &str) -> RecipeForm {
    RecipeForm {
        title: Some(title.to_string()),
        time_minutes: Some(22),
        price: Some(Decimal::from_str("5.25").unwrap()),
        ..Default::default()
    }
}

pub fn sample_jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(10, 10))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

/// Single-file `multipart/form-data` body and its content type.
pub fn multipart_file(field: &str, filename: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    (
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        body,
    )
}

/// Builds the `/api` service tree around `$state` the same way `main` does.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(crate::AppState::clone(&$state)))
                .wrap(actix_web::middleware::NormalizePath::trim())
                .service(actix_web::web::scope("/api").configure(crate::routes::create_routes)),
        )
        .await
    };
}

pub(crate) use init_app;
