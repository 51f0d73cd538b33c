use actix_web::{
    cookie::{Cookie, SameSite},
    http::header,
    web, HttpResponse,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthMiddleware, AuthUser},
    models::{CreateUserForm, TokenRequest, TokenResponse, UpdateUserForm, UserResponse},
    services::{AuthService, UserService},
    utils::auth::create_jwt,
    AppState,
};

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/create").route(web::post().to(create_user)))
        .service(web::resource("/token").route(web::post().to(create_token)))
        .service(
            web::resource("/me")
                .wrap(AuthMiddleware)
                .route(web::get().to(get_me))
                .route(web::put().to(update_me))
                .route(web::patch().to(update_me)),
        );
}

/// POST /create - Register a new account
async fn create_user(
    state: web::Data<AppState>,
    form: web::Json<CreateUserForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let email = form.email.trim().to_lowercase();
    let user = AuthService::new(&state.db)
        .register(&email, form.name.trim(), &form.password)
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// POST /token - Exchange credentials for a bearer token
async fn create_token(
    state: web::Data<AppState>,
    form: web::Json<TokenRequest>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let email = form.email.trim().to_lowercase();
    let user_id = AuthService::new(&state.db)
        .authenticate(&email, &form.password)
        .await?;

    let (token, expires_at) =
        create_jwt(&user_id, &state.config.secret_key, &state.config.jwt_expires_in)?;

    let mut cookie = Cookie::new("token", token.clone());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_expires(time::OffsetDateTime::from_unix_timestamp(expires_at).ok());

    Ok(HttpResponse::Ok()
        .append_header((header::SET_COOKIE, cookie.to_string()))
        .json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_at,
        }))
}

/// GET /me
async fn get_me(auth_user: AuthUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(auth_user.user)))
}

/// PUT/PATCH /me - Change name and/or password
async fn update_me(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    form: web::Json<UpdateUserForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let user_service = UserService::new(&state.db);

    if let Some(name) = &form.name {
        user_service.rename(auth_user.id(), name.trim()).await?;
    }
    if let Some(password) = &form.password {
        AuthService::new(&state.db)
            .set_password(auth_user.id(), password)
            .await?;
    }

    let user = user_service
        .get_user_by_id(auth_user.id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
