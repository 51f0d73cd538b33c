//! Handlers shared by `/tags` and `/ingredients`.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthMiddleware, AuthUser},
    models::{AttrListQuery, NameForm, RecipeAttr},
    services::RecipeAttrService,
    AppState,
};

pub fn create_routes<T>(cfg: &mut web::ServiceConfig)
where
    T: RecipeAttr + Serialize + 'static,
{
    cfg.service(
        web::resource("")
            .wrap(AuthMiddleware)
            .route(web::get().to(list_attrs::<T>)),
    )
    .service(
        web::resource("/{id}")
            .wrap(AuthMiddleware)
            .route(web::put().to(rename_attr::<T>))
            .route(web::patch().to(rename_attr::<T>))
            .route(web::delete().to(delete_attr::<T>)),
    );
}

/// GET / - Caller's rows, optionally only those in use
async fn list_attrs<T: RecipeAttr + Serialize>(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    query: web::Query<AttrListQuery>,
) -> AppResult<HttpResponse> {
    let rows = RecipeAttrService::<T>::new(&state.db)
        .list_for_user(auth_user.id(), query.assigned_only())
        .await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// PUT/PATCH /{id} - Rename
async fn rename_attr<T: RecipeAttr + Serialize>(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
    form: web::Json<NameForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let row = RecipeAttrService::<T>::new(&state.db)
        .rename(id.into_inner(), auth_user.id(), &form.name)
        .await?;

    Ok(HttpResponse::Ok().json(row))
}

/// DELETE /{id}
async fn delete_attr<T: RecipeAttr>(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    RecipeAttrService::<T>::new(&state.db)
        .delete_for_user(id, auth_user.id())
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound(format!("{} {} not found", T::LABEL, id)),
            other => other,
        })?;

    Ok(HttpResponse::NoContent().finish())
}
