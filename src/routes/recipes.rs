use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthMiddleware, AuthUser},
    models::{
        Recipe, RecipeDetailResponse, RecipeForm, RecipeImageResponse, RecipeListQuery,
        RecipeResponse, WriteMode,
    },
    services::{ImageStore, RecipeService},
    utils::query::parse_id_list,
    AppState,
};

const IMAGE_FIELD: &str = "image";

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .wrap(AuthMiddleware)
            .route(web::get().to(list_recipes))
            .route(web::post().to(create_recipe)),
    )
    .service(
        web::resource("/{id}")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_recipe))
            .route(web::put().to(replace_recipe))
            .route(web::patch().to(patch_recipe))
            .route(web::delete().to(delete_recipe)),
    )
    .service(
        web::resource("/{id}/upload-image")
            .wrap(AuthMiddleware)
            .route(web::post().to(upload_recipe_image)),
    );
}

async fn detail_response(state: &AppState, recipe: Recipe) -> AppResult<RecipeDetailResponse> {
    let service = RecipeService::new(&state.db);
    let tags = service.tags(recipe.id).await?;
    let ingredients = service.ingredients(recipe.id).await?;
    let image = recipe
        .image
        .as_deref()
        .map(|path| state.config.media_file_url(path));

    Ok(RecipeDetailResponse::new(recipe, tags, ingredients, image))
}

/// GET / - Caller's recipes, newest first, optionally filtered by tag/ingredient ids
async fn list_recipes(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    query: web::Query<RecipeListQuery>,
) -> AppResult<HttpResponse> {
    let tag_ids = match &query.tags {
        Some(raw) => parse_id_list("tags", raw)?,
        None => Vec::new(),
    };
    let ingredient_ids = match &query.ingredients {
        Some(raw) => parse_id_list("ingredients", raw)?,
        None => Vec::new(),
    };

    let service = RecipeService::new(&state.db);
    let recipes = service
        .list_for_user(auth_user.id(), &tag_ids, &ingredient_ids)
        .await?;

    let mut response = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let tags = service.tags(recipe.id).await?;
        let ingredients = service.ingredients(recipe.id).await?;
        response.push(RecipeResponse::new(recipe, tags, ingredients));
    }

    Ok(HttpResponse::Ok().json(response))
}

/// POST / - Create a recipe owned by the caller
async fn create_recipe(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let form = RecipeForm::from_json(body.into_inner())?;
    form.check(WriteMode::Create)?;

    let recipe = RecipeService::new(&state.db)
        .create(auth_user.id(), &form)
        .await?;

    Ok(HttpResponse::Created().json(detail_response(&state, recipe).await?))
}

/// GET /{id}
async fn get_recipe(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let recipe = RecipeService::new(&state.db)
        .require_for_user(id.into_inner(), auth_user.id())
        .await?;

    Ok(HttpResponse::Ok().json(detail_response(&state, recipe).await?))
}

async fn update_recipe(
    state: &AppState,
    auth_user: &AuthUser,
    id: i64,
    form: &RecipeForm,
    mode: WriteMode,
) -> AppResult<HttpResponse> {
    form.check(mode)?;

    let service = RecipeService::new(&state.db);
    let recipe = service.require_for_user(id, auth_user.id()).await?;
    let recipe = service.update(&recipe, form, mode).await?;

    Ok(HttpResponse::Ok().json(detail_response(state, recipe).await?))
}

/// PUT /{id} - Replace every scalar field
async fn replace_recipe(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let form = RecipeForm::from_json(body.into_inner())?;
    update_recipe(&state, &auth_user, id.into_inner(), &form, WriteMode::Replace).await
}

/// PATCH /{id} - Change only the supplied fields
async fn patch_recipe(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let form = RecipeForm::from_json(body.into_inner())?;
    update_recipe(&state, &auth_user, id.into_inner(), &form, WriteMode::Partial).await
}

/// DELETE /{id}
async fn delete_recipe(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let recipe = RecipeService::new(&state.db)
        .delete_for_user(id.into_inner(), auth_user.id())
        .await?;

    if let Some(image) = &recipe.image {
        ImageStore::new(&state.config.media_root).remove(image).await;
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Reads the `image` file field, refusing anything over `max_size` bytes.
async fn read_image_field(payload: &mut Multipart, max_size: usize) -> AppResult<Option<Vec<u8>>> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or("")
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
            if field_name == IMAGE_FIELD {
                if data.len() + chunk.len() > max_size {
                    return Err(AppError::BadRequest(format!(
                        "Image exceeds the maximum upload size of {} bytes",
                        max_size
                    )));
                }
                data.extend_from_slice(&chunk);
            }
        }

        if field_name == IMAGE_FIELD {
            image_data = Some(data);
        }
    }

    Ok(image_data)
}

/// POST /{id}/upload-image - Attach an image to a recipe
async fn upload_recipe_image(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    id: web::Path<i64>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let service = RecipeService::new(&state.db);
    let recipe = service.require_for_user(id.into_inner(), auth_user.id()).await?;

    let data = read_image_field(&mut payload, state.config.max_upload_size)
        .await?
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::BadRequest("No image was submitted".to_string()))?;

    let store = ImageStore::new(&state.config.media_root);
    let relative_path = store.save_recipe_image(data).await?;
    let updated = service
        .set_image(recipe.id, auth_user.id(), &relative_path)
        .await?;

    if let Some(previous) = recipe.image.as_deref() {
        store.remove(previous).await;
    }

    Ok(HttpResponse::Ok().json(RecipeImageResponse {
        id: updated.id,
        image: updated
            .image
            .as_deref()
            .map(|path| state.config.media_file_url(path)),
    }))
}
