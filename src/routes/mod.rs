pub mod recipe_attrs;
pub mod recipes;
pub mod users;

use actix_web::web;

use crate::error::AppError;
use crate::models::{Ingredient, Tag};

/// Malformed JSON bodies are reported like any other bad request.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!("Rejected JSON payload: {}", err);
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(web::scope("/user").configure(users::create_routes))
        .service(
            web::scope("/recipe")
                .service(web::scope("/recipes").configure(recipes::create_routes))
                .service(web::scope("/tags").configure(recipe_attrs::create_routes::<Tag>))
                .service(
                    web::scope("/ingredients").configure(recipe_attrs::create_routes::<Ingredient>),
                ),
        );
}
