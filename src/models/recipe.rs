use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{Ingredient, NameForm, Tag};

pub const PRICE_DECIMAL_PLACES: u32 = 2;
pub const PRICE_MAX_DIGITS: u32 = 5;

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub time_minutes: i64,
    /// Canonical decimal string with two places, e.g. `"5.99"`
    pub price: String,
    pub link: String,
    /// Path relative to the media root
    pub image: Option<String>,
}

/// How a [`RecipeForm`] is applied to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    /// `PUT`: every scalar field is replaced
    Replace,
    /// `PATCH`: only supplied fields change
    Partial,
}

impl WriteMode {
    fn requires_all(self) -> bool {
        matches!(self, WriteMode::Create | WriteMode::Replace)
    }
}

/// Request body for create, full update and partial update.
///
/// `user` is accepted only so it can be rejected explicitly: ownership is
/// never taken from the payload. Build it with [`RecipeForm::from_json`].
#[derive(Debug, Default, Validate)]
pub struct RecipeForm {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub time_minutes: Option<i64>,

    pub price: Option<Decimal>,

    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub link: Option<String>,

    pub tags: Option<Vec<NameForm>>,

    pub ingredients: Option<Vec<NameForm>>,

    pub user: Option<Value>,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Checks `price` fits `DECIMAL(5, 2)` without rounding.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let normalized = price.normalize();

    if normalized.scale() > PRICE_DECIMAL_PLACES {
        return Err(field_error(
            "max_decimal_places",
            "Ensure that there are no more than 2 decimal places.",
        ));
    }

    let max_whole = Decimal::from(10_i64.pow(PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES));
    if normalized.trunc().abs() >= max_whole {
        return Err(field_error(
            "max_whole_digits",
            "Ensure that there are no more than 3 digits before the decimal point.",
        ));
    }

    Ok(())
}

/// Renders `price` the way it is stored and serialized: exactly two places.
pub fn canonical_price(price: &Decimal) -> String {
    let mut price = *price;
    price.rescale(PRICE_DECIMAL_PLACES);
    price.to_string()
}

/// Decodes one body field; `null` reads as absent. A value of the wrong
/// shape is recorded against `field` with `expected` as the message.
fn decode_field<T: DeserializeOwned>(
    errors: &mut ValidationErrors,
    field: &'static str,
    expected: &'static str,
    value: Value,
) -> Option<T> {
    match serde_json::from_value::<Option<T>>(value) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Rejected {} value: {}", field, e);
            errors.add(field, field_error("invalid", expected));
            None
        }
    }
}

impl RecipeForm {
    /// Reads a JSON request body, reporting every mistyped field by name.
    ///
    /// Unknown keys are ignored.
    pub fn from_json(body: Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let fields: Map<String, Value> = match body {
            Value::Object(fields) => fields,
            _ => {
                errors.add(
                    "non_field_errors",
                    field_error("invalid", "Invalid data. Expected a dictionary."),
                );
                return Err(errors);
            }
        };

        let mut form = RecipeForm::default();
        for (key, value) in fields {
            let errors = &mut errors;
            match key.as_str() {
                "title" => form.title = decode_field(errors, "title", "Not a valid string.", value),
                "description" => {
                    form.description =
                        decode_field(errors, "description", "Not a valid string.", value)
                }
                "time_minutes" => {
                    form.time_minutes =
                        decode_field(errors, "time_minutes", "A valid integer is required.", value)
                }
                "price" => {
                    form.price = decode_field(errors, "price", "A valid number is required.", value)
                }
                "link" => form.link = decode_field(errors, "link", "Not a valid string.", value),
                "tags" => {
                    form.tags = decode_field(
                        errors,
                        "tags",
                        "Expected a list of objects with a name.",
                        value,
                    )
                }
                "ingredients" => {
                    form.ingredients = decode_field(
                        errors,
                        "ingredients",
                        "Expected a list of objects with a name.",
                        value,
                    )
                }
                "user" => form.user = decode_field(errors, "user", "Invalid value.", value),
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(form)
        } else {
            Err(errors)
        }
    }

    /// Validates the payload for `mode`, collecting every field error at once.
    pub fn check(&self, mode: WriteMode) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if mode.requires_all() {
            let required = [
                ("title", self.title.is_none()),
                ("time_minutes", self.time_minutes.is_none()),
                ("price", self.price.is_none()),
            ];
            for (field, missing) in required {
                if missing {
                    errors.add(field, field_error("required", "This field is required."));
                }
            }
        }

        if let Some(price) = &self.price {
            if let Err(e) = validate_price(price) {
                errors.add("price", e);
            }
        }

        for (field, items) in [("tags", &self.tags), ("ingredients", &self.ingredients)] {
            let invalid = items
                .iter()
                .flatten()
                .any(|item| item.validate().is_err());
            if invalid {
                errors.add(
                    field,
                    field_error("invalid_name", "Each entry needs a name of 1 to 255 characters."),
                );
            }
        }

        if self.user.is_some() {
            errors.add(
                "user",
                field_error("read_only", "The owner of a recipe cannot be changed."),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

/// List representation of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: String,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeResponse {
    pub fn new(recipe: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        RecipeResponse {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags,
            ingredients,
        }
    }
}

/// Single-object representation: the list shape plus description and image URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub description: String,
    pub image: Option<String>,
}

impl RecipeDetailResponse {
    pub fn new(
        recipe: Recipe,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
        image_url: Option<String>,
    ) -> Self {
        let description = recipe.description.clone();
        RecipeDetailResponse {
            recipe: RecipeResponse::new(recipe, tags, ingredients),
            description,
            image: image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeImageResponse {
    pub id: i64,
    pub image: Option<String>,
}
