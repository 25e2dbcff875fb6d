// Request validation
// Turns validator output into the flat field -> message map returned with 400
// responses, using static per-entity display names.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;

/// Field name -> human-readable message
pub type FieldErrors = BTreeMap<String, String>;

/// Static display names for an entity's payload fields
pub trait FieldNames {
    const FIELD_NAMES: &'static [(&'static str, &'static str)];

    fn display_name(field: &str) -> &'static str {
        Self::FIELD_NAMES
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, display)| *display)
            .unwrap_or("Field")
    }
}

/// Rejects empty or whitespace-only strings
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Rejects negative integers
pub fn validate_non_negative(value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        Err(ValidationError::new("negative"))
    } else {
        Ok(())
    }
}

/// Build the full per-field error map for `T`
///
/// Every failing field is reported; for a field with several failures the
/// first rule in declaration order wins.
pub fn field_errors<T: FieldNames>(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first()
                .map(|err| (field.to_string(), describe(T::display_name(field), err)))
        })
        .collect()
}

fn describe(display: &str, err: &ValidationError) -> String {
    let param = |key: &str| err.params.get(key).map(|v| v.to_string());

    match err.code.as_ref() {
        "required" => format!("{} is required", display),
        "blank" => format!("{} must not be empty", display),
        "email" => format!("{} must be a valid email address", display),
        "length" => match (param("min"), param("max")) {
            (Some(min), _) => format!("{} must be at least {} characters", display, min),
            (None, Some(max)) => format!("{} must be at most {} characters", display, max),
            (None, None) => format!("{} has an invalid length", display),
        },
        "negative" => format!("{} must be an integer greater than or equal to 0", display),
        _ => format!("{} is invalid", display),
    }
}

/// JSON body extractor that runs `Validate` before the handler sees the payload
///
/// Body parse failures and rule violations both become 400 responses, so a
/// handler only ever receives a payload that passed every rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + FieldNames,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await?;

        payload
            .validate()
            .map_err(|errors| ApiError::Validation(field_errors::<T>(&errors)))?;

        Ok(Self(payload))
    }
}
