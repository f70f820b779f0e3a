//! Extractors that route every input failure through [`ApiError`].

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::rest::error::ApiError;

/// JSON body that must pass `Validate` before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters; a value that does not parse is a 400 with the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
