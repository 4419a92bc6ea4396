//! Body extractors that reject with `AppError` instead of axum's plain-text rejections.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Form submission: `multipart/form-data` text fields, urlencoded, or JSON.
///
/// Form fields arrive as strings, so target types must accept string forms of
/// non-string values (see `flexible_bool`).
#[derive(Debug, Clone)]
pub struct FormBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let value = if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            Value::Object(multipart_fields(multipart).await?)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            Value::Object(pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
        } else {
            let JsonBody(value) = JsonBody::<Value>::from_request(req, state).await?;
            value
        };

        serde_json::from_value(value)
            .map(Self)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

async fn multipart_fields(mut multipart: Multipart) -> Result<Map<String, Value>, AppError> {
    let mut fields = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            return Err(AppError::BadRequest("File uploads are not supported".to_string()));
        }
        let text = field.text().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
        fields.insert(name, Value::String(text));
    }
    Ok(fields)
}
