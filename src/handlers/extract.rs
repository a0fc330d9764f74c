use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;

use crate::error::ApiError;

/// Single path parameter identifying a record.
///
/// A value that does not parse (e.g. `/api/departments/abc`) is answered as
/// an unknown endpoint, keeping the JSON error shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for RecordId<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await.map_err(|e| {
            debug!(path = %parts.uri.path(), "Rejected path parameter: {}", e);
            ApiError::not_found("Endpoint not found")
        })?;
        Ok(RecordId(value))
    }
}

/// JSON object request body.
///
/// An empty body reads as `{}`; anything that is not a JSON object is
/// rejected with a 400. Field accessors treat `null`, a missing key, and a
/// blank string alike as "not provided".
#[derive(Debug, Clone, Default)]
pub struct JsonBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e)))?;
        Self::parse(&bytes)
    }
}

impl JsonBody {
    pub fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(Value::Null) => Ok(Self::default()),
            _ => Err(ApiError::validation("Invalid JSON body")),
        }
    }

    fn present(&self, field: &str) -> Option<&Value> {
        match self.0.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(value) => Some(value),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.present(field).is_some()
    }

    /// Trimmed text value. Numbers and booleans are accepted in their JSON
    /// spelling so `"student_id": 101` reads as `"101"`.
    pub fn text(&self, field: &str) -> Result<Option<String>, ApiError> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
            Some(_) => Err(invalid(field)),
        }
    }

    pub fn required_text(&self, field: &str) -> Result<String, ApiError> {
        self.text(field)?.ok_or_else(|| ApiError::missing_field(field))
    }

    /// Integer given as a JSON number or a numeric string.
    pub fn int(&self, field: &str) -> Result<Option<i32>, ApiError> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| invalid(field)),
            Some(Value::String(s)) => s.trim().parse::<i32>().map(Some).map_err(|_| invalid(field)),
            Some(_) => Err(invalid(field)),
        }
    }

    pub fn required_int(&self, field: &str) -> Result<i32, ApiError> {
        self.int(field)?.ok_or_else(|| ApiError::missing_field(field))
    }

    /// Exact decimal given as a JSON number or a numeric string.
    pub fn decimal(&self, field: &str) -> Result<Option<Decimal>, ApiError> {
        let raw = match self.present(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(invalid(field)),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map(Some)
            .map_err(|_| invalid(field))
    }

    pub fn required_decimal(&self, field: &str) -> Result<Decimal, ApiError> {
        self.decimal(field)?.ok_or_else(|| ApiError::missing_field(field))
    }

    /// Calendar date in `YYYY-MM-DD` form.
    pub fn date(&self, field: &str) -> Result<Option<NaiveDate>, ApiError> {
        match self.text(field)? {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ApiError::validation(format!("Invalid date for field: {} (expected YYYY-MM-DD)", field))),
        }
    }
}

fn invalid(field: &str) -> ApiError {
    ApiError::validation(format!("Invalid value for field: {}", field))
}
