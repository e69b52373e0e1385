use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use shared_models::error::AppError;

/// Field-level validation outcome for a create command.
///
/// Unsupported keys are reported back but never fail the request on their own.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValidation {
    pub missing_key_map: BTreeMap<String, String>,
    pub invalid_type_key_map: BTreeMap<String, String>,
    pub invalid_value_key_map: BTreeMap<String, String>,
    pub unsupported_key_list: Vec<String>,
}

impl KeyValidation {
    /// Starts a validation pass, recording every key of `body` not in `allowed`.
    pub fn new(command: &str, body: &Map<String, Value>, allowed: &[&str]) -> Self {
        let unsupported_key_list: Vec<String> = body
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .cloned()
            .collect();

        if !unsupported_key_list.is_empty() {
            warn!("{} - unsupported keys in dto: {:?}", command, unsupported_key_list);
        }

        Self {
            unsupported_key_list,
            ..Self::default()
        }
    }

    pub fn missing(&mut self, key: &str, message: &str) {
        self.missing_key_map.insert(key.to_string(), message.to_string());
    }

    pub fn invalid_type(&mut self, key: &str, message: &str) {
        self.invalid_type_key_map.insert(key.to_string(), message.to_string());
    }

    pub fn invalid_value(&mut self, key: &str, message: &str) {
        self.invalid_value_key_map.insert(key.to_string(), message.to_string());
    }

    /// Required string whose trimmed length is at least `min_chars`.
    pub fn required_string(
        &mut self,
        body: &Map<String, Value>,
        key: &str,
        min_chars: usize,
        too_short: &str,
    ) -> Option<String> {
        match body.get(key) {
            None => {
                self.missing(key, &format!("{} is required", key));
                None
            }
            Some(Value::String(value)) if value.trim().chars().count() < min_chars => {
                self.invalid_value(key, too_short);
                None
            }
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                self.invalid_type(key, &format!("{} must be a string", key));
                None
            }
        }
    }

    /// Optional string of at most `max_chars` characters.
    pub fn optional_string(
        &mut self,
        body: &Map<String, Value>,
        key: &str,
        max_chars: Option<(usize, &str)>,
    ) -> Option<String> {
        match body.get(key) {
            None => None,
            Some(Value::String(value)) => match max_chars {
                Some((max, too_long)) if value.chars().count() > max => {
                    self.invalid_value(key, too_long);
                    None
                }
                _ => Some(value.clone()),
            },
            Some(_) => {
                self.invalid_type(key, &format!("{} must be a string", key));
                None
            }
        }
    }

    /// Required whole number within `min..=max`. Integral floats such as
    /// `5.0` are accepted.
    pub fn required_integer(
        &mut self,
        body: &Map<String, Value>,
        key: &str,
        min: i64,
        max: i64,
        out_of_range: &str,
    ) -> Option<i64> {
        match body.get(key) {
            None => {
                self.missing(key, &format!("{} is required", key));
                None
            }
            Some(Value::Number(number)) => {
                let value = number.as_f64().unwrap_or(f64::NAN);
                if value.fract() != 0.0 || value < min as f64 || value > max as f64 {
                    self.invalid_value(key, out_of_range);
                    None
                } else {
                    Some(value as i64)
                }
            }
            Some(_) => {
                self.invalid_type(key, &format!("{} must be a number", key));
                None
            }
        }
    }

    pub fn optional_bool(&mut self, body: &Map<String, Value>, key: &str) -> Option<bool> {
        match body.get(key) {
            None => None,
            Some(Value::Bool(value)) => Some(*value),
            Some(_) => {
                self.invalid_type(key, &format!("{} must be a boolean", key));
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.missing_key_map.is_empty()
            || !self.invalid_type_key_map.is_empty()
            || !self.invalid_value_key_map.is_empty()
    }

    /// Fails with `400 {code}` carrying all maps when any check failed.
    pub fn ensure_valid(&self, code: &str, message: &str) -> Result<(), AppError> {
        if !self.has_errors() {
            return Ok(());
        }

        Err(AppError::structured(
            StatusCode::BAD_REQUEST,
            json!({
                "code": code,
                "message": message,
                "missingKeyMap": self.missing_key_map,
                "invalidTypeKeyMap": self.invalid_type_key_map,
                "invalidValueKeyMap": self.invalid_value_key_map,
                "unsupportedKeyList": self.unsupported_key_list,
            }),
        ))
    }
}

/// Error body in the `{ code, message }` shape used by the create commands.
pub fn command_error(status: StatusCode, code: &str, message: &str) -> AppError {
    AppError::structured(status, json!({ "code": code, "message": message }))
}

/// Requires the request body to be a JSON object.
pub fn body_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("Request body must be a JSON object".to_string())),
    }
}
