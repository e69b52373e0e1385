use axum::http::HeaderMap;

use shared_models::auth::CurrentUser;
use shared_models::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const PATIENT_ID_HEADER: &str = "x-patient-id";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, AppError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {} header format", name))),
    }
}

/// Resolves the calling user from the `x-user-*` headers. Every header that is
/// absent keeps the value from `fallback`.
pub fn resolve_user(headers: &HeaderMap, fallback: CurrentUser) -> Result<CurrentUser, AppError> {
    let id = header_value(headers, USER_ID_HEADER)?
        .map(str::to_string)
        .unwrap_or(fallback.id);
    let role = header_value(headers, USER_ROLE_HEADER)?
        .map(str::to_string)
        .or(fallback.role);
    let patient_id = header_value(headers, PATIENT_ID_HEADER)?
        .map(str::to_string)
        .or(fallback.patient_id);

    Ok(CurrentUser { id, role, patient_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    #[test]
    fn test_headers_override_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("USER-9"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("clinicManager"));

        let user = resolve_user(&headers, CurrentUser::patient("USER-1", "PAT-1")).unwrap();

        assert_eq!(user.id, "USER-9");
        assert_eq!(user.role.as_deref(), Some("clinicManager"));
        assert_eq!(user.patient_id.as_deref(), Some("PAT-1"));
    }

    #[test]
    fn test_missing_headers_keep_fallback() {
        let fallback = CurrentUser::with_role("USER-ADMIN", "admin");
        let user = resolve_user(&HeaderMap::new(), fallback.clone()).unwrap();
        assert_eq!(user, fallback);
    }

    #[test]
    fn test_non_ascii_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(PATIENT_ID_HEADER, HeaderValue::from_bytes(&[0xC3, 0xA9]).unwrap());

        let result = resolve_user(&headers, CurrentUser::patient("USER-1", "PAT-1"));
        assert_matches!(result, Err(AppError::BadRequest(msg)) if msg.contains(PATIENT_ID_HEADER));
    }
}
