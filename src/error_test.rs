use super::*;

#[derive(Debug, thiserror::Error)]
#[error("flaky thing broke")]
struct Flaky;

impl ErrorCode for Flaky {
    fn error_code(&self) -> &'static str {
        "E_FLAKY"
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
#[error("plain failure")]
struct Plain;

impl ErrorCode for Plain {
    fn error_code(&self) -> &'static str {
        "E_PLAIN"
    }
}

#[test]
fn error_body_carries_code_message_and_retryable() {
    let body = ErrorBody::from_error(&Flaky);
    assert_eq!(body.code, "E_FLAKY");
    assert_eq!(body.message, "flaky thing broke");
    assert!(body.retryable);
}

#[test]
fn retryable_defaults_to_false() {
    assert!(!ErrorBody::from_error(&Plain).retryable);
}

#[test]
fn error_body_serializes_as_flat_json() {
    let json = serde_json::to_value(ErrorBody::from_error(&Plain)).unwrap();
    assert_eq!(json, serde_json::json!({"code": "E_PLAIN", "message": "plain failure", "retryable": false}));
}

#[test]
fn api_error_into_response_uses_status() {
    let resp = ApiError::new(StatusCode::CONFLICT, &Plain).into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
