use super::*;
use crate::config::ChatConfig;
use crate::state::test_helpers::test_app_state;
use crate::store::{BROADCAST_TARGET, MessageKind, StoreError};

fn user(name: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(super::super::USER_HEADER, name.parse().unwrap());
    headers
}

fn body(to: &str, text: &str, kind: &str) -> Json<SendBody> {
    Json(SendBody { to: to.into(), text: text.into(), kind: kind.into() })
}

fn query(limit: Option<&str>) -> Query<MessagesQuery> {
    Query(MessagesQuery { limit: limit.map(str::to_owned) })
}

async fn read(state: &AppState, viewer: &str, limit: Option<&str>) -> Result<Vec<Message>, ApiError> {
    list_messages(State(state.clone()), user(viewer), query(limit))
        .await
        .map(|Json(list)| list)
}

#[tokio::test]
async fn send_then_read_newest_first() {
    let (state, _store, _clock) = test_app_state(&ChatConfig::default());
    state.presence.join("alice").await.unwrap();

    let status = send_message(State(state.clone()), user("alice"), body(BROADCAST_TARGET, "hi", "message")).await;
    assert_eq!(status.ok(), Some(StatusCode::CREATED));
    state.presence.join("bob").await.unwrap();

    let Ok(list) = read(&state, "bob", None).await else {
        panic!("read should succeed");
    };
    let texts: Vec<_> = list.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["bob entered", "hi", "alice entered"]);
    assert_eq!(list[2].kind, MessageKind::Status);
}

#[tokio::test]
async fn read_with_limit_and_private_filtering() {
    let (state, _store, _clock) = test_app_state(&ChatConfig::default());
    state.presence.join("alice").await.unwrap();
    send_message(State(state.clone()), user("alice"), body("bob", "for bob", "private_message"))
        .await
        .ok();
    send_message(State(state.clone()), user("alice"), body("dave", "for dave", "private_message"))
        .await
        .ok();

    let Ok(list) = read(&state, "bob", Some("1")).await else {
        panic!("read should succeed");
    };
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].text, "for bob");
}

#[tokio::test]
async fn read_rejects_bad_limits() {
    let (state, _store, _clock) = test_app_state(&ChatConfig::default());
    for raw in ["0", "-1", "ten"] {
        let Err(err) = read(&state, "bob", Some(raw)).await else {
            panic!("limit {raw:?} should be rejected");
        };
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.code, "E_INVALID_LIMIT");
    }
}

#[tokio::test]
async fn read_without_user_header_is_unprocessable() {
    let (state, _store, _clock) = test_app_state(&ChatConfig::default());
    let Err(err) = list_messages(State(state), HeaderMap::new(), query(None)).await else {
        panic!("missing viewer should be rejected");
    };
    assert_eq!(err.body.code, "E_INVALID_VIEWER");
}

#[tokio::test]
async fn send_from_unknown_sender_is_unprocessable() {
    let (state, _store, _clock) = test_app_state(&ChatConfig::default());
    let Err(err) = send_message(State(state), user("ghost"), body(BROADCAST_TARGET, "boo", "message")).await else {
        panic!("unknown sender should be rejected");
    };
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.body.code, "E_UNKNOWN_SENDER");
}

#[test]
fn send_body_reads_type_field() {
    let parsed: SendBody = serde_json::from_str(r#"{"to":"Todos","text":"hi","type":"message"}"#).unwrap();
    assert_eq!(parsed.kind, "message");
    let empty: SendBody = serde_json::from_str("{}").unwrap();
    assert!(empty.to.is_empty() && empty.text.is_empty() && empty.kind.is_empty());
}

#[test]
fn error_mapping() {
    assert_eq!(
        send_error_to_api(SendError::InvalidMessage("x")).status,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        send_error_to_api(SendError::Store(StoreError::Unavailable(String::new()))).status,
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(read_error_to_api(ReadError::InvalidLimit).status, StatusCode::UNPROCESSABLE_ENTITY);
}
