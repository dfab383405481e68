use super::*;
use crate::store::BROADCAST_TARGET;

async fn live_store() -> PgStore {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required for live-db-tests");
    let pool = crate::db::init_pool(&url, 2).await.expect("live db should connect");
    sqlx::query("TRUNCATE participants, messages")
        .execute(&pool)
        .await
        .expect("truncate should succeed");
    PgStore::new(pool)
}

// Both tests share tables, so they run as one sequence.
#[tokio::test]
async fn live_participant_and_message_round_trip() {
    let store = live_store().await;

    store
        .insert(Participant { name: "alice".into(), last_seen: 10 })
        .await
        .unwrap();
    let dup = store
        .insert(Participant { name: "alice".into(), last_seen: 11 })
        .await
        .unwrap_err();
    assert!(matches!(dup, StoreError::Duplicate(_)));

    assert!(store.update_last_seen("alice", 5).await.unwrap());
    assert_eq!(store.find_by_name("alice").await.unwrap().unwrap().last_seen, 10);

    assert_eq!(store.list_stale(10).await.unwrap().len(), 1);
    assert!(store.delete_if_stale("alice", 9).await.unwrap().is_none());
    assert!(store.delete_if_stale("alice", 10).await.unwrap().is_some());
    assert!(ParticipantStore::list_all(&store).await.unwrap().is_empty());

    for text in ["first", "second"] {
        store
            .append(Message {
                from: "alice".into(),
                to: BROADCAST_TARGET.into(),
                text: text.into(),
                kind: MessageKind::Broadcast,
                time: "10:00:00".into(),
            })
            .await
            .unwrap();
    }
    let texts: Vec<_> = MessageStore::list_all(&store)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, ["first", "second"]);
}
