use super::*;
use crate::store::{BROADCAST_TARGET, MessageKind};

fn participant(name: &str, last_seen: Millis) -> Participant {
    Participant { name: name.into(), last_seen }
}

fn message(from: &str, text: &str) -> Message {
    Message {
        from: from.into(),
        to: BROADCAST_TARGET.into(),
        text: text.into(),
        kind: MessageKind::Broadcast,
        time: "00:00:00".into(),
    }
}

#[tokio::test]
async fn insert_rejects_duplicate_name() {
    let store = MemoryStore::new();
    store.insert(participant("alice", 1)).await.unwrap();
    let err = store.insert(participant("alice", 2)).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(name) if name == "alice"));

    let found = store.find_by_name("alice").await.unwrap().unwrap();
    assert_eq!(found.last_seen, 1, "duplicate insert must not overwrite");
}

#[tokio::test]
async fn names_are_case_sensitive() {
    let store = MemoryStore::new();
    store.insert(participant("alice", 1)).await.unwrap();
    store.insert(participant("Alice", 1)).await.unwrap();
    assert_eq!(ParticipantStore::list_all(&store).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_last_seen_never_moves_backwards() {
    let store = MemoryStore::new();
    store.insert(participant("alice", 100)).await.unwrap();

    assert!(store.update_last_seen("alice", 50).await.unwrap());
    assert_eq!(store.find_by_name("alice").await.unwrap().unwrap().last_seen, 100);

    assert!(store.update_last_seen("alice", 150).await.unwrap());
    assert_eq!(store.find_by_name("alice").await.unwrap().unwrap().last_seen, 150);
}

#[tokio::test]
async fn update_last_seen_unknown_returns_false() {
    let store = MemoryStore::new();
    assert!(!store.update_last_seen("ghost", 1).await.unwrap());
}

#[tokio::test]
async fn list_all_is_sorted_by_name() {
    let store = MemoryStore::new();
    for name in ["carol", "alice", "bob"] {
        store.insert(participant(name, 0)).await.unwrap();
    }
    let names: Vec<_> = ParticipantStore::list_all(&store)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["alice", "bob", "carol"]);
}

#[tokio::test]
async fn list_stale_includes_boundary() {
    let store = MemoryStore::new();
    store.insert(participant("old", 10)).await.unwrap();
    store.insert(participant("edge", 20)).await.unwrap();
    store.insert(participant("fresh", 21)).await.unwrap();

    let names: Vec<_> = store
        .list_stale(20)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["edge", "old"]);
}

#[tokio::test]
async fn delete_if_stale_skips_refreshed_participant() {
    let store = MemoryStore::new();
    store.insert(participant("alice", 10)).await.unwrap();

    // Heartbeat lands between the stale read and the delete.
    let stale = store.list_stale(20).await.unwrap();
    assert_eq!(stale.len(), 1);
    store.update_last_seen("alice", 30).await.unwrap();

    assert!(store.delete_if_stale("alice", 20).await.unwrap().is_none());
    assert!(store.find_by_name("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_if_stale_returns_removed_record() {
    let store = MemoryStore::new();
    store.insert(participant("alice", 10)).await.unwrap();
    let removed = store.delete_if_stale("alice", 10).await.unwrap();
    assert_eq!(removed, Some(participant("alice", 10)));
    assert!(store.find_by_name("alice").await.unwrap().is_none());
    assert!(store.delete_if_stale("alice", 10).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_by_name_reports_presence() {
    let store = MemoryStore::new();
    store.insert(participant("alice", 1)).await.unwrap();
    assert!(store.delete_by_name("alice").await.unwrap());
    assert!(!store.delete_by_name("alice").await.unwrap());
}

#[tokio::test]
async fn messages_keep_insertion_order() {
    let store = MemoryStore::new();
    for text in ["one", "two", "three"] {
        store.append(message("alice", text)).await.unwrap();
    }
    let texts: Vec<_> = MessageStore::list_all(&store)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, ["one", "two", "three"]);
}
