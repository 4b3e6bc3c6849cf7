use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use chat_cell::{
    AppendOutcome, ChatMessage, ChatThreadCache, ConversationKey, DeliveryState, MessageBody,
    SenderRole,
};

fn key() -> ConversationKey {
    ConversationKey::new("d-1", "p-1")
}

fn incoming(id: Option<&str>, text: &str, sent_at: DateTime<Utc>) -> ChatMessage {
    ChatMessage {
        server_id: id.map(str::to_string),
        client_id: None,
        key: key(),
        sender_id: "p-1".to_string(),
        sender_role: SenderRole::Patient,
        body: MessageBody::Text(text.to_string()),
        sent_at,
        delivery: DeliveryState::Confirmed,
    }
}

#[test]
fn history_load_reproduces_server_order_exactly() {
    let now = Utc::now();
    let history = vec![
        incoming(Some("m-1"), "halo dok", now - Duration::minutes(30)),
        incoming(Some("m-2"), "ada keluhan apa?", now - Duration::minutes(20)),
        incoming(Some("m-3"), "demam sejak kemarin", now - Duration::minutes(10)),
    ];

    let mut cache = ChatThreadCache::new();
    cache.load_history(key(), history.clone());

    assert_eq!(cache.messages(&key()), history);
}

#[test]
fn history_reload_replaces_previous_cache() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();
    cache.load_history(key(), vec![incoming(Some("old"), "lama", now - Duration::hours(2))]);
    cache.load_history(key(), vec![incoming(Some("new"), "baru", now)]);

    let messages = cache.messages(&key());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].server_id.as_deref(), Some("new"));
}

#[test]
fn duplicate_server_id_is_a_no_op() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();
    cache.load_history(key(), vec![incoming(Some("m-1"), "halo", now)]);

    let outcome = cache.append_live(incoming(Some("m-1"), "halo", now));
    assert_eq!(outcome, AppendOutcome::Duplicate);
    assert_eq!(cache.messages(&key()).len(), 1);
}

#[test]
fn events_without_ids_dedup_by_fingerprint() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();

    assert_eq!(
        cache.append_live(incoming(None, "halo", now)),
        AppendOutcome::Appended
    );
    // The same event delivered twice (no server id to compare).
    assert_eq!(
        cache.append_live(incoming(None, "halo", now)),
        AppendOutcome::Duplicate
    );
    assert_eq!(cache.messages(&key()).len(), 1);
}

#[test]
fn echo_confirms_the_pending_send_instead_of_duplicating_it() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();

    let outbound = ChatMessage::outbound(key(), MessageBody::Text("baik, istirahat ya".into()), now);
    let client_id = outbound.client_id.unwrap();
    cache.register_pending(outbound);
    assert_eq!(cache.pending_count(&key()), 1);

    let mut echo = incoming(Some("m-9"), "baik, istirahat ya", now + Duration::seconds(1));
    echo.sender_id = "d-1".to_string();
    echo.sender_role = SenderRole::Doctor;
    echo.client_id = Some(client_id);

    assert_eq!(cache.append_live(echo), AppendOutcome::ConfirmedPending);
    assert_eq!(cache.pending_count(&key()), 0);

    let messages = cache.messages(&key());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].server_id.as_deref(), Some("m-9"));
    assert_eq!(messages[0].delivery, DeliveryState::Confirmed);
}

#[test]
fn echo_without_client_id_still_confirms_the_pending_send() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();

    cache.register_pending(ChatMessage::outbound(
        key(),
        MessageBody::Text("minum air putih yang banyak".into()),
        now,
    ));
    assert_eq!(cache.pending_count(&key()), 1);

    // The backend stripped the client id and stamped its own time.
    let mut echo = incoming(Some("m-7"), "minum air putih yang banyak", now + Duration::seconds(2));
    echo.sender_id = "d-1".to_string();
    echo.sender_role = SenderRole::Doctor;

    assert_eq!(cache.append_live(echo), AppendOutcome::ConfirmedPending);
    assert_eq!(cache.pending_count(&key()), 0);

    let messages = cache.messages(&key());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].server_id.as_deref(), Some("m-7"));
    assert_eq!(messages[0].delivery, DeliveryState::Confirmed);
}

#[test]
fn live_events_insert_in_sent_at_order_with_ties_by_arrival() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();

    cache.append_live(incoming(Some("m-2"), "kedua", now));
    cache.append_live(incoming(Some("m-1"), "pertama", now - Duration::minutes(1)));
    // Same timestamp as m-2: arrival order breaks the tie.
    cache.append_live(incoming(Some("m-3"), "ketiga", now));

    let texts: Vec<String> = cache
        .messages(&key())
        .iter()
        .map(|m| m.body.preview())
        .collect();
    assert_eq!(texts, vec!["pertama", "kedua", "ketiga"]);
}

#[test]
fn summary_tracks_the_latest_message() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();
    cache.load_history(key(), vec![incoming(Some("m-1"), "halo", now - Duration::hours(1))]);
    cache.append_live(incoming(Some("m-2"), "masih demam", now));

    let summaries = cache.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].last_message, "masih demam");
    assert_eq!(summaries[0].last_message_at, now);
}

#[test]
fn buckets_split_on_the_one_day_boundary_inclusive() {
    let now = Utc::now();
    let mut cache = ChatThreadCache::new();

    // Exactly 24h old: still ongoing.
    let mut boundary = incoming(Some("m-1"), "tepat sehari", now - Duration::days(1));
    boundary.key = ConversationKey::new("d-1", "p-1");
    cache.append_live(boundary);

    let mut stale = incoming(Some("m-2"), "lama sekali", now - Duration::days(3));
    stale.key = ConversationKey::new("d-1", "p-2");
    stale.sender_id = "p-2".to_string();
    cache.append_live(stale);

    let (ongoing, closed) = cache.buckets(now);
    assert_eq!(ongoing.len(), 1);
    assert_eq!(ongoing[0].key.patient_id, "p-1");
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].key.patient_id, "p-2");
}
