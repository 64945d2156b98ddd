use serde_json::json;
use tokio::sync::mpsc;

use gridmatch::adapter::{
    Message, MessageId, MessageKind, ProtocolError, Query, ReceivedQuery, ReplySender,
};

#[test]
fn test_move_query_survives_encode_decode() {
    let query = Message::query("move", json!([3]), MessageId::new("q-7"));
    let decoded = Message::decode(query.encode()).unwrap();
    assert_eq!(decoded, query);
    assert!(decoded.wants_response());
    assert!(!decoded.is_response());
}

#[test]
fn test_reply_carries_query_id() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let query = Query::new("move", json!([3]), MessageId::new("q-7"));
    ReceivedQuery::new(query, ReplySender::new(tx))
        .reply(json!("north"))
        .unwrap();

    match rx.try_recv().unwrap() {
        Message::Response(response) => {
            assert_eq!(response.id, MessageId::new("q-7"));
            assert_eq!(response.result, json!("north"));
        }
        other => panic!("expected response, got {other:?}"),
    }
}

#[test]
fn test_explicit_type_beats_legacy_field_matching() {
    // Same fields as a query, but tagged as a notification: rejected.
    let tagged = json!({"type": "notification", "method": "m", "params": [], "id": "1"});
    assert!(matches!(
        Message::decode(tagged),
        Err(ProtocolError::UnrecognizedMessage(_))
    ));

    let untagged = json!({"method": "m", "params": [], "id": "1"});
    assert_eq!(Message::decode(untagged).unwrap().kind(), MessageKind::Query);
}

#[test]
fn test_wire_lines_match_documented_shapes() {
    let lines = [
        (r#"{"type":"query","method":"get_move","params":{},"id":"q-1"}"#, MessageKind::Query),
        (r#"{"type":"notification","method":"exit","params":null}"#, MessageKind::Notification),
        (r#"{"type":"response","result":"stay","id":"q-1"}"#, MessageKind::Response),
        (r#"{"type":"error","error":"late","id":null}"#, MessageKind::Error),
    ];
    for (line, kind) in lines {
        let message = Message::from_line(line).unwrap();
        assert_eq!(message.kind(), kind);
        assert_eq!(Message::from_line(&message.to_line()).unwrap(), message);
    }
}
