//! Tests fuer das JSON-Format der Chat-Nachricht

use crate::types::{ChatNachricht, NachrichtenTyp};

#[test]
fn test_client_json_minimal() {
    let json = r#"{"sender":"user1","receiver":"user2","content":"Hallo","messageType":"TEXT"}"#;
    let nachricht: ChatNachricht = serde_json::from_str(json).unwrap();

    assert_eq!(nachricht.sender.as_deref(), Some("user1"));
    assert_eq!(nachricht.receiver.as_deref(), Some("user2"));
    assert_eq!(nachricht.content, "Hallo");
    assert_eq!(nachricht.message_type, NachrichtenTyp::Text);
    assert!(nachricht.timestamp.is_empty());
    assert_eq!(nachricht.image_url, None);
}

#[test]
fn test_fehlender_typ_ist_text() {
    let nachricht: ChatNachricht = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
    assert_eq!(nachricht.message_type, NachrichtenTyp::Text);
    assert_eq!(nachricht.empfaenger(), None);
}

#[test]
fn test_alter_zeitstempel_feldname() {
    let nachricht: ChatNachricht =
        serde_json::from_str(r#"{"content":"x","timeStamp":"2024-01-01T00:00:00"}"#).unwrap();
    assert_eq!(nachricht.timestamp, "2024-01-01T00:00:00");
}

#[test]
fn test_bild_nachricht_serialisierung() {
    let nachricht = ChatNachricht::bild(
        Some("alice".into()),
        None,
        "1700000000000_cat.jpg",
        "2024-05-01T12:00:00.000000".into(),
    );

    let wert = serde_json::to_value(&nachricht).unwrap();
    assert_eq!(wert["messageType"], "IMAGE");
    assert_eq!(wert["imageUrl"], "/images/1700000000000_cat.jpg");
    assert_eq!(wert["content"], "");
    assert_eq!(wert["timestamp"], "2024-05-01T12:00:00.000000");
    assert_eq!(wert["sender"], "alice");
    assert!(wert.get("receiver").is_none());
}

#[test]
fn test_text_ohne_bild_url_im_json() {
    let wert = serde_json::to_value(ChatNachricht::text(None, None, "x")).unwrap();
    assert_eq!(wert["messageType"], "TEXT");
    assert!(wert.get("imageUrl").is_none());
}
