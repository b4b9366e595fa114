use serde_json::json;
use toybox_protocol::{split_delivery, Command, Notification, NotificationBatch, RawCommand};

#[test]
fn commands_use_a_type_tag_with_flat_payload() {
    let encoded = serde_json::to_value(Command::SetPreset {
        preset: "Flute".to_string(),
    })
    .unwrap();
    assert_eq!(encoded, json!({ "type": "SetPreset", "preset": "Flute" }));

    let init = serde_json::to_value(Command::Init).unwrap();
    assert_eq!(init, json!({ "type": "Init" }));
}

#[test]
fn command_kind_matches_the_encoded_tag() {
    let cmds = [
        Command::Init,
        Command::SetPreset { preset: "Cello".to_string() },
        Command::SetGain { value: 0.25 },
        Command::SetOutputGain { value: 0.5 },
        Command::SetReverbDryWet { value: 0.75 },
        Command::SetReverbType { preset: "Moorer".to_string() },
        Command::SetFilterType { preset: "LowPass".to_string() },
    ];
    for cmd in cmds {
        let v = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["type"], cmd.kind());
        assert!(Command::KNOWN.contains(&cmd.kind()));
    }
}

#[test]
fn raw_command_flattens_its_fields() {
    let cmd = RawCommand::new("SetChorus").with_field("enabled", true);
    let v = serde_json::to_value(&cmd).unwrap();
    assert_eq!(v, json!({ "type": "SetChorus", "enabled": true }));
}

#[test]
fn raw_command_keeps_its_own_tag() {
    let cmd = RawCommand::new("SetChorus").with_field("type", "SetPreset");
    assert!(cmd.fields.is_empty());
    assert_eq!(serde_json::to_string(&cmd).unwrap(), r#"{"type":"SetChorus"}"#);
}

#[test]
fn batch_accepts_single_and_array_forms() {
    let one = NotificationBatch::parse(r#"{"type":"preset_change","value":"Flute"}"#).unwrap();
    assert_eq!(
        one.into_vec(),
        vec![Notification::new("preset_change", "Flute")]
    );

    let many = NotificationBatch::parse(
        r#"[{"type":"preset_change","value":"Flute"},{"type":"reverb_dry_wet_change","value":0.4}]"#,
    )
    .unwrap();
    assert_eq!(many.len(), 2);
    let items = many.into_vec();
    assert_eq!(items[0].kind, "preset_change");
    assert_eq!(items[1].value, json!(0.4));

    let empty = NotificationBatch::parse("[]").unwrap();
    assert!(empty.is_empty());
}

#[test]
fn notification_value_defaults_to_null() {
    let batch = NotificationBatch::parse(r#"{"type":"instrument_change"}"#).unwrap();
    assert_eq!(batch.into_vec()[0].value, serde_json::Value::Null);
}

#[test]
fn typed_batch_rejects_non_message_json() {
    assert!(NotificationBatch::parse("not json").is_err());
    assert!(NotificationBatch::parse("42").is_err());
    assert!(NotificationBatch::parse(r#"{"value":1}"#).is_err());
}

#[test]
fn split_delivery_only_fails_on_bad_syntax() {
    assert!(split_delivery("not json").is_err());
    assert_eq!(split_delivery("42").unwrap(), vec![None::<Notification>]);
    assert_eq!(split_delivery(r#"{"value":1}"#).unwrap(), vec![None::<Notification>]);
    assert!(split_delivery("[]").unwrap().is_empty());

    let items = split_delivery(
        r#"[{"type":"preset_change","value":"Oboe"},7,{"type":7},{"type":"gain_change"}]"#,
    )
    .unwrap();
    assert_eq!(
        items,
        vec![
            Some(Notification::new("preset_change", "Oboe")),
            None,
            None,
            Some(Notification::new("gain_change", serde_json::Value::Null)),
        ]
    );
}
