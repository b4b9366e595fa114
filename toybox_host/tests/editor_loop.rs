use crossbeam_channel::{bounded, Receiver, Sender};
use serde_json::json;
use toybox_host::{
    EditorLoop, InboundMsg, OutboundMsg, ParamError, ParamId, ParamStore, ParamValue, PluginParams,
};
use toybox_protocol::{Notification, NotificationBatch};

struct Harness {
    in_tx: Sender<InboundMsg>,
    out_rx: Receiver<OutboundMsg>,
    editor: EditorLoop,
    params: ParamStore,
}

impl Harness {
    fn new() -> Self {
        let (in_tx, in_rx) = bounded(toybox_host::INBOUND_CAP);
        let (out_tx, out_rx) = bounded(toybox_host::OUTBOUND_CAP);
        Self {
            in_tx,
            out_rx,
            editor: EditorLoop::new(in_rx, out_tx),
            params: ParamStore::new(),
        }
    }

    fn post(&self, payload: &str) {
        self.in_tx
            .send(InboundMsg::Ipc {
                payload: payload.to_string(),
            })
            .unwrap();
    }

    fn tick(&mut self) -> Vec<NotificationBatch> {
        self.editor.tick(&self.params);
        self.out_rx
            .try_iter()
            .map(|OutboundMsg::Send { batch }| batch)
            .collect()
    }
}

#[test]
fn init_replies_with_one_snapshot_batch() {
    let mut h = Harness::new();
    h.post(r#"{"type":"Init"}"#);

    let sent = h.tick();
    assert_eq!(sent.len(), 1);
    let NotificationBatch::Many(items) = &sent[0] else {
        panic!("snapshot must be a batch, got {:?}", sent[0]);
    };
    assert_eq!(
        items,
        &vec![
            Notification::new("preset_change", "Cello"),
            Notification::new("reverb_dry_wet_change", json!(0.5)),
            Notification::new("reverb_type_changed", "Freeverb"),
            Notification::new("filter_type_changed", "Off"),
            Notification::new("output_gain_changed", json!(0.5)),
        ]
    );
}

#[test]
fn applied_commands_are_echoed_once() {
    let mut h = Harness::new();
    h.post(r#"{"type":"SetPreset","preset":"Flute"}"#);
    h.post(r#"{"type":"SetReverbDryWet","value":0.25}"#);

    let sent = h.tick();
    assert_eq!(
        sent,
        vec![
            NotificationBatch::One(Notification::new("preset_change", "Flute")),
            NotificationBatch::One(Notification::new("reverb_dry_wet_change", json!(0.25))),
        ]
    );

    assert!(h.tick().is_empty(), "change flags are consumed");
}

#[test]
fn echoed_levels_keep_their_decimal_form() {
    let mut h = Harness::new();
    h.post(r#"{"type":"SetReverbDryWet","value":0.43}"#);
    h.post(r#"{"type":"SetOutputGain","value":0.1}"#);

    let sent = h.tick();
    assert_eq!(
        sent,
        vec![
            NotificationBatch::One(Notification::new("reverb_dry_wet_change", json!(0.43))),
            NotificationBatch::One(Notification::new("output_gain_changed", json!(0.1))),
        ]
    );
    assert_eq!(ParamValue::Level(0.43).to_json().to_string(), "0.43");
}

#[test]
fn set_gain_and_set_output_gain_share_a_parameter() {
    let mut h = Harness::new();
    h.post(r#"{"type":"SetGain","value":0.75}"#);
    h.tick();
    assert_eq!(h.params.get(ParamId::OutputGain), ParamValue::Level(0.75));

    h.post(r#"{"type":"SetOutputGain","value":3.0}"#);
    let sent = h.tick();
    assert_eq!(
        sent,
        vec![NotificationBatch::One(Notification::new(
            "output_gain_changed",
            json!(1.0)
        ))]
    );
}

#[test]
fn invalid_and_unknown_commands_are_ignored() {
    let mut h = Harness::new();
    h.post("not json");
    h.post(r#"{"type":"SetChorus","enabled":true}"#);
    h.post(r#"{"type":"SetPreset","preset":"Kazoo"}"#);
    h.post(r#"{"type":"SetFilterType","preset":"Notch"}"#);

    assert!(h.tick().is_empty());
    assert_eq!(
        h.params.get(ParamId::Preset),
        ParamValue::Choice("Cello".to_string())
    );
}

#[test]
fn snapshot_consumes_pending_changes() {
    let mut h = Harness::new();
    h.post(r#"{"type":"SetReverbType","preset":"Moorer"}"#);
    h.post(r#"{"type":"Init"}"#);

    let sent = h.tick();
    assert_eq!(sent.len(), 1);
    let items = sent[0].clone().into_vec();
    assert!(items.contains(&Notification::new("reverb_type_changed", "Moorer")));
}

#[test]
fn host_side_changes_are_reported() {
    let mut h = Harness::new();
    h.params
        .set(ParamId::FilterType, ParamValue::Choice("BandPass".to_string()))
        .unwrap();

    let sent = h.tick();
    assert_eq!(
        sent,
        vec![NotificationBatch::One(Notification::new(
            "filter_type_changed",
            "BandPass"
        ))]
    );
}

#[test]
fn param_store_validates_values() {
    let params = ParamStore::new();
    assert!(matches!(
        params.set(ParamId::ReverbDryWet, ParamValue::Level(f32::NAN)),
        Err(ParamError::NonFinite { .. })
    ));
    assert!(matches!(
        params.set(ParamId::Preset, ParamValue::Level(0.2)),
        Err(ParamError::WrongKind { .. })
    ));
    assert!(matches!(
        params.set(ParamId::ReverbType, ParamValue::Choice("Plate".to_string())),
        Err(ParamError::UnknownChoice { .. })
    ));
    assert!(!params.take_changed(ParamId::ReverbType));

    params
        .set(ParamId::ReverbDryWet, ParamValue::Level(-1.0))
        .unwrap();
    assert_eq!(params.get(ParamId::ReverbDryWet), ParamValue::Level(0.0));
    assert!(params.take_changed(ParamId::ReverbDryWet));
    assert!(!params.take_changed(ParamId::ReverbDryWet));
}
