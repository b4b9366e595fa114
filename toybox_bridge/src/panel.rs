use crate::bridge::{Bridge, BridgeState};
use crate::error::BridgeError;
use crate::registry::Subscription;
use crate::transport::HostTransport;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use toybox_protocol::{kinds, Command};

/// Resolution of the continuous controls (slider step).
pub const GAIN_STEP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub preset: String,
    pub instrument: String,
    pub output_gain: f32,
    pub reverb_dry_wet: f32,
    pub reverb_type: String,
    pub filter_type: String,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            preset: String::new(),
            instrument: String::new(),
            output_gain: 0.5,
            reverb_dry_wet: 0.5,
            reverb_type: String::new(),
            filter_type: String::new(),
        }
    }
}

/// Control-panel view model.
///
/// State only changes when the host reports a value; user intents are sent
/// as commands and show up once the host echoes them.
pub struct ControlPanel {
    bridge: Bridge,
    state: Rc<RefCell<PanelState>>,
    subscriptions: Vec<Subscription>,
}

impl ControlPanel {
    pub fn mount(bridge: &Bridge, transport: Rc<dyn HostTransport>) -> Result<Self, BridgeError> {
        // Checked before subscribing: the live panel's handlers must survive.
        if bridge.state() == BridgeState::Ready {
            return Err(BridgeError::AlreadyMounted);
        }

        let state = Rc::new(RefCell::new(PanelState::default()));
        let dispatcher = bridge.dispatcher();

        let subscriptions = vec![
            dispatcher.subscribe(kinds::PRESET_CHANGE, choice_setter(&state, |s, v| s.preset = v)),
            dispatcher.subscribe(
                kinds::INSTRUMENT_CHANGE,
                choice_setter(&state, |s, v| s.instrument = v),
            ),
            dispatcher.subscribe(
                kinds::OUTPUT_GAIN_CHANGED,
                level_setter(&state, |s, v| s.output_gain = v),
            ),
            dispatcher.subscribe(kinds::GAIN_CHANGE, level_setter(&state, |s, v| s.output_gain = v)),
            dispatcher.subscribe(
                kinds::REVERB_DRY_WET_CHANGE,
                level_setter(&state, |s, v| s.reverb_dry_wet = v),
            ),
            dispatcher.subscribe(
                kinds::REVERB_TYPE_CHANGED,
                choice_setter(&state, |s, v| s.reverb_type = v),
            ),
            dispatcher.subscribe(
                kinds::FILTER_TYPE_CHANGED,
                choice_setter(&state, |s, v| s.filter_type = v),
            ),
        ];

        if let Err(e) = bridge.mount(transport) {
            for sub in subscriptions {
                sub.unsubscribe();
            }
            return Err(e);
        }

        Ok(Self {
            bridge: bridge.clone(),
            state,
            subscriptions,
        })
    }

    pub fn state(&self) -> PanelState {
        self.state.borrow().clone()
    }

    pub fn select_preset(&self, preset: &str) -> Result<(), BridgeError> {
        self.bridge.send(&Command::SetPreset {
            preset: preset.to_string(),
        })
    }

    pub fn set_output_gain(&self, value: f32) -> Result<(), BridgeError> {
        let value = quantize(value)?;
        self.bridge.send(&Command::SetOutputGain { value })
    }

    pub fn set_reverb_dry_wet(&self, value: f32) -> Result<(), BridgeError> {
        let value = quantize(value)?;
        self.bridge.send(&Command::SetReverbDryWet { value })
    }

    pub fn set_reverb_type(&self, reverb_type: &str) -> Result<(), BridgeError> {
        self.bridge.send(&Command::SetReverbType {
            preset: reverb_type.to_string(),
        })
    }

    pub fn set_filter_type(&self, filter_type: &str) -> Result<(), BridgeError> {
        self.bridge.send(&Command::SetFilterType {
            preset: filter_type.to_string(),
        })
    }

    pub fn unmount(self) {
        for sub in self.subscriptions {
            sub.unsubscribe();
        }
        self.bridge.unmount();
    }
}

fn quantize(value: f32) -> Result<f32, BridgeError> {
    if !value.is_finite() {
        return Err(BridgeError::InvalidCommand(format!(
            "non-finite control value: {value}"
        )));
    }
    Ok((value.clamp(0.0, 1.0) / GAIN_STEP).round() * GAIN_STEP)
}

fn choice_setter(
    state: &Rc<RefCell<PanelState>>,
    apply: fn(&mut PanelState, String),
) -> impl Fn(Value) + 'static {
    let state = Rc::clone(state);
    move |value| match value {
        Value::String(s) => apply(&mut state.borrow_mut(), s),
        other => tracing::warn!(value = %other, "expected a string choice from host"),
    }
}

// The host may send levels as numbers or as stringified numbers.
fn level_setter(
    state: &Rc<RefCell<PanelState>>,
    apply: fn(&mut PanelState, f32),
) -> impl Fn(Value) + 'static {
    let state = Rc::clone(state);
    move |value| match level_from_value(&value) {
        Some(v) => apply(&mut state.borrow_mut(), v),
        None => tracing::warn!(value = %value, "expected a numeric level from host"),
    }
}

fn level_from_value(value: &Value) -> Option<f32> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !v.is_finite() {
        return None;
    }
    Some((v as f32).clamp(0.0, 1.0))
}
