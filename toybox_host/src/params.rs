use crate::protocol::kinds;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use toybox_protocol::choices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Preset,
    OutputGain,
    ReverbDryWet,
    ReverbType,
    FilterType,
}

impl ParamId {
    /// Snapshot order sent in reply to `Init`.
    pub const ALL: [ParamId; 5] = [
        ParamId::Preset,
        ParamId::ReverbDryWet,
        ParamId::ReverbType,
        ParamId::FilterType,
        ParamId::OutputGain,
    ];

    pub fn notification_kind(self) -> &'static str {
        match self {
            ParamId::Preset => kinds::PRESET_CHANGE,
            ParamId::OutputGain => kinds::OUTPUT_GAIN_CHANGED,
            ParamId::ReverbDryWet => kinds::REVERB_DRY_WET_CHANGE,
            ParamId::ReverbType => kinds::REVERB_TYPE_CHANGED,
            ParamId::FilterType => kinds::FILTER_TYPE_CHANGED,
        }
    }

    pub fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            ParamId::Preset => Some(choices::PRESETS),
            ParamId::ReverbType => Some(choices::REVERB_TYPES),
            ParamId::FilterType => Some(choices::FILTER_TYPES),
            ParamId::OutputGain | ParamId::ReverbDryWet => None,
        }
    }

    pub fn default_value(self) -> ParamValue {
        match self {
            ParamId::Preset => ParamValue::Choice("Cello".to_string()),
            ParamId::OutputGain => ParamValue::Level(0.5),
            ParamId::ReverbDryWet => ParamValue::Level(0.5),
            ParamId::ReverbType => ParamValue::Choice("Freeverb".to_string()),
            ParamId::FilterType => ParamValue::Choice("Off".to_string()),
        }
    }
}

/// Levels are normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Level(f32),
    Choice(String),
}

impl ParamValue {
    pub fn to_json(&self) -> Value {
        match self {
            // Widen through the shortest f32 decimal so 0.43 goes out as 0.43,
            // not 0.4300000071525574.
            ParamValue::Level(v) => {
                let wide = v.to_string().parse::<f64>().unwrap_or(f64::from(*v));
                Value::from(wide)
            }
            ParamValue::Choice(s) => Value::from(s.as_str()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("non-finite value for {id:?}")]
    NonFinite { id: ParamId },
    #[error("unknown choice `{value}` for {id:?}")]
    UnknownChoice { id: ParamId, value: String },
    #[error("wrong value kind for {id:?}")]
    WrongKind { id: ParamId },
}

/// What the editor loop needs from the plug-in's parameters.
pub trait PluginParams {
    fn get(&self, id: ParamId) -> ParamValue;
    /// Applies a value and raises the parameter's change flag.
    fn set(&self, id: ParamId, value: ParamValue) -> Result<(), ParamError>;
    /// Returns and clears the change flag.
    fn take_changed(&self, id: ParamId) -> bool;
}

struct Slot {
    value: ParamValue,
    changed: bool,
}

/// In-memory parameters with per-parameter change flags.
pub struct ParamStore {
    slots: Mutex<HashMap<ParamId, Slot>>,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore {
    pub fn new() -> Self {
        let slots = ParamId::ALL
            .iter()
            .map(|&id| {
                (
                    id,
                    Slot {
                        value: id.default_value(),
                        changed: false,
                    },
                )
            })
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }
}

impl PluginParams for ParamStore {
    fn get(&self, id: ParamId) -> ParamValue {
        let guard = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&id)
            .map(|s| s.value.clone())
            .unwrap_or_else(|| id.default_value())
    }

    fn set(&self, id: ParamId, value: ParamValue) -> Result<(), ParamError> {
        let value = validate(id, value)?;
        let mut guard = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(
            id,
            Slot {
                value,
                changed: true,
            },
        );
        Ok(())
    }

    fn take_changed(&self, id: ParamId) -> bool {
        let mut guard = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .get_mut(&id)
            .map(|s| std::mem::take(&mut s.changed))
            .unwrap_or(false)
    }
}

fn validate(id: ParamId, value: ParamValue) -> Result<ParamValue, ParamError> {
    match (id.choices(), value) {
        (None, ParamValue::Level(v)) => {
            if !v.is_finite() {
                return Err(ParamError::NonFinite { id });
            }
            Ok(ParamValue::Level(v.clamp(0.0, 1.0)))
        }
        (Some(allowed), ParamValue::Choice(s)) => {
            if allowed.contains(&s.as_str()) {
                Ok(ParamValue::Choice(s))
            } else {
                Err(ParamError::UnknownChoice { id, value: s })
            }
        }
        _ => Err(ParamError::WrongKind { id }),
    }
}
