use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Notification kinds the host emits. The vocabulary is open: anything else
/// arriving from the host is ignored by the UI, never rejected.
pub mod kinds {
    pub const PRESET_CHANGE: &str = "preset_change";
    pub const INSTRUMENT_CHANGE: &str = "instrument_change";
    pub const GAIN_CHANGE: &str = "gain_change";
    pub const OUTPUT_GAIN_CHANGED: &str = "output_gain_changed";
    pub const REVERB_DRY_WET_CHANGE: &str = "reverb_dry_wet_change";
    pub const REVERB_TYPE_CHANGED: &str = "reverb_type_changed";
    pub const FILTER_TYPE_CHANGED: &str = "filter_type_changed";

    pub const ALL: &[&str] = &[
        PRESET_CHANGE,
        INSTRUMENT_CHANGE,
        GAIN_CHANGE,
        OUTPUT_GAIN_CHANGED,
        REVERB_DRY_WET_CHANGE,
        REVERB_TYPE_CHANGED,
        FILTER_TYPE_CHANGED,
    ];
}

/// Values accepted by the choice parameters.
pub mod choices {
    pub const REVERB_TYPES: &[&str] = &["Freeverb", "Moorer"];
    pub const FILTER_TYPES: &[&str] = &["LowPass", "HighPass", "BandPass", "Off"];
    pub const PRESETS: &[&str] = &[
        "Accordion",
        "AltoSax",
        "Bandoneon",
        "Brass1",
        "Brass2",
        "BrassEnsemble",
        "Cello",
        "ChurchOrgan",
        "Clarinet",
        "ElecOrgan1",
        "ElecOrgan2",
        "ElecOrgan3",
        "ElecOrgan4",
        "Flute",
        "FrenchHorn1",
        "FrenchHorn2",
        "Harmonica",
        "Harp",
        "Oboe",
        "Piccolo",
        "PipeOrgan",
        "Recorder",
        "ReedOrgan",
        "SopranoSax",
        "Soundtrack",
        "Strings1",
        "Strings2",
        "Strings3",
        "SynPad1",
        "SynPad2",
        "SynPad3",
        "TenorSax",
        "Trumpet",
        "Tuba",
        "Violin",
    ];
}

/// UI -> host instruction. Fire-and-forget: nothing correlates a command with
/// the notifications it may trigger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Command {
    Init,
    SetPreset { preset: String },
    SetGain { value: f32 },
    SetOutputGain { value: f32 },
    SetReverbDryWet { value: f32 },
    SetReverbType { preset: String },
    SetFilterType { preset: String },
}

impl Command {
    pub const KNOWN: &'static [&'static str] = &[
        "Init",
        "SetPreset",
        "SetGain",
        "SetOutputGain",
        "SetReverbDryWet",
        "SetReverbType",
        "SetFilterType",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Init => "Init",
            Command::SetPreset { .. } => "SetPreset",
            Command::SetGain { .. } => "SetGain",
            Command::SetOutputGain { .. } => "SetOutputGain",
            Command::SetReverbDryWet { .. } => "SetReverbDryWet",
            Command::SetReverbType { .. } => "SetReverbType",
            Command::SetFilterType { .. } => "SetFilterType",
        }
    }
}

/// A host-defined command outside the `Command` enum.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawCommand {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawCommand {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Map::new(),
        }
    }

    /// Adds a payload field. `type` is reserved for the tag and is ignored.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if name != "type" {
            self.fields.insert(name, value.into());
        }
        self
    }
}

/// Host -> UI state notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

impl Notification {
    pub fn new(kind: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Reads one delivered element. Anything that is not an object with a
    /// string `type` yields `None`; a missing `value` reads as `null`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut obj) = value else {
            return None;
        };
        let Some(Value::String(kind)) = obj.remove("type") else {
            return None;
        };
        Some(Self {
            kind,
            value: obj.remove("value").unwrap_or(Value::Null),
        })
    }
}

/// Splits one raw host delivery (a single message or an array of them) into
/// its elements, in order. Only a JSON syntax error fails; elements that are
/// not messages come back as `None`.
pub fn split_delivery(raw: &str) -> Result<Vec<Option<Notification>>, serde_json::Error> {
    let items = match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items,
        single => vec![single],
    };
    Ok(items.into_iter().map(Notification::from_value).collect())
}

/// What one host delivery may contain: a single notification or a batch.
///
/// This is the typed form the host emits. Receivers that must tolerate
/// foreign elements use [`split_delivery`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NotificationBatch {
    Many(Vec<Notification>),
    One(Notification),
}

impl NotificationBatch {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn len(&self) -> usize {
        match self {
            NotificationBatch::Many(items) => items.len(),
            NotificationBatch::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens into delivery order.
    pub fn into_vec(self) -> Vec<Notification> {
        match self {
            NotificationBatch::Many(items) => items,
            NotificationBatch::One(item) => vec![item],
        }
    }
}

impl From<Notification> for NotificationBatch {
    fn from(n: Notification) -> Self {
        NotificationBatch::One(n)
    }
}

impl From<Vec<Notification>> for NotificationBatch {
    fn from(items: Vec<Notification>) -> Self {
        NotificationBatch::Many(items)
    }
}
