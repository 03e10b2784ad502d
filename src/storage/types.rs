use crate::config::{Settings, SettingsLayer};
use crate::conversation::{ConversationWindow, Turn, TurnRole};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation of the record shape found on disk
///
/// Generations are told apart by the fields present: only the extended
/// shape carries `border`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    /// No border field; replies were always bordered
    Baseline,
    /// Current shape, written by every save
    Extended,
}

/// Current on-disk record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Short model key
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// System instructions
    pub instructions: String,
    /// Retained pairs
    pub retain: i64,
    /// Border toggle; read from a boolean or from 0/1
    #[serde(deserialize_with = "deserialize_border")]
    pub border: bool,
    /// Retained turns, oldest first
    pub messages: Vec<Turn>,
}

/// Record written before the border toggle existed
#[derive(Debug, Clone, Deserialize)]
struct BaselineRecord {
    model: String,
    temperature: f64,
    instructions: String,
    retain: i64,
    messages: Vec<Turn>,
}

impl From<BaselineRecord> for StateRecord {
    fn from(record: BaselineRecord) -> Self {
        StateRecord {
            model: record.model,
            temperature: record.temperature,
            instructions: record.instructions,
            retain: record.retain,
            border: true,
            messages: record.messages,
        }
    }
}

impl StateRecord {
    /// Record for the given settings and window, as written by a save
    pub fn new(settings: &Settings, window: &ConversationWindow) -> Self {
        StateRecord {
            model: settings.model.key().to_string(),
            temperature: settings.temperature,
            instructions: settings.instructions.clone(),
            retain: settings.retain as i64,
            border: settings.border,
            messages: window.turns().to_vec(),
        }
    }
}

fn deserialize_border<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BorderRepr {
        Flag(bool),
        Number(i64),
    }

    match BorderRepr::deserialize(deserializer)? {
        BorderRepr::Flag(flag) => Ok(flag),
        BorderRepr::Number(0) => Ok(false),
        BorderRepr::Number(1) => Ok(true),
        BorderRepr::Number(other) => Err(de::Error::custom(format!(
            "border must be 0 or 1, found {}",
            other
        ))),
    }
}

/// Accepted persisted state, split into settings and window
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    /// Shape the record was read from
    pub schema: RecordSchema,
    /// Persisted settings, still unvalidated
    pub settings: SettingsLayer,
    /// Persisted turns
    pub window: ConversationWindow,
}

impl From<(RecordSchema, StateRecord)> for PersistedState {
    fn from((schema, record): (RecordSchema, StateRecord)) -> Self {
        PersistedState {
            schema,
            settings: SettingsLayer {
                model: Some(record.model),
                temperature: Some(record.temperature),
                instructions: Some(record.instructions),
                retain: Some(record.retain),
                border: Some(record.border),
            },
            window: ConversationWindow::from_turns(record.messages),
        }
    }
}

/// Why no persisted state was adopted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentReason {
    /// No file at the state path
    Missing,
    /// The file exists but could not be read
    Unreadable(String),
    /// The file was read but is not a valid record
    Corrupt(String),
}

impl fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no state file"),
            Self::Unreadable(e) => write!(f, "state file unreadable: {}", e),
            Self::Corrupt(e) => write!(f, "state file corrupt: {}", e),
        }
    }
}

/// Result of loading the state file
///
/// Either the whole record is adopted or none of it is.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A valid record was found
    Loaded(PersistedState),
    /// Proceed with compiled-in defaults and an empty window
    Absent(AbsentReason),
}

impl LoadOutcome {
    /// Splits the outcome into the persisted settings layer (if any) and the window
    pub fn into_parts(self) -> (Option<SettingsLayer>, ConversationWindow) {
        match self {
            Self::Loaded(state) => (Some(state.settings), state.window),
            Self::Absent(_) => (None, ConversationWindow::new()),
        }
    }
}

/// Parse and validate a raw record
///
/// Returns a description of the first problem found when the bytes are not a
/// record of either generation, or when its messages are not whole
/// user/assistant pairs.
pub(crate) fn parse_record(bytes: &[u8]) -> Result<PersistedState, String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    let has_border = value
        .as_object()
        .ok_or_else(|| "record is not a JSON object".to_string())?
        .contains_key("border");

    let (schema, record) = if has_border {
        let record: StateRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
        (RecordSchema::Extended, record)
    } else {
        let record: BaselineRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
        (RecordSchema::Baseline, StateRecord::from(record))
    };

    check_pairs(&record.messages)?;
    Ok((schema, record).into())
}

/// Messages must be complete user/assistant pairs, user first
fn check_pairs(turns: &[Turn]) -> Result<(), String> {
    if turns.len() % 2 != 0 {
        return Err(format!(
            "messages hold {} entries, expected whole user/assistant pairs",
            turns.len()
        ));
    }

    for (index, turn) in turns.iter().enumerate() {
        let expected = if index % 2 == 0 {
            TurnRole::User
        } else {
            TurnRole::Assistant
        };
        if turn.role != expected {
            return Err(format!(
                "message {} has role {:?}, expected {:?}",
                index, turn.role, expected
            ));
        }
    }

    Ok(())
}
