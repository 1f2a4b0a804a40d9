//! Wire shapes of the intent-recognition response (Lex V2 runtime).
//!
//! Only the parts the query pipeline descends into are modeled:
//! `sessionState.intent.slots`. Slots may be null, scalar-valued, or
//! multi-valued; everything else in the response is ignored.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeTextResponse {
    #[serde(default)]
    pub session_state: SessionState,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub intent: Option<Intent>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub name: Option<String>,

    /// Slot name to slot. Unfilled slots arrive as explicit nulls.
    #[serde(default)]
    pub slots: HashMap<String, Option<Slot>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Slot {
    /// Present on scalar slots.
    #[serde(default)]
    pub value: Option<SlotValue>,

    /// Present on multi-valued (List shape) slots.
    #[serde(default)]
    pub values: Vec<Slot>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
    #[serde(default)]
    pub interpreted_value: Option<String>,
}
