use serde::{Deserialize, Serialize};

/// Events emitted while a session runs.
/// The CLI drains these to log the action trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A query was handed to a new session
    TurnStart { query: String },

    /// The tool-selection reply arrived
    ModelReply { proposed_calls: usize },

    /// A proposed call is about to execute
    ActionStart { call_id: String, action: String, arguments: String },

    /// A proposed call produced its outcome
    ActionEnd { call_id: String, action: String, success: bool, content: String },

    /// Final natural-language answer
    Summary { text: String },

    /// The session finished, successfully or not
    TurnEnd,

    /// The model endpoint failed and the turn was aborted
    Error { message: String },
}
