use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::result::InteractionResult;
use super::status::{Phase, Status};

/// Read-only view of the controller handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rendered status text
    pub status: String,

    /// Status the text was rendered from
    pub status_kind: Status,

    pub phase: Phase,

    /// Whether a recognition session is confirmed and capturing
    pub listening: bool,

    /// Identifier of the current turn (0 before the first start)
    pub turn: u64,

    /// True while the current turn still has a session open or a query in flight
    pub busy: bool,

    pub result: InteractionResult,

    /// When this snapshot was taken
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Whether turn `turn` has run to completion
    pub fn turn_settled(&self, turn: u64) -> bool {
        self.phase == Phase::Unsupported || (self.turn == turn && !self.busy)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.status)?;

        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }

        let transcript = present(&self.result.transcript).unwrap_or("\"...\"");
        writeln!(f, "ข้อความที่คุณพูด: {}", transcript)?;

        match (present(&self.result.answer), present(&self.result.error)) {
            (Some(answer), _) => write!(f, "คำตอบจาก AI: {}", answer),
            (None, Some(error)) => write!(f, "คำตอบจาก AI: ✗ {}", error),
            (None, None) => write!(f, "คำตอบจาก AI: \"รอคำถามของคุณ...\""),
        }
    }
}
