use serde::{Deserialize, Serialize};

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session, nothing shown yet
    Idle,
    /// Recognition session confirmed and capturing
    Listening,
    /// A query for the current turn is in flight
    Thinking,
    /// The recognizer reported an error for the current turn
    Error,
    /// The current turn's query settled; its result is on display
    Ready,
    /// No speech capability on this host. Terminal.
    Unsupported,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Listening => "listening",
            Phase::Thinking => "thinking",
            Phase::Error => "error",
            Phase::Ready => "ready",
            Phase::Unsupported => "unsupported",
        }
    }
}

/// Status shown next to the toggle control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum Status {
    Ready,
    Unsupported,
    Listening,
    Thinking,
    /// The recognition session closed
    Finished,
    /// Recognizer error code, shown verbatim
    RecognitionError(String),
    /// The query service reported (or caused) a failure
    QueryError,
    ReadyForNext,
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::RecognitionError(_) | Status::QueryError)
    }

    /// Render the status with the configured texts
    pub fn message(&self, messages: &StatusMessages) -> String {
        match self {
            Status::Ready => messages.ready.clone(),
            Status::Unsupported => messages.unsupported.clone(),
            Status::Listening => messages.listening.clone(),
            Status::Thinking => messages.thinking.clone(),
            Status::Finished => messages.finished.clone(),
            Status::RecognitionError(code) => messages.recognition_error.replace("{code}", code),
            Status::QueryError => messages.query_error.clone(),
            Status::ReadyForNext => messages.ready_for_next.clone(),
        }
    }
}

/// User-facing status texts. `recognition_error` may contain `{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMessages {
    pub ready: String,
    pub unsupported: String,
    pub listening: String,
    pub thinking: String,
    pub finished: String,
    pub recognition_error: String,
    pub query_error: String,
    pub ready_for_next: String,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            ready: "พร้อมรับคำสั่ง".to_string(),
            unsupported: "ระบบไม่รองรับการรู้จำเสียง".to_string(),
            listening: "กำลังฟังเสียงของคุณ...".to_string(),
            thinking: "AI กำลังคิดคำตอบ...".to_string(),
            finished: "ประมวลผลเสร็จสิ้น".to_string(),
            recognition_error: "เกิดข้อผิดพลาด: {code}".to_string(),
            query_error: "เกิดข้อผิดพลาด".to_string(),
            ready_for_next: "พร้อมรับคำสั่งใหม่".to_string(),
        }
    }
}
