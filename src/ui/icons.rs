use crate::contract::Status;

pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const DATABASE: &str = "🗄️";
    pub const NEW: &str = "✨";
    pub const MOD: &str = "📝";
    pub const DEL: &str = "🗑️";
    pub const EMPTY: &str = "∅";
    pub const TODO: &str = "⬜";
    pub const DOING: &str = "⏳";
    pub const DONE: &str = "✔️";

    pub fn status(status: Status) -> &'static str {
        match status {
            Status::Todo => Self::TODO,
            Status::InProgress => Self::DOING,
            Status::Done => Self::DONE,
        }
    }
}
