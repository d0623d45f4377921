use serde::{Deserialize, Serialize};

/// Longest description, in bytes, that `ops::add_task` will admit.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub done: bool,
}

impl Task {
    /// Returns display icon: x=done, .=pending
    pub fn icon(&self) -> &'static str {
        if self.done {
            "x"
        } else {
            "."
        }
    }
}

/// Status filter for `ops::list_tasks`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Done,
    Pending,
}

impl StatusFilter {
    /// Unrecognized names fall back to `All`.
    pub fn from_name(s: &str) -> Self {
        match s {
            "done" => Self::Done,
            "pending" => Self::Pending,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Done => "done",
            Self::Pending => "pending",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Done => task.done,
            Self::Pending => !task.done,
        }
    }
}
