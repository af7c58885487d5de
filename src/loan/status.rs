use std::fmt;

use serde::{Deserialize, Serialize};

/// Presentation category for a loan's status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    OnTime,
    Late,
    Defaulted,
    Unpaid,
}

impl StatusClass {
    pub fn css_class(self) -> &'static str {
        match self {
            StatusClass::OnTime => "on-time-loan",
            StatusClass::Late => "late-loan",
            StatusClass::Defaulted => "defaulted-loan",
            StatusClass::Unpaid => "unpaid-loan",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Exact, case-sensitive match. Anything unrecognised (including `"Unpaid"`
/// and the empty string) is [`StatusClass::Unpaid`].
pub fn status_class(status: &str) -> StatusClass {
    match status {
        "On Time" => StatusClass::OnTime,
        "Late" => StatusClass::Late,
        "Defaulted" => StatusClass::Defaulted,
        _ => StatusClass::Unpaid,
    }
}
