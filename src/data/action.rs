/// Action kinds carried by a command envelope
use std::fmt;
use std::str::FromStr;

/// What an envelope asks the receiving side to do.
///
/// Codes outside the known range decode to `Unknown` so that the
/// dispatcher can answer them with a warning instead of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read a named property
    GetProperty,
    /// Write a named property
    SetProperty,
    /// Invoke a named function
    CallFunction,
    /// Outbound notification (property changes, seeks, ...)
    SendSignal,
    /// Any code this side does not understand
    Unknown(i64),
}

impl Action {
    /// Integer code used on the wire
    pub fn code(&self) -> i64 {
        match self {
            Action::GetProperty => 0,
            Action::SetProperty => 1,
            Action::CallFunction => 2,
            Action::SendSignal => 3,
            Action::Unknown(code) => *code,
        }
    }

    /// Decode a wire code; never fails
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Action::GetProperty,
            1 => Action::SetProperty,
            2 => Action::CallFunction,
            3 => Action::SendSignal,
            other => Action::Unknown(other),
        })
    }

    /// Whether this action can be dispatched against a registered object
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Action::GetProperty | Action::SetProperty | Action::CallFunction)
    }
}

impl_code_serde!(Action, "action");

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::GetProperty => write!(f, "get_property"),
            Action::SetProperty => write!(f, "set_property"),
            Action::CallFunction => write!(f, "call_function"),
            Action::SendSignal => write!(f, "send_signal"),
            Action::Unknown(code) => write!(f, "{}", code),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" | "get_property" => Ok(Action::GetProperty),
            "set" | "set_property" => Ok(Action::SetProperty),
            "call" | "call_function" => Ok(Action::CallFunction),
            "signal" | "send_signal" => Ok(Action::SendSignal),
            other => other
                .parse::<i64>()
                .map(|code| Action::from_code(code).unwrap_or(Action::Unknown(code)))
                .map_err(|_| format!("Unknown action '{}'", s)),
        }
    }
}
