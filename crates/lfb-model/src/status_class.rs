use serde::{Deserialize, Serialize};

/// Visual state of a build cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusClass {
    Running,
    Success,
    Failure,
    /// Unknown result, transport error, or not yet polled.
    #[default]
    None,
}

impl StatusClass {
    /// CSS class name used by the page.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Running => "running",
            StatusClass::Success => "success",
            StatusClass::Failure => "failure",
            StatusClass::None => "none",
        }
    }
}
