use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of one pollable build configuration, `"<project>-<architecture>"`.
///
/// The same string is the upstream builder name and the id of the rendered cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Build the key for `project` on `arch`.
    pub fn new(project: &str, arch: &str) -> Self {
        Self(format!("{project}-{arch}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_project_and_arch() {
        let t = Target::new("lsb-sdk", "x86_64");
        assert_eq!(t.as_str(), "lsb-sdk-x86_64");
        assert_eq!(t, Target::from("lsb-sdk-x86_64"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Target::from("a-b")).unwrap();
        assert_eq!(json, r#""a-b""#);
    }
}
