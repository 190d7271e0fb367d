use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Target;

/// Payload of `json/slaves/`: agent name to agent report.
pub type RawInventoryPayload = BTreeMap<String, RawAgent>;

/// One agent entry as reported by the CI server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAgent {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub running_builds: Vec<RawRunningBuild>,
    /// Keyed by builder name; values are not inspected.
    #[serde(default)]
    pub builders: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRunningBuild {
    pub builder_name: String,
}

/// Connectivity summary shown in an architecture heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Connectivity {
    Offline,
    Idle,
    Running,
    /// Heading laid out but no inventory report applied yet.
    #[default]
    Unknown,
}

impl Connectivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Offline => "offline",
            Connectivity::Idle => "idle",
            Connectivity::Running => "running",
            Connectivity::Unknown => "unknown",
        }
    }
}

/// A recognised build agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub name: String,
    pub arch: String,
    pub connectivity: Connectivity,
    pub builders: Vec<String>,
    /// Targets with a build in progress on this agent.
    pub running: Vec<Target>,
}

/// Validated view of the agent inventory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub agents: Vec<Agent>,
}

impl Inventory {
    /// Keep agents named `<prefix><sep><arch>`; everything else is ignored.
    ///
    /// The separator is any single character, matching the farm naming scheme
    /// (`lfbuild-x86`, `lfbuild_ia64`).
    pub fn from_raw(payload: &RawInventoryPayload, prefix: &str) -> Self {
        let agents = payload
            .iter()
            .filter_map(|(name, raw)| {
                let arch = arch_of(name, prefix)?;
                Some(Agent {
                    name: name.clone(),
                    arch: arch.to_string(),
                    connectivity: connectivity_of(raw),
                    builders: raw.builders.keys().cloned().collect(),
                    running: raw
                        .running_builds
                        .iter()
                        .map(|b| Target::from(b.builder_name.as_str()))
                        .collect(),
                })
            })
            .collect();

        Self { agents }
    }

    /// Targets with a build in progress, across all connected agents.
    pub fn running_targets(&self) -> impl Iterator<Item = &Target> {
        self.agents
            .iter()
            .filter(|a| a.connectivity == Connectivity::Running)
            .flat_map(|a| a.running.iter())
    }
}

fn arch_of<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    chars.next()?;
    let arch = chars.as_str();
    (!arch.is_empty()).then_some(arch)
}

fn connectivity_of(raw: &RawAgent) -> Connectivity {
    if !raw.connected {
        Connectivity::Offline
    } else if raw.running_builds.is_empty() {
        Connectivity::Idle
    } else {
        Connectivity::Running
    }
}
