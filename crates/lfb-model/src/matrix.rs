use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Inventory, Target};

/// Project × architecture layout of the status grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMatrix {
    /// Column order, one per recognised agent.
    pub archs: Vec<String>,
    /// Row per project, with the architectures that build it.
    pub projects: BTreeMap<String, BTreeSet<String>>,
}

impl StatusMatrix {
    /// Builder names are `<project>-<suffix>`; the project is everything before the last `-`.
    ///
    /// A builder is placed in the column of the agent hosting it.
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut matrix = StatusMatrix::default();

        for agent in &inventory.agents {
            if !matrix.archs.contains(&agent.arch) {
                matrix.archs.push(agent.arch.clone());
            }
            for builder in &agent.builders {
                let Some((project, _)) = builder.rsplit_once('-') else {
                    continue;
                };
                matrix
                    .projects
                    .entry(project.to_string())
                    .or_default()
                    .insert(agent.arch.clone());
            }
        }
        matrix
    }

    /// Every populated cell, row by row in column order.
    pub fn targets(&self) -> Vec<Target> {
        self.projects
            .iter()
            .flat_map(|(project, archs)| {
                self.archs
                    .iter()
                    .filter(move |arch| archs.contains(*arch))
                    .map(move |arch| Target::new(project, arch))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
