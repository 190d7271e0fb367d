use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use lfb_core::{FetchError, InventoryFetcher, Renderer, StatusFetcher};
use lfb_model::{
    BuildStatusSnapshot, Connectivity, RawInventoryPayload, StatusClass, StatusMatrix, Target,
};
use tokio::time::Instant;

pub type Responder = dyn Fn(usize) -> Result<BuildStatusSnapshot, FetchError> + Send + Sync;

/// Status fetcher answering from a closure of the call index; records call offsets.
pub struct ScriptedStatus {
    start: Instant,
    respond: Box<Responder>,
    pub calls: Mutex<Vec<(Target, Duration)>>,
}

impl ScriptedStatus {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize) -> Result<BuildStatusSnapshot, FetchError> + Send + Sync + 'static,
    {
        Self {
            start: Instant::now(),
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_offsets_ms(&self) -> Vec<u128> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| at.as_millis())
            .collect()
    }
}

#[async_trait]
impl StatusFetcher for ScriptedStatus {
    async fn fetch_latest_build(&self, target: &Target) -> Result<BuildStatusSnapshot, FetchError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((target.clone(), self.start.elapsed()));
            calls.len() - 1
        };
        (self.respond)(index)
    }
}

pub struct StaticInventory {
    payload: RawInventoryPayload,
    pub calls: Mutex<usize>,
}

impl StaticInventory {
    pub fn new(json: &str) -> Self {
        Self {
            payload: serde_json::from_str(json).unwrap(),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl InventoryFetcher for StaticInventory {
    async fn fetch_inventory(&self) -> Result<RawInventoryPayload, FetchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.payload.clone())
    }
}

#[derive(Default)]
pub struct CellBoard {
    pub cells: Mutex<HashMap<Target, (String, StatusClass)>>,
    pub headings: Mutex<HashMap<String, Connectivity>>,
}

impl Renderer for CellBoard {
    fn create_table(&self, _matrix: &StatusMatrix) {}

    fn update_heading(&self, arch: &str, _html: &str, connectivity: Connectivity) {
        self.headings
            .lock()
            .unwrap()
            .insert(arch.to_string(), connectivity);
    }

    fn update_cell(&self, target: &Target, html: &str, class: StatusClass) {
        self.cells
            .lock()
            .unwrap()
            .insert(target.clone(), (html.to_string(), class));
    }
}

pub const ONE_BUILDER: &str = r#"{
    "lfbuild-x86": {"connected": true, "runningBuilds": [], "builders": {"proj-x86": {}}}
}"#;

pub fn arc<T>(v: T) -> Arc<T> {
    Arc::new(v)
}
