use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
    time::Duration,
};

use lfb_model::{BuildStatusSnapshot, Inventory, RawInventoryPayload, StatusMatrix, Target};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    clock::Clock,
    coalescer::RefreshCoalescer,
    error::{CoreError, FetchError},
    fetch::{InventoryFetcher, StatusFetcher},
    poller::BuildPoller,
    policy::DashboardConfig,
    markup::{self, HeadingText},
    render::Renderer,
};

enum Completion {
    Build(Target, Result<BuildStatusSnapshot, FetchError>),
    Inventory(Result<RawInventoryPayload, FetchError>),
}

/// Owns the scheduler state and runs the single event loop.
///
/// All state changes happen on the loop: fetches run as tasks, but their
/// results are applied here one at a time.
pub struct Dashboard {
    config: DashboardConfig,
    clock: Arc<dyn Clock>,
    poller: BuildPoller,
    renderer: Arc<dyn Renderer>,
    status: Arc<dyn StatusFetcher>,
    inventory: Arc<dyn InventoryFetcher>,

    matrix: Option<StatusMatrix>,
    known: BTreeSet<Target>,
    in_flight: HashSet<Target>,
    /// `None` while an inventory fetch is outstanding.
    next_inventory_at: Option<u64>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn Renderer>,
        status: Arc<dyn StatusFetcher>,
        inventory: Arc<dyn InventoryFetcher>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let coalescer = RefreshCoalescer::new(Arc::clone(&clock));
        let poller = BuildPoller::new(
            coalescer,
            Arc::clone(&renderer),
            Arc::clone(&clock),
            config.policy.clone(),
        );
        let next_inventory_at = Some(clock.now_ms());

        Ok(Self {
            config,
            clock,
            poller,
            renderer,
            status,
            inventory,
            matrix: None,
            known: BTreeSet::new(),
            in_flight: HashSet::new(),
            next_inventory_at,
        })
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// Fetches carry no timeout of their own; a fetch that never completes
    /// stalls its target's polling until shutdown.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut tasks: JoinSet<Completion> = JoinSet::new();
        info!(
            agent_prefix = %self.config.agent_prefix,
            "dashboard event loop started"
        );

        loop {
            self.dispatch(&mut tasks);
            let wait = self
                .next_deadline()
                .map(|at| Duration::from_millis(at.saturating_sub(self.clock.now_ms())));

            tokio::select! {
                _ = shutdown.cancelled() => break,
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                    Ok(done) => self.complete(done),
                    Err(e) => error!("fetch task aborted: {e}"),
                },
                _ = sleep_for(wait) => {}
            }
        }

        self.poller.coalescer_mut().cancel_all();
        tasks.abort_all();
        info!("dashboard event loop stopped");
    }

    fn dispatch(&mut self, tasks: &mut JoinSet<Completion>) {
        for target in self.due_targets() {
            let fetcher = Arc::clone(&self.status);
            tasks.spawn(async move {
                let result = fetcher.fetch_latest_build(&target).await;
                Completion::Build(target, result)
            });
        }

        if self.inventory_due() {
            self.next_inventory_at = None;
            let fetcher = Arc::clone(&self.inventory);
            tasks.spawn(async move { Completion::Inventory(fetcher.fetch_inventory().await) });
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Build(target, result) => self.apply_build_result(&target, result),
            Completion::Inventory(Ok(payload)) => {
                self.apply_inventory(&payload);
                self.schedule_next_inventory();
            }
            Completion::Inventory(Err(e)) => {
                warn!("inventory fetch failed: {e}");
                self.schedule_next_inventory();
            }
        }
    }

    fn schedule_next_inventory(&mut self) {
        let every = u64::try_from(self.config.policy.inventory_interval.as_millis())
            .unwrap_or(u64::MAX);
        self.next_inventory_at = Some(self.clock.now_ms().saturating_add(every));
    }

    /// Fold one inventory report into the display and the schedule.
    ///
    /// Running builds are polled right away. Targets seen for the first time
    /// get a staggered first poll. Known targets that are suspended (failed,
    /// unknown) stay unpolled until an agent reports them running.
    #[instrument(level = "debug", skip_all, fields(agents = payload.len()))]
    pub fn apply_inventory(&mut self, payload: &RawInventoryPayload) {
        let inventory = Inventory::from_raw(payload, &self.config.agent_prefix);
        let matrix = StatusMatrix::from_inventory(&inventory);

        if self.matrix.as_ref() != Some(&matrix) {
            debug!(
                archs = matrix.archs.len(),
                projects = matrix.projects.len(),
                "laying out status table"
            );
            self.renderer.create_table(&matrix);
        }

        for agent in &inventory.agents {
            let html = markup::render(&HeadingText {
                arch: &agent.arch,
                connectivity: agent.connectivity,
            });
            self.renderer
                .update_heading(&agent.arch, &html, agent.connectivity);
        }

        for target in inventory.running_targets() {
            if self.in_flight.contains(target) {
                continue;
            }
            self.known.insert(target.clone());
            let decision = self.poller.refresh_now(target);
            debug!(builder = %target, ?decision, "build running, refreshing");
        }

        let targets = matrix.targets();
        let discovered: Vec<&Target> = targets
            .iter()
            .filter(|t| {
                !self.known.contains(*t)
                    && !self.in_flight.contains(*t)
                    && !self.poller.coalescer().is_pending(t)
            })
            .collect();
        let armed = self.poller.stagger(discovered);
        if armed > 0 {
            debug!(armed, "first polls armed for discovered targets");
        }

        self.known.extend(targets);
        self.matrix = Some(matrix);
    }

    /// Targets whose timer fired; each is marked in flight.
    pub fn due_targets(&mut self) -> Vec<Target> {
        let due: Vec<Target> = self
            .poller
            .coalescer_mut()
            .take_due()
            .into_iter()
            .filter(|t| !self.in_flight.contains(t))
            .collect();
        for target in &due {
            debug!(builder = %target, "fetching build status");
            self.in_flight.insert(target.clone());
        }
        due
    }

    pub fn apply_build_result(
        &mut self,
        target: &Target,
        result: Result<BuildStatusSnapshot, FetchError>,
    ) {
        self.in_flight.remove(target);
        self.poller.on_result(target, result);
    }

    pub fn inventory_due(&self) -> bool {
        self.next_inventory_at
            .is_some_and(|at| at <= self.clock.now_ms())
    }

    /// Earliest moment the loop has something to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.poller.coalescer().next_deadline(), self.next_inventory_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn poller(&self) -> &BuildPoller {
        &self.poller
    }

    pub fn is_in_flight(&self, target: &Target) -> bool {
        self.in_flight.contains(target)
    }

    /// Every target discovered so far.
    pub fn known_targets(&self) -> &BTreeSet<Target> {
        &self.known
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}
