//! Adaptive polling scheduler for the build status dashboard.
//!
//! Each build target gets at most one pending refresh timer. Refresh
//! requests are coalesced by [`RefreshCoalescer`], the delay is picked by
//! [`BuildPoller`] from the observed build state, and [`Dashboard`] drives
//! the whole thing from a single event loop.

pub mod error;
pub use error::{CoreError, FetchError};

pub mod clock;
pub use clock::{Clock, ManualClock, WallClock};

pub mod timer;
pub use timer::{TimerHandle, TimerQueue};

pub mod coalescer;
pub use coalescer::{PendingTimer, RefreshCoalescer, RefreshDecision};

pub mod describe;
pub use describe::describe;

pub mod policy;
pub use policy::{DashboardConfig, PollPolicy};

pub mod fetch;
pub use fetch::{InventoryFetcher, StatusFetcher};

pub mod render;
pub use render::Renderer;

pub mod markup;

pub mod poller;
pub use poller::{BuildPoller, CellUpdate, PollOutcome};

pub mod dashboard;
pub use dashboard::Dashboard;

#[cfg(test)]
mod test_support;
