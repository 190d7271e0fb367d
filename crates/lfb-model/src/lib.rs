mod target;
pub use target::Target;

mod build;
pub use build::{BuildStatusSnapshot, RawBuild, RawStep};

mod inventory;
pub use inventory::{Agent, Connectivity, Inventory, RawAgent, RawInventoryPayload, RawRunningBuild};

mod matrix;
pub use matrix::StatusMatrix;

mod status_class;
pub use status_class::StatusClass;

mod error;
pub use error::ModelError;

/// Agent name prefix used by the build farm (`lfbuild-<arch>`).
pub const DEFAULT_AGENT_PREFIX: &str = "lfbuild";
