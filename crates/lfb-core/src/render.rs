use lfb_model::{Connectivity, StatusClass, StatusMatrix, Target};

/// One-way sink for display updates.
///
/// Calls are fire-and-forget; the scheduler never reads anything back.
pub trait Renderer: Send + Sync {
    /// Lay out the grid. Called again whenever the discovered matrix changes.
    fn create_table(&self, matrix: &StatusMatrix);

    /// Column heading of an architecture, e.g. `"x86<br />idle"`.
    fn update_heading(&self, arch: &str, html: &str, connectivity: Connectivity);

    fn update_cell(&self, target: &Target, html: &str, class: StatusClass);
}
