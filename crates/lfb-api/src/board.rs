use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
};

use askama::Template;
use lfb_core::Renderer;
use lfb_model::{Connectivity, StatusClass, StatusMatrix, Target};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// In-memory status grid fed by the scheduler and read by the HTTP layer.
#[derive(Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<BoardInner>>,
}

#[derive(Default)]
struct BoardInner {
    matrix: StatusMatrix,
    headings: BTreeMap<String, HeadingView>,
    cells: HashMap<Target, CellView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingView {
    pub arch: String,
    /// Heading text as sent by the scheduler.
    pub text: String,
    pub connectivity: Connectivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub target: Target,
    pub html: String,
    pub class: StatusClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    pub project: String,
    /// One entry per column; `None` where the project has no builder.
    pub cells: Vec<Option<CellView>>,
}

/// Serializable copy of the whole grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub headings: Vec<HeadingView>,
    pub rows: Vec<RowView>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cell of `target`; laid out but not yet polled cells are blank.
    pub fn cell(&self, target: &Target) -> Option<CellView> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.cells.get(target).cloned().or_else(|| {
            inner
                .matrix
                .targets()
                .contains(target)
                .then(|| inner.cell(target))
        })
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        let headings = inner
            .matrix
            .archs
            .iter()
            .map(|arch| inner.heading(arch))
            .collect();

        let rows = inner
            .matrix
            .projects
            .iter()
            .map(|(project, archs)| RowView {
                project: project.clone(),
                cells: inner
                    .matrix
                    .archs
                    .iter()
                    .map(|arch| {
                        archs
                            .contains(arch)
                            .then(|| inner.cell(&Target::new(project, arch)))
                    })
                    .collect(),
            })
            .collect();

        BoardSnapshot { headings, rows }
    }

    /// Status table markup, one `<td id='<target>'>` per project and column.
    pub fn to_html(&self) -> Result<String, ApiError> {
        let snap = self.snapshot();
        let rows = table_rows(&snap);
        let table = StatusTable {
            headings: &snap.headings,
            rows: &rows,
        };
        Ok(table.render()?)
    }

    /// Whole status page, reloading itself every `refresh_secs`.
    pub fn page(&self, refresh_secs: u32) -> Result<String, ApiError> {
        let snap = self.snapshot();
        let rows = table_rows(&snap);
        let page = StatusPage {
            refresh_secs,
            headings: &snap.headings,
            rows: &rows,
        };
        Ok(page.render()?)
    }
}

struct TableCell {
    id: Target,
    class: &'static str,
    html: String,
    /// False where the project has no builder for the column.
    laid_out: bool,
}

struct TableRow {
    project: String,
    cells: Vec<TableCell>,
}

#[derive(Template)]
#[template(path = "table.html")]
struct StatusTable<'a> {
    headings: &'a [HeadingView],
    rows: &'a [TableRow],
}

#[derive(Template)]
#[template(path = "page.html")]
struct StatusPage<'a> {
    refresh_secs: u32,
    headings: &'a [HeadingView],
    rows: &'a [TableRow],
}

fn table_rows(snap: &BoardSnapshot) -> Vec<TableRow> {
    snap.rows
        .iter()
        .map(|row| TableRow {
            project: row.project.clone(),
            cells: snap
                .headings
                .iter()
                .zip(&row.cells)
                .map(|(heading, cell)| match cell {
                    Some(c) => TableCell {
                        id: c.target.clone(),
                        class: c.class.as_str(),
                        html: c.html.clone(),
                        laid_out: true,
                    },
                    None => TableCell {
                        id: Target::new(&row.project, &heading.arch),
                        class: "",
                        html: String::new(),
                        laid_out: false,
                    },
                })
                .collect(),
        })
        .collect()
}

impl BoardInner {
    fn heading(&self, arch: &str) -> HeadingView {
        self.headings.get(arch).cloned().unwrap_or_else(|| HeadingView {
            arch: arch.to_string(),
            text: format!("{arch}<br />unknown"),
            connectivity: Connectivity::Unknown,
        })
    }

    fn cell(&self, target: &Target) -> CellView {
        self.cells.get(target).cloned().unwrap_or_else(|| CellView {
            target: target.clone(),
            html: "&nbsp;".to_string(),
            class: StatusClass::None,
        })
    }
}

impl Renderer for StatusBoard {
    fn create_table(&self, matrix: &StatusMatrix) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let targets = matrix.targets();
        inner.cells.retain(|t, _| targets.contains(t));
        inner.headings.retain(|arch, _| matrix.archs.contains(arch));
        inner.matrix = matrix.clone();
    }

    fn update_heading(&self, arch: &str, text: &str, connectivity: Connectivity) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.headings.insert(
            arch.to_string(),
            HeadingView {
                arch: arch.to_string(),
                text: text.to_string(),
                connectivity,
            },
        );
    }

    fn update_cell(&self, target: &Target, html: &str, class: StatusClass) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.cells.insert(
            target.clone(),
            CellView {
                target: target.clone(),
                html: html.to_string(),
                class,
            },
        );
    }
}
