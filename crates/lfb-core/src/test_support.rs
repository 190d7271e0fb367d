use std::sync::Mutex;

use lfb_model::{Connectivity, StatusClass, StatusMatrix, Target};

use crate::render::Renderer;

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Table(StatusMatrix),
    Heading(String, String, Connectivity),
    Cell(Target, String, StatusClass),
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub log: Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    pub fn take(&self) -> Vec<Rendered> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub fn last_cell(&self, target: &Target) -> Option<(String, StatusClass)> {
        self.log.lock().unwrap().iter().rev().find_map(|r| match r {
            Rendered::Cell(t, html, class) if t == target => Some((html.clone(), *class)),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn create_table(&self, matrix: &StatusMatrix) {
        self.log.lock().unwrap().push(Rendered::Table(matrix.clone()));
    }

    fn update_heading(&self, arch: &str, html: &str, connectivity: Connectivity) {
        self.log
            .lock()
            .unwrap()
            .push(Rendered::Heading(arch.into(), html.into(), connectivity));
    }

    fn update_cell(&self, target: &Target, html: &str, class: StatusClass) {
        self.log
            .lock()
            .unwrap()
            .push(Rendered::Cell(target.clone(), html.into(), class));
    }
}
