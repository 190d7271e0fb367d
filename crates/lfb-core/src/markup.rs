//! Cell and heading markup. Text from the CI server is escaped by askama.

use askama::Template;
use lfb_model::{Connectivity, Target};
use tracing::warn;

/// Link to one build of a builder.
#[derive(Template)]
#[template(
    source = "<a href='builders/{{ target }}/builds/{{ number }}'>{{ text }}</a>",
    ext = "html"
)]
pub struct BuildLink<'a> {
    pub target: &'a Target,
    pub number: i64,
    pub text: &'a str,
}

/// Link to a builder's page.
#[derive(Template)]
#[template(source = "<a href='builders/{{ target }}'>{{ text }}</a>", ext = "html")]
pub struct BuilderLink<'a> {
    pub target: &'a Target,
    pub text: &'a str,
}

/// Column heading, e.g. `x86<br />idle`.
#[derive(Template)]
#[template(source = "{{ arch }}<br />{{ connectivity.as_str() }}", ext = "html")]
pub struct HeadingText<'a> {
    pub arch: &'a str,
    pub connectivity: Connectivity,
}

/// Render to a string; a failed render yields an empty fragment.
pub fn render(template: &impl Template) -> String {
    template.render().unwrap_or_else(|e| {
        warn!("markup render failed: {e}");
        String::new()
    })
}
