//! The loader template, compiled into the binary so packaging needs no
//! files besides the source database.

/// JavaScript skeleton every artifact is rendered from.
/// Placeholders are `{{NAME}}` tokens, see `template::render`.
pub const LOADER_TEMPLATE: &str = include_str!("assets/loader.js.tmpl");

pub fn loader_template() -> &'static str {
    LOADER_TEMPLATE
}
