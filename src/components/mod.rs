pub mod templates;

pub use templates::{Render, TemplateComponent, View, ViewData};
