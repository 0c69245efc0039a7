//! Output formatting module

pub mod formatter;
pub mod human;
pub mod json;
pub mod yaml;

pub use formatter::{format_document, format_rows, Document, OutputFormat};
pub use human::TableStyle;
