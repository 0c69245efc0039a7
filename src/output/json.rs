//! JSON output formatting

use serde::Serialize;

use crate::error::{ReportError, Result};

pub fn format_json<T: Serialize + ?Sized>(document: &T) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(|e| ReportError::Serialization(e.to_string()))
}
