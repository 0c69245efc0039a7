//! YAML output formatting

use serde::Serialize;

use crate::error::{ReportError, Result};

pub fn format_yaml<T: Serialize + ?Sized>(document: &T) -> Result<String> {
    serde_yaml::to_string(document)
        .map(|s| s.trim_end_matches('\n').to_string())
        .map_err(|e| ReportError::Serialization(e.to_string()))
}
