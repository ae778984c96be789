//! Lead-record lookup.
//!
//! A lead record is a JSON object describing a client. The company name is
//! resolved by walking upward from the markdown source's directory, checking
//! `lead_input.json` and `_dossier/lead_input.json` at each level. Every
//! failure along the way (missing file, unreadable, malformed JSON, wrong
//! shape) skips to the next candidate; the lookup never errors.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layout::{DOSSIER_DIR, LEAD_INPUT_FILE};

/// Keys checked for the company name, in priority order.
const COMPANY_KEYS: &[&str] = &["company_name", "client", "company"];

/// A lead-input record, as written into a fresh client dossier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl LeadRecord {
    /// A record naming one company.
    #[must_use]
    pub fn for_company(name: impl Into<String>) -> Self {
        Self {
            company_name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Resolve the company name for a markdown source file.
///
/// Returns the first non-empty company value found in any candidate lead
/// record, or `None` when no usable record exists. Best effort: failures
/// are logged at debug level and skipped, never surfaced.
#[must_use]
pub fn resolve_company_name(markdown_path: &Path) -> Option<String> {
    for candidate in candidate_paths(markdown_path) {
        if let Some(name) = company_from_record(&candidate) {
            return Some(name);
        }
    }
    None
}

/// Ordered, deduplicated candidate record paths: `lead_input.json` and
/// `_dossier/lead_input.json` in the markdown file's directory and each
/// ancestor.
fn candidate_paths(markdown_path: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for dir in markdown_path.parent().into_iter().flat_map(Path::ancestors) {
        for path in [
            dir.join(LEAD_INPUT_FILE),
            dir.join(DOSSIER_DIR).join(LEAD_INPUT_FILE),
        ] {
            if seen.insert(path.clone()) {
                candidates.push(path);
            }
        }
    }
    candidates
}

/// Read one candidate record, tolerating every failure mode.
///
/// Keys are checked individually against the untyped JSON so a record with
/// one malformed field can still resolve through another key.
fn company_from_record(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "skipping unreadable lead record");
            return None;
        }
    };
    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "skipping malformed lead record");
            return None;
        }
    };
    let record = value.as_object()?;
    for key in COMPANY_KEYS {
        if let Some(name) = record.get(*key).and_then(Value::as_str) {
            let name = name.trim();
            if !name.is_empty() {
                return Some(name.to_owned());
            }
        }
    }
    None
}
