//! Per-client repository layout and lead-record lookup.
//!
//! A client repo is a directory named after the (sanitized) company,
//! holding a `_dossier/` with the lead-input record, a `latest/` folder and
//! a `runs/` folder. This crate lays that structure out and resolves
//! company names from lead records found near a markdown source file.

mod layout;
mod lead;

pub use layout::{
    ClientRepo, RepoError, ensure_client_repo, sanitize_folder_name, DOSSIER_DIR,
    FALLBACK_FOLDER_NAME, LATEST_DIR, LEAD_INPUT_FILE, RUNS_DIR,
};
pub use lead::{LeadRecord, resolve_company_name};
