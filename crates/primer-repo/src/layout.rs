//! Client directory layout.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Characters that cannot appear in a directory name on common filesystems.
static INVALID_FOLDER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("invalid folder-name pattern"));

/// Upper bound on a generated folder name.
const MAX_FOLDER_NAME_LEN: usize = 80;

/// Folder name used when sanitization leaves nothing.
pub const FALLBACK_FOLDER_NAME: &str = "unknown_company";

/// Dossier subfolder holding the lead-input record.
pub const DOSSIER_DIR: &str = "_dossier";

/// Lead-input record filename.
pub const LEAD_INPUT_FILE: &str = "lead_input.json";

/// Folder holding the most recent deliverables.
pub const LATEST_DIR: &str = "latest";

/// Folder holding per-run outputs.
pub const RUNS_DIR: &str = "runs";

/// Errors raised while laying out a client repository.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Paths of one client's repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientRepo {
    pub root: PathBuf,
    pub dossier_dir: PathBuf,
    pub lead_input_path: PathBuf,
    pub latest_dir: PathBuf,
    pub runs_dir: PathBuf,
}

/// Turn a company name into a safe directory name.
///
/// Strips characters illegal in a directory name, collapses internal
/// whitespace, trims trailing spaces and periods, and truncates to
/// [`MAX_FOLDER_NAME_LEN`] characters (re-trimming after the cut). May
/// return an empty string; callers substitute [`FALLBACK_FOLDER_NAME`].
#[must_use]
pub fn sanitize_folder_name(name: &str) -> String {
    let cleaned = INVALID_FOLDER_CHARS.replace_all(name, "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches([' ', '.']);
    if trimmed.chars().count() <= MAX_FOLDER_NAME_LEN {
        return trimmed.to_owned();
    }
    let shortened: String = trimmed.chars().take(MAX_FOLDER_NAME_LEN).collect();
    shortened.trim_end_matches([' ', '.']).to_owned()
}

/// Create (or reuse) the client repository for `company_name` under
/// `base_dir` and return its paths.
///
/// Creation is idempotent; existing directories are left as they are.
pub fn ensure_client_repo(base_dir: &Path, company_name: &str) -> Result<ClientRepo, RepoError> {
    let folder_name = match sanitize_folder_name(company_name) {
        name if name.is_empty() => FALLBACK_FOLDER_NAME.to_owned(),
        name => name,
    };
    let root = base_dir.join(folder_name);
    let dossier_dir = root.join(DOSSIER_DIR);
    let repo = ClientRepo {
        lead_input_path: dossier_dir.join(LEAD_INPUT_FILE),
        latest_dir: root.join(LATEST_DIR),
        runs_dir: root.join(RUNS_DIR),
        dossier_dir,
        root,
    };

    for dir in [
        &repo.root,
        &repo.dossier_dir,
        &repo.latest_dir,
        &repo.runs_dir,
    ] {
        fs::create_dir_all(dir).map_err(|source| RepoError::Io {
            path: dir.clone(),
            source,
        })?;
    }
    tracing::debug!(root = %repo.root.display(), "client repo ready");
    Ok(repo)
}
