//! Repository ingestion: shallow clone plus bounded tree concatenation.
//!
//! A repo reference is normalized (an `owner/repo` shorthand becomes a
//! GitHub URL, a missing `.git` suffix is appended) and cloned shallowly
//! into a cache directory keyed by a stable hash of the normalized URL.
//! Repeat ingestions of the same repository reuse the cached clone, with a
//! best-effort fast-forward pull to freshen it.
//!
//! The fetched tree is flattened into one text blob: build and dependency
//! directories are skipped, only recognizably textual files are read, each
//! file is prefixed with its relative path, oversized files are replaced by
//! a marker, and the whole blob is cut off once the character budget is
//! spent.
//!
//! Per the ingestion contract, clone failures surface as a diagnostic
//! `Error: ...` string, not as an error.

use crate::config::GitConfig;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use stackflow_core::error::Result as CoreResult;
use stackflow_core::RepoIngestor;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// File extensions read as code or text.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "java", "go", "rs", "rb", "php", "c", "cpp", "h", "hpp", "cs",
    "swift", "kt", "scala", "r", "html", "css", "scss", "sass", "less", "json", "yaml", "yml",
    "toml", "xml", "ini", "cfg", "md", "txt", "rst", "sh", "bash", "zsh", "bat", "ps1", "sql",
    "graphql",
];

/// Extensionless files still worth reading.
const SPECIAL_FILENAMES: &[&str] = &[
    "Dockerfile",
    "Makefile",
    "Procfile",
    ".gitignore",
    ".dockerignore",
    ".env.example",
];

/// Directories skipped entirely during the walk.
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    ".next",
    "dist",
    "build",
    ".venv",
    "venv",
    "env",
    ".tox",
    ".eggs",
    "vendor",
    "target",
    "out",
    "bin",
    "obj",
    ".idea",
    ".vscode",
    ".vs",
    "coverage",
    ".nyc_output",
    ".cache",
];

/// Git-backed repository ingestor.
#[derive(Clone)]
pub struct GitIngestor {
    config: GitConfig,
}

impl GitIngestor {
    /// Create an ingestor with the given configuration.
    pub fn new(config: GitConfig) -> Self {
        Self { config }
    }

    async fn clone_or_update(&self, url: &str) -> Result<PathBuf> {
        let repo_path = self.config.clone_dir.join(cache_key(url));

        if repo_path.exists() {
            // Refresh the cached clone; a failed pull just reuses it.
            let pull = Command::new("git")
                .args(["pull", "--ff-only"])
                .current_dir(&repo_path)
                .kill_on_drop(true)
                .output();
            match timeout(self.config.pull_timeout, pull).await {
                Ok(Ok(output)) if !output.status.success() => {
                    debug!(repo = %url, "pull failed, using cached clone");
                }
                Ok(Err(e)) => debug!(repo = %url, error = %e, "pull failed, using cached clone"),
                Err(_) => debug!(repo = %url, "pull timed out, using cached clone"),
                _ => {}
            }
            return Ok(repo_path);
        }

        fs::create_dir_all(&self.config.clone_dir)?;

        let clone = Command::new("git")
            .args(["clone", "--depth", "1", url])
            .arg(&repo_path)
            .kill_on_drop(true)
            .output();
        match timeout(self.config.clone_timeout, clone).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    Ok(repo_path)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    Err(CollaboratorError::Command(format!(
                        "failed to clone repository: {stderr}"
                    )))
                }
            }
            Ok(Err(e)) => Err(CollaboratorError::Io(e)),
            Err(_) => {
                let _ = fs::remove_dir_all(&repo_path);
                Err(CollaboratorError::Timeout(
                    "cloning timed out; the repository may be too large or the URL invalid".into(),
                ))
            }
        }
    }
}

#[async_trait]
impl RepoIngestor for GitIngestor {
    async fn fetch(&self, repo_ref: &str) -> CoreResult<String> {
        if repo_ref.trim().is_empty() {
            return Ok("Error: no repository URL provided.".to_string());
        }

        let url = normalize_repo_ref(repo_ref);
        debug!(repo = %url, "ingesting repository");

        let repo_path = match self.clone_or_update(&url).await {
            Ok(path) => path,
            Err(e) => {
                warn!(repo = %url, error = %e, "repository ingestion failed");
                return Ok(format!("Error: {e}"));
            }
        };

        let max_file_bytes = self.config.max_file_bytes;
        let max_context_chars = self.config.max_context_chars;
        let code = tokio::task::spawn_blocking(move || {
            read_repo_files(&repo_path, max_file_bytes, max_context_chars)
        })
        .await
        .map_err(|e| CollaboratorError::Command(format!("walk task failed: {e}")))
        .map_err(stackflow_core::StackflowError::from)?;

        if code.trim().is_empty() {
            return Ok("Warning: No code files found in the repository.".to_string());
        }
        Ok(code)
    }
}

/// Normalize a repo reference to a cloneable HTTPS address.
pub fn normalize_repo_ref(repo_ref: &str) -> String {
    let mut url = repo_ref.trim().to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("git@") {
        url = format!("https://github.com/{url}");
    }
    if !url.ends_with(".git") {
        url = format!("{}.git", url.trim_end_matches('/'));
    }
    url
}

/// Stable cache key for a normalized repository URL.
pub fn cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.trim().to_lowercase().as_bytes());
    digest
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<String>()
        .chars()
        .take(12)
        .collect()
}

/// Whether a file looks textual enough to include.
fn should_read_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if SPECIAL_FILENAMES.contains(&name) {
            return true;
        }
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CODE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Walk the tree rooted at `root` and concatenate readable files, each
/// prefixed with its relative path, within the character budget.
fn read_repo_files(root: &Path, max_file_bytes: u64, max_context_chars: usize) -> String {
    let mut parts = Vec::new();
    let mut total_chars = 0usize;
    walk_dir(
        root,
        root,
        max_file_bytes,
        max_context_chars,
        &mut parts,
        &mut total_chars,
    );
    parts.concat()
}

/// Returns `false` once the budget is exhausted and the walk should stop.
fn walk_dir(
    dir: &Path,
    root: &Path,
    max_file_bytes: u64,
    max_context_chars: usize,
    parts: &mut Vec<String>,
    total_chars: &mut usize,
) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return true;
    };

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !SKIP_DIRS.contains(&name.as_ref()) {
                dirs.push(path);
            }
        } else {
            files.push(path);
        }
    }
    files.sort();
    dirs.sort();

    for path in files {
        if !should_read_file(&path) {
            continue;
        }
        let rel = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .display()
            .to_string();

        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if size > max_file_bytes {
            parts.push(format!("\n--- FILE: {rel} ---\n[File too large, skipped]\n"));
            continue;
        }

        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        let content = String::from_utf8_lossy(&bytes);
        let block = format!("\n--- FILE: {rel} ---\n{content}\n");

        if *total_chars + block.len() > max_context_chars {
            parts.push(format!(
                "\n--- FILE: {rel} ---\n[Truncated: context limit reached]\n"
            ));
            return false;
        }

        *total_chars += block.len();
        parts.push(block);
    }

    for path in dirs {
        if !walk_dir(
            &path,
            root,
            max_file_bytes,
            max_context_chars,
            parts,
            total_chars,
        ) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_becomes_github_url() {
        assert_eq!(
            normalize_repo_ref("octocat/hello-world"),
            "https://github.com/octocat/hello-world.git"
        );
    }

    #[test]
    fn full_urls_only_gain_the_git_suffix() {
        assert_eq!(
            normalize_repo_ref("https://github.com/octocat/hello-world/"),
            "https://github.com/octocat/hello-world.git"
        );
        assert_eq!(
            normalize_repo_ref("https://github.com/octocat/hello-world.git"),
            "https://github.com/octocat/hello-world.git"
        );
        assert_eq!(
            normalize_repo_ref("git@github.com:octocat/hello-world.git"),
            "git@github.com:octocat/hello-world.git"
        );
    }

    #[test]
    fn cache_key_is_stable_and_short() {
        let a = cache_key("https://github.com/octocat/hello-world.git");
        let b = cache_key("  HTTPS://GITHUB.COM/octocat/hello-world.git  ");
        assert_eq!(a.len(), 12);
        assert_eq!(a, b);
        assert_ne!(a, cache_key("https://github.com/octocat/other.git"));
    }

    #[test]
    fn recognizes_code_and_special_files() {
        assert!(should_read_file(Path::new("src/main.rs")));
        assert!(should_read_file(Path::new("README.md")));
        assert!(should_read_file(Path::new("Dockerfile")));
        assert!(should_read_file(Path::new("config.YAML")));
        assert!(!should_read_file(Path::new("image.png")));
        assert!(!should_read_file(Path::new("binary")));
    }

    #[test]
    fn walk_skips_dependency_dirs_and_marks_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("main.rs"), "fn main() {}\n").unwrap();
        fs::create_dir(root.join("node_modules")).unwrap();
        fs::write(root.join("node_modules").join("dep.js"), "ignored").unwrap();
        fs::write(root.join("big.txt"), "x".repeat(200)).unwrap();

        let text = read_repo_files(root, 100, 10_000);
        assert!(text.contains("--- FILE: main.rs ---"));
        assert!(text.contains("fn main() {}"));
        assert!(!text.contains("dep.js"));
        assert!(text.contains("--- FILE: big.txt ---\n[File too large, skipped]"));
    }

    #[test]
    fn walk_truncates_at_the_character_budget() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("a.txt"), "a".repeat(80)).unwrap();
        fs::write(root.join("b.txt"), "b".repeat(80)).unwrap();

        let text = read_repo_files(root, 1_000, 120);
        assert!(text.contains("--- FILE: a.txt ---"));
        assert!(text.contains("[Truncated: context limit reached]"));
        assert!(!text.contains("bbbb"));
    }

    #[tokio::test]
    async fn empty_reference_is_rejected_with_text() {
        let ingestor = GitIngestor::new(GitConfig::default());
        let reply = ingestor.fetch("   ").await.unwrap();
        assert_eq!(reply, "Error: no repository URL provided.");
    }
}
