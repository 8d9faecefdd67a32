use crate::util::{atomic_write, user_folder_name};
use anyhow::Context;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Raw match payloads on disk, one folder per player under `root`.
#[derive(Debug, Clone)]
pub struct MatchStore {
    root: PathBuf,
}

impl MatchStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn user_dir(&self, username: &str) -> PathBuf {
        self.root.join(user_folder_name(username))
    }

    pub fn ensure_user_dir(&self, username: &str) -> anyhow::Result<PathBuf> {
        let dir = self.user_dir(username);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create results folder {}", dir.display()))?;
        Ok(dir)
    }

    pub fn matches_path(&self, username: &str, start: u32, count: u32) -> PathBuf {
        self.user_dir(username)
            .join(format!("matches_{start}_{count}.json"))
    }

    pub fn save_matches(
        &self,
        username: &str,
        start: u32,
        count: u32,
        matches: &[Value],
    ) -> anyhow::Result<PathBuf> {
        self.ensure_user_dir(username)?;
        let path = self.matches_path(username, start, count);
        let data = serde_json::to_vec(matches)?;
        atomic_write(&path, &data)?;
        info!(path = %path.display(), matches = matches.len(), "saved matches");
        Ok(path)
    }

    /// Every match saved for the player, batch files in `(start, count)` order.
    pub fn load_matches(&self, username: &str) -> anyhow::Result<Vec<Value>> {
        let dir = self.user_dir(username);
        if !dir.is_dir() {
            anyhow::bail!("directory {} does not exist", dir.display());
        }
        let mut out = Vec::new();
        for path in json_files(&dir)? {
            let raw = std::fs::read(&path)
                .with_context(|| format!("read {}", path.display()))?;
            let batch: Vec<Value> = serde_json::from_slice(&raw)
                .with_context(|| format!("parse {}", path.display()))?;
            out.extend(batch);
        }
        info!(matches = out.len(), "loaded saved matches");
        Ok(out)
    }
}

fn json_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).context("list results folder")? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => files.push(path),
            Some("csv") => {}
            _ => warn!(path = %path.display(), "skipping non-json file"),
        }
    }
    files.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let range = batch_range(&name);
        (range.is_none(), range, name)
    });
    Ok(files)
}

/// `(start, count)` from a `matches_{start}_{count}.json` file name.
fn batch_range(name: &str) -> Option<(u32, u32)> {
    let stem = name.strip_prefix("matches_")?.strip_suffix(".json")?;
    let (start, count) = stem.split_once('_')?;
    Some((start.parse().ok()?, count.parse().ok()?))
}
