use anyhow::Context;
use std::fs;
use std::path::Path;

pub fn atomic_write(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data).context("write temp file")?;
    fs::rename(&tmp, path).context("rename temp file")?;
    Ok(())
}

/// Folder name used for a player's results: spaces become underscores.
pub fn user_folder_name(username: &str) -> String {
    username.replace(' ', "_")
}
