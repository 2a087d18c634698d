use crate::error::Res;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Res<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub(crate) async fn deserialize<T>(path: &Path) -> Res<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Create a directory and all of its parents.
pub(crate) async fn make_dir(p: impl AsRef<Path>) -> Res<()> {
    let p = p.as_ref();
    tokio::fs::create_dir_all(p)
        .await
        .with_context(|| format!("Unable to create directory at {}", p.to_string_lossy()))
}

pub(crate) async fn canonicalize(p: impl AsRef<Path>) -> Res<PathBuf> {
    let p = p.as_ref();
    tokio::fs::canonicalize(p)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", p.to_string_lossy()))
}

/// Removes a file. Returns `false` if there was nothing to remove.
pub(crate) async fn remove(p: impl AsRef<Path>) -> Res<bool> {
    let p = p.as_ref();
    match tokio::fs::remove_file(p).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Unable to remove {}", p.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_remove_missing_file() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("nothing.json");
        assert!(!remove(&p).await.unwrap());
        write(&p, "{}").await.unwrap();
        assert!(remove(&p).await.unwrap());
        assert!(!p.exists());
    }
}
