use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::Result;

pub const CLIP_EXTENSION: &str = "mp3";

/// Synthesized clips for one transcript; `paths[i]` belongs to word `i`
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSet {
    dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl ClipSet {
    pub fn new<P: AsRef<Path>>(dir: P, paths: Vec<PathBuf>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            paths,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// `<dir>/<index>.mp3`
pub fn clip_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.{}", index, CLIP_EXTENSION))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Directory existed; this many files were deleted before removing it
    Removed(u64),
    /// Directory was already gone
    NothingToClean,
}

/// Delete every file in the clip directory, then the directory itself
pub async fn cleanup_clips<P: AsRef<Path>>(dir: P) -> Result<CleanupOutcome> {
    let dir = dir.as_ref();
    info!("Cleaning up {}", dir.display());

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No files to clean up");
            return Ok(CleanupOutcome::NothingToClean);
        }
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        removed += 1;
    }
    fs::remove_dir(dir).await?;

    info!("Deleted {} files and {}", removed, dir.display());
    Ok(CleanupOutcome::Removed(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[tokio::test]
    async fn test_cleanup_twice_is_a_no_op_the_second_time() {
        let root = assert_fs::TempDir::new().unwrap();
        let clips = root.child("temp");
        clips.create_dir_all().unwrap();
        clips.child("0.mp3").write_binary(b"ID3").unwrap();
        clips.child("1.mp3").write_binary(b"ID3").unwrap();

        assert_eq!(cleanup_clips(clips.path()).await.unwrap(), CleanupOutcome::Removed(2));
        assert!(!clips.path().exists());
        assert_eq!(cleanup_clips(clips.path()).await.unwrap(), CleanupOutcome::NothingToClean);
    }

    #[tokio::test]
    async fn test_cleanup_empty_dir() {
        let root = assert_fs::TempDir::new().unwrap();
        let clips = root.child("temp");
        clips.create_dir_all().unwrap();

        assert_eq!(cleanup_clips(clips.path()).await.unwrap(), CleanupOutcome::Removed(0));
        assert!(!clips.path().exists());
    }

    #[test]
    fn test_clip_path() {
        assert_eq!(clip_path(Path::new("temp"), 7), PathBuf::from("temp/7.mp3"));
    }
}
