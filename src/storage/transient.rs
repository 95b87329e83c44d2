use crate::{config::ArtifactConfig, error::Result, models::extension_for_mime};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

const ARTIFACT_PREFIX: &str = "provador_";
const ARTIFACT_EXTENSIONS: [&str; 4] = ["png", "jpg", "webp", "gif"];

/// Directory of generated images. Every entry is written once under a unique
/// name and never read back by the service.
#[derive(Debug, Clone)]
pub struct TransientStore {
    dir: PathBuf,
    ttl: Duration,
}

impl TransientStore {
    pub fn new(config: &ArtifactConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)?;
        Ok(Self {
            dir: config.dir.clone(),
            ttl: config.ttl,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn filename_for(mime_type: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!(
            "{}{}_{}.{}",
            ARTIFACT_PREFIX,
            Utc::now().timestamp_millis(),
            &id[..8],
            extension_for_mime(mime_type)
        )
    }

    /// Whether `filename` has the shape [`TransientStore::filename_for`]
    /// produces. Only such files are ever swept.
    pub fn is_artifact_name(filename: &str) -> bool {
        filename
            .strip_prefix(ARTIFACT_PREFIX)
            .and_then(|rest| rest.rsplit_once('.'))
            .map_or(false, |(stem, ext)| {
                !stem.is_empty() && ARTIFACT_EXTENSIONS.contains(&ext)
            })
    }

    /// Writes `bytes` and returns a guard that deletes the file unless
    /// [`ArtifactGuard::keep`] is called. A failed write leaves nothing behind.
    pub async fn write(&self, filename: &str, bytes: &[u8]) -> std::io::Result<ArtifactGuard> {
        let path = self.dir.join(filename);
        // Armed before the write so a partially written file is removed on error.
        let guard = ArtifactGuard {
            path: Some(path.clone()),
        };
        tokio::fs::write(&path, bytes).await?;
        log::debug!("💾 Wrote transient artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(guard)
    }

    /// Removes this store's artifacts older than the retention window. Other
    /// files in the directory are left alone. Returns how many files were
    /// deleted. Uses blocking filesystem calls.
    pub fn sweep_expired(&self, now: SystemTime) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Could not list {}: {}", self.dir.display(), e);
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let owned = entry
                .file_name()
                .to_str()
                .map_or(false, Self::is_artifact_name);
            if !owned {
                continue;
            }

            let path = entry.path();
            let is_expired = entry
                .metadata()
                .ok()
                .filter(|meta| meta.is_file())
                .and_then(|meta| meta.modified().ok())
                .and_then(|modified| now.duration_since(modified).ok())
                .map_or(false, |age| age >= self.ttl);

            if is_expired && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            log::info!("🧹 Removed {} expired artifact(s) from {}", removed, self.dir.display());
        }
        removed
    }

    /// Spawns the background reaper. Runs until the runtime shuts down.
    pub fn spawn_reaper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let sweeper = store.clone();
                let swept =
                    tokio::task::spawn_blocking(move || sweeper.sweep_expired(SystemTime::now())).await;
                if let Err(e) = swept {
                    log::warn!("Artifact sweep did not complete: {}", e);
                }
            }
        })
    }
}

/// Owns a freshly written artifact until the request that produced it completes.
#[derive(Debug)]
pub struct ArtifactGuard {
    path: Option<PathBuf>,
}

impl ArtifactGuard {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Hands the file over to the retention policy.
    pub fn keep(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            // Best effort; a failed delete must not mask the request's own error.
            let _ = fs::remove_file(&path);
            log::debug!("🗑️  Discarded transient artifact {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path, ttl: Duration) -> TransientStore {
        TransientStore::new(&ArtifactConfig::new().with_dir(dir).with_ttl(ttl)).unwrap()
    }

    #[test]
    fn test_new_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("assets").join("temp");
        let store = store_in(&dir, Duration::from_secs(60));
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_filenames_are_unique_and_typed() {
        let a = TransientStore::filename_for("image/png");
        let b = TransientStore::filename_for("image/png");
        assert_ne!(a, b);
        assert!(a.starts_with("provador_"));
        assert!(a.ends_with(".png"));
        assert!(TransientStore::filename_for("image/jpeg").ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_dropped_guard_deletes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), Duration::from_secs(60));

        let guard = store.write("a.png", &[1, 2, 3]).await.unwrap();
        let path = guard.path().unwrap().to_path_buf();
        assert!(path.exists());

        drop(guard);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_kept_guard_leaves_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), Duration::from_secs(60));

        let path = store.write("b.png", &[1, 2, 3]).await.unwrap().keep();
        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_artifact_name_shape() {
        assert!(TransientStore::is_artifact_name(&TransientStore::filename_for("image/webp")));
        assert!(TransientStore::is_artifact_name("provador_1700000000000_abcd1234.gif"));
        assert!(!TransientStore::is_artifact_name("provador_.png"));
        assert!(!TransientStore::is_artifact_name("provador_123.txt"));
        assert!(!TransientStore::is_artifact_name("notes.png"));
        assert!(!TransientStore::is_artifact_name("provador_123"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), Duration::from_secs(60));

        let result = store.write("missing/provador_1_abcd1234.png", &[1, 2, 3]).await;
        assert!(result.is_err());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), Duration::from_secs(60));
        let name = TransientStore::filename_for("image/png");
        let path = store.write(&name, &[9]).await.unwrap().keep();

        assert_eq!(store.sweep_expired(SystemTime::now()), 0);
        assert!(path.exists());

        let later = SystemTime::now() + Duration::from_secs(120);
        assert_eq!(store.sweep_expired(later), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_sweep_leaves_foreign_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), Duration::from_secs(60));
        let foreign = tmp.path().join("notes.txt");
        fs::write(&foreign, b"keep me").unwrap();
        let lookalike = tmp.path().join("photo.png");
        fs::write(&lookalike, [1]).unwrap();
        let name = TransientStore::filename_for("image/jpeg");
        let own = store.write(&name, &[9]).await.unwrap().keep();

        let later = SystemTime::now() + Duration::from_secs(120);
        assert_eq!(store.sweep_expired(later), 1);
        assert!(!own.exists());
        assert!(foreign.exists());
        assert!(lookalike.exists());
    }

    #[tokio::test]
    async fn test_reaper_sweeps_in_background() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path(), Duration::ZERO);
        let name = TransientStore::filename_for("image/png");
        let own = store.write(&name, &[9]).await.unwrap().keep();

        let reaper = store.spawn_reaper(Duration::from_millis(10));
        for _ in 0..100 {
            if !own.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        reaper.abort();
        assert!(!own.exists());
    }
}
