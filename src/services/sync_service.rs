//! src/services/sync_service.rs
//!
//! SyncService — the incremental mirroring engine. For each remote object it
//! decides between skip and (re)download, and drives listing, comparison,
//! and transfer for one full pass over the bucket. Staleness is a size
//! comparison only; the directory tree under `local_root` is the sole record
//! of what has already been synced — no manifest or index is kept.

use crate::{
    models::{object::ObjectDescriptor, report::CycleReport},
    services::remote::{RemoteStore, StoreError},
};
use futures::StreamExt;
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, info, warn};

/// Failures that abort the current cycle. The next scheduled cycle starts
/// over from a fresh listing; nothing already downloaded is rolled back.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to prepare local root `{path}`: {source}")]
    LocalRoot { path: PathBuf, source: io::Error },
    #[error("failed to list bucket `{bucket}`: {source}")]
    Listing { bucket: String, source: StoreError },
}

/// Failures confined to a single object's transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Mirrors one bucket into one local directory tree.
pub struct SyncService {
    store: Arc<dyn RemoteStore>,
    bucket: String,
    local_root: PathBuf,
}

impl SyncService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        bucket: impl Into<String>,
        local_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            local_root: local_root.into(),
        }
    }

    /// Map a remote key to its local path under `local_root`.
    ///
    /// Every `/`-delimited segment becomes one directory level; empty
    /// segments (doubled separators) are dropped. Keys are trusted not to
    /// contain traversal segments — nothing here rejects `..`.
    fn local_path(&self, key: &str) -> PathBuf {
        let mut path = self.local_root.clone();
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }

    /// Decide whether the local copy at `path` must be (re)written.
    ///
    /// Missing file: download. Present with matching size: skip. Present
    /// with any other size: treat as changed and overwrite. Size is the only
    /// input — a content change that preserves size goes undetected.
    async fn needs_download(&self, path: &Path, remote_size: i64) -> io::Result<bool> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(meta.len() as i64 != remote_size),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Stream one object into `dest`, truncating any previous copy.
    ///
    /// On any mid-stream failure the partially written destination is
    /// removed before the error is returned, so a later cycle can only ever
    /// observe the file as absent or complete.
    async fn transfer(&self, key: &str, dest: &Path) -> Result<u64, TransferError> {
        let mut stream = self.store.get_object(&self.bucket, key).await?;
        let mut file = File::create(dest).await?;

        let mut written: u64 = 0;
        while let Some(chunk_res) = stream.next().await {
            let chunk = match chunk_res {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = fs::remove_file(dest).await;
                    return Err(TransferError::Store(err));
                }
            };
            written += chunk.len() as u64;
            if let Err(err) = file.write_all(&chunk).await {
                let _ = fs::remove_file(dest).await;
                return Err(TransferError::Io(err));
            }
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(dest).await;
            return Err(TransferError::Io(err));
        }

        Ok(written)
    }

    /// Run one complete mirroring pass over the bucket.
    ///
    /// Object-local failures are recorded in the report and never abort the
    /// pass. An unusable local root or a failed listing page aborts it;
    /// whatever was already downloaded stays in place.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        fs::create_dir_all(&self.local_root)
            .await
            .map_err(|source| CycleError::LocalRoot {
                path: self.local_root.clone(),
                source,
            })?;

        let mut report = CycleReport::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .store
                .list_page(&self.bucket, continuation_token.as_deref())
                .await
                .map_err(|source| CycleError::Listing {
                    bucket: self.bucket.clone(),
                    source,
                })?;

            for descriptor in &page.objects {
                report.objects_listed += 1;
                self.sync_object(descriptor, &mut report).await;
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        if report.is_empty_bucket() {
            info!(bucket = %self.bucket, "bucket is empty; nothing to download");
        } else {
            info!(
                bucket = %self.bucket,
                listed = report.objects_listed,
                downloaded = report.files_downloaded,
                skipped = report.files_skipped,
                errors = report.errors.len(),
                "cycle complete"
            );
        }

        Ok(report)
    }

    /// Sync a single descriptor, recording any failure in the report.
    async fn sync_object(&self, descriptor: &ObjectDescriptor, report: &mut CycleReport) {
        if descriptor.is_placeholder() {
            debug!(key = %descriptor.key, "skipping placeholder key");
            return;
        }

        let dest = self.local_path(&descriptor.key);

        if let Some(parent) = dest.parent() {
            if let Err(err) = fs::create_dir_all(parent).await {
                warn!(
                    key = %descriptor.key,
                    dir = %parent.display(),
                    error = %err,
                    "could not create parent directory"
                );
                report.record_error(&descriptor.key, &err);
                return;
            }
        }

        match self.needs_download(&dest, descriptor.size).await {
            Ok(false) => {
                debug!(key = %descriptor.key, "local copy up to date");
                report.files_skipped += 1;
            }
            Ok(true) => match self.transfer(&descriptor.key, &dest).await {
                Ok(written) => {
                    info!(
                        key = %descriptor.key,
                        bytes = written,
                        path = %dest.display(),
                        "downloaded"
                    );
                    report.files_downloaded += 1;
                }
                Err(err) => {
                    warn!(key = %descriptor.key, error = %err, "download failed");
                    report.record_error(&descriptor.key, &err);
                }
            },
            Err(err) => {
                warn!(
                    key = %descriptor.key,
                    path = %dest.display(),
                    error = %err,
                    "could not stat local copy"
                );
                report.record_error(&descriptor.key, &err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::remote::{ObjectPage, ObjectStream};
    use async_trait::async_trait;

    struct NullStore;

    #[async_trait]
    impl RemoteStore for NullStore {
        async fn list_page(
            &self,
            _bucket: &str,
            _continuation_token: Option<&str>,
        ) -> Result<ObjectPage, StoreError> {
            Ok(ObjectPage::default())
        }

        async fn get_object(&self, _bucket: &str, key: &str) -> Result<ObjectStream, StoreError> {
            Err(StoreError::Get(format!("no payload for `{key}`")))
        }
    }

    fn service(root: &Path) -> SyncService {
        SyncService::new(Arc::new(NullStore), "bucket", root)
    }

    #[test]
    fn local_path_preserves_key_hierarchy() {
        let service = service(Path::new("/mirror"));
        assert_eq!(service.local_path("a.txt"), Path::new("/mirror/a.txt"));
        assert_eq!(
            service.local_path("b/c/d.bin"),
            Path::new("/mirror/b/c/d.bin")
        );
        // Doubled separators do not produce empty segments.
        assert_eq!(service.local_path("b//c.txt"), Path::new("/mirror/b/c.txt"));
    }

    #[tokio::test]
    async fn missing_file_needs_download() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        assert!(
            service
                .needs_download(&dir.path().join("absent"), 10)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn staleness_is_size_comparison_only() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let path = dir.path().join("obj");
        fs::write(&path, vec![0u8; 10]).await.unwrap();

        assert!(!service.needs_download(&path, 10).await.unwrap());
        assert!(service.needs_download(&path, 11).await.unwrap());
        assert!(service.needs_download(&path, 0).await.unwrap());
    }
}
