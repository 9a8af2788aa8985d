//! Streaming manifest builder.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::ManifestError;
use super::types::{ChecksumType, ManifestEntry, ManifestSummary, SkippedEntry};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Walks a directory and writes its manifest.
pub struct ManifestBuilder {
    algorithm: ChecksumType,
    buffer_size: usize,
}

impl ManifestBuilder {
    pub fn new(algorithm: ChecksumType) -> Self {
        Self {
            algorithm,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Hashes every regular file under `root` and writes the manifest to
    /// `root/<manifest_name>`.
    ///
    /// Each directory's files are listed before its subdirectories are
    /// visited; within a directory the read order is kept as is. Files and
    /// subdirectories that cannot be read are left out and reported in
    /// `skipped`; only an unreadable `root` or an unwritable manifest fails.
    pub async fn build(
        &self,
        root: &Path,
        manifest_name: &str,
    ) -> Result<ManifestSummary, ManifestError> {
        if !root.is_dir() {
            return Err(ManifestError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let manifest_path = root.join(manifest_name);
        let mut entries = Vec::new();
        let mut total_bytes = 0u64;
        let mut skipped = Vec::new();

        let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let (files, subdirs) = match list_dir(&dir).await {
                Ok(listing) => listing,
                Err(e) if dir.as_path() != root => {
                    skipped.push(skipped_entry(root, &dir, &e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            for path in files {
                if path == manifest_path {
                    continue;
                }
                match compute_checksum_sized(&path, self.algorithm, self.buffer_size).await {
                    Ok((digest, size)) => {
                        total_bytes += size;
                        entries.push(ManifestEntry {
                            digest,
                            relative_path: relative_label(root, &path),
                        });
                    }
                    Err(e) => skipped.push(skipped_entry(root, &path, &e)),
                }
            }

            // Stack: push in reverse so the first subdirectory is visited next
            pending.extend(subdirs.into_iter().rev());
        }

        let mut contents = String::new();
        for entry in &entries {
            contents.push_str(&entry.to_string());
            contents.push('\n');
        }

        let write_err = |e| ManifestError::WriteFailed {
            path: manifest_path.clone(),
            source: e,
        };
        let mut file = File::create(&manifest_path).await.map_err(write_err)?;
        file.write_all(contents.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        tracing::debug!(
            path = %manifest_path.display(),
            files = entries.len(),
            skipped = skipped.len(),
            total_bytes,
            "Wrote manifest"
        );

        Ok(ManifestSummary {
            path: manifest_path,
            entries,
            total_bytes,
            skipped,
        })
    }
}

/// Regular files and subdirectories of `dir`, in read order. Symlinks and
/// other special files are skipped.
async fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ManifestError> {
    let read_err = |e| ManifestError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    let mut reader = fs::read_dir(dir).await.map_err(read_err)?;
    while let Some(entry) = reader.next_entry().await.map_err(read_err)? {
        let file_type = entry.file_type().await.map_err(read_err)?;
        if file_type.is_file() {
            files.push(entry.path());
        } else if file_type.is_dir() {
            subdirs.push(entry.path());
        }
    }
    Ok((files, subdirs))
}

fn skipped_entry(root: &Path, path: &Path, error: &ManifestError) -> SkippedEntry {
    let reason = match std::error::Error::source(error) {
        Some(source) => format!("{}: {}", error, source),
        None => error.to_string(),
    };
    tracing::warn!(path = %path.display(), "Leaving unreadable entry out of manifest: {}", reason);
    SkippedEntry {
        relative_path: relative_label(root, path),
        reason,
    }
}

fn relative_label(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("./{}", parts.join("/"))
}

/// Hex digest of a single file.
pub async fn compute_checksum(path: &Path, algorithm: ChecksumType) -> Result<String, ManifestError> {
    compute_checksum_sized(path, algorithm, DEFAULT_BUFFER_SIZE)
        .await
        .map(|(digest, _)| digest)
}

async fn compute_checksum_sized(
    path: &Path,
    algorithm: ChecksumType,
    buffer_size: usize,
) -> Result<(String, u64), ManifestError> {
    let checksum_err = |e| ManifestError::ChecksumCalculationFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::open(path).await.map_err(checksum_err)?;
    let mut reader = BufReader::with_capacity(buffer_size, file);
    let mut buffer = vec![0u8; buffer_size];
    let mut total = 0u64;

    match algorithm {
        ChecksumType::Md5 => {
            let mut context = md5::Context::new();
            loop {
                let bytes_read = reader.read(&mut buffer).await.map_err(checksum_err)?;
                if bytes_read == 0 {
                    break;
                }
                context.consume(&buffer[..bytes_read]);
                total += bytes_read as u64;
            }
            Ok((format!("{:x}", context.compute()), total))
        }
        ChecksumType::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let bytes_read = reader.read(&mut buffer).await.map_err(checksum_err)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
                total += bytes_read as u64;
            }
            Ok((format!("{:x}", hasher.finalize()), total))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = "weather20240315.md5sum";

    fn populate(root: &Path) {
        std::fs::create_dir_all(root.join("nightly1/sub")).unwrap();
        std::fs::create_dir_all(root.join("skyprobe")).unwrap();
        std::fs::write(root.join("README"), "/archive/20240315\n").unwrap();
        std::fs::write(root.join("nightly1/a.dat"), "hello").unwrap();
        std::fs::write(root.join("nightly1/sub/b.dat"), "").unwrap();
        std::fs::write(root.join("skyprobe/skyprobe.png"), "No Data\n").unwrap();
    }

    #[tokio::test]
    async fn test_build_lists_every_regular_file() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let summary = ManifestBuilder::new(ChecksumType::Md5)
            .build(temp.path(), MANIFEST)
            .await
            .unwrap();

        assert_eq!(summary.file_count(), 4);
        assert_eq!(summary.total_bytes, 18 + 5 + 8);
        let paths: Vec<&str> = summary
            .entries
            .iter()
            .map(|e| e.relative_path.as_str())
            .collect();
        assert!(paths.contains(&"./nightly1/sub/b.dat"));
        assert!(paths.iter().all(|p| p.starts_with("./")));

        let written = std::fs::read_to_string(temp.path().join(MANIFEST)).unwrap();
        assert_eq!(written.lines().count(), 4);
        assert!(written.contains("5d41402abc4b2a76b9719d911017c592  ./nightly1/a.dat\n"));
        assert!(written.contains("d41d8cd98f00b204e9800998ecf8427e  ./nightly1/sub/b.dat\n"));
    }

    #[tokio::test]
    async fn test_manifest_excludes_itself_on_rebuild() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());
        let builder = ManifestBuilder::new(ChecksumType::Md5);

        builder.build(temp.path(), MANIFEST).await.unwrap();
        let second = builder.build(temp.path(), MANIFEST).await.unwrap();

        assert_eq!(second.file_count(), 4);
        assert!(second
            .entries
            .iter()
            .all(|e| !e.relative_path.ends_with(MANIFEST)));
    }

    #[tokio::test]
    async fn test_parent_files_precede_subdirectory_files() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let summary = ManifestBuilder::new(ChecksumType::Md5)
            .build(temp.path(), MANIFEST)
            .await
            .unwrap();

        let position = |path: &str| {
            summary
                .entries
                .iter()
                .position(|e| e.relative_path == path)
                .unwrap()
        };
        assert!(position("./README") < position("./nightly1/a.dat"));
        assert!(position("./nightly1/a.dat") < position("./nightly1/sub/b.dat"));
    }

    #[tokio::test]
    async fn test_sha256_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.dat");
        std::fs::write(&path, "hello").unwrap();

        let digest = compute_checksum(&path, ChecksumType::Sha256).await.unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_empty_directory_writes_empty_manifest() {
        let temp = TempDir::new().unwrap();
        let summary = ManifestBuilder::new(ChecksumType::Md5)
            .build(temp.path(), MANIFEST)
            .await
            .unwrap();
        assert_eq!(summary.file_count(), 0);
        assert_eq!(summary.size_megabytes(), "0.000");
        assert_eq!(std::fs::read_to_string(temp.path().join(MANIFEST)).unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let result = ManifestBuilder::new(ChecksumType::Md5)
            .build(&temp.path().join("absent"), MANIFEST)
            .await;
        assert!(matches!(result, Err(ManifestError::DirectoryNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_skipped_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        populate(temp.path());
        let locked = temp.path().join("nightly1/locked.dat");
        std::fs::write(&locked, "secret").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::File::open(&locked).is_ok() {
            // Permission bits are not enforced for this user (root)
            return;
        }

        let summary = ManifestBuilder::new(ChecksumType::Md5)
            .build(temp.path(), MANIFEST)
            .await
            .unwrap();

        assert_eq!(summary.file_count(), 4);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].relative_path, "./nightly1/locked.dat");
        let written = std::fs::read_to_string(temp.path().join(MANIFEST)).unwrap();
        assert!(!written.contains("locked.dat"));
        assert_eq!(written.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_clean_build_skips_nothing() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        let summary = ManifestBuilder::new(ChecksumType::Md5)
            .build(temp.path(), MANIFEST)
            .await
            .unwrap();

        assert!(summary.skipped.is_empty());
    }

    #[test]
    fn test_skipped_entry_carries_cause() {
        let root = Path::new("/archive/20240315");
        let error = ManifestError::ChecksumCalculationFailed {
            path: root.join("nightly1/a.dat"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        let entry = skipped_entry(root, &root.join("nightly1/a.dat"), &error);

        assert_eq!(entry.relative_path, "./nightly1/a.dat");
        assert!(entry.reason.ends_with(": denied"));
        assert!(entry.to_string().starts_with("./nightly1/a.dat: Failed to calculate checksum"));
    }
}
