//! File transfer over SFTP.
//!
//! Uploads walk the local tree with `walkdir`; downloads recurse through
//! remote directory listings. Timestamp preservation copies mtime/atime in
//! both directions when requested.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ssh2::{FileStat, Session, Sftp};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::RemoteRelayError;
use crate::Result;

/// Options applied to a transfer operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferOptions {
    /// Transfer directories recursively.
    pub recursive: bool,
    /// Preserve modification and access times.
    pub preserve_times: bool,
}

impl TransferOptions {
    /// Options for a recursive transfer.
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            preserve_times: false,
        }
    }

    /// Enable timestamp preservation.
    pub fn preserve_times(mut self) -> Self {
        self.preserve_times = true;
        self
    }
}

/// Upload files or directories into `remote_dir`.
///
/// Returns the number of files transferred. Directories require
/// `options.recursive`; each named directory is recreated under `remote_dir`
/// by its base name, as `scp -r` does.
pub(crate) fn upload(
    session: &Session,
    local_paths: &[PathBuf],
    remote_dir: &str,
    options: &TransferOptions,
) -> Result<u64> {
    let sftp = session.sftp()?;
    let remote_dir = remote_dir.trim_end_matches('/');
    let mut count = 0;

    for local in local_paths {
        let meta = std::fs::metadata(local)?;
        if meta.is_dir() {
            if !options.recursive {
                return Err(RemoteRelayError::Transfer(format!(
                    "{} is a directory (recursive transfer not enabled)",
                    local.display()
                )));
            }
            count += upload_dir(&sftp, local, remote_dir, options)?;
        } else {
            let name = file_name(local)?;
            let remote = format!("{}/{}", remote_dir, name);
            upload_file(&sftp, local, Path::new(&remote), options)?;
            count += 1;
        }
    }

    Ok(count)
}

fn upload_dir(
    sftp: &Sftp,
    local_dir: &Path,
    remote_dir: &str,
    options: &TransferOptions,
) -> Result<u64> {
    let dir_name = file_name(local_dir)?;
    let remote_root = format!("{}/{}", remote_dir, dir_name);
    let mut count = 0;

    for entry in WalkDir::new(local_dir) {
        let entry = entry.map_err(|e| RemoteRelayError::Transfer(e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(local_dir)
            .map_err(|e| RemoteRelayError::Transfer(e.to_string()))?;
        let remote = join_remote(&remote_root, rel);

        if entry.file_type().is_dir() {
            ensure_remote_dir(sftp, Path::new(&remote))?;
        } else if entry.file_type().is_file() {
            upload_file(sftp, entry.path(), Path::new(&remote), options)?;
            count += 1;
        }
        // Symlinks and special files are skipped.
    }

    Ok(count)
}

fn upload_file(
    sftp: &Sftp,
    local: &Path,
    remote: &Path,
    options: &TransferOptions,
) -> Result<()> {
    debug!(local = %local.display(), remote = %remote.display(), "uploading file");

    let mut src = std::fs::File::open(local)?;
    let mut dst = sftp.create(remote)?;
    std::io::copy(&mut src, &mut dst)?;
    drop(dst);

    if options.preserve_times {
        let meta = local.metadata()?;
        sftp.setstat(
            remote,
            FileStat {
                size: None,
                uid: None,
                gid: None,
                perm: None,
                atime: system_time_secs(meta.accessed().ok()),
                mtime: system_time_secs(meta.modified().ok()),
            },
        )?;
    }

    Ok(())
}

/// Download a remote file or directory into `local_dir`.
///
/// Returns the number of files transferred. Remote directories require
/// `options.recursive` and are recreated under `local_dir` by base name.
pub(crate) fn download(
    session: &Session,
    remote_path: &str,
    local_dir: &Path,
    options: &TransferOptions,
) -> Result<u64> {
    let sftp = session.sftp()?;
    let remote_path = remote_path.trim_end_matches('/');
    let stat = sftp.stat(Path::new(remote_path))?;

    std::fs::create_dir_all(local_dir)?;

    if stat.is_dir() {
        if !options.recursive {
            return Err(RemoteRelayError::Transfer(format!(
                "{} is a directory (recursive transfer not enabled)",
                remote_path
            )));
        }
        let name = remote_base_name(remote_path)?;
        download_dir(&sftp, remote_path, &local_dir.join(name), options)
    } else {
        let name = remote_base_name(remote_path)?;
        download_file(&sftp, Path::new(remote_path), &local_dir.join(name), &stat, options)?;
        Ok(1)
    }
}

fn download_dir(
    sftp: &Sftp,
    remote_dir: &str,
    local_dir: &Path,
    options: &TransferOptions,
) -> Result<u64> {
    std::fs::create_dir_all(local_dir)?;
    let mut count = 0;

    for (remote, stat) in sftp.readdir(Path::new(remote_dir))? {
        let name = remote
            .file_name()
            .ok_or_else(|| RemoteRelayError::Transfer("unnamed remote entry".into()))?;
        let local = local_dir.join(name);
        let remote_str = remote.to_string_lossy();

        if stat.is_dir() {
            count += download_dir(sftp, &remote_str, &local, options)?;
        } else if stat.is_file() {
            download_file(sftp, &remote, &local, &stat, options)?;
            count += 1;
        }
    }

    Ok(count)
}

fn download_file(
    sftp: &Sftp,
    remote: &Path,
    local: &Path,
    stat: &FileStat,
    options: &TransferOptions,
) -> Result<()> {
    debug!(remote = %remote.display(), local = %local.display(), "downloading file");

    let mut src = sftp.open(remote)?;
    let dst = std::fs::File::create(local)?;
    let mut writer = std::io::BufWriter::new(&dst);
    std::io::copy(&mut src, &mut writer)?;
    drop(writer);

    if options.preserve_times {
        let mut times = std::fs::FileTimes::new();
        if let Some(atime) = stat.atime {
            times = times.set_accessed(UNIX_EPOCH + Duration::from_secs(atime));
        }
        if let Some(mtime) = stat.mtime {
            times = times.set_modified(UNIX_EPOCH + Duration::from_secs(mtime));
        }
        dst.set_times(times)?;
    }

    Ok(())
}

fn ensure_remote_dir(sftp: &Sftp, remote: &Path) -> Result<()> {
    if sftp.stat(remote).is_err() {
        sftp.mkdir(remote, 0o755)?;
    }
    Ok(())
}

fn join_remote(root: &str, rel: &Path) -> String {
    let mut remote = root.to_string();
    for component in rel.components() {
        remote.push('/');
        remote.push_str(&component.as_os_str().to_string_lossy());
    }
    remote
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            RemoteRelayError::Transfer(format!("{} has no file name", path.display()))
        })
}

fn remote_base_name(path: &str) -> Result<String> {
    path.rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RemoteRelayError::Transfer(format!("{} has no file name", path)))
}

fn system_time_secs(time: Option<SystemTime>) -> Option<u64> {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_options_default() {
        let options = TransferOptions::default();
        assert!(!options.recursive);
        assert!(!options.preserve_times);
    }

    #[test]
    fn test_transfer_options_builders() {
        let options = TransferOptions::recursive().preserve_times();
        assert!(options.recursive);
        assert!(options.preserve_times);
    }

    #[test]
    fn test_join_remote() {
        let joined = join_remote("/data/out", Path::new("a/b.mp4"));
        assert_eq!(joined, "/data/out/a/b.mp4");

        let root_only = join_remote("/data/out", Path::new(""));
        assert_eq!(root_only, "/data/out");
    }

    #[test]
    fn test_remote_base_name() {
        assert_eq!(remote_base_name("/media/nas/output").unwrap(), "output");
        assert_eq!(remote_base_name("clip.mp4").unwrap(), "clip.mp4");
        assert!(remote_base_name("").is_err());
    }

    #[test]
    fn test_file_name_rejects_root() {
        assert!(file_name(Path::new("/")).is_err());
        assert_eq!(file_name(Path::new("/tmp/x.bin")).unwrap(), "x.bin");
    }

    #[test]
    fn test_system_time_secs() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(system_time_secs(Some(t)), Some(1_700_000_000));
        assert_eq!(system_time_secs(None), None);
    }
}
