use super::{FileDescriptor, ScanError, ScanWarning, ScanWarningReason};
use async_trait::async_trait;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Raw scanner output: the files found plus the entries that could not be read.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub files: Vec<FileDescriptor>,
    pub warnings: Vec<ScanWarning>,
}

/// Anything that can enumerate the audio files of a library.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn scan(&self) -> Result<Scan, ScanError>;
}

#[async_trait]
impl MediaSource for Vec<FileDescriptor> {
    async fn scan(&self) -> Result<Scan, ScanError> {
        Ok(Scan {
            files: self.clone(),
            warnings: Vec::new(),
        })
    }
}

/// Walks a directory tree and reports every file with a known audio extension.
///
/// Entries are visited in path order, so two scans of an unchanged tree report
/// the same files in the same order. Titles come from file stems; tags are not read.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_supported_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Folder path reported for a file: the root's own name followed by the
    /// directories below it, so files at the top of the root still have a folder.
    fn folder_path_for(&self, file: &Path) -> PathBuf {
        let mut folder = PathBuf::from("/");
        if let Some(name) = self.root.file_name() {
            folder.push(name);
        } else {
            folder.push("library");
        }
        if let Some(relative) = file.parent().and_then(|p| p.strip_prefix(&self.root).ok()) {
            folder.push(relative);
        }
        folder
    }

    fn walk_blocking(&self) -> Result<Scan, ScanError> {
        let mut scan = Scan::default();
        let entries = read_sorted(&self.root).map_err(|source| ScanError::Root {
            path: self.root.clone(),
            source,
        })?;

        let mut pending: Vec<PathBuf> = entries.into_iter().rev().collect();
        while let Some(path) = pending.pop() {
            if path.is_dir() && !path.is_symlink() {
                match read_sorted(&path) {
                    Ok(children) => pending.extend(children.into_iter().rev()),
                    Err(e) => scan.warnings.push(ScanWarning::new(
                        &path,
                        ScanWarningReason::Unreadable(e.to_string()),
                    )),
                }
                continue;
            }

            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.is_supported_extension(e));
            if !supported {
                continue;
            }

            let folder_path = self.folder_path_for(&path);
            scan.files
                .push(FileDescriptor::new(path).with_folder_path(folder_path));
        }

        debug!(
            "Scanned {}: {} files, {} unreadable",
            self.root.display(),
            scan.files.len(),
            scan.warnings.len()
        );
        Ok(scan)
    }
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

#[async_trait]
impl MediaSource for DirectoryScanner {
    async fn scan(&self) -> Result<Scan, ScanError> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.walk_blocking())
            .await
            .map_err(|e| ScanError::Task(e.to_string()))?
    }
}
