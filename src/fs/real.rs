use super::{FileMetadata, FileSystem, FileType, WalkOptions};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::trace;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta = fs::metadata(path).context(format!("Failed to get metadata for {:?}", path))?;

        let file_type = if meta.is_file() {
            FileType::File
        } else if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Symlink
        };

        Ok(FileMetadata {
            size: meta.len(),
            file_type,
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let mut file = fs::File::open(path).context(format!("Failed to open file {:?}", path))?;
        let mut buffer = vec![0u8; max_bytes];
        let bytes_read = file
            .read(&mut buffer)
            .context(format!("Failed to read bytes from {:?}", path))?;
        buffer.truncate(bytes_read);
        Ok(buffer)
    }

    fn walk_files(&self, root: &Path, options: WalkOptions) -> Result<Vec<PathBuf>> {
        let walker = WalkBuilder::new(root)
            .standard_filters(options.respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.context(format!("Failed to walk directory {:?}", root))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                trace!("walk: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}
