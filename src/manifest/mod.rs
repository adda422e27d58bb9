//! The image/mask list written to `list/<name>.txt`.
//!
//! Each line holds an image path and its mask path separated by a single
//! space. Both are relative to the output root and always use `/`, so the
//! file reads the same on every platform.

mod scan;

pub use scan::{rebuild_from_tree, unlisted_files, TreeScan};

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Component, Path};

use crate::error::CocoSampleError;
use crate::export::MASKS_DIR;

/// One manifest line.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManifestEntry {
    pub image: String,
    pub mask: String,
}

impl ManifestEntry {
    pub fn new(image: impl Into<String>, mask: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            mask: mask.into(),
        }
    }

    /// Builds an entry from two paths under `root`.
    pub fn from_paths(root: &Path, image: &Path, mask: &Path) -> Result<Self, CocoSampleError> {
        Ok(Self::new(
            relative_slash_path(root, image)?,
            relative_slash_path(root, mask)?,
        ))
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.image, self.mask)
    }
}

/// `path` relative to `root`, joined with `/`.
pub fn relative_slash_path(root: &Path, path: &Path) -> Result<String, CocoSampleError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| CocoSampleError::OutputTree {
            path: path.to_path_buf(),
            message: format!("path is not under {}", root.display()),
        })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect();

    Ok(parts.join("/"))
}

/// Splits a line into image and mask paths.
///
/// Category names may contain spaces, so the split happens at the space
/// that starts the mask directory when there is one.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let marker = format!(" {MASKS_DIR}/");
    match line.rfind(&marker) {
        Some(at) => Some((&line[..at], &line[at + 1..])),
        None => line.split_once(' '),
    }
}

/// Fuzz-only entrypoint for manifest line splitting.
#[cfg(feature = "fuzzing")]
pub fn fuzz_split_line(line: &str) -> Option<(String, String)> {
    split_line(line).map(|(image, mask)| (image.to_string(), mask.to_string()))
}

/// Ordered list of exported pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the manifest, one entry per line.
    pub fn to_manifest_string(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{entry}\n"))
            .collect()
    }

    /// Writes the manifest, creating the parent directory and replacing any
    /// existing file.
    pub fn write(&self, path: &Path) -> Result<(), CocoSampleError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        for entry in &self.entries {
            writeln!(writer, "{entry}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a manifest back. Blank lines are skipped.
    pub fn read(path: &Path) -> Result<Self, CocoSampleError> {
        let reader = BufReader::new(File::open(path)?);
        let mut manifest = Manifest::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((image, mask)) = split_line(line) else {
                return Err(CocoSampleError::OutputTree {
                    path: path.to_path_buf(),
                    message: format!("line {} has no mask path", line_no + 1),
                });
            };
            manifest.push(ManifestEntry::new(image, mask));
        }

        Ok(manifest)
    }

    /// Entries whose image or mask does not exist under `root`.
    pub fn dangling_entries(&self, root: &Path) -> Vec<&ManifestEntry> {
        self.entries
            .iter()
            .filter(|entry| !root.join(&entry.image).is_file() || !root.join(&entry.mask).is_file())
            .collect()
    }
}

impl Extend<ManifestEntry> for Manifest {
    fn extend<T: IntoIterator<Item = ManifestEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    fn from_iter<T: IntoIterator<Item = ManifestEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
