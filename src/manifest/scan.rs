//! Scans of an existing output tree.
//!
//! Used to rebuild a manifest for a tree filled by earlier runs, and to
//! find files a fresh manifest does not cover. Images and masks are paired
//! by category directory and file stem, never by listing order.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{relative_slash_path, Manifest, ManifestEntry};
use crate::error::CocoSampleError;
use crate::export::{IMAGES_DIR, MASKS_DIR};

/// Result of pairing the files found under `images/` and `gt/`.
#[derive(Clone, Debug, Default)]
pub struct TreeScan {
    pub manifest: Manifest,
    /// Images with no mask of the same stem in the same category.
    pub unmatched_images: Vec<String>,
    /// Masks with no image of the same stem in the same category.
    pub unmatched_masks: Vec<String>,
}

/// Files exactly two levels below `dir` (`<category>/<file>`), sorted.
fn collect_category_files(dir: &Path) -> Result<Vec<PathBuf>, CocoSampleError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| CocoSampleError::OutputTree {
            path: dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn pairing_key(path: &Path) -> Option<(String, String)> {
    let category = path.parent()?.file_name()?.to_string_lossy().to_string();
    let stem = path.file_stem()?.to_string_lossy().to_string();
    Some((category, stem))
}

/// Rebuilds a manifest from the files present under `root`.
pub fn rebuild_from_tree(root: &Path) -> Result<TreeScan, CocoSampleError> {
    let images = collect_category_files(&root.join(IMAGES_DIR))?;
    let masks = collect_category_files(&root.join(MASKS_DIR))?;

    let mut masks_by_key: BTreeMap<(String, String), PathBuf> = BTreeMap::new();
    let mut scan = TreeScan::default();
    for mask in masks {
        match pairing_key(&mask) {
            Some(key) => {
                masks_by_key.insert(key, mask);
            }
            None => scan.unmatched_masks.push(relative_slash_path(root, &mask)?),
        }
    }

    for image in images {
        let mask = pairing_key(&image).and_then(|key| masks_by_key.remove(&key));
        match mask {
            Some(mask) => scan
                .manifest
                .push(ManifestEntry::from_paths(root, &image, &mask)?),
            None => scan.unmatched_images.push(relative_slash_path(root, &image)?),
        }
    }

    for mask in masks_by_key.into_values() {
        scan.unmatched_masks.push(relative_slash_path(root, &mask)?);
    }
    scan.unmatched_masks.sort();

    Ok(scan)
}

/// Files under `images/` and `gt/` that `manifest` does not mention.
pub fn unlisted_files(root: &Path, manifest: &Manifest) -> Result<Vec<String>, CocoSampleError> {
    let listed: HashSet<&str> = manifest
        .entries()
        .iter()
        .flat_map(|entry| [entry.image.as_str(), entry.mask.as_str()])
        .collect();

    let mut unlisted = Vec::new();
    for dir in [IMAGES_DIR, MASKS_DIR] {
        for path in collect_category_files(&root.join(dir))? {
            let rel = relative_slash_path(root, &path)?;
            if !listed.contains(rel.as_str()) {
                unlisted.push(rel);
            }
        }
    }

    Ok(unlisted)
}
