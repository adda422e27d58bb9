//! Run summary printed after sampling.

use std::fmt;
use std::path::PathBuf;

/// Summary of one sampler run.
#[derive(Clone, Debug, Default)]
pub struct SampleReport {
    /// One entry per resolved category, in processing order.
    pub categories: Vec<CategoryReport>,

    /// Where the manifest was written. `None` for dry runs.
    pub manifest_path: Option<PathBuf>,

    /// Files under `images/` or `gt/` that the manifest does not reference,
    /// as paths relative to the output root.
    pub unlisted_files: Vec<String>,
}

impl SampleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: CategoryReport) {
        self.categories.push(category);
    }

    /// Total samples across all categories.
    pub fn exported_count(&self) -> usize {
        self.categories.iter().map(|c| c.exported).sum()
    }

    /// Categories that produced fewer samples than the quota.
    pub fn short_categories(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| c.exported < c.quota)
    }

    pub fn is_dry_run(&self) -> bool {
        self.manifest_path.is_none()
    }
}

impl fmt::Display for SampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.is_dry_run() {
            "selected"
        } else {
            "exported"
        };
        writeln!(
            f,
            "Sampling {} {} image(s) across {} categor{}",
            verb,
            self.exported_count(),
            self.categories.len(),
            if self.categories.len() == 1 { "y" } else { "ies" }
        )?;

        for category in &self.categories {
            writeln!(f, "  {}", category)?;
        }

        if let Some(path) = &self.manifest_path {
            writeln!(f, "Manifest: {}", path.display())?;
        }

        if !self.unlisted_files.is_empty() {
            writeln!(
                f,
                "Warning: {} file(s) in the output tree are not listed in the manifest",
                self.unlisted_files.len()
            )?;
        }

        Ok(())
    }
}

/// Per-category counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryReport {
    pub name: String,
    /// False when the dataset has no category with this name.
    pub known: bool,
    /// Images that contain the category.
    pub pool_size: usize,
    pub exported: usize,
    pub quota: usize,
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.known {
            return write!(f, "{:>3}/{} {} (not in dataset)", 0, self.quota, self.name);
        }
        write!(
            f,
            "{:>3}/{} {} ({} candidate image(s))",
            self.exported, self.quota, self.name, self.pool_size
        )
    }
}
