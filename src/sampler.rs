//! The sampling pipeline: resolve categories, select and export samples per
//! category, then write the manifest from the exported pairs.
//!
//! Everything a run needs travels in a [`SamplerConfig`]; there is no
//! global state, so several configurations can run back to back in one
//! process.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::categories::CategorySelection;
use crate::coco::{read_coco_json, CocoIndex, Dataset};
use crate::error::CocoSampleError;
use crate::export::{export_selection, OutputLayout};
use crate::manifest::{unlisted_files, Manifest};
use crate::sample::{
    select_category, validate_sample_options, CategoryReport, SampleOptions, SampleReport,
    DEFAULT_MIN_INSTANCE_AREA_RATIO, DEFAULT_QUOTA,
};

/// Manifest file stem used when none is configured.
pub const DEFAULT_MANIFEST_NAME: &str = "coco";

fn default_quota() -> usize {
    DEFAULT_QUOTA
}

fn default_min_instance_area_ratio() -> f64 {
    DEFAULT_MIN_INSTANCE_AREA_RATIO
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

/// Everything one sampler run needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerConfig {
    /// Dataset root holding `annotations/` and `images/`.
    pub data_root: PathBuf,

    /// Split identifier, e.g. `val2014`.
    pub split: String,

    /// Output root.
    pub out_root: PathBuf,

    #[serde(default)]
    pub categories: CategorySelection,

    #[serde(default = "default_quota")]
    pub quota: usize,

    #[serde(default = "default_min_instance_area_ratio")]
    pub min_instance_area_ratio: f64,

    /// Fixed seed for reproducible runs. Unseeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

impl SamplerConfig {
    pub fn new(
        data_root: impl Into<PathBuf>,
        split: impl Into<String>,
        out_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_root: data_root.into(),
            split: split.into(),
            out_root: out_root.into(),
            categories: CategorySelection::default(),
            quota: DEFAULT_QUOTA,
            min_instance_area_ratio: DEFAULT_MIN_INSTANCE_AREA_RATIO,
            seed: None,
            manifest_name: default_manifest_name(),
        }
    }

    pub fn with_categories(mut self, categories: CategorySelection) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_min_instance_area_ratio(mut self, ratio: f64) -> Self {
        self.min_instance_area_ratio = ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn sample_options(&self) -> SampleOptions {
        SampleOptions {
            quota: self.quota,
            min_instance_area_ratio: self.min_instance_area_ratio,
        }
    }

    pub fn annotation_file(&self) -> PathBuf {
        annotation_file_path(&self.data_root, &self.split)
    }

    /// `<data_root>/images/<split>`
    pub fn image_dir(&self) -> PathBuf {
        self.data_root.join("images").join(&self.split)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.out_root)
    }

    /// Checks the configuration without touching the filesystem.
    pub fn validate(&self) -> Result<(), CocoSampleError> {
        if self.split.trim().is_empty() {
            return Err(CocoSampleError::InvalidConfig {
                message: "split must not be empty".to_string(),
            });
        }

        let name = self.manifest_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(CocoSampleError::InvalidConfig {
                message: format!(
                    "manifest name must be a plain file stem, got '{}'",
                    self.manifest_name
                ),
            });
        }

        validate_sample_options(&self.sample_options())
    }
}

/// `<data_root>/annotations/instances_<split>.json`
pub fn annotation_file_path(data_root: &Path, split: &str) -> PathBuf {
    data_root
        .join("annotations")
        .join(format!("instances_{split}.json"))
}

/// A list of sampler jobs run in order.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    pub jobs: Vec<SamplerConfig>,
}

/// Reads a batch file and validates every job in it.
pub fn load_batch_config(path: &Path) -> Result<BatchConfig, CocoSampleError> {
    let reader = BufReader::new(File::open(path)?);
    let batch: BatchConfig =
        serde_json::from_reader(reader).map_err(|source| CocoSampleError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    for job in &batch.jobs {
        job.validate()?;
    }
    Ok(batch)
}

/// Loads the annotation file named by `config`.
pub fn load_dataset(config: &SamplerConfig) -> Result<Dataset, CocoSampleError> {
    load_split(&config.data_root, &config.split)
}

/// Loads the annotation file of `split` under `data_root`.
pub fn load_split(data_root: &Path, split: &str) -> Result<Dataset, CocoSampleError> {
    let path = annotation_file_path(data_root, split);
    let dataset = read_coco_json(&path)?;
    info!(
        "loaded {} image(s), {} categor(ies), {} annotation(s) from {}",
        dataset.images.len(),
        dataset.categories.len(),
        dataset.annotations.len(),
        path.display()
    );
    Ok(dataset)
}

/// Samples and exports according to `config`, seeding from `config.seed`
/// when set.
pub fn run(config: &SamplerConfig) -> Result<SampleReport, CocoSampleError> {
    match config.seed {
        Some(seed) => run_with_rng(config, &mut StdRng::seed_from_u64(seed)),
        None => run_with_rng(config, &mut rand::rng()),
    }
}

/// Like [`run`], but only selects: nothing is written.
pub fn dry_run(config: &SamplerConfig) -> Result<SampleReport, CocoSampleError> {
    match config.seed {
        Some(seed) => dry_run_with_rng(config, &mut StdRng::seed_from_u64(seed)),
        None => dry_run_with_rng(config, &mut rand::rng()),
    }
}

/// Samples and exports with a caller-supplied random source.
pub fn run_with_rng<R: Rng + ?Sized>(
    config: &SamplerConfig,
    rng: &mut R,
) -> Result<SampleReport, CocoSampleError> {
    execute(config, rng, true)
}

/// Selects with a caller-supplied random source without writing anything.
pub fn dry_run_with_rng<R: Rng + ?Sized>(
    config: &SamplerConfig,
    rng: &mut R,
) -> Result<SampleReport, CocoSampleError> {
    execute(config, rng, false)
}

fn execute<R: Rng + ?Sized>(
    config: &SamplerConfig,
    rng: &mut R,
    export: bool,
) -> Result<SampleReport, CocoSampleError> {
    config.validate()?;

    let dataset = load_dataset(config)?;
    let index = CocoIndex::new(&dataset);
    let categories = config.categories.resolve(&dataset.category_names());
    info!(
        "sampling {} categor(ies) ({}) from split {}",
        categories.len(),
        config.categories,
        config.split
    );

    let opts = config.sample_options();
    let layout = config.layout();
    let image_dir = config.image_dir();
    let mut manifest = Manifest::new();
    let mut report = SampleReport::new();

    for category in &categories {
        let sample = select_category(&index, category, &opts, rng);
        if !sample.known {
            warn!("category '{}' is not in the dataset", category);
        }

        if export {
            layout.ensure_category_dirs(category)?;
            for selection in &sample.selections {
                manifest.push(export_selection(selection, &image_dir, &layout, category)?);
            }
            info!("{:>2} images of {} are copied", sample.selections.len(), category);
        } else {
            info!("{:>2} images of {} selected", sample.selections.len(), category);
        }

        report.add(CategoryReport {
            name: category.clone(),
            known: sample.known,
            pool_size: sample.pool_size,
            exported: sample.selections.len(),
            quota: opts.quota,
        });
    }

    if export {
        if let Some(entry) = manifest.dangling_entries(layout.root()).first() {
            return Err(CocoSampleError::OutputTree {
                path: layout.root().to_path_buf(),
                message: format!("manifest entry '{entry}' points at a missing file"),
            });
        }

        let manifest_path = layout.manifest_path(&config.manifest_name);
        manifest.write(&manifest_path)?;
        info!(
            "wrote {} manifest entr(ies) to {}",
            manifest.len(),
            manifest_path.display()
        );

        report.unlisted_files = unlisted_files(layout.root(), &manifest)?;
        if !report.unlisted_files.is_empty() {
            warn!(
                "{} file(s) under {} are left over from earlier runs and not in the manifest",
                report.unlisted_files.len(),
                layout.root().display()
            );
        }
        report.manifest_path = Some(manifest_path);
    }

    Ok(report)
}
