//! cocosample: per-category image and instance-mask sampler for COCO.
//!
//! For each selected category, cocosample shuffles the images containing
//! it, picks one sufficiently large non-crowd instance per image, copies the
//! image and writes a binary mask until the per-category quota is met. The
//! exported pairs are listed in a plain-text manifest.
//!
//! # Modules
//!
//! - [`coco`]: COCO annotation model, reader and lookup index
//! - [`categories`]: category selection policies
//! - [`sample`]: per-category selection
//! - [`mask`]: polygon and RLE rasterization
//! - [`export`]: output tree layout and per-sample export
//! - [`manifest`]: the image/mask list and output-tree scans
//! - [`sampler`]: the end-to-end pipeline and its configuration
//! - [`error`]: Error types for cocosample operations

pub mod categories;
pub mod coco;
pub mod error;
pub mod export;
pub mod manifest;
pub mod mask;
pub mod sample;
pub mod sampler;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use categories::CategorySelection;
use coco::CocoIndex;
use export::OutputLayout;
use sample::{DEFAULT_MIN_INSTANCE_AREA_RATIO, DEFAULT_QUOTA};
use sampler::{SamplerConfig, DEFAULT_MANIFEST_NAME};

pub use error::CocoSampleError;

/// The cocosample CLI application.
#[derive(Parser)]
#[command(name = "cocosample")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Sample images and instance masks per category.
    Sample(SampleArgs),
    /// Print the categories a selection resolves to.
    Categories(CategoriesArgs),
    /// Run every sampler job listed in a JSON file.
    Batch(BatchArgs),
    /// Rebuild the manifest of an existing output tree.
    Manifest(ManifestArgs),
}

/// Where the annotations live.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Dataset root holding `annotations/` and `images/`.
    #[arg(long, env = "COCOSAMPLE_DATA_ROOT")]
    data_root: PathBuf,

    /// Split name, e.g. 'val2014'.
    #[arg(long)]
    split: String,
}

/// Category selection flags shared by several subcommands.
#[derive(clap::Args)]
struct SelectionArgs {
    /// Selection policy ('all', 'voc' or '-voc').
    #[arg(long, conflicts_with = "categories", allow_hyphen_values = true)]
    select: Option<String>,

    /// Explicit comma-separated category names.
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,
}

impl SelectionArgs {
    fn to_selection(&self) -> Result<CategorySelection, CocoSampleError> {
        match &self.select {
            Some(token) => token.parse(),
            None if !self.categories.is_empty() => CategorySelection::explicit(&self.categories),
            None => Ok(CategorySelection::default()),
        }
    }
}

/// Arguments for the sample subcommand.
#[derive(clap::Args)]
struct SampleArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Output root.
    #[arg(long)]
    out: PathBuf,

    /// Samples per category.
    #[arg(long, default_value_t = DEFAULT_QUOTA)]
    quota: usize,

    /// Smallest instance area, as a fraction of the image area.
    #[arg(long, default_value_t = DEFAULT_MIN_INSTANCE_AREA_RATIO)]
    min_area_ratio: f64,

    /// Seed for a reproducible selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Manifest file stem under `list/`.
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    manifest_name: String,

    /// Select without writing anything.
    #[arg(long)]
    dry_run: bool,
}

/// Arguments for the categories subcommand.
#[derive(clap::Args)]
struct CategoriesArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(flatten)]
    selection: SelectionArgs,
}

/// Arguments for the batch subcommand.
#[derive(clap::Args)]
struct BatchArgs {
    /// JSON file with a `jobs` list.
    config: PathBuf,
}

/// Arguments for the manifest subcommand.
#[derive(clap::Args)]
struct ManifestArgs {
    /// Output root to scan.
    #[arg(long)]
    out: PathBuf,

    /// Manifest file stem under `list/`.
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    manifest_name: String,
}

/// Run the cocosample CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CocoSampleError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Sample(args)) => run_sample(args),
        Some(Commands::Categories(args)) => run_categories(args),
        Some(Commands::Batch(args)) => run_batch(args),
        Some(Commands::Manifest(args)) => run_manifest(args),
        None => {
            println!("cocosample {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Per-category image and instance-mask sampler for COCO datasets.");
            println!();
            println!("Run 'cocosample --help' for usage information.");
            Ok(())
        }
    }
}

fn run_sample(args: SampleArgs) -> Result<(), CocoSampleError> {
    let mut config = SamplerConfig::new(args.dataset.data_root, args.dataset.split, args.out)
        .with_categories(args.selection.to_selection()?)
        .with_quota(args.quota)
        .with_min_instance_area_ratio(args.min_area_ratio)
        .with_manifest_name(args.manifest_name);
    config.seed = args.seed;

    let report = if args.dry_run {
        sampler::dry_run(&config)?
    } else {
        sampler::run(&config)?
    };
    print!("{}", report);
    Ok(())
}

fn run_categories(args: CategoriesArgs) -> Result<(), CocoSampleError> {
    let selection = args.selection.to_selection()?;
    let dataset = sampler::load_split(&args.dataset.data_root, &args.dataset.split)?;
    let index = CocoIndex::new(&dataset);

    for name in selection.resolve(&dataset.category_names()) {
        let ids = index.category_ids(&name);
        if ids.is_empty() {
            println!("{} (not in dataset)", name);
        } else {
            let images = index.images_with_categories(ids).len();
            println!("{} ({} image(s))", name, images);
        }
    }
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), CocoSampleError> {
    let batch = sampler::load_batch_config(&args.config)?;

    for (i, job) in batch.jobs.iter().enumerate() {
        println!(
            "Job {}/{}: {} -> {}",
            i + 1,
            batch.jobs.len(),
            job.categories,
            job.out_root.display()
        );
        let report = sampler::run(job)?;
        print!("{}", report);
    }
    Ok(())
}

fn run_manifest(args: ManifestArgs) -> Result<(), CocoSampleError> {
    let layout = OutputLayout::new(&args.out);
    let scan = manifest::rebuild_from_tree(layout.root())?;
    let path = layout.manifest_path(&args.manifest_name);
    scan.manifest.write(&path)?;

    println!(
        "Wrote {} entr{} to {}",
        scan.manifest.len(),
        if scan.manifest.len() == 1 { "y" } else { "ies" },
        path.display()
    );
    for image in &scan.unmatched_images {
        println!("  no mask for {}", image);
    }
    for mask in &scan.unmatched_masks {
        println!("  no image for {}", mask);
    }
    Ok(())
}
