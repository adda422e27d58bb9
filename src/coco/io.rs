//! COCO instances JSON reader.
//!
//! The schema types below mirror the on-disk layout and are converted into
//! the [`Dataset`] model right after parsing. Fields the sampler never
//! looks at (licenses, info, bbox, captions) are ignored by serde.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::model::{AnnotationRecord, Category, Dataset, ImageRecord, Segmentation};
use super::{AnnotationId, CategoryId, ImageId};
use crate::error::CocoSampleError;

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

#[derive(Debug, Deserialize)]
struct CocoDataset {
    images: Vec<CocoImage>,

    #[serde(default)]
    annotations: Vec<CocoAnnotation>,

    categories: Vec<CocoCategory>,
}

#[derive(Debug, Deserialize)]
struct CocoImage {
    id: u64,
    width: u32,
    height: u32,
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,

    #[serde(default)]
    supercategory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,
    category_id: u64,

    #[serde(default)]
    area: Option<f64>,

    /// Written as `0`/`1` by the reference tools, as a bool by some others.
    #[serde(default, deserialize_with = "deserialize_iscrowd")]
    iscrowd: bool,

    #[serde(default)]
    segmentation: Segmentation,
}

fn deserialize_iscrowd<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IsCrowd {
        Bool(bool),
        Int(u8),
    }

    match IsCrowd::deserialize(deserializer)? {
        IsCrowd::Bool(b) => Ok(b),
        IsCrowd::Int(i) => Ok(i != 0),
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Reads a dataset from a COCO instances JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid COCO JSON.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use cocosample::coco::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("coco/annotations/instances_val2014.json"))?;
/// # Ok::<(), cocosample::CocoSampleError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<Dataset, CocoSampleError> {
    let file = File::open(path).map_err(CocoSampleError::Io)?;
    let reader = BufReader::new(file);

    let coco: CocoDataset =
        serde_json::from_reader(reader).map_err(|source| CocoSampleError::CocoJsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(coco_to_dataset(coco))
}

/// Reads a dataset from a COCO JSON string.
pub fn from_coco_str(json: &str) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDataset = serde_json::from_str(json)?;
    Ok(coco_to_dataset(coco))
}

/// Reads a dataset from raw bytes. Used by the fuzz targets and benches.
pub fn from_coco_slice(bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDataset = serde_json::from_slice(bytes)?;
    Ok(coco_to_dataset(coco))
}

fn coco_to_dataset(coco: CocoDataset) -> Dataset {
    let images = coco
        .images
        .into_iter()
        .map(|img| ImageRecord {
            id: ImageId::new(img.id),
            file_name: img.file_name,
            width: img.width,
            height: img.height,
        })
        .collect();

    let categories = coco
        .categories
        .into_iter()
        .map(|cat| Category {
            id: CategoryId::new(cat.id),
            name: cat.name,
            supercategory: cat.supercategory,
        })
        .collect();

    let annotations = coco
        .annotations
        .into_iter()
        .map(|ann| AnnotationRecord {
            id: AnnotationId::new(ann.id),
            image_id: ImageId::new(ann.image_id),
            category_id: CategoryId::new(ann.category_id),
            area: ann.area,
            iscrowd: ann.iscrowd,
            segmentation: ann.segmentation,
        })
        .collect();

    Dataset {
        images,
        categories,
        annotations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::{RleCounts, RleSegmentation};

    fn sample_coco_json() -> &'static str {
        r#"{
            "info": {"year": 2014, "description": "COCO 2014 Dataset"},
            "licenses": [{"id": 1, "name": "CC BY 4.0"}],
            "images": [
                {"id": 42, "width": 640, "height": 480, "file_name": "COCO_val2014_000000000042.jpg"}
            ],
            "categories": [
                {"id": 1, "name": "person", "supercategory": "person"},
                {"id": 4, "name": "motorcycle", "supercategory": "vehicle"}
            ],
            "annotations": [
                {
                    "id": 10, "image_id": 42, "category_id": 1,
                    "bbox": [10.0, 20.0, 90.0, 60.0], "area": 5400.0, "iscrowd": 0,
                    "segmentation": [[10.0, 20.0, 100.0, 20.0, 100.0, 80.0, 10.0, 80.0]]
                },
                {
                    "id": 11, "image_id": 42, "category_id": 1,
                    "area": 300.0, "iscrowd": 1,
                    "segmentation": {"size": [480, 640], "counts": "0PP0"}
                },
                {
                    "id": 12, "image_id": 42, "category_id": 4,
                    "iscrowd": true,
                    "segmentation": {"size": [480, 640], "counts": [100, 20, 307080]}
                }
            ]
        }"#
    }

    #[test]
    fn parses_images_categories_and_annotations() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");

        assert_eq!(dataset.images.len(), 1);
        assert_eq!(dataset.images[0].id, ImageId(42));
        assert_eq!(dataset.images[0].width, 640);
        assert_eq!(dataset.category_names(), vec!["person", "motorcycle"]);
        assert_eq!(dataset.categories[1].supercategory.as_deref(), Some("vehicle"));
        assert_eq!(dataset.annotations.len(), 3);
    }

    #[test]
    fn iscrowd_accepts_ints_and_bools() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");
        let crowd: Vec<bool> = dataset.annotations.iter().map(|a| a.iscrowd).collect();
        assert_eq!(crowd, vec![false, true, true]);
    }

    #[test]
    fn segmentation_variants_are_distinguished() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");

        assert!(matches!(
            dataset.annotations[0].segmentation,
            Segmentation::Polygons(ref polys) if polys.len() == 1 && polys[0].len() == 8
        ));
        assert_eq!(
            dataset.annotations[1].segmentation,
            Segmentation::Rle(RleSegmentation {
                size: [480, 640],
                counts: RleCounts::Compressed("0PP0".to_string()),
            })
        );
        assert!(matches!(
            dataset.annotations[2].segmentation,
            Segmentation::Rle(RleSegmentation { counts: RleCounts::Runs(ref runs), .. }) if runs.len() == 3
        ));
    }

    #[test]
    fn missing_area_stays_none() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");
        assert_eq!(dataset.annotations[0].area, Some(5400.0));
        assert_eq!(dataset.annotations[2].area, None);
    }

    #[test]
    fn missing_images_array_is_an_error() {
        let result = from_coco_str(r#"{"categories": [], "annotations": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn read_reports_path_on_parse_failure() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("instances_broken.json");
        std::fs::write(&path, "{ not json").expect("write file");

        let err = read_coco_json(&path).expect_err("should fail");
        match err {
            CocoSampleError::CocoJsonParse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
