//! COCO instances data: ids, records, the JSON reader and a query index.
//!
//! # Example
//!
//! ```
//! use cocosample::coco::{from_coco_str, CocoIndex};
//!
//! let dataset = from_coco_str(r#"{
//!     "images": [{"id": 1, "width": 4, "height": 4, "file_name": "a.jpg"}],
//!     "categories": [{"id": 1, "name": "cat"}],
//!     "annotations": [{"id": 1, "image_id": 1, "category_id": 1, "area": 4.0,
//!                      "segmentation": [[0, 0, 2, 0, 2, 2, 0, 2]]}]
//! }"#).unwrap();
//!
//! let index = CocoIndex::new(&dataset);
//! assert_eq!(index.images_with_categories(index.category_ids("cat")).len(), 1);
//! ```

mod ids;
mod index;
mod io;
mod model;

pub use ids::{AnnotationId, CategoryId, ImageId};
pub use index::{AreaRange, CocoIndex};
pub use io::{from_coco_slice, from_coco_str, read_coco_json};
pub use model::{
    AnnotationRecord, Category, Dataset, ImageRecord, RleCounts, RleSegmentation, Segmentation,
};
