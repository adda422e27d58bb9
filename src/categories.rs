//! Category selection policies.
//!
//! A selection is either an explicit list of names or one of three tokens
//! resolved against the dataset's category list: every category, the 20
//! PASCAL VOC categories, or every category outside PASCAL VOC.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CocoSampleError;

/// The 20 PASCAL VOC class names, in VOC's own vocabulary.
pub const PASCAL_VOC_CATEGORIES: [&str; 20] = [
    "person",
    "bird",
    "cat",
    "cow",
    "dog",
    "horse",
    "sheep",
    "aeroplane",
    "bicycle",
    "boat",
    "bus",
    "car",
    "motorbike",
    "train",
    "bottle",
    "chair",
    "diningtable",
    "pottedplant",
    "sofa",
    "tvmonitor",
];

/// VOC names that COCO spells differently.
const VOC_TO_COCO: [(&str, &str); 6] = [
    ("aeroplane", "airplane"),
    ("motorbike", "motorcycle"),
    ("diningtable", "dining table"),
    ("pottedplant", "potted plant"),
    ("sofa", "couch"),
    ("tvmonitor", "tv"),
];

/// Translates a VOC class name into the COCO vocabulary.
pub fn voc_to_coco_name(name: &str) -> &str {
    VOC_TO_COCO
        .iter()
        .find(|(voc, _)| *voc == name)
        .map(|(_, coco)| *coco)
        .unwrap_or(name)
}

/// The PASCAL VOC categories as COCO names them.
pub fn pascal_voc_in_coco_names() -> Vec<&'static str> {
    PASCAL_VOC_CATEGORIES
        .iter()
        .map(|&name| voc_to_coco_name(name))
        .collect()
}

/// Dataset names not present in `reference`, in dataset order.
pub fn complement(dataset_names: &[String], reference: &[&str]) -> Vec<String> {
    let reference: HashSet<&str> = reference.iter().copied().collect();
    dataset_names
        .iter()
        .filter(|name| !reference.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Which categories a run samples.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SelectionSpec", into = "SelectionSpec")]
pub enum CategorySelection {
    /// Exactly these names, in this order.
    Explicit(Vec<String>),
    /// Every category in the dataset.
    #[default]
    All,
    /// The PASCAL VOC categories.
    PascalVoc,
    /// Every dataset category that is not a PASCAL VOC category.
    NotPascalVoc,
}

impl CategorySelection {
    /// Resolves the policy against the dataset's category names.
    ///
    /// The result has no duplicates. Dataset order is kept for the token
    /// policies and caller order for explicit lists.
    pub fn resolve(&self, dataset_names: &[String]) -> Vec<String> {
        let names: Vec<String> = match self {
            CategorySelection::Explicit(names) => names.clone(),
            CategorySelection::All => dataset_names.to_vec(),
            CategorySelection::PascalVoc => pascal_voc_in_coco_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            CategorySelection::NotPascalVoc => {
                complement(dataset_names, &pascal_voc_in_coco_names())
            }
        };

        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Builds an explicit selection from user-supplied names.
    pub fn explicit<I, S>(names: I) -> Result<Self, CocoSampleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return Err(CocoSampleError::InvalidSelection(
                "explicit category list is empty".to_string(),
            ));
        }
        Ok(CategorySelection::Explicit(names))
    }
}

impl FromStr for CategorySelection {
    type Err = CocoSampleError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "all" | "coco" => Ok(CategorySelection::All),
            "voc" | "pascalvoc" => Ok(CategorySelection::PascalVoc),
            "-voc" | "-pascalvoc" | "unseen" => Ok(CategorySelection::NotPascalVoc),
            other => Err(CocoSampleError::InvalidSelection(format!(
                "'{}' (supported: all, voc, -voc)",
                other
            ))),
        }
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelection::Explicit(names) => write!(f, "[{}]", names.join(", ")),
            CategorySelection::All => write!(f, "all"),
            CategorySelection::PascalVoc => write!(f, "voc"),
            CategorySelection::NotPascalVoc => write!(f, "-voc"),
        }
    }
}

/// Config-file form: a policy token or a list of names.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SelectionSpec {
    Token(String),
    Names(Vec<String>),
}

impl TryFrom<SelectionSpec> for CategorySelection {
    type Error = CocoSampleError;

    fn try_from(raw: SelectionSpec) -> Result<Self, Self::Error> {
        match raw {
            SelectionSpec::Token(token) => token.parse(),
            SelectionSpec::Names(names) => CategorySelection::explicit(names),
        }
    }
}

impl From<CategorySelection> for SelectionSpec {
    fn from(selection: CategorySelection) -> Self {
        match selection {
            CategorySelection::Explicit(names) => SelectionSpec::Names(names),
            other => SelectionSpec::Token(other.to_string()),
        }
    }
}
