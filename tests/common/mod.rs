#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const SPLIT: &str = "val2014";

pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.coco.json")
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Writes a COCO dataset tree under `root`:
/// `annotations/instances_<split>.json` plus one BMP per image record.
pub fn write_dataset_from_json(root: &Path, split: &str, json: &str) {
    let annotations = root.join("annotations");
    fs::create_dir_all(&annotations).expect("create annotations dir");
    fs::write(annotations.join(format!("instances_{split}.json")), json)
        .expect("write annotation file");

    let value: serde_json::Value = serde_json::from_str(json).expect("parse fixture json");
    let images = value["images"].as_array().expect("images array");
    for image in images {
        let file_name = image["file_name"].as_str().expect("file_name");
        let width = image["width"].as_u64().expect("width") as u32;
        let height = image["height"].as_u64().expect("height") as u32;
        write_bmp(
            &root.join("images").join(split).join(file_name),
            width,
            height,
        );
    }
}

/// Writes the shared fixture dataset under `root` for [`SPLIT`].
pub fn write_fixture_dataset(root: &Path) {
    let json = fs::read_to_string(fixture_path()).expect("read fixture");
    write_dataset_from_json(root, SPLIT, &json);
}

/// Relative paths of all files under `dir`, sorted.
pub fn files_under(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .expect("under dir")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
