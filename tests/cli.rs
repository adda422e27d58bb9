use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

fn cocosample() -> Command {
    let mut cmd = Command::cargo_bin("cocosample").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn runs() {
    cocosample().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = cocosample();
    cmd.arg("-V");
    cmd.assert().success().stdout("cocosample 0.1.0\n");
}

#[test]
fn no_subcommand_prints_help_hint() {
    cocosample()
        .assert()
        .success()
        .stdout(predicate::str::contains("cocosample --help"));
}

// Sample subcommand tests

#[test]
fn sample_exports_and_prints_report() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("coco");
    let out = temp.path().join("out");
    common::write_fixture_dataset(&data);

    cocosample()
        .arg("sample")
        .arg("--data-root")
        .arg(&data)
        .args(["--split", common::SPLIT, "--select", "-voc", "--seed", "3"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 2 image(s) across 1 category"))
        .stdout(predicate::str::contains("giraffe"));

    let manifest = fs::read_to_string(out.join("list/coco.txt")).expect("read manifest");
    assert_eq!(manifest.lines().count(), 2);
}

#[test]
fn sample_logs_progress_to_stderr() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("coco");
    let out = temp.path().join("out");
    common::write_fixture_dataset(&data);

    cocosample()
        .env("RUST_LOG", "info")
        .arg("sample")
        .arg("--data-root")
        .arg(&data)
        .args(["--split", common::SPLIT, "--categories", "cat,dog"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains(" 3 images of cat are copied"))
        .stderr(predicate::str::contains(" 1 images of dog are copied"));
}

#[test]
fn sample_custom_manifest_name() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("coco");
    let out = temp.path().join("out");
    common::write_fixture_dataset(&data);

    cocosample()
        .arg("sample")
        .arg("--data-root")
        .arg(&data)
        .args(["--split", common::SPLIT, "--categories", "dog"])
        .args(["--manifest-name", "dogs"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("list/dogs.txt").is_file());
    assert!(!out.join("list/coco.txt").exists());
}

#[test]
fn sample_dry_run_leaves_output_untouched() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("coco");
    let out = temp.path().join("out");
    common::write_fixture_dataset(&data);

    cocosample()
        .arg("sample")
        .arg("--data-root")
        .arg(&data)
        .args(["--split", common::SPLIT, "--dry-run"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("selected 7 image(s)"));

    assert!(!out.exists());
}

#[test]
fn sample_rejects_unknown_selection() {
    let temp = tempfile::tempdir().expect("create temp dir");

    cocosample()
        .arg("sample")
        .arg("--data-root")
        .arg(temp.path())
        .args(["--split", common::SPLIT, "--select", "voc2012"])
        .arg("--out")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unrecognized category selection"));
}

#[test]
fn sample_rejects_zero_quota() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let out = temp.path().join("out");

    cocosample()
        .arg("sample")
        .arg("--data-root")
        .arg(temp.path())
        .args(["--split", common::SPLIT, "--quota", "0"])
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("quota must be greater than 0"));

    assert!(!out.exists());
}

#[test]
fn sample_select_and_categories_conflict() {
    cocosample()
        .args([
            "sample",
            "--data-root",
            "coco",
            "--split",
            "val2014",
            "--out",
            "out",
            "--select",
            "voc",
            "--categories",
            "cat",
        ])
        .assert()
        .failure();
}

#[test]
fn sample_missing_annotation_file_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    cocosample()
        .arg("sample")
        .arg("--data-root")
        .arg(temp.path())
        .args(["--split", "nonexistent"])
        .arg("--out")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// Categories subcommand tests

#[test]
fn categories_lists_resolved_names() {
    let temp = tempfile::tempdir().expect("create temp dir");
    common::write_fixture_dataset(temp.path());

    cocosample()
        .arg("categories")
        .arg("--data-root")
        .arg(temp.path())
        .args(["--split", common::SPLIT, "--select", "voc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cat (5 image(s))"))
        .stdout(predicate::str::contains("airplane (not in dataset)"))
        .stdout(predicate::str::contains("giraffe").not());
}

// Batch subcommand tests

#[test]
fn batch_runs_every_job() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let data = temp.path().join("coco");
    common::write_fixture_dataset(&data);

    let config = serde_json::json!({
        "jobs": [
            {
                "data_root": data,
                "split": common::SPLIT,
                "out_root": temp.path().join("seen"),
                "categories": "voc",
                "seed": 1
            },
            {
                "data_root": data,
                "split": common::SPLIT,
                "out_root": temp.path().join("unseen"),
                "categories": "-voc",
                "min_instance_area_ratio": 0.01
            }
        ]
    });
    let config_path = temp.path().join("jobs.json");
    fs::write(&config_path, config.to_string()).expect("write batch config");

    cocosample()
        .arg("batch")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Job 1/2"))
        .stdout(predicate::str::contains("Job 2/2"));

    assert!(temp.path().join("seen/list/coco.txt").is_file());
    assert!(temp.path().join("unseen/list/coco.txt").is_file());
}

#[test]
fn batch_rejects_malformed_config() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let config_path = temp.path().join("jobs.json");
    fs::write(&config_path, "{\"jobs\": [").expect("write batch config");

    cocosample()
        .arg("batch")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse sampler config"));
}

// Manifest subcommand tests

#[test]
fn manifest_rebuilds_from_tree() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let out = temp.path();
    for (dir, file) in [
        ("images/cat", "a.jpg"),
        ("gt/cat", "a.png"),
        ("images/cat", "b.jpg"),
    ] {
        fs::create_dir_all(out.join(dir)).unwrap();
        fs::write(out.join(dir).join(file), b"x").unwrap();
    }

    cocosample()
        .arg("manifest")
        .arg("--out")
        .arg(out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 entry"))
        .stdout(predicate::str::contains("no mask for images/cat/b.jpg"));

    let manifest = fs::read_to_string(out.join("list/coco.txt")).expect("read manifest");
    assert_eq!(manifest, "images/cat/a.jpg gt/cat/a.png\n");
}
