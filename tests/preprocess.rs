//! End-to-end runs of the preprocessing pipeline, with shell stubs standing in for the external tools.
#![cfg(unix)]
use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use bitextprep::{
    error::Error,
    filtering::{PerLine, QeBackend},
    pipelines::{Pipeline, Preprocess, PreprocessConfig, QeConfig},
    processing::{ExitPolicy, Toolchain},
};
use serial_test::serial;
use tempfile::{tempdir, TempDir};

const SOURCE: &str = "hello\nbad source\nhow are you\n";
const TARGET: &str = "hallo\nschlecht\nwie geht's\n";

fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stubs: normalization, tokenization and BPE copy stdin to stdout,
/// cleaning copies both files, binarization records its arguments.
fn toolchain(dir: &Path) -> Toolchain {
    Toolchain {
        sacremoses: stub(dir, "sacremoses", "exec cat"),
        fast: stub(dir, "fast", "exec cat"),
        clean_script: stub(dir, "clean", "cp \"$3.$4\" \"$6.$4\" && cp \"$3.$5\" \"$6.$5\""),
        fairseq_preprocess: stub(
            dir,
            "fairseq-preprocess",
            r#"args="$*"
while [ "$#" -gt 0 ]; do
    if [ "$1" = "--destdir" ]; then dest="$2"; fi
    shift
done
echo "$args" > "$dest/args""#,
        ),
    }
}

/// Corpus with train, valid and test subsets, plus the stubbed tools.
fn setup() -> (TempDir, PathBuf, PreprocessConfig) {
    let root = tempdir().unwrap();
    let tools_dir = root.path().join("tools");
    let data = root.path().join("data");
    fs::create_dir(&tools_dir).unwrap();
    fs::create_dir(&data).unwrap();

    for subset in ["train", "valid", "test"] {
        fs::write(data.join(format!("{subset}.en-de.en")), SOURCE).unwrap();
        fs::write(data.join(format!("{subset}.en-de.de")), TARGET).unwrap();
    }

    let mut config = PreprocessConfig::new(&data);
    config.vocab = root.path().join("vocab").to_string_lossy().parse().unwrap();
    config.tools = toolchain(&tools_dir);
    (root, data, config)
}

#[test]
#[serial]
fn keep_all() {
    let (_root, data, mut config) = setup();
    config.qe = Some(QeConfig::new(QeBackend::KeepAll));

    let dirs = Preprocess::new(config).run().unwrap();
    assert_eq!(dirs.qe, data.join("keep-all"));
    assert_eq!(dirs.prep, data.join("keep-all/FSQ"));
    assert_eq!(dirs.clean, data.join("keep-all/FSQ/clean"));
    assert_eq!(dirs.bin, data.join("keep-all/FSQ/clean/bin"));

    for dir in [&dirs.qe, &dirs.prep, &dirs.clean] {
        assert_eq!(fs::read_to_string(dir.join("valid.en-de.en")).unwrap(), SOURCE);
        assert_eq!(fs::read_to_string(dir.join("valid.en-de.de")).unwrap(), TARGET);
    }

    let args = fs::read_to_string(dirs.bin.join("args")).unwrap();
    let clean = dirs.clean.display();
    assert!(args.starts_with(&format!(
        "--trainpref {clean}/train.en-de --validpref {clean}/valid.en-de --testpref {clean}/test.en-de \
         --source-lang en --target-lang de"
    )));
    assert!(args.contains("--workers 1 --multiple-files"));
}

#[test]
#[serial]
fn filtered_pairs_stay_aligned() {
    let (_root, data, mut config) = setup();
    config.qe = Some(QeConfig::new(QeBackend::KeepAll));
    config.qe_dir = Some(data.join("filtered"));

    let mut qe = PerLine::new(|src: &str, _: &str| !src.starts_with("bad"));
    let dirs = Preprocess::new(config).run_with(Some(&mut qe)).unwrap();

    for dir in [&dirs.qe, &dirs.clean] {
        assert_eq!(
            fs::read_to_string(dir.join("train.en-de.en")).unwrap(),
            "hello\nhow are you\n"
        );
        assert_eq!(
            fs::read_to_string(dir.join("train.en-de.de")).unwrap(),
            "hallo\nwie geht's\n"
        );
    }
    assert!(dirs.bin.join("args").exists());
}

#[test]
#[serial]
fn without_filter_nor_clean() {
    let (_root, data, mut config) = setup();
    fs::remove_file(data.join("valid.en-de.en")).unwrap();
    fs::remove_file(data.join("valid.en-de.de")).unwrap();
    config.clean = None;

    let dirs = Preprocess::new(config).run().unwrap();
    assert_eq!(dirs.qe, data);
    assert_eq!(dirs.clean, data.join("FSQ"));
    assert_eq!(dirs.bin, data.join("FSQ/bin"));
    assert!(!data.join("FSQ/valid.en-de.en").exists());

    let args = fs::read_to_string(dirs.bin.join("args")).unwrap();
    assert!(args.contains("--trainpref"));
    assert!(!args.contains("--validpref"));
    assert!(args.contains("--testpref"));
}

#[test]
#[serial]
fn failing_tool() {
    let (root, _data, mut config) = setup();
    config.tools.clean_script = stub(root.path(), "failing-clean", "exit 3");

    let result = Preprocess::new(config).run();
    assert!(matches!(
        result,
        Err(Error::StageExecution {
            status: Some(3),
            ..
        })
    ));
}

#[test]
#[serial]
fn failing_tool_ignored() {
    let (root, data, mut config) = setup();
    config.tools.clean_script = stub(root.path(), "failing-clean", "exit 3");
    config.exit_policy = ExitPolicy::Ignore;

    // nothing gets cleaned, so there is nothing to binarize
    let dirs = Preprocess::new(config).run().unwrap();
    assert_eq!(dirs.clean, data.join("FSQ/clean"));
    assert!(dirs.bin.exists());
    assert!(!dirs.bin.join("args").exists());
}

#[test]
#[serial]
fn second_run_refuses_to_overwrite() {
    let (_root, data, config) = setup();

    Preprocess::new(config.clone()).run().unwrap();
    let result = Preprocess::new(config).run();
    assert!(matches!(result, Err(Error::OutputAlreadyExists(p)) if p == data.join("FSQ")));
}
