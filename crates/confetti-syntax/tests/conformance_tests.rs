//! Fixture-driven conformance run over `tests/conformance`.
//!
//! For every `<name>.conf`:
//! - `<name>.ext_*` present: exercises an optional extension, skipped
//! - `<name>.fail` present: parsing must fail
//! - otherwise `<name>.pass` must exist and equal the rendering (both trimmed)

use confetti_syntax::parse_bytes;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("conformance")
}

fn has_extension_marker(dir: &Path, stem: &str) -> bool {
    let prefix = format!("{}.ext_", stem);
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
}

#[test]
fn test_conformance_fixtures() {
    let dir = fixture_dir();
    let mut conf_files: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "conf"))
        .collect();
    conf_files.sort();

    assert!(!conf_files.is_empty(), "no fixtures found in {}", dir.display());

    let mut failures = Vec::new();
    let mut checked = 0;

    for conf in &conf_files {
        let stem = conf.file_stem().unwrap().to_string_lossy().into_owned();

        if has_extension_marker(&dir, &stem) {
            continue;
        }
        checked += 1;

        let input = fs::read(conf).unwrap();
        let result = parse_bytes(&input);

        if conf.with_extension("fail").exists() {
            if let Ok(unit) = result {
                failures.push(format!("{}: expected failure, got:\n{}", stem, unit.render()));
            }
            continue;
        }

        let pass = conf.with_extension("pass");
        let expected = match fs::read_to_string(&pass) {
            Ok(text) => text,
            Err(_) => {
                failures.push(format!("{}: no .pass file", stem));
                continue;
            }
        };

        match result {
            Ok(unit) => {
                let actual = unit.render();
                if actual.trim() != expected.trim() {
                    failures.push(format!(
                        "{}: output mismatch\n--- expected\n{}\n--- actual\n{}",
                        stem,
                        expected.trim(),
                        actual.trim()
                    ));
                }
            }
            Err(e) => failures.push(format!("{}: unexpected error: {}", stem, e)),
        }
    }

    assert!(checked > 0);
    assert!(failures.is_empty(), "conformance failures:\n{}", failures.join("\n\n"));
}
