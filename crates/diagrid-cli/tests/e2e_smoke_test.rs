use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use diagrid_cli::{Args, run};

/// Demos live at the workspace root, relative to workspace not the crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all graph documents (.json and .toml) from a directory
fn collect_documents(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("json" | "toml")
                    )
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args_for(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        archetype: None,
        config: None,
        seed: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_documents(demos_dir());

    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &demos {
        let output_filename = format!(
            "{}.layout.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args_for(demo_path, &output_path)) {
            Ok(result) if result.success && result.quality_metrics.overlap_count == 0 => {
                let written = fs::read_to_string(&output_path).unwrap();
                let value: serde_json::Value = serde_json::from_str(&written).unwrap();
                assert_eq!(value["nodes"].as_array().unwrap().len(), result.nodes.len());
            }
            Ok(result) => failed_demos.push((
                demo_path.clone(),
                format!(
                    "success = {}, overlaps = {}",
                    result.success, result.quality_metrics.overlap_count
                ),
            )),
            Err(e) => failed_demos.push((demo_path.clone(), e.to_string())),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} demos passed", demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_documents(demos_dir().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.layout.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args_for(demo_path, &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_overrides_and_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_dir().join("flow.json");
    let output = temp_dir.path().join("flow-as-cycle.json");

    let mut args = args_for(&input, &output);
    args.archetype = Some("cycle".parse().unwrap());
    args.config = Some(
        demos_dir()
            .join("config")
            .join("layout.toml")
            .to_string_lossy()
            .to_string(),
    );
    args.seed = Some(99);

    let first = run(&args).expect("layout succeeds");
    let second = run(&args).expect("layout succeeds");

    assert!(first.success);
    assert!(first.warnings.is_empty(), "{:?}", first.warnings);
    assert!(first.bounds.max_x <= 1600.0 + 0.01);
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.edges, second.edges);
}

#[test]
fn e2e_unsupported_extension() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("graph.yaml");
    fs::write(&input, "nodes: []\n").unwrap();

    let err = run(&args_for(&input, &temp_dir.path().join("out.json"))).unwrap_err();

    assert!(matches!(err, diagrid_cli::CliError::UnsupportedFormat(_)));
}
