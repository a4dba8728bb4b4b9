use composer_cleanup::{
    clean, Catalog, CleanOptions, Cleanup, PackageDescriptor, PackageOperation, RecordingReporter,
    Verbosity,
};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write_sized(path: &Path, size: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; size]).unwrap();
}

/// README.md (100), LICENSE (50), src/main.ext (200), tests/ (500 in total)
fn setup_package() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();

    write_sized(&root.join("README.md"), 100);
    write_sized(&root.join("LICENSE"), 50);
    write_sized(&root.join("src/main.ext"), 200);
    write_sized(&root.join("tests/unit/FooTest.ext"), 300);
    write_sized(&root.join("tests/fixtures/data.json"), 150);
    write_sized(&root.join("tests/bootstrap.ext"), 50);

    dir
}

fn scenario_catalog() -> Catalog {
    Catalog::from_toml_str(
        r#"
        global = ["*.md", "LICENSE"]

        [packages]
        "acme/widget" = ["tests"]
        "#,
    )
    .unwrap()
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_end_to_end_scenario() {
    let dir = setup_package();
    let catalog = scenario_catalog();
    let cleanup = Cleanup::new(&catalog, CleanOptions::default());
    let mut reporter = RecordingReporter::new(Verbosity::Normal);

    let package = PackageDescriptor::new("acme/widget", "library", Some(dir.path().to_path_buf()));
    let result = cleanup
        .on_post_package_event(&PackageOperation::Install(package), &mut reporter)
        .unwrap();

    assert_eq!(result.bytes_freed, 650);
    assert_eq!(result.files_removed, 3);

    assert!(!dir.path().join("README.md").exists());
    assert!(!dir.path().join("LICENSE").exists());
    assert!(!dir.path().join("tests").exists());
    assert!(dir.path().join("src/main.ext").exists());
    assert!(reporter.errors.is_empty());
}

#[test]
fn test_rule_order_does_not_change_totals() {
    let global = strings(&["*.md", "LICENSE", "tests/unit"]);
    let package = strings(&["tests", "README*"]);

    let forward_dir = setup_package();
    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let mut forward = clean(forward_dir.path(), &global, CleanOptions::default(), &mut reporter);
    forward += clean(forward_dir.path(), &package, CleanOptions::default(), &mut reporter);

    let reverse_dir = setup_package();
    let mut reverse = clean(reverse_dir.path(), &package, CleanOptions::default(), &mut reporter);
    reverse += clean(reverse_dir.path(), &global, CleanOptions::default(), &mut reporter);

    // Nested rules split `tests` differently per order, so only bytes agree
    assert_eq!(forward.bytes_freed, 650);
    assert_eq!(forward.bytes_freed, reverse.bytes_freed);
    assert!(reporter.errors.is_empty());
}

#[test]
fn test_disjoint_rule_order_does_not_change_totals() {
    let global = strings(&["*.md", "LICENSE"]);
    let package = strings(&["tests", "src/*.ext"]);

    let forward_dir = setup_package();
    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let mut forward = clean(forward_dir.path(), &global, CleanOptions::default(), &mut reporter);
    forward += clean(forward_dir.path(), &package, CleanOptions::default(), &mut reporter);

    let reverse_dir = setup_package();
    let mut reverse = clean(reverse_dir.path(), &package, CleanOptions::default(), &mut reporter);
    reverse += clean(reverse_dir.path(), &global, CleanOptions::default(), &mut reporter);

    assert_eq!(forward.bytes_freed, 850);
    assert_eq!(forward.files_removed, 4);
    assert_eq!(forward, reverse);
    assert!(reporter.errors.is_empty());
}

#[test]
fn test_batch_pass_is_idempotent() {
    let dir = setup_package();
    let catalog = scenario_catalog();
    let cleanup = Cleanup::new(&catalog, CleanOptions::default());
    let packages = [PackageDescriptor::new(
        "acme/widget",
        "library",
        Some(dir.path().to_path_buf()),
    )];

    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let first = cleanup.on_post_autoload_dump(&packages, &mut reporter);
    let second = cleanup.on_post_autoload_dump(&packages, &mut reporter);

    assert_eq!(first.bytes_freed, 650);
    assert_eq!(second.bytes_freed, 0);
    assert_eq!(second.files_removed, 0);
    assert_eq!(reporter.infos.len(), 2);
    assert!(reporter.infos[1].contains("(0 Kb saved, 0 files deleted)"));
}

#[test]
fn test_uppercase_variant_is_a_distinct_rule() {
    let dir = tempdir().unwrap();
    write_sized(&dir.path().join("README.md"), 10);
    write_sized(&dir.path().join("CHANGES.MD"), 20);

    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let lower = clean(dir.path(), &strings(&["*.md"]), CleanOptions::default(), &mut reporter);
    assert_eq!(lower.bytes_freed, 10);
    assert!(dir.path().join("CHANGES.MD").exists());

    let upper = clean(dir.path(), &strings(&["*.MD"]), CleanOptions::default(), &mut reporter);
    assert_eq!(upper.bytes_freed, 20);
    assert!(!dir.path().join("CHANGES.MD").exists());
}

#[test]
fn test_dry_run_reports_same_totals() {
    let dir = setup_package();
    let catalog = scenario_catalog();
    let cleanup = Cleanup::new(&catalog, CleanOptions { dry_run: true });
    let packages = [PackageDescriptor::new(
        "acme/widget",
        "library",
        Some(dir.path().to_path_buf()),
    )];

    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let total = cleanup.on_post_autoload_dump(&packages, &mut reporter);

    assert_eq!(total.bytes_freed, 650);
    assert_eq!(total.files_removed, 3);
    assert!(dir.path().join("README.md").exists());
    assert!(dir.path().join("tests").exists());
    assert!(reporter.infos.last().unwrap().ends_with("[dry run]"));
}

#[test]
fn test_parent_segments_never_reach_outside_root() {
    let outer = tempdir().unwrap();
    let root = outer.path().join("vendor/acme/widget");
    write_sized(&root.join("README.md"), 10);
    write_sized(&outer.path().join("vendor/acme/other/README.md"), 10);

    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let result = clean(
        &root,
        &strings(&["../other/README.md", "../*", "/../../*"]),
        CleanOptions::default(),
        &mut reporter,
    );

    assert_eq!(result.files_removed, 0);
    assert!(outer.path().join("vendor/acme/other/README.md").exists());
    assert!(root.join("README.md").exists());
}

#[test]
fn test_builtin_rules_clean_a_symfony_component() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_sized(&root.join("Finder.php"), 400);
    write_sized(&root.join("Tests/FinderTest.php"), 1000);
    write_sized(&root.join("CHANGELOG.md"), 100);
    write_sized(&root.join("LICENSE"), 20);
    write_sized(&root.join(".gitattributes"), 5);
    write_sized(&root.join("phpunit.xml.dist"), 30);

    let catalog = Catalog::builtin().unwrap();
    let cleanup = Cleanup::new(&catalog, CleanOptions::default());
    let package = PackageDescriptor::new("symfony/finder", "library", Some(root.to_path_buf()));
    let mut reporter = RecordingReporter::new(Verbosity::Normal);

    let result = cleanup
        .on_post_package_event(&PackageOperation::Install(package), &mut reporter)
        .unwrap();

    assert_eq!(result.bytes_freed, 1155);
    assert_eq!(result.files_removed, 5);
    assert!(root.join("Finder.php").exists());
}

#[test]
fn test_builtin_rules_keep_selected_carbon_locales() {
    let dir = tempdir().unwrap();
    let lang = dir.path().join("src/Carbon/Lang");
    let files = [
        "ar.php", "ar_SA.php", "en.php", "en_GB.php", "fr.php", "de.php", "de_AT.php",
        "zh_Hant_TW.php",
    ];
    for name in files {
        write_sized(&lang.join(name), 10);
    }

    let catalog = Catalog::builtin().unwrap();
    let mut reporter = RecordingReporter::new(Verbosity::Normal);
    let result = clean(
        dir.path(),
        catalog.rules_for("nesbot/carbon"),
        CleanOptions::default(),
        &mut reporter,
    );

    assert_eq!(result.files_removed, 3);
    for kept in ["ar.php", "ar_SA.php", "en.php", "en_GB.php", "fr.php"] {
        assert!(lang.join(kept).exists(), "{kept} should be kept");
    }
    for removed in ["de.php", "de_AT.php", "zh_Hant_TW.php"] {
        assert!(!lang.join(removed).exists(), "{removed} should be removed");
    }
}
