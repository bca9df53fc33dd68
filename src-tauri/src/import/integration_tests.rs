/// Integration tests for batch import and folder normalization.
/// These run against real temp directories with a pinned clock so generated
/// names can be asserted exactly.
use crate::import::batch::{import_batch, import_batch_with, BatchImportRequest, SOURCE_MISSING};
use crate::import::naming::{Clock, FixedClock};
use crate::import::normalize::{normalize_existing_folder, normalize_existing_folder_with};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TS: &str = "20250101-120000-000";

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    (tmp, src, dst)
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, contents).unwrap();
    p
}

fn request(files: Vec<PathBuf>, target: &Path, product_id: Option<&str>) -> BatchImportRequest {
    BatchImportRequest {
        files,
        target_folder: target.to_path_buf(),
        product_id: product_id.map(str::to_string),
    }
}

fn run_fixed(req: &BatchImportRequest) -> crate::import::batch::ImportResult {
    import_batch_with(req, &FixedClock::new_year_noon(), &mut rand::thread_rng()).unwrap()
}

/// Timestamp segment of a canonical name: `AD006_<ts>_001.jpg` → `<ts>`.
fn timestamp_of(name: &str) -> &str {
    name.split('_').nth(1).unwrap()
}

/// Fill `dir` with `{stem}{ext}` and every `{stem}_{RRRR}{ext}`, so the
/// suffix resolver cannot find a free name for that stem.
fn occupy_every_name(dir: &Path, stem: &str, ext: &str) {
    fs::create_dir_all(dir).unwrap();
    write_file(dir, &format!("{}{}", stem, ext), b"old");
    for suffix in 0..10_000 {
        write_file(dir, &format!("{}_{:04}{}", stem, suffix, ext), b"old");
    }
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

/// Index segment of a canonical name: `AD006_<ts>_001.jpg` → `001`.
fn index_of(name: &str) -> &str {
    &name.split('_').nth(2).unwrap()[..3]
}

// ── Scenario 1: two files, empty target ───────────────────────────────────────

#[test]
fn test_two_files_share_timestamp_and_sequence() {
    let (_tmp, src, dst) = setup();
    let a = write_file(&src, "a.jpg", b"a");
    let b = write_file(&src, "b.jpg", b"b");

    let result = run_fixed(&request(vec![a, b], &dst, Some("AD006")));

    assert!(result.failed.is_empty(), "failed: {:?}", result.failed);
    assert_eq!(
        result.success,
        vec![
            format!("AD006_{}_001.jpg", TS),
            format!("AD006_{}_002.jpg", TS),
        ]
    );
    assert_eq!(fs::read(dst.join(&result.success[0])).unwrap(), b"a");
    assert_eq!(fs::read(dst.join(&result.success[1])).unwrap(), b"b");
}

#[test]
fn test_shared_timestamp_with_real_clock() {
    let (_tmp, src, dst) = setup();
    let files: Vec<PathBuf> = (0..5)
        .map(|i| write_file(&src, &format!("p{}.jpg", i), b"x"))
        .collect();

    let result = import_batch(&request(files, &dst, Some("AD006"))).unwrap();

    assert_eq!(result.success.len(), 5);
    let stamps: HashSet<&str> = result.success.iter().map(|n| timestamp_of(n)).collect();
    assert_eq!(stamps.len(), 1, "all names must share one timestamp: {:?}", result.success);
    let re = Regex::new(r"^\d{8}-\d{6}-\d{3}$").unwrap();
    assert!(re.is_match(stamps.iter().next().unwrap()));
}

// ── Scenario 2: pre-existing name forces a suffix ─────────────────────────────

#[test]
fn test_existing_name_gets_random_suffix() {
    let (_tmp, src, dst) = setup();
    fs::create_dir_all(&dst).unwrap();
    let taken = format!("AD006_{}_001.jpg", TS);
    write_file(&dst, &taken, b"original");
    let a = write_file(&src, "a.jpg", b"a");
    let b = write_file(&src, "b.jpg", b"b");

    let result = run_fixed(&request(vec![a, b], &dst, Some("AD006")));

    assert!(result.failed.is_empty());
    let first = Regex::new(&format!(r"^AD006_{}_001_\d{{4}}\.jpg$", TS)).unwrap();
    assert!(first.is_match(&result.success[0]), "got {}", result.success[0]);
    assert_eq!(result.success[1], format!("AD006_{}_002.jpg", TS));
    assert_eq!(fs::read(dst.join(&taken)).unwrap(), b"original");
}

// ── Scenario 3: missing source, no product id ─────────────────────────────────

#[test]
fn test_missing_source_is_reported_not_thrown() {
    let (tmp, _src, dst) = setup();
    let missing = tmp.path().join("missing.jpg");

    let result = import_batch(&request(vec![missing], &dst, None)).unwrap();

    assert!(result.success.is_empty());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].file, "missing.jpg");
    assert_eq!(result.failed[0].error, SOURCE_MISSING);
}

// ── Scenario 4: normalize skips canonical, renames the rest ───────────────────

#[test]
fn test_normalize_skips_canonical_and_renames_from_index_one() {
    let tmp = tempfile::tempdir().unwrap();
    let canonical = "AD006_20250101-120000-000_001.jpg";
    write_file(tmp.path(), canonical, b"c");
    write_file(tmp.path(), "photo.png", b"p");

    let clock = FixedClock(FixedClock::new_year_noon().now() + chrono::Duration::hours(1));
    let report =
        normalize_existing_folder_with(tmp.path(), "AD006", &clock, &mut rand::thread_rng())
            .unwrap();

    assert!(report.success);
    assert_eq!(report.skipped, vec![canonical.to_string()]);
    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.renamed[0].old_name, "photo.png");
    assert_eq!(report.renamed[0].new_name, "AD006_20250101-130000-000_001.png");
    assert!(tmp.path().join("AD006_20250101-130000-000_001.png").exists());
    assert!(!tmp.path().join("photo.png").exists());
}

#[test]
fn test_normalize_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["b.jpg", "a.JPG", "c.png", "notes"] {
        write_file(tmp.path(), name, name.as_bytes());
    }

    let first = normalize_existing_folder(tmp.path(), "AD006").unwrap();
    assert_eq!(first.renamed.len(), 4);
    assert!(first.failed.is_empty());

    let second = normalize_existing_folder(tmp.path(), "AD006").unwrap();
    assert!(second.renamed.is_empty());
    assert_eq!(second.skipped.len(), 4);
}

#[test]
fn test_normalize_same_instant_names_stay_distinct() {
    // A pinned clock gives every file the same timestamp; indices keep them apart.
    let tmp = tempfile::tempdir().unwrap();
    write_file(tmp.path(), "x.jpg", b"x");
    write_file(tmp.path(), "y.jpg", b"y");

    let report = normalize_existing_folder_with(
        tmp.path(),
        "AD006",
        &FixedClock::new_year_noon(),
        &mut rand::thread_rng(),
    )
    .unwrap();

    let names: Vec<&str> = report.renamed.iter().map(|r| r.new_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            format!("AD006_{}_001.jpg", TS),
            format!("AD006_{}_002.jpg", TS),
        ]
    );
}

#[test]
fn test_normalize_never_replaces_existing_file() {
    // Every name for index 001 is taken: the first file must fail, not
    // overwrite, and the next file still gets renamed.
    let tmp = tempfile::tempdir().unwrap();
    occupy_every_name(tmp.path(), &format!("AD006_{}_001", TS), ".png");
    write_file(tmp.path(), "a.png", b"a");
    write_file(tmp.path(), "photo.png", b"p");
    let before = file_count(tmp.path());

    let report = normalize_existing_folder_with(
        tmp.path(),
        "AD006",
        &FixedClock::new_year_noon(),
        &mut rand::thread_rng(),
    )
    .unwrap();

    assert_eq!(file_count(tmp.path()), before, "no file may be lost");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file, "a.png");
    assert_eq!(fs::read(tmp.path().join("a.png")).unwrap(), b"a");
    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.renamed[0].old_name, "photo.png");
    assert_eq!(report.renamed[0].new_name, format!("AD006_{}_002.png", TS));
    assert_eq!(report.skipped.len(), 10_001);
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn test_uniqueness_against_batch_and_disk() {
    let (_tmp, src, dst) = setup();
    fs::create_dir_all(&dst).unwrap();
    // Occupy every canonical slot the batch will try first.
    for i in 1..=6 {
        write_file(&dst, &format!("AD006_{}_{:03}.jpg", TS, i), b"old");
    }
    let preexisting: HashSet<String> = fs::read_dir(&dst)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let files: Vec<PathBuf> = (0..6)
        .map(|i| write_file(&src, &format!("s{}.jpg", i), b"new"))
        .collect();

    let result = run_fixed(&request(files, &dst, Some("AD006")));

    assert_eq!(result.success.len(), 6);
    let unique: HashSet<&String> = result.success.iter().collect();
    assert_eq!(unique.len(), 6, "names must be pairwise distinct");
    for name in &result.success {
        assert!(!preexisting.contains(name), "{} collided with a pre-existing file", name);
    }
}

#[test]
fn test_copy_onto_taken_destination_is_recorded_as_failed() {
    let (_tmp, src, dst) = setup();
    occupy_every_name(&dst, &format!("AD006_{}_001", TS), ".jpg");
    let before = file_count(&dst);
    let a = write_file(&src, "a.jpg", b"a");
    let b = write_file(&src, "b.jpg", b"b");

    let result = run_fixed(&request(vec![a, b], &dst, Some("AD006")));

    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].file, "a.jpg");
    assert_eq!(result.success, vec![format!("AD006_{}_002.jpg", TS)]);
    assert_eq!(file_count(&dst), before + 1);
    assert_eq!(
        fs::read(dst.join(format!("AD006_{}_001.jpg", TS))).unwrap(),
        b"old"
    );
}

#[test]
fn test_failed_entry_does_not_shift_indices() {
    let (tmp, src, dst) = setup();
    let files = vec![
        write_file(&src, "1.jpg", b"1"),
        tmp.path().join("gone.jpg"),
        write_file(&src, "3.jpg", b"3"),
        write_file(&src, "4.jpg", b"4"),
        write_file(&src, "5.jpg", b"5"),
    ];

    let result = run_fixed(&request(files, &dst, Some("AD006")));

    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].file, "gone.jpg");
    let indices: Vec<&str> = result.success.iter().map(|n| index_of(n)).collect();
    assert_eq!(indices, vec!["001", "003", "004", "005"]);
}

#[test]
fn test_single_file_with_product_id() {
    let (_tmp, src, dst) = setup();
    let a = write_file(&src, "Shot.PNG", b"a");

    let result = run_fixed(&request(vec![a], &dst, Some("AD006")));

    assert_eq!(result.success, vec![format!("AD006_{}_001.PNG", TS)]);
}

#[test]
fn test_without_product_id_keeps_names_and_prefixes_counter() {
    let (_tmp, src, dst) = setup();
    fs::create_dir_all(&dst).unwrap();
    write_file(&dst, "a.jpg", b"old");
    let a = write_file(&src, "a.jpg", b"new");
    let b = write_file(&src, "b.jpg", b"b");

    let result = import_batch(&request(vec![a, b], &dst, None)).unwrap();

    assert_eq!(result.success, vec!["1_a.jpg".to_string(), "b.jpg".to_string()]);
    assert_eq!(fs::read(dst.join("a.jpg")).unwrap(), b"old");
    assert_eq!(fs::read(dst.join("1_a.jpg")).unwrap(), b"new");
}

#[test]
fn test_without_product_id_same_name_twice_in_batch() {
    let (_tmp, src, dst) = setup();
    fs::create_dir_all(src.join("other")).unwrap();
    let a1 = write_file(&src, "a.jpg", b"one");
    let a2 = write_file(&src.join("other"), "a.jpg", b"two");

    let result = import_batch(&request(vec![a1, a2], &dst, None)).unwrap();

    // The first copy lands on disk before the second is named.
    assert_eq!(result.success, vec!["a.jpg".to_string(), "1_a.jpg".to_string()]);
}

#[test]
fn test_directory_source_is_a_per_file_failure() {
    let (_tmp, src, dst) = setup();
    let dir = src.join("folder");
    fs::create_dir_all(&dir).unwrap();
    let a = write_file(&src, "a.jpg", b"a");

    let result = import_batch(&request(vec![dir, a], &dst, Some("AD006"))).unwrap();

    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].file, "folder");
    assert_eq!(result.success.len(), 1);
}

#[test]
fn test_target_creation_failure_aborts() {
    let (_tmp, src, _dst) = setup();
    let blocker = write_file(&src, "not-a-dir", b"x");
    let a = write_file(&src, "a.jpg", b"a");

    let err = import_batch(&request(vec![a], &blocker.join("dst"), Some("AD006"))).unwrap_err();

    assert!(matches!(
        err,
        crate::error::WorkbenchError::CreateTarget { .. }
    ));
}

#[test]
fn test_target_created_recursively() {
    let (_tmp, src, dst) = setup();
    let deep = dst.join("Category").join("AD006").join("reference");
    let a = write_file(&src, "a.jpg", b"a");

    let result = import_batch(&request(vec![a], &deep, None)).unwrap();

    assert_eq!(result.success, vec!["a.jpg".to_string()]);
    assert!(deep.join("a.jpg").is_file());
}
