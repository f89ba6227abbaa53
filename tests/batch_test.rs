//! Directory batch processing tests.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{bookmarked_report, plain_report};
use pdf_outline::batch::process_directory_with;
use pdf_outline::{
    process_directory, BackendKind, BatchOptions, Error, ExtractOptions, FileStatus, JsonFormat,
};

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn populate(dir: &Path) {
    bookmarked_report().write_to(&dir.join("report.pdf"));
    plain_report().write_to(&dir.join("notes.PDF"));
    fs::write(dir.join("broken_scan.pdf"), b"%PDF-1.7\ntruncated").unwrap();
    fs::write(dir.join("readme.txt"), b"not a pdf").unwrap();
}

#[test]
fn test_one_json_per_pdf() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("nested").join("out");
    populate(input.path());

    let report = process_directory(input.path(), &out_dir, &BatchOptions::default()).unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.extracted(), 2);
    assert_eq!(report.fallbacks(), 1);
    assert_eq!(report.failures(), 0);

    let mut written: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    written.sort();
    assert_eq!(written, ["broken_scan.json", "notes.json", "report.json"]);

    let report_json = read_json(&out_dir.join("report.json"));
    assert_eq!(report_json["title"], "Understanding AI");
    assert_eq!(report_json["outline"].as_array().unwrap().len(), 4);

    let broken_json = read_json(&out_dir.join("broken_scan.json"));
    assert_eq!(
        broken_json,
        serde_json::json!({ "title": "Broken Scan", "outline": [] })
    );
}

#[test]
fn test_report_is_in_file_name_order() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let report = process_directory(input.path(), output.path(), &BatchOptions::default()).unwrap();
    let names: Vec<_> = report
        .files
        .iter()
        .map(|f| f.input.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, ["broken_scan.pdf", "notes.PDF", "report.pdf"]);

    assert!(matches!(
        report.files[0].status,
        FileStatus::Fallback { .. }
    ));
    assert_eq!(
        report.files[2].status,
        FileStatus::Extracted {
            backend: BackendKind::Structure,
            entries: 4
        }
    );
    assert_eq!(report.files[2].output, output.path().join("report.json"));
}

#[test]
fn test_strict_mode_records_failures() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let options = BatchOptions::new().with_extract_options(ExtractOptions::new().strict());
    let report = process_directory(input.path(), output.path(), &options).unwrap();

    assert_eq!(report.failures(), 1);
    assert!(matches!(report.files[0].status, FileStatus::Failed { .. }));
    assert_eq!(report.files[0].title, "broken_scan");

    // A result is still written for the failed file
    let broken_json = read_json(&output.path().join("broken_scan.json"));
    assert_eq!(broken_json["title"], "broken_scan");
}

#[test]
fn test_parallel_matches_sequential() {
    let input = tempfile::tempdir().unwrap();
    let sequential = tempfile::tempdir().unwrap();
    let parallel = tempfile::tempdir().unwrap();
    populate(input.path());
    for i in 0..6 {
        plain_report().write_to(&input.path().join(format!("copy_{}.pdf", i)));
    }

    let seq_report =
        process_directory(input.path(), sequential.path(), &BatchOptions::default()).unwrap();
    let par_report = process_directory(
        input.path(),
        parallel.path(),
        &BatchOptions::default().with_parallel(true),
    )
    .unwrap();

    assert_eq!(seq_report.len(), 9);
    let titles = |r: &pdf_outline::BatchReport| -> Vec<String> {
        r.files.iter().map(|f| f.title.clone()).collect()
    };
    assert_eq!(titles(&seq_report), titles(&par_report));

    for file in &seq_report.files {
        let name = file.output.file_name().unwrap();
        assert_eq!(
            fs::read_to_string(&file.output).unwrap(),
            fs::read_to_string(parallel.path().join(name)).unwrap()
        );
    }
}

#[test]
fn test_callback_sees_every_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let seen = AtomicUsize::new(0);
    let options = BatchOptions::default().with_parallel(true);
    let report = process_directory_with(input.path(), output.path(), &options, |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), report.len());
}

#[test]
fn test_compact_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    bookmarked_report().write_to(&input.path().join("report.pdf"));

    let options = BatchOptions::default().with_json_format(JsonFormat::Compact);
    process_directory(input.path(), output.path(), &options).unwrap();

    let json = fs::read_to_string(output.path().join("report.json")).unwrap();
    assert!(!json.contains('\n'));
    assert!(json.starts_with(r#"{"title":"Understanding AI","outline":[{"level":"H1""#));
}

#[test]
fn test_empty_directory() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_dir = output.path().join("results");

    let report = process_directory(input.path(), &out_dir, &BatchOptions::default()).unwrap();
    assert!(report.is_empty());
    assert!(out_dir.is_dir());
}

#[test]
fn test_missing_input_directory() {
    let output = tempfile::tempdir().unwrap();
    let missing = output.path().join("does-not-exist");

    let err = process_directory(&missing, output.path(), &BatchOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
}
