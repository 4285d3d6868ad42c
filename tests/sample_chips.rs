use hdlsim::*;
use hdlsim::testbench::Outcome;

use std::path::{Path, PathBuf};

fn root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn sample_registry() -> ChipRegistry {
    let mut registry = ChipRegistry::new();
    registry.load_dir(root().join("chips")).unwrap();
    registry
}

fn vectors_for(chip: &str) -> PathBuf {
    root().join("vectors").join(format!("{}_test.tst", chip.to_lowercase()))
}

#[test]
fn sample_chips_load_and_check() {
    let registry = sample_registry();
    assert!(registry.check().is_ok());

    let names = registry.list_known_chip_names();
    assert_eq!(&names[..4], &["Nand", "Not", "And", "Or"]);
    for chip in ["Xor", "Nor", "Mux", "DMux", "HalfAdder", "FullAdder", "Add2"] {
        assert!(registry.contains(chip), "{chip} not loaded");
        assert!(!registry.is_intrinsic(chip));
    }
}

#[test]
fn every_chip_passes_its_vectors() {
    let registry = sample_registry();
    let evaluator = Evaluator::new(&registry);

    let mut reports = vec![];
    for chip in registry.list_known_chip_names() {
        let path = vectors_for(&chip);
        assert!(path.is_file(), "no vectors for {chip}");
        let report = TestVectors::from_file(&path).unwrap().run(&evaluator, &chip);
        assert!(report.all_passed(), "{report}");
        reports.push(report);
    }

    let summary: Summary = reports.iter().collect();
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total, reports.iter().map(|report| report.total()).sum::<usize>());
}

#[test]
fn wrong_expectations_are_reported_per_row() {
    let registry = sample_registry();
    let evaluator = Evaluator::new(&registry);

    // Nor's truth table run against Xor: only the 1, 1 row agrees.
    let vectors = TestVectors::from_file(vectors_for("Nor")).unwrap();
    let report = vectors.run(&evaluator, "Xor");
    assert_eq!(report.total(), 4);
    assert_eq!(report.passed(), 1);

    let failed_lines: Vec<usize> = report.results.iter().filter(|result| !result.outcome.is_pass()).map(|result| result.line).collect();
    assert_eq!(failed_lines, vec![2, 3, 4]);
    assert!(matches!(&report.results[0].outcome, Outcome::Fail(_, mismatches) if mismatches[0].pin == "out"));

    let text = report.to_string();
    assert!(text.contains("=== Test Report for Xor ==="), "{text}");
    assert!(text.contains("Test Case (Line 2):"), "{text}");
    assert!(text.contains("1 out of 4 tests passed"), "{text}");
}

#[test]
fn sample_evaluations() {
    let registry = sample_registry();
    let evaluator = Evaluator::new(&registry);

    let outputs = evaluator.evaluate("Add2", &parse_assignment("a0=1, a1=1, b0=1, b1=0").unwrap()).unwrap();
    assert_eq!(format_assignment(&outputs), "carry=1, s0=0, s1=0");

    let outputs = evaluator.evaluate("Mux", &parse_assignment("a=0,b=1,sel=1").unwrap()).unwrap();
    assert_eq!(outputs["out"], Signal::One);
}

#[test]
fn report_json() {
    let registry = sample_registry();
    let evaluator = Evaluator::new(&registry);

    let report = TestVectors::from_file(vectors_for("HalfAdder")).unwrap().run(&evaluator, "HalfAdder");
    let json = report.to_json();
    assert_eq!(json["chip"], "HalfAdder");
    assert_eq!(json["total"], 4);
    assert_eq!(json["failed"], 0);
    assert_eq!(json["results"][3]["inputs"]["a"], 1);
    assert_eq!(json["results"][3]["expected"]["carry"], 1);
    assert_eq!(json["results"][3]["passed"], true);
}
