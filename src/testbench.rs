//! Test-vector files and the runner that checks a chip against them.
//!
//! ```text
//! a, b; out
//! 0, 0; 0
//! 0, 1; 1
//! ```
use super::*;

/// A parsed test-vector file: the header's pin names and one row per case.
#[derive(Debug, Clone)]
pub struct TestVectors {
    inputs: Vec<PinName>,
    outputs: Vec<PinName>,
    rows: Vec<TestVector>,
}

#[derive(Debug, Clone)]
pub struct TestVector {
    loc: Loc,
    inputs: Vec<Signal>,
    expected: Vec<Signal>,
}

impl TestVector {
    pub fn new(loc: Loc, inputs: Vec<Signal>, expected: Vec<Signal>) -> TestVector {
        TestVector {
            loc,
            inputs,
            expected,
        }
    }

    pub fn line(&self) -> usize {
        self.loc.start().line()
    }

    pub fn inputs(&self) -> &[Signal] {
        &self.inputs
    }

    pub fn expected(&self) -> &[Signal] {
        &self.expected
    }
}

impl HasLoc for TestVector {
    fn loc(&self) -> Loc {
        self.loc.clone()
    }
}

impl TestVectors {
    /// Every row must have one value per header pin, and header pins must be distinct.
    pub fn new(inputs: Vec<PinName>, outputs: Vec<PinName>, rows: Vec<TestVector>) -> Result<TestVectors, HdlError> {
        let mut seen = BTreeSet::new();
        for pin in inputs.iter().chain(&outputs) {
            if !seen.insert(pin.as_str()) {
                return Err(HdlError::Parse(Loc::unknown(), format!("Pin {pin} appears twice in the header")));
            }
        }

        for row in &rows {
            if row.inputs.len() != inputs.len() {
                let message = format!("Expected {} input values, found {}", inputs.len(), row.inputs.len());
                return Err(HdlError::Parse(row.loc(), message));
            }
            if row.expected.len() != outputs.len() {
                let message = format!("Expected {} output values, found {}", outputs.len(), row.expected.len());
                return Err(HdlError::Parse(row.loc(), message));
            }
        }

        Ok(TestVectors {
            inputs,
            outputs,
            rows,
        })
    }

    pub fn from_string(text: &str) -> Result<TestVectors, HdlError> {
        parse_test_vectors(text)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<TestVectors, HdlError> {
        parse_test_vectors_file(path.as_ref())
    }

    pub fn inputs(&self) -> &[PinName] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PinName] {
        &self.outputs
    }

    pub fn rows(&self) -> &[TestVector] {
        &self.rows
    }

    /// Evaluates `chip` on every row. A failing row never stops the rows after it.
    pub fn run(&self, evaluator: &Evaluator, chip: &str) -> TestReport {
        info!("Running {} test vectors against {chip}", self.rows.len());
        let results = self.rows.iter().map(|row| self.run_row(evaluator, chip, row)).collect();
        TestReport {
            chip: chip.to_string(),
            results,
        }
    }

    fn run_row(&self, evaluator: &Evaluator, chip: &str, row: &TestVector) -> TestResult {
        let inputs: BTreeMap<PinName, Signal> = self.inputs.iter().cloned().zip(row.inputs.iter().copied()).collect();
        let expected: BTreeMap<PinName, Signal> = self.outputs.iter().cloned().zip(row.expected.iter().copied()).collect();

        let outcome = match evaluator.evaluate(chip, &inputs) {
            Ok(actual) => compare(chip, &expected, actual),
            Err(error) => Outcome::Error(error),
        };

        if !outcome.is_pass() {
            debug!("{chip} line {}: {outcome:?}", row.line());
        }

        TestResult {
            line: row.line(),
            inputs,
            expected,
            outcome,
        }
    }
}

fn compare(chip: &str, expected: &BTreeMap<PinName, Signal>, actual: BTreeMap<PinName, Signal>) -> Outcome {
    let mut mismatches = vec![];
    for (pin, expected_value) in expected {
        match actual.get(pin) {
            Some(actual_value) if actual_value == expected_value => (),
            Some(actual_value) => mismatches.push(Mismatch {
                pin: pin.clone(),
                expected: *expected_value,
                actual: *actual_value,
            }),
            None => return Outcome::Error(HdlError::PinMismatch(chip.to_string(), pin.clone(), PinMismatch::Unknown)),
        }
    }

    if mismatches.is_empty() {
        Outcome::Pass
    } else {
        Outcome::Fail(actual, mismatches)
    }
}

#[derive(Debug, Clone)]
pub struct TestReport {
    pub chip: ChipName,
    pub results: Vec<TestResult>,
}

#[derive(Debug, Clone)]
pub struct TestResult {
    pub line: usize,
    pub inputs: BTreeMap<PinName, Signal>,
    pub expected: BTreeMap<PinName, Signal>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Pass,
    /// The actual outputs, and the pins that differed.
    Fail(BTreeMap<PinName, Signal>, Vec<Mismatch>),
    Error(HdlError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub pin: PinName,
    pub expected: Signal,
    pub actual: Signal,
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl TestReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.outcome.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Percentage of rows that passed. An empty report counts as fully passing.
    pub fn success_rate(&self) -> f64 {
        success_rate(self.passed(), self.total())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let results: Vec<serde_json::Value> = self.results.iter().map(|result| {
            let mut json = serde_json::json!({
                "line": result.line,
                "inputs": assignment_json(&result.inputs),
                "expected": assignment_json(&result.expected),
                "passed": result.outcome.is_pass(),
            });
            match &result.outcome {
                Outcome::Pass => (),
                Outcome::Fail(actual, _mismatches) => json["actual"] = assignment_json(actual),
                Outcome::Error(error) => json["error"] = serde_json::Value::String(error.to_string()),
            }
            json
        }).collect();

        serde_json::json!({
            "chip": self.chip,
            "total": self.total(),
            "passed": self.passed(),
            "failed": self.failed(),
            "results": results,
        })
    }
}

impl std::fmt::Display for TestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "=== Test Report for {} ===", self.chip)?;
        writeln!(f, "Total Tests: {}", self.total())?;
        writeln!(f, "Passed: {}", self.passed())?;
        writeln!(f, "Failed: {}", self.failed())?;
        writeln!(f, "Success Rate: {:.1}%", self.success_rate())?;

        if !self.all_passed() {
            writeln!(f)?;
            writeln!(f, "=== Failed Tests ===")?;
            for result in &self.results {
                match &result.outcome {
                    Outcome::Pass => continue,
                    Outcome::Fail(actual, mismatches) => {
                        writeln!(f, "Test Case (Line {}):", result.line)?;
                        writeln!(f, "  Inputs: {}", format_assignment(&result.inputs))?;
                        writeln!(f, "  Expected: {}", format_assignment(&result.expected))?;
                        writeln!(f, "  Actual: {}", format_assignment(actual))?;
                        for Mismatch { pin, expected, actual } in mismatches {
                            writeln!(f, "    {pin}: expected {expected}, got {actual}")?;
                        }
                    },
                    Outcome::Error(error) => {
                        writeln!(f, "Test Case (Line {}):", result.line)?;
                        writeln!(f, "  Inputs: {}", format_assignment(&result.inputs))?;
                        writeln!(f, "  Expected: {}", format_assignment(&result.expected))?;
                        writeln!(f, "  Error: {error}")?;
                    },
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "=== Summary ===")?;
        writeln!(f, "{} out of {} tests passed", self.passed(), self.total())
    }
}

/// Totals across several reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn add(&mut self, report: &TestReport) {
        self.total += report.total();
        self.passed += report.passed();
        self.failed += report.failed();
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(self.passed, self.total)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total,
            "passed": self.passed,
            "failed": self.failed,
        })
    }
}

impl<'a> FromIterator<&'a TestReport> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a TestReport>>(reports: I) -> Summary {
        let mut summary = Summary::default();
        for report in reports {
            summary.add(report);
        }
        summary
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "=== Overall Summary ===")?;
        writeln!(f, "Total Tests: {}", self.total)?;
        writeln!(f, "Passed: {}", self.passed)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Success Rate: {:.1}%", self.success_rate())
    }
}

fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        passed as f64 * 100.0 / total as f64
    }
}

/// An input or output assignment as a JSON object of pin name to 0/1.
pub fn assignment_json(assignment: &BTreeMap<PinName, Signal>) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = assignment
        .iter()
        .map(|(pin, value)| (pin.clone(), serde_json::Value::from(u8::from(*value))))
        .collect();
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_vectors() -> TestVectors {
        TestVectors::from_string("a,b; out\n0,0; 0\n0,1; 0\n1,0; 0\n1,1; 1\n").unwrap()
    }

    #[test]
    fn all_pass() {
        let registry = ChipRegistry::new();
        let evaluator = Evaluator::new(&registry);
        let report = and_vectors().run(&evaluator, "And");
        assert_eq!(report.total(), 4);
        assert_eq!(report.passed(), 4);
        assert!(report.all_passed());
        assert_eq!(report.success_rate(), 100.0);
        assert!(report.to_string().contains("4 out of 4 tests passed"));
    }

    #[test]
    fn failures_are_reported() {
        let registry = ChipRegistry::new();
        let evaluator = Evaluator::new(&registry);
        let report = and_vectors().run(&evaluator, "Or");
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.success_rate(), 50.0);

        match &report.results[1].outcome {
            Outcome::Fail(actual, mismatches) => {
                assert_eq!(actual["out"], Signal::One);
                assert_eq!(mismatches, &vec![Mismatch { pin: "out".to_string(), expected: Signal::Zero, actual: Signal::One }]);
            },
            other => panic!("expected a failure, got {other:?}"),
        }
        assert_eq!(report.results[1].line, 3);

        let text = report.to_string();
        assert!(text.contains("Test Case (Line 3):"), "{text}");
        assert!(text.contains("out: expected 0, got 1"), "{text}");

        let json = report.to_json();
        assert_eq!(json["failed"], 2);
        assert_eq!(json["results"][1]["actual"]["out"], 1);
    }

    #[test]
    fn errors_do_not_stop_the_run() {
        let registry = ChipRegistry::new();
        let evaluator = Evaluator::new(&registry);
        let vectors = TestVectors::from_string("a; out\n0; 1\n1; 0\n").unwrap();

        let report = vectors.run(&evaluator, "And");
        assert_eq!(report.total(), 2);
        assert_eq!(report.failed(), 2);
        for result in &report.results {
            assert!(matches!(&result.outcome, Outcome::Error(HdlError::PinMismatch(_, pin, PinMismatch::Missing)) if pin == "b"));
        }

        let report = vectors.run(&evaluator, "Nope");
        assert!(matches!(&report.results[0].outcome, Outcome::Error(HdlError::ChipNotFound(_))));
    }

    #[test]
    fn unknown_expected_output() {
        let registry = ChipRegistry::new();
        let evaluator = Evaluator::new(&registry);
        let vectors = TestVectors::from_string("in; result\n0; 1\n").unwrap();
        let report = vectors.run(&evaluator, "Not");
        assert!(matches!(&report.results[0].outcome, Outcome::Error(HdlError::PinMismatch(_, pin, PinMismatch::Unknown)) if pin == "result"));
    }

    #[test]
    fn summary_totals() {
        let registry = ChipRegistry::new();
        let evaluator = Evaluator::new(&registry);
        let reports = vec![and_vectors().run(&evaluator, "And"), and_vectors().run(&evaluator, "Nand")];
        let summary: Summary = reports.iter().collect();
        assert_eq!(summary, Summary { total: 8, passed: 4, failed: 4 });
        assert_eq!(summary.success_rate(), 50.0);
        assert!(summary.to_string().contains("Success Rate: 50.0%"));
    }
}
