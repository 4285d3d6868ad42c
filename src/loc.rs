use std::sync::Arc;

/// Where a piece of HDL or test-vector text came from,
/// together with the line table needed to turn byte offsets into a [`LineCol`].
#[derive(Clone, Debug)]
pub struct SourceInfo {
    source: Source,
    line_starts: Arc<Vec<usize>>,
}

/// The origin of parsed text. Text parsed from a string carries no name.
#[derive(Clone, Debug)]
pub enum Source {
    File(Arc<std::path::PathBuf>),
    String,
    Unknown,
}

impl SourceInfo {
    pub fn unknown() -> SourceInfo {
        SourceInfo {
            source: Source::Unknown,
            line_starts: Arc::new(vec![0]),
        }
    }

    pub fn from_file(path: &std::path::Path, contents: &str) -> SourceInfo {
        SourceInfo {
            source: Source::File(Arc::new(path.to_owned())),
            line_starts: Arc::new(line_starts(contents)),
        }
    }

    pub fn from_string(contents: &str) -> SourceInfo {
        SourceInfo {
            source: Source::String,
            line_starts: Arc::new(line_starts(contents)),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn linecol_from(&self, pos: usize) -> LineCol {
        let line = match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol(line, pos - self.line_starts[line])
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// A zero-based line and column, displayed one-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineCol(usize, usize);

impl LineCol {
    /// The line number. Starts with line 1.
    pub fn line(&self) -> usize {
        self.0 + 1
    }

    /// The column. Starts with column 1.
    pub fn col(&self) -> usize {
        self.1 + 1
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line(), self.col())
    }
}

/// The span of a parsed record in its source.
#[derive(Clone)]
pub struct Loc {
    start: usize,
    end: usize,
    source_info: SourceInfo,
}

impl Loc {
    /// For records built in code rather than parsed.
    pub fn unknown() -> Loc {
        Loc {
            start: 0,
            end: 0,
            source_info: SourceInfo::unknown(),
        }
    }

    pub fn from(source_info: &SourceInfo, start: usize, end: usize) -> Loc {
        Loc {
            start,
            end,
            source_info: source_info.clone(),
        }
    }

    pub fn start(&self) -> LineCol {
        self.source_info.linecol_from(self.start)
    }

    pub fn end(&self) -> LineCol {
        self.source_info.linecol_from(self.end)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.source_info.source, Source::Unknown)
    }
}

impl std::fmt::Debug for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_info.source {
            Source::File(path) => write!(f, "[{}-{}:{:?}]", self.start(), self.end(), path),
            Source::String => write!(f, "[{}-{}]", self.start(), self.end()),
            Source::Unknown => write!(f, "[unknown]"),
        }
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_info.source {
            Source::File(path) => write!(f, "{}:{}", path.display(), self.start()),
            Source::String => write!(f, "{}", self.start()),
            Source::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Records parsed from source carry their span.
pub trait HasLoc {
    fn loc(&self) -> Loc;
}

#[test]
fn linecol() {
    let text = "CHIP A {
IN a;
OUT out;";

    let source_info = SourceInfo::from_string(text);
    assert_eq!(source_info.linecol_from(0).to_string(), "1:1");
    assert_eq!(source_info.linecol_from(5).to_string(), "1:6");
    assert_eq!(source_info.linecol_from(8).to_string(), "1:9");
    assert_eq!(source_info.linecol_from(9).to_string(), "2:1");
    assert_eq!(source_info.linecol_from(14).to_string(), "2:6");
    assert_eq!(source_info.linecol_from(15).to_string(), "3:1");
}

#[test]
fn loc_display() {
    let text = "a, b; out\n0, 0; 0\n";
    let source_info = SourceInfo::from_string(text);
    assert!(matches!(source_info.source(), Source::String));

    let loc = Loc::from(&source_info, 10, 17);
    assert_eq!(loc.to_string(), "2:1");
    assert_eq!(format!("{loc:?}"), "[2:1-2:8]");
    assert!(!loc.is_unknown());

    let loc = Loc::from(&SourceInfo::from_file(std::path::Path::new("and_test.tst"), text), 10, 17);
    assert_eq!(loc.to_string(), "and_test.tst:2:1");
    assert_eq!(Loc::unknown().to_string(), "<unknown>");
}
