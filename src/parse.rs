use super::*;

use lalrpop_util::lexer::Token;
use lalrpop_util::lalrpop_mod;
use lalrpop_util::ParseError;
lalrpop_mod!(grammar);

/// Parses HDL source text into composite chip records. The text may hold any number of `CHIP` blocks.
pub fn parse_chips(text: &str) -> Result<Vec<Composite>, HdlError> {
    let source_info = SourceInfo::from_string(text);
    chips_from(&source_info, text)
}

pub fn parse_chips_file(path: &std::path::Path) -> Result<Vec<Composite>, HdlError> {
    let text = read_file(path)?;
    let source_info = SourceInfo::from_file(path, &text);
    chips_from(&source_info, &text)
}

/// Parses a test-vector file: a `inputs; outputs` header line followed by one row per line.
pub fn parse_test_vectors(text: &str) -> Result<TestVectors, HdlError> {
    let source_info = SourceInfo::from_string(text);
    vectors_from(&source_info, text)
}

pub fn parse_test_vectors_file(path: &std::path::Path) -> Result<TestVectors, HdlError> {
    let text = read_file(path)?;
    let source_info = SourceInfo::from_file(path, &text);
    vectors_from(&source_info, &text)
}

fn chips_from(source_info: &SourceInfo, text: &str) -> Result<Vec<Composite>, HdlError> {
    let chips = grammar::ChipsParser::new()
        .parse(source_info, 0, text)
        .map_err(|error| parse_error(source_info, 0, error))?;
    debug!("Parsed {} chips", chips.len());
    Ok(chips)
}

/// Each row is parsed on its own, so a row can neither run onto the next line nor share one.
fn vectors_from(source_info: &SourceInfo, text: &str) -> Result<TestVectors, HdlError> {
    let mut lines = lines(text).filter(|(_offset, line)| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with("//")
    });

    let (inputs, outputs) = match lines.next() {
        Some((offset, line)) => grammar::TestHeaderParser::new()
            .parse(source_info, offset, line)
            .map_err(|error| parse_error(source_info, offset, error))?,
        None => return Err(HdlError::Parse(Loc::from(source_info, 0, 0), "Missing test-vector header".to_string())),
    };

    let parser = grammar::TestRowParser::new();
    let mut rows = vec![];
    for (offset, line) in lines {
        let row = parser
            .parse(source_info, offset, line)
            .map_err(|error| parse_error(source_info, offset, error))?;
        rows.push(row);
    }

    TestVectors::new(inputs, outputs, rows)
}

/// The lines of `text` with the byte offset each one starts at.
fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}

fn read_file(path: &std::path::Path) -> Result<String, HdlError> {
    std::fs::read_to_string(path).map_err(|e| HdlError::Io(path.display().to_string(), e.to_string()))
}

fn parse_error(source_info: &SourceInfo, offset: usize, error: ParseError<usize, Token<'_>, HdlError>) -> HdlError {
    match error {
        ParseError::UnrecognizedToken { token: (start, token, end), expected } => {
            let loc = Loc::from(source_info, offset + start, offset + end);
            HdlError::Parse(loc, format!("Unexpected {token}: expected one of {}", expected.join(" ")))
        },
        ParseError::UnrecognizedEof { location, expected } => {
            let loc = Loc::from(source_info, offset + location, offset + location);
            HdlError::Parse(loc, format!("Unexpected end of input: expected one of {}", expected.join(" ")))
        },
        ParseError::InvalidToken { location } => {
            let loc = Loc::from(source_info, offset + location, offset + location);
            HdlError::Parse(loc, "Invalid token".to_string())
        },
        ParseError::ExtraToken { token: (start, token, end) } => {
            let loc = Loc::from(source_info, offset + start, offset + end);
            HdlError::Parse(loc, format!("Extra token {token}"))
        },
        ParseError::User { error } => error,
    }
}
