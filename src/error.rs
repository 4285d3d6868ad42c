use super::*;

/// Every way loading, checking, or evaluating a chip can fail.
///
/// Evaluation errors are terminal for the current activation and propagate
/// through every enclosing composite up to the top-level caller.
#[derive(Debug, Clone)]
pub enum HdlError {
    ChipNotFound(ChipName),
    DuplicateChip(ChipName),
    /// A pin declared twice on one chip, or declared both IN and OUT.
    DuplicatePin(ChipName, PinName),
    PinMismatch(ChipName, PinName, PinMismatch),
    /// A part reads a signal nothing in the enclosing chip drives.
    UnresolvedSignal(ChipName, SignalName),
    /// A signal driven by more than one part, or a part driving one of the chip's inputs.
    DuplicateAssignment(ChipName, SignalName),
    UnassignedOutput(ChipName, PinName),
    CombinationalCycle(Cycle),
    RecursionLimit(ChipName, usize),
    InvalidSignalValue(String),
    Parse(Loc, String),
    Io(String, String),
}

/// How a pin failed to line up with the chip it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMismatch {
    /// A declared input pin was not supplied.
    Missing,
    /// A value was supplied for a pin the chip does not declare as an input.
    Extra,
    /// A pin map names a pin the chip does not have.
    Unknown,
    /// A pin map binds the same pin more than once.
    Rebound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// Parts of one composite feed each other.
    Parts(ChipName, Vec<String>),
    /// A chip reaches itself through its parts' chip definitions.
    Definitions(Vec<ChipName>),
}

impl HdlError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, HdlError::CombinationalCycle(_))
    }
}

impl std::fmt::Display for PinMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PinMismatch::Missing => write!(f, "missing input pin"),
            PinMismatch::Extra => write!(f, "not an input pin"),
            PinMismatch::Unknown => write!(f, "no such pin"),
            PinMismatch::Rebound => write!(f, "pin bound more than once"),
        }
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Cycle::Parts(chip, parts) => write!(f, "parts of {chip} form a cycle through {}", parts.join(", ")),
            Cycle::Definitions(chips) => write!(f, "chip definitions refer to themselves: {}", chips.join(" -> ")),
        }
    }
}

impl std::fmt::Display for HdlError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HdlError::ChipNotFound(name) => write!(f, "Unknown chip: {name}"),
            HdlError::DuplicateChip(name) => write!(f, "Chip is already defined: {name}"),
            HdlError::DuplicatePin(chip, pin) => write!(f, "Pin {pin} is declared more than once on {chip}"),
            HdlError::PinMismatch(chip, pin, mismatch) => write!(f, "Pin mismatch on {chip}.{pin}: {mismatch}"),
            HdlError::UnresolvedSignal(chip, signal) => write!(f, "Signal {signal} in {chip} has no driver"),
            HdlError::DuplicateAssignment(chip, signal) => write!(f, "Signal {signal} in {chip} has multiple drivers"),
            HdlError::UnassignedOutput(chip, pin) => write!(f, "Output {pin} of {chip} is never assigned"),
            HdlError::CombinationalCycle(cycle) => write!(f, "Combinational cycle: {cycle}"),
            HdlError::RecursionLimit(chip, depth) => write!(f, "Recursion limit of {depth} exceeded while evaluating {chip}"),
            HdlError::InvalidSignalValue(literal) => write!(f, "Invalid signal value {literal:?}: expected 0 or 1"),
            HdlError::Parse(loc, message) => {
                if loc.is_unknown() {
                    write!(f, "Parse error: {message}")
                } else {
                    write!(f, "Parse error at {loc}: {message}")
                }
            },
            HdlError::Io(path, message) => write!(f, "{path}: {message}"),
        }
    }
}

impl std::error::Error for HdlError {}
