use super::*;

/// A single-bit value carried by a pin or a named signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    Zero,
    One,
}

impl Signal {
    pub fn is_one(&self) -> bool {
        *self == Signal::One
    }

    /// Parses a literal from HDL or test-vector text. Only `0` and `1` are accepted.
    pub fn parse(literal: &str) -> Result<Signal, HdlError> {
        match literal.trim() {
            "0" => Ok(Signal::Zero),
            "1" => Ok(Signal::One),
            other => Err(HdlError::InvalidSignalValue(other.to_string())),
        }
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Signal {
        if b {
            Signal::One
        } else {
            Signal::Zero
        }
    }
}

impl From<Signal> for bool {
    fn from(signal: Signal) -> bool {
        signal.is_one()
    }
}

impl From<Signal> for u8 {
    fn from(signal: Signal) -> u8 {
        match signal {
            Signal::Zero => 0,
            Signal::One => 1,
        }
    }
}

impl TryFrom<u64> for Signal {
    type Error = HdlError;

    fn try_from(v: u64) -> Result<Signal, HdlError> {
        match v {
            0 => Ok(Signal::Zero),
            1 => Ok(Signal::One),
            _ => Err(HdlError::InvalidSignalValue(v.to_string())),
        }
    }
}

impl std::str::FromStr for Signal {
    type Err = HdlError;

    fn from_str(s: &str) -> Result<Signal, HdlError> {
        Signal::parse(s)
    }
}

impl std::ops::Not for Signal {
    type Output = Signal;

    fn not(self) -> Signal {
        (!self.is_one()).into()
    }
}

impl std::ops::BitAnd for Signal {
    type Output = Signal;

    fn bitand(self, other: Signal) -> Signal {
        (self.is_one() && other.is_one()).into()
    }
}

impl std::ops::BitOr for Signal {
    type Output = Signal;

    fn bitor(self, other: Signal) -> Signal {
        (self.is_one() || other.is_one()).into()
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[test]
fn signal_literals() {
    assert_eq!(Signal::parse("0").unwrap(), Signal::Zero);
    assert_eq!(Signal::parse(" 1 ").unwrap(), Signal::One);
    assert!(matches!(Signal::parse("2"), Err(HdlError::InvalidSignalValue(v)) if v == "2"));
    assert!(matches!(Signal::try_from(7u64), Err(HdlError::InvalidSignalValue(_))));
    assert_eq!(Signal::One.to_string(), "1");
    assert_eq!(!Signal::One, Signal::Zero);
    assert_eq!(Signal::One & Signal::Zero, Signal::Zero);
    assert_eq!(Signal::One | Signal::Zero, Signal::One);
}
