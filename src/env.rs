use super::*;

/// The signal bindings of a single composite activation.
///
/// Seeded with the caller's input pin values, filled in as parts run,
/// and dropped when the activation returns. Nothing is shared with sibling or parent activations.
#[derive(Debug)]
pub struct SignalEnv<'a> {
    chip: &'a str,
    bindings: BTreeMap<SignalName, Signal>,
}

impl<'a> SignalEnv<'a> {
    pub fn seeded(chip: &'a str, inputs: &BTreeMap<PinName, Signal>) -> SignalEnv<'a> {
        SignalEnv {
            chip,
            bindings: inputs.clone(),
        }
    }

    pub fn lookup(&self, signal: &str) -> Result<Signal, HdlError> {
        match self.bindings.get(signal) {
            Some(value) => Ok(*value),
            None => Err(HdlError::UnresolvedSignal(self.chip.to_string(), signal.to_string())),
        }
    }

    /// Each signal has exactly one producer, so binding a name twice is an error.
    pub fn bind(&mut self, signal: &str, value: Signal) -> Result<(), HdlError> {
        if self.bindings.contains_key(signal) {
            return Err(HdlError::DuplicateAssignment(self.chip.to_string(), signal.to_string()));
        }
        self.bindings.insert(signal.to_string(), value);
        Ok(())
    }

    pub fn outputs(&self, pins: &[PinName]) -> Result<BTreeMap<PinName, Signal>, HdlError> {
        let mut results = BTreeMap::new();
        for pin in pins {
            match self.bindings.get(pin) {
                Some(value) => {
                    results.insert(pin.clone(), *value);
                },
                None => return Err(HdlError::UnassignedOutput(self.chip.to_string(), pin.clone())),
            }
        }
        Ok(results)
    }
}

impl std::fmt::Display for SignalEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            write!(f, "{name} : {value}")?;
            if i + 1 < self.bindings.len() {
                write!(f, ", ")?;
            }
        }
        write!(f, "]")
    }
}

#[test]
fn single_producer() {
    let inputs = BTreeMap::from([("a".to_string(), Signal::One)]);
    let mut env = SignalEnv::seeded("Top", &inputs);
    assert_eq!(env.lookup("a").unwrap(), Signal::One);
    assert!(matches!(env.lookup("x"), Err(HdlError::UnresolvedSignal(chip, signal)) if chip == "Top" && signal == "x"));

    env.bind("x", Signal::Zero).unwrap();
    assert!(matches!(env.bind("x", Signal::One), Err(HdlError::DuplicateAssignment(_, _))));
    assert!(matches!(env.bind("a", Signal::Zero), Err(HdlError::DuplicateAssignment(_, _))));
    assert_eq!(env.to_string(), "[a : 1, x : 0]");

    let outputs = env.outputs(&["x".to_string()]).unwrap();
    assert_eq!(outputs["x"], Signal::Zero);
    assert!(matches!(env.outputs(&["out".to_string()]), Err(HdlError::UnassignedOutput(_, pin)) if pin == "out"));
}
