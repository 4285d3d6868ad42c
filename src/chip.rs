use super::*;

pub type ChipName = String;
pub type PinName = String;
pub type SignalName = String;

/// A chip the registry knows how to evaluate.
///
/// The variant is decided once, when the definition is registered.
/// Composite parts refer to other chips by name only; those names are resolved
/// through the [`ChipRegistry`] at evaluation time.
#[derive(Debug, Clone)]
pub enum ChipDef {
    Intrinsic(Arc<Intrinsic>),
    Composite(Arc<Composite>),
}

impl ChipDef {
    pub fn name(&self) -> &str {
        match self {
            ChipDef::Intrinsic(intrinsic) => &intrinsic.name,
            ChipDef::Composite(composite) => &composite.name,
        }
    }

    pub fn inputs(&self) -> &[PinName] {
        match self {
            ChipDef::Intrinsic(intrinsic) => &intrinsic.inputs,
            ChipDef::Composite(composite) => &composite.inputs,
        }
    }

    pub fn outputs(&self) -> &[PinName] {
        match self {
            ChipDef::Intrinsic(intrinsic) => &intrinsic.outputs,
            ChipDef::Composite(composite) => &composite.outputs,
        }
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(self, ChipDef::Intrinsic(_))
    }

    pub fn is_input(&self, pin: &str) -> bool {
        self.inputs().iter().any(|input| input == pin)
    }

    pub fn is_output(&self, pin: &str) -> bool {
        self.outputs().iter().any(|output| output == pin)
    }

    /// Pins must be unique within IN and within OUT, and no pin may be both.
    pub(crate) fn check_pins(&self) -> Result<(), HdlError> {
        let mut seen = BTreeSet::new();
        for pin in self.inputs().iter().chain(self.outputs()) {
            if !seen.insert(pin.as_str()) {
                return Err(HdlError::DuplicatePin(self.name().to_string(), pin.clone()));
            }
        }
        Ok(())
    }

    /// Requires `inputs` to cover exactly the declared input pins.
    pub(crate) fn check_inputs(&self, inputs: &BTreeMap<PinName, Signal>) -> Result<(), HdlError> {
        for pin in inputs.keys() {
            if !self.is_input(pin) {
                return Err(HdlError::PinMismatch(self.name().to_string(), pin.clone(), PinMismatch::Extra));
            }
        }
        for pin in self.inputs() {
            if !inputs.contains_key(pin) {
                return Err(HdlError::PinMismatch(self.name().to_string(), pin.clone(), PinMismatch::Missing));
            }
        }
        Ok(())
    }
}

impl From<Intrinsic> for ChipDef {
    fn from(intrinsic: Intrinsic) -> ChipDef {
        ChipDef::Intrinsic(Arc::new(intrinsic))
    }
}

impl From<Composite> for ChipDef {
    fn from(composite: Composite) -> ChipDef {
        ChipDef::Composite(Arc::new(composite))
    }
}

/// A gate whose behavior is a fixed function of its inputs.
/// The function sees input values in declared pin order and returns outputs in declared pin order.
#[derive(Clone)]
pub struct Intrinsic {
    pub name: ChipName,
    pub inputs: Vec<PinName>,
    pub outputs: Vec<PinName>,
    func: fn(&[Signal]) -> Vec<Signal>,
}

impl Intrinsic {
    pub fn new(name: &str, inputs: &[&str], outputs: &[&str], func: fn(&[Signal]) -> Vec<Signal>) -> Intrinsic {
        Intrinsic {
            name: name.to_string(),
            inputs: inputs.iter().map(|pin| pin.to_string()).collect(),
            outputs: outputs.iter().map(|pin| pin.to_string()).collect(),
            func,
        }
    }

    pub fn apply(&self, inputs: &BTreeMap<PinName, Signal>) -> Result<BTreeMap<PinName, Signal>, HdlError> {
        let mut args = Vec::with_capacity(self.inputs.len());
        for pin in &self.inputs {
            match inputs.get(pin) {
                Some(value) => args.push(*value),
                None => return Err(HdlError::PinMismatch(self.name.clone(), pin.clone(), PinMismatch::Missing)),
            }
        }
        let results = (self.func)(&args);
        Ok(self.outputs.iter().cloned().zip(results).collect())
    }
}

impl std::fmt::Debug for Intrinsic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Intrinsic({}, IN {:?}, OUT {:?})", self.name, self.inputs, self.outputs)
    }
}

/// A chip built from named parts wired together by signal names local to the chip.
#[derive(Debug, Clone)]
pub struct Composite {
    pub name: ChipName,
    pub inputs: Vec<PinName>,
    pub outputs: Vec<PinName>,
    pub parts: Vec<Part>,
    pub loc: Loc,
}

impl Composite {
    pub fn new(name: &str, inputs: &[&str], outputs: &[&str], parts: Vec<Part>) -> Composite {
        Composite {
            name: name.to_string(),
            inputs: inputs.iter().map(|pin| pin.to_string()).collect(),
            outputs: outputs.iter().map(|pin| pin.to_string()).collect(),
            parts,
            loc: Loc::unknown(),
        }
    }

    pub fn is_input(&self, signal: &str) -> bool {
        self.inputs.iter().any(|input| input == signal)
    }

    /// Names of the chips this composite instantiates, without repeats, in first-use order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut results: Vec<&str> = vec![];
        for part in &self.parts {
            if !results.contains(&part.chip.as_str()) {
                results.push(&part.chip);
            }
        }
        results
    }
}

impl HasLoc for Composite {
    fn loc(&self) -> Loc {
        self.loc.clone()
    }
}

/// One instantiation of a chip inside a composite.
///
/// `pin_map` binds the callee's pin names to signal names of the enclosing chip, in source order.
#[derive(Debug, Clone)]
pub struct Part {
    pub chip: ChipName,
    pub instance: Option<String>,
    pub pin_map: Vec<(PinName, SignalName)>,
    pub loc: Loc,
}

impl Part {
    pub fn new(chip: &str, pin_map: &[(&str, &str)]) -> Part {
        Part {
            chip: chip.to_string(),
            instance: None,
            pin_map: pin_map.iter().map(|(pin, signal)| (pin.to_string(), signal.to_string())).collect(),
            loc: Loc::unknown(),
        }
    }

    pub fn named(mut self, instance: &str) -> Part {
        self.instance = Some(instance.to_string());
        self
    }

    /// The instance name, falling back to the chip name.
    pub fn name(&self) -> &str {
        self.instance.as_deref().unwrap_or(&self.chip)
    }

    /// Splits the pin map into input and output bindings against the callee's declaration.
    ///
    /// Fails if a key is not a pin of `callee`, if a pin is bound twice,
    /// or if one of the callee's input pins is left unbound.
    /// Unbound callee outputs are allowed and simply go unused.
    pub fn bind(&self, callee: &ChipDef) -> Result<Binding, HdlError> {
        let mismatch = |pin: &str, kind| HdlError::PinMismatch(callee.name().to_string(), pin.to_string(), kind);

        let mut seen = BTreeSet::new();
        let mut binding = Binding::default();
        for (pin, signal) in &self.pin_map {
            if !seen.insert(pin.as_str()) {
                return Err(mismatch(pin, PinMismatch::Rebound));
            }
            if callee.is_input(pin) {
                binding.inputs.push((pin.clone(), signal.clone()));
            } else if callee.is_output(pin) {
                binding.outputs.push((pin.clone(), signal.clone()));
            } else {
                return Err(mismatch(pin, PinMismatch::Unknown));
            }
        }

        for pin in callee.inputs() {
            if !seen.contains(pin.as_str()) {
                return Err(mismatch(pin, PinMismatch::Missing));
            }
        }
        Ok(binding)
    }
}

impl HasLoc for Part {
    fn loc(&self) -> Loc {
        self.loc.clone()
    }
}

/// A part's pin map resolved against its callee: `(callee pin, local signal)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pub inputs: Vec<(PinName, SignalName)>,
    pub outputs: Vec<(PinName, SignalName)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and() -> ChipDef {
        Intrinsic::new("And", &["a", "b"], &["out"], |v| vec![v[0] & v[1]]).into()
    }

    #[test]
    fn bind_splits_pins() {
        let part = Part::new("And", &[("out", "x"), ("a", "p"), ("b", "q")]);
        let binding = part.bind(&and()).unwrap();
        assert_eq!(binding.inputs, vec![("a".to_string(), "p".to_string()), ("b".to_string(), "q".to_string())]);
        assert_eq!(binding.outputs, vec![("out".to_string(), "x".to_string())]);
    }

    #[test]
    fn bind_rejects_bad_pins() {
        let unknown = Part::new("And", &[("a", "p"), ("b", "q"), ("c", "r")]);
        assert!(matches!(unknown.bind(&and()), Err(HdlError::PinMismatch(_, pin, PinMismatch::Unknown)) if pin == "c"));

        let missing = Part::new("And", &[("a", "p"), ("out", "x")]);
        assert!(matches!(missing.bind(&and()), Err(HdlError::PinMismatch(_, pin, PinMismatch::Missing)) if pin == "b"));

        let rebound = Part::new("And", &[("a", "p"), ("a", "q"), ("b", "r")]);
        assert!(matches!(rebound.bind(&and()), Err(HdlError::PinMismatch(_, _, PinMismatch::Rebound))));
    }

    #[test]
    fn pins_unique() {
        let chip: ChipDef = Composite::new("Bad", &["a", "a"], &["out"], vec![]).into();
        assert!(matches!(chip.check_pins(), Err(HdlError::DuplicatePin(_, pin)) if pin == "a"));

        let chip: ChipDef = Composite::new("Bad", &["a"], &["a"], vec![]).into();
        assert!(matches!(chip.check_pins(), Err(HdlError::DuplicatePin(_, _))));

        let chip: ChipDef = Composite::new("Good", &["a", "b"], &["out"], vec![]).into();
        assert!(chip.check_pins().is_ok());
    }
}
