use super::*;

use once_cell::sync::OnceCell;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Evaluates chips against a loaded [`ChipRegistry`].
///
/// The evaluator never mutates the registry. Each composite activation gets its own
/// [`SignalEnv`], seeded only with the pin values passed to it.
/// A composite's part order is worked out the first time it is activated and reused after that.
#[derive(Debug, Clone)]
pub struct Evaluator<'r> {
    registry: &'r ChipRegistry,
    max_depth: usize,
    schedules: Arc<BTreeMap<ChipName, OnceCell<Result<Schedule, HdlError>>>>,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r ChipRegistry) -> Evaluator<'r> {
        Evaluator::with_max_depth(registry, DEFAULT_MAX_DEPTH)
    }

    /// `max_depth` bounds how many composite activations may be nested.
    pub fn with_max_depth(registry: &'r ChipRegistry, max_depth: usize) -> Evaluator<'r> {
        let schedules = registry
            .composites()
            .into_iter()
            .map(|composite| (composite.name.clone(), OnceCell::new()))
            .collect();

        Evaluator {
            registry,
            max_depth,
            schedules: Arc::new(schedules),
        }
    }

    pub fn registry(&self) -> &'r ChipRegistry {
        self.registry
    }

    /// Computes the output pins of `chip_name` for one assignment of its input pins.
    ///
    /// `inputs` must supply exactly the chip's declared input pins.
    pub fn evaluate(&self, chip_name: &str, inputs: &BTreeMap<PinName, Signal>) -> Result<BTreeMap<PinName, Signal>, HdlError> {
        let mut stack = vec![];
        self.eval_chip(chip_name, inputs, &mut stack)
    }

    fn eval_chip(
        &self,
        chip_name: &str,
        inputs: &BTreeMap<PinName, Signal>,
        stack: &mut Vec<ChipName>,
    ) -> Result<BTreeMap<PinName, Signal>, HdlError> {
        let chip = self.registry.lookup(chip_name)?;
        chip.check_inputs(inputs)?;

        match chip {
            ChipDef::Intrinsic(intrinsic) => intrinsic.apply(inputs),
            ChipDef::Composite(composite) => {
                if let Some(pos) = stack.iter().position(|name| name == chip_name) {
                    let mut chips = stack[pos..].to_vec();
                    chips.push(chip_name.to_string());
                    return Err(HdlError::CombinationalCycle(Cycle::Definitions(chips)));
                }
                if stack.len() >= self.max_depth {
                    return Err(HdlError::RecursionLimit(chip_name.to_string(), self.max_depth));
                }

                stack.push(chip_name.to_string());
                let result = self.eval_composite(composite, inputs, stack);
                stack.pop();
                result
            },
        }
    }

    fn eval_composite(
        &self,
        composite: &Composite,
        inputs: &BTreeMap<PinName, Signal>,
        stack: &mut Vec<ChipName>,
    ) -> Result<BTreeMap<PinName, Signal>, HdlError> {
        debug!("Evaluating {} at depth {}", composite.name, stack.len());
        let mut env = SignalEnv::seeded(&composite.name, inputs);
        let schedule = self.schedule_of(composite)?;

        for &i in &schedule.order {
            let part = &composite.parts[i];
            let binding = &schedule.bindings[i];

            let mut part_inputs = BTreeMap::new();
            for (pin, signal) in &binding.inputs {
                part_inputs.insert(pin.clone(), env.lookup(signal)?);
            }

            let part_outputs = self.eval_chip(&part.chip, &part_inputs, stack)?;
            trace!("    {} {}: {:?} -> {:?}", composite.name, part.name(), part_inputs, part_outputs);

            for (pin, signal) in &binding.outputs {
                match part_outputs.get(pin) {
                    Some(value) => env.bind(signal, *value)?,
                    None => return Err(HdlError::UnassignedOutput(part.chip.clone(), pin.clone())),
                }
            }
        }

        trace!("    {} env: {env}", composite.name);
        env.outputs(&composite.outputs)
    }

    fn schedule_of(&self, composite: &Composite) -> Result<&Schedule, HdlError> {
        match self.schedules.get(&composite.name) {
            Some(cell) => cell.get_or_init(|| schedule(self.registry, composite)).as_ref().map_err(|error| error.clone()),
            None => Err(HdlError::ChipNotFound(composite.name.clone())),
        }
    }
}

/// Builds an input assignment from `(pin, value)` pairs.
pub fn assignment<S: Into<Signal> + Copy>(pins: &[(&str, S)]) -> BTreeMap<PinName, Signal> {
    pins.iter().map(|(pin, value)| (pin.to_string(), (*value).into())).collect()
}

/// Parses `a=1,b=0` into an input assignment.
pub fn parse_assignment(text: &str) -> Result<BTreeMap<PinName, Signal>, HdlError> {
    let mut results = BTreeMap::new();
    for item in text.split(',').map(|item| item.trim()).filter(|item| !item.is_empty()) {
        let (pin, value) = match item.split_once('=') {
            Some((pin, value)) => (pin.trim(), value),
            None => return Err(HdlError::Parse(Loc::unknown(), format!("Expected pin=value, found {item:?}"))),
        };
        if results.insert(pin.to_string(), Signal::parse(value)?).is_some() {
            return Err(HdlError::Parse(Loc::unknown(), format!("Pin {pin} assigned more than once")));
        }
    }
    Ok(results)
}

/// Renders an assignment as `a=1, b=0`.
pub fn format_assignment(assignment: &BTreeMap<PinName, Signal>) -> String {
    assignment
        .iter()
        .map(|(pin, value)| format!("{pin}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite<'a>(registry: &'a ChipRegistry, name: &str) -> &'a Composite {
        match registry.lookup(name).unwrap() {
            ChipDef::Composite(composite) => composite.as_ref(),
            other => panic!("{} is not a composite", other.name()),
        }
    }

    #[test]
    fn schedules_are_reused() {
        let mut registry = ChipRegistry::new();
        registry.register(Composite::new("Buf", &["in"], &["out"], vec![
            Part::new("Not", &[("in", "x"), ("out", "out")]),
            Part::new("Not", &[("in", "in"), ("out", "x")]),
        ]).into()).unwrap();
        registry.register(Composite::new("Broken", &["in"], &["out"], vec![
            Part::new("Missing", &[("in", "in"), ("out", "out")]),
        ]).into()).unwrap();

        let evaluator = Evaluator::new(&registry);
        let buf = composite(&registry, "Buf");
        let first = evaluator.schedule_of(buf).unwrap();
        assert_eq!(first.order, vec![1, 0]);

        for n in 0..3 {
            let outputs = evaluator.evaluate("Buf", &assignment(&[("in", n % 2 == 0)])).unwrap();
            assert_eq!(outputs["out"], Signal::from(n % 2 == 0));
        }
        assert!(std::ptr::eq(first, evaluator.schedule_of(buf).unwrap()));
        assert!(std::ptr::eq(first, evaluator.clone().schedule_of(buf).unwrap()));

        let broken = composite(&registry, "Broken");
        for _ in 0..2 {
            assert!(matches!(evaluator.schedule_of(broken), Err(HdlError::ChipNotFound(name)) if name == "Missing"));
        }
    }
}
