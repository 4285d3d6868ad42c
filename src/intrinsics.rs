use super::*;

use lazy_static::lazy_static;

lazy_static! {
    static ref INTRINSICS: Vec<Intrinsic> = vec![
        Intrinsic::new("Nand", &["a", "b"], &["out"], |v| vec![!(v[0] & v[1])]),
        Intrinsic::new("Not", &["in"], &["out"], |v| vec![!v[0]]),
        Intrinsic::new("And", &["a", "b"], &["out"], |v| vec![v[0] & v[1]]),
        Intrinsic::new("Or", &["a", "b"], &["out"], |v| vec![v[0] | v[1]]),
    ];
}

/// The built-in gates every registry starts with.
pub fn intrinsics() -> &'static [Intrinsic] {
    &INTRINSICS
}

#[test]
fn truth_tables() {
    use Signal::{One, Zero};

    let table = [
        ("And", [One, One], One),
        ("And", [One, Zero], Zero),
        ("And", [Zero, Zero], Zero),
        ("Or", [Zero, Zero], Zero),
        ("Or", [Zero, One], One),
        ("Or", [One, One], One),
        ("Nand", [One, One], Zero),
        ("Nand", [Zero, Zero], One),
        ("Nand", [One, Zero], One),
    ];

    for (name, [a, b], out) in table {
        let gate = intrinsics().iter().find(|gate| gate.name == name).unwrap();
        let inputs = BTreeMap::from([("a".to_string(), a), ("b".to_string(), b)]);
        let outputs = gate.apply(&inputs).unwrap();
        assert_eq!(outputs["out"], out, "{name}({a}, {b})");
    }

    let not = intrinsics().iter().find(|gate| gate.name == "Not").unwrap();
    for (input, out) in [(One, Zero), (Zero, One)] {
        let outputs = not.apply(&BTreeMap::from([("in".to_string(), input)])).unwrap();
        assert_eq!(outputs["out"], out);
    }
}
