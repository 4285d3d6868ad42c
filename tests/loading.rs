use hdlsim::*;

#[test]
fn load_errors() {
    let mut registry = ChipRegistry::new();
    assert!(matches!(registry.load_from_string("CHIP And { IN a, b; OUT out; PARTS: }"), Err(HdlError::DuplicateChip(name)) if name == "And"));
    assert!(matches!(registry.load_from_string("CHIP Broken { IN a OUT out; PARTS: }"), Err(HdlError::Parse(_, _))));
    assert!(matches!(registry.load_from_file("no/such/file.hdl"), Err(HdlError::Io(_, _))));
    assert!(matches!(registry.load_dir("no/such/dir"), Err(HdlError::Io(_, _))));
    assert_eq!(registry.list_known_chip_names().len(), 4);
}

#[test]
fn parts_may_refer_to_chips_loaded_later() {
    let mut registry = ChipRegistry::new();
    let names = registry.load_from_string("
        CHIP Buf2 {
            IN in;
            OUT out;
            PARTS:
            Buf(in=in, out=x);
            Buf(in=x, out=out);
        }
    ").unwrap();
    assert_eq!(names, vec!["Buf2"]);

    let evaluator = Evaluator::new(&registry);
    assert!(matches!(evaluator.evaluate("Buf2", &assignment(&[("in", true)])), Err(HdlError::ChipNotFound(name)) if name == "Buf"));

    registry.load_from_string("CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }").unwrap();
    let evaluator = Evaluator::new(&registry);
    let outputs = evaluator.evaluate("Buf2", &assignment(&[("in", true)])).unwrap();
    assert_eq!(outputs["out"], Signal::One);
}

#[test]
fn error_messages() {
    let mut registry = ChipRegistry::new();
    registry.load_from_string("
        CHIP Loop {
            IN a;
            OUT out;
            PARTS:
            And first (a=a, b=y, out=x);
            Not second (in=x, out=y);
            Not(in=y, out=out);
        }
    ").unwrap();

    let evaluator = Evaluator::new(&registry);
    let error = evaluator.evaluate("Loop", &assignment(&[("a", true)])).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("Loop"), "{message}");
    assert!(message.contains("first"), "{message}");
    assert!(message.contains("second"), "{message}");

    let error = evaluator.evaluate("Nope", &assignment::<bool>(&[])).unwrap_err();
    assert!(error.to_string().contains("Nope"));
}
