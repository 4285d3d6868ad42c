use hdlsim::*;
use hdlsim::testbench::assignment_json;

use clap::Parser;
use chrono::{DateTime, Utc};
use log::*;

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chip to test or evaluate.
    chip: Option<String>,

    /// Test-vector file to run against `chip`.
    test_file: Option<PathBuf>,

    /// Directory of .hdl files loaded at start-up.
    #[arg(long, default_value = "chips")]
    chips: PathBuf,

    /// Directory searched by --test-all for <chip>_test.tst files.
    #[arg(long, default_value = "vectors")]
    tests: PathBuf,

    #[arg(long, default_value_t = false)]
    list_chips: bool,

    #[arg(long, default_value_t = false)]
    test_all: bool,

    /// Evaluate `chip` once, e.g. --eval a=1,b=0
    #[arg(long)]
    eval: Option<String>,

    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[arg(short, long, default_value_t = false)]
    debug: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let registry = match load_registry(&args.chips) {
        Ok(registry) => registry,
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        },
    };
    if let Err(errors) = registry.check() {
        for error in &errors {
            warn!("{error}");
        }
        warn!("Chips have {} errors.", errors.len());
    }

    let evaluator = Evaluator::with_max_depth(&registry, args.max_depth);

    let ok = if args.list_chips {
        list_chips(&registry);
        true
    } else if args.test_all {
        test_all(&evaluator, &args.tests, args.json)?
    } else if let (Some(chip), Some(inputs)) = (&args.chip, &args.eval) {
        eval(&evaluator, chip, inputs, args.json)
    } else if let (Some(chip), Some(test_file)) = (&args.chip, &args.test_file) {
        run_test_file(&evaluator, chip, test_file, args.json)?
    } else {
        eprintln!("Usage: hdlsim <chip> <test_file> | hdlsim <chip> --eval a=1,b=0 | hdlsim --list-chips | hdlsim --test-all");
        false
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(args: &Args) {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let now: DateTime<Utc> = Utc::now();
            out.finish(format_args!(
                "[{} {} {}] {}",
                now.format("%Y-%m-%dT%H:%M:%S%.fZ"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let level = std::env::var("LEVEL").unwrap_or_default();

    let dispatch = if args.debug || level == "DEBUG" {
        dispatch.level(LevelFilter::Debug)
    } else if args.verbose {
        dispatch.level(LevelFilter::Info)
    } else {
        dispatch.level(LevelFilter::Warn)
    };

    if let Err(e) = dispatch.apply() {
        eprintln!("Could not initialize logging: {e}");
    }
}

fn load_registry(dir: &Path) -> Result<ChipRegistry, HdlError> {
    let mut registry = ChipRegistry::new();
    if dir.is_dir() {
        let names = registry.load_dir(dir)?;
        info!("Loaded {} chips from {}", names.len(), dir.display());
    } else {
        warn!("Chip directory {} not found. Only built-in chips are available.", dir.display());
    }
    Ok(registry)
}

fn list_chips(registry: &ChipRegistry) {
    println!("Built-in chips:");
    for name in registry.list_known_chip_names() {
        if registry.is_intrinsic(&name) {
            println!("  {name}");
        }
    }

    println!("Loaded chips:");
    for composite in registry.composites() {
        println!("  {} (IN {}; OUT {})", composite.name, composite.inputs.join(", "), composite.outputs.join(", "));
    }
}

fn eval(evaluator: &Evaluator, chip: &str, inputs: &str, json: bool) -> bool {
    let result = parse_assignment(inputs).and_then(|inputs| evaluator.evaluate(chip, &inputs));
    match result {
        Ok(outputs) => {
            if json {
                println!("{}", serde_json::json!({ "chip": chip, "outputs": assignment_json(&outputs) }));
            } else {
                for (pin, value) in &outputs {
                    println!("{pin}={value}");
                }
            }
            true
        },
        Err(error) => {
            if json {
                println!("{}", serde_json::json!({ "chip": chip, "error": error.to_string() }));
            } else {
                eprintln!("Error: {error}");
            }
            false
        },
    }
}

fn run_test_file(evaluator: &Evaluator, chip: &str, path: &Path, json: bool) -> anyhow::Result<bool> {
    let vectors = match TestVectors::from_file(path) {
        Ok(vectors) => vectors,
        Err(error) => {
            eprintln!("Error: {error}");
            return Ok(false);
        },
    };

    let report = vectors.run(evaluator, chip);
    print_report(&report, json)?;
    Ok(report.all_passed())
}

/// Runs `<dir>/<chip>_test.tst` for every known chip that has one.
fn test_all(evaluator: &Evaluator, dir: &Path, json: bool) -> anyhow::Result<bool> {
    let mut reports = vec![];
    let mut ok = true;

    for name in evaluator.registry().list_known_chip_names() {
        let path = dir.join(format!("{}_test.tst", name.to_lowercase()));
        if !path.is_file() {
            debug!("No test file for {name}");
            continue;
        }

        match TestVectors::from_file(&path) {
            Ok(vectors) => {
                let report = vectors.run(evaluator, &name);
                if !json {
                    println!("Testing {name}...");
                    print_report(&report, false)?;
                }
                reports.push(report);
            },
            Err(error) => {
                eprintln!("Error in {}: {error}", path.display());
                ok = false;
            },
        }
    }

    let summary: Summary = reports.iter().collect();
    if json {
        let reports: Vec<serde_json::Value> = reports.iter().map(|report| report.to_json()).collect();
        let json = serde_json::json!({ "reports": reports, "summary": summary.to_json() });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{summary}");
    }

    Ok(ok && summary.failed == 0)
}

fn print_report(report: &TestReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        println!("{report}");
    }
    Ok(())
}
