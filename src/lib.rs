//! `hdlsim` evaluates hierarchical combinational chips.
//!
//! A chip is either one of the intrinsic gates (`Nand`, `Not`, `And`, `Or`)
//! or a composite: declared `IN` and `OUT` pins plus parts wired together by signal names.
//!
//! ```
//! use hdlsim::*;
//!
//! let mut registry = ChipRegistry::new();
//! registry.load_from_string("
//!     CHIP Xor {
//!         IN a, b;
//!         OUT out;
//!         PARTS:
//!         Not(in=a, out=nota);
//!         Not(in=b, out=notb);
//!         And(a=a, b=notb, out=x);
//!         And(a=nota, b=b, out=y);
//!         Or(a=x, b=y, out=out);
//!     }
//! ").unwrap();
//!
//! let evaluator = Evaluator::new(&registry);
//! let outputs = evaluator.evaluate("Xor", &assignment(&[("a", true), ("b", false)])).unwrap();
//! assert_eq!(outputs["out"], Signal::One);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::*;

mod chip;
mod env;
mod error;
mod eval;
mod intrinsics;
mod loc;
mod parse;
mod registry;
mod schedule;
mod signal;
pub mod testbench;


pub use chip::*;
pub use env::SignalEnv;
pub use error::*;
pub use eval::*;
pub use intrinsics::intrinsics;
pub use loc::*;
pub use parse::*;
pub use registry::ChipRegistry;
pub use schedule::*;
pub use signal::Signal;
pub use testbench::{TestReport, TestVectors, Summary};
