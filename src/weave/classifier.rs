//! Tell explicit throws apart from re-raises in monitor unwind handlers
//!
//! When a `synchronized` block exits abruptly, `javac` routes the exception to a catch-all handler
//! which releases the monitor and then throws the caught exception again:
//!
//! ```text
//! handler:
//!   astore 3        // stash the exception
//!   aload 2         // monitor
//!   monitorexit
//!   aload 3
//!   athrow
//! ```
//!
//! Those throws were not written by anyone, so they don't count as occurrences.

use crate::jvm::code::{CodeElement, Instruction};

/// How many instructions before the throw are considered
const LOOK_BACK: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThrowKind {
    /// Throw authored in the method
    Explicit,

    /// Exception rethrown after releasing a monitor
    ReRaise,
}

/// Classify the throw preceded by `preceding` (closest element first)
///
/// Markers are skipped. The look-back stops at a branch instruction or at the start of the code
/// and anything that isn't a recognized unwind shape is explicit.
pub fn classify_throw<'a>(preceding: impl Iterator<Item = &'a CodeElement>) -> ThrowKind {
    let mut window: Vec<&Instruction> = Vec::with_capacity(LOOK_BACK);
    for element in preceding {
        match element {
            CodeElement::Label(_) | CodeElement::LineNumber(_) => continue,
            CodeElement::Branch(_) => break,
            CodeElement::Instruction(insn) => window.push(insn),
        }
        if window.len() == LOOK_BACK {
            break;
        }
    }

    match window.as_slice() {
        // astore v; aload m; monitorexit; aload v
        [Instruction::ALoad(reloaded), Instruction::MonitorExit, Instruction::ALoad(_), Instruction::AStore(stashed)] =>
        {
            if reloaded == stashed {
                ThrowKind::ReRaise
            } else {
                ThrowKind::Explicit
            }
        }

        // aload m; monitorexit
        [Instruction::MonitorExit, Instruction::ALoad(_), ..] => ThrowKind::ReRaise,

        _ => ThrowKind::Explicit,
    }
}
