//! Method body representation and rewriting
//!
//! ### Structure
//!
//! A method body is represented as a flat [`MethodCode`]: an ordered stream of [`CodeElement`]s
//! plus the exception table. Elements are either instructions or markers:
//!
//!   - [`Instruction`] for straight-line instructions
//!   - [`BranchInstruction`] for instructions that may branch, return, or throw
//!   - labels ([`SynLabel`]) and line numbers, which don't execute anything
//!
//! Jumps and exception table entries refer to positions through labels, never through offsets,
//! so elements can be inserted anywhere without fixing up other instructions. Computing offsets
//! (and stack map frames) again is left to whatever serializes the class.
//!
//! ### Rewriting
//!
//! [`CodeCursor`] walks over a body element by element while building up a rewritten copy. It
//! can insert new elements around the element it is on and mint labels which are guaranteed to
//! be fresh in the method.

mod cursor;
mod instructions;
mod label;
mod method_code;

pub use cursor::*;
pub use instructions::*;
pub use label::*;
pub use method_code::*;
