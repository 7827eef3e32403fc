//! Abstract CIL instruction streams.
//!
//! This module defines the leaf layer that every recognizer reads: opcode tags
//! ([`Code`]) and decoded instructions ([`Instruction`], [`Operand`]). Streams are
//! produced by an external decoder; this crate only inspects them.
//!
//! # Key Types
//! - [`Code`] - Operand-free opcode tag, the alphabet of all patterns
//! - [`Instruction`] - A decoded instruction (tag + operand)
//! - [`Operand`] - Typed operand, with metadata references split by kind
//! - [`Immediate`] - Literal values embedded in instructions

mod code;
mod instruction;

pub(crate) use code::format_codes;
pub use code::Code;
pub use instruction::{Immediate, Instruction, Operand};
