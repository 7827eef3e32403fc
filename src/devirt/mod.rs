//! Virtual instruction opcode identification.
//!
//! The obfuscator's virtualization replaces each original CIL instruction with a call
//! into a generated virtual machine. Every virtual opcode is implemented by a handler
//! method, and the generator emits handlers in a small number of recognizable shapes.
//! This module recovers the original opcode of a handler by comparing its body, and the
//! bodies of the methods it calls directly, against those shapes.
//!
//! # Architecture
//!
//! - [`matcher`] - Prefix, whole-body, suffix and subsequence matching plus templates
//! - [`patterns`] - The opcode sequences the handler generator emits
//! - [`signature`] - Declarative recognizer shapes and their evaluator
//! - [`catalog`] - One recognizer per opcode, in priority order
//! - [`identify`] - The dispatcher and batch identification
//! - [`config`] - Recognizer selection and batch scheduling
//!
//! Identification never executes or emulates anything; it is a pure function of the
//! handler body, its direct callees and the [`VirtualizationContext`].
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use eazscope::prelude::*;
//!
//! let handler = Token::method_def(1);
//! let graph: MethodGraph = [MethodDef::new(handler, "Handler", "System.Void", vec![
//!     Instruction::simple(Code::Nop),
//!     Instruction::simple(Code::Ret),
//! ])].into_iter().collect();
//!
//! let context = Arc::new(VirtualizationContext::new(Arc::new(graph), Token::field(1)));
//! let batch = vec![VirtualInstruction::new(&context, 3, handler)?];
//!
//! let report = OpcodeIdentifier::new().identify_all(&batch);
//! assert_eq!(report.unresolved.len(), 1);
//! println!("{report}");
//! # Ok::<(), eazscope::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod identify;
mod instruction;
pub mod matcher;
pub mod patterns;
pub mod signature;

pub use catalog::{CatalogEntry, CATALOG};
pub use config::IdentifierConfig;
pub use identify::{IdentificationReport, OpcodeIdentifier};
pub use instruction::{VirtualInstruction, VirtualizationContext};
pub use matcher::{MatchResult, SlotName, Template, TemplateElement};
pub use signature::{Confidence, OperandWidth, Signature};
