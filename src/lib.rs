// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # eazscope
//!
//! Opcode identification for code virtualized by Eazfuscator.NET.
//!
//! Eazfuscator's virtualization replaces method bodies with a stream of virtual
//! instructions interpreted by an embedded virtual machine. Each virtual opcode is
//! implemented by a generated handler method, and the generator only knows a handful of
//! ways to write one. `eazscope` recognizes those shapes statically and maps every
//! handler back to the CIL opcode it implements, which is the first step of rebuilding
//! the original method bodies.
//!
//! ## Features
//!
//! - **🔍 41 recognizers** - Arithmetic, bitwise, comparison, argument and constant opcodes
//! - **🧩 Structural matching** - Prefix, whole-body, suffix, subsequence and template matching
//! - **🎯 Identity based** - Fields and methods are compared by metadata token, never by name
//! - **⚡ Parallel batches** - Large sets of virtual instructions are classified with rayon
//! - **🛡️ Side-effect free** - Nothing is executed, emulated or modified
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use eazscope::prelude::*;
//!
//! // A handler whose body is the `ldc.i4.2` shape
//! let handler = Token::method_def(1);
//! let body = [
//!     Code::Ldarg0, Code::Newobj, Code::Stloc0, Code::Ldloc0, Code::LdcI4_2,
//!     Code::Callvirt, Code::Ldloc0, Code::Call, Code::Ret,
//! ].into_iter().map(Instruction::simple).collect();
//!
//! let graph: MethodGraph = [MethodDef::new(handler, "Handler", "System.Void", body)]
//!     .into_iter()
//!     .collect();
//! let context = Arc::new(VirtualizationContext::new(Arc::new(graph), Token::field(1)));
//!
//! let instruction = VirtualInstruction::new(&context, 5, handler)?;
//! assert_eq!(instruction.identify()?, Code::LdcI4_2);
//! # Ok::<(), eazscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`assembly`] - Opcode tags, operands and decoded instructions
//! - [`metadata`] - Tokens and the [`metadata::provider::MethodProvider`] collaborator trait
//! - [`devirt`] - Matchers, the recognizer catalog and the dispatcher
//!
//! Decoding handler bodies out of a binary is left to the caller: implement
//! [`metadata::provider::MethodProvider`] over any CIL reader, or fill a
//! [`metadata::graph::MethodGraph`].
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result):
//!
//! ```rust
//! use eazscope::{prelude::*, Error};
//! # use std::sync::Arc;
//! # let handler = Token::method_def(1);
//! # let graph: MethodGraph = [MethodDef::new(handler, "H", "System.Void", vec![])].into_iter().collect();
//! # let context = Arc::new(VirtualizationContext::new(Arc::new(graph), Token::field(1)));
//! # let instruction = VirtualInstruction::new(&context, 5, handler)?;
//!
//! match instruction.identify() {
//!     Ok(code) => println!("{code}"),
//!     Err(Error::OpcodeUnidentified(vi)) => println!("unresolved: {vi}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! # Ok::<(), eazscope::Error>(())
//! ```
//!
//! ## Logging
//!
//! Identification outcomes are reported through the [`log`](https://docs.rs/log) facade at
//! `debug` level, and batches with unresolved instructions at `warn` level. No logger is
//! installed by the library.

mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use eazscope::prelude::*;
///
/// let identifier = OpcodeIdentifier::with_config(IdentifierConfig::strict());
/// assert!(identifier.entries().all(|e| e.confidence == Confidence::Certain));
/// ```
pub mod prelude;

/// CIL opcode tags and decoded instructions
///
/// Handler bodies arrive here already decoded. [`assembly::Code`] is the alphabet all
/// structural patterns are written in; [`assembly::Instruction`] pairs a tag with its
/// [`assembly::Operand`].
pub mod assembly;

/// Metadata identity and method access
///
/// - [`metadata::token::Token`] - Identity of fields and methods
/// - [`metadata::provider::MethodProvider`] - Body and return type lookup
/// - [`metadata::graph::MethodGraph`] - In-memory provider with callee caching
pub mod metadata;

/// Virtual instruction opcode identification
///
/// See [`devirt::OpcodeIdentifier`] for the entry point and [`devirt::CATALOG`] for the
/// recognized opcodes in priority order.
pub mod devirt;

/// `eazscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `eazscope` Error type
///
/// See [`Error::OpcodeUnidentified`] and [`Error::MethodNotFound`].
pub use error::Error;
