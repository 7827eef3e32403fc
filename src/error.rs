use thiserror::Error;

use crate::{devirt::VirtualInstruction, metadata::token::Token};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// - [`Error::OpcodeUnidentified`] - No recognizer in the catalog matched a handler. This is an
///   expected, non-fatal outcome: the owning pipeline records the instruction as unresolved and
///   continues with the next one.
/// - [`Error::MethodNotFound`] - A virtual instruction referenced a handler method that the
///   [`crate::metadata::provider::MethodProvider`] does not know.
///
/// Identification is deterministic and side-effect free, so neither error is worth retrying.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use eazscope::{Error, assembly::{Code, Instruction}};
/// use eazscope::devirt::{VirtualInstruction, VirtualizationContext};
/// use eazscope::metadata::{graph::MethodGraph, provider::MethodDef, token::Token};
///
/// let handler = Token::method_def(1);
/// let graph: MethodGraph = [MethodDef::new(handler, "Handler", "System.Void",
///     vec![Instruction::simple(Code::Ret)])].into_iter().collect();
/// let context = Arc::new(VirtualizationContext::new(Arc::new(graph), Token::field(1)));
/// let instruction = VirtualInstruction::new(&context, 7, handler)?;
///
/// match instruction.identify() {
///     Ok(code) => println!("original opcode: {code}"),
///     Err(Error::OpcodeUnidentified(unresolved)) => {
///         println!("unresolved virtual opcode {}", unresolved.virtual_code());
///     }
///     Err(e) => println!("other error: {e}"),
/// }
/// # Ok::<(), eazscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No recognizer in the catalog matched the handler body.
    ///
    /// Carries the offending virtual instruction so that callers can report which virtual
    /// opcode and which handler method were left unresolved.
    #[error("Unable to identify the original opcode of {0}")]
    OpcodeUnidentified(Box<VirtualInstruction>),

    /// The handler method is unknown to the method provider.
    ///
    /// Only the handler itself must be resolvable; callees that live in other modules are
    /// skipped during indirect matching instead of raising this error.
    #[error("Failed to find method - {0}")]
    MethodNotFound(Token),
}
