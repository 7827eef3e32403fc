//! The collaborator interface between identification and a metadata reader.
//!
//! Identification never decodes anything itself. It asks a [`MethodProvider`] for three
//! things: the decoded body of a method, the methods a body calls directly, and the
//! declared return type of a method. Everything is addressed by [`Token`], and tokens are
//! compared by identity.

use std::collections::HashSet;

use crate::{assembly::Instruction, metadata::token::Token};

/// Read-only access to decoded method bodies and method signatures.
///
/// Implementations must allow concurrent readers: identification of distinct virtual
/// instructions may run on many threads against the same provider.
///
/// # Implementing a Provider
///
/// ```rust
/// use eazscope::assembly::Instruction;
/// use eazscope::metadata::{provider::MethodProvider, token::Token};
///
/// struct SingleMethod {
///     token: Token,
///     body: Vec<Instruction>,
/// }
///
/// impl MethodProvider for SingleMethod {
///     fn body(&self, method: Token) -> Option<&[Instruction]> {
///         (method == self.token).then_some(self.body.as_slice())
///     }
///
///     fn return_type_name(&self, _method: Token) -> Option<&str> {
///         Some("System.Void")
///     }
/// }
/// ```
pub trait MethodProvider: Send + Sync {
    /// Returns the decoded body of `method`, or `None` if the method is unknown or has
    /// no body available (for example, it is declared in another module).
    fn body(&self, method: Token) -> Option<&[Instruction]>;

    /// Returns the full name of the declared return type of `method`
    /// (for example `System.UInt16`), or `None` if the method is unknown.
    fn return_type_name(&self, method: Token) -> Option<&str>;

    /// Returns the methods directly called by the body of `method`.
    ///
    /// Only `call` / `callvirt` edges with a method operand count, one hop deep. The
    /// default implementation scans the body on every call.
    fn callees(&self, method: Token) -> Vec<Token> {
        self.body(method).map(direct_callees).unwrap_or_default()
    }
}

/// Collects the distinct `call` / `callvirt` targets of a body, in first-call order.
#[must_use]
pub fn direct_callees(body: &[Instruction]) -> Vec<Token> {
    let mut seen = HashSet::new();
    body.iter()
        .filter_map(Instruction::call_target)
        .filter(|target| seen.insert(*target))
        .collect()
}

/// A method declaration as seen by identification.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// Identity of the declaration
    pub token: Token,
    /// Simple name of the method
    pub name: String,
    /// Full name of the declared return type (e.g. `System.Byte`)
    pub return_type: String,
    /// Decoded instruction stream
    pub body: Vec<Instruction>,
}

impl MethodDef {
    /// Creates a new method declaration.
    pub fn new(
        token: Token,
        name: impl Into<String>,
        return_type: impl Into<String>,
        body: Vec<Instruction>,
    ) -> Self {
        Self {
            token,
            name: name.into(),
            return_type: return_type.into(),
            body,
        }
    }
}
