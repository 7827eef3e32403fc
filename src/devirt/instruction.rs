//! Virtual instructions and their shared virtualization context.
//!
//! A [`VirtualInstruction`] is the unit of identification: a numeric virtual opcode
//! assigned by the obfuscator's VM, the token of the handler method implementing it, and
//! a shared [`VirtualizationContext`] through which handler and callee bodies are
//! resolved. Instructions are created by the surrounding devirtualization pipeline and
//! are never mutated here.
//!
//! All structural queries a recognizer needs are methods on [`VirtualInstruction`]:
//! direct matches against the handler body delegate to [`crate::devirt::matcher`], and
//! the indirect forms walk the handler's direct callees (one hop, no transitive
//! closure), skipping any callee whose body the provider cannot resolve.

use std::{fmt, sync::Arc};

use crate::{
    assembly::{Code, Instruction},
    devirt::matcher::{self, MatchResult},
    metadata::{provider::MethodProvider, token::Token},
    Error, Result,
};

/// Shared state for all virtual instructions of one virtualized assembly.
///
/// Holds the [`MethodProvider`] used to resolve bodies and return types, and the token
/// of the VM's argument-storage field. Several handler shapes load that field to reach
/// the virtual method's arguments; recognizers compare against it by token identity.
pub struct VirtualizationContext {
    provider: Arc<dyn MethodProvider>,
    arguments_field: Token,
}

impl VirtualizationContext {
    /// Creates a new context.
    pub fn new(provider: Arc<dyn MethodProvider>, arguments_field: Token) -> Self {
        Self {
            provider,
            arguments_field,
        }
    }

    /// The method provider backing this context.
    #[must_use]
    pub fn provider(&self) -> &dyn MethodProvider {
        self.provider.as_ref()
    }

    /// Token of the VM's argument-storage field.
    #[must_use]
    pub fn arguments_field(&self) -> Token {
        self.arguments_field
    }

    /// Returns `true` if `field` is the argument-storage field.
    #[must_use]
    pub fn is_arguments_field(&self, field: Token) -> bool {
        field == self.arguments_field
    }
}

impl fmt::Debug for VirtualizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualizationContext")
            .field("arguments_field", &self.arguments_field)
            .finish_non_exhaustive()
    }
}

/// A virtual opcode together with the handler method that implements it.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use eazscope::assembly::{Code, Instruction, Operand};
/// use eazscope::devirt::{VirtualInstruction, VirtualizationContext};
/// use eazscope::metadata::{graph::MethodGraph, provider::MethodDef, token::Token};
///
/// let handler = Token::method_def(1);
/// let helper = Token::method_def(2);
/// let graph: MethodGraph = [
///     MethodDef::new(handler, "Handler", "System.Void", vec![
///         Instruction::new(Code::Call, Operand::Method(helper)),
///         Instruction::simple(Code::Ret),
///     ]),
///     MethodDef::new(helper, "Helper", "System.Void", vec![
///         Instruction::simple(Code::Pop),
///         Instruction::simple(Code::Ret),
///     ]),
/// ].into_iter().collect();
///
/// let context = Arc::new(VirtualizationContext::new(Arc::new(graph), Token::field(1)));
/// let instruction = VirtualInstruction::new(&context, 42, handler)?;
///
/// assert!(instruction.matches_prefix(&[Code::Call]));
/// assert!(instruction.matches_indirect(&[Code::Pop, Code::Ret]));
/// # Ok::<(), eazscope::Error>(())
/// ```
#[derive(Clone)]
pub struct VirtualInstruction {
    virtual_code: i32,
    handler: Token,
    context: Arc<VirtualizationContext>,
}

impl VirtualInstruction {
    /// Creates a virtual instruction for `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotFound`] if the context's provider has no body for the
    /// handler method.
    pub fn new(
        context: &Arc<VirtualizationContext>,
        virtual_code: i32,
        handler: Token,
    ) -> Result<Self> {
        if context.provider().body(handler).is_none() {
            return Err(Error::MethodNotFound(handler));
        }

        Ok(Self {
            virtual_code,
            handler,
            context: Arc::clone(context),
        })
    }

    /// The numeric opcode assigned by the virtual machine.
    #[must_use]
    pub fn virtual_code(&self) -> i32 {
        self.virtual_code
    }

    /// Token of the handler method.
    #[must_use]
    pub fn handler(&self) -> Token {
        self.handler
    }

    /// The shared virtualization context.
    #[must_use]
    pub fn context(&self) -> &Arc<VirtualizationContext> {
        &self.context
    }

    /// The handler's decoded body.
    #[must_use]
    pub fn body(&self) -> &[Instruction] {
        self.context.provider().body(self.handler).unwrap_or(&[])
    }

    /// Methods called directly by the handler body, in first-call order.
    #[must_use]
    pub fn callees(&self) -> Vec<Token> {
        self.context.provider().callees(self.handler)
    }

    /// Returns the declared return-type name of the method an instruction references.
    ///
    /// `None` if the operand is not a method reference or the method is unknown.
    #[must_use]
    pub fn return_type_name(&self, instruction: &Instruction) -> Option<&str> {
        self.context
            .provider()
            .return_type_name(instruction.method()?)
    }

    /// Returns `true` if `instruction` references a method whose return type is
    /// `type_name`.
    #[must_use]
    pub fn returns(&self, instruction: &Instruction, type_name: &str) -> bool {
        self.return_type_name(instruction) == Some(type_name)
    }

    /// Returns `true` if `instruction` references the argument-storage field.
    #[must_use]
    pub fn is_arguments_field(&self, instruction: &Instruction) -> bool {
        instruction
            .field()
            .is_some_and(|field| self.context.is_arguments_field(field))
    }

    /// See [`matcher::matches_prefix`].
    #[must_use]
    pub fn matches_prefix(&self, pattern: &[Code]) -> bool {
        matcher::matches_prefix(self.body(), pattern)
    }

    /// See [`matcher::matches_entire`].
    #[must_use]
    pub fn matches_entire(&self, pattern: &[Code]) -> bool {
        matcher::matches_entire(self.body(), pattern)
    }

    /// See [`matcher::matches_suffix`].
    #[must_use]
    pub fn matches_suffix(&self, pattern: &[Code]) -> bool {
        matcher::matches_suffix(self.body(), pattern)
    }

    /// Finds `pattern` in the handler body. See [`matcher::find`].
    #[must_use]
    pub fn find(&self, pattern: &[Code]) -> Option<MatchResult<'_>> {
        matcher::find(self.body(), pattern)
    }

    /// Returns `true` if any directly-called method contains `pattern`.
    ///
    /// Callees without a resolvable body are skipped.
    #[must_use]
    pub fn matches_indirect(&self, pattern: &[Code]) -> bool {
        let provider = self.context.provider();
        self.callees().into_iter().any(|callee| {
            provider
                .body(callee)
                .is_some_and(|body| matcher::find(body, pattern).is_some())
        })
    }

    /// Returns `true` if some call site in the handler body both targets a method that
    /// contains `pattern` and is immediately preceded by the boolean literals `flags`,
    /// in argument order.
    ///
    /// With an empty `flags` slice this is equivalent to [`Self::matches_indirect`].
    #[must_use]
    pub fn matches_indirect_with_flags(&self, pattern: &[Code], flags: &[bool]) -> bool {
        let provider = self.context.provider();
        let body = self.body();

        body.iter().enumerate().any(|(index, instruction)| {
            let Some(target) = instruction.call_target() else {
                return false;
            };
            if index < flags.len() {
                return false;
            }

            let arguments = &body[index - flags.len()..index];
            let flags_match = arguments
                .iter()
                .zip(flags)
                .all(|(argument, flag)| argument.boolean_literal() == Some(*flag));

            flags_match
                && provider
                    .body(target)
                    .is_some_and(|callee| matcher::find(callee, pattern).is_some())
        })
    }
}

impl fmt::Debug for VirtualInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualInstruction")
            .field("virtual_code", &self.virtual_code)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for VirtualInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "virtual opcode {} (handler {})",
            self.virtual_code, self.handler
        )
    }
}
