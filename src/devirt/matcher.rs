//! Structural sequence matching over instruction streams.
//!
//! Every function in this module compares the opcode tags of a body against a pattern
//! and ignores operands. Operand checks (field identity, call-target return types) are
//! layered on top by the recognizers, using the [`MatchResult`] returned by [`find`].
//!
//! | Primitive | Succeeds when |
//! |-----------|---------------|
//! | [`matches_prefix`] | the first `pattern.len()` tags equal the pattern |
//! | [`matches_entire`] | the body's tags are exactly the pattern |
//! | [`matches_suffix`] | the last `pattern.len()` tags equal the pattern |
//! | [`find`] | some contiguous window equals the pattern (first one wins) |
//!
//! Indirect matching, which searches the bodies of directly-called methods, needs a
//! [`crate::metadata::provider::MethodProvider`] and therefore lives on
//! [`crate::devirt::VirtualInstruction`].

use std::ops::Index;

use crate::assembly::{format_codes, Code, Instruction};

fn tags_equal(window: &[Instruction], pattern: &[Code]) -> bool {
    window.len() == pattern.len()
        && window
            .iter()
            .zip(pattern)
            .all(|(instruction, code)| instruction.code == *code)
}

/// Returns `true` if the body starts with `pattern`.
///
/// A body shorter than the pattern never matches.
#[must_use]
pub fn matches_prefix(body: &[Instruction], pattern: &[Code]) -> bool {
    body.len() >= pattern.len() && tags_equal(&body[..pattern.len()], pattern)
}

/// Returns `true` if the body's tag sequence is exactly `pattern`.
#[must_use]
pub fn matches_entire(body: &[Instruction], pattern: &[Code]) -> bool {
    tags_equal(body, pattern)
}

/// Returns `true` if the body ends with `pattern`.
#[must_use]
pub fn matches_suffix(body: &[Instruction], pattern: &[Code]) -> bool {
    body.len() >= pattern.len() && tags_equal(&body[body.len() - pattern.len()..], pattern)
}

/// Finds the first contiguous window of `body` whose tags equal `pattern`.
///
/// An empty pattern never matches.
#[must_use]
pub fn find<'a>(body: &'a [Instruction], pattern: &[Code]) -> Option<MatchResult<'a>> {
    if pattern.is_empty() || pattern.len() > body.len() {
        return None;
    }

    body.windows(pattern.len())
        .position(|window| tags_equal(window, pattern))
        .map(|start| MatchResult {
            start,
            instructions: &body[start..start + pattern.len()],
        })
}

/// The window of instructions that satisfied a pattern.
///
/// Indexing is relative to the start of the match, so `result[3]` is the instruction
/// that matched the fourth tag of the pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    start: usize,
    instructions: &'a [Instruction],
}

impl<'a> MatchResult<'a> {
    /// Offset of the first matched instruction within the searched body.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of matched instructions (always the pattern length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Always `false`; empty patterns never produce a match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the matched instruction at a relative position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Instruction> {
        self.instructions.get(index)
    }

    /// The matched instructions.
    #[must_use]
    pub fn instructions(&self) -> &'a [Instruction] {
        self.instructions
    }
}

impl Index<usize> for MatchResult<'_> {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

/// Name of a substitutable position in a [`Template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotName {
    /// An `ldc.i4.*` short-form constant load (argument index or pushed constant)
    Constant,
}

impl SlotName {
    fn placeholder(&self) -> &'static str {
        match self {
            SlotName::Constant => "<constant>",
        }
    }
}

/// One position of a [`Template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateElement {
    /// A tag that must always match
    Fixed(Code),
    /// A tag supplied at check time
    Slot(SlotName),
}

/// A pattern shared by an opcode family, with named slots for the members' differences.
///
/// # Examples
///
/// ```rust
/// use eazscope::assembly::Code;
/// use eazscope::devirt::matcher::{SlotName, Template, TemplateElement};
///
/// const PUSH: Template = Template::new(&[
///     TemplateElement::Fixed(Code::Ldarg0),
///     TemplateElement::Slot(SlotName::Constant),
///     TemplateElement::Fixed(Code::Ret),
/// ]);
///
/// assert_eq!(
///     PUSH.substitute(SlotName::Constant, Code::LdcI4_2),
///     Some(vec![Code::Ldarg0, Code::LdcI4_2, Code::Ret])
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    elements: &'static [TemplateElement],
}

impl Template {
    /// Creates a template from its elements.
    #[must_use]
    pub const fn new(elements: &'static [TemplateElement]) -> Self {
        Self { elements }
    }

    /// Number of positions in the template.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the template has no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The template's elements.
    #[must_use]
    pub const fn elements(&self) -> &'static [TemplateElement] {
        self.elements
    }

    /// Produces a concrete pattern by filling every occurrence of `slot` with `code`.
    ///
    /// Returns `None` if any other slot is left unfilled, since such a pattern cannot be
    /// compared against a body.
    #[must_use]
    pub fn substitute(&self, slot: SlotName, code: Code) -> Option<Vec<Code>> {
        self.elements
            .iter()
            .map(|element| match element {
                TemplateElement::Fixed(fixed) => Some(*fixed),
                TemplateElement::Slot(name) if *name == slot => Some(code),
                TemplateElement::Slot(_) => None,
            })
            .collect()
    }

    /// Renders the template with slot placeholders, e.g. `[ldarg.0, <constant>, ret]`.
    #[must_use]
    pub fn description(&self) -> String {
        let parts: Vec<&str> = self
            .elements
            .iter()
            .map(|element| match element {
                TemplateElement::Fixed(code) => code.mnemonic(),
                TemplateElement::Slot(name) => name.placeholder(),
            })
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

/// Renders a pattern as mnemonics, e.g. `[ldloc.s, and, ret]`.
#[must_use]
pub fn describe(pattern: &[Code]) -> String {
    format_codes(pattern)
}
