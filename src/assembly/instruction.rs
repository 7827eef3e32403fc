//! Decoded handler-body instructions.
//!
//! An [`Instruction`] is an opcode tag plus a typed [`Operand`]. Instruction streams are
//! produced by an external decoder and handed to this crate read-only; nothing here
//! mutates them.
//!
//! Only the operand kinds the recognizers inspect carry semantic weight: field and
//! method references (compared by [`Token`] identity) and integer immediates (read as
//! boolean discriminators). The remaining kinds exist so that a decoder can represent
//! any body faithfully.
//!
//! # Examples
//!
//! ```rust
//! use eazscope::assembly::{Code, Immediate, Instruction, Operand};
//! use eazscope::metadata::token::Token;
//!
//! let call = Instruction::new(Code::Call, Operand::Method(Token::method_def(4)));
//! assert!(call.is_call());
//! assert_eq!(call.method(), Some(Token::method_def(4)));
//!
//! let flag = Instruction::new(Code::LdcI4S, Operand::Immediate(Immediate::Int8(1)));
//! assert_eq!(flag.boolean_literal(), Some(true));
//! ```

use std::fmt;

use crate::{assembly::Code, metadata::token::Token};

/// An immediate value embedded in an instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// Signed 8-bit immediate value (`ldc.i4.s`)
    Int8(i8),
    /// Unsigned 8-bit immediate value (`unaligned.`, `no.`)
    UInt8(u8),
    /// Signed 32-bit immediate value (`ldc.i4`)
    Int32(i32),
    /// Signed 64-bit immediate value (`ldc.i8`)
    Int64(i64),
    /// 32-bit floating point immediate value (`ldc.r4`)
    Float32(f32),
    /// 64-bit floating point immediate value (`ldc.r8`)
    Float64(f64),
}

impl Immediate {
    /// Returns the value as `i32` if it is an integer that fits.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Immediate::Int8(value) => Some(i32::from(value)),
            Immediate::UInt8(value) => Some(i32::from(value)),
            Immediate::Int32(value) => Some(value),
            Immediate::Int64(value) => i32::try_from(value).ok(),
            Immediate::Float32(_) | Immediate::Float64(_) => None,
        }
    }
}

/// The operand of a decoded instruction.
///
/// Metadata references are split by kind so that predicates can ask "is this a field?"
/// without consulting the metadata tables.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand present
    None,
    /// Immediate value (constant embedded in instruction)
    Immediate(Immediate),
    /// Branch target offset within the body
    Target(u32),
    /// Field reference (`ldfld`, `stsfld`, ...)
    Field(Token),
    /// Method reference (`call`, `callvirt`, `newobj`, `ldftn`, ...)
    Method(Token),
    /// Type reference (`castclass`, `ldelem`, `box`, ...)
    Type(Token),
    /// User string reference (`ldstr`)
    String(Token),
    /// Local variable index
    Local(u16),
    /// Method argument index
    Argument(u16),
    /// Switch table with branch target offsets
    Switch(Vec<u32>),
}

impl Operand {
    /// Returns a short human-readable rendering, or `None` for [`Operand::None`].
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self {
            Operand::None => None,
            Operand::Immediate(imm) => Some(format!("{imm:?}")),
            Operand::Target(t) => Some(format!("IL_{t:04X}")),
            Operand::Field(t) | Operand::Method(t) | Operand::Type(t) | Operand::String(t) => {
                Some(t.to_string())
            }
            Operand::Local(l) => Some(format!("V_{l}")),
            Operand::Argument(a) => Some(format!("A_{a}")),
            Operand::Switch(targets) => Some(format!("switch({})", targets.len())),
        }
    }
}

/// A single decoded instruction of a handler body or callee body.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The opcode tag
    pub code: Code,
    /// The operand data for this instruction
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction from its tag and operand.
    #[must_use]
    pub fn new(code: Code, operand: Operand) -> Self {
        Self { code, operand }
    }

    /// Creates an operand-free instruction.
    #[must_use]
    pub fn simple(code: Code) -> Self {
        Self {
            code,
            operand: Operand::None,
        }
    }

    /// Returns `true` for `call` and `callvirt`.
    #[must_use]
    pub fn is_call(&self) -> bool {
        self.code.is_call()
    }

    /// Returns the referenced field, if the operand is a field reference.
    ///
    /// Tokens outside the `Field` and `MemberRef` tables are rejected.
    #[must_use]
    pub fn field(&self) -> Option<Token> {
        match self.operand {
            Operand::Field(token) if token.is_field_like() => Some(token),
            _ => None,
        }
    }

    /// Returns the referenced method, if the operand is a method reference.
    ///
    /// Tokens outside the `MethodDef` and `MemberRef` tables are rejected.
    #[must_use]
    pub fn method(&self) -> Option<Token> {
        match self.operand {
            Operand::Method(token) if token.is_method_like() => Some(token),
            _ => None,
        }
    }

    /// Returns the direct call target of a `call` / `callvirt` instruction.
    #[must_use]
    pub fn call_target(&self) -> Option<Token> {
        if self.is_call() {
            self.method()
        } else {
            None
        }
    }

    /// Returns the 32-bit constant pushed by any `ldc.i4` form.
    #[must_use]
    pub fn i32_literal(&self) -> Option<i32> {
        if let Some(value) = self.code.short_i4_value() {
            return Some(value);
        }

        match (&self.code, &self.operand) {
            (Code::LdcI4S | Code::LdcI4, Operand::Immediate(imm)) => imm.as_i32(),
            _ => None,
        }
    }

    /// Returns the boolean pushed by this instruction, if it is a `0` or `1` literal.
    ///
    /// The C# compiler lowers `false` / `true` arguments to `ldc.i4.0` / `ldc.i4.1`; the
    /// long forms are accepted as well since a decoder may not normalize them.
    #[must_use]
    pub fn boolean_literal(&self) -> Option<bool> {
        match self.i32_literal()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand.as_string() {
            Some(operand) => write!(f, "{} {}", self.code, operand),
            None => write!(f, "{}", self.code),
        }
    }
}

impl From<Code> for Instruction {
    fn from(code: Code) -> Self {
        Instruction::simple(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_accessors() {
        let ldfld = Instruction::new(Code::Ldfld, Operand::Field(Token::field(2)));
        assert_eq!(ldfld.field(), Some(Token::field(2)));
        assert_eq!(ldfld.method(), None);
        assert_eq!(ldfld.call_target(), None);

        let newobj = Instruction::new(Code::Newobj, Operand::Method(Token::method_def(9)));
        assert_eq!(newobj.method(), Some(Token::method_def(9)));
        assert_eq!(newobj.call_target(), None);

        let callvirt = Instruction::new(Code::Callvirt, Operand::Method(Token::method_def(3)));
        assert_eq!(callvirt.call_target(), Some(Token::method_def(3)));
    }

    #[test]
    fn test_operand_table_guard() {
        let member_ref = Token::from_parts(Token::TABLE_MEMBERREF, 4);
        let ldfld = Instruction::new(Code::Ldfld, Operand::Field(member_ref));
        assert_eq!(ldfld.field(), Some(member_ref));

        // A method token in a field operand never names a field
        let ldfld = Instruction::new(Code::Ldfld, Operand::Field(Token::method_def(4)));
        assert_eq!(ldfld.field(), None);

        let call = Instruction::new(Code::Call, Operand::Method(Token::field(4)));
        assert_eq!(call.method(), None);
        assert_eq!(call.call_target(), None);
    }

    #[test]
    fn test_literals() {
        assert_eq!(Instruction::simple(Code::LdcI4M1).i32_literal(), Some(-1));
        assert_eq!(Instruction::simple(Code::LdcI4_0).boolean_literal(), Some(false));
        assert_eq!(Instruction::simple(Code::LdcI4_1).boolean_literal(), Some(true));
        assert_eq!(Instruction::simple(Code::LdcI4_2).boolean_literal(), None);

        let long_true = Instruction::new(Code::LdcI4, Operand::Immediate(Immediate::Int32(1)));
        assert_eq!(long_true.boolean_literal(), Some(true));

        let short_false = Instruction::new(Code::LdcI4S, Operand::Immediate(Immediate::Int8(0)));
        assert_eq!(short_false.boolean_literal(), Some(false));

        // Operand on a non-ldc instruction is never a literal
        let ldarg = Instruction::new(Code::LdargS, Operand::Argument(1));
        assert_eq!(ldarg.boolean_literal(), None);

        let float = Instruction::new(Code::LdcR8, Operand::Immediate(Immediate::Float64(1.0)));
        assert_eq!(float.i32_literal(), None);
    }

    #[test]
    fn test_immediate_as_i32() {
        assert_eq!(Immediate::UInt8(200).as_i32(), Some(200));
        assert_eq!(Immediate::Int64(i64::MAX).as_i32(), None);
        assert_eq!(Immediate::Float32(0.0).as_i32(), None);
    }

    #[test]
    fn test_display() {
        let ins = Instruction::new(Code::Call, Operand::Method(Token::method_def(1)));
        assert_eq!(ins.to_string(), "call 0x06000001");
        assert_eq!(Instruction::simple(Code::Ret).to_string(), "ret");
        assert_eq!(Instruction::from(Code::Pop).code, Code::Pop);
    }
}
