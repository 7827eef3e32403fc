//! The ordered recognizer catalog.
//!
//! [`CATALOG`] lists one [`CatalogEntry`] per recognized opcode, in the order the
//! dispatcher evaluates them. The order is significant: several handler shapes satisfy
//! more than one recognizer (a comparison stub can call a helper that also contains a
//! bitwise pattern, for example), and the first entry to succeed wins.
//!
//! # Recognized Opcodes
//!
//! | Family | Members | Shape |
//! |--------|---------|-------|
//! | Bitwise | `and`, `or`, `xor`, `shl` | helper in a direct callee |
//! | Flagged arithmetic | `add`, `sub` (+ `.ovf`, `.ovf.un`), `div`, `rem`, `shr` (+ `.un`) | shared helper, boolean literals select the member |
//! | Comparison | `clt`, `cgt`, `bge`, `blt` | handler stub plus comparison helper |
//! | Conversion | `conv.r8` | handler stub |
//! | Arguments | `ldarg`, `ldarg.s`, `ldarg.0`-`3`, `ldarga`, `ldarga.s`, `starg`, `starg.s` | argument field identity plus accessor width |
//! | Constants | `ldc.i4.0`-`8`, `ldc.i4.m1` | complete body template |

use crate::{
    assembly::Code,
    devirt::{
        patterns::{
            ADD_HELPER, AND_HELPER, BGE_STUB, BLT_STUB, COMPARE_STUB, CONV_R8_STUB, DIV_HELPER,
            GREATER_THAN_HELPER, LESS_THAN_HELPER, OR_HELPER, REM_HELPER, SHL_HELPER, SHR_HELPER,
            SUB_HELPER, XOR_HELPER,
        },
        signature::{Confidence, OperandWidth, Signature},
        VirtualInstruction,
    },
};

/// One recognizer: the opcode it identifies and the handler shape it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The original opcode this recognizer identifies
    pub code: Code,
    /// The handler shape
    pub signature: Signature,
    /// How specific the shape is believed to be
    pub confidence: Confidence,
}

impl CatalogEntry {
    const fn certain(code: Code, signature: Signature) -> Self {
        Self {
            code,
            signature,
            confidence: Confidence::Certain,
        }
    }

    const fn uncertain(code: Code, signature: Signature) -> Self {
        Self {
            code,
            signature,
            confidence: Confidence::Uncertain,
        }
    }

    /// Returns `true` if this recognizer accepts the instruction's handler.
    #[must_use]
    pub fn matches(&self, instruction: &VirtualInstruction) -> bool {
        self.signature.matches(instruction)
    }

    /// Human-readable rendering of the recognizer, e.g. for diagnostics output.
    #[must_use]
    pub fn description(&self) -> String {
        match self.confidence {
            Confidence::Certain => format!("{}: {}", self.code, self.signature),
            Confidence::Uncertain => format!("{} (uncertain): {}", self.code, self.signature),
        }
    }
}

const fn flagged(code: Code, helper: &'static [Code], flags: &'static [bool]) -> CatalogEntry {
    CatalogEntry::certain(code, Signature::Discriminated { helper, flags })
}

const fn indirect(code: Code, helper: &'static [Code]) -> CatalogEntry {
    CatalogEntry::certain(code, Signature::Indirect { helper })
}

const fn argument_index(code: Code, index: Code) -> CatalogEntry {
    CatalogEntry::certain(code, Signature::ArgumentIndexLoad { index })
}

const fn constant(code: Code) -> CatalogEntry {
    CatalogEntry::certain(code, Signature::ConstantLoad { constant: code })
}

// Flag arguments as passed to the shared helpers: (overflow, unsigned) for add/sub,
// (unsigned) for div/rem, (signed) for shr.
const PLAIN: &[bool] = &[false, false];
const OVERFLOW: &[bool] = &[true, false];
const OVERFLOW_UNSIGNED: &[bool] = &[true, true];
const SIGNED: &[bool] = &[false];
const UNSIGNED: &[bool] = &[true];
const SHIFT_SIGNED: &[bool] = &[true];
const SHIFT_UNSIGNED: &[bool] = &[false];

/// All recognizers, in evaluation priority order.
pub const CATALOG: &[CatalogEntry] = &[
    flagged(Code::Add, ADD_HELPER, PLAIN),
    flagged(Code::AddOvf, ADD_HELPER, OVERFLOW),
    flagged(Code::AddOvfUn, ADD_HELPER, OVERFLOW_UNSIGNED),
    indirect(Code::And, AND_HELPER),
    CatalogEntry::certain(
        Code::Bge,
        Signature::Stub {
            stub: BGE_STUB,
            helper: LESS_THAN_HELPER,
        },
    ),
    CatalogEntry::certain(
        Code::Blt,
        Signature::Stub {
            stub: BLT_STUB,
            helper: LESS_THAN_HELPER,
        },
    ),
    CatalogEntry::uncertain(
        Code::Cgt,
        Signature::Stub {
            stub: COMPARE_STUB,
            helper: GREATER_THAN_HELPER,
        },
    ),
    CatalogEntry::certain(
        Code::Clt,
        Signature::Stub {
            stub: COMPARE_STUB,
            helper: LESS_THAN_HELPER,
        },
    ),
    CatalogEntry::uncertain(Code::ConvR8, Signature::Prefix { stub: CONV_R8_STUB }),
    flagged(Code::Div, DIV_HELPER, SIGNED),
    flagged(Code::DivUn, DIV_HELPER, UNSIGNED),
    CatalogEntry::certain(
        Code::Ldarg,
        Signature::ArgumentLoad {
            width: OperandWidth::Word,
        },
    ),
    CatalogEntry::certain(
        Code::LdargS,
        Signature::ArgumentLoad {
            width: OperandWidth::Byte,
        },
    ),
    CatalogEntry::uncertain(
        Code::Ldarga,
        Signature::ArgumentAddressLoad {
            width: OperandWidth::Word,
        },
    ),
    CatalogEntry::uncertain(
        Code::LdargaS,
        Signature::ArgumentAddressLoad {
            width: OperandWidth::Byte,
        },
    ),
    argument_index(Code::Ldarg0, Code::LdcI4_0),
    argument_index(Code::Ldarg1, Code::LdcI4_1),
    argument_index(Code::Ldarg2, Code::LdcI4_2),
    argument_index(Code::Ldarg3, Code::LdcI4_3),
    constant(Code::LdcI4_0),
    constant(Code::LdcI4_1),
    constant(Code::LdcI4_2),
    constant(Code::LdcI4_3),
    constant(Code::LdcI4_4),
    constant(Code::LdcI4_5),
    constant(Code::LdcI4_6),
    constant(Code::LdcI4_7),
    constant(Code::LdcI4_8),
    constant(Code::LdcI4M1),
    indirect(Code::Or, OR_HELPER),
    flagged(Code::Rem, REM_HELPER, SIGNED),
    flagged(Code::RemUn, REM_HELPER, UNSIGNED),
    indirect(Code::Shl, SHL_HELPER),
    flagged(Code::Shr, SHR_HELPER, SHIFT_SIGNED),
    flagged(Code::ShrUn, SHR_HELPER, SHIFT_UNSIGNED),
    CatalogEntry::certain(
        Code::Starg,
        Signature::ArgumentStore {
            width: OperandWidth::Word,
        },
    ),
    CatalogEntry::certain(
        Code::StargS,
        Signature::ArgumentStore {
            width: OperandWidth::Byte,
        },
    ),
    flagged(Code::Sub, SUB_HELPER, PLAIN),
    flagged(Code::SubOvf, SUB_HELPER, OVERFLOW),
    flagged(Code::SubOvfUn, SUB_HELPER, OVERFLOW_UNSIGNED),
    indirect(Code::Xor, XOR_HELPER),
];

/// Returns the catalog entry recognizing `code`, if any.
#[must_use]
pub fn entry(code: Code) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.code == code)
}
