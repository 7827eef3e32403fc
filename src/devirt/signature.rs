//! Recognizer shapes.
//!
//! A [`Signature`] is a declarative description of how one opcode's handler looks. Every
//! catalog entry is one of a small number of shapes, so a single evaluator
//! ([`Signature::matches`]) serves all 41 recognizers; the flag-discriminated arithmetic
//! families in particular share [`Signature::Discriminated`].

use std::fmt;

use crate::{
    assembly::{format_codes, Code},
    devirt::{
        matcher::SlotName,
        patterns::{
            ARGUMENT_ADDRESS_LOAD, ARGUMENT_ADDRESS_LOAD_ACCESSOR, ARGUMENT_ADDRESS_LOAD_FIELD,
            ARGUMENT_INDEX_LOAD, ARGUMENT_INDEX_LOAD_FIELD, ARGUMENT_LOAD, ARGUMENT_LOAD_ACCESSOR,
            ARGUMENT_LOAD_FIELD, ARGUMENT_STORE, ARGUMENT_STORE_ACCESSOR, ARGUMENT_STORE_TAIL,
            CONSTANT_LOAD,
        },
        VirtualInstruction,
    },
};

/// How much a recognizer's pattern can be trusted to be unique to its opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// The pattern has been verified against generated handlers
    Certain,
    /// The pattern is believed correct but may be too generic
    Uncertain,
}

/// Width of an argument-index operand, as encoded by the accessor's return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandWidth {
    /// 16-bit operand (`ldarg`, `ldarga`, `starg`)
    Word,
    /// 8-bit operand (`ldarg.s`, `ldarga.s`, `starg.s`)
    Byte,
}

impl OperandWidth {
    /// Full name of the accessor return type for this width.
    #[must_use]
    pub const fn return_type(&self) -> &'static str {
        match self {
            OperandWidth::Word => "System.UInt16",
            OperandWidth::Byte => "System.Byte",
        }
    }
}

/// The structural shape of one opcode's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// A direct callee contains `helper`.
    Indirect {
        /// Pattern searched for in the callees
        helper: &'static [Code],
    },
    /// A call site preceded by the boolean literals `flags` targets a method containing
    /// `helper`.
    Discriminated {
        /// Pattern shared by the whole family
        helper: &'static [Code],
        /// Literal arguments selecting this member, in argument order
        flags: &'static [bool],
    },
    /// The body starts with `stub`.
    Prefix {
        /// Required body prefix
        stub: &'static [Code],
    },
    /// The body starts with `stub` and a direct callee contains `helper`.
    Stub {
        /// Required body prefix
        stub: &'static [Code],
        /// Pattern searched for in the callees
        helper: &'static [Code],
    },
    /// Argument store: accessor of the given width followed by the store tail.
    ArgumentStore {
        /// Operand width
        width: OperandWidth,
    },
    /// Load of a fixed argument index through the argument-storage field.
    ArgumentIndexLoad {
        /// The `ldc.i4.*` form filling the index slot
        index: Code,
    },
    /// Argument address load with an accessor of the given width.
    ArgumentAddressLoad {
        /// Operand width
        width: OperandWidth,
    },
    /// Argument load with an accessor of the given width.
    ArgumentLoad {
        /// Operand width
        width: OperandWidth,
    },
    /// Push of the constant whose `ldc.i4.*` form fills the template slot.
    ConstantLoad {
        /// The `ldc.i4.*` form filling the constant slot
        constant: Code,
    },
}

impl Signature {
    /// Evaluates this signature against a virtual instruction's handler.
    #[must_use]
    pub fn matches(&self, instruction: &VirtualInstruction) -> bool {
        match *self {
            Signature::Indirect { helper } => instruction.matches_indirect(helper),
            Signature::Discriminated { helper, flags } => {
                instruction.matches_indirect_with_flags(helper, flags)
            }
            Signature::Prefix { stub } => instruction.matches_prefix(stub),
            Signature::Stub { stub, helper } => {
                instruction.matches_prefix(stub) && instruction.matches_indirect(helper)
            }
            Signature::ArgumentStore { width } => {
                instruction.find(ARGUMENT_STORE).is_some_and(|found| {
                    instruction.returns(&found[ARGUMENT_STORE_ACCESSOR], width.return_type())
                }) && instruction.matches_suffix(ARGUMENT_STORE_TAIL)
            }
            Signature::ArgumentIndexLoad { index } => {
                let Some(pattern) = ARGUMENT_INDEX_LOAD.substitute(SlotName::Constant, index)
                else {
                    return false;
                };
                instruction.matches_prefix(&pattern)
                    && instruction.is_arguments_field(&instruction.body()[ARGUMENT_INDEX_LOAD_FIELD])
            }
            Signature::ArgumentAddressLoad { width } => instruction
                .find(ARGUMENT_ADDRESS_LOAD)
                .is_some_and(|found| {
                    instruction.is_arguments_field(&found[ARGUMENT_ADDRESS_LOAD_FIELD])
                        && instruction.returns(
                            &found[ARGUMENT_ADDRESS_LOAD_ACCESSOR],
                            width.return_type(),
                        )
                }),
            Signature::ArgumentLoad { width } => {
                if !instruction.matches_entire(ARGUMENT_LOAD) {
                    return false;
                }
                let body = instruction.body();
                instruction.returns(&body[ARGUMENT_LOAD_ACCESSOR], width.return_type())
                    && instruction.is_arguments_field(&body[ARGUMENT_LOAD_FIELD])
            }
            Signature::ConstantLoad { constant } => CONSTANT_LOAD
                .substitute(SlotName::Constant, constant)
                .is_some_and(|pattern| instruction.matches_entire(&pattern)),
        }
    }

    /// Renders the structural basis of this signature in mnemonics.
    #[must_use]
    pub fn description(&self) -> String {
        match *self {
            Signature::Indirect { helper } => format!("callee contains {}", format_codes(helper)),
            Signature::Discriminated { helper, flags } => {
                let flags: Vec<String> = flags.iter().map(ToString::to_string).collect();
                format!(
                    "call with flags ({}) to callee containing {}",
                    flags.join(", "),
                    format_codes(helper)
                )
            }
            Signature::Prefix { stub } => format!("body starts with {}", format_codes(stub)),
            Signature::Stub { stub, helper } => format!(
                "body starts with {} and callee contains {}",
                format_codes(stub),
                format_codes(helper)
            ),
            Signature::ArgumentStore { width } => format!(
                "body contains {} with accessor returning {} and ends with {}",
                format_codes(ARGUMENT_STORE),
                width.return_type(),
                format_codes(ARGUMENT_STORE_TAIL)
            ),
            Signature::ArgumentIndexLoad { index } => format!(
                "body starts with {} where <constant> = {}, loading the argument field",
                ARGUMENT_INDEX_LOAD.description(),
                index
            ),
            Signature::ArgumentAddressLoad { width } => format!(
                "body contains {} loading the argument field, accessor returning {}",
                format_codes(ARGUMENT_ADDRESS_LOAD),
                width.return_type()
            ),
            Signature::ArgumentLoad { width } => format!(
                "body is {} loading the argument field, accessor returning {}",
                format_codes(ARGUMENT_LOAD),
                width.return_type()
            ),
            Signature::ConstantLoad { constant } => format!(
                "body is {} where <constant> = {}",
                CONSTANT_LOAD.description(),
                constant
            ),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
