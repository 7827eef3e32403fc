//! Structural patterns emitted by the VM's handler generator.
//!
//! Each constant is the exact opcode sequence found in a handler body or in one of its
//! helper methods. Recognizers in [`crate::devirt::catalog`] combine them; several
//! opcodes share a pattern and are told apart by discriminator literals, call-target
//! return types, or a substituted template slot.
//!
//! Naming: `*_HELPER` patterns are searched for in direct callees, `*_STUB` patterns
//! are matched as a prefix of the handler body itself.

use crate::{
    assembly::Code::{self, *},
    devirt::matcher::{SlotName, Template, TemplateElement},
};

/// Bitwise `and` helper.
pub const AND_HELPER: &[Code] = &[LdlocS, LdlocS, And, Callvirt, Ldloc0, Ret];

/// Bitwise `xor` helper.
pub const XOR_HELPER: &[Code] = &[LdlocS, LdlocS, Xor, Callvirt, Ldloc0, Ret];

/// Bitwise `or` helper.
pub const OR_HELPER: &[Code] = &[LdlocS, LdlocS, Or, Callvirt, Ldloc0, Ret];

/// Left shift helper; the shift amount is masked before shifting.
pub const SHL_HELPER: &[Code] = &[
    LdlocS, LdlocS, LdcI4S, And, Shl, StlocS, Newobj, Stloc0, Ldloc0, LdlocS, Callvirt,
    Ldloc0, Ret,
];

/// Right shift helper shared by `shr` and `shr.un`.
///
/// The helper receives a single boolean: `true` for the signed form.
pub const SHR_HELPER: &[Code] = &[LdcI4S, And, Shr, Callvirt, Ldloc0, Ret];

/// Division helper shared by `div` and `div.un`; the flag is the unsigned switch.
pub const DIV_HELPER: &[Code] = &[LdlocS, LdlocS, Div, Callvirt, Ldloc0, Ret];

/// Remainder helper shared by `rem` and `rem.un`; the flag is the unsigned switch.
pub const REM_HELPER: &[Code] = &[LdlocS, LdlocS, Rem, Callvirt, Ldloc0, Ret];

/// Addition helper shared by `add`, `add.ovf` and `add.ovf.un`.
///
/// Receives `(overflow, unsigned)` boolean flags.
pub const ADD_HELPER: &[Code] = &[
    Ldloc0, Ldloc1, Add, Stloc2, Newobj, Stloc3, Ldloc3, Ldloc2, Callvirt, Ldloc3, Ret,
];

/// Subtraction helper; the `sub` counterpart of [`ADD_HELPER`].
pub const SUB_HELPER: &[Code] = &[
    Ldloc0, Ldloc1, Sub, Stloc2, Newobj, Stloc3, Ldloc3, Ldloc2, Callvirt, Ldloc3, Ret,
];

/// Comparison helper reached from the `clt`, `bge` and `blt` handlers.
pub const LESS_THAN_HELPER: &[Code] = &[
    LdlocS, LdlocS, BltS, LdlocS, Call, BrtrueS, LdlocS, Call, BrS,
];

/// Comparison helper reached from the `cgt` handler.
pub const GREATER_THAN_HELPER: &[Code] = &[
    Ldarg0, Castclass, Callvirt, Ldarg1, Castclass, Callvirt, CgtUn, Stloc0,
];

/// Handler prefix that pushes the comparison result as `0` / `1` (`clt`, `cgt`).
pub const COMPARE_STUB: &[Code] = &[
    Call, BrtrueS, LdcI4_0, BrS, LdcI4_1, Callvirt, Ldloc2, Call, Ret,
];

/// Handler prefix of `bge`: branch when the less-than helper returns false.
pub const BGE_STUB: &[Code] = &[Call, BrtrueS, Ldarg1, Castclass];

/// Handler prefix of `blt`: branch when the less-than helper returns true.
pub const BLT_STUB: &[Code] = &[Call, BrfalseS, Ldarg1, Castclass];

/// Handler prefix of `conv.r8`.
pub const CONV_R8_STUB: &[Code] = &[
    Ldloc0, Callvirt, Call, BrtrueS, Ldloc0, Callvirt, Call, BrfalseS,
];

/// Argument-array element load inside the `starg` / `starg.s` handlers.
///
/// Position 3 calls the operand accessor whose return type encodes the operand width.
pub const ARGUMENT_STORE: &[Code] = &[Ldarg0, Ldfld, Ldloc0, Callvirt, Ldelem];

/// Required tail of the `starg` / `starg.s` handlers.
pub const ARGUMENT_STORE_TAIL: &[Code] = &[Callvirt, Pop, Ret];

/// Core of the `ldarga` / `ldarga.s` handlers.
///
/// Position 2 loads the argument-storage field, position 4 calls the operand accessor.
pub const ARGUMENT_ADDRESS_LOAD: &[Code] = &[
    Ldloc1, Ldarg0, Ldfld, Ldloc0, Callvirt, Ldelem, Callvirt, Ldloc1, Call, Ret,
];

/// Complete body of the `ldarg` / `ldarg.s` handlers.
///
/// Position 5 loads the argument-storage field, position 7 calls the operand accessor.
pub const ARGUMENT_LOAD: &[Code] = &[
    Ldarg1, Castclass, Stloc0, Ldarg0, Ldarg0, Ldfld, Ldloc0, Callvirt, Ldelem, Callvirt,
    Call, Ret,
];

/// Body prefix of the `ldarg.0` .. `ldarg.3` handlers.
///
/// The slot holds the argument index as an `ldc.i4.*` short form; position 2 loads the
/// argument-storage field.
pub const ARGUMENT_INDEX_LOAD: Template = Template::new(&[
    TemplateElement::Fixed(Ldarg0),
    TemplateElement::Fixed(Ldarg0),
    TemplateElement::Fixed(Ldfld),
    TemplateElement::Slot(SlotName::Constant),
    TemplateElement::Fixed(Ldelem),
    TemplateElement::Fixed(Callvirt),
    TemplateElement::Fixed(Call),
    TemplateElement::Fixed(Ret),
]);

/// Complete body of the `ldc.i4.0` .. `ldc.i4.8` and `ldc.i4.m1` handlers.
pub const CONSTANT_LOAD: Template = Template::new(&[
    TemplateElement::Fixed(Ldarg0),
    TemplateElement::Fixed(Newobj),
    TemplateElement::Fixed(Stloc0),
    TemplateElement::Fixed(Ldloc0),
    TemplateElement::Slot(SlotName::Constant),
    TemplateElement::Fixed(Callvirt),
    TemplateElement::Fixed(Ldloc0),
    TemplateElement::Fixed(Call),
    TemplateElement::Fixed(Ret),
]);

/// Position of the argument-storage field load in [`ARGUMENT_INDEX_LOAD`].
pub const ARGUMENT_INDEX_LOAD_FIELD: usize = 2;

/// Position of the operand accessor call in [`ARGUMENT_STORE`].
pub const ARGUMENT_STORE_ACCESSOR: usize = 3;

/// Position of the argument-storage field load in [`ARGUMENT_ADDRESS_LOAD`].
pub const ARGUMENT_ADDRESS_LOAD_FIELD: usize = 2;

/// Position of the operand accessor call in [`ARGUMENT_ADDRESS_LOAD`].
pub const ARGUMENT_ADDRESS_LOAD_ACCESSOR: usize = 4;

/// Position of the argument-storage field load in [`ARGUMENT_LOAD`].
pub const ARGUMENT_LOAD_FIELD: usize = 5;

/// Position of the operand accessor call in [`ARGUMENT_LOAD`].
pub const ARGUMENT_LOAD_ACCESSOR: usize = 7;
