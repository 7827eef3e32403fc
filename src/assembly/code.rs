//! Abstract CIL opcode tags.
//!
//! [`Code`] is the operand-free identity of a CIL instruction. Handler bodies are
//! compared against patterns purely on their sequence of [`Code`] values, so this enum
//! is the alphabet every pattern in the catalog is written in.
//!
//! The table below is the complete ECMA-335 opcode set. Single-byte opcodes carry a
//! prefix of `0x00`, two-byte opcodes carry the shared `0xFE` prefix followed by their
//! second byte, mirroring how a decoder reports them.
//!
//! # Examples
//!
//! ```rust
//! use eazscope::assembly::Code;
//!
//! assert_eq!(Code::from_opcode(0x00, 0x5F), Some(Code::And));
//! assert_eq!(Code::from_opcode(0xFE, 0x03), Some(Code::CgtUn));
//! assert_eq!(Code::LdcI4M1.mnemonic(), "ldc.i4.m1");
//! assert_eq!(Code::LdcI4_3.short_i4_value(), Some(3));
//! ```

use std::fmt;

use strum::{EnumCount, EnumIter};

macro_rules! cil_codes {
    ($( $variant:ident = ($prefix:literal, $byte:literal, $mnemonic:literal) ),* $(,)?) => {
        /// A CIL opcode tag, without operand.
        ///
        /// [`Code::Unknown`] is a sentinel that no decoder produces; it is returned by
        /// the non-failing identification entry points when no recognizer matched.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumIter, EnumCount)]
        pub enum Code {
            $(
                #[doc = concat!("`", $mnemonic, "`")]
                $variant,
            )*
            /// Sentinel for "no opcode identified".
            Unknown,
        }

        impl Code {
            /// Returns the ECMA-335 mnemonic of this opcode.
            #[must_use]
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Code::$variant => $mnemonic, )*
                    Code::Unknown => "<unknown>",
                }
            }

            /// Returns the `(prefix, byte)` encoding of this opcode.
            ///
            /// The prefix is `0x00` for single-byte opcodes and `0xFE` for
            /// two-byte opcodes. Returns `None` for [`Code::Unknown`].
            #[must_use]
            pub const fn opcode(&self) -> Option<(u8, u8)> {
                match self {
                    $( Code::$variant => Some(($prefix, $byte)), )*
                    Code::Unknown => None,
                }
            }

            /// Maps a raw `(prefix, byte)` opcode pair to its tag.
            ///
            /// Returns `None` for unassigned opcode values.
            #[must_use]
            pub const fn from_opcode(prefix: u8, byte: u8) -> Option<Code> {
                match (prefix, byte) {
                    $( ($prefix, $byte) => Some(Code::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

cil_codes! {
    Nop = (0x00, 0x00, "nop"),
    Break = (0x00, 0x01, "break"),
    Ldarg0 = (0x00, 0x02, "ldarg.0"),
    Ldarg1 = (0x00, 0x03, "ldarg.1"),
    Ldarg2 = (0x00, 0x04, "ldarg.2"),
    Ldarg3 = (0x00, 0x05, "ldarg.3"),
    Ldloc0 = (0x00, 0x06, "ldloc.0"),
    Ldloc1 = (0x00, 0x07, "ldloc.1"),
    Ldloc2 = (0x00, 0x08, "ldloc.2"),
    Ldloc3 = (0x00, 0x09, "ldloc.3"),
    Stloc0 = (0x00, 0x0A, "stloc.0"),
    Stloc1 = (0x00, 0x0B, "stloc.1"),
    Stloc2 = (0x00, 0x0C, "stloc.2"),
    Stloc3 = (0x00, 0x0D, "stloc.3"),
    LdargS = (0x00, 0x0E, "ldarg.s"),
    LdargaS = (0x00, 0x0F, "ldarga.s"),
    StargS = (0x00, 0x10, "starg.s"),
    LdlocS = (0x00, 0x11, "ldloc.s"),
    LdlocaS = (0x00, 0x12, "ldloca.s"),
    StlocS = (0x00, 0x13, "stloc.s"),
    Ldnull = (0x00, 0x14, "ldnull"),
    LdcI4M1 = (0x00, 0x15, "ldc.i4.m1"),
    LdcI4_0 = (0x00, 0x16, "ldc.i4.0"),
    LdcI4_1 = (0x00, 0x17, "ldc.i4.1"),
    LdcI4_2 = (0x00, 0x18, "ldc.i4.2"),
    LdcI4_3 = (0x00, 0x19, "ldc.i4.3"),
    LdcI4_4 = (0x00, 0x1A, "ldc.i4.4"),
    LdcI4_5 = (0x00, 0x1B, "ldc.i4.5"),
    LdcI4_6 = (0x00, 0x1C, "ldc.i4.6"),
    LdcI4_7 = (0x00, 0x1D, "ldc.i4.7"),
    LdcI4_8 = (0x00, 0x1E, "ldc.i4.8"),
    LdcI4S = (0x00, 0x1F, "ldc.i4.s"),
    LdcI4 = (0x00, 0x20, "ldc.i4"),
    LdcI8 = (0x00, 0x21, "ldc.i8"),
    LdcR4 = (0x00, 0x22, "ldc.r4"),
    LdcR8 = (0x00, 0x23, "ldc.r8"),
    Dup = (0x00, 0x25, "dup"),
    Pop = (0x00, 0x26, "pop"),
    Jmp = (0x00, 0x27, "jmp"),
    Call = (0x00, 0x28, "call"),
    Calli = (0x00, 0x29, "calli"),
    Ret = (0x00, 0x2A, "ret"),
    BrS = (0x00, 0x2B, "br.s"),
    BrfalseS = (0x00, 0x2C, "brfalse.s"),
    BrtrueS = (0x00, 0x2D, "brtrue.s"),
    BeqS = (0x00, 0x2E, "beq.s"),
    BgeS = (0x00, 0x2F, "bge.s"),
    BgtS = (0x00, 0x30, "bgt.s"),
    BleS = (0x00, 0x31, "ble.s"),
    BltS = (0x00, 0x32, "blt.s"),
    BneUnS = (0x00, 0x33, "bne.un.s"),
    BgeUnS = (0x00, 0x34, "bge.un.s"),
    BgtUnS = (0x00, 0x35, "bgt.un.s"),
    BleUnS = (0x00, 0x36, "ble.un.s"),
    BltUnS = (0x00, 0x37, "blt.un.s"),
    Br = (0x00, 0x38, "br"),
    Brfalse = (0x00, 0x39, "brfalse"),
    Brtrue = (0x00, 0x3A, "brtrue"),
    Beq = (0x00, 0x3B, "beq"),
    Bge = (0x00, 0x3C, "bge"),
    Bgt = (0x00, 0x3D, "bgt"),
    Ble = (0x00, 0x3E, "ble"),
    Blt = (0x00, 0x3F, "blt"),
    BneUn = (0x00, 0x40, "bne.un"),
    BgeUn = (0x00, 0x41, "bge.un"),
    BgtUn = (0x00, 0x42, "bgt.un"),
    BleUn = (0x00, 0x43, "ble.un"),
    BltUn = (0x00, 0x44, "blt.un"),
    Switch = (0x00, 0x45, "switch"),
    LdindI1 = (0x00, 0x46, "ldind.i1"),
    LdindU1 = (0x00, 0x47, "ldind.u1"),
    LdindI2 = (0x00, 0x48, "ldind.i2"),
    LdindU2 = (0x00, 0x49, "ldind.u2"),
    LdindI4 = (0x00, 0x4A, "ldind.i4"),
    LdindU4 = (0x00, 0x4B, "ldind.u4"),
    LdindI8 = (0x00, 0x4C, "ldind.i8"),
    LdindI = (0x00, 0x4D, "ldind.i"),
    LdindR4 = (0x00, 0x4E, "ldind.r4"),
    LdindR8 = (0x00, 0x4F, "ldind.r8"),
    LdindRef = (0x00, 0x50, "ldind.ref"),
    StindRef = (0x00, 0x51, "stind.ref"),
    StindI1 = (0x00, 0x52, "stind.i1"),
    StindI2 = (0x00, 0x53, "stind.i2"),
    StindI4 = (0x00, 0x54, "stind.i4"),
    StindI8 = (0x00, 0x55, "stind.i8"),
    StindR4 = (0x00, 0x56, "stind.r4"),
    StindR8 = (0x00, 0x57, "stind.r8"),
    Add = (0x00, 0x58, "add"),
    Sub = (0x00, 0x59, "sub"),
    Mul = (0x00, 0x5A, "mul"),
    Div = (0x00, 0x5B, "div"),
    DivUn = (0x00, 0x5C, "div.un"),
    Rem = (0x00, 0x5D, "rem"),
    RemUn = (0x00, 0x5E, "rem.un"),
    And = (0x00, 0x5F, "and"),
    Or = (0x00, 0x60, "or"),
    Xor = (0x00, 0x61, "xor"),
    Shl = (0x00, 0x62, "shl"),
    Shr = (0x00, 0x63, "shr"),
    ShrUn = (0x00, 0x64, "shr.un"),
    Neg = (0x00, 0x65, "neg"),
    Not = (0x00, 0x66, "not"),
    ConvI1 = (0x00, 0x67, "conv.i1"),
    ConvI2 = (0x00, 0x68, "conv.i2"),
    ConvI4 = (0x00, 0x69, "conv.i4"),
    ConvI8 = (0x00, 0x6A, "conv.i8"),
    ConvR4 = (0x00, 0x6B, "conv.r4"),
    ConvR8 = (0x00, 0x6C, "conv.r8"),
    ConvU4 = (0x00, 0x6D, "conv.u4"),
    ConvU8 = (0x00, 0x6E, "conv.u8"),
    Callvirt = (0x00, 0x6F, "callvirt"),
    Cpobj = (0x00, 0x70, "cpobj"),
    Ldobj = (0x00, 0x71, "ldobj"),
    Ldstr = (0x00, 0x72, "ldstr"),
    Newobj = (0x00, 0x73, "newobj"),
    Castclass = (0x00, 0x74, "castclass"),
    Isinst = (0x00, 0x75, "isinst"),
    ConvRUn = (0x00, 0x76, "conv.r.un"),
    Unbox = (0x00, 0x79, "unbox"),
    Throw = (0x00, 0x7A, "throw"),
    Ldfld = (0x00, 0x7B, "ldfld"),
    Ldflda = (0x00, 0x7C, "ldflda"),
    Stfld = (0x00, 0x7D, "stfld"),
    Ldsfld = (0x00, 0x7E, "ldsfld"),
    Ldsflda = (0x00, 0x7F, "ldsflda"),
    Stsfld = (0x00, 0x80, "stsfld"),
    Stobj = (0x00, 0x81, "stobj"),
    ConvOvfI1Un = (0x00, 0x82, "conv.ovf.i1.un"),
    ConvOvfI2Un = (0x00, 0x83, "conv.ovf.i2.un"),
    ConvOvfI4Un = (0x00, 0x84, "conv.ovf.i4.un"),
    ConvOvfI8Un = (0x00, 0x85, "conv.ovf.i8.un"),
    ConvOvfU1Un = (0x00, 0x86, "conv.ovf.u1.un"),
    ConvOvfU2Un = (0x00, 0x87, "conv.ovf.u2.un"),
    ConvOvfU4Un = (0x00, 0x88, "conv.ovf.u4.un"),
    ConvOvfU8Un = (0x00, 0x89, "conv.ovf.u8.un"),
    ConvOvfIUn = (0x00, 0x8A, "conv.ovf.i.un"),
    ConvOvfUUn = (0x00, 0x8B, "conv.ovf.u.un"),
    Box = (0x00, 0x8C, "box"),
    Newarr = (0x00, 0x8D, "newarr"),
    Ldlen = (0x00, 0x8E, "ldlen"),
    Ldelema = (0x00, 0x8F, "ldelema"),
    LdelemI1 = (0x00, 0x90, "ldelem.i1"),
    LdelemU1 = (0x00, 0x91, "ldelem.u1"),
    LdelemI2 = (0x00, 0x92, "ldelem.i2"),
    LdelemU2 = (0x00, 0x93, "ldelem.u2"),
    LdelemI4 = (0x00, 0x94, "ldelem.i4"),
    LdelemU4 = (0x00, 0x95, "ldelem.u4"),
    LdelemI8 = (0x00, 0x96, "ldelem.i8"),
    LdelemI = (0x00, 0x97, "ldelem.i"),
    LdelemR4 = (0x00, 0x98, "ldelem.r4"),
    LdelemR8 = (0x00, 0x99, "ldelem.r8"),
    LdelemRef = (0x00, 0x9A, "ldelem.ref"),
    StelemI = (0x00, 0x9B, "stelem.i"),
    StelemI1 = (0x00, 0x9C, "stelem.i1"),
    StelemI2 = (0x00, 0x9D, "stelem.i2"),
    StelemI4 = (0x00, 0x9E, "stelem.i4"),
    StelemI8 = (0x00, 0x9F, "stelem.i8"),
    StelemR4 = (0x00, 0xA0, "stelem.r4"),
    StelemR8 = (0x00, 0xA1, "stelem.r8"),
    StelemRef = (0x00, 0xA2, "stelem.ref"),
    Ldelem = (0x00, 0xA3, "ldelem"),
    Stelem = (0x00, 0xA4, "stelem"),
    UnboxAny = (0x00, 0xA5, "unbox.any"),
    ConvOvfI1 = (0x00, 0xB3, "conv.ovf.i1"),
    ConvOvfU1 = (0x00, 0xB4, "conv.ovf.u1"),
    ConvOvfI2 = (0x00, 0xB5, "conv.ovf.i2"),
    ConvOvfU2 = (0x00, 0xB6, "conv.ovf.u2"),
    ConvOvfI4 = (0x00, 0xB7, "conv.ovf.i4"),
    ConvOvfU4 = (0x00, 0xB8, "conv.ovf.u4"),
    ConvOvfI8 = (0x00, 0xB9, "conv.ovf.i8"),
    ConvOvfU8 = (0x00, 0xBA, "conv.ovf.u8"),
    Refanyval = (0x00, 0xC2, "refanyval"),
    Ckfinite = (0x00, 0xC3, "ckfinite"),
    Mkrefany = (0x00, 0xC6, "mkrefany"),
    Ldtoken = (0x00, 0xD0, "ldtoken"),
    ConvU2 = (0x00, 0xD1, "conv.u2"),
    ConvU1 = (0x00, 0xD2, "conv.u1"),
    ConvI = (0x00, 0xD3, "conv.i"),
    ConvOvfI = (0x00, 0xD4, "conv.ovf.i"),
    ConvOvfU = (0x00, 0xD5, "conv.ovf.u"),
    AddOvf = (0x00, 0xD6, "add.ovf"),
    AddOvfUn = (0x00, 0xD7, "add.ovf.un"),
    MulOvf = (0x00, 0xD8, "mul.ovf"),
    MulOvfUn = (0x00, 0xD9, "mul.ovf.un"),
    SubOvf = (0x00, 0xDA, "sub.ovf"),
    SubOvfUn = (0x00, 0xDB, "sub.ovf.un"),
    Endfinally = (0x00, 0xDC, "endfinally"),
    Leave = (0x00, 0xDD, "leave"),
    LeaveS = (0x00, 0xDE, "leave.s"),
    StindI = (0x00, 0xDF, "stind.i"),
    ConvU = (0x00, 0xE0, "conv.u"),
    Arglist = (0xFE, 0x00, "arglist"),
    Ceq = (0xFE, 0x01, "ceq"),
    Cgt = (0xFE, 0x02, "cgt"),
    CgtUn = (0xFE, 0x03, "cgt.un"),
    Clt = (0xFE, 0x04, "clt"),
    CltUn = (0xFE, 0x05, "clt.un"),
    Ldftn = (0xFE, 0x06, "ldftn"),
    Ldvirtftn = (0xFE, 0x07, "ldvirtftn"),
    Ldarg = (0xFE, 0x09, "ldarg"),
    Ldarga = (0xFE, 0x0A, "ldarga"),
    Starg = (0xFE, 0x0B, "starg"),
    Ldloc = (0xFE, 0x0C, "ldloc"),
    Ldloca = (0xFE, 0x0D, "ldloca"),
    Stloc = (0xFE, 0x0E, "stloc"),
    Localloc = (0xFE, 0x0F, "localloc"),
    Endfilter = (0xFE, 0x11, "endfilter"),
    Unaligned = (0xFE, 0x12, "unaligned."),
    Volatile = (0xFE, 0x13, "volatile."),
    Tail = (0xFE, 0x14, "tail."),
    Initobj = (0xFE, 0x15, "initobj"),
    Constrained = (0xFE, 0x16, "constrained."),
    Cpblk = (0xFE, 0x17, "cpblk"),
    Initblk = (0xFE, 0x18, "initblk"),
    No = (0xFE, 0x19, "no."),
    Rethrow = (0xFE, 0x1A, "rethrow"),
    Sizeof = (0xFE, 0x1C, "sizeof"),
    Refanytype = (0xFE, 0x1D, "refanytype"),
    Readonly = (0xFE, 0x1E, "readonly."),
}

impl Code {
    /// Returns `true` for the two instructions that transfer control to a method
    /// named by a metadata token (`call` and `callvirt`).
    ///
    /// `calli` and `newobj` are excluded: the former calls through a pointer and the
    /// latter constructs an object, neither of which counts as a direct callee edge.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self, Code::Call | Code::Callvirt)
    }

    /// Returns the constant pushed by the operand-free `ldc.i4.*` short forms.
    ///
    /// `ldc.i4.s` and `ldc.i4` carry their value in the operand and are not handled here;
    /// see [`crate::assembly::Instruction::i32_literal`].
    #[must_use]
    pub const fn short_i4_value(&self) -> Option<i32> {
        match self {
            Code::LdcI4M1 => Some(-1),
            Code::LdcI4_0 => Some(0),
            Code::LdcI4_1 => Some(1),
            Code::LdcI4_2 => Some(2),
            Code::LdcI4_3 => Some(3),
            Code::LdcI4_4 => Some(4),
            Code::LdcI4_5 => Some(5),
            Code::LdcI4_6 => Some(6),
            Code::LdcI4_7 => Some(7),
            Code::LdcI4_8 => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Renders a sequence of tags as a bracketed, comma separated list of mnemonics.
pub(crate) fn format_codes(codes: &[Code]) -> String {
    let parts: Vec<&str> = codes.iter().map(Code::mnemonic).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_opcode_roundtrip() {
        for code in Code::iter().filter(|c| *c != Code::Unknown) {
            let (prefix, byte) = code.opcode().unwrap();
            assert_eq!(Code::from_opcode(prefix, byte), Some(code), "{code}");
        }
    }

    #[test]
    fn test_unknown_sentinel() {
        assert_eq!(Code::Unknown.opcode(), None);
        assert_eq!(Code::Unknown.mnemonic(), "<unknown>");
        assert_eq!(Code::COUNT, Code::iter().count());
    }

    #[test]
    fn test_mnemonics_unique() {
        let mnemonics: HashSet<&str> = Code::iter().map(|c| c.mnemonic()).collect();
        assert_eq!(mnemonics.len(), Code::COUNT);
    }

    #[test]
    fn test_unassigned_opcodes() {
        assert_eq!(Code::from_opcode(0x00, 0x24), None);
        assert_eq!(Code::from_opcode(0xFE, 0x08), None);
        assert_eq!(Code::from_opcode(0x01, 0x00), None);
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(Code::LdcI4M1.short_i4_value(), Some(-1));
        assert_eq!(Code::LdcI4_8.short_i4_value(), Some(8));
        assert_eq!(Code::LdcI4S.short_i4_value(), None);
        assert!(Code::Call.is_call());
        assert!(Code::Callvirt.is_call());
        assert!(!Code::Newobj.is_call());
    }

    #[test]
    fn test_format_codes() {
        assert_eq!(
            format_codes(&[Code::LdlocS, Code::And, Code::Ret]),
            "[ldloc.s, and, ret]"
        );
        assert_eq!(format_codes(&[]), "[]");
    }
}
