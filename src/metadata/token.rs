//! Metadata tokens, the identity of fields and methods.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A metadata token identifying a single declaration.
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the metadata table
/// - The low 24 bits (bits 0-23) indicate the row index within that table
///
/// Two tokens are equal only if they name the same row of the same table. This is the
/// identity primitive used by the recognizers: two fields with identical names and types
/// but different declarations never compare equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Table id of the `TypeDef` table
    pub const TABLE_TYPEDEF: u8 = 0x02;
    /// Table id of the `Field` table
    pub const TABLE_FIELD: u8 = 0x04;
    /// Table id of the `MethodDef` table
    pub const TABLE_METHODDEF: u8 = 0x06;
    /// Table id of the `MemberRef` table
    pub const TABLE_MEMBERREF: u8 = 0x0A;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a row index.
    ///
    /// Row indices wider than 24 bits are truncated.
    #[must_use]
    pub const fn from_parts(table: u8, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Creates a `Field` table token for the given row
    #[must_use]
    pub const fn field(row: u32) -> Self {
        Self::from_parts(Self::TABLE_FIELD, row)
    }

    /// Creates a `MethodDef` table token for the given row
    #[must_use]
    pub const fn method_def(row: u32) -> Self {
        Self::from_parts(Self::TABLE_METHODDEF, row)
    }

    /// Creates a `TypeDef` table token for the given row
    #[must_use]
    pub const fn type_def(row: u32) -> Self {
        Self::from_parts(Self::TABLE_TYPEDEF, row)
    }

    /// Returns the raw token value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub const fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this token can name a field (`Field` or `MemberRef`)
    #[must_use]
    pub const fn is_field_like(&self) -> bool {
        matches!(self.table(), Self::TABLE_FIELD | Self::TABLE_MEMBERREF)
    }

    /// Returns true if this token can name a method (`MethodDef` or `MemberRef`)
    #[must_use]
    pub const fn is_method_like(&self) -> bool {
        matches!(self.table(), Self::TABLE_METHODDEF | Self::TABLE_MEMBERREF)
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
