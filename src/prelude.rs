//! # eazscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the eazscope library. Import this module to get quick access to the essential
//! types for identifying virtualized opcodes.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all eazscope operations
pub use crate::Error;

/// The result type used throughout eazscope
pub use crate::Result;

// ================================================================================================
// Instructions
// ================================================================================================

/// CIL opcode tags, operands and decoded instructions
pub use crate::assembly::{Code, Immediate, Instruction, Operand};

// ================================================================================================
// Metadata
// ================================================================================================

/// Metadata token identity
pub use crate::metadata::token::Token;

/// Method body access and the in-memory provider
pub use crate::metadata::{
    graph::MethodGraph,
    provider::{MethodDef, MethodProvider},
};

// ================================================================================================
// Identification
// ================================================================================================

/// Virtual instructions and their context
pub use crate::devirt::{VirtualInstruction, VirtualizationContext};

/// The dispatcher, its configuration and batch reports
pub use crate::devirt::{IdentificationReport, IdentifierConfig, OpcodeIdentifier};

/// Recognizer catalog and shapes
pub use crate::devirt::{CatalogEntry, Confidence, OperandWidth, Signature, CATALOG};
