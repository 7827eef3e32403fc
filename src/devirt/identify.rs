//! Priority-ordered opcode identification.
//!
//! [`OpcodeIdentifier`] walks the [`CATALOG`] in order and returns the first recognizer
//! that accepts a handler. It holds no state beyond its configuration, so one identifier
//! can be shared freely across threads; [`OpcodeIdentifier::identify_all`] uses that to
//! classify large batches on the rayon thread pool.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use eazscope::assembly::{Code, Instruction, Operand};
//! use eazscope::devirt::{OpcodeIdentifier, VirtualInstruction, VirtualizationContext};
//! use eazscope::metadata::{graph::MethodGraph, provider::MethodDef, token::Token};
//!
//! let handler = Token::method_def(1);
//! let helper = Token::method_def(2);
//! let and_helper = [Code::LdlocS, Code::LdlocS, Code::And, Code::Callvirt, Code::Ldloc0, Code::Ret]
//!     .into_iter()
//!     .map(Instruction::simple)
//!     .collect();
//!
//! let graph: MethodGraph = [
//!     MethodDef::new(handler, "Handler", "System.Void", vec![
//!         Instruction::simple(Code::Ldarg0),
//!         Instruction::new(Code::Call, Operand::Method(helper)),
//!         Instruction::simple(Code::Ret),
//!     ]),
//!     MethodDef::new(helper, "Helper", "System.Void", and_helper),
//! ].into_iter().collect();
//!
//! let context = Arc::new(VirtualizationContext::new(Arc::new(graph), Token::field(1)));
//! let instruction = VirtualInstruction::new(&context, 12, handler)?;
//!
//! let identifier = OpcodeIdentifier::new();
//! assert_eq!(identifier.identify(&instruction)?, Code::And);
//! assert_eq!(identifier.matching(&instruction), vec![Code::And]);
//! # Ok::<(), eazscope::Error>(())
//! ```

use std::{collections::HashMap, fmt, sync::OnceLock};

use rayon::prelude::*;

use crate::{
    assembly::Code,
    devirt::{
        catalog::{CatalogEntry, CATALOG},
        config::IdentifierConfig,
        signature::Confidence,
        VirtualInstruction,
    },
    Error, Result,
};

/// Identifies the original opcode implemented by a virtual instruction's handler.
#[derive(Debug, Clone, Default)]
pub struct OpcodeIdentifier {
    config: IdentifierConfig,
}

impl OpcodeIdentifier {
    /// Creates an identifier with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an identifier with a custom configuration.
    #[must_use]
    pub fn with_config(config: IdentifierConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// Iterates over the consulted catalog entries, in priority order.
    pub fn entries(&self) -> impl Iterator<Item = &'static CatalogEntry> + '_ {
        CATALOG.iter().filter(|entry| {
            self.config.include_uncertain || entry.confidence == Confidence::Certain
        })
    }

    /// Returns the opcode of the first recognizer that accepts the handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpcodeUnidentified`] if no recognizer matches.
    pub fn identify(&self, instruction: &VirtualInstruction) -> Result<Code> {
        self.try_identify(instruction)
            .ok_or_else(|| Error::OpcodeUnidentified(Box::new(instruction.clone())))
    }

    /// Like [`Self::identify`], but returns `None` instead of an error.
    #[must_use]
    pub fn try_identify(&self, instruction: &VirtualInstruction) -> Option<Code> {
        let found = self
            .entries()
            .find(|entry| entry.matches(instruction))
            .map(|entry| entry.code);

        match found {
            Some(code) => log::debug!("identified {instruction} as {code}"),
            None => log::debug!("no recognizer matched {instruction}"),
        }
        found
    }

    /// Like [`Self::try_identify`], but maps failure to [`Code::Unknown`].
    #[must_use]
    pub fn identify_or_unknown(&self, instruction: &VirtualInstruction) -> Code {
        self.try_identify(instruction).unwrap_or(Code::Unknown)
    }

    /// Lists every recognizer that accepts the handler, in priority order.
    ///
    /// More than one entry means the handler is ambiguous and [`Self::identify`] picked
    /// the first.
    #[must_use]
    pub fn matching(&self, instruction: &VirtualInstruction) -> Vec<Code> {
        self.entries()
            .filter(|entry| entry.matches(instruction))
            .map(|entry| entry.code)
            .collect()
    }

    /// Identifies a batch of independent virtual instructions.
    ///
    /// Batches at or above the configured parallel threshold are processed on the rayon
    /// thread pool. The report preserves input order in both of its lists.
    #[must_use]
    pub fn identify_all(&self, instructions: &[VirtualInstruction]) -> IdentificationReport {
        let outcomes: Vec<Option<Code>> = if instructions.len() >= self.config.parallel_threshold
        {
            instructions
                .par_iter()
                .map(|instruction| self.try_identify(instruction))
                .collect()
        } else {
            instructions
                .iter()
                .map(|instruction| self.try_identify(instruction))
                .collect()
        };

        let mut report = IdentificationReport::default();
        for (instruction, outcome) in instructions.iter().zip(outcomes) {
            match outcome {
                Some(code) => report.identified.push((instruction.clone(), code)),
                None => report.unresolved.push(instruction.clone()),
            }
        }

        if !report.unresolved.is_empty() {
            log::warn!(
                "{} of {} virtual instructions left unresolved",
                report.unresolved.len(),
                instructions.len()
            );
        }
        report
    }
}

/// Outcome of [`OpcodeIdentifier::identify_all`].
#[derive(Default, Clone)]
pub struct IdentificationReport {
    /// Instructions with their identified opcodes, in input order.
    pub identified: Vec<(VirtualInstruction, Code)>,
    /// Instructions no recognizer accepted, in input order.
    pub unresolved: Vec<VirtualInstruction>,
}

impl IdentificationReport {
    /// Returns `true` if every instruction was identified.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Total number of instructions in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identified.len() + self.unresolved.len()
    }

    /// Returns `true` if the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps each identified virtual opcode to its original opcode.
    #[must_use]
    pub fn opcode_map(&self) -> HashMap<i32, Code> {
        self.identified
            .iter()
            .map(|(instruction, code)| (instruction.virtual_code(), *code))
            .collect()
    }

    /// Returns a one-line summary of the batch.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No virtual instructions".to_string();
        }

        format!(
            "Identified {} of {} virtual instructions, {} unresolved",
            self.identified.len(),
            self.len(),
            self.unresolved.len()
        )
    }
}

impl fmt::Display for IdentificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl fmt::Debug for IdentificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentificationReport")
            .field("identified", &self.identified.len())
            .field("unresolved", &self.unresolved.len())
            .finish()
    }
}

fn default_identifier() -> &'static OpcodeIdentifier {
    static DEFAULT: OnceLock<OpcodeIdentifier> = OnceLock::new();
    DEFAULT.get_or_init(OpcodeIdentifier::new)
}

impl VirtualInstruction {
    /// Identifies this instruction with the default [`OpcodeIdentifier`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpcodeUnidentified`] if no recognizer matches.
    pub fn identify(&self) -> Result<Code> {
        default_identifier().identify(self)
    }

    /// Identifies this instruction with the default [`OpcodeIdentifier`], returning
    /// `None` if no recognizer matches.
    #[must_use]
    pub fn try_identify(&self) -> Option<Code> {
        default_identifier().try_identify(self)
    }
}
