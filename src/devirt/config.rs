//! Configuration for opcode identification.
//!
//! This module provides [`IdentifierConfig`], which controls which recognizers the
//! dispatcher consults and how batches of virtual instructions are scheduled.

/// Configuration for an [`crate::devirt::OpcodeIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierConfig {
    /// Consult recognizers whose patterns may be too generic (default: true).
    ///
    /// These are `cgt`, `conv.r8`, `ldarga` and `ldarga.s`. Excluding them removes the
    /// entries from the priority sequence without reordering the rest.
    pub include_uncertain: bool,
    /// Minimum batch size before [`crate::devirt::OpcodeIdentifier::identify_all`]
    /// spreads work across the rayon thread pool (default: 64).
    pub parallel_threshold: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            include_uncertain: true,
            parallel_threshold: 64,
        }
    }
}

impl IdentifierConfig {
    /// Creates a new configuration with default settings.
    ///
    /// # Returns
    ///
    /// A new `IdentifierConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a "strict" configuration that only trusts verified patterns.
    ///
    /// Handlers that only an uncertain recognizer would accept are reported as
    /// unidentified instead.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            include_uncertain: false,
            ..Self::default()
        }
    }

    /// Sets whether uncertain recognizers are consulted.
    #[must_use]
    pub fn with_uncertain(mut self, include: bool) -> Self {
        self.include_uncertain = include;
        self
    }

    /// Sets the minimum batch size for parallel identification.
    ///
    /// A threshold of `0` or `1` parallelizes every batch; `usize::MAX` never does.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}
