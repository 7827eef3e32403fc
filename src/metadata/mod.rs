//! Method metadata consumed by identification.
//!
//! This module holds the identity primitive ([`token::Token`]), the collaborator
//! interface through which handler and callee bodies are resolved
//! ([`provider::MethodProvider`]), and an in-memory implementation of it
//! ([`graph::MethodGraph`]).

/// In-memory method graph with memoized callee lookup
pub mod graph;
/// The method body collaborator trait
pub mod provider;
/// Commonly used metadata token type
pub mod token;
