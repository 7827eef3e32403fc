//! In-memory method graph.
//!
//! [`MethodGraph`] is a ready-made [`MethodProvider`] for pipelines that decode bodies
//! up front, and for tests. Methods are stored in an immutable map once the graph is
//! shared; direct-callee lists are computed on first request and memoized in a
//! [`DashMap`] so concurrent identification threads never scan the same body twice.

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;

use crate::{
    assembly::Instruction,
    metadata::{
        provider::{direct_callees, MethodDef, MethodProvider},
        token::Token,
    },
};

/// A set of decoded methods keyed by token.
///
/// # Examples
///
/// ```rust
/// use eazscope::assembly::{Code, Instruction, Operand};
/// use eazscope::metadata::{graph::MethodGraph, provider::{MethodDef, MethodProvider}, token::Token};
///
/// let helper = Token::method_def(2);
/// let mut graph = MethodGraph::new();
/// graph.insert(MethodDef::new(Token::method_def(1), "Handler", "System.Void", vec![
///     Instruction::new(Code::Call, Operand::Method(helper)),
///     Instruction::simple(Code::Ret),
/// ]));
///
/// assert_eq!(graph.callees(Token::method_def(1)), vec![helper]);
/// assert!(graph.body(helper).is_none());
/// ```
#[derive(Debug, Default)]
pub struct MethodGraph {
    methods: HashMap<Token, MethodDef>,
    callees: DashMap<Token, Arc<[Token]>>,
}

impl MethodGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a method, replacing and returning any previous declaration with the
    /// same token.
    pub fn insert(&mut self, method: MethodDef) -> Option<MethodDef> {
        self.callees.remove(&method.token);
        self.methods.insert(method.token, method)
    }

    /// Returns the declaration for `token`.
    #[must_use]
    pub fn method(&self, token: Token) -> Option<&MethodDef> {
        self.methods.get(&token)
    }

    /// Returns `true` if the graph contains `token`.
    #[must_use]
    pub fn contains(&self, token: Token) -> bool {
        self.methods.contains_key(&token)
    }

    /// Number of methods in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if the graph holds no methods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl MethodProvider for MethodGraph {
    fn body(&self, method: Token) -> Option<&[Instruction]> {
        self.methods.get(&method).map(|m| m.body.as_slice())
    }

    fn return_type_name(&self, method: Token) -> Option<&str> {
        self.methods.get(&method).map(|m| m.return_type.as_str())
    }

    fn callees(&self, method: Token) -> Vec<Token> {
        if let Some(cached) = self.callees.get(&method) {
            return cached.to_vec();
        }

        let Some(body) = self.body(method) else {
            return Vec::new();
        };

        let computed: Arc<[Token]> = direct_callees(body).into();
        self.callees.insert(method, computed.clone());
        computed.to_vec()
    }
}

impl FromIterator<MethodDef> for MethodGraph {
    fn from_iter<I: IntoIterator<Item = MethodDef>>(iter: I) -> Self {
        let mut graph = MethodGraph::new();
        for method in iter {
            graph.insert(method);
        }
        graph
    }
}
