//! Numeric function registry.
//!
//! Functions are looked up by name during expression evaluation and called
//! with already evaluated `f64` arguments.

use crate::builtins::BUILTINS;
use crate::error::{RegistryError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Function implementation: evaluated arguments in, value out.
pub type NumericFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Arity specification for a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Fixed number of arguments
    Fixed(usize),
    /// At least this many arguments
    AtLeast(usize),
    /// Any number of arguments
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => *n == count,
            Arity::AtLeast(n) => count >= *n,
            Arity::Variadic => true,
        }
    }

    pub fn as_option(&self) -> Option<usize> {
        match self {
            Arity::Fixed(n) => Some(*n),
            Arity::AtLeast(_) | Arity::Variadic => None,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Variadic => f.write_str("any number of"),
        }
    }
}

/// What happens when a name is registered twice.
///
/// Applies to [`FunctionRegistry::load_builtins`] too: under `Reject` a
/// builtin whose name is already registered is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one
    #[default]
    Overwrite,
    /// The later registration fails with `DuplicateFunction`
    Reject,
}

/// Descriptor for a registered function
#[derive(Clone)]
pub struct FunctionDescriptor {
    pub name: String,
    pub arity: Arity,
    pub implementation: NumericFn,
}

impl FunctionDescriptor {
    /// Check arity and evaluate.
    pub fn eval(&self, args: &[f64]) -> Result<f64> {
        if !self.arity.accepts(args.len()) {
            return Err(RegistryError::ArityMismatch {
                name: self.name.clone(),
                expected: self.arity,
                found: args.len(),
            });
        }
        Ok((self.implementation)(args))
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Name → function table.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, FunctionDescriptor>,
    policy: DuplicatePolicy,
}

impl FunctionRegistry {
    /// Empty registry with the default (overwrite) duplicate policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            functions: IndexMap::new(),
            policy,
        }
    }

    /// Registry preloaded with the standard math functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.load_builtins();
        registry
    }

    /// Register every builtin.
    ///
    /// Same-named entries are replaced under `Overwrite` and kept under
    /// `Reject`.
    pub fn load_builtins(&mut self) -> &mut Self {
        for builtin in BUILTINS {
            if self.policy == DuplicatePolicy::Reject && self.functions.contains_key(builtin.name) {
                debug!(function = builtin.name, "kept existing function over builtin");
                continue;
            }
            let imp = builtin.implementation;
            self.functions.insert(
                builtin.name.to_string(),
                FunctionDescriptor {
                    name: builtin.name.to_string(),
                    arity: builtin.arity,
                    implementation: Arc::new(move |args: &[f64]| imp.eval(args)),
                },
            );
        }
        debug!(count = BUILTINS.len(), "loaded builtin functions");
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DuplicatePolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Register a function.
    ///
    /// Returns the replaced descriptor under `Overwrite`; fails with
    /// `DuplicateFunction` under `Reject`.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        arity: Arity,
        f: F,
    ) -> Result<Option<FunctionDescriptor>>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let name = name.into();
        if self.policy == DuplicatePolicy::Reject && self.functions.contains_key(&name) {
            return Err(RegistryError::DuplicateFunction(name));
        }
        debug!(function = %name, %arity, "registered function");
        let descriptor = FunctionDescriptor {
            name: name.clone(),
            arity,
            implementation: Arc::new(f),
        };
        Ok(self.functions.insert(name, descriptor))
    }

    /// Register a one-argument function.
    pub fn register_unary(
        &mut self,
        name: impl Into<String>,
        f: fn(f64) -> f64,
    ) -> Result<Option<FunctionDescriptor>> {
        self.register(name, Arity::Fixed(1), move |args| f(args[0]))
    }

    pub fn lookup(&self, name: &str) -> Result<&FunctionDescriptor> {
        self.functions
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFunction(name.to_string()))
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Look up, check arity and evaluate.
    pub fn call(&self, name: &str, args: &[f64]) -> Result<f64> {
        self.lookup(name)?.eval(args)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish()
    }
}
