//! Standard math functions.
//!
//! Loaded by [`FunctionRegistry::with_builtins`](crate::FunctionRegistry::with_builtins).

use crate::Arity;

/// Builtin implementation, tagged by calling convention.
#[derive(Clone, Copy)]
pub enum BuiltinImpl {
    /// `fn(f64) -> f64`, called with the single argument
    Unary(fn(f64) -> f64),
    /// `fn(&[f64]) -> f64`, called with the whole argument list
    Args(fn(&[f64]) -> f64),
}

impl BuiltinImpl {
    /// Evaluate. Arity has already been checked by the caller.
    pub fn eval(&self, args: &[f64]) -> f64 {
        match self {
            BuiltinImpl::Unary(f) => f(args[0]),
            BuiltinImpl::Args(f) => f(args),
        }
    }
}

/// Static description of a builtin.
pub struct Builtin {
    /// Deck name (e.g. "sin", "atan2", "max")
    pub name: &'static str,
    /// Signature shown in documentation
    pub signature: &'static str,
    pub arity: Arity,
    pub implementation: BuiltinImpl,
}

const fn unary(name: &'static str, signature: &'static str, f: fn(f64) -> f64) -> Builtin {
    Builtin {
        name,
        signature,
        arity: Arity::Fixed(1),
        implementation: BuiltinImpl::Unary(f),
    }
}

/// Every builtin function.
pub static BUILTINS: &[Builtin] = &[
    // === Exponential / Logarithmic ===
    unary("exp", "exp(x)", f64::exp),
    unary("ln", "ln(x)", f64::ln),
    unary("log10", "log10(x)", f64::log10),
    unary("sqrt", "sqrt(x)", f64::sqrt),
    // === Rounding ===
    unary("abs", "abs(x)", f64::abs),
    unary("floor", "floor(x)", f64::floor),
    unary("ceil", "ceil(x)", f64::ceil),
    // === Trigonometry ===
    unary("sin", "sin(x)", f64::sin),
    unary("cos", "cos(x)", f64::cos),
    unary("tan", "tan(x)", f64::tan),
    unary("asin", "asin(x)", f64::asin),
    unary("acos", "acos(x)", f64::acos),
    unary("atan", "atan(x)", f64::atan),
    unary("sinh", "sinh(x)", f64::sinh),
    unary("cosh", "cosh(x)", f64::cosh),
    unary("tanh", "tanh(x)", f64::tanh),
    // === Binary / variadic ===
    Builtin {
        name: "atan2",
        signature: "atan2(y, x)",
        arity: Arity::Fixed(2),
        implementation: BuiltinImpl::Args(|a| a[0].atan2(a[1])),
    },
    Builtin {
        name: "pow",
        signature: "pow(base, exp)",
        arity: Arity::Fixed(2),
        implementation: BuiltinImpl::Args(|a| a[0].powf(a[1])),
    },
    Builtin {
        name: "min",
        signature: "min(a, b, ...)",
        arity: Arity::AtLeast(1),
        implementation: BuiltinImpl::Args(|a| a.iter().copied().fold(f64::INFINITY, f64::min)),
    },
    Builtin {
        name: "max",
        signature: "max(a, b, ...)",
        arity: Arity::AtLeast(1),
        implementation: BuiltinImpl::Args(|a| {
            a.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }),
    },
];
