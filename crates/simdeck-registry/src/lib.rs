//! Registries consulted while a deck is parsed.
//!
//! Two registries are populated by the embedding application before parsing
//! and then borrowed immutably by the parser:
//!
//! - [`BlockClassRegistry`]: which block classes exist and which classes may
//!   nest inside which
//! - [`FunctionRegistry`]: numeric functions callable from expressions
//!
//! # Example
//!
//! ```
//! use simdeck_registry::{Arity, BlockClassRegistry, FunctionRegistry};
//!
//! let mut classes = BlockClassRegistry::new();
//! classes.register_class("mesh").allow("region").allow("boundary");
//! classes.register_class("region");
//! assert_eq!(classes.is_child_allowed("mesh", "region"), Ok(true));
//!
//! let mut functions = FunctionRegistry::with_builtins();
//! functions.register("clamp", Arity::Fixed(3), |a| a[0].clamp(a[1], a[2])).unwrap();
//! assert_eq!(functions.call("clamp", &[5.0, 0.0, 1.0]), Ok(1.0));
//! ```

mod builtins;
mod classes;
mod error;
mod functions;

pub use builtins::{Builtin, BuiltinImpl, BUILTINS};
pub use classes::{BlockClassDescriptor, BlockClassRegistry};
pub use error::{RegistryError, Result};
pub use functions::{Arity, DuplicatePolicy, FunctionDescriptor, FunctionRegistry, NumericFn};
