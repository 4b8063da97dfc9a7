//! Block class registry.
//!
//! A block class is a structural type name. Each class records which child
//! classes may appear directly inside it. With `restrict` enabled (the
//! default) every nesting must be allowed explicitly; with it disabled any
//! class may nest anywhere.

use crate::error::{RegistryError, Result};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// One registered block class and its allowed children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockClassDescriptor {
    name: String,
    allowed_children: IndexSet<String>,
}

impl BlockClassDescriptor {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed_children: IndexSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allow `child` to appear directly inside this class.
    ///
    /// Adding the same child twice is a no-op.
    pub fn allow(&mut self, child: impl Into<String>) -> &mut Self {
        let child = child.into();
        debug!(parent = %self.name, child = %child, "allowed child class");
        self.allowed_children.insert(child);
        self
    }

    pub fn allows(&self, child: &str) -> bool {
        self.allowed_children.contains(child)
    }

    /// Allowed children, in the order they were first added.
    pub fn allowed_children(&self) -> impl Iterator<Item = &str> {
        self.allowed_children.iter().map(String::as_str)
    }
}

/// Registry of block classes and their nesting rules.
#[derive(Debug, Clone)]
pub struct BlockClassRegistry {
    classes: IndexMap<String, BlockClassDescriptor>,
    restrict: bool,
}

impl Default for BlockClassRegistry {
    fn default() -> Self {
        Self {
            classes: IndexMap::new(),
            restrict: true,
        }
    }
}

impl BlockClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, or return the existing descriptor.
    pub fn register_class(&mut self, name: impl Into<String>) -> &mut BlockClassDescriptor {
        let name = name.into();
        self.classes.entry(name.clone()).or_insert_with(|| {
            debug!(class = %name, "registered block class");
            BlockClassDescriptor::new(name)
        })
    }

    /// Allow `child` inside an already registered `parent`.
    pub fn add_allowed_child(
        &mut self,
        parent: &str,
        child: impl Into<String>,
    ) -> Result<&mut BlockClassDescriptor> {
        let descriptor = self
            .classes
            .get_mut(parent)
            .ok_or_else(|| RegistryError::ClassNotRegistered(parent.to_string()))?;
        Ok(descriptor.allow(child))
    }

    /// Check whether `child` may appear directly inside `parent`.
    ///
    /// Always `Ok(true)` when restriction is off. Under restriction an
    /// unregistered parent is an error rather than a silent pass.
    pub fn is_child_allowed(&self, parent: &str, child: &str) -> Result<bool> {
        if !self.restrict {
            return Ok(true);
        }
        self.classes
            .get(parent)
            .map(|descriptor| descriptor.allows(child))
            .ok_or_else(|| RegistryError::ClassNotRegistered(parent.to_string()))
    }

    pub fn set_restrict(&mut self, restrict: bool) -> &mut Self {
        self.restrict = restrict;
        self
    }

    pub fn is_restricted(&self) -> bool {
        self.restrict
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&BlockClassDescriptor> {
        self.classes.get(name)
    }

    /// Registered classes, in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &BlockClassDescriptor> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
