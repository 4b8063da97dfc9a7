//! Owned, serializable view of a scope subtree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// A block with its evaluated variables and child blocks.
///
/// Two parses of the same deck produce equal snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, f64>,
    #[serde(default)]
    pub children: Vec<BlockSnapshot>,
}

impl BlockSnapshot {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// First child whose instance name (or class, when anonymous) is `label`.
    pub fn child(&self, label: &str) -> Option<&BlockSnapshot> {
        self.children
            .iter()
            .find(|c| c.name.as_deref().unwrap_or(&c.class) == label)
    }

    /// Deck text for this block's contents, without its own header.
    ///
    /// Rendering the root snapshot this way yields a deck that parses back
    /// to an equal snapshot, as long as every value is finite.
    pub fn to_deck_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_body(&mut out, 0);
        out
    }

    fn write_body(&self, out: &mut impl Write, depth: usize) -> fmt::Result {
        let pad = "    ".repeat(depth);
        for (name, value) in &self.variables {
            writeln!(out, "{pad}{name} = {value:?};")?;
        }
        for child in &self.children {
            child.write_block(out, depth)?;
        }
        Ok(())
    }

    fn write_block(&self, out: &mut impl Write, depth: usize) -> fmt::Result {
        let pad = "    ".repeat(depth);
        match &self.name {
            Some(name) => writeln!(out, "{pad}{} {name} {{", self.class)?,
            None => writeln!(out, "{pad}{} {{", self.class)?,
        }
        self.write_body(out, depth + 1)?;
        writeln!(out, "{pad}}}")
    }
}

impl fmt::Display for BlockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_block(f, 0)
    }
}
