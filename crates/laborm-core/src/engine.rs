//! Engine option schemas, consulted by the validator.

use crate::types::TokenKind;

/// One option an engine accepts in its `@engine` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    /// The token kind the option value must have.
    pub kind: TokenKind,
    pub required: bool,
}

impl OptionSpec {
    pub const fn required(name: &'static str, kind: TokenKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: TokenKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Static description of a storage engine: its name and option schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineDescriptor {
    pub name: &'static str,
    pub options: &'static [OptionSpec],
}

impl EngineDescriptor {
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// Anything that can resolve an engine name to its descriptor.
pub trait EngineCatalog {
    fn descriptor(&self, name: &str) -> Option<&EngineDescriptor>;
}

impl EngineCatalog for [EngineDescriptor] {
    fn descriptor(&self, name: &str) -> Option<&EngineDescriptor> {
        self.iter().find(|d| d.name == name)
    }
}
