use std::path::Path;

use laborm_core::engine::{EngineCatalog, EngineDescriptor};
use laborm_core::types::EngineOptions;

use crate::error::DriverError;

/// Everything a driver needs to open its store.
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions<'a> {
    /// Directory holding the database files. Relative option paths resolve against it.
    pub folder: &'a Path,
    /// The `@engine` block of the schema file.
    pub engine: &'a EngineOptions,
}

impl<'a> ConnectOptions<'a> {
    pub fn new(folder: &'a Path, engine: &'a EngineOptions) -> Self {
        Self { folder, engine }
    }

    /// Text of a string option, if present.
    pub fn option_text(&self, name: &str) -> Option<&'a str> {
        self.engine.option(name).map(|t| t.text.as_str())
    }
}

/// Opens a driver of type `D`.
pub type ConnectFn<D> = fn(&ConnectOptions<'_>) -> Result<D, DriverError>;

/// A registered engine: its option contract and how to connect to it.
pub struct EngineEntry<D: 'static> {
    pub descriptor: EngineDescriptor,
    pub connect: ConnectFn<D>,
}

/// The closed table of engines known to the binary.
///
/// Built at compile time; lookups are case-insensitive.
pub struct EngineRegistry<D: 'static> {
    entries: &'static [EngineEntry<D>],
}

impl<D: 'static> EngineRegistry<D> {
    pub const fn new(entries: &'static [EngineEntry<D>]) -> Self {
        Self { entries }
    }

    /// Looks up an engine by name.
    pub fn get(&self, name: &str) -> Result<&EngineEntry<D>, DriverError> {
        self.entries
            .iter()
            .find(|e| e.descriptor.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DriverError::UnknownEngine {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Opens the engine named by `options.engine`.
    pub fn connect(&self, options: &ConnectOptions<'_>) -> Result<D, DriverError> {
        let entry = self.get(options.engine.driver_name())?;
        tracing::debug!(engine = entry.descriptor.name, folder = %options.folder.display(), "connecting");
        (entry.connect)(options)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.descriptor.name)
    }
}

impl<D: 'static> EngineCatalog for EngineRegistry<D> {
    fn descriptor(&self, name: &str) -> Option<&EngineDescriptor> {
        self.get(name).ok().map(|e| &e.descriptor)
    }
}
