pub mod error;
pub mod executor;
pub mod memory;
pub mod naming;
pub mod registry;
pub mod traits;

pub use error::DriverError;
pub use executor::{
    apply, bootstrap, execute, migrate, plan, planned_operations, ApplyReport, MigrateError,
    MigrateMode, MigrationOutcome, MigrationPlan, Operation,
};
pub use memory::{DriverCall, MemoryDriver, MEMORY};
pub use registry::{ConnectFn, ConnectOptions, EngineEntry, EngineRegistry};
pub use traits::SchemaDriver;
