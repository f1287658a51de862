pub mod assembly;
pub mod loader;
pub mod schema;
pub mod version;

pub use assembly::{assemble, Assembly, AssemblyError, SkippedSet};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    Metadata, Operation, PatchDefinition, PatchSetConfig, Query, QueryScope, Settings,
    ValidationError, ValidationIssue,
};
pub use version::{matches_requirement, parse_upstream, VersionError};
