//! DevTools simple view: deterministic text patching of a browser DevTools
//! front-end bundle into a variant that can be embedded in a host editor.
//!
//! # Architecture
//!
//! All rewrites compile down to a single primitive: [`Edit`], a verified
//! byte-span replacement. Above it:
//!
//! - [`transform`]: find a literal anchor or regex, render a replacement,
//!   report whether anything matched
//! - [`patch`]: named, all-or-nothing patches grouped per file into a
//!   [`PatchCatalog`], including the built-in simple-view set
//! - [`config`]: TOML patch sets that tune the built-in set and add patches
//! - [`runner`]: reads files under a DevTools root, applies the catalog and
//!   writes atomically
//!
//! A patch whose fragment is missing is reported, never raised. Only
//! inconsistent specifications (bad regex, dangling capture reference,
//! duplicate ids) are errors.
//!
//! # Example
//!
//! ```
//! use devtools_simpleview::patch::{simple_view, SimpleViewOptions, PatchStatus};
//!
//! let catalog = simple_view::catalog(&SimpleViewOptions::default()).unwrap();
//! let ui = "  _showDrawer(focus) {\n    this._drawer.show();\n  }\n";
//! let report = catalog.apply_file("ui/ui.js", ui).unwrap();
//!
//! assert!(report.text.contains("_showDrawer(focus) { return false;"));
//! assert_eq!(
//!     report.status_of("inspector-view-show-drawer"),
//!     Some(&PatchStatus::Applied)
//! );
//! ```

pub mod config;
pub mod edit;
pub mod host;
pub mod patch;
pub mod runner;
pub mod safety;
pub mod transform;

// Re-exports
pub use config::{
    assemble, load_from_path, load_from_str, matches_requirement, Assembly, AssemblyError,
    ConfigError, PatchSetConfig, VersionError,
};
pub use edit::{Edit, EditError, EditVerification};
pub use host::{reveal_in_editor, FrontendHost, Revealable, RevealerScript, SourceLocation};
pub use patch::{
    FileReport, NamedPatch, PatchCatalog, PatchOutcome, PatchReport, PatchStatus,
    SimpleViewOptions,
};
pub use runner::{FileRun, RunError, RunReport, Runner};
pub use safety::{SafetyError, TargetRoot};
pub use transform::{MatchSpec, Replacement, Scope, SpecError, Transform, Transformed};
