//! cmdsuite: a declarative end-to-end test harness for command-line binaries.
//!
//! Cases are data: a binary, its arguments, and the output fragments a run
//! must (or must not) produce. Values decoded from one case's output can be
//! written to a shared store and fed into the arguments or assertions of
//! later cases, which is how multi-command workflows are chained.
//!
//! Suites can be composed programmatically against the [`engine`] module, or
//! written as YAML/TOML case files and executed through the `cmdsuite`
//! binary.
//!
//! ```no_run
//! use cmdsuite::assert::{Assertions, Rules};
//! use cmdsuite::engine::{Case, CaseArgs, execute_tests_with_store};
//! use cmdsuite::store::Store;
//!
//! let store = Store::new();
//! let cases = vec![Case {
//!     name: "echo greets".to_string(),
//!     binary: "echo".to_string(),
//!     args: CaseArgs {
//!         args: vec!["hello".to_string()],
//!         ..CaseArgs::default()
//!     },
//!     assert: Assertions {
//!         must: Rules {
//!             output: vec!["hello".to_string()],
//!             ..Rules::default()
//!         },
//!         ..Assertions::default()
//!     },
//!     ..Case::default()
//! }];
//!
//! let report = execute_tests_with_store(&cases, &store);
//! assert!(report.all_passed());
//! ```

pub mod args;
pub mod assert;
pub mod engine;
pub mod env;
pub mod error;
pub mod loader;
pub mod locate;
pub mod process;
pub mod schema;
pub mod store;
