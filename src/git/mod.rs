//! Version-control integration
//!
//! Trinity only needs one thing from git: the set of files staged for the
//! next commit, for pre-commit runs. Anything going wrong (no repository,
//! bare repository, unreadable index) is treated as "nothing staged".
//!
//! # Example
//!
//! ```no_run
//! use trinity::git::staged_files;
//! use std::path::Path;
//!
//! for file in staged_files(Path::new(".")) {
//!     println!("{:?} {}", file.change, file.path);
//! }
//! ```

mod staged;

pub use staged::{staged_files, ChangeKind, StagedFile, StagedRepo};
