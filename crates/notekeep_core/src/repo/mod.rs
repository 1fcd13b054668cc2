//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented note persistence contracts.
//! - Isolate record layout and file handling from services.
//!
//! # Invariants
//! - Repository writes must enforce `Note::validate()` before touching disk.
//! - Repository APIs return semantic errors (`NotFound`) in addition to I/O
//!   errors.

pub(crate) mod file_ops;
pub mod note_repo;
pub mod record;
