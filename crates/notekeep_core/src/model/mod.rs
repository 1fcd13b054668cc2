//! Domain model for notes, folders and to-do entries.
//!
//! # Responsibility
//! - Define the in-memory shapes that services and the FFI layer share.
//! - Keep validation rules next to the data they constrain.
//!
//! # Invariants
//! - Every note carries a stable `NoteId` independent of its title.
//! - A note's highlight set holds at most one range per start offset.
//! - To-do entries live in memory only.

pub mod folder;
pub mod note;
pub mod todo;
