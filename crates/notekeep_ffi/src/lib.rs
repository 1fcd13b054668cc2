//! Flutter bridge crate for NoteKeep.

pub mod api;
