//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod editor_session;
pub mod export_service;
pub mod note_service;
pub mod note_session;
pub mod todo_service;
