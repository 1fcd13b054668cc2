//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide note session and to-do list.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every failure is returned as an envelope with `ok = false` and a message.
//! - Lists are returned as full snapshots after every mutation.

use log::warn;
use notekeep_core::{
    core_version as core_version_inner, default_export_file_name,
    init_logging as init_logging_inner, ping as ping_inner, sanitize_due_date_input,
    FileNoteRepository, Highlight, HighlightColor, NoteDraft, NoteSession, Settings,
    SnapshotView, TodoId, TodoItem, TodoService,
};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

type SharedNoteSession = NoteSession<FileNoteRepository, SnapshotView>;

static NOTE_SESSION: OnceLock<Mutex<SharedNoteSession>> = OnceLock::new();
static TODO_SERVICE: OnceLock<Mutex<TodoService<SnapshotView>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Settings applied from a host-provided JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResponse {
    pub ok: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// Whether file logging is running after the call.
    pub logging_active: bool,
    /// Default export image size in pixels.
    pub export_width: u32,
    pub export_height: u32,
    pub message: String,
}

impl SettingsResponse {
    fn from_settings(settings: &Settings, logging_active: bool, message: String) -> Self {
        Self {
            ok: true,
            log_level: settings.log_level.clone(),
            log_dir: settings.log_dir.clone(),
            logging_active,
            export_width: settings.export.width,
            export_height: settings.export.height,
            message,
        }
    }
}

/// Loads the settings file at `path` and starts logging when it names a log directory.
///
/// A missing file applies defaults. On failure `ok = false` and the default
/// export size is still returned so the host can keep going.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_apply(path: String) -> SettingsResponse {
    let settings = match Settings::load(Path::new(path.trim())) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("event=ffi_settings_apply module=ffi status=error error_code=load_failed");
            return SettingsResponse {
                ok: false,
                ..SettingsResponse::from_settings(
                    &Settings::default(),
                    false,
                    format!("settings_apply failed: {err}"),
                )
            };
        }
    };
    match settings.init_logging() {
        Ok(active) => {
            SettingsResponse::from_settings(&settings, active, "settings applied".to_string())
        }
        Err(err) => {
            warn!("event=ffi_settings_apply module=ffi status=error error_code=logging_failed");
            SettingsResponse {
                ok: false,
                ..SettingsResponse::from_settings(
                    &settings,
                    false,
                    format!("settings_apply failed: {err}"),
                )
            }
        }
    }
}

/// Note list snapshot of the current folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    pub ok: bool,
    /// Current folder path, if any.
    pub folder: Option<String>,
    /// `"<title> - <yyyy-MM-dd HH:mm:ss>"` rows in folder order.
    pub entries: Vec<String>,
    pub message: String,
}

/// Generic action response envelope for note editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Id of the note the action applied to.
    pub note_id: Option<String>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Uuid) -> Self {
        Self {
            ok: true,
            note_id: Some(note_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        warn!("event=ffi_note_action module=ffi status=error");
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// One highlight range in char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightItem {
    pub start: u32,
    pub length: u32,
    /// `yellow|pink|cyan`.
    pub color: String,
}

/// Loaded note payload for the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetailResponse {
    pub ok: bool,
    pub note_id: Option<String>,
    pub title: String,
    pub content: String,
    pub highlights: Vec<HighlightItem>,
    pub message: String,
}

/// One to-do row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEntry {
    pub id: String,
    pub description: String,
    pub due_date: String,
    /// Whether `due_date` parses as `MM/dd/YYYY`.
    pub due_date_valid: bool,
    pub done: bool,
}

/// Sorted to-do snapshot after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    /// Id touched by the action, when there is one.
    pub todo_id: Option<String>,
    pub items: Vec<TodoEntry>,
    pub message: String,
}

/// Opens the folder returned by the directory chooser.
///
/// `None` means the chooser was cancelled; the current state is returned.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_choose(path: Option<String>) -> NoteListResponse {
    let choice = path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);
    let mut session = note_session();
    match session.choose_folder(choice) {
        Ok(true) => note_list_response(&session, "folder opened"),
        Ok(false) => note_list_response(&session, "folder selection cancelled"),
        Err(err) => note_list_failure(&session, format!("folder_choose failed: {err}")),
    }
}

/// Switches to a folder chosen earlier in this process.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_switch(path: String) -> NoteListResponse {
    let mut session = note_session();
    let switched = session.switch_folder(Path::new(path.trim())).map(|_| ());
    match switched {
        Ok(()) => note_list_response(&session, "folder selected"),
        Err(err) => note_list_failure(&session, format!("folder_switch failed: {err}")),
    }
}

/// Drops the cached scan of a folder; the next switch to it rescans the disk.
///
/// Forgetting the current folder deselects it.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_forget(path: String) -> NoteListResponse {
    let mut session = note_session();
    if session.forget_folder(Path::new(path.trim())) {
        note_list_response(&session, "folder forgotten")
    } else {
        note_list_response(&session, "folder not known")
    }
}

/// Starts a blank draft, discarding unsaved edits and highlights.
#[flutter_rust_bridge::frb(sync)]
pub fn note_new() -> NoteActionResponse {
    let mut session = note_session();
    session.editor_mut().begin_new();
    NoteActionResponse::success("draft started", session.editor().draft().id)
}

/// Loads the note titled `title` from the current folder into the editor.
#[flutter_rust_bridge::frb(sync)]
pub fn note_open(title: String) -> NoteDetailResponse {
    let mut session = note_session();
    match session.open_note(&title) {
        Ok(draft) => note_detail(draft),
        Err(err) => NoteDetailResponse {
            ok: false,
            note_id: None,
            title: String::new(),
            content: String::new(),
            highlights: Vec::new(),
            message: format!("note_open failed: {err}"),
        },
    }
}

/// Saves the editor text as the current draft into the current folder.
///
/// On success the editor resets to a blank draft; on failure it is untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save(title: String, content: String) -> NoteActionResponse {
    let mut session = note_session();
    let editor = session.editor_mut();
    editor.set_title(title);
    editor.set_content(content);
    let note_id = session.editor().draft().id;

    match session.save_draft() {
        Ok(_) => NoteActionResponse::success("note saved", note_id),
        Err(err) => NoteActionResponse::failure(format!("note_save failed: {err}")),
    }
}

/// Highlights chars `[start, end)` of `content`, the editor's current text.
#[flutter_rust_bridge::frb(sync)]
pub fn note_add_highlight(
    content: String,
    start: u32,
    end: u32,
    color: String,
) -> NoteActionResponse {
    let Some(color) = HighlightColor::parse(&color) else {
        return NoteActionResponse::failure(format!(
            "note_add_highlight failed: unsupported color `{color}`"
        ));
    };
    let mut session = note_session();
    let editor = session.editor_mut();
    editor.set_content(content);
    match editor.add_highlight(start as usize, end as usize, color) {
        Ok(_) => NoteActionResponse::success("highlight added", editor.draft().id),
        Err(err) => NoteActionResponse::failure(format!("note_add_highlight failed: {err}")),
    }
}

/// Removes every highlight from the current draft.
#[flutter_rust_bridge::frb(sync)]
pub fn note_clear_highlights() -> NoteActionResponse {
    let mut session = note_session();
    let editor = session.editor_mut();
    editor.clear_highlights();
    NoteActionResponse::success("highlights cleared", editor.draft().id)
}

/// Adds a to-do entry; an unparseable due date sorts last.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(description: String, due_date: String) -> TodoListResponse {
    let mut todos = todo_service();
    let id = todos.add(description, due_date.trim());
    todo_list_response(&todos, Some(id), true, "todo added")
}

/// Removes a to-do entry; an unknown id leaves the list unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_remove(todo_id: String) -> TodoListResponse {
    with_todo_id(&todo_id, "todo_remove", |todos, id| {
        if todos.remove(id) {
            "todo removed"
        } else {
            "todo not found"
        }
    })
}

/// Sets the cosmetic done flag.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_done(todo_id: String, done: bool) -> TodoListResponse {
    with_todo_id(&todo_id, "todo_set_done", |todos, id| {
        if todos.set_done(id, done) {
            "todo updated"
        } else {
            "todo not found"
        }
    })
}

/// Replaces the due-date text and re-sorts.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_due_date(todo_id: String, due_date: String) -> TodoListResponse {
    with_todo_id(&todo_id, "todo_set_due_date", |todos, id| {
        if todos.set_due_date(id, due_date.trim()) {
            "todo updated"
        } else {
            "todo not found"
        }
    })
}

/// Current sorted to-do list.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list() -> TodoListResponse {
    let todos = todo_service();
    todo_list_response(&todos, None, true, "ok")
}

/// Filters typed due-date text down to digits and `/`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_sanitize_due_date(raw: String) -> String {
    sanitize_due_date_input(&raw)
}

/// Suggested image file name for exporting a note titled `title`.
#[flutter_rust_bridge::frb(sync)]
pub fn export_file_name(title: String) -> String {
    default_export_file_name(&title)
}

fn note_session() -> MutexGuard<'static, SharedNoteSession> {
    NOTE_SESSION
        .get_or_init(|| {
            Mutex::new(NoteSession::new(
                FileNoteRepository::new(),
                SnapshotView::default(),
            ))
        })
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn todo_service() -> MutexGuard<'static, TodoService<SnapshotView>> {
    TODO_SERVICE
        .get_or_init(|| Mutex::new(TodoService::new(SnapshotView::default())))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_todo_id(
    raw_id: &str,
    action: &str,
    f: impl FnOnce(&mut TodoService<SnapshotView>, TodoId) -> &'static str,
) -> TodoListResponse {
    let mut todos = todo_service();
    match Uuid::parse_str(raw_id.trim()) {
        Ok(id) => {
            let message = f(&mut todos, id);
            todo_list_response(&todos, Some(id), true, message)
        }
        Err(err) => todo_list_response(
            &todos,
            None,
            false,
            format!("{action} failed: invalid todo id: {err}"),
        ),
    }
}

fn note_list_response(session: &SharedNoteSession, message: &str) -> NoteListResponse {
    NoteListResponse {
        ok: true,
        folder: session
            .current_folder_path()
            .map(|path| path.display().to_string()),
        entries: session.view().note_entries.clone(),
        message: message.to_string(),
    }
}

fn note_list_failure(session: &SharedNoteSession, message: String) -> NoteListResponse {
    warn!("event=ffi_folder_select module=ffi status=error");
    NoteListResponse {
        ok: false,
        message,
        ..note_list_response(session, "")
    }
}

fn note_detail(draft: &NoteDraft) -> NoteDetailResponse {
    NoteDetailResponse {
        ok: true,
        note_id: Some(draft.id.to_string()),
        title: draft.title.clone(),
        content: draft.content.clone(),
        highlights: draft.highlights.iter().map(to_highlight_item).collect(),
        message: "note opened".to_string(),
    }
}

fn to_highlight_item(highlight: &Highlight) -> HighlightItem {
    HighlightItem {
        start: clamp_u32(highlight.start),
        length: clamp_u32(highlight.length),
        color: highlight.color.as_str().to_string(),
    }
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn todo_list_response(
    todos: &TodoService<SnapshotView>,
    todo_id: Option<TodoId>,
    ok: bool,
    message: impl Into<String>,
) -> TodoListResponse {
    TodoListResponse {
        ok,
        todo_id: todo_id.map(|id| id.to_string()),
        items: todos.items().iter().map(to_todo_entry).collect(),
        message: message.into(),
    }
}

fn to_todo_entry(item: &TodoItem) -> TodoEntry {
    TodoEntry {
        id: item.id.to_string(),
        description: item.description.clone(),
        due_date: item.due_date.clone(),
        due_date_valid: item.parsed_due_date().is_some(),
        done: item.done,
    }
}
