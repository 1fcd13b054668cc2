use notekeep_core::repo::record::legacy_note_id;
use notekeep_core::{
    FileNoteRepository, Highlight, HighlightColor, Note, NoteRepository, NoteValidationError,
    RepoError,
};
use std::path::Path;

fn record_files(dir: &Path) -> Vec<String> {
    let mut names = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".properties"))
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[test]
fn save_then_open_roundtrips_awkward_text_and_highlights() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileNoteRepository::new();
    let mut folder = repo.open(dir.path()).unwrap();

    let content = " leading space\nkey=value: #hash !bang\ttab\r\u{1}ctrl \\ back émoji 🎉";
    let mut note = Note::new("  Plan: A=B  ", content);
    note.highlights.insert(Highlight::new(0, 8, HighlightColor::Pink));
    note.highlights.insert(Highlight::new(15, 5, HighlightColor::Cyan));
    repo.save(&mut folder, &note).unwrap();

    let reopened = repo.open(dir.path()).unwrap();
    assert_eq!(reopened.len(), 1);
    let loaded = &reopened.notes()[0];
    assert_eq!(loaded, &note);
    assert_eq!(loaded.content, content);
    assert_eq!(loaded.title, "  Plan: A=B  ");
}

#[test]
fn open_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileNoteRepository::new();
    let mut folder = repo.open(dir.path()).unwrap();
    repo.save(&mut folder, &Note::new("one", "1")).unwrap();
    repo.save(&mut folder, &Note::new("two", "2")).unwrap();

    let first = repo.open(dir.path()).unwrap();
    let second = repo.open(dir.path()).unwrap();
    assert_eq!(first.notes(), second.notes());
    assert_eq!(first.list_entries(), second.list_entries());
    assert_eq!(record_files(dir.path()).len(), 2);
}

#[test]
fn open_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let folder = FileNoteRepository::new().open(&nested).unwrap();
    assert!(nested.is_dir());
    assert!(folder.is_empty());
    assert_eq!(folder.display_name(), "b");
}

#[test]
fn invalid_note_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileNoteRepository::new();
    let mut folder = repo.open(dir.path()).unwrap();

    let err = repo.save(&mut folder, &Note::new("", "body")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(NoteValidationError::EmptyTitle)
    ));
    let err = repo.save(&mut folder, &Note::new("title", "")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(NoteValidationError::EmptyContent)
    ));
    assert!(record_files(dir.path()).is_empty());
    assert!(folder.is_empty());
}

#[test]
fn same_id_overwrites_and_same_title_does_not_clobber() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileNoteRepository::new();
    let mut folder = repo.open(dir.path()).unwrap();

    let mut first = Note::new("same", "first body");
    let first_path = repo.save(&mut folder, &first).unwrap();
    let second = Note::new("same", "second body");
    repo.save(&mut folder, &second).unwrap();
    assert_eq!(record_files(dir.path()).len(), 2);

    first.content = "first body, edited".to_string();
    let rewritten = repo.save(&mut folder, &first).unwrap();
    assert_eq!(rewritten, first_path);
    assert_eq!(record_files(dir.path()).len(), 2);
    assert_eq!(folder.len(), 2);

    let reopened = repo.open(dir.path()).unwrap();
    let edited = reopened.note_by_id(first.id()).unwrap();
    assert_eq!(edited.content, "first body, edited");
    assert_eq!(
        reopened.note_by_id(second.id()).unwrap().content,
        "second body"
    );
}

#[test]
fn broken_entries_are_skipped_and_other_records_survive() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("bad-highlights.properties"),
        "title=kept\ncontent=0123456789\nhighlight_abc=3\nhighlight_2=x\nhighlight_4=2,cyan\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("no-title.properties"), "content=orphan\n").unwrap();
    std::fs::write(dir.path().join("bad-escape.properties"), "title=\\u12\n").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "not a record").unwrap();

    let folder = FileNoteRepository::new().open(dir.path()).unwrap();
    assert_eq!(folder.len(), 1);
    let note = &folder.notes()[0];
    assert_eq!(note.title, "kept");
    let highlights = note.highlights.iter().copied().collect::<Vec<_>>();
    assert_eq!(highlights, vec![Highlight::new(4, 2, HighlightColor::Cyan)]);
}

#[test]
fn legacy_title_named_record_is_read_and_resaved_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("groceries.properties");
    std::fs::write(
        &legacy,
        "#Note Properties\n\
         #Mon Jan 01 10:00:00 PST 2024\n\
         content=milk\\neggs\n\
         title=groceries\n\
         highlight_0=4\n\
         highlight_5=4\n\
         highlight_7=10\n",
    )
    .unwrap();

    let repo = FileNoteRepository::new();
    let mut folder = repo.open(dir.path()).unwrap();
    let note = folder.note_by_title("groceries").unwrap().clone();
    assert_eq!(note.id(), legacy_note_id("groceries"));
    assert_eq!(note.content, "milk\neggs");
    let highlights = note.highlights.iter().copied().collect::<Vec<_>>();
    assert_eq!(
        highlights,
        vec![
            Highlight::new(0, 4, HighlightColor::Yellow),
            Highlight::new(5, 4, HighlightColor::Yellow),
        ]
    );

    let written = repo.save(&mut folder, &note).unwrap();
    assert_eq!(written, legacy);
    assert_eq!(record_files(dir.path()), vec!["groceries.properties"]);

    let reopened = repo.open(dir.path()).unwrap();
    assert_eq!(reopened.notes()[0].id(), note.id());
}

#[test]
fn load_reports_missing_title_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileNoteRepository::new();
    let folder = repo.open(dir.path()).unwrap();
    let err = repo.load(&folder, "nothing").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(title) if title == "nothing"));
}
