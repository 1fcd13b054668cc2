//! CLI entry point.
//!
//! # Responsibility
//! - Verify `notekeep_core` linkage with a deterministic probe.
//! - Apply an optional settings file before doing any work.
//! - List the notes of a folder given as the positional argument.
//!
//! Usage: `notekeep [--settings PATH] [FOLDER]`

use notekeep_core::{FileNoteRepository, NoteSession, Settings, SnapshotView};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    settings: Option<PathBuf>,
    folder: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--settings" {
            let path = args.next().ok_or("`--settings` needs a path")?;
            parsed.settings = Some(PathBuf::from(path));
        } else if parsed.folder.is_none() {
            parsed.folder = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected argument `{}`", arg.to_string_lossy()));
        }
    }
    Ok(parsed)
}

fn main() -> ExitCode {
    println!("notekeep_core ping={}", notekeep_core::ping());
    println!("notekeep_core version={}", notekeep_core::core_version());

    let args = match parse_args(std::env::args_os().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: notekeep [--settings PATH] [FOLDER]");
            return ExitCode::from(2);
        }
    };

    let settings = match args.settings.as_deref().map(Settings::load) {
        Some(Ok(settings)) => settings,
        Some(Err(err)) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
        None => Settings::default(),
    };
    match settings.init_logging() {
        Ok(true) => println!("logging=on level={}", settings.log_level),
        Ok(false) => {}
        Err(err) => {
            eprintln!("failed to start logging: {err}");
            return ExitCode::FAILURE;
        }
    }
    println!("export_size={}x{}", settings.export.width, settings.export.height);

    let Some(folder) = args.folder else {
        return ExitCode::SUCCESS;
    };

    let mut session = NoteSession::new(FileNoteRepository::new(), SnapshotView::default());
    if let Err(err) = session.choose_folder(Some(folder.clone())) {
        eprintln!("failed to open `{}`: {err}", folder.display());
        return ExitCode::FAILURE;
    }

    let entries = &session.view().note_entries;
    println!("folder={} notes={}", folder.display(), entries.len());
    for entry in entries {
        println!("{entry}");
    }
    ExitCode::SUCCESS
}
