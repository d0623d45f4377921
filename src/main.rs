mod cli;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use cli::{Cli, Command};
use todo::codec::{self, Format};
use todo::logging::{self, LogConfig};
use todo::{ops, output, validate, JsonStore, StoreConfig, Task};

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Append `.<format>` unless `out` already ends with it.
fn export_path(out: PathBuf, format: Format) -> PathBuf {
    let suffix = format!(".{}", format.extension());
    if out.to_string_lossy().ends_with(&suffix) {
        return out;
    }
    let mut name = OsString::from(out);
    name.push(suffix);
    PathBuf::from(name)
}

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig {
        console_level: cli.log_level,
        file: cli.log_file.clone(),
        ..LogConfig::default()
    };
    let (subscriber, log_guard) = match logging::subscriber(&log_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    let result = tracing::subscriber::with_default(subscriber, || run(cli));
    // Flush the log file before a possible exit skips destructors.
    drop(log_guard);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!(file = %cli.file.display(), "command: {:?}", cli.command);
    let store = JsonStore::with_config(
        &cli.file,
        StoreConfig {
            lock_timeout: Duration::from_millis(cli.lock_timeout_ms),
            ..StoreConfig::default()
        },
    );

    let mut tasks = store.load().context("failed to load tasks")?;
    if dispatch(&store, &mut tasks, cli.command)? {
        ensure_parent_dir(&cli.file)?;
        store.save(&tasks).context("failed to save tasks")?;
        info!(count = tasks.len(), "tasks saved");
    }
    Ok(())
}

/// Apply one command to the loaded collection. Returns whether the
/// collection changed and needs saving.
fn dispatch(store: &JsonStore, tasks: &mut Vec<Task>, command: Command) -> Result<bool> {
    match command {
        Command::Add { description } => {
            let task = ops::add_task(tasks, &description)?;
            eprintln!("Added task {}: {}", task.id, task.description);
            Ok(true)
        }

        Command::List { filter, json } => {
            let shown = ops::list_tasks(tasks, &filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else if shown.is_empty() {
                eprintln!("No tasks found");
            } else {
                print!("{}", output::format_task_list(&shown));
            }
            Ok(false)
        }

        Command::Complete { id } => {
            ops::complete_task(tasks, id)?;
            eprintln!("Marked task {id} as completed");
            Ok(true)
        }

        Command::Delete { id } => {
            let removed = ops::delete_task(tasks, id)?;
            eprintln!("Deleted task {id}: {}", removed.description);
            Ok(true)
        }

        Command::Export { format, out } => {
            let out = export_path(out, format);
            match format {
                Format::Json => JsonStore::with_config(&out, store.config()).save(tasks)?,
                Format::Csv => codec::save_csv(&out, tasks)?,
            }
            eprintln!("Exported {} tasks to {}", tasks.len(), out.display());
            Ok(false)
        }

        Command::Load { file, format } => {
            if !file.exists() {
                bail!("file does not exist: {}", file.display());
            }
            let format = match format {
                Some(f) => f,
                None => Format::from_path(&file).with_context(|| {
                    format!("unsupported file format: {}", file.display())
                })?,
            };
            let imported = match format {
                Format::Json => codec::load_json(&file)?,
                Format::Csv => codec::load_csv(&file)?,
            };
            for problem in validate::check_collection(&imported) {
                warn!(file = %file.display(), "{problem}");
            }
            eprintln!("Imported {} tasks from {}", imported.len(), file.display());
            *tasks = imported;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("tasks.json"))
    }

    fn cli_for(file: PathBuf, command: Command) -> Cli {
        Cli {
            file,
            log_level: tracing_subscriber::filter::LevelFilter::OFF,
            log_file: None,
            lock_timeout_ms: 1000,
            command,
        }
    }

    #[test]
    fn export_path_appends_missing_extension() {
        assert_eq!(
            export_path(PathBuf::from("backup"), Format::Csv),
            PathBuf::from("backup.csv")
        );
        assert_eq!(
            export_path(PathBuf::from("backup.json"), Format::Json),
            PathBuf::from("backup.json")
        );
        assert_eq!(
            export_path(PathBuf::from("backup.json"), Format::Csv),
            PathBuf::from("backup.json.csv")
        );
    }

    #[test]
    fn read_only_commands_do_not_request_save() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut tasks = Vec::new();
        let list = Command::List {
            filter: "all".to_string(),
            json: false,
        };
        assert!(!dispatch(&store, &mut tasks, list).unwrap());

        let add = Command::Add {
            description: "x".to_string(),
        };
        assert!(dispatch(&store, &mut tasks, add).unwrap());
    }

    #[test]
    fn export_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut tasks = Vec::new();
        ops::add_task(&mut tasks, "one, with comma").unwrap();
        ops::add_task(&mut tasks, "two").unwrap();
        ops::complete_task(&mut tasks, 2).unwrap();
        let expected = tasks.clone();

        for format in [Format::Json, Format::Csv] {
            let out = dir.path().join("backup");
            let export = Command::Export {
                format,
                out: out.clone(),
            };
            dispatch(&store, &mut tasks, export).unwrap();

            let mut loaded = Vec::new();
            let load = Command::Load {
                file: export_path(out, format),
                format: None,
            };
            assert!(dispatch(&store, &mut loaded, load).unwrap());
            assert_eq!(loaded, expected);
        }
    }

    #[test]
    fn load_rejects_missing_file_and_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut tasks = Vec::new();

        let missing = Command::Load {
            file: dir.path().join("missing.json"),
            format: None,
        };
        assert!(dispatch(&store, &mut tasks, missing).is_err());

        let txt = dir.path().join("tasks.txt");
        std::fs::write(&txt, "[]").unwrap();
        let unknown = Command::Load {
            file: txt.clone(),
            format: None,
        };
        assert!(dispatch(&store, &mut tasks, unknown).is_err());

        let forced = Command::Load {
            file: txt,
            format: Some(Format::Json),
        };
        assert!(dispatch(&store, &mut tasks, forced).unwrap());
    }

    #[test]
    fn only_saving_commands_create_the_task_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data");
        let file = nested.join("tasks.json");

        let list = Command::List {
            filter: "all".to_string(),
            json: false,
        };
        run(cli_for(file.clone(), list)).unwrap();
        assert!(!nested.exists());

        let add = Command::Add {
            description: "first".to_string(),
        };
        run(cli_for(file.clone(), add)).unwrap();
        assert_eq!(JsonStore::new(&file).load().unwrap().len(), 1);
    }

    #[test]
    fn ensure_parent_dir_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("tasks.json");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("tasks.json")).unwrap();
    }
}
