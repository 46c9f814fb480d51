//! One-shot subcommands. Each runs a single workflow against the store and
//! prints the result, without entering the terminal UI.

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::preview_content::format_size;
use crate::session::batch::{upload_many, BatchMutationCoordinator};
use crate::session::preview::{PreviewEditWorkflow, PreviewMode};
use crate::session::transfer::{download_to, local_file_name, read_upload, upload_key};
use crate::session::ListingSession;
use crate::store::ObjectStore;
use crate::vfs::{search, NavigationController};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List one folder level
    Ls {
        /// Folder to list (defaults to the root)
        #[arg(default_value = "")]
        path: String,

        /// Only show names containing this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the preview of an object
    Cat {
        key: String,

        /// Print the escaped <pre> markup instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Delete objects, then refresh the listing once
    Rm {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Upload local files
    Put {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Folder to upload into
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Download an object into a local directory
    Get {
        key: String,

        /// Target directory (defaults to the configured download directory)
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
}

/// Settings a subcommand runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOptions {
    pub read_only: bool,
    pub download_dir: PathBuf,
    pub max_chars: usize,
    pub tab_width: usize,
}

impl From<&AppConfig> for CommandOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            read_only: config.read_only(),
            download_dir: config.download_dir(),
            max_chars: config.max_chars(),
            tab_width: config.tab_width(),
        }
    }
}

/// Run `command` against `store`, writing its output to `out`.
pub async fn run<S: ObjectStore, W: Write>(
    store: &S,
    command: Command,
    options: &CommandOptions,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Ls { path, search } => ls(store, &path, search.as_deref(), out).await,
        Command::Cat { key, html } => cat(store, &key, html, options, out).await,
        Command::Rm { keys } => {
            ensure_writable(options.read_only)?;
            rm(store, &keys, out).await
        }
        Command::Put { files, prefix } => {
            ensure_writable(options.read_only)?;
            put(store, &files, &prefix, out).await
        }
        Command::Get { key, out: dir } => {
            let dir = dir.unwrap_or_else(|| options.download_dir.clone());
            let target = download_to(store, &key, &dir)
                .await
                .map_err(|e| AppError::Command(e.to_string()))?;
            writeln!(out, "{}", target.display())?;
            Ok(())
        }
    }
}

fn ensure_writable(read_only: bool) -> Result<()> {
    if read_only {
        return Err(AppError::InvalidArgument(
            "the bucket is read-only".to_string(),
        ));
    }
    Ok(())
}

async fn ls<S: ObjectStore, W: Write>(
    store: &S,
    path: &str,
    term: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let navigation = NavigationController::new(path);
    let mut listing = ListingSession::default();
    let nodes = listing
        .refresh(store, navigation.current_path())
        .await
        .map_err(|e| AppError::Command(e.to_string()))?;
    let shown = search::apply(nodes, term.unwrap_or_default());
    if shown.is_empty() {
        let message = if term.is_some_and(|t| !t.trim().is_empty()) {
            "No files match your search"
        } else {
            "This folder is empty"
        };
        writeln!(out, "{message}")?;
        return Ok(());
    }
    for node in shown {
        if node.is_folder {
            writeln!(out, "{}/", node.name)?;
        } else {
            writeln!(out, "{}", node.name)?;
        }
    }
    Ok(())
}

async fn cat<S: ObjectStore, W: Write>(
    store: &S,
    key: &str,
    html: bool,
    options: &CommandOptions,
    out: &mut W,
) -> Result<()> {
    let mut preview = PreviewEditWorkflow::new(options.max_chars, options.tab_width);
    match preview.load(store, key).await {
        PreviewMode::Text(text) if html => writeln!(out, "{}", text.to_markup())?,
        PreviewMode::Text(text) => {
            write!(out, "{}", text.content)?;
            if let Some(notice) = text.notice() {
                writeln!(out, "...\n\n{notice}")?;
            }
        }
        PreviewMode::Image(image) => {
            let dimensions = image
                .dimensions
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_else(|| "unknown size".to_string());
            writeln!(
                out,
                "{}: {}, {}",
                image.content_type,
                format_size(Some(image.bytes.len() as u64)),
                dimensions
            )?;
        }
        PreviewMode::Unsupported { content_type } => {
            return Err(AppError::Command(format!(
                "Preview not available for content type {content_type}"
            )));
        }
        PreviewMode::Error(err) => return Err(AppError::Command(err.to_string())),
        _ => {}
    }
    Ok(())
}

async fn rm<S: ObjectStore, W: Write>(store: &S, keys: &[String], out: &mut W) -> Result<()> {
    let mut coordinator = BatchMutationCoordinator::default();
    let mut listing = ListingSession::default();
    let result = coordinator
        .delete_and_refresh(store, keys, &mut listing, "")
        .await;
    match result {
        Ok(count) => {
            writeln!(out, "Deleted {count} object(s)")?;
            Ok(())
        }
        Err(err) => Err(AppError::Command(err.to_string())),
    }
}

async fn put<S: ObjectStore, W: Write>(
    store: &S,
    files: &[PathBuf],
    prefix: &str,
    out: &mut W,
) -> Result<()> {
    let folder = prefix.trim_matches('/');
    let mut items = Vec::with_capacity(files.len());
    for path in files {
        let name = local_file_name(path).ok_or_else(|| {
            AppError::InvalidArgument(format!("{} is not a file", path.display()))
        })?;
        let item = read_upload(path, upload_key(folder, "", &name))
            .await
            .map_err(|e| AppError::Command(e.to_string()))?;
        items.push(item);
    }
    let keys: Vec<String> = items.iter().map(|i| i.key.clone()).collect();
    let report = upload_many(store, items).await;
    if let Some(first) = report.failures.first() {
        return Err(AppError::Command(format!(
            "{} out of {} uploads failed ({first})",
            report.failures.len(),
            report.total
        )));
    }
    info!(count = keys.len(), "uploaded from the command line");
    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FlakyStore;
    use crate::store::MemoryStore;

    fn options() -> CommandOptions {
        CommandOptions {
            read_only: false,
            download_dir: PathBuf::from("."),
            max_chars: 1000,
            tab_width: 4,
        }
    }

    async fn output<S: ObjectStore>(store: &S, command: Command) -> Result<String> {
        let mut out = Vec::new();
        run(store, command, &options(), &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn options_follow_the_preview_config() {
        let mut config = AppConfig::default();
        config.preview.tab_width = Some(8);
        config.preview.max_chars = Some(20);
        config.server.read_only = Some(true);
        let opts = CommandOptions::from(&config);
        assert_eq!(opts.tab_width, 8);
        assert_eq!(opts.max_chars, 20);
        assert!(opts.read_only);
    }

    #[tokio::test]
    async fn cat_truncates_at_configured_limit() {
        let store = MemoryStore::with_objects([("long.txt", "abcdefghij")]);
        let mut out = Vec::new();
        let opts = CommandOptions {
            max_chars: 4,
            tab_width: 8,
            ..options()
        };
        run(
            &store,
            Command::Cat {
                key: "long.txt".into(),
                html: false,
            },
            &opts,
            &mut out,
        )
        .await
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("abcd..."));
    }

    #[tokio::test]
    async fn ls_lists_folders_first() {
        let store = MemoryStore::demo();
        let text = output(
            &store,
            Command::Ls {
                path: String::new(),
                search: None,
            },
        )
        .await
        .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "data/");
        assert!(lines.contains(&"README.md"));
        let at = |name: &str| lines.iter().position(|l| *l == name);
        assert!(at("scripts/") < at("config.json"));
    }

    #[tokio::test]
    async fn ls_filters_and_reports_no_matches() {
        let store = MemoryStore::demo();
        let text = output(
            &store,
            Command::Ls {
                path: "documents".into(),
                search: Some("BUD".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(text, "budget.csv\n");

        let text = output(
            &store,
            Command::Ls {
                path: "documents".into(),
                search: Some("zzz".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(text.trim(), "No files match your search");
    }

    #[tokio::test]
    async fn cat_prints_text_and_markup() {
        let store = MemoryStore::with_objects([("a.html", "<b>&</b>")]);
        let text = output(
            &store,
            Command::Cat {
                key: "a.html".into(),
                html: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(text, "<b>&</b>");

        let markup = output(
            &store,
            Command::Cat {
                key: "a.html".into(),
                html: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(markup.trim(), "<pre>&lt;b&gt;&amp;&lt;/b&gt;</pre>");
    }

    #[tokio::test]
    async fn cat_missing_key_fails() {
        let store = MemoryStore::new();
        let err = output(
            &store,
            Command::Cat {
                key: "nope.txt".into(),
                html: false,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to load nope.txt"));
    }

    #[tokio::test]
    async fn rm_reports_partial_failure() {
        let mut store = FlakyStore::new(MemoryStore::with_objects([("a", "1"), ("b", "2")]));
        store.fail_deletes.insert("b".into());
        let err = output(
            &store,
            Command::Rm {
                keys: vec!["a".into(), "b".into()],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "1 out of 2 deletions failed");
        assert_eq!(store.delete_calls(), 2);
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn rm_is_refused_when_read_only() {
        let store = MemoryStore::with_objects([("a", "1")]);
        let mut out = Vec::new();
        let err = run(
            &store,
            Command::Rm {
                keys: vec!["a".into()],
            },
            &CommandOptions {
                read_only: true,
                ..options()
            },
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(store.get("a").is_some());
    }

    #[tokio::test]
    async fn put_then_get_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("hello.txt");
        std::fs::write(&local, "hi").unwrap();
        let store = MemoryStore::new();

        let text = output(
            &store,
            Command::Put {
                files: vec![local],
                prefix: "/inbox/".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(text, "inbox/hello.txt\n");
        assert_eq!(store.get("inbox/hello.txt").unwrap(), b"hi");

        let target = dir.path().join("out");
        let text = output(
            &store,
            Command::Get {
                key: "inbox/hello.txt".into(),
                out: Some(target.clone()),
            },
        )
        .await
        .unwrap();
        assert_eq!(text.trim(), target.join("hello.txt").display().to_string());
        assert_eq!(std::fs::read(target.join("hello.txt")).unwrap(), b"hi");
    }
}
