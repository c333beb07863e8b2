// plocate-runner - search the system and media plocate databases at once
//
// This is the main entry point. Parses CLI args and dispatches to handlers.

use plocate_runner_lib::{
    core::{sort_entries, Category, DatabaseKind, ResultEntry, SearchRequest, SortColumn},
    open::{OpenTarget, Opener},
    search::{SearchController, SessionUpdate},
    update::Updater,
    Config, LocateError,
};
use std::collections::BTreeSet;
use std::env;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is for results, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let command = &args[1];

    let result = match command.as_str() {
        "search" | "s" => handle_search(&args[2..]).await,
        "update" => handle_update(&args[2..]).await,
        "open" => handle_open(&args[2..]),
        "config" => handle_config(),
        "version" | "-v" | "--version" => {
            println!("plocate-runner v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("✗ {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

struct SearchArgs {
    request: SearchRequest,
    sort: Option<SortColumn>,
    descending: bool,
}

/// Value following a flag, which must be present
fn flag_value<'a>(
    args: &'a [String],
    i: usize,
    flag: &str,
) -> Result<&'a String, LocateError> {
    args.get(i)
        .ok_or_else(|| LocateError::Generic(format!("{} needs a value", flag)))
}

fn parse_search_args(args: &[String], config: &Config) -> Result<SearchArgs, LocateError> {
    let mut pattern_parts = Vec::new();
    let mut case_sensitive = true;
    let mut use_regex = false;
    let mut filter = None;
    let mut category = None;
    let mut targets = BTreeSet::new();
    let mut sort = None;
    let mut descending = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-i" | "--ignore-case" => case_sensitive = false,
            "-r" | "--regex" => use_regex = true,
            "--system" => {
                targets.insert(DatabaseKind::System);
            }
            "--media" => {
                targets.insert(DatabaseKind::Media);
            }
            "--filter" => {
                i += 1;
                filter = Some(flag_value(args, i, "--filter")?.clone());
            }
            "--category" => {
                i += 1;
                category = Some(flag_value(args, i, "--category")?.parse::<Category>()?);
            }
            "--sort" => {
                i += 1;
                sort = Some(flag_value(args, i, "--sort")?.parse::<SortColumn>()?);
            }
            "--desc" => descending = true,
            "--" => {
                pattern_parts.extend(args[i + 1..].iter().cloned());
                break;
            }
            arg => pattern_parts.push(arg.to_string()),
        }
        i += 1;
    }

    if targets.is_empty() {
        targets = config.default_targets();
    }

    let request = SearchRequest::new(pattern_parts.join(" "))
        .case_sensitive(case_sensitive)
        .regex(use_regex)
        .category(category)
        .filter(filter)
        .targets(targets);

    Ok(SearchArgs {
        request,
        sort,
        descending,
    })
}

async fn handle_search(args: &[String]) -> Result<(), LocateError> {
    let config = Config::load()?;
    let SearchArgs {
        request,
        sort,
        descending,
    } = parse_search_args(args, &config)?;

    let mut controller = SearchController::new(&config);
    let session = controller.submit(request).await?;
    debug!(
        pattern = %session.request().pattern,
        targets = ?session.request().targets,
        "searching"
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut interrupted = false;
    let mut shown = 0usize;
    loop {
        tokio::select! {
            update = session.next_update() => match update {
                Some(SessionUpdate::Entry(entry)) => {
                    // Sorted output has to wait for everything
                    if sort.is_none() {
                        print_entry(&entry);
                    }
                    shown += 1;
                }
                Some(SessionUpdate::SourceFailed(failure)) => {
                    eprintln!("✗ {}", failure.error.user_message());
                }
                Some(SessionUpdate::SourceFinished { database, lines }) => {
                    debug!(%database, lines, "source finished");
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                interrupted = true;
                break;
            }
        }
    }

    if interrupted {
        session.cancel().await;
        eprintln!("Search cancelled ({} result(s) shown).", shown);
    }

    if let Some(column) = sort {
        let mut entries = session.results().to_vec();
        sort_entries(&mut entries, column, descending);
        for entry in &entries {
            print_entry(entry);
        }
    }

    let failed = session.errors().len();
    controller.finish().await;

    if shown == 0 && !interrupted && failed == 0 {
        println!("No results found");
    }

    Ok(())
}

fn print_entry(entry: &ResultEntry) {
    println!("{}\t{}\t{}", entry.name(), entry.parent(), entry.source);
}

async fn handle_update(args: &[String]) -> Result<(), LocateError> {
    let config = Config::load()?;

    let mut include_media = true;
    let mut excludes = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--no-media" => include_media = false,
            "--exclude" | "-e" => {
                i += 1;
                excludes.push(flag_value(args, i, "--exclude")?.clone());
            }
            other => {
                return Err(LocateError::Generic(format!(
                    "Unknown update option: {}",
                    other
                )))
            }
        }
        i += 1;
    }

    let updater = Updater::new(&config).exclude(excludes);

    if include_media {
        println!(
            "Updating system and media databases (indexing {})...",
            config.media_scan_path.display()
        );
    } else {
        println!("Updating system database...");
    }

    let report = updater.update(include_media).await?;
    for database in report.updated {
        println!("✓ {} database updated successfully.", capitalize(database.name()));
    }

    Ok(())
}

fn handle_open(args: &[String]) -> Result<(), LocateError> {
    let config = Config::load()?;

    let mut target = OpenTarget::File;
    let mut path = None;
    for arg in args {
        match arg.as_str() {
            "--folder" => target = OpenTarget::Folder,
            other if path.is_none() => path = Some(other),
            other => {
                return Err(LocateError::Generic(format!(
                    "Unexpected argument: {}",
                    other
                )))
            }
        }
    }

    let path = path.ok_or_else(|| LocateError::Generic("open needs a path".to_string()))?;
    let opened = Opener::new(&config).open(path, target)?;
    println!("Opened {}", opened.display());

    Ok(())
}

fn handle_config() -> Result<(), LocateError> {
    let config = Config::load()?;

    match Config::config_path() {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found, using defaults)", path.display()),
        None => println!("# no config directory, using defaults"),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_usage() {
    println!(
        r#"plocate-runner v{} - search your plocate databases

USAGE:
    plocate-runner <COMMAND> [OPTIONS]

COMMANDS:
    search <pattern>       Search the system and media databases
    update                 Rebuild databases (asks for authorization)
    open <path>            Open a result with its default application
    config                 Show the effective configuration
    version                Show version
    help                   Show this help

SEARCH OPTIONS:
    -i, --ignore-case      Case insensitive search
    -r, --regex            Treat the pattern as a regular expression
    --filter <regex>       Only show paths matching this regex
    --category <name>      documents, images, audio, video, archives, code, folders
    --system / --media     Pick databases (default: system, plus media if present)
    --sort <name|path>     Sort results once the search completes
    --desc                 Sort descending

OPEN OPTIONS:
    --folder               Open the folder containing the result instead

UPDATE OPTIONS:
    --no-media             Only rebuild the system database
    -e, --exclude <paths>  Skip paths in the system database (repeatable)

EXAMPLES:
    plocate-runner search -i report
    plocate-runner search --category images --filter Pictures cat
    plocate-runner open --folder /home/al/Documents/report.pdf
    plocate-runner update --exclude "/mnt/backup /tmp"

Set RUST_LOG=debug to see the commands being run.
"#,
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_search_args() {
        let parsed = parse_search_args(
            &args(&["-i", "--system", "--category", "images", "--sort", "name", "cat", "pics"]),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(parsed.request.pattern, "cat pics");
        assert!(!parsed.request.case_sensitive);
        assert_eq!(parsed.request.category, Some(Category::Images));
        assert_eq!(parsed.sort, Some(SortColumn::Name));
        assert!(!parsed.descending);
    }

    #[test]
    fn test_flag_without_value_is_an_error() {
        for flag in ["--filter", "--category", "--sort"] {
            match parse_search_args(&args(&["report", flag]), &Config::default()) {
                Err(LocateError::Generic(msg)) => {
                    assert_eq!(msg, format!("{} needs a value", flag))
                }
                Err(other) => panic!("Expected Generic error for {}, got {:?}", flag, other),
                Ok(_) => panic!("Expected error for {}", flag),
            }
        }
    }
}
