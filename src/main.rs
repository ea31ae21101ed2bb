// fastcmd - describe what you want to do, get the command you saved for it
//
// Entry point. One-shot subcommands from argv, or a REPL when run bare.

use anyhow::Context;
use chrono::Local;
use fastcmd_lib::{
    config::{default_export_path, ConfigStore},
    core::{ConfirmationSource, SystemShell},
    db::{AddRequest, ExportRequest, ImportRequest, SearchRequest},
    embeddings::OpenAiEmbeddings,
    Database, FastCmd, Report, Settings,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

const PROMPT: &str = "fastcmd> ";
const SET_API_KEY: &str = "--set-api-key";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return run_repl().await;
    }

    dispatch(&args).await
}

async fn run_repl() -> anyhow::Result<()> {
    print_usage();

    let stdin = io::stdin();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // Ctrl-D
            println!();
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let Some(words) = shlex::split(line) else {
            say("Could not parse that line. Check your quotes.");
            continue;
        };

        // A bad command shouldn't end the session
        if let Err(e) = dispatch(&words).await {
            say(&format!("Error: {:#}", e));
        }
    }

    Ok(())
}

async fn dispatch(args: &[String]) -> anyhow::Result<()> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(());
    };

    // Any subcommand accepts `--set-api-key <key>` to replace the saved key
    let (new_key, rest) = take_flag(rest, SET_API_KEY);
    let rest = rest.as_slice();
    if let Some(key) = new_key {
        ConfigStore::from_home()?.save_api_key(&key)?;
        say("🔑 OpenAI key saved.");
    }

    match command.as_str() {
        "add" => handle_add(rest).await,
        "search" => handle_search(rest).await,
        "export" => handle_export(rest).await,
        "import" => handle_import(rest).await,
        "key" => handle_key(rest),
        "status" => handle_status().await,
        "version" | "-v" | "--version" => {
            println!("fastcmd v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        _ => {
            say(&format!("Unknown command: {}", command));
            print_usage();
            Ok(())
        }
    }
}

async fn handle_add(args: &[String]) -> anyhow::Result<()> {
    let (Some(description), Some(command)) = (
        flag(args, &["-d", "--description"]),
        flag(args, &["-c", "--commandrun", "--command"]),
    ) else {
        say("Usage: add -d <description> -c <command>");
        return Ok(());
    };

    let app = build_app(true).await?;
    show(&app.add(AddRequest::new(description, command)).await);
    Ok(())
}

async fn handle_search(args: &[String]) -> anyhow::Result<()> {
    let Some(query) = search_query(args) else {
        say("Usage: search -d <description>");
        return Ok(());
    };

    let app = build_app(true).await?;
    show(&app.search(SearchRequest::new(query)).await);
    Ok(())
}

async fn handle_export(args: &[String]) -> anyhow::Result<()> {
    let request = ExportRequest {
        destination: flag(args, &["-o", "--output"]).map(PathBuf::from),
    };

    let app = build_app(false).await?;
    show(&app.export(request).await);
    Ok(())
}

async fn handle_import(args: &[String]) -> anyhow::Result<()> {
    let Some(source) = flag(args, &["-i", "--input"]) else {
        say("Usage: import -i <path>");
        return Ok(());
    };

    let app = build_app(true).await?;
    show(&app.import(ImportRequest { source: PathBuf::from(source) }).await);
    Ok(())
}

fn handle_key(args: &[String]) -> anyhow::Result<()> {
    let store = ConfigStore::from_home()?;

    if let Some(key) = flag(args, &["-s", "--set", "-a", "--add"]) {
        store.save_api_key(&key)?;
        say("🔑 OpenAI key saved.");
    } else if args.iter().any(|a| a == "--clear") {
        if store.clear_api_key()? {
            say("API key cleared.");
        } else {
            say("No API key set.");
        }
    } else {
        match store.load_api_key()? {
            Some(key) => say(&format!("🔑 OpenAI key: {}", mask(&key))),
            None => say("⚠️ OpenAI key not set. Use 'key --set <key>' or OPENAI_API_KEY."),
        }
    }

    Ok(())
}

async fn handle_status() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let db = open_database(&settings).await?;
    let stats = db.stats().await?;

    println!("\nfastcmd Status");
    println!("{}", "=".repeat(60));
    println!("  Store:      {}", db.path().display());
    println!("  Commands:   {}", stats.total_commands);
    println!("  Vectors:    {}", stats.total_vectors);
    println!("  Dimension:  {}", stats.dimension);
    println!("  Model:      {}", settings.model);
    println!("  Search:     {:?}", settings.search_mode);
    println!(
        "  API key:    {}",
        if settings.api_key.is_empty() { "not set" } else { "set" }
    );
    if !stats.is_consistent() {
        println!("\n  ⚠️ Registry and vector table disagree. The store may be damaged.");
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn open_database(settings: &Settings) -> anyhow::Result<Database> {
    Database::new(&settings.db_path, settings.dimension)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("opening {}", settings.db_path.display()))
}

/// `needs_key` asks for a key on the terminal when none is configured
async fn build_app(needs_key: bool) -> anyhow::Result<FastCmd> {
    let mut settings = Settings::load()?;
    if needs_key && settings.api_key.is_empty() {
        settings.api_key = prompt_for_api_key()?;
    }

    let db = Arc::new(open_database(&settings).await?);

    let embedder = OpenAiEmbeddings::new(
        settings.api_key.clone(),
        settings.model.clone(),
        settings.dimension,
        settings.api_base.clone(),
    );

    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

    Ok(FastCmd::new(
        db,
        Arc::new(embedder),
        Arc::new(SystemShell),
        Arc::new(StdinConfirmation),
        settings.search_mode,
        move || default_export_path(&home, Local::now()),
    ))
}

/// First run: ask for the key once and save it
fn prompt_for_api_key() -> anyhow::Result<String> {
    say("Please enter your OPENAI_API_KEY:");
    let answer = StdinConfirmation
        .prompt(&format!("{}OPENAI_API_KEY: ", PROMPT))
        .unwrap_or_default();
    let key = answer.trim();

    ConfigStore::from_home()?
        .save_api_key(key)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    say("OPENAI_API_KEY has been set to the config");

    Ok(key.to_string())
}

/// Reads answers from the terminal
struct StdinConfirmation;

impl ConfirmationSource for StdinConfirmation {
    fn prompt(&self, message: &str) -> Option<String> {
        print!("{}", message);
        io::stdout().flush().ok()?;

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer),
        }
    }
}

/// Value following the first matching flag
fn flag(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Remove `name <value>` from `args`, returning the value
///
/// A trailing `name` with no value is dropped as well.
fn take_flag(args: &[String], name: &str) -> (Option<String>, Vec<String>) {
    let mut value = None;
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == name {
            value = iter.next().cloned();
        } else {
            kept.push(arg.clone());
        }
    }
    (value, kept)
}

/// `-d <text>`, or bare words when no flags are given at all
///
/// `search list my files` works; `search -x foo` is a usage error rather than
/// a search for "-x foo".
fn search_query(args: &[String]) -> Option<String> {
    let query = match flag(args, &["-d", "--description"]) {
        Some(query) => query,
        None if args.iter().any(|a| a.starts_with('-')) => return None,
        None => args.join(" "),
    };
    Some(query).filter(|q| !q.trim().is_empty())
}

fn mask(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", tail)
}

fn say(message: &str) {
    println!("{}{}", PROMPT, message);
}

fn show(report: &Report) {
    say(&report.message);
    for line in &report.details {
        println!("         {}", line);
    }
}

fn print_usage() {
    println!(
        r#"fastcmd v{} - Your commands, found by what they do

USAGE:
    fastcmd <COMMAND> [OPTIONS]     run one command
    fastcmd                         start the interactive prompt

COMMANDS:
    add -d <description> -c <command>    Save a command under a description
    search -d <description>              Find the closest saved command and offer to run it
    export [-o <path>]                   Write all commands to a JSON file
                                         (default: Desktop, timestamped)
    import -i <path>                     Add commands from a JSON export
    key [--set <key> | --clear]          Show, save or remove the OpenAI API key

    Every command also takes --set-api-key <key> to replace the saved key.
    status                               Show store location and counts
    version                              Show version
    help                                 Show this help
    exit / quit                          Leave the interactive prompt

EXAMPLES:
    fastcmd add -d "List files in color format" -c "ls --color=auto"
    fastcmd search -d "show files with colors"
    fastcmd export -o ~/fastcmd.json

ENVIRONMENT:
    OPENAI_API_KEY            API key (saved to ~/.fastcmd/config.json on first use)
    FASTCMD_DB_DIR            Directory holding commands.db (default: ~/.fastcmd)
    FASTCMD_SEARCH_MODE       'single' (best match) or 'pick' (choose from top 3)
    RUST_LOG                  Log level, e.g. debug
"#,
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_search_query_forms() {
        assert_eq!(
            search_query(&args(&["-d", "show files with colors"])),
            Some("show files with colors".to_string())
        );
        assert_eq!(
            search_query(&args(&["list", "my", "files"])),
            Some("list my files".to_string())
        );
    }

    #[test]
    fn test_search_query_rejects_unknown_flag() {
        assert_eq!(search_query(&args(&["-x", "foo"])), None);
        assert_eq!(search_query(&args(&["-d"])), None);
        assert_eq!(search_query(&args(&[])), None);
    }

    #[test]
    fn test_take_set_api_key() {
        let (key, rest) = take_flag(&args(&["-d", "list files", "--set-api-key", "sk-new"]), SET_API_KEY);
        assert_eq!(key, Some("sk-new".to_string()));
        assert_eq!(rest, args(&["-d", "list files"]));

        let (key, rest) = take_flag(&args(&["-i", "backup.json"]), SET_API_KEY);
        assert_eq!(key, None);
        assert_eq!(rest, args(&["-i", "backup.json"]));
    }
}
