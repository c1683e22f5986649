//! services/tutor/src/bin/tutor.rs
//!
//! Interactive terminal front-end for the virtual tutor. A thin stand-in for
//! the original screens: it only reads store snapshots and mutates through the
//! store operations and the chat worker.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutor_core::domain::{Creativity, PdfFile, Sender};
use tutor_lib::{
    adapters::{MockAnalyzer, MockResponder},
    chat,
    config::Config,
    error::AppError,
    state::AppState,
    store::TutorStore,
};
use uuid::Uuid;

const HELP: &str = "\
commands:
  upload <name>      upload a file and analyze it
  files              list uploaded files (most recent first)
  open <n>           select file number n
  session new [name] start a new session in the selected file
  session <n>        select session number n
  creativity <n>     set the creativity level (0-100)
  say <text>         send a message in the selected session
  history            show the selected session's messages
  stats              show usage statistics as JSON
  delete <n>         delete file number n and everything under it
  help               show this help
  quit               exit";

/// Selection and slider state of the shell, mirroring what the chat screen
/// keeps locally.
struct Shell {
    state: AppState,
    current_file: Option<Uuid>,
    current_session: Option<Uuid>,
    creativity: Creativity,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting the virtual tutor shell...");

    // --- 2. Initialize Service Adapters & Store ---
    let analyzer = Arc::new(MockAnalyzer::new(config.analysis_delay));
    let responder = Arc::new(MockResponder::new(config.reply_delay));
    let store = Arc::new(TutorStore::new(analyzer));

    // --- 3. Build the Shared AppState ---
    let state = AppState {
        store,
        responder,
        config,
    };

    // --- 4. Run the Interactive Shell ---
    let mut shell = Shell {
        state,
        current_file: None,
        current_session: None,
        creativity: Creativity::default(),
    };
    println!("Virtual tutor ready. Type 'help' for commands.");
    run_shell(&mut shell).await
}

async fn run_shell(shell: &mut Shell) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match (command, rest.trim()) {
            ("help", _) => println!("{}", HELP),
            ("quit" | "exit", _) => return Ok(()),
            ("upload", "") => println!("usage: upload <name>"),
            ("upload", name) => upload(shell, name).await,
            ("files", _) => list_files(shell),
            ("open", n) => open_file(shell, n),
            ("session", "new") => new_session(shell, None),
            ("session", rest) if rest.starts_with("new ") => {
                new_session(shell, Some(rest["new ".len()..].trim()))
            }
            ("session", n) => select_session(shell, n),
            ("creativity", n) => set_creativity(shell, n),
            ("say", "") => println!("usage: say <text>"),
            ("say", text) => say(shell, text).await,
            ("history", _) => show_history(shell),
            ("stats", _) => show_stats(shell),
            ("delete", n) => delete_file(shell, n),
            _ => println!("unknown command; type 'help'"),
        }
    }
}

async fn upload(shell: &mut Shell, name: &str) {
    println!("analyzing '{}'...", name);
    match shell.state.store.add_file(name).await {
        Ok(file) => {
            shell.current_file = Some(file.id);
            shell.current_session = file.sessions.first().map(|s| s.id);
            println!(
                "added '{}' ({} pages). assistant says:",
                file.name, file.analysis.page_count
            );
            if let Some(message) = file.sessions.first().and_then(|s| s.history.first()) {
                println!("  {}", message.text);
            }
        }
        // The file list is unchanged on failure; the user can simply retry.
        Err(e) => println!("upload failed: {}", e),
    }
}

fn list_files(shell: &Shell) {
    let snapshot = shell.state.store.snapshot();
    if snapshot.files.is_empty() {
        println!("no files uploaded yet");
        return;
    }
    for (i, file) in snapshot.files.iter().enumerate() {
        let marker = if Some(file.id) == shell.current_file {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}. {} ({} pages, {} sessions)",
            marker,
            i + 1,
            file.name,
            file.analysis.page_count,
            file.sessions.len()
        );
    }
}

fn open_file(shell: &mut Shell, index: &str) {
    let snapshot = shell.state.store.snapshot();
    match file_at(&snapshot.files, index) {
        Some(file) => {
            shell.current_file = Some(file.id);
            shell.current_session = file.sessions.first().map(|s| s.id);
            println!("opened '{}'", file.name);
        }
        None => println!("no such file; see 'files'"),
    }
}

fn new_session(shell: &mut Shell, name: Option<&str>) {
    let Some(file_id) = shell.current_file else {
        println!("open a file first");
        return;
    };
    let snapshot = shell.state.store.snapshot();
    let default_name = snapshot
        .file(file_id)
        .map(|f| format!("المحادثة {}", f.sessions.len() + 1))
        .unwrap_or_else(|| "محادثة".to_string());
    let name = name.unwrap_or(&default_name);

    match shell.state.store.add_session(file_id, name) {
        Ok(session) => {
            shell.current_session = Some(session.id);
            println!("session '{}' started", session.name);
        }
        Err(e) => println!("could not add session: {}", e),
    }
}

fn select_session(shell: &mut Shell, index: &str) {
    let Some(file_id) = shell.current_file else {
        println!("open a file first");
        return;
    };
    let snapshot = shell.state.store.snapshot();
    let session = index
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| snapshot.file(file_id).and_then(|f| f.sessions.get(i)));
    match session {
        Some(session) => {
            shell.current_session = Some(session.id);
            println!("switched to session '{}'", session.name);
        }
        None => println!("no such session"),
    }
}

fn set_creativity(shell: &mut Shell, raw: &str) {
    match raw.parse::<u8>() {
        Ok(value) if value <= Creativity::MAX => {
            shell.creativity = Creativity::new(value);
            println!("creativity set to {}%", value);
        }
        _ => println!("creativity must be a number from 0 to 100"),
    }
}

async fn say(shell: &mut Shell, text: &str) {
    let (Some(file_id), Some(session_id)) = (shell.current_file, shell.current_session) else {
        println!("open a file and session first");
        return;
    };

    match chat::send_user_message(
        &shell.state,
        file_id,
        session_id,
        text.to_string(),
        shell.creativity,
    )
    .await
    {
        Ok(chat::ReplyOutcome::Answered) => {
            let snapshot = shell.state.store.snapshot();
            let reply = snapshot
                .file(file_id)
                .and_then(|f| f.session(session_id))
                .and_then(|s| s.history.last());
            if let Some(message) = reply {
                println!("assistant: {}", message.text);
            }
        }
        Ok(chat::ReplyOutcome::SessionGone) => {
            println!("that session no longer exists");
            shell.current_file = None;
            shell.current_session = None;
        }
        Err(e) => println!("could not send message: {}", e),
    }
}

fn show_history(shell: &Shell) {
    let (Some(file_id), Some(session_id)) = (shell.current_file, shell.current_session) else {
        println!("open a file and session first");
        return;
    };
    let snapshot = shell.state.store.snapshot();
    let Some(session) = snapshot.file(file_id).and_then(|f| f.session(session_id)) else {
        println!("that session no longer exists");
        return;
    };
    println!("-- {} --", session.name);
    for message in &session.history {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Assistant => "assistant",
        };
        println!("[{}] {}", who, message.text);
    }
}

fn show_stats(shell: &Shell) {
    let stats = shell.state.store.stats();
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("could not render stats: {}", e),
    }
}

fn delete_file(shell: &mut Shell, index: &str) {
    let snapshot = shell.state.store.snapshot();
    let Some(file) = file_at(&snapshot.files, index) else {
        println!("no such file; see 'files'");
        return;
    };
    let name = file.name.clone();
    if shell.state.store.delete_file(file.id) {
        if shell.current_file == Some(file.id) {
            shell.current_file = None;
            shell.current_session = None;
        }
        println!("deleted '{}'", name);
    } else {
        println!("'{}' was already gone", name);
    }
}

fn file_at<'a>(files: &'a [Arc<PdfFile>], index: &str) -> Option<&'a Arc<PdfFile>> {
    index
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| files.get(i))
}
