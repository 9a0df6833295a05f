//! Interactive REPL for the NetOps Agent MCP server.
//!
//! Launch with `netops-agent-mcp repl` to enter interactive mode.
//! Type `/help` for available commands, Tab for completion.

use std::sync::Arc;
use tokio::sync::Mutex;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::Value;

use crate::config::ServerConfig;
use crate::router::QueryRouter;
use crate::session::NetOpsSessionManager;
use crate::tools::ToolRegistry;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/tools", "List available MCP tools"),
    ("/call", "Call a tool: /call <tool> [json-args]"),
    ("/ask", "Ask a question in plain English"),
    ("/builds", "List build files in the data directory"),
    ("/info", "Show server capabilities and configuration"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct NetOpsHelper {
    tool_names: Vec<&'static str>,
}

impl Completer for NetOpsHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // tool name completion
        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let cmd = parts[0];
        let args = if parts.len() > 1 { parts[1] } else { "" };

        if cmd == "/call" && !args.contains(' ') {
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = self
                .tool_names
                .iter()
                .filter(|name| name.starts_with(args))
                .map(|name| Pair {
                    display: name.to_string(),
                    replacement: format!("{name} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for NetOpsHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for NetOpsHelper {}
impl Validator for NetOpsHelper {}
impl Helper for NetOpsHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Session state.
struct ReplState {
    config: ServerConfig,
    registry: ToolRegistry,
    router: QueryRouter,
    session: Arc<Mutex<NetOpsSessionManager>>,
}

/// Run the interactive REPL.
///
/// Line editing blocks, so this must run on a multi-threaded runtime.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mnetops-agent-mcp v{}\x1b[0m \x1b[90m: network operations tools\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let registry = ToolRegistry::with_defaults()?;
    let session = NetOpsSessionManager::open(&config)?;
    let state = ReplState {
        config,
        registry,
        router: QueryRouter::with_defaults(),
        session: Arc::new(Mutex::new(session)),
    };

    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<NetOpsHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(rl_config)?;
    rl.set_helper(Some(NetOpsHelper {
        tool_names: state.registry.names(),
    }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".netops_agent_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mnetops>\x1b[0m ";

    loop {
        let read = tokio::task::block_in_place(|| rl.readline(prompt));
        match read {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(&state),
                    "tools" => cmd_tools(&state),
                    "builds" => cmd_builds(&state).await,
                    "call" => cmd_call(args, &state).await,
                    "ask" => cmd_ask(args, &state).await,
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&hist_path);

    state.session.lock().await.close();
    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completes commands and tool names after /call.");
    eprintln!();
}

fn cmd_info(state: &ReplState) {
    let capabilities = crate::types::InitializeResult::default_result();
    eprintln!();
    eprintln!(
        "  Server:   {} v{}",
        capabilities.server_info.name, capabilities.server_info.version
    );
    eprintln!("  Protocol: {}", capabilities.protocol_version);
    eprintln!("  Tools:    {}", state.registry.len());
    eprintln!("  Data dir: {}", state.config.data_dir.display());
    match state.config.seed {
        Some(seed) => eprintln!("  Seed:     {seed}"),
        None => eprintln!("  Seed:     (entropy)"),
    }
    eprintln!();
}

fn cmd_tools(state: &ReplState) {
    let tools = state.registry.list_tools();
    eprintln!();
    eprintln!("  {} MCP tools available:", tools.len());
    eprintln!();
    for tool in &tools {
        eprintln!(
            "    {:<28} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

async fn cmd_builds(state: &ReplState) {
    let session = state.session.lock().await;
    let builds = session.builds().list();
    eprintln!();
    if builds.is_empty() {
        eprintln!(
            "  No build files in {}",
            session.builds().builds_dir().display()
        );
    } else {
        eprintln!("  Builds in {}:", session.builds().builds_dir().display());
        for build in builds {
            eprintln!("    {build}");
        }
    }
    eprintln!();
}

async fn cmd_call(args: &str, state: &ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /call <tool> [json-args]");
        return;
    }

    let mut parts = args.splitn(2, ' ');
    let name = parts.next().unwrap_or("");
    let raw_args = parts.next().unwrap_or("").trim();

    let arguments = if raw_args.is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(raw_args) {
            Ok(v) => Some(v),
            Err(e) => {
                eprintln!("  Arguments must be a JSON object: {e}");
                return;
            }
        }
    };

    run_tool(name, arguments, state).await;
}

async fn cmd_ask(question: &str, state: &ReplState) {
    if question.is_empty() {
        eprintln!("  Usage: /ask <question>");
        return;
    }

    match state.router.route(question) {
        Some(route) => {
            eprintln!("  \x1b[90m-> {} {}\x1b[0m", route.tool, route.arguments);
            run_tool(route.tool, Some(route.arguments), state).await;
        }
        None => {
            eprintln!("  I don't know which tool answers that. Try /tools or /call.");
        }
    }
}

async fn run_tool(name: &str, arguments: Option<Value>, state: &ReplState) {
    match state.registry.call(name, arguments, &state.session).await {
        Ok(result) => {
            eprintln!();
            match result.payload() {
                Some(payload) => {
                    let pretty = serde_json::to_string_pretty(&payload)
                        .unwrap_or_else(|_| payload.to_string());
                    for line in pretty.lines() {
                        eprintln!("  {line}");
                    }
                }
                None => eprintln!("  (empty result)"),
            }
            eprintln!();
        }
        Err(e) => {
            eprintln!("  Error [{}]: {e}", e.code());
        }
    }
}
