//! NetOps Agent MCP Server — entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use netops_agent::BuildCatalog;
use netops_agent_mcp::config::ServerConfig;
use netops_agent_mcp::protocol::ProtocolHandler;
use netops_agent_mcp::session::NetOpsSessionManager;
use netops_agent_mcp::tools::ToolRegistry;
use netops_agent_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "netops-agent-mcp",
    about = "MCP server for NetOps Agent — telemetry, topology, link health, build validation and remediation tools",
    version
)]
struct Cli {
    /// Sample data directory (builds/, netbox_sample.json).
    /// Also reads from NETOPS_DATA_DIR env var.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Seed for the mock data random source.
    /// Also reads from NETOPS_SEED env var.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over TCP, one session per connection.
    #[cfg(feature = "tcp")]
    ServeTcp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3200")]
        addr: String,
    },

    /// Validate a build metadata JSON file.
    Validate {
        /// Build file (relative paths resolve against <data-dir>/builds, then the cwd).
        file: String,
    },

    /// Print server capabilities and tool names as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   netops-agent-mcp completions bash > ~/.local/share/bash-completion/completions/netops-agent-mcp
    ///   netops-agent-mcp completions zsh > ~/.zfunc/_netops-agent-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    let config = ServerConfig::resolve(cli.data_dir.as_deref(), cli.seed);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let registry = Arc::new(ToolRegistry::with_defaults()?);
            tracing::info!("NetOps Agent MCP server");
            tracing::info!("Data dir: {}", config.data_dir.display());
            tracing::info!("Tools: {}", registry.names().join(", "));

            let session = NetOpsSessionManager::open(&config)?;
            let handler = ProtocolHandler::new(session, registry);
            let transport = StdioTransport::new(handler);
            if let Err(e) = transport.run().await {
                tracing::warn!("Session ended: {e}");
            }
        }

        #[cfg(feature = "tcp")]
        Commands::ServeTcp { addr } => {
            use netops_agent_mcp::transport::TcpTransport;

            let registry = Arc::new(ToolRegistry::with_defaults()?);
            tracing::info!("NetOps Agent MCP server (tcp)");
            tracing::info!("Data dir: {}", config.data_dir.display());

            let transport = TcpTransport::new(config, registry);
            transport.run(&addr).await?;
        }

        Commands::Validate { file } => {
            let catalog = BuildCatalog::new(config.builds_dir());
            match catalog.validate(&file) {
                Ok(validation) => {
                    println!("{}", serde_json::to_string_pretty(&validation)?);
                    if !validation.valid {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Invalid build file: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Info => {
            let capabilities = netops_agent_mcp::types::InitializeResult::default_result();
            let registry = ToolRegistry::with_defaults()?;
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": registry.names(),
                "tool_count": registry.len(),
                "data_dir": config.data_dir.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "netops-agent-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            netops_agent_mcp::repl::run(config).await?;
        }
    }

    Ok(())
}
