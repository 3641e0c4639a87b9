use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use tokio::sync::Mutex;
use tracing::info;

use aria::agent::{ChatAgent, ConversationStore, SessionStore};
use aria::config::Config;
use aria::search::WebSearch;
use aria::server::{self, AppState};

#[derive(Parser)]
#[command(name = "aria")]
#[command(about = "Multilingual chat assistant with web search grounding")]
struct Args {
    #[arg(help = "Message to send to the assistant")]
    prompt: Option<String>,

    #[arg(short, long, help = "Start an interactive chat session")]
    interactive: bool,

    #[arg(short, long, help = "Language code for replies (detected when omitted)")]
    language: Option<String>,

    #[arg(short, long, global = true, help = "Verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP + WebSocket server
    Serve {
        #[arg(long, help = "Bind address (defaults to config)")]
        host: Option<String>,
        #[arg(long, help = "Port (defaults to config or PORT)")]
        port: Option<u16>,
    },
    /// Run a web search and print the evidence JSON
    Search {
        query: String,
        #[arg(long, default_value = "en")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // App data dir .env first, then the working directory
    if let Ok(aria_dir) = aria::utils::paths::get_aria_data_dir() {
        let env_path = aria_dir.join(".env");
        if env_path.exists() {
            dotenv::from_path(env_path).ok();
        }
    }
    dotenv::dotenv().ok();

    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load()?;

    match args.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            return run_server(config).await;
        }
        Some(Commands::Search { query, language }) => {
            let search = WebSearch::from_config(&config.search)?;
            let evidence = search.search(&query, &language).await;
            println!("{}", serde_json::to_string_pretty(&evidence)?);
            return Ok(());
        }
        None => {}
    }

    info!("Starting Aria...");
    let agent = ChatAgent::from_config(&config)?;
    let history = Mutex::new(ConversationStore::new(config.conversation.max_history_length));

    match args.prompt {
        Some(prompt) if !args.interactive => {
            run_single_query(&agent, &history, &prompt, args.language.as_deref()).await
        }
        _ => run_interactive_mode(&agent, &history, args.language.as_deref()).await,
    }
}

async fn run_server(config: Config) -> Result<()> {
    let agent = ChatAgent::from_config(&config)?;
    let sessions = SessionStore::new(config.conversation.max_history_length)
        .with_max_sessions(config.conversation.max_sessions);
    let state = AppState::new(agent, sessions);

    server::start_server(&config.server, state).await
}

async fn run_single_query(
    agent: &ChatAgent,
    history: &Mutex<ConversationStore>,
    prompt: &str,
    language: Option<&str>,
) -> Result<()> {
    let response = agent.process_message(history, prompt, language, None).await?;

    println!("\n🤖 Aria:");
    println!("{}", response);
    print_links(&response.links);

    Ok(())
}

async fn run_interactive_mode(
    agent: &ChatAgent,
    history: &Mutex<ConversationStore>,
    language: Option<&str>,
) -> Result<()> {
    println!("\n🤖 Aria Chat ({})", agent.provider());
    println!("════════════════════════");
    println!("💡 Ask anything. Questions like 'what is...' or 'latest news about...' are searched first.");
    println!("📝 Type 'help' for commands, 'exit' to quit.");
    println!("═══════════════════════════════════════");

    loop {
        print!("\n💬 You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {
                let query = input.trim();

                match query.to_lowercase().as_str() {
                    "exit" | "quit" | "q" => {
                        println!("\n👋 Goodbye!");
                        break;
                    }
                    "help" | "h" => {
                        show_help();
                        continue;
                    }
                    "history" => {
                        show_history(history).await;
                        continue;
                    }
                    "reset" => {
                        history.lock().await.clear();
                        println!("🧹 Conversation history cleared");
                        continue;
                    }
                    "" => continue,
                    _ => {}
                }

                match agent.process_message(history, query, language, None).await {
                    Ok(response) => {
                        println!("\n🤖 Aria: {}", response);
                        print_links(&response.links);
                    }
                    Err(e) => {
                        println!("\n❌ Error: {}", e);
                        println!("💡 Check your API keys and provider configuration.");
                    }
                }
            }
            Err(e) => {
                println!("\n❌ Error reading input: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn print_links(links: &[String]) {
    if links.is_empty() {
        return;
    }
    println!("\n🔗 Links:");
    for link in links {
        println!("   • {}", link);
    }
}

async fn show_history(history: &Mutex<ConversationStore>) {
    let history = history.lock().await;
    if history.is_empty() {
        println!("📭 No conversation yet");
        return;
    }
    for turn in history.get_all() {
        println!("[{}] {}", turn.role, turn.content);
    }
}

fn show_help() {
    println!("\n📚 Aria Help - Available Commands:");
    println!("══════════════════════════════════");
    println!("   • exit, quit, q    - Exit the program");
    println!("   • help, h          - Show this help message");
    println!("   • history          - Show the conversation so far");
    println!("   • reset            - Clear the conversation history");
}
