//! Agentic Control: line-delimited JSON command server for a scene owner
//!
//! Accepts controller connections over TCP and executes each command on a
//! single owner thread that holds the scene. Responses are one JSON line per
//! request.
//!
//! Usage:
//!   agentic-control                                   # Serve on 127.0.0.1:9000
//!   agentic-control --port 9100 --serve-mode sequential
//!   agentic-control send get_scene_info               # One-shot client call
//!   agentic-control send spawn_actor --params '{"kind":"PointLight"}'

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use actl_owner::{DispatchConfig, Dispatcher, OwnerQueue};
use actl_scene::{DynScene, Scene};
use actl_server::{CommandRouter, HandlerTable};
use actl_transport::{LineClient, ServeMode, TransportConfig, TransportServer};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_PATH: &str = ".agentic-control/logs/agentic-control.log";

#[derive(Parser, Debug)]
#[command(name = "agentic-control", about = "Agentic Control: scene command server")]
struct Cli {
    /// Port to listen on or connect to (0 for OS-assigned when serving)
    #[arg(long, global = true, env = "AGENTIC_CONTROL_PORT", default_value = "9000")]
    port: u16,

    /// Hostname to bind to or connect to
    #[arg(long, global = true, env = "AGENTIC_CONTROL_HOST", default_value = "127.0.0.1")]
    hostname: String,

    /// How connections are scheduled: concurrent or sequential
    #[arg(long, default_value = "concurrent")]
    serve_mode: ServeMode,

    /// Maximum concurrent connections (concurrent mode)
    #[arg(long, default_value = "32")]
    max_connections: usize,

    /// Close connections that send a frame longer than this many bytes
    #[arg(long)]
    max_frame_bytes: Option<usize>,

    /// How long a command waits for the owner, in milliseconds (0 waits forever)
    #[arg(long, default_value = "30000")]
    dispatch_timeout_ms: u64,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Also stop when stdin reaches EOF (for a parent process that holds the pipe)
    #[arg(long)]
    exit_on_stdin_eof: bool,

    /// Write logs to a file (defaults to ~/.agentic-control/logs/agentic-control.log if no path given)
    #[arg(long, default_missing_value = "DEFAULT", num_args = 0..=1)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one command to a running server and print the response line
    Send {
        /// Command name, e.g. get_scene_info
        name: String,

        /// Params as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Some(Command::Send { ref name, ref params }) => {
            send(&cli, name, params.as_deref()).await;
        }
        None => serve(&cli).await,
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let Some(log_file_arg) = cli.log_file.as_deref() else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        if cli.log_json {
            builder.json().init();
        } else {
            builder.init();
        }
        return;
    };

    let log_path = if log_file_arg == "DEFAULT" {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(DEFAULT_LOG_PATH)
    } else {
        PathBuf::from(log_file_arg)
    };
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", log_path.display());
            std::process::exit(1);
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
    eprintln!("Logging to {}", log_path.display());
}

fn spawn_owner(queue: OwnerQueue<DynScene>) -> std::io::Result<thread::JoinHandle<u64>> {
    thread::Builder::new().name("owner".into()).spawn(move || {
        let mut scene: DynScene = Box::new(Scene::new());
        queue.run(&mut scene)
    })
}

async fn serve(cli: &Cli) {
    let timeout = (cli.dispatch_timeout_ms > 0).then(|| Duration::from_millis(cli.dispatch_timeout_ms));
    let (dispatcher, queue) = actl_owner::channel::<DynScene>(DispatchConfig { timeout });

    let owner = match spawn_owner(queue) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start owner thread: {e}");
            std::process::exit(1);
        }
    };

    let router = Arc::new(CommandRouter::new(HandlerTable::standard(), dispatcher.clone()));

    let config = TransportConfig {
        port: cli.port,
        hostname: cli.hostname.clone(),
        serve_mode: cli.serve_mode,
        max_connections: Some(cli.max_connections),
        max_frame_len: cli.max_frame_bytes,
    };
    let mut transport = match TransportServer::start(config, router.clone()).await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to start transport: {e}");
            dispatcher.close();
            std::process::exit(1);
        }
    };

    println!("  Agentic control listening on {}", transport.local_addr());
    println!("  Press Ctrl+C to stop.");

    wait_for_shutdown_signal(cli.exit_on_stdin_eof).await;

    info!("Shutting down...");
    router.begin_shutdown();
    transport.stop().await;
    shutdown_owner(&dispatcher, owner).await;
    println!("  Server stopped.");
}

/// Resolve on Ctrl+C, or on stdin EOF (parent process gone) when asked to.
async fn wait_for_shutdown_signal(watch_stdin: bool) {
    let shutdown_notify = Arc::new(tokio::sync::Notify::new());
    if watch_stdin {
        let notify = shutdown_notify.clone();
        thread::spawn(move || {
            use std::io::Read;
            let mut buf = [0u8; 1];
            loop {
                match std::io::stdin().read(&mut buf) {
                    Ok(0) | Err(_) => {
                        notify.notify_one();
                        return;
                    }
                    Ok(_) => continue,
                }
            }
        });
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = shutdown_notify.notified() => {
            info!("stdin closed (parent process gone), shutting down");
        }
    }
}

async fn shutdown_owner(dispatcher: &Dispatcher<DynScene>, owner: thread::JoinHandle<u64>) {
    dispatcher.close();
    match tokio::task::spawn_blocking(move || owner.join()).await {
        Ok(Ok(executed)) => info!("Owner stopped after {executed} commands"),
        Ok(Err(_)) => error!("Owner thread panicked"),
        Err(e) => error!("Failed to join owner thread: {e}"),
    }
}

async fn send(cli: &Cli, name: &str, params: Option<&str>) {
    let params = match params.map(serde_json::from_str::<Value>).transpose() {
        Ok(None) => None,
        Ok(Some(Value::Object(map))) => Some(map),
        Ok(Some(_)) | Err(_) => {
            error!("--params must be a JSON object");
            std::process::exit(1);
        }
    };

    let mut client = match LineClient::connect((cli.hostname.as_str(), cli.port)).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to {}:{}: {e}", cli.hostname, cli.port);
            std::process::exit(1);
        }
    };

    match client.send(name, params).await {
        Ok(response) => {
            println!("{}", response.to_line());
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Request failed: {e}");
            std::process::exit(1);
        }
    }
}
