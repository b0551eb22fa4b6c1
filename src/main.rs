use anyhow::Result;
use bionet_core::{init_logging, Brain};
use bionet_data::Notification;
use bionet_lib::app::{load_config, Command, Session, ShutdownManager};
use bionet_observer::{DelegateDispatcher, HeuristicGenerator, HttpGenerator, TextGenerator};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed override for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where curricula come from when the generator is enabled
    #[arg(short, long, value_enum, default_value = "none")]
    generator: Generator,

    /// Completion endpoint for the http generator
    #[arg(long, default_value = "http://localhost:11434/api/generate")]
    endpoint: String,

    /// Model name sent to the http generator
    #[arg(long, default_value = "llama3")]
    model: String,

    /// Snapshot to restore before the first tick
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Snapshot written on exit
    #[arg(long)]
    save_on_exit: Option<PathBuf>,

    /// Print notifications as JSON lines
    #[arg(long)]
    json: bool,

    /// Exit once stdin is closed
    #[arg(long)]
    exit_on_eof: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum Generator {
    None,
    Heuristic,
    Http,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn print_notification(notification: &Notification, json: bool) {
    if json {
        match serde_json::to_string(notification) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "Could not serialize notification"),
        }
        return;
    }
    match notification {
        Notification::Utterance { text, .. } => println!("brain> {text}"),
        other => println!("  * {}", other.text()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = load_config(&args.config);
    if let Some(seed) = args.seed {
        config.engine.seed = Some(seed);
    }

    let generator: Option<Arc<dyn TextGenerator>> = match args.generator {
        Generator::None => None,
        Generator::Heuristic => Some(Arc::new(HeuristicGenerator)),
        Generator::Http => Some(Arc::new(HttpGenerator::new(&args.endpoint, &args.model))),
    };
    if generator.is_some() {
        config.teacher.use_delegate = true;
    }
    let timeout = Duration::from_millis(config.teacher.delegate_timeout_ms);
    let dispatcher = generator.map(|g| DelegateDispatcher::new(g, timeout));
    let tick_rate = Duration::from_millis(config.scheduler.tick_ms);

    let mut session = Session::new(Brain::new(config), dispatcher);
    if let Some(path) = &args.load {
        session.load(path, 0)?;
    }

    let mut shutdown = ShutdownManager::new();
    shutdown.set_save_path(args.save_on_exit.clone());
    shutdown.listen_for_ctrl_c();

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("bionet ready. Type text, or /help for commands.");
    let started = Instant::now();
    let mut ticker = tokio::time::interval(tick_rate);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input_open = true;

    while !shutdown.is_shutdown_requested() {
        tokio::select! {
            _ = ticker.tick() => {
                for notification in session.step(elapsed_ms(started)) {
                    print_notification(&notification, args.json);
                }
            }
            line = line_rx.recv(), if input_open => {
                let Some(line) = line else {
                    input_open = false;
                    if args.exit_on_eof {
                        shutdown.request_shutdown();
                    }
                    continue;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => shutdown.request_shutdown(),
                    Ok(command) => match session.execute(command, elapsed_ms(started)) {
                        Ok(lines) => lines.iter().for_each(|l| println!("{l}")),
                        Err(e) => eprintln!("error: {e:#}"),
                    },
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    shutdown.cleanup(&session, elapsed_ms(started))?;
    println!("Exited clean.");
    Ok(())
}
