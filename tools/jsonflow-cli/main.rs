use clap::Parser;
use jsonflow::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Runs a JSON dataflow graph for a number of ticks and prints what its watch nodes show
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON file (the built-in demo flow is used when omitted)
    flow_path: Option<String>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 50)]
    ticks: u32,

    /// Delay between ticks, in milliseconds
    #[arg(short, long, default_value_t = 100)]
    interval_ms: u64,

    /// Abort HTTP requests that take longer than this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the demo flow as JSON and exit
    #[arg(long)]
    print_demo: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.print_demo {
        let json = FlowDefinition::demo()
            .to_json_pretty()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize demo flow: {}", e)));
        println!("{}", json);
        return;
    }

    let total_start = Instant::now();

    // --- 1. Flow Loading ---
    let flow = match &cli.flow_path {
        Some(path) => {
            println!("Loading flow from: {}", path);
            FlowDefinition::from_file(path).unwrap_or_else(|e| exit_with_error(&e.to_string()))
        }
        None => {
            println!("No flow file provided. Using the demo flow.");
            FlowDefinition::demo()
        }
    };

    // --- 2. Registry and Graph ---
    let mut config = FetchConfig::default();
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let fetcher = HttpFetcher::new(config)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create HTTP fetcher: {}", e)));
    let registry =
        NodeRegistry::with_builtin_nodes(Arc::new(fetcher), tokio::runtime::Handle::current())
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to register nodes: {}", e)));
    let mut graph = Graph::from_flow(Arc::new(registry), &flow)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build graph: {}", e)));

    println!(
        "Graph built: {} nodes, {} links",
        graph.len(),
        graph.links().len()
    );

    // --- 3. Tick Loop ---
    let interval = Duration::from_millis(cli.interval_ms);
    let run_start = Instant::now();
    for _ in 0..cli.ticks {
        graph.tick();
        tokio::time::sleep(interval).await;
    }
    // One last pass so results that arrived during the final sleep are published.
    graph.tick();
    let run_duration = run_start.elapsed();

    // --- 4. Watch Output ---
    println!("\nRan {} ticks.", graph.tick_count());
    for (label, id) in graph.labels() {
        let Some(lines) = graph.display(id) else {
            continue;
        };
        println!("\n--- {} ---", label);
        for line in lines {
            println!("{}", line);
        }
    }

    println!("\n--- Performance Summary ---");
    println!("Tick Loop:        {:?}", run_duration);
    println!("Total Execution:  {:?}", total_start.elapsed());
    println!();
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
