mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qm_core::{CoordinateSource, QuantumResult, VisualizationKind};
use qm_engine::{EngineConfig, ResultOrchestrator};
use rmcp::{ServiceExt, transport::stdio};

#[derive(Parser)]
#[command(name = "qm", about = "Quantum-metaphor memory recall CLI and MCP server")]
struct Cli {
    /// TOML configuration file (falls back to QM_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Reconstruct places from a memory fragment
    Analyze {
        /// Memory text, any language
        memory: String,

        /// Emotion label (nostalgic, peaceful, melancholy, warm, ...)
        #[arg(long, short)]
        emotion: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show backend and cache status
    State,

    /// Emit visualization map points as JSON
    Map {
        /// Memory text
        memory: String,

        #[arg(long, short)]
        emotion: String,

        /// probability, coherence, entanglement or quantum_3d
        #[arg(long, default_value = "probability")]
        kind: VisualizationKind,
    },
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("QM_CONFIG").ok().map(PathBuf::from));
    EngineConfig::load(path.as_deref()).context("failed to load configuration")
}

fn open_engine(cli: &Cli) -> Result<ResultOrchestrator> {
    let config = load_config(cli)?;
    ResultOrchestrator::from_config(config).context("failed to start engine")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve => cmd_serve(&cli).await,
        Commands::Analyze {
            memory,
            emotion,
            json,
        } => cmd_analyze(&cli, memory, emotion, *json).await,
        Commands::State => cmd_state(&cli).await,
        Commands::Map {
            memory,
            emotion,
            kind,
        } => cmd_map(&cli, memory, emotion, *kind).await,
    }
}

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    tracing::info!("starting MCP server");

    let service = server::QmServer::new(engine)
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}

async fn cmd_analyze(cli: &Cli, memory: &str, emotion: &str, json: bool) -> Result<()> {
    let engine = open_engine(cli)?;
    let result = engine
        .analyze(memory, emotion)
        .await
        .context("analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn coordinate_label(source: &CoordinateSource) -> String {
    match source {
        CoordinateSource::Geocoded { source, .. } => source.clone(),
        CoordinateSource::RegionalFallback { country } => format!("fallback:{country}"),
        CoordinateSource::GlobalFallback => "fallback:global".to_string(),
    }
}

fn print_result(result: &QuantumResult) {
    let primary = &result.primary_location.location;
    let c = &primary.candidate;
    println!("emotion:    {}", result.emotion);
    println!(
        "primary:    {} ({:.4}, {:.4}) p={:.3} [{}]",
        c.name,
        c.coordinates.lat,
        c.coordinates.lng,
        primary.probability,
        coordinate_label(&c.coordinate_source)
    );
    println!("country:    {}", c.geographic_context.country);
    println!("story:      {}", result.primary_location.story);
    for s in &result.secondary_locations {
        let c = &s.location.candidate;
        println!(
            "secondary:  {} ({:.4}, {:.4}) p={:.3} {}",
            c.name, c.coordinates.lat, c.coordinates.lng, s.location.probability, s.description
        );
    }
    println!(
        "state:      coherence={:.3}, entanglement={:.3}, superposition={:.3}",
        result.quantum_state.coherence,
        result.quantum_state.entanglement,
        result.quantum_state.superposition
    );
    println!("correlation: {:.3}", result.correlation);
    println!("time:       {}ms", result.analysis_time_ms);
}

async fn cmd_state(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let status = engine.status().await;

    println!("backend:    {}", status.backend);
    println!("qubits:     {}", status.qubits);
    println!(
        "dimensions: memory={}, emotion={}",
        status.memory_dimension, status.emotion_dimension
    );
    println!("circuit:    {}", if status.circuit_enabled { "on" } else { "off" });
    println!("coherence:  {}us", status.coherence_time_us);
    println!("pairs:      {}", status.entanglement_pairs);
    println!(
        "last:       {}",
        status.last_measurement.as_deref().unwrap_or("never")
    );
    println!("geocoder:   {}", status.geocoder);
    println!("narrator:   {}", status.narrator);
    Ok(())
}

async fn cmd_map(cli: &Cli, memory: &str, emotion: &str, kind: VisualizationKind) -> Result<()> {
    let engine = open_engine(cli)?;
    let request = engine
        .map_points(memory, emotion, kind)
        .await
        .context("analysis failed")?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

