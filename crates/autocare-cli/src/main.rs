//! `autocare` command-line entry point.

mod config;

use anyhow::Context;
use autocare_agent::{MaintenanceAgent, MaintenanceWorkflow};
use autocare_core::{InMemoryFleet, TaskKind, TaskPriority, VehicleSource};
use autocare_orchestrator::Orchestrator;
use clap::{Parser, Subcommand};
use config::AutocareConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autocare", about = "Autocare: predictive maintenance agent orchestrator")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "autocare.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the vehicles in the fleet file
    Vehicles,
    /// Start the agents, submit one task per vehicle and report the outcomes
    Run {
        /// Vehicle id (repeatable)
        #[arg(long = "vehicle", required = true)]
        vehicles: Vec<String>,
        /// Task kind to submit
        #[arg(long, default_value = "data_analysis")]
        kind: TaskKind,
        /// Task priority (low, medium, high, critical)
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
    },
    /// Run analysis, diagnosis and the owner call script for one vehicle
    Workflow {
        /// Vehicle id
        vehicle: String,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = AutocareConfig::load(&cli.config).await?;
    config.apply_env();

    let fleet_path = config.fleet_path(&cli.config);
    let fleet: Arc<dyn VehicleSource> = Arc::new(
        InMemoryFleet::load(&fleet_path)
            .with_context(|| format!("loading fleet from '{}'", fleet_path.display()))?,
    );

    match cli.command {
        Commands::Vehicles => {
            let vehicles = fleet.list_all();
            if vehicles.is_empty() {
                println!("No vehicles in {}", fleet_path.display());
            } else {
                for v in &vehicles {
                    println!(
                        "  {}  {:<3}  {} ({})  {}  {}",
                        v.vehicle_id, v.powertrain, v.model, v.year, v.owner, v.phone
                    );
                }
                println!("\nTotal: {} vehicle(s)", vehicles.len());
            }
        }
        Commands::Run {
            vehicles,
            kind,
            priority,
        } => run(&config, fleet, &vehicles, kind, priority).await?,
        Commands::Workflow { vehicle } => {
            let workflow = MaintenanceWorkflow::new(config.model.clone(), fleet);
            let report = workflow.run(&vehicle).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn run(
    config: &AutocareConfig,
    fleet: Arc<dyn VehicleSource>,
    vehicles: &[String],
    kind: TaskKind,
    priority: TaskPriority,
) -> anyhow::Result<()> {
    let orchestrator = Arc::new(Orchestrator::new(config.orchestrator.clone()));

    for registration in config.registrations() {
        let mut agent = MaintenanceAgent::new(registration.kind, config.model.clone())
            .with_fleet(Arc::clone(&fleet))
            .with_name(registration.display_name());
        if let Some(temperature) = registration.temperature {
            agent = agent.with_temperature(temperature);
        }
        orchestrator
            .register(registration.registry_key(), Box::new(agent))
            .await;
    }

    for e in orchestrator.start_all().await {
        warn!(error = %e, "Agent did not start");
    }
    let dispatcher = orchestrator.spawn_dispatcher();

    let receipts: Vec<_> = vehicles
        .iter()
        .map(|id| {
            let receipt = orchestrator.submit_tracked(
                kind,
                serde_json::json!({ "vehicle_id": id }),
                priority,
            );
            (id, receipt)
        })
        .collect();
    info!(count = receipts.len(), kind = %kind, "Tasks submitted");

    for (vehicle_id, receipt) in receipts {
        let task_id = receipt.task_id();
        let outcome = receipt.wait().await?;
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "task_id": task_id,
                "vehicle_id": vehicle_id,
                "outcome": outcome,
            }))?
        );
    }

    let status = orchestrator.status().await;
    println!("{}", serde_json::to_string_pretty(&status.to_json())?);
    let health = orchestrator.health_report().await;
    println!("{}", serde_json::to_string_pretty(&health)?);

    for e in orchestrator.stop_all().await {
        warn!(error = %e, "Agent did not stop cleanly");
    }
    dispatcher.await??;
    Ok(())
}
