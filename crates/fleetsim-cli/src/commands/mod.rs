//! CLI commands implementation

use anyhow::{bail, Context, Result};
use fleetsim_core::{FleetsimConfig, Host};
use fleetsim_orchestrator::{
    Orchestrator, OrchestratorConfig, QosEvaluator, RunSummary, WorkloadDrift,
};
use fleetsim_scheduler::{build_strategy, FleetRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Run the full simulation and print its summary
pub async fn run(config: FleetsimConfig, json: bool) -> Result<()> {
    let (hosts, workloads) = config.build_fleet()?;
    let duration = Duration::from_secs(config.simulation.duration_secs);
    let strategy = config.simulation.strategy;

    info!(
        hosts = hosts.len(),
        workloads = workloads.len(),
        %strategy,
        "Starting fleetsim v{}",
        env!("CARGO_PKG_VERSION")
    );

    let registry = Arc::new(FleetRegistry::with_hosts(build_strategy(strategy), hosts));
    let orchestrator = Orchestrator::new(
        registry.clone(),
        QosEvaluator::new(config.qos),
        OrchestratorConfig::from(&config.simulation),
    );

    let drift = config.drift.enabled.then(|| {
        let drift = WorkloadDrift::from_settings(&config.drift);
        tokio::spawn(drift.run(orchestrator.clone(), duration))
    });

    let summary = orchestrator.run(workloads, duration).await?;

    if let Some(handle) = drift {
        let perturbations = handle.await.context("Drift task failed")?;
        info!(perturbations, "Drift finished");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_summary(&summary));
        println!();
        print!("{}", format_placement(&registry.hosts().await));
    }

    Ok(())
}

/// Place the workloads once and print the result
pub async fn check(config: FleetsimConfig) -> Result<()> {
    let (hosts, workloads) = config.build_fleet()?;
    let strategy = config.simulation.strategy;
    let registry = FleetRegistry::with_hosts(build_strategy(strategy), hosts);

    let result = registry.allocate_resources(workloads).await;
    println!("Strategy: {}", strategy);
    print!("{}", format_placement(&registry.hosts().await));

    if let Err(e) = result {
        eprintln!("Placement failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

/// Write the built-in scenario
pub fn init(output: Option<&Path>, force: bool) -> Result<()> {
    let toml = FleetsimConfig::default().to_toml()?;

    match output {
        Some(path) => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(path, toml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Scenario written to {}", path.display());
        }
        None => print!("{}", toml),
    }

    Ok(())
}

fn format_summary(summary: &RunSummary) -> String {
    let u = &summary.final_utilization;
    let mut out = String::new();
    out.push_str(&format!("Samples:     {}\n", summary.samples));
    out.push_str(&format!("Evaluations: {}\n", summary.evaluations));
    out.push_str(&format!("Violations:  {}\n", summary.violations));
    out.push_str(&format!("Rebalances:  {}\n", summary.rebalances));
    out.push_str(&format!("Migrations:  {}\n", summary.migrations));
    out.push_str(&format!(
        "Final utilization: CPU {:.1}%, Memory {:.1}%, GPU {:.1}%, IO {:.1}%\n",
        u.cpu, u.memory, u.gpu, u.io
    ));
    if summary.qos_met {
        out.push_str("QoS: met\n");
    } else {
        let kinds: Vec<String> = summary
            .final_violations
            .iter()
            .map(|k| k.to_string())
            .collect();
        out.push_str(&format!("QoS: not met ({})\n", kinds.join(", ")));
    }
    out
}

fn format_placement(hosts: &[Host]) -> String {
    let mut out = format!(
        "{:<20} {:<20} {:<10} {:<10}\n",
        "WORKLOAD", "HOST", "CPU (m)", "LOAD"
    );
    out.push_str(&format!("{}\n", "-".repeat(63)));
    for host in hosts {
        for workload in &host.workloads {
            out.push_str(&format!(
                "{:<20} {:<20} {:<10} {:<10}\n",
                workload.id,
                host.id,
                workload.cpu_millicores,
                format!("{:.0}%", host.load() * 100.0)
            ));
        }
    }
    out
}
