//! System status dashboard command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use panday_types::status::ServiceState;

use crate::state::AppState;

fn state_cell(state: ServiceState) -> Cell {
    match state {
        ServiceState::Ok => Cell::new("● ok").fg(Color::Green),
        ServiceState::Warn => Cell::new("▲ warn").fg(Color::Yellow),
        ServiceState::Error => Cell::new("✗ error").fg(Color::Red),
    }
}

/// Print the environment summary and one row per dependency check.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let status = state.system_status().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Panday v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Environment ──").dim());
    println!(
        "  Target:   {}",
        style(&status.environment.deployment_target).bold()
    );
    println!(
        "  Database: {}",
        style(&status.environment.database).dim()
    );
    println!("  KV:       {}", status.environment.kv_provider);
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Service").fg(Color::White),
        Cell::new("State").fg(Color::White),
        Cell::new("Detail").fg(Color::White),
        Cell::new("Latency").fg(Color::White),
    ]);

    for service in &status.services {
        let detail = match &service.error {
            Some(error) => format!("{} ({error})", service.detail),
            None => service.detail.clone(),
        };
        let latency = service
            .latency_ms
            .map(|ms| format!("{ms} ms"))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&service.name),
            state_cell(service.state),
            Cell::new(detail),
            Cell::new(latency).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!();

    let overall = match status.overall() {
        ServiceState::Ok => style("All systems operational").green(),
        ServiceState::Warn => style("Running with warnings").yellow(),
        ServiceState::Error => style("Some services are failing").red(),
    };
    println!("  {overall}");
    println!();

    Ok(())
}
