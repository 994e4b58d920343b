use anyhow::Result;
use colored::Colorize;

use binwatch::config::Config;

use crate::cli::ConfigCommands;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default()?;

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    let backend = config.backend();
    let routing = config.routing();
    let token = if backend.resolve_api_token().is_some() {
        "set".green()
    } else {
        "not set".yellow()
    };

    println!("{}", "backend".bold());
    println!(
        "  base_url:     {}",
        backend.base_url.as_deref().unwrap_or("(not set)")
    );
    println!("  api_token:    {token}");
    println!(
        "  project:      {}",
        backend.project.as_deref().unwrap_or("(not set)")
    );
    println!("  timeout_secs: {}", backend.timeout_secs());
    println!("{}", "routing".bold());
    println!("  osrm_url:     {}", routing.osrm_url());
    println!("  profile:      {}", routing.profile());
    println!(
        "  depot:        {}",
        routing.depot.as_deref().unwrap_or("(not set)")
    );
    println!("  timeout_secs: {}", routing.timeout_secs());
    println!("{}", "thresholds".bold());
    println!("  collect_at:   {}%", config.collect_at());
    println!("  battery_low:  {}%", config.battery_low());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default()?;
    config.set(key, value)?;
    let path = config.save()?;
    let shown = if key.ends_with("api_token") {
        "********"
    } else {
        value
    };
    println!("{} {key} = {shown}", "Saved".green().bold());
    println!("{}", format!("  ({})", path.display()).dimmed());
    Ok(())
}
