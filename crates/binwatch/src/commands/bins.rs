use anyhow::Result;
use colored::{ColoredString, Colorize};

use binwatch::api::ApiClient;
use binwatch::config::Config;
use binwatch::model::Trashbin;

pub fn run(project: Option<String>, min_fill: Option<f64>, json: bool) -> Result<()> {
    let config = Config::load_or_default()?;
    let project = super::resolve_project(project, &config)?;
    let client = ApiClient::new(&config.backend())?;

    let mut bins = client.list_trashbins(&project)?;
    if let Some(threshold) = min_fill {
        bins.retain(|b| b.needs_collection(threshold));
    }

    if json {
        return super::print_json(&bins);
    }

    if bins.is_empty() {
        println!("{}", "No bins found.".yellow());
        return Ok(());
    }

    let collect_at = config.collect_at();
    let battery_low = config.battery_low();

    println!(
        "{}",
        format!(
            "{:<12} {:<24} {:>6} {:>8} {:>7}  {}",
            "ID", "NAME", "FILL", "BATTERY", "NOISE", "LAST SEEN"
        )
        .bold()
    );
    for bin in &bins {
        println!(
            "{:<12} {:<24} {:>6} {:>8} {:>7}  {}",
            truncate(&bin.id, 12),
            truncate(bin.name.as_deref().unwrap_or("-"), 24),
            fill_cell(bin, collect_at),
            battery_cell(bin, battery_low),
            bin.noise_level
                .map(|n| format!("{n:.0}dB"))
                .unwrap_or_else(|| "-".to_string()),
            bin.last_seen
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    let due = bins.iter().filter(|b| b.needs_collection(collect_at)).count();
    let low = bins.iter().filter(|b| b.battery_low(battery_low)).count();
    println!();
    println!(
        "{} bin(s), {} due for collection, {} with low battery",
        bins.len(),
        due.to_string().bold(),
        low.to_string().bold()
    );
    Ok(())
}

fn fill_cell(bin: &Trashbin, collect_at: f64) -> ColoredString {
    match bin.fill_level {
        Some(level) => {
            let text = format!("{level:.0}%");
            if level >= collect_at {
                text.red().bold()
            } else if level >= 50.0 {
                text.yellow()
            } else {
                text.green()
            }
        }
        None => "-".dimmed(),
    }
}

fn battery_cell(bin: &Trashbin, battery_low: f64) -> ColoredString {
    match bin.battery_level {
        Some(level) if bin.battery_low(battery_low) => format!("{level:.0}% !").red(),
        Some(level) => format!("{level:.0}%").normal(),
        None => "-".dimmed(),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Marktplatz Nord", 8), "Marktpl…");
        assert_eq!(truncate("Überseeallee", 5).chars().count(), 5);
    }
}
