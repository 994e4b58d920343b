use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use binwatch::api::ApiClient;
use binwatch::config::Config;
use binwatch::model::{Coordinate, Stop, select_for_collection};
use binwatch::route::osrm::OsrmClient;
use binwatch::route::{PlannedRoute, plan_route};

pub fn run(
    project: Option<String>,
    stops_file: Option<PathBuf>,
    min_fill: Option<f64>,
    depot: Option<Coordinate>,
    json: bool,
) -> Result<()> {
    let config = Config::load_or_default()?;
    let routing = config.routing();

    let depot = match depot {
        Some(depot) => depot,
        None => routing.depot()?.ok_or_else(|| {
            anyhow::anyhow!(
                "No depot given. Pass --depot lat,lon or run: binwatch config set routing.depot <lat,lon>"
            )
        })?,
    };

    let stops: Vec<Stop> = match stops_file {
        Some(path) => super::read_json_file(&path)?,
        None => {
            let project = super::resolve_project(project, &config)?;
            let client = ApiClient::new(&config.backend())?;
            let bins = client.list_trashbins(&project)?;
            select_for_collection(&bins, min_fill.unwrap_or(config.collect_at()))
        }
    };

    if stops.is_empty() {
        if json {
            return super::print_json(&PlannedRoute::empty());
        }
        println!("{}", "No bins selected for collection.".yellow());
        return Ok(());
    }

    let service = OsrmClient::from_config(&routing);
    let route = plan_route(&service, depot, &stops);

    if json {
        return super::print_json(&route);
    }
    print_route(depot, &route);
    Ok(())
}

fn print_route(depot: Coordinate, route: &PlannedRoute) {
    if !route.is_available() {
        println!("{}", "No route available.".red().bold());
        println!("{}", "  Run with -v for details.".dimmed());
        return;
    }

    println!(
        "{} {} stop(s), {:.1} km, {}",
        "Route:".green().bold(),
        route.stops.len(),
        route.distance / 1000.0,
        format_duration(route.duration)
    );
    println!("  {:>3}  {:<16} {}", "", "depot".dimmed(), depot);
    for (i, stop) in route.stops.iter().enumerate() {
        println!("  {:>3}  {:<16} {}", i + 1, stop.id, stop.coordinate);
    }
    println!("  {:>3}  {:<16} {}", "", "depot".dimmed(), depot);
}

fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round() as u64;
    if minutes >= 60 {
        format!("{}h {:02}min", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0min");
        assert_eq!(format_duration(610.0), "10min");
        assert_eq!(format_duration(3600.0), "1h 00min");
        assert_eq!(format_duration(5430.0), "1h 31min");
    }
}
