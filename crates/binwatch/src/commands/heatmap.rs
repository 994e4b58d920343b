use anyhow::Result;
use chrono::NaiveDate;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

use binwatch::api::ApiClient;
use binwatch::config::Config;
use binwatch::heatmap::{Band, Heatmap, aggregate, aggregate_range, day_span};
use binwatch::model::Reading;

pub fn run(
    project: Option<String>,
    input: Option<PathBuf>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            anyhow::bail!("--from {from} is after --to {to}");
        }
    }

    let readings: Vec<Reading> = match input {
        Some(path) => super::read_json_file(&path)?,
        None => {
            let config = Config::load_or_default()?;
            let project = super::resolve_project(project, &config)?;
            let client = ApiClient::new(&config.backend())?;
            // Earlier readings seed each sensor's state, so only `to` bounds the fetch.
            client.fetch_readings(&project, None, to)?
        }
    };

    let cells = match (from, to) {
        (None, None) => aggregate(&readings),
        _ => {
            let Some((first, last)) = day_span(&readings) else {
                return print_empty(json);
            };
            aggregate_range(&readings, from.unwrap_or(first), to.unwrap_or(last))
        }
    };

    if json {
        return super::print_json(&cells);
    }

    let heatmap = Heatmap::from_cells(&cells);
    if heatmap.is_empty() {
        return print_empty(json);
    }

    print!("{}", format!("{:<12}", "DAY").bold());
    for band in Band::ALL {
        print!("{}", format!("{:>8}", band.label()).bold());
    }
    println!("{}", format!("{:>8}", "TOTAL").bold());

    let peak = heatmap
        .rows()
        .iter()
        .flat_map(|r| r.counts)
        .max()
        .unwrap_or(0);
    for row in heatmap.rows() {
        print!("{:<12}", row.day.to_string());
        for band in Band::ALL {
            print!("{}", shade(row.counts[band.index()], peak));
        }
        println!("{:>8}", row.total());
    }
    Ok(())
}

fn print_empty(json: bool) -> Result<()> {
    if json {
        println!("[]");
    } else {
        println!("{}", "No readings in range.".yellow());
    }
    Ok(())
}

/// Count right-aligned, brighter the closer it is to the peak.
fn shade(count: usize, peak: usize) -> ColoredString {
    let text = format!("{count:>8}");
    if count == 0 || peak == 0 {
        return text.dimmed();
    }
    let ratio = count as f64 / peak as f64;
    if ratio >= 0.75 {
        text.bright_white().bold()
    } else if ratio >= 0.4 {
        text.white()
    } else {
        text.normal()
    }
}
