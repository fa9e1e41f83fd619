//! Utility to look up foods in the nutrition dataset
//!
//! Usage: lookup_food [--cutoff N] <food name>...
//! Each argument is matched separately and printed as JSON.

use nutrimind::config::Config;
use nutrimind::nutrition::Dataset;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    let mut cutoff = config.match_cutoff;
    let mut queries = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--cutoff" {
            let value = args.next().ok_or("--cutoff needs a value")?;
            cutoff = value.parse()?;
        } else {
            queries.push(arg);
        }
    }

    if queries.is_empty() {
        eprintln!("Usage: lookup_food [--cutoff N] <food name>...");
        std::process::exit(2);
    }

    println!("Nutrition data: {}", config.data_dir.display());
    let dataset = Dataset::load_dir(&config.data_dir)?;
    println!("Loaded {} foods from {} files", dataset.len(), dataset.source_files().len());

    for query in &queries {
        match dataset.match_food(query, cutoff)? {
            Some(found) => {
                println!("{} -> {} ({:.1})", query, found.nutrition.food, found.score);
                println!("{}", serde_json::to_string_pretty(&found.nutrition)?);
            }
            None => println!("{} -> no match at cutoff {}", query, cutoff),
        }
    }

    Ok(())
}
