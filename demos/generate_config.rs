//! Generate a default analysis configuration file
//!
//! Creates a JSON config with all default parameters

use std::{env, path::Path, process};
use tlc_scan::AnalysisConfig;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json> [lane_count]", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} configs/tlc.json 4", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    let mut config = AnalysisConfig::default();
    if let Some(arg) = args.get(2) {
        match arg.parse::<usize>() {
            Ok(n) => config.detection.lane_count = n,
            Err(_) => {
                eprintln!("Error: lane_count must be a positive integer");
                process::exit(1);
            }
        }
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    match config.to_json_file(output_path) {
        Ok(()) => {
            let d = &config.detection;
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!("  Area: {:.0}-{:.0} px", d.min_area, d.max_area);
            eprintln!("  Circularity: >= {:.2}", d.min_circularity);
            eprintln!(
                "  Threshold: {}..{} ({:?})",
                d.threshold_low, d.threshold_high, d.threshold_mode
            );
            eprintln!("  Lanes: {}", d.lane_count);
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
