//! Command-line interface for tlc_scan
//!
//! Analyzes one plate photograph, prints the spot table as JSON and
//! optionally exports it and saves the annotated overlay.

use std::{
    env,
    path::{Path, PathBuf},
    process,
};
use tlc_scan::{AnalysisConfig, ExportLayout, Pipeline, ResultTable};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut export_path = None;
    let mut overlay_path = None;
    let mut lane_count = None;
    let mut full_layout = false;
    let mut image_path_arg = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "--export" | "--overlay" | "--lanes" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a value", args[i]);
                    process::exit(1);
                }
                let value = args[i + 1].clone();
                match args[i].as_str() {
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--export" => export_path = Some(PathBuf::from(value)),
                    "--overlay" => overlay_path = Some(PathBuf::from(value)),
                    _ => match value.parse::<usize>() {
                        Ok(n) => lane_count = Some(n),
                        Err(_) => {
                            eprintln!("Error: --lanes expects a positive integer");
                            process::exit(1);
                        }
                    },
                }
                i += 1;
            }
            "--full" => full_layout = true,
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let image_path_str = match image_path_arg {
        Some(path) => path,
        None => {
            print_help(&args[0]);
            process::exit(1);
        }
    };
    let image_path = Path::new(&image_path_str);

    let mut config = match config_path {
        Some(path) => match AnalysisConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(error) => fail(&error),
        },
        None => AnalysisConfig::default(),
    };
    if let Some(n) = lane_count {
        config.detection.lane_count = n;
    }

    let mut pipeline = match Pipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(error) => fail(&error),
    };
    let table = match pipeline.load(image_path) {
        Ok(table) => table.clone(),
        Err(error) => fail(&error),
    };
    print_table(&table);

    if let Some(path) = export_path {
        let layout = if full_layout {
            ExportLayout::Full
        } else {
            ExportLayout::Summary
        };
        match pipeline.export_with_layout(&path, layout) {
            Ok(()) => eprintln!("Exported {} spot(s) to {}", table.len(), path.display()),
            Err(error) => fail(&error),
        }
    }

    if let Some(path) = overlay_path {
        if let Some(overlay) = pipeline.annotated() {
            match overlay.save(&path) {
                Ok(()) => eprintln!("Saved overlay to {}", path.display()),
                Err(e) => eprintln!("Warning: Failed to save overlay: {}", e),
            }
        }
    }
}

fn fail(error: &tlc_scan::AnalysisError) -> ! {
    eprintln!("Analysis failed: {}", error);
    eprintln!("Suggestion: {}", error.user_message());
    if !error.is_recoverable() {
        eprintln!("Changing the parameters will not help; retry once the environment is fixed.");
    }
    process::exit(1);
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Detect spots on a TLC plate photograph and report Rf values.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE    Load analysis configuration from JSON");
    eprintln!("  --lanes N        Number of lanes across the plate");
    eprintln!("  --export FILE    Export the table (.csv, .tsv, .json, .xlsx)");
    eprintln!("  --full           Export every spot feature instead of the summary");
    eprintln!("  --overlay FILE   Save the annotated image");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} plate.jpg", program_name);
    eprintln!("  {} --lanes 4 --export spots.csv plate.jpg", program_name);
    eprintln!("  {} --config tlc.json --overlay marked.png plate.png", program_name);
}

fn print_table(table: &ResultTable) {
    // JSON on stdout for programmatic use
    match serde_json::to_string_pretty(table) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }

    // Summary on stderr for human reading
    eprintln!();
    eprintln!("Plate Summary:");
    if table.is_empty() {
        eprintln!("  No spots found");
        return;
    }
    for group in table.lane_groups() {
        eprintln!("  Lane {}: {} spot(s)", group.lane, group.len());
        for spot in &group.spots {
            eprintln!(
                "    #{:<3} Rf={:.3}  sat={:<3}  conc={:.3}",
                spot.number,
                spot.rf.unwrap_or(f64::NAN),
                spot.saturation(),
                spot.rel_conc.unwrap_or(f64::NAN)
            );
        }
    }
}
