//! Background analysis session
//!
//! Submits a plate for analysis on a worker thread, then resubmits it with
//! stricter parameters before the first pass is collected. Only the latest
//! submission's table is kept.

use std::{env, path::Path, process, sync::Arc, thread, time::Duration};
use tlc_scan::{load_image, AnalysisSession, DetectionParameters, SessionStatus};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <image_path>", args[0]);
        process::exit(1);
    }

    let image = match load_image(Path::new(&args[1])) {
        Ok(image) => Arc::new(image),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut session = AnalysisSession::new();
    let loose = DetectionParameters::default();
    let strict = DetectionParameters {
        min_circularity: 0.85,
        ..DetectionParameters::default()
    };

    for params in [loose, strict] {
        if let Err(e) = session.submit(Arc::clone(&image), params) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    loop {
        match session.poll() {
            SessionStatus::Running => thread::sleep(Duration::from_millis(10)),
            SessionStatus::Updated { generation } => {
                let count = session.current().map_or(0, |t| t.len());
                eprintln!("Submission {} finished with {} spot(s)", generation, count);
                break;
            }
            SessionStatus::Failed { generation, error } => {
                eprintln!("Submission {} failed: {}", generation, error);
                process::exit(1);
            }
            SessionStatus::Idle => break,
        }
    }
}
