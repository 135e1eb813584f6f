use gapboard::table::{analyze_csv, MetricTable, GAP_REQUIRED, NOISE_REQUIRED};
use serde_json::json;
use std::env;
use std::fs;

/// Offline quality report for a local dataset snapshot: row counts, shape
/// problems, content hash, and which view's required columns it satisfies.
fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/cf10_repo.csv".to_string());

    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("cannot read {}: {}", path, err);
            std::process::exit(1);
        }
    };

    let report = match analyze_csv(&text) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("analysis failed: {}", err);
            std::process::exit(2);
        }
    };

    let table = match MetricTable::parse_csv(&text) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("parse failed: {}", err);
            std::process::exit(3);
        }
    };

    let payload = json!({
        "path": path,
        "report": report,
        "missing_for_decomposition": table.missing_columns(&GAP_REQUIRED),
        "missing_for_noise_sweep": table.missing_columns(&NOISE_REQUIRED),
    });
    println!("{}", serde_json::to_string_pretty(&payload).unwrap());
}
