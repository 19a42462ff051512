use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use resara_config::PricingConfig;
use serde::Serialize;
use std::env;
use std::path::Path;

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) {
    let mut writer = csv::Writer::from_path(path)
        .unwrap_or_else(|e| panic!("failed to open {}: {e}", path.display()));
    for row in rows {
        writer.serialize(row).expect("serialize fixture row");
    }
    writer.flush().expect("flush fixture file");
}

fn main() {
    let seed = env::var("RESARA_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    let out_dir = env::var("RESARA_DATA_DIR").unwrap_or_else(|_| "data".to_string());

    let out = Path::new(&out_dir);
    std::fs::create_dir_all(out).expect("create data directory");

    let config = PricingConfig::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let start_date = (Utc::now() - Duration::days(180)).date_naive();

    let historical = resara_synth::generate_historical(&mut rng, &config, 5000, start_date);
    write_csv(&out.join("historical_sales.csv"), &historical);

    let inventory = resara_synth::generate_inventory(&mut rng, &config, 200);
    write_csv(&out.join("current_inventory.csv"), &inventory);

    let competitor = resara_synth::generate_competitor(&mut rng);
    write_csv(&out.join("competitor_prices.csv"), &competitor);

    println!(
        "Generated {} historical, {} inventory, {} competitor rows in {} (seed {seed})",
        historical.len(),
        inventory.len(),
        competitor.len(),
        out.display()
    );
}
