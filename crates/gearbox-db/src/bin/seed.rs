//! # Seed Data Generator
//!
//! Populates the database with branches and their stock for development.
//!
//! ## Usage
//! ```bash
//! # Seed into the default dev database
//! cargo run -p gearbox-db --bin seed
//!
//! # Specify database path
//! cargo run -p gearbox-db --bin seed -- --db ./data/gearbox.db
//! ```
//!
//! ## Generated Data
//! Creates the four dealership branches and a parts shelf per branch:
//! - Branches: ALAKA, ILORIN, IKEJA, CITI CARS
//! - Stock: common auto parts with naira prices and starting quantities
//!
//! Prices are written as the shop writes them ("45,000") and parsed through
//! the same path a stock upload sheet would take.

use std::env;

use gearbox_core::Money;
use gearbox_db::{Database, DbConfig, NewStockEntry};

/// Dealership branches.
const BRANCHES: &[&str] = &["ALAKA", "ILORIN", "IKEJA", "CITI CARS"];

/// (name, price as written, starting quantity) per branch shelf.
const STOCK: &[(&str, &str, i64)] = &[
    ("Engine Oil 5W30", "9,500", 40),
    ("Engine Oil 10W40", "8,000", 40),
    ("Brake Pad", "18,500", 24),
    ("Brake Disc", "45,000", 12),
    ("Oil Filter", "3,500", 60),
    ("Air Filter", "6,000", 30),
    ("Fuel Filter", "7,500", 25),
    ("Spark Plug", "2,500", 100),
    ("Fan Belt", "5,500", 20),
    ("Timing Belt", "35,000", 10),
    ("Radiator Cap", "4,000", 15),
    ("Coolant 4L", "12,000", 18),
    ("Wiper Blade", "4,500", 30),
    ("Clutch Plate", "55,000", 8),
    ("Shock Absorber", "65,000", 16),
    ("Battery 75Ah", "120,000", 6),
    ("Headlamp Bulb H4", "3,000", 50),
    ("Brake Fluid DOT4", "5,000", 24),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./gearbox_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gearbox Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./gearbox_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Gearbox Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing branches
    let existing = db.branches().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} branches", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding branches and stock...");

    let start = std::time::Instant::now();
    let mut entries = 0;

    for branch_name in BRANCHES {
        let branch = db.branches().insert(branch_name).await?;

        for (name, price, quantity) in STOCK {
            let unit_value = Money::parse(price)?;
            db.stock()
                .insert(NewStockEntry {
                    branch_id: branch.id.clone(),
                    name: (*name).to_string(),
                    quantity: *quantity,
                    unit_value_kobo: unit_value.kobo(),
                })
                .await?;
            entries += 1;
        }

        println!("  ✓ {} ({} stock entries)", branch_name, STOCK.len());
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Seeded {} branches, {} stock entries in {:.2}s",
        BRANCHES.len(),
        entries,
        elapsed.as_secs_f64()
    );

    Ok(())
}
