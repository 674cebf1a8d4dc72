//! # Seed Data Generator
//!
//! Fills an empty development database with a sticker catalog, including a
//! specials collection so the admission gates can be exercised right away.
//!
//! ```bash
//! cargo run -p sticker-db --bin seed
//! cargo run -p sticker-db --bin seed -- --db ./shop_dev.db --count 4
//! ```

use chrono::Utc;
use std::env;
use std::process::ExitCode;
use sticker_core::{Product, SPECIAL_COLLECTION};
use sticker_db::{Database, DbConfig};
use uuid::Uuid;

/// Demo catalog: collection tag plus sticker names. The specials
/// collection comes last and stays small, like the real shop's.
const COLLECTIONS: &[(&str, &[&str])] = &[
    (
        "club-110",
        &[
            "Crest 110 Years",
            "Founders 1913",
            "Anthem Scroll",
            "Stadium Aerial",
            "Derby Day",
            "Green Wall",
            "Cup Run 110",
            "Legends XI",
        ],
    ),
    (
        "championship-20-21",
        &[
            "Title Night",
            "Trophy Lift",
            "Golden Boot",
            "Final Whistle",
            "League Table",
            "Fans In Green",
            "Parade Float",
            "Star And Crest",
        ],
    ),
    (
        "retro",
        &[
            "Retro Badge 74",
            "Retro Kit 89",
            "Old Scoreboard",
            "Classic Scarf",
            "Vintage Ticket",
            "Radio Days",
            "Black And White Derby",
            "Original Ground",
        ],
    ),
    (
        "monkeys-2024",
        &[
            "Green Ape Drummer",
            "Ape On Tour",
            "Banana Corner Flag",
            "Ape Keeper",
            "Jungle Stand",
            "Ape Ultras",
            "Tifo Ape",
            "Away Days Ape",
        ],
    ),
    (
        SPECIAL_COLLECTION,
        &[
            "Gold Foil Crest",
            "Holographic Trophy",
            "Signed Captain",
            "Limited Derby Panorama",
        ],
    ),
];

struct SeedArgs {
    db_path: String,
    per_collection: usize,
}

fn parse_args() -> Option<SeedArgs> {
    let mut parsed = SeedArgs {
        db_path: "./shop_dev.db".to_string(),
        per_collection: usize::MAX,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => parsed.db_path = args.next()?,
            "--count" | "-c" => parsed.per_collection = args.next()?.parse().ok()?,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                return None;
            }
        }
    }

    Some(parsed)
}

fn print_help() {
    println!("Seeds the sticker-shop database with demo catalog data.");
    println!();
    println!("Usage: seed [--db <PATH>] [--count <N>]");
    println!();
    println!("  -d, --db <PATH>    database file (default: ./shop_dev.db)");
    println!("  -c, --count <N>    cap per collection (default: all)");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args() else {
        print_help();
        return ExitCode::FAILURE;
    };

    match seed(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Seed failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn seed(args: &SeedArgs) -> Result<(), sticker_db::DbError> {
    let db = Database::new(DbConfig::new(&args.db_path)).await?;
    println!("Database ready: {}", args.db_path);

    // Refuse to seed on top of an existing catalog
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Catalog already has {existing} products; nothing to do.");
        println!("Delete the database file to reseed from scratch.");
        return Ok(());
    }

    let mut generated = 0;
    for (collection_idx, (collection, names)) in COLLECTIONS.iter().enumerate() {
        for (name_idx, name) in names.iter().take(args.per_collection).enumerate() {
            let product = demo_product(collection, name, collection_idx * 10 + name_idx);
            db.products().insert(&product).await?;
            generated += 1;
        }
        println!("  seeded {collection}");
    }

    let specials = db.products().list_by_collection(SPECIAL_COLLECTION).await?;
    println!(
        "Done: {generated} products, {} of them specials.",
        specials.len()
    );

    Ok(())
}

/// Deterministic-but-varied demo product. Regular stickers run ₪5-₪12,
/// specials ₪18-₪25; stock lands between 0 and 60 so the occasional
/// sticker is already sold out.
fn demo_product(collection: &str, name: &str, seed: usize) -> Product {
    let price_cents = if collection == SPECIAL_COLLECTION {
        (18 + (seed % 8) as i64) * 100
    } else {
        (5 + (seed % 8) as i64) * 100
    };

    let stock = ((seed * 13) % 61) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price_cents,
        stock,
        collection: collection.to_string(),
        image_url: Some(format!(
            "/images/{}/{}.png",
            collection,
            name.to_lowercase().replace(' ', "-")
        )),
        created_at: Utc::now(),
    }
}
