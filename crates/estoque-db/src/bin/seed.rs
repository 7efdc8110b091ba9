//! # Seed Data Generator
//!
//! Populates the database with the demo catalogue for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p estoque-db --bin seed
//!
//! # Specify database path
//! cargo run -p estoque-db --bin seed -- --db ./data/estoque.db
//!
//! # Also create an administrator account (password hashed by the caller)
//! cargo run -p estoque-db --bin seed -- --admin admin@empresa.com '$argon2id$...'
//! ```
//!
//! ## Generated Products
//! Six IT assets across Eletrônicos, Informática and Móveis, chosen so the
//! dashboard shows every stock level: one out of stock, three low, two
//! normal.

use std::env;

use estoque_core::{ProductDraft, ProfileChanges, Role};
use estoque_db::{Database, DbConfig};

/// (name, category, price in cents, quantity)
const DEMO_PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Monitor LED 24\"", "Eletrônicos", 89990, 15),
    ("Teclado Mecânico", "Informática", 34990, 3),
    ("Mouse Gamer", "Informática", 12990, 2),
    ("Webcam HD", "Eletrônicos", 19990, 8),
    ("Fone de Ouvido", "Eletrônicos", 14990, 4),
    ("Cadeira de Escritório", "Móveis", 59990, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./estoque_dev.db");
    let mut admin: Option<(String, String)> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin" => {
                if i + 2 < args.len() {
                    admin = Some((args[i + 1].clone(), args[i + 2].clone()));
                    i += 2;
                }
            }
            "--help" | "-h" => {
                println!("Estoque Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>              Database file path (default: ./estoque_dev.db)");
                println!("      --admin <EMAIL> <HASH>   Create a confirmed administrator account");
                println!("  -h, --help                   Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Estoque Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let status = estoque_db::migrations::migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", status.applied, status.embedded);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalogue to avoid duplicates.");
    } else {
        for (name, category, price_cents, quantity) in DEMO_PRODUCTS {
            let draft = ProductDraft {
                name: name.to_string(),
                category: category.to_string(),
                price_cents: *price_cents,
                quantity: *quantity,
                ..Default::default()
            };

            match db.products().insert(&draft).await {
                Ok(product) => println!("  + {} ({} un.)", product.name, product.quantity),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }

    if let Some((email, password_hash)) = admin {
        let (user, _) = db
            .users()
            .create(&email, &password_hash, Some("Administrador"), true)
            .await?;
        db.profiles()
            .update(&user.id, &ProfileChanges::role(Role::Administrator))
            .await?;
        println!("✓ Administrator {} created", user.email);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
