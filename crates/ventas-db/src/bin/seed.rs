//! # Seed Data Generator
//!
//! Populates a development database with customers, products and sales.
//!
//! ## Usage
//! ```bash
//! # 50 customers, 200 sales (defaults)
//! cargo run -p ventas-db --bin seed
//!
//! # Custom amounts and database path
//! cargo run -p ventas-db --bin seed -- --customers 100 --sales 1000 --db ./data/ventas.db
//! ```
//!
//! The generator is deterministic: the same arguments always produce the
//! same data. It refuses to run against a database that already has
//! customers.

use std::env;

use ventas_core::{NewCustomer, NewLineItem, NewProduct, NewSale, ReportQuery};
use ventas_db::{Database, DbConfig};

/// Product catalog: (categoria, [(nombre, precio)])
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Librería",
        &[
            ("Cuaderno universitario", 1_990),
            ("Lápiz grafito", 350),
            ("Goma de borrar", 290),
            ("Regla 30 cm", 790),
            ("Carpeta archivadora", 2_490),
            ("Set de destacadores", 3_290),
        ],
    ),
    (
        "Tecnología",
        &[
            ("Mouse inalámbrico", 9_990),
            ("Teclado USB", 12_990),
            ("Audífonos", 15_990),
            ("Pendrive 64 GB", 7_490),
            ("Cable HDMI", 4_990),
        ],
    ),
    (
        "Oficina",
        &[
            ("Resma carta", 4_290),
            ("Corchetera", 5_990),
            ("Archivador", 2_990),
            ("Calculadora", 8_990),
        ],
    ),
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Benjamín", "Camila", "Diego", "Elena", "Felipe", "Gabriela", "Hugo", "Isidora",
    "Joaquín", "Karla", "Lucas", "Martina", "Nicolás", "Olivia", "Pablo",
];

const LAST_NAMES: &[&str] = &[
    "González", "Muñoz", "Rojas", "Díaz", "Pérez", "Soto", "Contreras", "Silva", "Martínez",
    "Sepúlveda",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut customers: usize = 50;
    let mut sales: usize = 200;
    let mut db_path = String::from("./ventas_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customers = args[i + 1].parse().unwrap_or(customers);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(sales);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ventas Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Number of customers (default: 50)");
                println!("  -s, --sales <N>      Number of sales (default: 200)");
                println!("  -d, --db <PATH>      Database file path (default: ./ventas_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Ventas Seed Data Generator");
    println!("=============================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customers);
    println!("Sales:     {}", sales);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.customers().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} customers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Products
    let mut product_ids = Vec::new();
    for (categoria, items) in CATALOG {
        for (nombre, precio) in *items {
            let product = db
                .products()
                .create(&NewProduct {
                    nombre: nombre.to_string(),
                    categoria: Some(categoria.to_string()),
                    precio: *precio,
                })
                .await?;
            product_ids.push((product.id, product.precio));
        }
    }
    println!("✓ Generated {} products", product_ids.len());

    // Customers
    let mut customer_ids = Vec::with_capacity(customers);
    for n in 0..customers {
        let customer = generate_customer(n);
        match db.customers().create(&customer).await {
            Ok(created) => customer_ids.push(created.id),
            Err(e) => eprintln!("Failed to insert {}: {}", customer.email, e),
        }
    }
    println!("✓ Generated {} customers", customer_ids.len());

    if customer_ids.is_empty() {
        println!("No customers, skipping sales.");
        return Ok(());
    }

    // Sales
    let mut generated = 0;
    for n in 0..sales {
        let sale = generate_sale(n, &customer_ids, &product_ids);
        if let Err(e) = db.sales().create(&sale).await {
            eprintln!("Failed to insert sale {}: {}", n, e);
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} sales...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} sales in {:?}", generated, elapsed);

    println!();
    println!("Top products:");
    for row in db.reports().top_products(ReportQuery { limit: 3 }).await? {
        println!("  {:<28} {:>5} units", row.nombre, row.total_cantidad);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a customer with a unique email and rut.
fn generate_customer(n: usize) -> NewCustomer {
    let first = FIRST_NAMES[n % FIRST_NAMES.len()];
    let last = LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()];

    let body = 10_000_000 + n * 7_919;
    let verifier = rut_verifier(body);

    NewCustomer {
        nombre: format!("{} {}", first, last),
        email: format!("{}.{}{}@example.com", first, last, n)
            .to_lowercase()
            .replace(|c: char| !c.is_ascii(), "x"),
        rut: format!("{}-{}", body, verifier),
    }
}

/// Modulo-11 check digit of a RUT body.
fn rut_verifier(mut body: usize) -> char {
    let mut sum = 0;
    let mut factor = 2;
    while body > 0 {
        sum += (body % 10) * factor;
        body /= 10;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d as u32, 10).unwrap_or('0'),
    }
}

/// Generates a sale with 1-4 lines; every fifth line gets a discount.
fn generate_sale(n: usize, customers: &[i64], products: &[(i64, i64)]) -> NewSale {
    let lines = 1 + n % 4;

    let detalles = (0..lines)
        .map(|k| {
            let (producto_id, precio) = products[(n * 7 + k * 3) % products.len()];
            let descuento = if (n + k) % 5 == 0 { precio / 10 } else { 0 };
            NewLineItem {
                producto_id,
                precio,
                descuento,
                cantidad: 1 + ((n + k) % 3) as i64,
            }
        })
        .collect();

    NewSale {
        cliente_id: customers[(n * 13) % customers.len()],
        fecha: None,
        detalles,
    }
}
