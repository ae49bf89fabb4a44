use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use budget_tracker::{
    Amount, CategoryName, CategoryType, PasswordHash, Transaction, Username, ValidatedPassword,
    create_budget, create_category, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of budget_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.exists() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user 'test' with password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("test")?, password_hash, &conn)?;

    println!("Creating categories...");

    let salary = create_category(
        CategoryName::new("Salary")?,
        CategoryType::Income,
        user.id,
        &conn,
    )?;
    let groceries = create_category(
        CategoryName::new("Groceries")?,
        CategoryType::Expense,
        user.id,
        &conn,
    )?;
    let rent = create_category(
        CategoryName::new("Rent")?,
        CategoryType::Expense,
        user.id,
        &conn,
    )?;

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let samples = [
        (salary.id, 350000, 40, true, "Monthly pay"),
        (rent.id, 120000, 35, false, "Rent"),
        (groceries.id, 15430, 30, false, "Weekly groceries"),
        (groceries.id, 8215, 2, false, "Corner store"),
        (salary.id, 350000, 10, true, "Monthly pay"),
        (rent.id, 120000, 5, false, "Rent"),
    ];

    for (category_id, cents, days_ago, is_income, note) in samples {
        create_transaction(
            Transaction::build(Amount::from_cents(cents), today - Duration::days(days_ago))
                .category_id(Some(category_id))
                .note(Some(note))
                .is_income(is_income),
            user.id,
            &conn,
        )?;
    }

    println!("Creating a budget for this month...");

    create_budget(today, Amount::new(Decimal::new(2000, 0))?, user.id, &conn)?;

    println!("Success!");

    Ok(())
}
