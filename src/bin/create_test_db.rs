use std::{error::Error, path::Path, process::exit, str::FromStr};

use clap::Parser;
use email_address::EmailAddress;
use time::{Duration, OffsetDateTime};

use budget_tracker::{
    CategoryIcon, CategoryName, NewCategory, NewTransaction, PasswordHash, TransactionType,
    ValidatedPassword, create_category, create_transaction, create_user, initialize_db, open_db,
};

/// A utility for creating a test database for the budget tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_EMAIL: &str = "demo@example.com";
const TEST_PASSWORD: &str = "correct horse battery staple";

const CATEGORIES: [(&str, &str, TransactionType); 6] = [
    ("Salary", "💼", TransactionType::Income),
    ("Freelance", "💻", TransactionType::Income),
    ("Food", "🍕", TransactionType::Expense),
    ("Rent", "🏠", TransactionType::Expense),
    ("Transport", "🚌", TransactionType::Expense),
    ("Fun", "🎉", TransactionType::Expense),
];

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

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = open_db(output_path)?;
    initialize_db(&connection)?;

    println!("Creating test user {TEST_EMAIL} with the password \"{TEST_PASSWORD}\"...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(EmailAddress::from_str(TEST_EMAIL)?, password_hash, &connection)?;

    println!("Creating categories...");
    for (name, icon, transaction_type) in CATEGORIES {
        create_category(
            NewCategory {
                user_id: user.id,
                name: CategoryName::new(name)?,
                icon: CategoryIcon::new(icon)?,
                transaction_type,
            },
            &connection,
        )?;
    }

    println!("Creating transactions...");
    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for days_ago in 0..120_i64 {
        let date = today - Duration::days(days_ago);

        if date.day() == 1 {
            create_transaction(
                user.id,
                NewTransaction {
                    amount: 4200.0,
                    description: "Monthly pay".to_owned(),
                    date,
                    category: "Salary".to_owned(),
                    transaction_type: TransactionType::Income,
                },
                &connection,
            )?;
            create_transaction(
                user.id,
                NewTransaction {
                    amount: 1500.0,
                    description: "Rent".to_owned(),
                    date,
                    category: "Rent".to_owned(),
                    transaction_type: TransactionType::Expense,
                },
                &connection,
            )?;
            count += 2;
        }

        if date.day() == 15 {
            create_transaction(
                user.id,
                NewTransaction {
                    amount: 650.0,
                    description: "Website for a local bakery".to_owned(),
                    date,
                    category: "Freelance".to_owned(),
                    transaction_type: TransactionType::Income,
                },
                &connection,
            )?;
            count += 1;
        }

        // Vary the day-to-day spending so the history chart is not flat.
        let (category, description, amount) = match days_ago % 4 {
            0 => ("Food", "Groceries", 35.0 + (days_ago % 7) as f64 * 4.25),
            1 => ("Transport", "Bus fare", 3.5),
            2 => ("Food", "Lunch", 14.99),
            _ => ("Fun", "Movie night", 18.0 + (days_ago % 3) as f64 * 2.5),
        };
        create_transaction(
            user.id,
            NewTransaction {
                amount,
                description: description.to_owned(),
                date,
                category: category.to_owned(),
                transaction_type: TransactionType::Expense,
            },
            &connection,
        )?;
        count += 1;
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
