use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{CustomerUpdate, LedgerService};
use crate::domain::{CollectionSchedule, CustomerBalance, Settings, format_cents};

/// Fiado - Store Credit Ledger
#[derive(Parser)]
#[command(name = "fiado")]
#[command(about = "A local-first store credit ledger: customers, tabs and collection dates")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "fiado.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Record a sale on a customer's tab
    Sale {
        /// Customer ID
        customer: String,

        /// Amount sold (e.g., "150.00" or "150")
        amount: String,

        /// What was sold
        description: String,

        /// Date of the sale (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record a payment from a customer
    Payment {
        /// Customer ID
        customer: String,

        /// Amount paid (e.g., "50.00" or "50")
        amount: String,

        /// Payment note
        description: String,

        /// Date of the payment (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the collection schedule (overdue / due today / upcoming)
    Collections {
        /// Show only customers due on this exact date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show weekly summary and outstanding credit
    Summary,

    /// Backup settings commands
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Email a backup of the database now
    Backup {
        /// Email address (defaults to the configured one)
        #[arg(long)]
        email: Option<String>,

        /// App-specific password (defaults to the configured one)
        #[arg(long)]
        app_password: Option<String>,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: customers, transactions, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Populate the database with demo data
    Seed,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Add a new customer
    Add {
        /// Customer name
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Next payment date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// List all customers with balances, highest debt first
    List,

    /// Show a customer's balance and transaction history
    Show {
        /// Customer ID
        id: String,
    },

    /// Edit a customer
    Edit {
        /// Customer ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New phone number
        #[arg(long)]
        phone: Option<String>,

        /// New next payment date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Remove the scheduled payment date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },

    /// Delete a customer and all of its transactions
    Delete {
        /// Customer ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show the current backup settings
    Show,

    /// Update backup settings
    Set {
        /// Email address backups are sent to (and from)
        #[arg(long)]
        email: Option<String>,

        /// App-specific password for the mail provider
        #[arg(long)]
        app_password: Option<String>,

        /// Send a backup automatically after each transaction
        #[arg(long)]
        auto_backup: Option<bool>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Customer(customer_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_customer_command(&service, customer_cmd).await?;
            }

            Commands::Sale {
                customer,
                amount,
                description,
                date,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                record(&service, &customer, &amount, "SALE", &description, date).await?;
            }

            Commands::Payment {
                customer,
                amount,
                description,
                date,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                record(&service, &customer, &amount, "PAYMENT", &description, date).await?;
            }

            Commands::Collections { date } => {
                let service = LedgerService::connect(&self.database).await?;
                match date {
                    Some(date_str) => {
                        let date = parse_naive_date(&date_str)?;
                        let due = service.collections_on(date).await?;
                        print_collection_list(&format!("Due on {}", date), &due);
                    }
                    None => {
                        let today = Utc::now().date_naive();
                        let schedule = service.collection_schedule(today).await?;
                        print_collection_schedule(&schedule);
                    }
                }
            }

            Commands::Summary => {
                let service = LedgerService::connect(&self.database).await?;
                run_summary_command(&service).await?;
            }

            Commands::Settings(settings_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_settings_command(&service, settings_cmd).await?;
            }

            Commands::Backup {
                email,
                app_password,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                service.send_backup(email, app_password).await?;
                println!("Backup sent.");
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }

            Commands::Seed => {
                let service = LedgerService::connect(&self.database).await?;
                let customers = service.seed_demo_data().await?;
                println!("Seeded {} customers:", customers.len());
                for customer in customers {
                    println!("  {} ({})", customer.name, customer.id);
                }
            }
        }

        Ok(())
    }
}

async fn record(
    service: &LedgerService,
    customer: &str,
    amount: &str,
    kind: &str,
    description: &str,
    date: Option<String>,
) -> Result<()> {
    let customer_id = parse_customer_id(customer)?;
    let timestamp = date
        .map(|d| parse_naive_date(&d).map(to_midnight_utc))
        .transpose()?;

    let transaction = service
        .record_transaction(customer_id, amount, kind, description, timestamp)
        .await?;

    println!(
        "Recorded {}: {} - {} ({})",
        transaction.kind,
        format_cents(transaction.amount_cents),
        transaction.description,
        transaction.id
    );
    Ok(())
}

async fn run_customer_command(service: &LedgerService, cmd: CustomerCommands) -> Result<()> {
    match cmd {
        CustomerCommands::Add { name, phone, due } => {
            let next_payment_date = due.map(|d| parse_naive_date(&d)).transpose()?;
            let customer = service
                .create_customer(name, phone, next_payment_date)
                .await?;
            println!("Created customer: {} ({})", customer.name, customer.id);
        }

        CustomerCommands::List => {
            let entries = service.list_customers().await?;
            if entries.is_empty() {
                println!("No customers found.");
            } else {
                println!("{:<38} {:<24} {:>12}", "ID", "NAME", "BALANCE");
                println!("{}", "-".repeat(76));
                for entry in entries {
                    println!(
                        "{:<38} {:<24} {:>12}",
                        entry.customer.id,
                        entry.customer.name,
                        format_cents(entry.balance)
                    );
                }
            }
        }

        CustomerCommands::Show { id } => {
            let customer_id = parse_customer_id(&id)?;
            let detail = service.get_customer_detail(customer_id).await?;

            println!("Customer: {}", detail.customer.name);
            println!("  ID:      {}", detail.customer.id);
            if let Some(phone) = &detail.customer.phone {
                println!("  Phone:   {}", phone);
            }
            if let Some(due) = detail.customer.next_payment_date {
                println!("  Next payment: {}", due);
            }
            println!("  Balance: {}", format_cents(detail.balance));
            println!();

            if detail.transactions.is_empty() {
                println!("No transactions.");
            } else {
                println!("{:<12} {:<9} {:>12}  {}", "DATE", "KIND", "AMOUNT", "DESCRIPTION");
                println!("{}", "-".repeat(60));
                for tx in detail.transactions {
                    println!(
                        "{:<12} {:<9} {:>12}  {}",
                        tx.created_at.format("%Y-%m-%d"),
                        tx.kind,
                        format_cents(tx.amount_cents),
                        tx.description
                    );
                }
            }
        }

        CustomerCommands::Edit {
            id,
            name,
            phone,
            due,
            clear_due,
        } => {
            let customer_id = parse_customer_id(&id)?;
            let next_payment_date = due.map(|d| parse_naive_date(&d)).transpose()?;

            let customer = service
                .update_customer(
                    customer_id,
                    CustomerUpdate {
                        name,
                        phone,
                        next_payment_date,
                        clear_next_payment_date: clear_due,
                    },
                )
                .await?;
            println!("Updated customer: {}", customer.name);
        }

        CustomerCommands::Delete { id } => {
            let customer_id = parse_customer_id(&id)?;
            let customer = service.delete_customer(customer_id).await?;
            println!(
                "Deleted customer {} and all of its transactions.",
                customer.name
            );
        }
    }
    Ok(())
}

async fn run_summary_command(service: &LedgerService) -> Result<()> {
    let stats = service.dashboard_stats(Utc::now()).await?;

    println!("Week of {}", stats.week_start.format("%Y-%m-%d"));
    println!("  Sales:        {}", format_cents(stats.weekly_sales));
    println!("  Payments:     {}", format_cents(stats.weekly_payments));
    println!("  Coverage:     {:.0}%", stats.coverage_pct);
    println!();
    println!("  Receivable:   {}", format_cents(stats.total_receivable));
    println!(
        "  Customers:    {} ({} owing)",
        stats.customer_count, stats.debtor_count
    );
    Ok(())
}

async fn run_settings_command(service: &LedgerService, cmd: SettingsCommands) -> Result<()> {
    match cmd {
        SettingsCommands::Show => {
            let settings = service.get_settings().await?;
            println!(
                "Email:       {}",
                settings.email.as_deref().unwrap_or("(not set)")
            );
            println!(
                "Password:    {}",
                if settings.app_password.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!(
                "Auto-backup: {}",
                if settings.auto_backup { "on" } else { "off" }
            );
        }

        SettingsCommands::Set {
            email,
            app_password,
            auto_backup,
        } => {
            let mut settings = service.get_settings().await?;
            if let Some(email) = email {
                settings.email = Some(email);
            }
            if let Some(app_password) = app_password {
                settings.app_password = Some(app_password);
            }
            if let Some(auto_backup) = auto_backup {
                settings.auto_backup = auto_backup;
            }
            let settings: Settings = service.save_settings(settings).await?;
            println!(
                "Settings saved. Auto-backup is {}.",
                if settings.auto_backup { "on" } else { "off" }
            );
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "customers" => {
            let count = exporter.export_customers_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} customers", count);
            }
        }
        "transactions" => {
            let count = exporter.export_transactions_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} customers, {} transactions",
                    snapshot.customers.len(),
                    snapshot.transactions.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: customers, transactions, full",
                export_type
            );
        }
    }

    Ok(())
}

fn print_collection_schedule(schedule: &CollectionSchedule) {
    if schedule.is_empty() {
        println!("Nothing scheduled for collection.");
        return;
    }

    print_collection_list("Overdue", &schedule.overdue);
    print_collection_list("Due today", &schedule.due_today);
    print_collection_list("Upcoming", &schedule.upcoming);
}

fn print_collection_list(title: &str, entries: &[CustomerBalance]) {
    if entries.is_empty() {
        return;
    }

    println!("{} ({})", title, entries.len());
    for entry in entries {
        let date = entry
            .customer
            .next_payment_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        println!(
            "  {:<12} {:<24} {:>12}",
            date,
            entry.customer.name,
            format_cents(entry.balance)
        );
    }
    println!();
}

fn parse_customer_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).context("Invalid customer ID format (expected UUID)")
}

fn parse_naive_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", raw))
}

fn to_midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
        .and_utc()
}
