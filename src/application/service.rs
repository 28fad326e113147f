use std::path::PathBuf;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::backup;
use crate::domain::{
    Cents, CollectionSchedule, Customer, CustomerBalance, CustomerId, Settings, Transaction,
    classify_collections, collections_due_on, compute_balance, sort_by_debt,
};
use crate::storage::Repository;

use super::{AppError, DashboardStats, build_dashboard_stats};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
    db_path: PathBuf,
}

/// Customer detail view: the customer, its derived balance, and the full
/// history newest-first.
pub struct CustomerDetail {
    pub customer: Customer,
    pub balance: Cents,
    pub transactions: Vec<Transaction>,
}

/// Editable customer fields. `None` leaves a field untouched;
/// `clear_next_payment_date` removes the scheduled date explicitly.
#[derive(Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub next_payment_date: Option<NaiveDate>,
    pub clear_next_payment_date: bool,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository, db_path: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            db_path: db_path.into(),
        }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo, database_path))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo, database_path))
    }

    // ========================
    // Customer operations
    // ========================

    /// Create a new customer.
    pub async fn create_customer(
        &self,
        name: String,
        phone: Option<String>,
        next_payment_date: Option<NaiveDate>,
    ) -> Result<Customer, AppError> {
        let mut customer = Customer::new(name)?;
        if let Some(phone) = phone {
            customer = customer.with_phone(phone);
        }
        if let Some(date) = next_payment_date {
            customer = customer.with_next_payment_date(date);
        }

        self.repo.save_customer(&customer).await?;
        Ok(customer)
    }

    /// Get a customer by ID.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        self.repo
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::CustomerNotFound(id.to_string()))
    }

    /// Get a customer with its balance and full transaction history
    /// (newest first).
    pub async fn get_customer_detail(&self, id: CustomerId) -> Result<CustomerDetail, AppError> {
        let customer = self.get_customer(id).await?;
        let transactions = self.repo.list_transactions_for_customer(id).await?;
        let balance = compute_balance(&transactions);

        Ok(CustomerDetail {
            customer,
            balance,
            transactions,
        })
    }

    /// List all customers with balances, highest debt first.
    pub async fn list_customers(&self) -> Result<Vec<CustomerBalance>, AppError> {
        let customers = self.repo.list_customers().await?;
        let balances = self.repo.compute_all_balances().await?;

        let mut entries: Vec<CustomerBalance> = customers
            .into_iter()
            .map(|customer| {
                let balance = balances.get(&customer.id).copied().unwrap_or(0);
                CustomerBalance { customer, balance }
            })
            .collect();

        sort_by_debt(&mut entries);
        Ok(entries)
    }

    /// Update a customer's name, phone or scheduled collection date.
    pub async fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, AppError> {
        let mut customer = self.get_customer(id).await?;

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::InvalidCustomer(
                    crate::domain::CustomerError::EmptyName,
                ));
            }
            customer.name = name;
        }
        if let Some(phone) = update.phone {
            customer.phone = Some(phone);
        }
        if update.clear_next_payment_date {
            customer.next_payment_date = None;
        } else if let Some(date) = update.next_payment_date {
            customer.next_payment_date = Some(date);
        }

        self.repo.update_customer(&customer).await?;
        Ok(customer)
    }

    /// Delete a customer and, by ownership, all of its transactions.
    pub async fn delete_customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        let customer = self.get_customer(id).await?;
        self.repo.delete_customer(id).await?;
        Ok(customer)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a sale or payment on a customer's tab.
    ///
    /// Validation is atomic: a missing customer, a non-positive amount, an
    /// unknown kind or an empty description all reject the operation before
    /// anything is written. On success an auto-backup is dispatched
    /// fire-and-forget; its outcome never reaches this caller.
    pub async fn record_transaction(
        &self,
        customer_id: CustomerId,
        amount: &str,
        kind: &str,
        description: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Transaction, AppError> {
        // Existence first, so a bad reference reads as not-found rather
        // than as a validation failure.
        self.get_customer(customer_id).await?;

        let transaction = Transaction::create(
            customer_id,
            amount,
            kind,
            description,
            timestamp.unwrap_or_else(Utc::now),
        )?;

        self.repo.save_transaction(&transaction).await?;

        self.trigger_auto_backup().await;

        Ok(transaction)
    }

    /// List every transaction in the ledger, oldest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    // ========================
    // Collection operations
    // ========================

    /// Bucket customers into overdue / due today / upcoming relative to
    /// `today` (a UTC calendar date).
    pub async fn collection_schedule(
        &self,
        today: NaiveDate,
    ) -> Result<CollectionSchedule, AppError> {
        let entries = self.list_customers().await?;
        Ok(classify_collections(today, entries))
    }

    /// Exact-date mode: customers to collect from on `date`.
    pub async fn collections_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<CustomerBalance>, AppError> {
        let entries = self.list_customers().await?;
        Ok(collections_due_on(date, entries))
    }

    // ========================
    // Reporting
    // ========================

    /// Dashboard stats: weekly movement and outstanding credit.
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, AppError> {
        let entries = self.list_customers().await?;
        let transactions = self.repo.list_transactions().await?;
        Ok(build_dashboard_stats(&entries, &transactions, now))
    }

    // ========================
    // Settings & backup
    // ========================

    /// Get the settings aggregate, defaulting when never written.
    pub async fn get_settings(&self) -> Result<Settings, AppError> {
        Ok(self.repo.get_settings().await?.unwrap_or_default())
    }

    /// Upsert the settings aggregate (created on first write).
    pub async fn save_settings(&self, settings: Settings) -> Result<Settings, AppError> {
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Send a backup right now. Explicit credentials win; otherwise the
    /// stored settings are used. Unlike auto-backup, failures surface.
    pub async fn send_backup(
        &self,
        email: Option<String>,
        app_password: Option<String>,
    ) -> Result<(), AppError> {
        let settings = self.get_settings().await?;
        let email = email
            .or(settings.email)
            .filter(|e| !e.trim().is_empty())
            .ok_or(AppError::BackupSettingsIncomplete)?;
        let app_password = app_password
            .or(settings.app_password)
            .filter(|p| !p.trim().is_empty())
            .ok_or(AppError::BackupSettingsIncomplete)?;

        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || backup::send_backup(&email, &app_password, &db_path))
            .await
            .map_err(|e| AppError::BackupFailed(e.to_string()))?
            .map_err(|e| AppError::BackupFailed(format!("{:#}", e)))
    }

    /// Fire-and-forget backup dispatch after a successful write. Reading
    /// the settings is the only fallible step and even that only logs.
    async fn trigger_auto_backup(&self) {
        match self.repo.get_settings().await {
            Ok(Some(settings)) if settings.auto_backup_ready() => {
                backup::dispatch_auto_backup(settings, self.db_path.clone());
            }
            Ok(_) => {}
            Err(err) => eprintln!("[Auto-backup] could not read settings: {:#}", err),
        }
    }

    // ========================
    // Seed data
    // ========================

    /// Populate the ledger with a small demo dataset.
    pub async fn seed_demo_data(&self) -> Result<Vec<Customer>, AppError> {
        let now = Utc::now();

        let alice = self
            .create_customer(
                "Alice Silva".into(),
                Some("(11) 99999-9999".into()),
                None,
            )
            .await?;
        self.record_transaction(
            alice.id,
            "150.00",
            "SALE",
            "Vestido de verão",
            Some(now - chrono::Duration::days(5)),
        )
        .await?;
        self.record_transaction(
            alice.id,
            "50.00",
            "PAYMENT",
            "Pagamento parcial",
            Some(now - chrono::Duration::days(2)),
        )
        .await?;

        let bob = self
            .create_customer(
                "Roberto Carlos".into(),
                Some("(21) 88888-8888".into()),
                Some(
                    now.date_naive()
                        .checked_add_days(Days::new(7))
                        .expect("date in range"),
                ),
            )
            .await?;
        self.record_transaction(bob.id, "300.00", "SALE", "Terno completo", None)
            .await?;

        Ok(vec![alice, bob])
    }
}
