use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Cents, Customer, CustomerId, SETTINGS_ID, Settings, Transaction, TransactionKind,
};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying customers, transactions and
/// settings.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Customer operations
    // ========================

    /// Save a new customer to the database.
    pub async fn save_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, next_payment_date, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer.id.to_string())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.next_payment_date.map(|d| d.to_string()))
        .bind(customer.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save customer")?;
        Ok(())
    }

    /// Get a customer by ID.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, phone, next_payment_date, created_at
            FROM customers
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch customer")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_customer(&row)?)),
            None => Ok(None),
        }
    }

    /// List all customers, ordered by name.
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, phone, next_payment_date, created_at
            FROM customers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list customers")?;

        rows.iter().map(Self::row_to_customer).collect()
    }

    /// Update a customer's editable fields (name, phone, next payment date).
    pub async fn update_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, phone = ?, next_payment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.next_payment_date.map(|d| d.to_string()))
        .bind(customer.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update customer")?;
        Ok(())
    }

    /// Delete a customer and all of its transactions in one SQL transaction.
    /// The customer owns its transactions, so removal cascades.
    pub async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin delete transaction")?;

        sqlx::query("DELETE FROM transactions WHERE customer_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete customer transactions")?;

        sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete customer")?;

        tx.commit()
            .await
            .context("Failed to commit customer deletion")?;
        Ok(())
    }

    fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer> {
        let id_str: String = row.get("id");
        let next_payment_date_str: Option<String> = row.get("next_payment_date");
        let created_at_str: String = row.get("created_at");

        Ok(Customer {
            id: Uuid::parse_str(&id_str).context("Invalid customer ID")?,
            name: row.get("name"),
            phone: row.get("phone"),
            next_payment_date: next_payment_date_str
                .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
                .transpose()
                .context("Invalid next_payment_date")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction to the database.
    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, customer_id, amount_cents, kind, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(transaction.customer_id.to_string())
        .bind(transaction.amount_cents)
        .bind(transaction.kind.as_str())
        .bind(&transaction.description)
        .bind(transaction.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// List a customer's transactions, newest first (detail view order).
    pub async fn list_transactions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, amount_cents, kind, description, created_at
            FROM transactions
            WHERE customer_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for customer")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List all transactions, oldest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, amount_cents, kind, description, created_at
            FROM transactions
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Compute balances for all customers in a single query.
    /// Customers with no transactions won't be in the map (balance = 0).
    pub async fn compute_all_balances(
        &self,
    ) -> Result<std::collections::HashMap<CustomerId, Cents>> {
        let rows = sqlx::query(
            r#"
            SELECT
                customer_id,
                SUM(CASE WHEN kind = 'SALE' THEN amount_cents ELSE -amount_cents END) as balance
            FROM transactions
            GROUP BY customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute all balances")?;

        let mut balances = std::collections::HashMap::new();
        for row in rows {
            let customer_id_str: String = row.get("customer_id");
            let balance: Cents = row.get("balance");
            let customer_id =
                Uuid::parse_str(&customer_id_str).context("Invalid customer ID")?;
            balances.insert(customer_id, balance);
        }

        Ok(balances)
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let customer_id_str: String = row.get("customer_id");
        let kind_str: String = row.get("kind");
        let created_at_str: String = row.get("created_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            customer_id: Uuid::parse_str(&customer_id_str).context("Invalid customer ID")?,
            amount_cents: row.get("amount_cents"),
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            description: row.get("description"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Settings operations
    // ========================

    /// Get the singleton settings row, if one has been written yet.
    pub async fn get_settings(&self) -> Result<Option<Settings>> {
        let row = sqlx::query(
            r#"
            SELECT email, app_password, auto_backup
            FROM settings
            WHERE id = ?
            "#,
        )
        .bind(SETTINGS_ID)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch settings")?;

        match row {
            Some(row) => Ok(Some(Settings {
                email: row.get("email"),
                app_password: row.get("app_password"),
                auto_backup: row.get::<i32, _>("auto_backup") != 0,
            })),
            None => Ok(None),
        }
    }

    /// Upsert the singleton settings row (created on first write).
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, email, app_password, auto_backup)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE
            SET email = excluded.email,
                app_password = excluded.app_password,
                auto_backup = excluded.auto_backup
            "#,
        )
        .bind(SETTINGS_ID)
        .bind(&settings.email)
        .bind(&settings.app_password)
        .bind(settings.auto_backup)
        .execute(&self.pool)
        .await
        .context("Failed to save settings")?;
        Ok(())
    }
}
