use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Customer, Transaction, format_cents};

/// Database snapshot for full export. Settings are deliberately left out:
/// they carry the mail credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to portable formats.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export customers with balances to CSV, highest debt first.
    pub async fn export_customers_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.list_customers().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "name", "phone", "next_payment_date", "balance"])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record([
                entry.customer.id.to_string(),
                entry.customer.name.clone(),
                entry.customer.phone.clone().unwrap_or_default(),
                entry
                    .customer
                    .next_payment_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                format_cents(entry.balance),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export all transactions to CSV, oldest first.
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.service.list_transactions().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "customer_id",
            "created_at",
            "kind",
            "amount",
            "description",
        ])?;

        let mut count = 0;
        for tx in &transactions {
            csv_writer.write_record([
                tx.id.to_string(),
                tx.customer_id.to_string(),
                tx.created_at.to_rfc3339(),
                tx.kind.as_str().to_string(),
                format_cents(tx.amount_cents),
                tx.description.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot.
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<DatabaseSnapshot> {
        let customers = self
            .service
            .list_customers()
            .await?
            .into_iter()
            .map(|e| e.customer)
            .collect();
        let transactions = self.service.list_transactions().await?;

        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            customers,
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
