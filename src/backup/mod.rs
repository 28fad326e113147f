use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};

use crate::domain::Settings;

const SMTP_RELAY: &str = "smtp.gmail.com";
const ATTACHMENT_NAME: &str = "fiado_backup.db";

/// Mail the database file to the owner's own address. Blocking: callers on
/// the async runtime wrap this in `spawn_blocking`.
pub fn send_backup(email: &str, app_password: &str, db_path: &Path) -> Result<()> {
    if email.trim().is_empty() || app_password.trim().is_empty() {
        anyhow::bail!("Email and app password are required for backup");
    }

    let db_bytes = std::fs::read(db_path)
        .with_context(|| format!("Database file not found at {}", db_path.display()))?;

    let mailbox: Mailbox = email
        .parse()
        .with_context(|| format!("Invalid email address: {}", email))?;

    let attachment = Attachment::new(ATTACHMENT_NAME.to_string()).body(
        db_bytes,
        ContentType::parse("application/octet-stream").expect("static content type"),
    );

    let message = Message::builder()
        .from(mailbox.clone())
        .to(mailbox)
        .subject(format!("Fiado backup - {}", Utc::now().format("%Y-%m-%d")))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(
                    "Attached is the backup of your ledger database.".to_string(),
                ))
                .singlepart(attachment),
        )
        .context("Failed to build backup message")?;

    let mailer = SmtpTransport::relay(SMTP_RELAY)
        .context("Invalid SMTP relay host")?
        .credentials(Credentials::new(
            email.to_string(),
            app_password.to_string(),
        ))
        .build();

    mailer.send(&message).context("Failed to send backup email")?;
    Ok(())
}

/// Auto-backup after a mutation. Skips quietly when settings are missing or
/// the flag is off; a delivery failure is reported on stderr and swallowed
/// so it can never fail the write that triggered it.
pub fn perform_auto_backup(settings: &Settings, db_path: &Path) {
    if !settings.auto_backup_ready() {
        return;
    }

    // auto_backup_ready guarantees both credentials are present
    let email = settings.email.as_deref().unwrap_or_default();
    let app_password = settings.app_password.as_deref().unwrap_or_default();

    if let Err(err) = send_backup(email, app_password, db_path) {
        eprintln!("[Auto-backup] failed: {:#}", err);
    }
}

/// Spawn the auto-backup on a detached blocking task. Fire-and-forget: the
/// caller's request returns without waiting on mail delivery.
pub fn dispatch_auto_backup(settings: Settings, db_path: PathBuf) {
    tokio::task::spawn_blocking(move || perform_auto_backup(&settings, &db_path));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_backup_requires_credentials() {
        let result = send_backup("", "secret", Path::new("/tmp/none.db"));
        assert!(result.is_err());

        let result = send_backup("shop@example.com", "  ", Path::new("/tmp/none.db"));
        assert!(result.is_err());
    }

    #[test]
    fn test_send_backup_requires_database_file() {
        let result = send_backup(
            "shop@example.com",
            "app-password",
            Path::new("/definitely/not/here.db"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_auto_backup_skips_when_unconfigured() {
        // Must not attempt any I/O or panic with default settings.
        perform_auto_backup(&Settings::default(), Path::new("/tmp/none.db"));
    }
}
