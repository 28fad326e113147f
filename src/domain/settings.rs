use serde::{Deserialize, Serialize};

/// Row id of the singleton settings record. There is exactly one settings
/// aggregate per database, created on first write.
pub const SETTINGS_ID: &str = "default";

/// Backup configuration: where to mail database snapshots and whether to do
/// it automatically after each transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub email: Option<String>,
    /// App-specific password for the mail provider, not the account password.
    pub app_password: Option<String>,
    pub auto_backup: bool,
}

impl Settings {
    /// Credentials present and auto-backup switched on.
    pub fn auto_backup_ready(&self) -> bool {
        self.auto_backup
            && self.email.as_deref().is_some_and(|e| !e.is_empty())
            && self.app_password.as_deref().is_some_and(|p| !p.is_empty())
    }
}
