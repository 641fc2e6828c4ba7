//! Application configuration management.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// External bookkeeping API configuration.
    pub source: SourceConfig,
    /// Durable engine state storage configuration.
    pub storage: StorageConfig,
    /// Import run configuration.
    pub import: ImportConfig,
}

/// External bookkeeping API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API token used to open a session.
    pub api_token: String,
    /// Page size for paginated endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    "https://api.e-boekhouden.nl".to_string()
}

fn default_page_size() -> u32 {
    500
}

/// Durable engine state storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for cached mutations, mappings, and run reports.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

/// Import run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Target company name, recorded on every committed transaction.
    pub company: String,
    /// Lower bound of the mutation date range (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Upper bound of the mutation date range (inclusive).
    pub date_to: Option<NaiveDate>,
    /// When true, classify and validate but never commit.
    #[serde(default)]
    pub dry_run: bool,
    /// Chart-of-accounts seed file for the reference in-memory ledger
    /// store. Production deployments wire a real ledger store instead.
    pub chart_file: Option<String>,
    /// Fallback and control account codes in the target chart of accounts.
    pub accounts: FallbackAccountCodes,
}

/// Account codes for fallback and control accounts.
///
/// Codes refer to the target system's chart of accounts; they are resolved
/// to account IDs once at run start, and a missing code is a fatal
/// configuration error.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackAccountCodes {
    /// Suspense account for unmapped ledger codes.
    pub suspense: String,
    /// Equity account absorbing opening balance residuals.
    pub balancing: String,
    /// Default bank/cash account for payment mutations.
    pub bank: String,
    /// Default income account for unmapped sales rows.
    pub income: String,
    /// Default expense account for unmapped purchase rows.
    pub expense: String,
    /// Accounts receivable control account.
    pub receivable: String,
    /// Accounts payable control account.
    pub payable: String,
    /// VAT payable account (required only when mutations carry VAT lines).
    pub vat_payable: Option<String>,
    /// VAT receivable account (required only when mutations carry VAT lines).
    pub vat_receivable: Option<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BOEKSTROOM").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Validates that every field required to start a run is present.
    ///
    /// Called before any mutation is touched; a failure here means no
    /// mutation could possibly succeed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] naming the first missing field.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("source.api_token", &self.source.api_token),
            ("import.company", &self.import.company),
            ("import.accounts.suspense", &self.import.accounts.suspense),
            ("import.accounts.balancing", &self.import.accounts.balancing),
            ("import.accounts.bank", &self.import.accounts.bank),
            ("import.accounts.income", &self.import.accounts.income),
            ("import.accounts.expense", &self.import.accounts.expense),
            ("import.accounts.receivable", &self.import.accounts.receivable),
            ("import.accounts.payable", &self.import.accounts.payable),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("{name} is not set")));
            }
        }
        if self.source.page_size == 0 {
            return Err(AppError::Configuration(
                "source.page_size must be positive".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (self.import.date_from, self.import.date_to) {
            if from > to {
                return Err(AppError::Configuration(format!(
                    "import.date_from {from} is after import.date_to {to}"
                )));
            }
        }
        Ok(())
    }
}
