//! Run-start bootstrap: resolve configured account codes to accounts.
//!
//! Every fallback/control account is resolved once before the first
//! mutation is touched; a missing required account is a fatal
//! configuration error (no mutation could possibly succeed). The suspense
//! and balancing accounts are the documented exceptions that may be
//! auto-created.

use boekstroom_core::classify::{FallbackAccounts, ResolvedAccount};
use boekstroom_core::ledger::AccountType;
use boekstroom_shared::config::FallbackAccountCodes;
use boekstroom_store::{LedgerStore, NewAccount, StoreError};

use super::error::EngineError;

/// Resolves the configured account codes against the ledger store.
///
/// # Errors
///
/// Returns [`EngineError::Config`] when a required account is missing or
/// the balancing account is not an equity account.
pub async fn resolve_fallback_accounts(
    ledger: &dyn LedgerStore,
    codes: &FallbackAccountCodes,
) -> Result<FallbackAccounts, EngineError> {
    let suspense = get_or_create(
        ledger,
        &codes.suspense,
        "Import suspense",
        AccountType::Asset,
    )
    .await?;
    let balancing = get_or_create(
        ledger,
        &codes.balancing,
        "Opening balance differences",
        AccountType::Equity,
    )
    .await?;
    if balancing.account_type != AccountType::Equity {
        return Err(EngineError::Config(format!(
            "balancing account {} must be an equity account",
            codes.balancing
        )));
    }

    let fallbacks = FallbackAccounts {
        suspense,
        balancing,
        bank: require(ledger, &codes.bank).await?,
        income: require(ledger, &codes.income).await?,
        expense: require(ledger, &codes.expense).await?,
        receivable: require(ledger, &codes.receivable).await?,
        payable: require(ledger, &codes.payable).await?,
        vat_payable: optional(ledger, codes.vat_payable.as_deref()).await?,
        vat_receivable: optional(ledger, codes.vat_receivable.as_deref()).await?,
    };
    Ok(fallbacks)
}

async fn require(
    ledger: &dyn LedgerStore,
    code: &str,
) -> Result<ResolvedAccount, EngineError> {
    let info = ledger
        .find_account_by_code(code)
        .await?
        .ok_or_else(|| EngineError::Config(format!("account {code} does not exist")))?;
    if info.is_group {
        return Err(EngineError::Config(format!(
            "account {code} is a group account"
        )));
    }
    Ok(ResolvedAccount {
        account: info.id,
        account_type: info.account_type,
    })
}

async fn optional(
    ledger: &dyn LedgerStore,
    code: Option<&str>,
) -> Result<Option<ResolvedAccount>, EngineError> {
    match code {
        Some(code) => Ok(Some(require(ledger, code).await?)),
        None => Ok(None),
    }
}

async fn get_or_create(
    ledger: &dyn LedgerStore,
    code: &str,
    name: &str,
    account_type: AccountType,
) -> Result<ResolvedAccount, EngineError> {
    if let Some(info) = ledger.find_account_by_code(code).await? {
        return Ok(ResolvedAccount {
            account: info.id,
            account_type: info.account_type,
        });
    }
    match ledger
        .create_account(NewAccount {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
        })
        .await
    {
        Ok(info) => Ok(ResolvedAccount {
            account: info.id,
            account_type: info.account_type,
        }),
        // Lost a creation race; the winner's row is authoritative.
        Err(StoreError::Conflict(_)) => require(ledger, code).await,
        Err(err) => Err(err.into()),
    }
}
