use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{client::KeysBankClient, error::ApiError};
use crate::category::Category;
use crate::statement::{EntryType, StatementEntry, UnknownEntryType};

/// The entry types a customer can create. BALANCE entries only come from the bank.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[default]
    Credit,
    Debit,
}

impl From<TransactionType> for EntryType {
    fn from(ty: TransactionType) -> Self {
        match ty {
            TransactionType::Credit => EntryType::Credit,
            TransactionType::Debit => EntryType::Debit,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&EntryType::from(*self), f)
    }
}

impl FromStr for TransactionType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<EntryType>()? {
            EntryType::Credit => Ok(TransactionType::Credit),
            EntryType::Debit => Ok(TransactionType::Debit),
            EntryType::Balance => Err(UnknownEntryType(s.to_string())),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub account_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Category,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
}

/// Returns the created record, which has the same shape as a statement entry.
pub async fn create_transaction(
    client: &KeysBankClient,
    request: &CreateTransactionRequest,
) -> Result<StatementEntry, ApiError> {
    log::info!("Creating transaction...");

    let url = client.endpoint(&["transaction"]);
    let created: StatementEntry = client
        .send(client.http().post(url).json(request))
        .await?;

    log::info!("Creating transaction...done");
    Ok(created)
}
