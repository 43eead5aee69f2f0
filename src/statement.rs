use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::api::{ApiError, BankApi};
use crate::format::format_date_for_api;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Credit,
    Debit,
    /// Running total snapshot inserted by the bank, not a money movement.
    Balance,
}

impl EntryType {
    pub fn code(self) -> &'static str {
        match self {
            EntryType::Credit => "CREDIT",
            EntryType::Debit => "DEBIT",
            EntryType::Balance => "BALANCE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryType::Credit => "Crédito",
            EntryType::Debit => "Débito",
            EntryType::Balance => "Saldo",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown entry type '{0}', expected one of CREDIT, DEBIT, BALANCE")]
pub struct UnknownEntryType(pub String);

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREDIT" => Ok(EntryType::Credit),
            "DEBIT" => Ok(EntryType::Debit),
            "BALANCE" => Ok(EntryType::Balance),
            _ => Err(UnknownEntryType(s.to_string())),
        }
    }
}

/// One line of an account statement as returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatementEntry {
    #[serde(alias = "transactionId")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Kept as the raw wire code so categories this client doesn't know
    /// about still display.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl StatementEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        // The secondary date, when the bank sends one, is the day the entry refers to.
        self.date.unwrap_or(self.created_at)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Server-side statement query. Only the filters that are set get sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub entry_type: Option<EntryType>,
}

impl StatementFilter {
    pub fn only(entry_type: EntryType) -> Self {
        Self {
            entry_type: Some(entry_type),
            ..Self::default()
        }
    }

    /// First day of `today`'s month up to and including `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start_date: Some(today.with_day(1).unwrap_or(today)),
            end_date: Some(today),
            entry_type: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some() || self.entry_type.is_some()
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(start_date) = self.start_date {
            params.push(("startDate", format_date_for_api(start_date)));
        }
        if let Some(end_date) = self.end_date {
            params.push(("endDate", format_date_for_api(end_date)));
        }
        if let Some(entry_type) = self.entry_type {
            params.push(("type", entry_type.code().to_string()));
        }
        params
    }
}

/// Entries to show in the statement list: balance snapshots removed, most
/// recent first. Entries with the same timestamp keep their arrival order.
pub fn transaction_list(entries: impl IntoIterator<Item = StatementEntry>) -> Vec<StatementEntry> {
    let mut list: Vec<StatementEntry> = entries
        .into_iter()
        .filter(|entry| entry.entry_type != EntryType::Balance)
        .collect();
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    list
}

/// Amount of the most recent balance snapshot, or zero if there is none.
pub fn latest_balance(entries: &[StatementEntry]) -> Decimal {
    entries
        .iter()
        .filter(|entry| entry.entry_type == EntryType::Balance)
        .max_by_key(|entry| entry.timestamp())
        .map(|entry| entry.amount)
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthSummary {
    pub credits: Decimal,
    pub debits: Decimal,
}

pub fn month_summary(entries: &[StatementEntry]) -> MonthSummary {
    entries
        .iter()
        .fold(MonthSummary::default(), |mut summary, entry| {
            match entry.entry_type {
                EntryType::Credit => summary.credits += entry.amount,
                EntryType::Debit => summary.debits += entry.amount,
                EntryType::Balance => {}
            }
            summary
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceCard {
    pub balance: Decimal,
    pub month: MonthSummary,
}

/// Loads the current balance, then this month's movements.
pub async fn load_balance_card(
    api: &dyn BankApi,
    account_id: &str,
    today: NaiveDate,
) -> Result<BalanceCard, ApiError> {
    let balance = api.get_balance(account_id).await?;
    let entries = api
        .get_statement(account_id, &StatementFilter::month_to_date(today))
        .await?;
    Ok(BalanceCard {
        balance,
        month: month_summary(&entries),
    })
}
