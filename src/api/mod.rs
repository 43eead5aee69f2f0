use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::statement::{latest_balance, EntryType, StatementEntry, StatementFilter};

mod accounts;
mod client;
mod customers;
mod error;
mod statement;
mod transactions;

#[cfg(test)]
pub(crate) mod testutils;

pub use accounts::{create_account, login, Account, LoginResponse};
pub use client::KeysBankClient;
pub use customers::{create_customer, CreateCustomerRequest, Customer};
pub use error::{ApiError, ApiErrorKind};
pub use statement::get_statement;
pub use transactions::{create_transaction, CreateTransactionRequest, TransactionType};

/// Everything the client needs from the bank. Implemented by
/// [KeysBankClient] over HTTP.
#[async_trait]
pub trait BankApi: Send + Sync {
    async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<Customer, ApiError>;

    async fn create_account(&self, customer_id: &str) -> Result<Account, ApiError>;

    async fn login(&self, agency: &str, account_number: &str) -> Result<LoginResponse, ApiError>;

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<StatementEntry, ApiError>;

    async fn get_statement(
        &self,
        account_id: &str,
        filter: &StatementFilter,
    ) -> Result<Vec<StatementEntry>, ApiError>;

    /// There is no balance endpoint. The balance is the amount of the most
    /// recent BALANCE entry in the statement, which means downloading every
    /// snapshot the account ever had.
    async fn get_balance(&self, account_id: &str) -> Result<Decimal, ApiError> {
        let snapshots = self
            .get_statement(account_id, &StatementFilter::only(EntryType::Balance))
            .await?;
        Ok(latest_balance(&snapshots))
    }
}

#[async_trait]
impl BankApi for KeysBankClient {
    async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<Customer, ApiError> {
        create_customer(self, request).await
    }

    async fn create_account(&self, customer_id: &str) -> Result<Account, ApiError> {
        create_account(self, customer_id).await
    }

    async fn login(&self, agency: &str, account_number: &str) -> Result<LoginResponse, ApiError> {
        login(self, agency, account_number).await
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<StatementEntry, ApiError> {
        create_transaction(self, request).await
    }

    async fn get_statement(
        &self,
        account_id: &str,
        filter: &StatementFilter,
    ) -> Result<Vec<StatementEntry>, ApiError> {
        get_statement(self, account_id, filter).await
    }
}
