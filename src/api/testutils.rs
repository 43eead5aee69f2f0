use async_trait::async_trait;
use std::sync::Mutex;

use super::{
    Account, ApiError, BankApi, CreateCustomerRequest, CreateTransactionRequest, Customer,
    LoginResponse,
};
use crate::statement::{StatementEntry, StatementFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateCustomer(CreateCustomerRequest),
    CreateAccount(String),
    Login(String, String),
    CreateTransaction(CreateTransactionRequest),
    GetStatement(String, StatementFilter),
}

/// In-memory bank with canned responses that records every call it gets.
/// Statement queries are filtered the way the server does it.
pub struct FakeBank {
    customer: Result<Customer, ApiError>,
    account: Result<Account, ApiError>,
    login: Result<LoginResponse, ApiError>,
    transaction: Result<StatementEntry, ApiError>,
    statement: Result<Vec<StatementEntry>, ApiError>,
    calls: Mutex<Vec<Call>>,
}

fn not_configured() -> ApiError {
    ApiError::from_response(501, Some("not configured in test".to_string()))
}

impl FakeBank {
    pub fn new() -> Self {
        Self {
            customer: Err(not_configured()),
            account: Err(not_configured()),
            login: Err(not_configured()),
            transaction: Err(not_configured()),
            statement: Ok(vec![]),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn with_customer(mut self, customer: Result<Customer, ApiError>) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_account(mut self, account: Result<Account, ApiError>) -> Self {
        self.account = account;
        self
    }

    pub fn with_login(mut self, login: Result<LoginResponse, ApiError>) -> Self {
        self.login = login;
        self
    }

    pub fn with_transaction(mut self, transaction: Result<StatementEntry, ApiError>) -> Self {
        self.transaction = transaction;
        self
    }

    pub fn with_statement(mut self, entries: Vec<StatementEntry>) -> Self {
        self.statement = Ok(entries);
        self
    }

    pub fn with_statement_error(mut self, err: ApiError) -> Self {
        self.statement = Err(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn passes_filter(entry: &StatementEntry, filter: &StatementFilter) -> bool {
    let day = entry.created_at.date_naive();
    filter.start_date.map_or(true, |start| day >= start)
        && filter.end_date.map_or(true, |end| day <= end)
        && filter.entry_type.map_or(true, |ty| ty == entry.entry_type)
}

#[async_trait]
impl BankApi for FakeBank {
    async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<Customer, ApiError> {
        self.record(Call::CreateCustomer(request.clone()));
        self.customer.clone()
    }

    async fn create_account(&self, customer_id: &str) -> Result<Account, ApiError> {
        self.record(Call::CreateAccount(customer_id.to_string()));
        self.account.clone()
    }

    async fn login(&self, agency: &str, account_number: &str) -> Result<LoginResponse, ApiError> {
        self.record(Call::Login(agency.to_string(), account_number.to_string()));
        self.login.clone()
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<StatementEntry, ApiError> {
        self.record(Call::CreateTransaction(request.clone()));
        self.transaction.clone()
    }

    async fn get_statement(
        &self,
        account_id: &str,
        filter: &StatementFilter,
    ) -> Result<Vec<StatementEntry>, ApiError> {
        self.record(Call::GetStatement(account_id.to_string(), filter.clone()));
        let entries = self.statement.clone()?;
        Ok(entries
            .into_iter()
            .filter(|entry| passes_filter(entry, filter))
            .collect())
    }
}

pub fn login_response() -> LoginResponse {
    LoginResponse {
        account_id: "u1".to_string(),
        agency: "0001".to_string(),
        account_number: "343316".to_string(),
        customer_name: "X".to_string(),
    }
}
