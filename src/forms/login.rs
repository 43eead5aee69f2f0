use thiserror::Error;

use super::{is_exact_digits, FieldErrors, FormState};
use crate::api::{BankApi, LoginResponse};
use crate::format::digits_only;
use crate::session::{SessionStorage, SessionStore};

pub const AGENCY_LEN: usize = 4;
pub const ACCOUNT_NUMBER_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Agência ou conta inválida. Verifique seus dados.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoginField {
    Agency,
    AccountNumber,
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Dados de acesso inválidos")]
    Invalid(FieldErrors<LoginField>),
    /// Whatever the API said, the user only gets told the credentials are wrong.
    #[error("Agência ou conta inválida. Verifique seus dados.")]
    InvalidCredentials,
    #[error("Falha ao salvar a sessão")]
    Session(#[source] anyhow::Error),
}

pub fn validate_agency(agency: &str) -> Option<&'static str> {
    if agency.trim().is_empty() {
        Some("Agência é obrigatória")
    } else if !is_exact_digits(agency, AGENCY_LEN) {
        Some("Agência deve ter 4 dígitos")
    } else {
        None
    }
}

pub fn validate_account_number(account_number: &str) -> Option<&'static str> {
    if account_number.trim().is_empty() {
        Some("Número da conta é obrigatório")
    } else if !is_exact_digits(account_number, ACCOUNT_NUMBER_LEN) {
        Some("Conta deve ter 6 dígitos")
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    agency: String,
    account_number: String,
    state: FormState<LoginResponse, LoginField>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-digits are dropped and the result is capped at [AGENCY_LEN] digits.
    pub fn set_agency(&mut self, input: &str) {
        self.agency = digits_only(input, AGENCY_LEN);
    }

    /// Non-digits are dropped and the result is capped at [ACCOUNT_NUMBER_LEN] digits.
    pub fn set_account_number(&mut self, input: &str) {
        self.account_number = digits_only(input, ACCOUNT_NUMBER_LEN);
    }

    pub fn agency(&self) -> &str {
        &self.agency
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn state(&self) -> &FormState<LoginResponse, LoginField> {
        &self.state
    }

    pub fn validate(&self) -> FieldErrors<LoginField> {
        let mut errors = FieldErrors::new();
        errors.check(LoginField::Agency, validate_agency(&self.agency));
        errors.check(
            LoginField::AccountNumber,
            validate_account_number(&self.account_number),
        );
        errors
    }

    /// Logs in and, on success, replaces the session with the account that
    /// was logged into.
    pub async fn submit<S: SessionStorage>(
        &mut self,
        api: &dyn BankApi,
        session: &mut SessionStore<S>,
    ) -> Result<LoginResponse, LoginError> {
        let errors = self.validate();
        if !errors.is_empty() {
            self.state = FormState::Invalid(errors.clone());
            return Err(LoginError::Invalid(errors));
        }

        let response = match api.login(&self.agency, &self.account_number).await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("Login failed: {err}");
                self.state = FormState::Failed(INVALID_CREDENTIALS);
                return Err(LoginError::InvalidCredentials);
            }
        };

        if let Err(err) = session.login(&response).await {
            self.state = FormState::Editing;
            return Err(LoginError::Session(err));
        }
        self.state = FormState::Success(response.clone());
        Ok(response)
    }
}
