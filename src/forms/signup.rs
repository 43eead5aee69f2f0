use thiserror::Error;

use super::{char_len, FieldErrors, FormState};
use crate::api::{Account, ApiError, ApiErrorKind, BankApi, CreateCustomerRequest};

const NAME_MIN_LEN: usize = 3;
const NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignupField {
    Name,
    Email,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignupError {
    #[error("Dados de cadastro inválidos")]
    Invalid(FieldErrors<SignupField>),
    #[error("Este email já está em uso. Tente outro.")]
    EmailInUse,
    #[error("Erro ao criar conta. Tente novamente.")]
    Other,
}

impl From<ApiError> for SignupError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            ApiErrorKind::EmailInUse => SignupError::EmailInUse,
            _ => SignupError::Other,
        }
    }
}

pub fn validate_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        Some("Nome é obrigatório")
    } else if char_len(name) < NAME_MIN_LEN {
        Some("Nome deve ter pelo menos 3 caracteres")
    } else if char_len(name) > NAME_MAX_LEN {
        Some("Nome deve ter no máximo 100 caracteres")
    } else {
        None
    }
}

pub fn validate_email(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some("Email é obrigatório")
    } else if !looks_like_email(email) {
        Some("Email inválido")
    } else {
        None
    }
}

// local@domain.tld with no whitespace and a single '@'
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .char_indices()
            .any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}

#[derive(Debug, Default)]
pub struct SignupForm {
    name: String,
    email: String,
    state: FormState<Account, SignupField>,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn state(&self) -> &FormState<Account, SignupField> {
        &self.state
    }

    pub fn validate(&self) -> FieldErrors<SignupField> {
        let mut errors = FieldErrors::new();
        errors.check(SignupField::Name, validate_name(&self.name));
        errors.check(SignupField::Email, validate_email(&self.email));
        errors
    }

    /// Creates the customer and then their account. The returned account
    /// carries the agency and account number the customer needs to log in;
    /// signing up does not log in.
    pub async fn submit(&mut self, api: &dyn BankApi) -> Result<Account, SignupError> {
        let errors = self.validate();
        if !errors.is_empty() {
            self.state = FormState::Invalid(errors.clone());
            return Err(SignupError::Invalid(errors));
        }

        match self.create_customer_and_account(api).await {
            Ok(account) => {
                self.state = FormState::Success(account.clone());
                Ok(account)
            }
            Err(err) => {
                log::warn!("Signup failed: {err}");
                let err = SignupError::from(err);
                self.state = FormState::Failed(match err {
                    SignupError::EmailInUse => "Este email já está em uso. Tente outro.",
                    _ => "Erro ao criar conta. Tente novamente.",
                });
                Err(err)
            }
        }
    }

    async fn create_customer_and_account(&self, api: &dyn BankApi) -> Result<Account, ApiError> {
        let request = CreateCustomerRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
        };
        let customer = api.create_customer(&request).await?;
        api.create_account(&customer.id).await
    }
}
