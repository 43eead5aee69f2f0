use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{client::KeysBankClient, error::ApiError};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fails with [super::ApiErrorKind::EmailInUse] if the e-mail is taken.
pub async fn create_customer(
    client: &KeysBankClient,
    request: &CreateCustomerRequest,
) -> Result<Customer, ApiError> {
    log::info!("Creating customer...");

    let url = client.endpoint(&["customers"]);
    let customer: Customer = client
        .send(client.http().post(url).json(request))
        .await
        .map_err(ApiError::classify_customer_conflict)?;

    log::info!("Creating customer...done");
    Ok(customer)
}
