use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    client::{with_query, KeysBankClient},
    error::ApiError,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest<'a> {
    customer_id: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub customer_id: String,
    pub agency: String,
    pub account_number: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Identity of the account a login succeeded for. This is also what gets
/// saved as the session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub account_id: String,
    pub agency: String,
    pub account_number: String,
    pub customer_name: String,
}

pub async fn create_account(
    client: &KeysBankClient,
    customer_id: &str,
) -> Result<Account, ApiError> {
    log::info!("Creating account...");

    let url = client.endpoint(&["accounts"]);
    let account: Account = client
        .send(client.http().post(url).json(&CreateAccountRequest { customer_id }))
        .await?;

    log::info!("Creating account...done");
    Ok(account)
}

pub async fn login(
    client: &KeysBankClient,
    agency: &str,
    account_number: &str,
) -> Result<LoginResponse, ApiError> {
    log::info!("Logging in...");

    let url = login_url(client, agency, account_number);
    let response: LoginResponse = client.send(client.http().get(url)).await?;

    log::info!("Logging in...done");
    Ok(response)
}

fn login_url(client: &KeysBankClient, agency: &str, account_number: &str) -> reqwest::Url {
    with_query(
        client.endpoint(&["accounts", "login"]),
        &[
            ("agency", agency.to_string()),
            ("accountNumber", account_number.to_string()),
        ],
    )
}
