use super::{
    client::{with_query, KeysBankClient},
    error::ApiError,
};
use crate::statement::{StatementEntry, StatementFilter};

pub async fn get_statement(
    client: &KeysBankClient,
    account_id: &str,
    filter: &StatementFilter,
) -> Result<Vec<StatementEntry>, ApiError> {
    log::info!("Requesting statement...");

    let url = statement_url(client, account_id, filter);
    let entries: Vec<StatementEntry> = client.send(client.http().get(url)).await?;

    log::info!("Requesting statement...done ({} entries)", entries.len());
    Ok(entries)
}

fn statement_url(
    client: &KeysBankClient,
    account_id: &str,
    filter: &StatementFilter,
) -> reqwest::Url {
    with_query(
        client.endpoint(&["accounts", account_id, "statement"]),
        &filter.query_params(),
    )
}
