use std::time::Duration;

use reqwest::{Client, Error as RequestError};
use tracing::{instrument, Level};
use url::Url;

pub fn make_client(timeout: Duration) -> Result<Client, RequestError> {
    Client::builder()
        .gzip(true)
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Raw markup of the menu page. Network failures and non-2xx statuses are
/// both errors; nothing here retries.
#[instrument(skip(client, url), fields(url = %url), level = Level::TRACE)]
pub async fn menu_page(client: &Client, url: &Url) -> Result<String, RequestError> {
    let start = std::time::Instant::now();
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    let text = response.text().await?;
    log::debug!(
        "fetched {} bytes from {url} in {:?}",
        text.len(),
        start.elapsed()
    );
    Ok(text)
}
