use std::time::Duration;

use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("betsmarter_terminal/", env!("CARGO_PKG_VERSION"));

/// Fresh blocking client. Called again on reconnect so a dropped keep-alive
/// pool is not reused.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}
