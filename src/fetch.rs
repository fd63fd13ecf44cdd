//! Blocking HTTP fetching of documents and JSON-LD contexts

use crate::config::ParserConfig;
use crate::error::{Error, Result};

/// Build the HTTP agent used for every fetch of one parser
pub fn build_agent(config: &ParserConfig) -> ureq::Agent {
    ureq::Agent::new_with_config(
        ureq::Agent::config_builder()
            .timeout_global(Some(std::time::Duration::from_secs(config.timeout_secs)))
            .user_agent(config.user_agent.as_str())
            .build(),
    )
}

/// GET `url` and return the body as text
pub fn fetch_text(agent: &ureq::Agent, url: &str, accept: &str) -> Result<String> {
    tracing::debug!(url, "fetching");

    let fetch_error = |message: String| Error::Fetch {
        url: url.to_string(),
        message,
    };

    match agent.get(url).header("Accept", accept).call() {
        Ok(resp) => {
            if resp.status().is_success() {
                resp.into_body()
                    .read_to_string()
                    .map_err(|e| fetch_error(format!("Failed to read body: {}", e)))
            } else {
                Err(fetch_error(format!("HTTP {}", resp.status())))
            }
        }
        Err(e) => Err(fetch_error(e.to_string())),
    }
}
