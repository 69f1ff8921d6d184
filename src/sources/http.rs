//! Blocking HTTP access shared by the providers, plus the small amount of
//! HTML digging they need.

use crate::error::LyricsError;
use log::debug;
use select::node::Node;
use select::predicate::Name;
use serde::de::DeserializeOwned;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            agent,
            user_agent: user_agent.to_string(),
        }
    }

    pub fn get_text(&self, url: &str) -> Result<String, LyricsError> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .set("User-Agent", &self.user_agent)
            .call()?;
        Ok(response.into_string()?)
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LyricsError> {
        debug!("GET {url} (json)");
        let response = self
            .agent
            .get(url)
            .set("User-Agent", &self.user_agent)
            .set("Accept", "application/json")
            .call()?;
        Ok(response.into_json::<T>()?)
    }
}

/// Text of `node` as a browser would lay it out: `<br>` becomes a newline,
/// every other element contributes only its text.
pub fn rendered_text(node: Node) -> String {
    let mut out = String::new();
    push_rendered(node, &mut out);
    out
}

fn push_rendered(node: Node, out: &mut String) {
    for child in node.children() {
        if let Some(text) = child.as_text() {
            out.push_str(&text.replace('\u{a0}', " "));
        } else if child.is(Name("br")) {
            out.push('\n');
        } else {
            push_rendered(child, out);
        }
    }
}

/// Text nodes that are direct children of `node`, skipping nested elements.
pub fn direct_text(node: Node) -> String {
    node.children()
        .filter_map(|child| child.as_text())
        .map(|text| text.replace('\u{a0}', " "))
        .collect()
}
