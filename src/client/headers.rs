use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use super::{ClientError, ClientResult};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANG: &str = "en-US,en;q=0.5";

/// Rotates browser-like request headers across a fixed pool of user agents.
#[derive(Clone, Debug)]
pub struct HeaderRotation {
    user_agents: Vec<String>,
}

impl HeaderRotation {
    pub fn new(user_agents: Vec<String>) -> ClientResult<Self> {
        if user_agents.is_empty() {
            return Err(ClientError::Config(
                "at least one user agent must be configured".to_string(),
            ));
        }
        Ok(Self { user_agents })
    }

    /// Pick a user agent uniformly at random.
    pub fn user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(self.user_agent()) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANG));
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_picks_from_pool() {
        let pool = vec!["ua-a".to_string(), "ua-b".to_string()];
        let rotation = HeaderRotation::new(pool.clone()).unwrap();
        for _ in 0..20 {
            let ua = rotation.user_agent();
            assert!(pool.iter().any(|p| p == ua));
        }
        let headers = rotation.headers();
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), ACCEPT_LANG);
        assert!(headers.contains_key(USER_AGENT));
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(matches!(
            HeaderRotation::new(Vec::new()),
            Err(ClientError::Config(_))
        ));
    }
}
