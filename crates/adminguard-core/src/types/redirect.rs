//! Login redirects requested from the navigator.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// A navigation target: a route plus the optional login query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Route path, e.g. `/login`.
    pub path: String,
    /// Where to return after signing in again.
    pub return_url: Option<String>,
    /// Whether the redirect happened because the account was blocked.
    pub blocked: bool,
}

impl Redirect {
    /// A plain redirect to the given route.
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            return_url: None,
            blocked: false,
        }
    }

    /// Attach a return URL.
    pub fn with_return_url(mut self, return_url: Option<&str>) -> Self {
        self.return_url = return_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    /// Mark the redirect as caused by a blocked account.
    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    /// Query parameters in the order they are rendered.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(return_url) = &self.return_url {
            pairs.push(("returnUrl", return_url.clone()));
        }
        if self.blocked {
            pairs.push(("blocked", "true".to_string()));
        }
        pairs
    }

    /// Render as a path with an encoded query string.
    pub fn to_uri(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}?{query}", self.path)
    }
}
