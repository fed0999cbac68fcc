use std::fmt;

use serde::Deserialize;
use url::Url;

/// Body of `POST /process-url`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessUrlRequest {
    pub url: TargetUrl,
    pub target_object_description: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProcessUrlRequest {
    /// Login credentials, only when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

/// An absolute `http`/`https` URL with a host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct TargetUrl(Url);

impl TargetUrl {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL `{}`: {}", raw, e))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(format!(
                    "URL scheme should be 'http' or 'https', got '{}'",
                    other
                ))
            }
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(format!("URL `{}` has no host", raw));
        }

        Ok(TargetUrl(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for TargetUrl {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TargetUrl::parse(&value)
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
