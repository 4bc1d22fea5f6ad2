//! Server-side render requests
//!
//! `POST {base}/gen` with the current selections and palette; a 2xx body
//! is a permalink path. Non-2xx is a hard failure surfaced to the user;
//! local editing state is unaffected either way.

use std::collections::BTreeMap;
use std::time::Duration;

use log::debug;
use serde::Serialize;

use crate::core::session::Session;
use crate::error::VisageError;

/// JSON body of a render request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderRequest {
    /// Category -> selected variant index
    pub parts: BTreeMap<String, usize>,
    /// Palette key -> `#rrggbb`
    pub palette: BTreeMap<String, String>,
}

impl RenderRequest {
    pub fn from_session(session: &Session) -> Self {
        Self {
            parts: session.selections(),
            palette: session.palette().to_map(),
        }
    }
}

/// Ask the server to render the avatar; returns the permalink path
pub fn request_render(base: &str, request: &RenderRequest) -> Result<String, VisageError> {
    let url = format!("{}/gen", base.trim_end_matches('/'));
    debug!("render request to {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("visage/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| VisageError::Transport(e.to_string()))?;

    let response = client
        .post(&url)
        .json(request)
        .send()
        .map_err(|e| VisageError::ServerRender(e.to_string()))?;

    if !response.status().is_success() {
        return Err(VisageError::ServerRender(format!(
            "HTTP {}",
            response.status()
        )));
    }

    response
        .text()
        .map_err(|e| VisageError::ServerRender(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_has_the_wire_shape() {
        let request = RenderRequest {
            parts: BTreeMap::from([("hair".to_string(), 5), ("hat".to_string(), 0)]),
            palette: BTreeMap::from([("eye".to_string(), "#3f7bb5".to_string())]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parts"]["hair"], 5);
        assert_eq!(json["parts"]["hat"], 0);
        assert_eq!(json["palette"]["eye"], "#3f7bb5");
    }
}
