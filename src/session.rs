// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::ApiError;
use crate::config::Config;
use std::fmt;

/// Bearer credentials for one command invocation.
#[derive(Clone, Default)]
pub struct Session {
    access_token: Option<String>,
}

impl Session {
    pub fn new(access_token: Option<String>) -> Self {
        let access_token = access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Session { access_token }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn token(&self) -> Result<&str, ApiError> {
        self.access_token
            .as_deref()
            .ok_or(ApiError::NotAuthenticated)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_not_a_session() {
        let s = Session::new(Some("   ".into()));
        assert!(!s.is_authenticated());
        assert!(matches!(s.token(), Err(ApiError::NotAuthenticated)));
    }

    #[test]
    fn debug_output_hides_token() {
        let s = Session::new(Some(" secret-token ".into()));
        assert_eq!(s.token().unwrap(), "secret-token");
        assert!(!format!("{:?}", s).contains("secret"));
    }
}
