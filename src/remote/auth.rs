//! Client credentials and the authorization-code client.
//!
//! Token exchange, refresh and the cache file are handled by `rspotify`;
//! this module only wires our settings into it.

use std::collections::HashSet;

use rspotify::{AuthCodeSpotify, Config, OAuth};

use crate::config::RemoteSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// `None` when either half is blank.
    pub fn new(client_id: &str, client_secret: &str) -> Option<Self> {
        let client_id = client_id.trim();
        let client_secret = client_secret.trim();
        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }
        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }
}

/// Scopes are configured as one space- or comma-separated string.
pub fn scope_set(scopes: &str) -> HashSet<String> {
    scopes
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// An unauthorized client that caches its token at `remote.token_cache` and
/// refreshes it on its own once it expires.
pub fn client(credentials: &Credentials, settings: &RemoteSettings) -> AuthCodeSpotify {
    let creds = rspotify::Credentials::new(&credentials.client_id, &credentials.client_secret);
    let oauth = OAuth {
        redirect_uri: settings.redirect_uri.clone(),
        scopes: scope_set(&settings.scopes),
        ..Default::default()
    };
    let config = Config {
        cache_path: settings.token_cache.clone(),
        token_cached: true,
        token_refreshing: true,
        ..Default::default()
    };
    AuthCodeSpotify::with_config(creds, oauth, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_reject_blank_halves() {
        assert!(Credentials::new("", "secret").is_none());
        assert!(Credentials::new("id", "  ").is_none());
        assert_eq!(
            Credentials::new(" id ", "secret"),
            Some(Credentials {
                client_id: "id".into(),
                client_secret: "secret".into()
            })
        );
    }

    #[test]
    fn scopes_split_on_spaces_and_commas() {
        let scopes = scope_set("user-read-playback-state, user-modify-playback-state  playlist-modify-public");
        assert_eq!(scopes.len(), 3);
        assert!(scopes.contains("user-modify-playback-state"));
        assert!(scope_set("  ").is_empty());
    }

    #[test]
    fn client_uses_configured_cache_and_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RemoteSettings {
            token_cache: dir.path().join(".cache"),
            ..RemoteSettings::default()
        };
        let creds = Credentials::new("my-client", "my-secret").unwrap();
        let spotify = client(&creds, &settings);

        assert_eq!(spotify.config.cache_path, dir.path().join(".cache"));
        assert!(spotify.config.token_cached);
        assert!(spotify.config.token_refreshing);
        assert_eq!(spotify.oauth.redirect_uri, "http://localhost:8888/callback");
        assert!(spotify.oauth.scopes.contains("user-read-playback-state"));

        let url = spotify.get_authorize_url(false).unwrap();
        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("client_id=my-client"));
    }
}
