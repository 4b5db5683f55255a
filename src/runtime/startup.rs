//! Everything that happens on the plain terminal before the UI takes over:
//! asking for credentials and getting an access token.

use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use rspotify::prelude::*;
use rspotify::{AuthCodeSpotify, Token};

use crate::config::RemoteSettings;
use crate::error::{AppError, TransportError};
use crate::remote::{BrowserOpener, Credentials, LinkOpener, client_error};

/// Client id and secret from config, prompting for whichever is missing.
pub fn credentials(settings: &RemoteSettings) -> Result<Credentials, AppError> {
    let client_id = if settings.client_id.trim().is_empty() {
        prompt_line("Client ID: ")?
    } else {
        settings.client_id.clone()
    };
    let client_secret = if settings.client_secret.trim().is_empty() {
        prompt_hidden("Client secret: ")?
    } else {
        settings.client_secret.clone()
    };
    Credentials::new(&client_id, &client_secret).ok_or(AppError::MissingCredentials)
}

fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like `prompt_line`, but typed characters are not echoed.
fn prompt_hidden(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    enable_raw_mode()?;
    let secret = read_hidden();
    disable_raw_mode()?;
    println!();
    secret
}

fn read_hidden() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => break,
            KeyCode::Backspace => {
                secret.pop();
            }
            // Abort: an empty secret ends startup with MissingCredentials.
            KeyCode::Esc => {
                secret.clear();
                break;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                secret.clear();
                break;
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
    Ok(secret.trim().to_string())
}

/// Give `spotify` a usable token: the cached one, refreshed if it expired, or
/// a new one from the browser flow. The client writes whatever it gets back to
/// its cache file.
pub fn authorize(spotify: &AuthCodeSpotify) -> Result<(), AppError> {
    let cache = spotify.config.cache_path.display().to_string();
    match spotify.read_token_cache(true) {
        Ok(Some(token)) => {
            let expired = token.is_expired();
            set_token(spotify, token)?;
            if !expired {
                log::info!("using cached token from {cache}");
                return Ok(());
            }
            match spotify.refresh_token() {
                Ok(()) => {
                    log::info!("refreshed cached token");
                    return Ok(());
                }
                Err(e) => log::warn!("cached token could not be refreshed: {e}"),
            }
        }
        Ok(None) => log::debug!("no usable token in {cache}"),
        Err(e) => log::debug!("token cache {cache} not read: {e}"),
    }

    let url = spotify.get_authorize_url(false).map_err(client_error)?;
    println!("Authorize tandem in your browser:\n\n  {url}\n");
    if let Err(e) = BrowserOpener.open(&url) {
        log::warn!("failed to open {url}: {e}");
        println!("(could not open a browser; open the link above manually)");
    }

    let redirected = prompt_line("Paste the URL you were redirected to: ")?;
    let code = spotify.parse_response_code(&redirected).ok_or_else(|| {
        TransportError::Auth("no authorization code in the pasted URL".to_string())
    })?;
    spotify.request_token(&code).map_err(client_error)?;
    log::info!("authorized");
    Ok(())
}

fn set_token(spotify: &AuthCodeSpotify, token: Token) -> Result<(), AppError> {
    let mut slot = spotify
        .token
        .lock()
        .map_err(|_| TransportError::Auth("token lock poisoned".to_string()))?;
    *slot = Some(token);
    Ok(())
}
