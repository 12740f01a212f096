use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use go2link_core::webrtc::DEFAULT_STUN_URL;
use go2link_core::{
    ApiClient, Config, RemoteApi, SessionFetcher, TokenManager, TokenState, TokenStore,
};
use serde_json::json;
use tracing::debug;

use crate::credentials::{load_credential, resolve_serial};

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn remote(config: &Config) -> Result<Arc<dyn RemoteApi>> {
    let client = ApiClient::new(config).context("Failed to create API client")?;
    Ok(Arc::new(client))
}

fn token_manager(config: &Config, remote: Arc<dyn RemoteApi>) -> Result<TokenManager> {
    let path = config.token_path()?;
    debug!(path = %path.display(), "Token file");
    Ok(TokenManager::with_margin(
        TokenStore::new(path),
        remote,
        config.refresh_margin_secs,
    ))
}

pub fn status(config: &Config) -> Result<()> {
    let manager = token_manager(config, remote(config)?)?;

    let state = match manager.state() {
        TokenState::NoToken => "no token",
        TokenState::Cached => "cached (due for refresh)",
        TokenState::Valid => "valid",
        TokenState::Expired => "expired",
    };
    println!("Token file: {}", manager.store().path().display());
    println!("State:      {}", state);

    if let Some(token) = manager.get_token() {
        if let Some(at) = token.expires_at_local() {
            println!("Expires:    {}", at.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(secs) = manager.seconds_until_expiry() {
            println!("Remaining:  {}s", secs);
        }
    }
    Ok(())
}

pub async fn login(config: &Config) -> Result<()> {
    let credential = load_credential()?;
    let mut manager = token_manager(config, remote(config)?)?;

    let token = manager
        .try_refresh(&credential)
        .await
        .context("Login failed")?;

    match token.expires_at_local() {
        Some(at) => println!("Logged in, token valid until {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("Logged in"),
    }
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    let mut manager = token_manager(config, remote(config)?)?;
    manager.logout().context("Failed to delete cached token")?;
    println!("Logged out");
    Ok(())
}

pub async fn session(config: &Config, serial: Option<String>, with_stun: bool) -> Result<()> {
    let serial = resolve_serial(serial)?;
    let remote = remote(config)?;
    let mut manager = token_manager(config, remote.clone())?;

    let token = if manager.is_expired() {
        let credential = load_credential()?;
        manager.ensure_valid(&credential).await
    } else {
        manager.get_token().cloned()
    };
    let token = token.context("Not connected: no valid access token, retry after `go2link login`")?;

    let fetcher = SessionFetcher::new(remote, config.key_wrap);
    let credentials = fetcher
        .try_fetch(&serial, &token)
        .await
        .context("Failed to fetch session credentials, retry")?;

    let stun = with_stun.then_some(DEFAULT_STUN_URL);
    let output = json!({
        "serial": serial,
        "credentials": credentials,
        "iceServers": credentials.ice_servers(stun),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
