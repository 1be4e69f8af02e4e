//! Walks through an EVE SSO login from the terminal.
//!
//! 1. Prints the login URL
//! 2. Reads back the URL the browser was redirected to
//! 3. Exchanges the code, verifies the token and prints the character
//!
//! Configure with `EVE_SSO_CLIENT_ID` (and optionally any other `EVE_SSO_*`
//! variable) or pass a TOML config file as the first argument.

use ras_identity_eve_sso::{SsoConfig, SsoProvider};
use std::io::BufRead;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = SsoConfig::load(config_path.as_deref())?;
    let provider = SsoProvider::new(config)?;

    let callback_url = std::env::var("EVE_SSO_CALLBACK_URL")
        .unwrap_or_else(|_| "http://localhost:3000/callback".to_string());

    println!("EVE SSO Example");
    println!("===============");

    let login = provider.get_login(&callback_url, &["publicData"]);
    println!("\n1. Open this URL in your browser:\n\n{}\n", login.url);
    println!("2. Paste the URL you were redirected to:");

    let mut redirect_url = String::new();
    std::io::stdin().lock().read_line(&mut redirect_url)?;

    let result = provider
        .handle_callback(redirect_url.trim(), &login.state, &login.code_verifier)
        .await?;

    println!("\n3. Logged in");
    println!("   Character: {:?} ({:?})", result.character_name, result.character_id);
    println!("   Scopes:    {:?}", result.scopes);
    println!("   Expires:   {:?}s", result.expires_in);

    if let Some(refresh_token) = result.refresh_token {
        let refreshed = provider.refresh(&refresh_token).await?;
        println!("\n4. Refreshed, new token expires in {:?}s", refreshed.expires_in);
    }

    Ok(())
}
