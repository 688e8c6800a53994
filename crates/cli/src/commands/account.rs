//! Sign-in and profile commands.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password may also come from MILLET_PASSWORD)
//! mm-cli login -e ravi@fpo.in -p '...'
//!
//! # Register as an SHG/FPO seller
//! mm-cli register -n "Meena" -e meena@shg.org -p '...' -r shg_fpo --city Anantapur
//!
//! # Show who is signed in / sign out
//! mm-cli whoami
//! mm-cli logout
//! ```

#![allow(clippy::print_stdout)]

use millet_market_client::api::Registration;
use millet_market_client::{AppContext, Result};
use secrecy::SecretString;

use crate::render;

/// Sign in and report who is now signed in.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or the session cannot be
/// saved.
pub async fn login(ctx: &AppContext, email: &str, password: SecretString) -> Result<()> {
    let session = ctx.login(email, &password).await?;
    print!("{}", render::session(&session));
    Ok(())
}

/// Register a new account and sign in with it.
///
/// # Errors
///
/// Returns an error if the registration is rejected or the session cannot be
/// saved.
pub async fn register(ctx: &AppContext, registration: Registration) -> Result<()> {
    let session = ctx.register(&registration).await?;
    print!("{}", render::session(&session));
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the stored session cannot be removed.
pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.logout().await?;
    println!("Signed out.");
    Ok(())
}

/// Show the stored session.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub fn whoami(ctx: &AppContext) -> Result<()> {
    print!("{}", render::session(&ctx.session()?));
    Ok(())
}
