use crate::store::FileTokenStore;
use anyhow::{bail, Result};
use hotelauth::backend::HttpBackend;
use hotelauth::{codec, AuthSession, Credentials, Role, SignUpRequest, UnixTimestamp};
use tracing::info;

//--------------------------------------------------------------------------------------------------

pub type Session = AuthSession<FileTokenStore, HttpBackend>;

//--------------------------------------------------------------------------------------------------
// Commands
//--------------------------------------------------------------------------------------------------

pub async fn login(session: &Session, credentials: Credentials) -> Result<()> {
    if !session.login(&credentials).await? {
        bail!("The backend did not issue a usable token");
    }

    println!("Signed in as {}", credentials.email);
    status(session);
    Ok(())
}

pub async fn sign_up(session: &Session, role: Role, request: SignUpRequest) -> Result<()> {
    if !session.sign_up(role, &request).await? {
        bail!("The backend did not confirm the new {} account", role);
    }

    info!("Created {} account {}", role, request.username);
    println!("Created {} account for {}", role, request.email);
    Ok(())
}

pub fn logout(session: &Session) {
    session.logout();
    println!("Signed out");
}

pub fn status(session: &Session) {
    let Some(identity) = session.identity() else {
        println!("Not signed in");
        return;
    };

    println!("Signed in");
    println!("  {}", identity);
}

/// Dumps the stored token's claims, whether or not the token is still valid
pub fn claims(session: &Session) -> Result<()> {
    let Some(token) = hotelauth::TokenStore::get(session.validator().store()) else {
        println!("No token stored");
        return Ok(());
    };

    let claims = codec::decode(&token)?;
    println!("{}", serde_json::to_string_pretty(&claims)?);

    match session.validator().check(&token, UnixTimestamp::now()) {
        Ok(_) => println!("Token is valid"),
        Err(err) => println!("Token is not valid: {}", err),
    }
    println!("{}", session.resolver().identity(&claims));

    Ok(())
}

//--------------------------------------------------------------------------------------------------
