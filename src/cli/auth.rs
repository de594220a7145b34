use zeroize::Zeroizing;

use crate::api::ExpenseApi;
use crate::cli::Context;
use crate::error::Result;
use crate::forms::{validate_login, validate_signup};
use crate::models::{LoginRequest, SignupRequest};
use crate::session::{Session, SessionStore};

fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    Ok(Zeroizing::new(rpassword::prompt_password(prompt)?))
}

pub fn signup(ctx: &Context, name: &str, email: &str) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let message = signup_with(&ctx.api()?, name, email, &password)?;
    println!("{message}");
    Ok(())
}

pub fn signup_with<A: ExpenseApi + ?Sized>(api: &A, name: &str, email: &str, password: &str) -> Result<String> {
    validate_signup(name, email, password)?;
    api.signup(&SignupRequest {
        full_name: name.trim(),
        email: email.trim(),
        password,
    })
}

pub fn login(ctx: &Context, email: &str) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let session = login_with(&ctx.api()?, &ctx.sessions, email, &password)?;
    println!("Login successful. Welcome back, {}.", session.display_name());
    Ok(())
}

/// Authenticate and persist the returned identity.
pub fn login_with<A: ExpenseApi + ?Sized>(
    api: &A,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<Session> {
    validate_login(email, password)?;
    let response = api.login(&LoginRequest {
        email: email.trim(),
        password,
    })?;
    let session = Session {
        user_id: response.user_id,
        user_name: response.user_name.unwrap_or_default(),
        email: response.user_email.unwrap_or_else(|| email.trim().to_string()),
    };
    store.save(&session)?;
    log::info!("logged in as user {}", session.user_id);
    Ok(session)
}

pub fn logout(ctx: &Context) -> Result<()> {
    if ctx.sessions.clear()? {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}
