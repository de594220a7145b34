use crate::cli::Context;
use crate::error::Result;
use crate::settings::{config_dir, settings_path};

pub fn run(ctx: &Context) -> Result<()> {
    println!("{}", format_status(ctx));
    Ok(())
}

pub fn format_status(ctx: &Context) -> String {
    let user = match ctx.sessions.load() {
        Some(s) => format!("{} (id {})", s.display_name(), s.user_id),
        None => "not logged in".to_string(),
    };
    let mut lines = vec![
        format!("API URL:    {}", ctx.api_url),
        format!("Currency:   {}", ctx.currency()),
        format!("Config dir: {}", config_dir().display()),
        format!("Settings:   {}", settings_path().display()),
        format!("Session:    {}", ctx.sessions.path().display()),
        format!("User:       {user}"),
    ];
    if let Some(s) = ctx.sessions.load().filter(|s| !s.email.is_empty()) {
        lines.push(format!("Email:      {}", s.email));
    }
    lines.join("\n")
}
