use crate::cli::{ConfigKey, Context};
use crate::error::{Result, TallyError};
use crate::settings::{save_settings, settings_path, validate_api_url, Settings};

pub fn show(ctx: &Context) -> Result<()> {
    let s = &ctx.settings;
    println!("api-url:  {}", s.api_url);
    println!("currency: {}", s.currency);
    if ctx.api_url != s.api_url.trim_end_matches('/') {
        println!("(this run uses {})", ctx.api_url);
    }
    println!("file:     {}", settings_path().display());
    Ok(())
}

pub fn set(ctx: &Context, key: ConfigKey, value: &str) -> Result<()> {
    let updated = apply(ctx.settings.clone(), key, value)?;
    save_settings(&updated)?;
    println!("Saved to {}", settings_path().display());
    Ok(())
}

/// Validate and apply one setting change.
pub fn apply(mut settings: Settings, key: ConfigKey, value: &str) -> Result<Settings> {
    let value = value.trim();
    match key {
        ConfigKey::ApiUrl => {
            validate_api_url(value)?;
            settings.api_url = value.trim_end_matches('/').to_string();
        }
        ConfigKey::Currency => {
            if value.is_empty() {
                return Err(TallyError::Settings("Currency symbol cannot be empty".into()));
            }
            settings.currency = value.to_string();
        }
    }
    Ok(settings)
}
