use crate::error::Result;
use crate::settings::{settings_file_exists, settings_path, Settings};

pub fn run(settings: &Settings) -> Result<()> {
    println!("{}", format_status(settings, settings_file_exists()));
    Ok(())
}

fn format_status(settings: &Settings, file_exists: bool) -> String {
    let path = settings_path();
    let source = if file_exists { "" } else { " (not found, using defaults)" };
    [
        format!("Settings:   {}{source}", path.display()),
        format!("API:        {}", settings.api_base_url),
        format!("User agent: {}", settings.user_agent),
        format!("Log file:   {}", settings.log_path().display()),
    ]
    .join("\n")
}
