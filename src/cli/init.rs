use crate::error::{Result, ShelfError};
use crate::settings::{save_settings, settings_file_exists, settings_path, Settings};

pub fn run(settings: &Settings, force: bool) -> Result<()> {
    if settings_file_exists() && !force {
        return Err(ShelfError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            settings_path().display()
        )));
    }
    save_settings(settings)?;
    println!("Wrote {}", settings_path().display());
    println!("API: {}", settings.api_base_url);
    Ok(())
}
