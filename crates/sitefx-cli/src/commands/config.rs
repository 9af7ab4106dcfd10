use anyhow::Result;

use sitefx_core::AppConfig;

pub fn run(config: &AppConfig, save: bool) -> Result<()> {
    if save {
        config.save()?;
        println!("Configuration written to {}", AppConfig::config_path().display());
        return Ok(());
    }

    println!("# {}\n", AppConfig::config_path().display());
    print!("{}", toml::to_string_pretty(config)?);

    Ok(())
}
