//! `tripchat config` -- print the effective configuration.

use std::path::Path;

use console::style;

use tripchat_infra::config::resolve_config_path;
use tripchat_types::config::TripchatConfig;

pub fn show_config(config: &TripchatConfig, explicit: Option<&Path>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let source = match resolve_config_path(explicit) {
        Some(source) if source.path.exists() => source.path.display().to_string(),
        Some(source) => format!("{} (not found, using defaults)", source.path.display()),
        None => "built-in defaults".to_string(),
    };

    println!();
    println!("  {} {}", style("Config:").bold(), style(source).cyan());
    println!(
        "  {} {}",
        style("API key:").bold(),
        if std::env::var_os(&config.completion.api_key_env).is_some() {
            style(format!("${} is set", config.completion.api_key_env)).green()
        } else {
            style(format!("${} is not set", config.completion.api_key_env)).yellow()
        }
    );
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    println!();
    Ok(())
}
