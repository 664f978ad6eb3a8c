use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{self, Config};

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> anyhow::Result<()> {
    let path = Config::path()?;
    let config = if path.exists() {
        println!("{} {}", "Config:".bold(), path.display());
        Config::load_from(&path)?
    } else {
        println!(
            "{} {}",
            "No config file yet; showing defaults.".yellow(),
            format!("({})", path.display()).dimmed()
        );
        Config::default()
    };
    println!();

    let timing = config.deck_timing();
    let input = config.input_settings();
    let mode = config.mode().unwrap_or_default();
    let rows = [
        ("defaults.theme", config.theme().unwrap_or("dark").to_string()),
        ("defaults.mode", format!("{mode:?}").to_lowercase()),
        ("defaults.reduced_motion", config.reduced_motion().to_string()),
        ("timing.settle_ms", timing.settle.as_millis().to_string()),
        ("timing.stagger_step_ms", timing.stagger_step.as_millis().to_string()),
        ("timing.glow_offset_px", timing.glow_offset.to_string()),
        ("timing.glow_return_ms", timing.glow_return.as_millis().to_string()),
        ("input.wheel_cooldown_ms", input.wheel_cooldown.as_millis().to_string()),
        ("input.wheel_threshold", input.wheel_threshold.to_string()),
        ("input.swipe_threshold_px", input.swipe_threshold.to_string()),
        ("input.key_interval_ms", input.key_interval.as_millis().to_string()),
        ("input.touch_interval_ms", input.touch_interval.as_millis().to_string()),
        ("input.click_interval_ms", input.click_interval.as_millis().to_string()),
    ];
    debug_assert_eq!(rows.len(), config::KEYS.len());
    for (key, value) in rows {
        println!("  {:<26} {}", key.cyan(), value);
    }
    Ok(())
}

fn set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {} = {} {}",
        "Set".green(),
        key.bold(),
        value,
        format!("({})", path.display()).dimmed()
    );
    Ok(())
}
