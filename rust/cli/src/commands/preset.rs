//! The `preset` command: resolve the rule flags into a full preset and
//! print or save it.

use std::fs;
use std::io::Write;

use crate::cli::{PresetFormat, RuleArgs};
use crate::config::build_rules;
use crate::error::CliError;

pub fn handle_preset_command(
    args: &RuleArgs,
    format: PresetFormat,
    save: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let rules = build_rules(args)?;
    rules.validate()?;
    let rendered = match format {
        PresetFormat::Toml => toml::to_string_pretty(&rules)
            .map_err(|e| CliError::Config(format!("cannot render preset: {}", e)))?,
        PresetFormat::Json => serde_json::to_string_pretty(&rules)
            .map_err(|e| CliError::Config(format!("cannot render preset: {}", e)))?,
    };
    if let Some(path) = save {
        fs::write(path, &rendered)?;
        writeln!(out, "preset saved to {}", path)?;
    }
    writeln!(out, "{}", rendered)?;
    Ok(())
}
