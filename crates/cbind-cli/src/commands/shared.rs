use std::path::Path;

use anyhow::{Context, bail};
use cbind_ast::TranslationUnit;
use cbind_config::CbindConfig;

use crate::cli::GlobalFlags;

/// Effective configuration: files, environment, then `-D` flags.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<CbindConfig> {
    let mut config = CbindConfig::load_from(flags.config.as_deref())
        .context("failed to load cbind configuration")?;
    config.general.defines.extend(flags.defines.iter().cloned());
    config.validate().context("invalid -D flag")?;
    Ok(config)
}

/// Parse `input`, refusing recovered syntax errors when configured to.
pub fn parse_input(input: &Path, config: &CbindConfig) -> anyhow::Result<TranslationUnit> {
    let unit = cbind_ast::parse_file(input, &config.parse_options())
        .with_context(|| format!("failed to parse {}", input.display()))?;
    if unit.has_errors() {
        if config.general.fail_on_parse_errors {
            bail!(
                "{} has {} syntax error(s) and fail_on_parse_errors is set",
                input.display(),
                unit.error_count()
            );
        }
        tracing::warn!(
            file = %input.display(),
            errors = unit.error_count(),
            "parsed with syntax errors"
        );
    }
    Ok(unit)
}
