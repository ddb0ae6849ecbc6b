use std::path::PathBuf;

use cbind_config::{CbindConfig, LOCAL_CONFIG_FILE};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ConfigArgs;
use crate::commands::shared;
use crate::output;

#[derive(Debug, Serialize)]
struct ConfigPath {
    layer: &'static str,
    path: Option<PathBuf>,
    exists: bool,
}

/// Handle `cbind config`.
pub fn handle(args: &ConfigArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.paths {
        let paths = config_paths(flags);
        let text = paths
            .iter()
            .map(|p| {
                let path = p
                    .path
                    .as_ref()
                    .map_or_else(|| "(none)".to_string(), |path| path.display().to_string());
                let state = if p.exists { "" } else { " (missing)" };
                format!("{}: {path}{state}\n", p.layer)
            })
            .collect::<String>();
        return output::write(&output::render(&paths, &text, flags.format)?, None);
    }

    let config = shared::load_config(flags)?;
    let text = toml::to_string_pretty(&config)?;
    output::write(&output::render(&config, &text, flags.format)?, None)
}

fn config_paths(flags: &GlobalFlags) -> Vec<ConfigPath> {
    let layer = |layer, path: Option<PathBuf>| ConfigPath {
        exists: path.as_ref().is_some_and(|p| p.exists()),
        layer,
        path,
    };
    let mut paths = vec![
        layer("global", CbindConfig::global_config_path()),
        layer("project", Some(PathBuf::from(LOCAL_CONFIG_FILE))),
    ];
    if let Some(explicit) = &flags.config {
        paths.push(layer("explicit", Some(explicit.clone())));
    }
    paths
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn explicit_path_is_listed_last() {
        let flags = GlobalFlags {
            format: OutputFormat::Text,
            quiet: false,
            config: Some(PathBuf::from("/nonexistent/cbind.toml")),
            defines: Vec::new(),
        };
        let paths = config_paths(&flags);
        let layers: Vec<_> = paths.iter().map(|p| p.layer).collect();
        assert_eq!(layers, vec!["global", "project", "explicit"]);
        assert!(!paths[2].exists);
    }

    #[test]
    fn default_config_renders_as_toml() {
        let text = toml::to_string_pretty(&CbindConfig::default()).expect("toml");
        assert!(text.contains("[translate]"));
        assert!(text.contains("ffi_prefix = \"::core::ffi\""));
    }
}
