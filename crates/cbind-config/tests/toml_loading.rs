//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed file and env manipulation.

use std::path::Path;

use cbind_config::{CbindConfig, ConfigError};
use cbind_translate::AnonymousNaming;
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

#[test]
fn loads_translate_options_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[translate]
anonymous_naming = "location"
anonymous_prefix = "Anon_"
ffi_prefix = "libc"
struct_derives = ["Clone", "Copy"]
emit_macros = false
max_depth = 32
indent_width = 2
strict = true
"#,
        )?;

        let config: CbindConfig = Figment::from(Serialized::defaults(CbindConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.translate.anonymous_naming, AnonymousNaming::Location);
        assert_eq!(config.translate.anonymous_prefix, "Anon_");
        assert_eq!(config.translate.ffi_prefix, "libc");
        assert_eq!(config.translate.struct_derives, vec!["Clone", "Copy"]);
        assert!(!config.translate.emit_macros);
        assert_eq!(config.translate.max_depth, 32);
        assert_eq!(config.translate.indent_width, 2);
        assert!(config.translate.strict);
        // Untouched keys keep their defaults.
        assert!(config.translate.emit_doc_comments);
        assert_eq!(config.translate.enum_derives.len(), 6);
        Ok(())
    });
}

#[test]
fn loads_general_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[general]
fail_on_parse_errors = true
defines = ["FEATURE", "LEVEL=3"]
"#,
        )?;

        let config: CbindConfig = Figment::from(Serialized::defaults(CbindConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.general.fail_on_parse_errors);
        assert_eq!(config.general.defines, vec!["FEATURE", "LEVEL=3"]);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_file("cbind.toml", "[translate]\nffi_prefix = \"std::ffi\"\n")?;

        let config = CbindConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.translate.ffi_prefix, "std::ffi");
        Ok(())
    });
}

#[test]
fn explicit_file_overrides_project_file() {
    Jail::expect_with(|jail| {
        jail.create_file("cbind.toml", "[translate]\nindent_width = 2\nmax_depth = 8\n")?;
        jail.create_file("override.toml", "[translate]\nindent_width = 8\n")?;

        let config = CbindConfig::load_from(Some(Path::new("override.toml")))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.translate.indent_width, 8);
        assert_eq!(config.translate.max_depth, 8);
        Ok(())
    });
}

#[test]
fn invalid_value_in_file_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("cbind.toml", "[translate]\nanonymous_prefix = \"not valid\"\n")?;

        let err = CbindConfig::load().expect_err("should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "translate.anonymous_prefix"
        ));
        Ok(())
    });
}

#[test]
fn wrong_type_in_file_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file("cbind.toml", "[translate]\nmax_depth = \"deep\"\n")?;

        let err = CbindConfig::load().expect_err("should fail");
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}
