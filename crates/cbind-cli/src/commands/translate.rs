use anyhow::Context;
use cbind_translate::{Diagnostic, translate};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::TranslateArgs;
use crate::commands::shared;
use crate::output;

#[derive(Debug, Serialize)]
struct TranslateResponse<'a> {
    input: String,
    text: &'a str,
    diagnostics: &'a [Diagnostic],
}

/// Handle `cbind translate`.
pub fn handle(args: &TranslateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut config = shared::load_config(flags)?;
    let options = &mut config.translate;
    options.strict |= args.strict;
    if let Some(naming) = args.naming {
        options.anonymous_naming = naming.into();
    }
    if args.no_macros {
        options.emit_macros = false;
    }
    if args.no_docs {
        options.emit_doc_comments = false;
    }

    let unit = shared::parse_input(&args.input, &config)?;
    let translation = translate(&unit, &config.translate)
        .with_context(|| format!("failed to translate {}", args.input.display()))?;

    if !flags.quiet {
        for diagnostic in &translation.diagnostics {
            eprintln!("warning: {diagnostic}");
        }
    }

    let response = TranslateResponse {
        input: args.input.display().to_string(),
        text: &translation.text,
        diagnostics: &translation.diagnostics,
    };
    let rendered = output::render(&response, &translation.text, flags.format)?;
    output::write(&rendered, args.output.as_deref())?;
    tracing::info!(
        input = %args.input.display(),
        diagnostics = translation.diagnostics.len(),
        "translation written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::OutputFormat;

    fn flags(format: OutputFormat) -> GlobalFlags {
        GlobalFlags {
            format,
            quiet: true,
            config: None,
            defines: vec!["WITH_EXTRA".to_string()],
        }
    }

    fn args(input: PathBuf, output: PathBuf) -> TranslateArgs {
        TranslateArgs {
            input,
            output: Some(output),
            strict: false,
            naming: None,
            no_macros: false,
            no_docs: false,
        }
    }

    fn header(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("lib.h");
        std::fs::write(
            &path,
            "#define LIB_VERSION 2\n#ifdef WITH_EXTRA\nextern int extra;\n#endif\nstruct lib_point { int x; };\n",
        )
        .expect("write header");
        path
    }

    #[test]
    fn writes_rust_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("lib.rs");
        handle(&args(header(dir.path()), out.clone()), &flags(OutputFormat::Text))
            .expect("translate");
        let text = std::fs::read_to_string(out).expect("read output");
        assert!(text.contains("pub const LIB_VERSION: i32 = 2;"));
        assert!(text.contains("pub struct lib_point {"));
        assert!(text.contains("pub static mut extra: ::core::ffi::c_int;"));
    }

    #[test]
    fn json_output_carries_diagnostics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("wide.h");
        std::fs::write(&input, "extern long double precise;\n").expect("write header");
        let out = dir.path().join("wide.json");
        handle(&args(input, out.clone()), &flags(OutputFormat::Json)).expect("translate");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).expect("read")).expect("json");
        assert_eq!(json["diagnostics"][0]["kind"], "unresolved_type");
        assert!(
            json["text"]
                .as_str()
                .is_some_and(|text| text.contains("precise"))
        );
    }

    #[test]
    fn strict_flag_fails_on_diagnostics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("wide.h");
        std::fs::write(&input, "extern long double precise;\n").expect("write header");
        let mut strict = args(input, dir.path().join("wide.rs"));
        strict.strict = true;
        let err = handle(&strict, &flags(OutputFormat::Text)).expect_err("strict should fail");
        assert!(format!("{err:#}").contains("strict mode"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = handle(
            &args(dir.path().join("absent.h"), dir.path().join("out.rs")),
            &flags(OutputFormat::Text),
        )
        .expect_err("should fail");
        assert!(format!("{err:#}").contains("failed to parse"));
    }
}
