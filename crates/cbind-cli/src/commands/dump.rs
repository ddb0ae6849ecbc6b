use cbind_ast::dump::{dump_unit, render_text};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DumpArgs;
use crate::commands::shared;
use crate::output;

/// Handle `cbind dump`.
pub fn handle(args: &DumpArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = shared::load_config(flags)?;
    let unit = shared::parse_input(&args.input, &config)?;
    let tree = dump_unit(&unit);
    tracing::debug!(nodes = tree.node_count(), "dumping cursor tree");
    let rendered = output::render(&tree, &render_text(&unit, args.depth), flags.format)?;
    output::write(&rendered, None)
}
