//! Command dispatch and handler modules.

mod graph;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Graph {
            targets,
            no_deps,
            no_optional,
            skip_installed,
            no_confirm,
            fail_fast,
            installed,
        } => {
            graph::exec(
                cli.config.as_deref(),
                graph::GraphArgs {
                    targets,
                    no_deps,
                    no_optional,
                    skip_installed,
                    no_confirm,
                    fail_fast,
                    installed,
                },
            )
            .await
        }
    }
}
