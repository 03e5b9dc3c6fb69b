//! Models command - List persisted models

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::EngineArgs,
        output::{format_number, print_kv, print_section},
    },
};

#[derive(Parser, Debug)]
#[command(about = "List persisted models")]
pub struct ModelsArgs {
    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn execute(args: ModelsArgs) -> Result<()> {
    let app = App::from_config(args.engine.engine_config()?);
    let repository = app.repository();
    let model_ids = app.model_ids()?;

    print_section(&format!(
        "Models in {}",
        app.config().model_dir.display()
    ));
    if model_ids.is_empty() {
        println!("  No trained models found. Run `tictactoe-td train` to create one.");
        return Ok(());
    }

    for model_id in model_ids {
        let table = repository
            .load(model_id)
            .with_context(|| format!("Failed to read model {model_id}"))?;
        print_kv(
            &format!("Model {model_id}"),
            &format!("{} states", format_number(table.len())),
        );
    }
    Ok(())
}
