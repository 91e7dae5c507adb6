use clap::Parser;
use console::style;
use dexchart_utils::{config::Config, dexchart_log, disk_storage::DiskStorageInterface};

mod cli;
mod panic_hook;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    panic_hook::set();

    if let Err(error) = run(cli).await {
        dexchart_log!("exiting with error: {error}");
        eprintln!("{} {error}", style("error:").red());
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> dexchart_tui::Result<()> {
    let mut config = Config::load()?;
    cli.apply(&mut config);

    let pairs = cli::Cli::resolve_pairs(&config)?;
    if cli.save_config {
        config.save()?;
        dexchart_log!("saved config to {}", Config::path()?.display());
    }

    let mut app = dexchart_tui::App::new(&config, pairs)?;
    app.run().await
}
