use clap::Parser;
use log::{error, info};
use mammorisk_core::cli::Cli;
use mammorisk_core::server::{self, AppState};
use mammorisk_core::users::UserStore;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> mammorisk_core::Result<()> {
    let tokens = cli.token_service()?;
    let users = UserStore::connect(&cli.database_url, cli.bcrypt_cost).await?;

    let mut state = AppState::new(users, tokens).with_upload_dir(cli.upload_dir.clone());
    if let Some(pipeline) = cli.detection.load_pipeline()? {
        state = state.with_pipeline(pipeline);
    }
    if let Some(model) = cli.load_risk_model()? {
        state = state.with_risk_model(model);
    }

    info!(
        "Imaging {}, diagnosis {}",
        enabled(state.pipeline.is_some()),
        enabled(state.risk_model.is_some())
    );
    server::serve(cli.bind, state, &cli.allowed_origins).await
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
