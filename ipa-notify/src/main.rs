use std::process::ExitCode;

use clap::Parser;
use ipa_notify::app;
use ipa_notify::cli::Cli;
use ipa_notify::exit::Failure;
use ipa_notify::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    match app::run(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            app::report(&e);
            Failure::from_error(&e).into()
        }
    }
}
