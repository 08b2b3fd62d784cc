use minter_cli::{command, exit_code_for, init_tracing, options_from_matches, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = command().get_matches();
    let options = match options_from_matches(&matches) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&options.log);

    match run(options).await {
        Ok(summary) => {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::warn!(error = %err, "could not render summary"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "mint run failed");
            ExitCode::from(exit_code_for(&err))
        }
    }
}
