use std::env;

use blend::api::{AppState, CliError, load_table_from_env, run_cli, run_http_server};
use clap::error::ErrorKind;

#[tokio::main]
async fn main() {
    env_logger::init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            let (table, source) = match load_table_from_env() {
                Ok(loaded) => loaded,
                Err(e) => {
                    eprintln!("Return table error: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = run_http_server(port, AppState::new(table, source)).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("simulate") => match run_cli(&raw_args[1..]) {
            Ok(json) => println!("{json}"),
            Err(CliError::Args(e))
                if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
            {
                e.exit()
            }
            Err(e) => {
                eprintln!("Simulation error: {e}");
                std::process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: blend serve [port] | blend simulate [--growth-weight N ...]");
            std::process::exit(1);
        }
    }
}
