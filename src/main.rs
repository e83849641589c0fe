use std::process;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use gitlab_mr::cli::parse_error_exit_code;
use gitlab_mr::Cli;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout only ever carries URLs
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
            let name = match e.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.clone(),
                _ => String::new(),
            };
            eprintln!("Invalid command: {name}");
            print_help_and_exit();
        }
        Err(e) => {
            let _ = e.print();
            process::exit(parse_error_exit_code(&e));
        }
    };

    if cli.command.is_none() {
        print_help_and_exit();
    }

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {err}");
            source = err.source();
        }

        process::exit(1);
    }
}

fn print_help_and_exit() -> ! {
    let _ = Cli::command().print_help();
    process::exit(1);
}
