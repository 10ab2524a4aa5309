use clap::Parser;
use line_ledger::args::{Args, Command};
use line_ledger::commands::{self, Out};
use line_ledger::{Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    // This allows for running the program without hitting the Google and LINE APIs. When
    // LEDGER_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Testing,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.client_secret(),
            init_args.channel_access_token(),
            init_args.sheet_url(),
        )
        .await?
        .print(),

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            if auth_args.verify() {
                commands::auth_verify(&config).await?.print()
            } else {
                commands::auth(&config).await?.print()
            }
        }

        Command::Serve(serve_args) => {
            let config = Config::load(home).await?;
            commands::serve(config, mode, serve_args.listen(), commands::ctrl_c())
                .await?
                .print()
        }

        Command::Exec(exec_args) => {
            let config = Config::load(home).await?;
            let out = commands::exec(
                config,
                mode,
                exec_args.user_id(),
                exec_args.message_id(),
                exec_args.text(),
            )
            .await?;
            print_response(&out)
        }
    };
    Ok(())
}

/// Prints the answer to a chat message on stdout, where it can be read or piped, and its status
/// to the log.
fn print_response(out: &Out<line_ledger::interpreter::Response>) {
    if let Some(response) = out.structure() {
        debug!(
            "Status {} ({}), delivered by {:?}",
            response.status().code(),
            response.status(),
            response.channel()
        );
    }
    println!("{}", out.message());
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
