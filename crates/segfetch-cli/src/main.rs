use segfetch_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // File logging under the XDG state dir; stderr if that is unavailable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = Cli::run_from_args().await {
        eprintln!("segfetch error: {:#}", err);
        std::process::exit(1);
    }
}
