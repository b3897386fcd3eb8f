//! Interactive meal planner entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the meal database.
//! - Hand stdin/stdout to the command session.

mod config;
mod session;

use config::CliConfig;
use log::{error, info};
use mealplan_core::db::open_db;
use session::Session;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CliConfig::from_env();
    let log_dir = config.log_dir.to_string_lossy();
    if let Err(err) = mealplan_core::init_logging(&config.log_level, &log_dir) {
        // Logging is optional; the session still runs.
        eprintln!("logging disabled: {err}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={}", err);
            eprintln!(
                "Failed to open meal database `{}`: {err}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = match Session::try_new(&conn, stdin.lock(), stdout.lock()) {
        Ok(session) => session,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={}", err);
            eprintln!("Failed to prepare meal catalog: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "event=cli_start module=cli status=ok version={}",
        mealplan_core::core_version()
    );
    if let Err(err) = session.run() {
        error!("event=cli_session module=cli status=error error={}", err);
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
