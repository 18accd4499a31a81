pub mod db;
pub mod display;
pub mod error;
pub mod history;
pub mod monitor;
pub mod sensing;
pub mod settings;
pub mod tracks;
pub mod utils;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use db::Database;
use monitor::commands::{dispatch, Flow, OperatorCommand, HELP};
use monitor::MonitorController;
use sensing::{ProcessTable, SystemProcessTable};
use settings::MonitorSettings;

pub fn run() -> Result<()> {
    let (settings, rejected) = MonitorSettings::from_env();
    utils::logging::init_logging(settings.debug);
    for message in &rejected {
        warn!("{message}");
    }

    info!("Spotistats starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build the async runtime")?;

    runtime.block_on(async move {
        let database = Database::new(settings.db_path.clone())?;
        info!("History file: {}", database.path().display());

        let controller =
            MonitorController::new(database, SystemProcessTable::new(), settings).await?;
        let display = display::spawn_console_display(controller.subscribe());

        controller.start().await?;
        println!("{}", HELP.trim_end());

        let result = operator_loop(&controller).await;

        // Waits for an in-flight append to land.
        controller.stop().await?;
        display.abort();
        info!("Spotistats shut down");
        result
    })
}

/// Reads operator commands from stdin until `quit`, end of input or Ctrl-C.
async fn operator_loop<T: ProcessTable>(controller: &MonitorController<T>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Ok(());
            }
        };

        let Some(line) = line else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<OperatorCommand>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}\n{}", HELP.trim_end());
                continue;
            }
        };

        match dispatch(controller, command).await {
            Ok((output, flow)) => {
                println!("{output}");
                if flow == Flow::Quit {
                    return Ok(());
                }
            }
            Err(err) => {
                warn!("command failed: {err:#}");
                println!("error: {err:#}");
            }
        }
    }
}
