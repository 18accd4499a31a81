//! Operator commands typed on stdin.

use std::str::FromStr;

use anyhow::Result;

use crate::display::{render_status, render_view};
use crate::sensing::ProcessTable;

use super::{MonitorController, ViewMode};

pub const HELP: &str = "\
Commands:
  start     begin recording the playing track
  stop      stop recording (history is kept)
  toggle    start if stopped, stop if running
  recent    show the most recent tracks
  artists   show artists ranked by play count
  status    show what is playing now
  export    print the whole history as JSON
  settings  print the active settings as JSON
  help      show this list
  quit      stop recording and exit
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Stop,
    Toggle,
    View(ViewMode),
    Status,
    Export,
    Settings,
    Help,
    Quit,
}

impl FromStr for OperatorCommand {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let command = match input.trim().to_ascii_lowercase().as_str() {
            "start" => OperatorCommand::Start,
            "stop" => OperatorCommand::Stop,
            "toggle" => OperatorCommand::Toggle,
            "recent" | "songs" => OperatorCommand::View(ViewMode::RecentSongs),
            "artists" | "top" => OperatorCommand::View(ViewMode::MostPlayedArtists),
            "status" => OperatorCommand::Status,
            "export" => OperatorCommand::Export,
            "settings" => OperatorCommand::Settings,
            "help" | "?" => OperatorCommand::Help,
            "quit" | "exit" | "q" => OperatorCommand::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs `command` and returns the text to show the operator.
pub async fn dispatch<T: ProcessTable>(
    controller: &MonitorController<T>,
    command: OperatorCommand,
) -> Result<(String, Flow)> {
    let output = match command {
        OperatorCommand::Start => {
            if controller.start().await? {
                "Updating started.".to_string()
            } else {
                "Already updating.".to_string()
            }
        }
        OperatorCommand::Stop => {
            if controller.stop().await? {
                "Updating stopped.".to_string()
            } else {
                "Not updating.".to_string()
            }
        }
        OperatorCommand::Toggle => {
            if controller.toggle().await? {
                "Updating started.".to_string()
            } else {
                "Updating stopped.".to_string()
            }
        }
        OperatorCommand::View(mode) => {
            let view = controller.view(mode).await?;
            render_view(&view).trim_end().to_string()
        }
        OperatorCommand::Status => render_status(&controller.snapshot()),
        OperatorCommand::Export => controller.export_json().await?,
        OperatorCommand::Settings => serde_json::to_string_pretty(controller.settings())?,
        OperatorCommand::Help => HELP.trim_end().to_string(),
        OperatorCommand::Quit => {
            controller.stop().await?;
            return Ok(("Bye.".to_string(), Flow::Quit));
        }
    };
    Ok((output, Flow::Continue))
}
