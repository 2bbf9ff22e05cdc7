//! Line-driven terminal front end.
//!
//! Each stdin line is one user action; published results are printed as they
//! change. This is the terminal counterpart of the slider page.

use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use crate::client::BackendClient;
use crate::config::AppConfig;
use crate::coordinator::OperationResult;
use crate::core::{Knob, ParameterPatch, Session};
use crate::utils::{ImagifyError, ImagifyResult, read_source_image, save_payload};

const HELP: &str = "\
commands:
  <knob>=<value>   set enhancement|sharpness|clarity (0-100), e.g. enh=30
  apply            evaluate now without waiting
  retry            re-run the current parameters
  open <path>      select another image
  download         save the current result
  status           show parameters and result
  reset            clear image, parameters and result
  quit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Set(Knob, f64),
    Apply,
    Retry,
    Open(String),
    Download,
    Status,
    Reset,
    Help,
    Quit,
}

impl Action {
    pub fn parse(line: &str) -> ImagifyResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if let Some((knob, value)) = line.split_once('=') {
            let knob: Knob = knob.parse()?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| ImagifyError::config(format!("Not a number: {}", value.trim())))?;
            return Ok(Some(Self::Set(knob, value)));
        }

        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let action = match command {
            "apply" | "enhance" => Self::Apply,
            "retry" => Self::Retry,
            "open" if !rest.trim().is_empty() => Self::Open(rest.trim().to_string()),
            "download" => Self::Download,
            "status" => Self::Status,
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(ImagifyError::config(format!("Unknown command: {}", line))),
        };
        Ok(Some(action))
    }
}

/// One-line rendering of a result for the terminal.
pub fn render(result: &OperationResult) -> String {
    match result {
        OperationResult::Idle => "idle".to_string(),
        OperationResult::Pending(token) => format!("processing... ({})", token),
        OperationResult::Success(token, payload) => format!(
            "ready ({}): {} [{}, {} bytes], type 'download' to save",
            token,
            payload.file_name(),
            payload.content_type(),
            payload.len()
        ),
        OperationResult::Failed(token, err) => format!("error ({}): {}", token, err),
    }
}

/// Applies one action to the session. Returns false when the user quits.
pub async fn handle<C: BackendClient>(
    session: &mut Session<C>,
    action: Action,
    config: &AppConfig,
) -> ImagifyResult<bool> {
    match action {
        Action::Set(knob, value) => {
            let snapshot = session.update(&ParameterPatch::default().with(knob, value));
            println!("{}", snapshot);
        }
        Action::Apply => {
            session.apply()?;
        }
        Action::Retry => {
            session.retry()?;
        }
        Action::Open(path) => {
            let image = read_source_image(Path::new(&path)).await?;
            session.select_image(image);
        }
        Action::Download => match session.download() {
            Some(payload) => {
                let path = save_payload(&config.output_dir, &payload).await?;
                println!("saved {}", path.display());
            }
            None => println!("nothing to download yet"),
        },
        Action::Status => {
            let image = session.image().map(|i| i.file_name().to_string()).unwrap_or_else(|| "none".to_string());
            println!("{} | image: {} | {}", session.parameters(), image, render(&session.result()));
        }
        Action::Reset => session.reset(),
        Action::Help => println!("{}", HELP),
        Action::Quit => return Ok(false),
    }
    Ok(true)
}

/// Runs the read-eval loop until stdin closes or the user quits.
pub async fn run<C: BackendClient>(
    mut session: Session<C>,
    initial_image: Option<&Path>,
    config: &AppConfig,
) -> ImagifyResult<()> {
    if let Some(path) = initial_image {
        session.select_image(read_source_image(path).await?);
    }

    println!("{} session, type 'help' for commands", session.operation());
    let mut results = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };

                match Action::parse(&line) {
                    Ok(Some(action)) => match handle(&mut session, action, config).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => {
                            warn!("{}", e);
                            println!("{}", e);
                        }
                    },
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let rendered = render(&results.borrow_and_update());
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}
