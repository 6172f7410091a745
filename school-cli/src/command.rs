use crate::simulation::{point, Simulation};
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// A line of input in interactive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request a single step and run the frame that honours it
    Step,
    /// Toggle continuous play
    TogglePlay,
    /// Run this many frames
    Frames(u64),
    /// Print the centre of mass
    Centre,
    /// Print a full snapshot
    Dump,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            bail!("Empty command");
        };

        let command = match word {
            "s" | "step" => Command::Step,
            "p" | "play" => Command::TogglePlay,
            "f" | "frame" => {
                let count = match words.next() {
                    Some(count) => count
                        .parse()
                        .with_context(|| format!("Invalid frame count '{}'", count))?,
                    None => 1,
                };
                Command::Frames(count)
            }
            "c" | "centre" => Command::Centre,
            "d" | "dump" => Command::Dump,
            "q" | "quit" => Command::Quit,
            other => bail!("Unknown command '{}'", other),
        };

        if let Some(extra) = words.next() {
            bail!("Unexpected argument '{}'", extra);
        }

        Ok(command)
    }
}

/// Reads commands line by line until `quit` or end of input.
///
/// Bad lines are reported on `out` and skipped.
pub fn run_interactive<R: BufRead, W: Write>(
    simulation: &mut Simulation,
    input: R,
    out: &mut W,
) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                log::warn!("{}", e);
                writeln!(out, "{}", json!({ "error": e.to_string() }))?;
                continue;
            }
        };
        log::debug!("Command: {:?}", command);

        match command {
            Command::Step => {
                simulation.playback_mut().request_step();
                simulation.frame();
                write_status(simulation, out)?;
            }
            Command::TogglePlay => {
                simulation.playback_mut().toggle_play();
                write_status(simulation, out)?;
            }
            Command::Frames(count) => {
                for _ in 0..count {
                    simulation.frame();
                }
                write_status(simulation, out)?;
            }
            Command::Centre => {
                let centre = point(simulation.school().centre_of_mass());
                writeln!(out, "{}", json!({ "centre_of_mass": centre }))?;
            }
            Command::Dump => {
                writeln!(out, "{}", simulation.snapshot().to_json()?)?;
            }
            Command::Quit => {
                log::info!("Quit requested");
                break;
            }
        }
        out.flush()?;
    }

    Ok(())
}

fn write_status<W: Write>(simulation: &Simulation, out: &mut W) -> Result<()> {
    let status = json!({
        "step": simulation.steps(),
        "playing": simulation.playback().is_playing(),
    });
    writeln!(out, "{}", status)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("s".parse::<Command>().unwrap(), Command::Step);
        assert_eq!("play".parse::<Command>().unwrap(), Command::TogglePlay);
        assert_eq!("f".parse::<Command>().unwrap(), Command::Frames(1));
        assert_eq!("frame 25".parse::<Command>().unwrap(), Command::Frames(25));
        assert_eq!(" c ".parse::<Command>().unwrap(), Command::Centre);
        assert_eq!("dump".parse::<Command>().unwrap(), Command::Dump);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("jump".parse::<Command>().is_err());
        assert!("f lots".parse::<Command>().is_err());
        assert!("s 3".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
