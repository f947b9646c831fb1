//! Line commands for the headless player binary

use std::str::FromStr;

use crate::error::Error;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Jump to queue index
    Play(usize),
    Next,
    Previous,
    Toggle,
    Pause,
    Resume,
    /// Explicit user seek (ms)
    Seek(u64),
    /// Engine heartbeat position (ms)
    Progress(u64),
    /// Engine reports the current item finished
    Complete,
    Stop,
    Status,
    Quit,
}

impl PlayerCommand {
    /// Apply a transport or navigation command
    ///
    /// `Status` and `Quit` are handled by the caller and do nothing here.
    pub fn apply(self, player: &mut Player) {
        match self {
            PlayerCommand::Play(index) => player.jump_to(index),
            PlayerCommand::Next => player.next(),
            PlayerCommand::Previous => player.previous(),
            PlayerCommand::Toggle => player.toggle_play_pause(),
            PlayerCommand::Pause => player.pause(),
            PlayerCommand::Resume => player.resume(),
            PlayerCommand::Seek(position_ms) => player.seek_to(position_ms),
            PlayerCommand::Progress(position_ms) => player.update_progress(position_ms),
            PlayerCommand::Complete => {
                player.complete_current();
            }
            PlayerCommand::Stop => {
                player.stop();
            }
            PlayerCommand::Status | PlayerCommand::Quit => {}
        }
    }
}

impl FromStr for PlayerCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        let command = match verb.as_str() {
            "play" => PlayerCommand::Play(number(arg, "play")?),
            "next" | "n" => PlayerCommand::Next,
            "prev" | "previous" | "p" => PlayerCommand::Previous,
            "toggle" | "t" => PlayerCommand::Toggle,
            "pause" => PlayerCommand::Pause,
            "resume" => PlayerCommand::Resume,
            "seek" => PlayerCommand::Seek(number(arg, "seek")?),
            "progress" => PlayerCommand::Progress(number(arg, "progress")?),
            "complete" => PlayerCommand::Complete,
            "stop" => PlayerCommand::Stop,
            "status" | "s" => PlayerCommand::Status,
            "quit" | "exit" | "q" => PlayerCommand::Quit,
            "" => return Err(invalid("empty command".to_string())),
            other => return Err(invalid(format!("unknown command: {other}"))),
        };
        Ok(command)
    }
}

/// Parse the numeric argument of `name` straight into its target type
fn number<T>(arg: Option<&str>, name: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    arg.ok_or_else(|| invalid(format!("{name} needs a number")))?
        .parse::<T>()
        .map_err(|e| invalid(format!("{name}: {e}")))
}

fn invalid(message: String) -> Error {
    Error::Common(mixtape_common::Error::InvalidInput(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("next".parse::<PlayerCommand>().unwrap(), PlayerCommand::Next);
        assert_eq!("  PREV ".parse::<PlayerCommand>().unwrap(), PlayerCommand::Previous);
        assert_eq!("seek 4500".parse::<PlayerCommand>().unwrap(), PlayerCommand::Seek(4_500));
        assert_eq!("progress 10".parse::<PlayerCommand>().unwrap(), PlayerCommand::Progress(10));
        assert_eq!("play 2".parse::<PlayerCommand>().unwrap(), PlayerCommand::Play(2));
        assert_eq!("q".parse::<PlayerCommand>().unwrap(), PlayerCommand::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<PlayerCommand>().is_err());
        assert!("seek".parse::<PlayerCommand>().is_err());
        assert!("seek soon".parse::<PlayerCommand>().is_err());
        assert!("dance".parse::<PlayerCommand>().is_err());
    }

    #[test]
    fn test_play_index_parsed_as_usize() {
        let max = format!("play {}", usize::MAX);
        assert_eq!(max.parse::<PlayerCommand>().unwrap(), PlayerCommand::Play(usize::MAX));

        // One past usize::MAX is rejected rather than wrapped
        let overflow = format!("play {}", u128::from(u64::MAX) + 1);
        assert!(overflow.parse::<PlayerCommand>().is_err());
        assert!("play -1".parse::<PlayerCommand>().is_err());
    }
}
