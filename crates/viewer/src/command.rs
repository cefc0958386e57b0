//! Line-oriented commands read from stdin.
//!
//! | Command          | Effect                                              |
//! |------------------|-----------------------------------------------------|
//! | `click <region>` | click a region proxy (ignored on inert regions)     |
//! | `select <region>`| select from the region list, bypassing the heatmap  |
//! | `clear`          | clear the selection                                 |
//! | `day <day>`      | set the reference day (`YYYY-MM-DD`, `today`, `now`)|
//! | `new`            | consume the selection into a new-log draft          |
//! | `refresh`        | re-read the log source                              |
//! | `quit`           | exit                                                |

use std::str::FromStr;

use chrono::NaiveDate;

use bodymap_core::error::CoreError;
use bodymap_core::regions::DetailedRegion;

use crate::config::parse_reference_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Click(DetailedRegion),
    Select(DetailedRegion),
    Clear,
    Day(Option<NaiveDate>),
    NewLog,
    Refresh,
    Quit,
}

impl FromStr for Command {
    type Err = CoreError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let command = match (verb.to_ascii_lowercase().as_str(), arg.is_empty()) {
            ("click", false) => Command::Click(arg.parse()?),
            ("select", false) => Command::Select(arg.parse()?),
            ("clear", true) => Command::Clear,
            ("day", _) => Command::Day(parse_reference_day(arg)?),
            ("new", true) => Command::NewLog,
            ("refresh", true) => Command::Refresh,
            ("quit" | "exit", true) => Command::Quit,
            _ => {
                return Err(CoreError::Validation(format!(
                    "unrecognized command {line:?}"
                )))
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_region_commands() {
        assert_eq!(
            "click left_hand".parse::<Command>().unwrap(),
            Command::Click(DetailedRegion::LeftHand)
        );
        assert_eq!(
            "SELECT  Right Upper Leg ".parse::<Command>().unwrap(),
            Command::Select(DetailedRegion::RightUpperLeg)
        );
    }

    #[test]
    fn region_commands_need_detailed_region() {
        assert_matches!(
            "click left_arm".parse::<Command>(),
            Err(CoreError::UnknownToken { .. })
        );
        assert_matches!("click".parse::<Command>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parses_day() {
        assert_eq!(
            "day 2024-01-31".parse::<Command>().unwrap(),
            Command::Day(NaiveDate::from_ymd_opt(2024, 1, 31))
        );
        assert_eq!("day now".parse::<Command>().unwrap(), Command::Day(None));
        assert_matches!("day soon".parse::<Command>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parses_bare_verbs() {
        assert_eq!("clear".parse::<Command>().unwrap(), Command::Clear);
        assert_eq!("new".parse::<Command>().unwrap(), Command::NewLog);
        assert_eq!("refresh".parse::<Command>().unwrap(), Command::Refresh);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_unknown_and_extra_arguments() {
        assert!("dance".parse::<Command>().is_err());
        assert!("clear now".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
