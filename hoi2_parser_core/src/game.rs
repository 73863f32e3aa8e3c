use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::{text_deserialize::TextError, text_err};

/// The supported editions of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameType {
    #[default]
    HeartsOfIron2,
    ArsenalOfDemocracy,
    DarkestHour,
}
impl GameType {
    pub fn short_name(&self) -> &'static str {
        return match self {
            GameType::HeartsOfIron2 => "hoi2",
            GameType::ArsenalOfDemocracy => "aod",
            GameType::DarkestHour => "dh",
        };
    }
}
impl Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            return f.write_str(match self {
                GameType::HeartsOfIron2 => "Hearts of Iron II",
                GameType::ArsenalOfDemocracy => "Arsenal of Democracy",
                GameType::DarkestHour => "Darkest Hour",
            });
        }
        return f.write_str(self.short_name());
    }
}
impl FromStr for GameType {
    type Err = TextError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        return match text.to_ascii_lowercase().as_str() {
            "hoi2" | "heartsofiron2" => Ok(GameType::HeartsOfIron2),
            "aod" | "arsenalofdemocracy" => Ok(GameType::ArsenalOfDemocracy),
            "dh" | "darkesthour" => Ok(GameType::DarkestHour),
            _ => Err(text_err!("Unknown game edition `{text}`")),
        };
    }
}

/// The edition and version a scenario is read and written for.
///
/// `version` is the edition's version number with the dot removed, e.g. Darkest Hour 1.03 is `103`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameContext {
    pub edition: GameType,
    pub version: u32,
}
impl GameContext {
    pub fn new(edition: GameType, version: u32) -> Self {
        return GameContext { edition, version };
    }

    pub fn is(&self, edition: GameType) -> bool {
        return self.edition == edition;
    }

    pub fn is_aod(&self) -> bool {
        return self.is(GameType::ArsenalOfDemocracy);
    }

    pub fn is_dh(&self) -> bool {
        return self.is(GameType::DarkestHour);
    }

    /// Darkest Hour at or above `version`
    pub fn is_dh_at_least(&self, version: u32) -> bool {
        return self.is_dh() && self.version >= version;
    }
}
impl Default for GameContext {
    fn default() -> Self {
        return GameContext::new(GameType::HeartsOfIron2, 130);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edition() {
        assert_eq!("AoD".parse::<GameType>().unwrap(), GameType::ArsenalOfDemocracy);
        assert_eq!("dh".parse::<GameType>().unwrap(), GameType::DarkestHour);
        assert!("eu4".parse::<GameType>().is_err());
        assert_eq!(format!("{:#}", GameType::DarkestHour), "Darkest Hour");
    }

    #[test]
    fn test_version_gate() {
        let context = GameContext::new(GameType::DarkestHour, 103);
        assert!(context.is_dh_at_least(102));
        assert!(!context.is_dh_at_least(104));
        assert!(!GameContext::new(GameType::ArsenalOfDemocracy, 200).is_dh_at_least(100));
    }
}
