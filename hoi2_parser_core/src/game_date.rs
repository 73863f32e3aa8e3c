use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::{
    TextDeserialize, TextDeserializer,
    common_deserialize::take_entries,
    text_deserialize::TextError,
    text_err,
};

#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    PartialOrd,
    Ord,
    Default,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum Month {
    #[default]
    JAN = 1,
    FEB,
    MAR,
    APR,
    MAY,
    JUN,
    JUL,
    AUG,
    SEP,
    OCT,
    NOV,
    DEC,
}
impl Month {
    const TOKENS: [&'static str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    pub fn length(&self) -> u8 {
        return [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31][*self as usize];
    }
    pub fn month_num(&self) -> u8 {
        return *self as u8;
    }
    /// The token used for this month in scenario files
    pub fn token(&self) -> &'static str {
        return Self::TOKENS[*self as usize - 1];
    }
    pub fn from_token(token: &str) -> Option<Month> {
        let index = Self::TOKENS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(token))?;
        return Month::from_usize(index + 1);
    }
}
impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            return f.write_str(self.token());
        }
        return f.write_fmt(format_args!("{}", self.month_num()));
    }
}
impl<'de> TextDeserialize<'de> for Month {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let text: &str = stream.parse()?;
        let month =
            Month::from_token(text).ok_or_else(|| text_err!("Invalid month token `{text}`"))?;
        return Ok((month, stream));
    }
}

/// A scenario date. `day` is 1-based in memory and 0-based on the wire.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize)]
pub struct GameDate {
    pub year: i32,
    pub month: Month,
    pub day: u8,
    pub hour: u8,
}
impl GameDate {
    pub fn new(year: i32, month: Month, day: u8) -> Self {
        return GameDate {
            year,
            month,
            day,
            hour: 0,
        };
    }
}
impl Default for GameDate {
    fn default() -> Self {
        return GameDate::new(1936, Month::JAN, 1);
    }
}

impl<'de> TextDeserialize<'de> for GameDate {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut year: Option<i32> = None;
        let mut month = Month::JAN;
        let mut day: u8 = 0;
        let mut hour: u8 = 0;
        take_entries(&mut stream, "date", true, |key, stream| {
            match key {
                "year" => year = Some(stream.parse()?),
                "month" => month = stream.parse()?,
                "day" => day = stream.parse::<u8>()?,
                "hour" => hour = stream.parse()?,
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        let year = year.ok_or_else(|| TextError::MissingExpectedField("year".to_string()))?;
        if day > 30 {
            return Err(text_err!("Invalid day {day} for month {month:#}"));
        }
        let date = GameDate {
            year,
            month,
            day: day + 1,
            hour,
        };
        return Ok((date, stream));
    }
}

/// Wire form, e.g. `{ year = 1936 month = january day = 0 }`
impl Display for GameDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ year = {} month = {:#} day = {}",
            self.year,
            self.month,
            self.day.saturating_sub(1)
        )?;
        if self.hour != 0 {
            write!(f, " hour = {}", self.hour)?;
        }
        return f.write_str(" }");
    }
}

/// Short form `YYYY.M.D` used by tools
impl FromStr for GameDate {
    type Err = TextError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts = text.trim().split('.').collect::<Vec<&str>>();
        let [y, m, d] = parts.as_slice() else {
            return Err(text_err!(
                "Date string '{text}' did not have a proper three parts"
            ));
        };
        let invalid = |_| text_err!("Invalid date {text}");
        let year = y.parse::<i32>().map_err(invalid)?;
        let month = Month::from_u8(m.parse::<u8>().map_err(invalid)?)
            .ok_or_else(|| text_err!("Invalid month {text}"))?;
        let day = d.parse::<u8>().map_err(invalid)?;
        if day == 0 || day > 31 {
            return Err(text_err!("Invalid day of month {text}"));
        }
        return Ok(GameDate::new(year, month, day));
    }
}
