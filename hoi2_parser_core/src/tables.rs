//! Fixed string tables for the enumerations used in scenario files.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use crate::{TextDeserialize, TextDeserializer, text_deserialize::TextError, text_err};

/// Declares an enum backed by a fixed string table, with `as_str`, [`FromStr`],
/// [`Display`] and [`TextDeserialize`].
///
/// With `fallback Variant`, unknown strings are kept in `Variant(String)` instead of failing.
macro_rules! string_enum {
    (@common $name:ident) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                return f.write_str(self.as_str());
            }
        }
        impl<'de> TextDeserialize<'de> for $name {
            fn take_text(
                mut stream: TextDeserializer<'de>,
            ) -> Result<(Self, TextDeserializer<'de>), TextError> {
                let text: &str = stream.parse()?;
                return Ok((text.parse()?, stream));
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident (default $default:ident) {
            $($variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $($variant,)*
        }
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn as_str(&self) -> &'static str {
                return match self {
                    $($name::$variant => $text,)*
                };
            }
        }
        impl Default for $name {
            fn default() -> Self {
                return $name::$default;
            }
        }
        impl FromStr for $name {
            type Err = TextError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                return match text {
                    $($text => Ok($name::$variant),)*
                    _ => Err(text_err!("Unknown {} `{text}`", stringify!($name))),
                };
            }
        }
        string_enum!(@common $name);
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident (default $default:ident, fallback $fallback:ident) {
            $($variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $($variant,)*
            $fallback(String),
        }
        impl $name {
            pub fn as_str(&self) -> &str {
                return match self {
                    $($name::$variant => $text,)*
                    $name::$fallback(text) => text,
                };
            }
        }
        impl Default for $name {
            fn default() -> Self {
                return $name::$default;
            }
        }
        impl FromStr for $name {
            type Err = TextError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                return Ok(match text {
                    $($text => $name::$variant,)*
                    _ => {
                        log::debug!("Keeping unlisted {} `{text}`", stringify!($name));
                        $name::$fallback(text.to_string())
                    }
                });
            }
        }
        string_enum!(@common $name);
    };
}

string_enum! {
    pub enum TreatyType (default NonAggression) {
        NonAggression => "non_aggression",
        Peace => "peace",
        Trade => "trade",
    }
}

string_enum! {
    pub enum GovernmentType (default SocialConservative) {
        Nazi => "nazi",
        Fascist => "fascist",
        PaternalAutocrat => "paternal_autocrat",
        SocialConservative => "social_conservative",
        MarketLiberal => "market_liberal",
        SocialLiberal => "social_liberal",
        SocialDemocrat => "social_democrat",
        LeftWingRadical => "left_wing_radical",
        Leninist => "leninist",
        Stalinist => "stalinist",
    }
}

string_enum! {
    pub enum ConvoyType (default Transports) {
        Transports => "transports",
        Escorts => "escorts",
    }
}

string_enum! {
    /// Buildings that can be queued in a `province_development`
    pub enum BuildingType (default Ic) {
        Ic => "ic",
        Infrastructure => "infra",
        LandFort => "landfort",
        CoastalFort => "coastalfort",
        AntiAir => "anti_air",
        AirBase => "air_base",
        NavalBase => "naval_base",
        RadarStation => "radar_station",
        NuclearReactor => "nuclear_reactor",
        RocketTest => "rocket_test",
        SyntheticOil => "synthetic_oil",
        SyntheticRares => "synthetic_rares",
        NuclearPower => "nuclear_power",
    }
}

string_enum! {
    pub enum WeatherType (default Fine) {
        Fine => "fine",
        Overcast => "overcast",
        Rain => "rain",
        Snow => "snow",
        Storm => "storm",
        Blizzard => "blizzard",
    }
}

string_enum! {
    /// Division and brigade types. Mod-defined types are kept as `Other`.
    pub enum UnitType (default Infantry, fallback Other) {
        // land divisions
        Infantry => "infantry",
        Cavalry => "cavalry",
        Motorized => "motorized",
        Mechanized => "mechanized",
        LightArmor => "light_armor",
        Armor => "armor",
        Garrison => "garrison",
        Hq => "hq",
        Paratrooper => "paratrooper",
        Marine => "marine",
        Bergsjaeger => "bergsjaeger",
        Militia => "militia",
        // naval
        Battleship => "battleship",
        LightCruiser => "light_cruiser",
        HeavyCruiser => "heavy_cruiser",
        Battlecruiser => "battlecruiser",
        Destroyer => "destroyer",
        Carrier => "carrier",
        EscortCarrier => "escort_carrier",
        Submarine => "submarine",
        NuclearSubmarine => "nuclear_submarine",
        Transport => "transport",
        // air
        MultiRole => "multi_role",
        Interceptor => "interceptor",
        StrategicBomber => "strategic_bomber",
        TacticalBomber => "tactical_bomber",
        NavalBomber => "naval_bomber",
        Cas => "cas",
        TransportPlane => "transport_plane",
        FlyingBomb => "flying_bomb",
        FlyingRocket => "flying_rocket",
        // brigades
        Artillery => "artillery",
        SpArtillery => "sp_artillery",
        RocketArtillery => "rocket_artillery",
        SpRctArtillery => "sp_rct_artillery",
        AntiTank => "anti_tank",
        TankDestroyer => "tank_destroyer",
        LightArmorBrigade => "light_armor_brigade",
        HeavyArmor => "heavy_armor",
        SuperHeavyArmor => "super_heavy_armor",
        ArmoredCar => "armored_car",
        AntiAir => "anti_air",
        Police => "police",
        Engineer => "engineer",
        Cag => "cag",
        Escort => "escort",
        NavalAsw => "naval_asw",
        NavalAntiAirS => "naval_anti_air_s",
        NavalRadarS => "naval_radar_s",
        NavalFireControllS => "naval_fire_controll_s",
        NavalImprovedHullS => "naval_improved_hull_s",
        NavalTorpedoesS => "naval_torpedoes_s",
        NavalAntiAirL => "naval_anti_air_l",
        NavalRadarL => "naval_radar_l",
        NavalFireControllL => "naval_fire_controll_l",
        NavalImprovedHullL => "naval_improved_hull_l",
        NavalTorpedoesL => "naval_torpedoes_l",
        NavalMines => "naval_mines",
        NavalSaL => "naval_sa_l",
        NavalSpotterL => "naval_spotter_l",
        NavalSpotterS => "naval_spotter_s",
    }
}

/// A three character country tag, e.g. `GER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryTag([u8; 3]);
impl CountryTag {
    /// The rebels
    pub const REBELS: CountryTag = CountryTag(*b"REB");

    pub fn as_str(&self) -> &str {
        // only ever constructed from ASCII
        return std::str::from_utf8(&self.0).unwrap_or("???");
    }
}
impl FromStr for CountryTag {
    type Err = TextError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 3] = text
            .as_bytes()
            .try_into()
            .map_err(|_| text_err!("Country tag `{text}` is not three characters"))?;
        if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(text_err!("Country tag `{text}` is not alphanumeric"));
        }
        return Ok(CountryTag(bytes.map(|b| b.to_ascii_uppercase())));
    }
}
/// Records not yet assigned to a country belong to the rebels
impl Default for CountryTag {
    fn default() -> Self {
        return CountryTag::REBELS;
    }
}
impl TryFrom<String> for CountryTag {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        return value.parse();
    }
}
impl From<CountryTag> for String {
    fn from(value: CountryTag) -> Self {
        return value.as_str().to_string();
    }
}
impl Display for CountryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.write_str(self.as_str());
    }
}
impl<'de> TextDeserialize<'de> for CountryTag {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let text: &str = stream.parse()?;
        return Ok((text.parse()?, stream));
    }
}

const HOI2_COUNTRIES: &[&str] = &[
    "AFG", "ALB", "ARG", "AST", "AUS", "BEL", "BHU", "BOL", "BRA", "BUL", "CAN", "CGX", "CHC",
    "CHI", "CHL", "CLM", "COS", "CSX", "CUB", "CYN", "CZE", "DEN", "DOM", "ECU", "EGY", "ENG",
    "EST", "ETH", "FIN", "FRA", "GER", "GRE", "GUA", "GXC", "HAI", "HOL", "HON", "HUN", "ICL",
    "IND", "IRE", "IRQ", "ITA", "JAP", "KOR", "LAT", "LIB", "LIT", "LUX", "MAN", "MEN", "MEX",
    "MON", "NEP", "NIC", "NOR", "NZL", "OMN", "PAL", "PAN", "PAR", "PER", "PHI", "POL", "POR",
    "PRK", "PRU", "RSI", "ROM", "SAF", "SAU", "SCH", "SIA", "SIK", "SIN", "SLO", "SOV", "SPA",
    "SPR", "SWE", "SYR", "TAN", "TEX", "TIB", "TUR", "UKR", "URU", "USA", "VEN", "VIC", "VIE",
    "YEM", "YUG",
];

/// Immutable lookup tables shared by the readers and writers of one document
#[derive(Debug, Clone)]
pub struct Tables {
    countries: BTreeSet<CountryTag>,
}
impl Tables {
    pub fn new(countries: impl IntoIterator<Item = CountryTag>) -> Self {
        return Tables {
            countries: countries.into_iter().collect(),
        };
    }

    /// The base game countries plus the user-defined `U00` to `U99`
    pub fn standard() -> Self {
        let named = HOI2_COUNTRIES.iter().filter_map(|tag| tag.parse().ok());
        let user = (0..100).filter_map(|n| format!("U{n:02}").parse().ok());
        return Tables::new(named.chain(user));
    }

    pub fn is_country(&self, tag: &str) -> bool {
        return tag
            .parse::<CountryTag>()
            .is_ok_and(|tag| self.countries.contains(&tag));
    }

    /// Every known country, in tag order
    pub fn countries(&self) -> impl Iterator<Item = CountryTag> + '_ {
        return self.countries.iter().copied();
    }
}
impl Default for Tables {
    fn default() -> Self {
        return Tables::standard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_tables() {
        assert_eq!(TreatyType::NonAggression.as_str(), "non_aggression");
        assert_eq!("trade".parse::<TreatyType>().unwrap(), TreatyType::Trade);
        assert!("alliance".parse::<TreatyType>().is_err());
        assert_eq!(WeatherType::ALL.len(), 6);
        assert_eq!(BuildingType::Infrastructure.to_string(), "infra");
    }

    #[test]
    fn test_unit_fallback() {
        assert_eq!("armor".parse::<UnitType>().unwrap(), UnitType::Armor);
        let custom = "d_rsv_33".parse::<UnitType>().unwrap();
        assert_eq!(custom, UnitType::Other("d_rsv_33".to_string()));
        assert_eq!(custom.as_str(), "d_rsv_33");
    }

    #[test]
    fn test_country_tags() {
        let tag: CountryTag = "ger".parse().unwrap();
        assert_eq!(tag.to_string(), "GER");
        assert!("GERM".parse::<CountryTag>().is_err());
        assert!("G-R".parse::<CountryTag>().is_err());

        let tables = Tables::standard();
        assert!(tables.is_country("SOV"));
        assert!(tables.is_country("U42"));
        assert!(!tables.is_country("XYZ"));
        assert!(!tables.is_country("name"));
    }

    #[test]
    fn test_country_tag_serde() {
        let tag: CountryTag = "ITA".parse().unwrap();
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"ITA\"");
        let back: CountryTag = serde_json::from_str("\"ITA\"").unwrap();
        assert_eq!(back, tag);
    }
}
