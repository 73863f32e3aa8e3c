//! The `db/misc.txt` settings file: positional values grouped in named sections.

use std::{collections::BTreeMap, fmt::Display};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    TextDeserializer,
    common_deserialize::take_entries,
    format::general,
    game::{GameContext, GameType},
    text_deserialize::TextError,
    text_lexer::TextToken,
    text_writer::TextWriter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MiscSection {
    Economy,
    Intelligence,
    Diplomacy,
    Combat,
    Mission,
    Country,
    Research,
    Ai,
}
impl MiscSection {
    pub const ALL: [MiscSection; 8] = [
        MiscSection::Economy,
        MiscSection::Intelligence,
        MiscSection::Diplomacy,
        MiscSection::Combat,
        MiscSection::Mission,
        MiscSection::Country,
        MiscSection::Research,
        MiscSection::Ai,
    ];

    pub fn key(&self) -> &'static str {
        return match self {
            MiscSection::Economy => "economy",
            MiscSection::Intelligence => "intelligence",
            MiscSection::Diplomacy => "diplomacy",
            MiscSection::Combat => "combat",
            MiscSection::Mission => "mission",
            MiscSection::Country => "country",
            MiscSection::Research => "research",
            MiscSection::Ai => "ai",
        };
    }

    pub fn from_key(key: &str) -> Option<MiscSection> {
        return MiscSection::ALL
            .into_iter()
            .find(|section| section.key() == key);
    }
}
impl Display for MiscSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.write_str(self.key());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiscValueType {
    Dbl,
    Int,
    Bool,
}

/// Which games read an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Support {
    pub hoi2: bool,
    pub aod: bool,
    /// Darkest Hour from this version on
    pub dh: Option<u32>,
}
impl Support {
    const ALL: Support = Support {
        hoi2: true,
        aod: true,
        dh: Some(0),
    };
    const AOD: Support = Support {
        hoi2: false,
        aod: true,
        dh: None,
    };
    const AOD_DH: Support = Support {
        hoi2: false,
        aod: true,
        dh: Some(0),
    };
    const fn dh(version: u32) -> Support {
        return Support {
            hoi2: false,
            aod: false,
            dh: Some(version),
        };
    }

    pub fn supports(&self, context: &GameContext) -> bool {
        return match context.edition {
            GameType::HeartsOfIron2 => self.hoi2,
            GameType::ArsenalOfDemocracy => self.aod,
            GameType::DarkestHour => self.dh.is_some_and(|version| context.is_dh_at_least(version)),
        };
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MiscItem {
    pub section: MiscSection,
    pub name: &'static str,
    pub description: &'static str,
    pub value_type: MiscValueType,
    pub default: f64,
    pub support: Support,
}

macro_rules! misc_items {
    ($($section:ident { $($name:ident: $value_type:ident = $default:expr, $support:expr, $description:literal;)* })*) => {
        /// Every known item in file order
        pub const MISC_ITEMS: &[MiscItem] = &[
            $($(MiscItem {
                section: MiscSection::$section,
                name: stringify!($name),
                description: $description,
                value_type: MiscValueType::$value_type,
                default: $default,
                support: $support,
            },)*)*
        ];
    };
}

misc_items! {
    Economy {
        ic_to_tc_ratio: Dbl = 0.33, Support::ALL, "IC to TC ratio";
        ic_to_supplies_ratio: Dbl = 1.0, Support::ALL, "IC to supplies ratio";
        ic_to_consumer_goods_ratio: Dbl = 1.0, Support::ALL, "IC to consumer goods ratio";
        ic_to_money_ratio: Dbl = 0.5, Support::ALL, "IC to money ratio";
        dissent_change_speed: Dbl = 0.1, Support::AOD_DH, "Dissent change speed";
        min_available_ic: Dbl = 0.1, Support::AOD_DH, "Minimum available IC ratio";
        min_final_ic: Dbl = 0.1, Support::AOD_DH, "Minimum final IC ratio";
        dissent_reduction: Dbl = 2.0, Support::AOD_DH, "Dissent reduction per IC";
        max_gearing_bonus: Dbl = 0.5, Support::ALL, "Maximum gearing bonus";
        gearing_bonus_increment: Dbl = 0.1, Support::ALL, "Gearing bonus increment";
        ic_multiplier_non_national: Dbl = 0.5, Support::AOD_DH, "IC multiplier in non-national provinces";
        tc_load_factor_offensive: Dbl = 1.5, Support::dh(102), "TC load factor for offensives";
    }
    Intelligence {
        spy_mission_days: Int = 60.0, Support::ALL, "Days per spy mission";
        increase_spy_level_days: Int = 30.0, Support::ALL, "Days to increase spy level";
        chance_detect_spy_mission: Dbl = 0.05, Support::ALL, "Chance to detect a spy mission";
        relationships_hit_detected: Dbl = 5.0, Support::AOD_DH, "Relations hit when a mission is detected";
        show_third_country_spy_reports: Bool = 0.0, Support::AOD_DH, "Show third country spy reports";
    }
    Diplomacy {
        days_between_diplomatic_offers: Int = 14.0, Support::ALL, "Days between diplomatic offers";
        min_relation_for_alliance: Dbl = 50.0, Support::AOD_DH, "Minimum relation for an alliance";
        guarantee_days: Int = 365.0, Support::AOD_DH, "Guarantee length in days";
        puppet_dissent_bonus: Dbl = 0.0, Support::dh(103), "Dissent bonus of puppets";
    }
    Combat {
        land_xp_gain_factor: Dbl = 1.0, Support::ALL, "Land experience gain factor";
        naval_xp_gain_factor: Dbl = 1.0, Support::ALL, "Naval experience gain factor";
        air_xp_gain_factor: Dbl = 1.0, Support::ALL, "Air experience gain factor";
        division_xp_gain_factor: Dbl = 1.0, Support::ALL, "Division experience gain factor";
        leader_xp_gain_factor: Dbl = 1.0, Support::ALL, "Leader experience gain factor";
        attrition_severity: Dbl = 1.0, Support::ALL, "Attrition severity modifier";
        naval_combat_length: Int = 4.0, Support::AOD, "Naval combat length in hours";
        shore_bombardment_cap: Dbl = 0.25, Support::AOD_DH, "Shore bombardment cap";
        combat_event_chance: Dbl = 0.0001, Support::dh(102), "Chance of a combat event";
    }
    Mission {
        interdiction_efficiency: Dbl = 0.5, Support::ALL, "Interdiction efficiency";
        strategic_bombing_efficiency: Dbl = 0.5, Support::ALL, "Strategic bombing efficiency";
        convoy_raid_efficiency: Dbl = 0.5, Support::AOD_DH, "Convoy raid efficiency";
        mission_extend_days: Int = 30.0, Support::dh(102), "Days a mission can be extended";
    }
    Country {
        max_dissent: Dbl = 100.0, Support::ALL, "Maximum dissent";
        max_revolt_risk: Dbl = 100.0, Support::ALL, "Maximum revolt risk";
        manpower_growth: Dbl = 1.0, Support::ALL, "Manpower growth modifier";
        can_change_ideas: Bool = 1.0, Support::AOD, "Ideas can be changed";
        puppet_manpower_share: Dbl = 0.5, Support::dh(103), "Manpower shared by puppets";
    }
    Research {
        blueprint_bonus: Dbl = 0.5, Support::ALL, "Blueprint bonus";
        pre_historical_penalty: Dbl = 1.0, Support::ALL, "Penalty before the historical date";
        post_historical_bonus: Dbl = 0.7, Support::ALL, "Bonus after the historical date";
        research_cost_per_team: Dbl = 1.0, Support::AOD_DH, "Research cost per team";
    }
    Ai {
        ai_spy_diplomacy_chance: Dbl = 0.5, Support::ALL, "AI spy and diplomacy chance";
        ai_max_dissent: Dbl = 15.0, Support::ALL, "AI maximum accepted dissent";
        ai_peacetime_spy_missions: Bool = 1.0, Support::AOD_DH, "AI runs spy missions in peacetime";
        ai_focus_reserve: Dbl = 0.2, Support::dh(103), "AI reserve ratio";
    }
}

/// Values of `misc.txt` by item name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiscSettings {
    pub values: BTreeMap<String, f64>,
    /// Values past the last known item of a section, written back after it unchanged
    pub extra: BTreeMap<MiscSection, Vec<f64>>,
}
impl Default for MiscSettings {
    fn default() -> Self {
        return MiscSettings {
            values: MISC_ITEMS
                .iter()
                .map(|item| (item.name.to_string(), item.default))
                .collect(),
            extra: BTreeMap::new(),
        };
    }
}

/// Items of `section` read by the game of `context`, in file order
pub fn section_items(
    section: MiscSection,
    context: &GameContext,
) -> impl Iterator<Item = &'static MiscItem> + '_ {
    return MISC_ITEMS
        .iter()
        .filter(move |item| item.section == section && item.support.supports(context));
}

fn take_section_values<'de>(
    stream: &mut TextDeserializer<'de>,
) -> Result<Vec<f64>, TextError> {
    stream.parse_token(TextToken::OpenBracket)?;
    let mut values = Vec::new();
    loop {
        if let Some(TextToken::CloseBracket) = stream.peek_token() {
            stream.eat_token();
            return Ok(values);
        }
        let value = match stream.expect_token()? {
            TextToken::Int(value) => value as f64,
            TextToken::UInt(value) => value as f64,
            TextToken::Float(value) => value,
            TextToken::Bool(value) => f64::from(u8::from(value)),
            _ => return Err(TextError::UnexpectedToken),
        };
        values.push(value);
    }
}

impl MiscSettings {
    pub fn get(&self, name: &str) -> Option<f64> {
        return self.values.get(name).copied();
    }

    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let Some(slot) = self.values.get_mut(name) else {
            return false;
        };
        *slot = value;
        return true;
    }

    /// Reads `misc.txt`. Items missing from a section keep their defaults.
    pub fn read(text: &str, context: &GameContext) -> Result<Self, TextError> {
        let mut settings = MiscSettings::default();
        let mut stream = TextDeserializer::from_str(text);
        take_entries(&mut stream, "misc", false, |key, stream| {
            let Some(section) = MiscSection::from_key(key) else {
                return Ok(false);
            };
            let mut values = take_section_values(stream)?;
            let items = section_items(section, context).collect::<Vec<_>>();
            if values.len() > items.len() {
                let extra = values.split_off(items.len());
                debug!("Keeping {} unknown values of misc section {section}", extra.len());
                settings.extra.insert(section, extra);
            } else {
                if values.len() < items.len() {
                    debug!(
                        "Misc section {section} has {} of {} values",
                        values.len(),
                        items.len()
                    );
                }
                settings.extra.remove(&section);
            }
            for (item, value) in items.into_iter().zip(values) {
                settings.values.insert(item.name.to_string(), value);
            }
            return Ok(true);
        })?;
        return Ok(settings);
    }

    pub fn write(&self, out: &mut TextWriter, context: &GameContext) {
        for section in MiscSection::ALL {
            out.open(section.key());
            for item in section_items(section, context) {
                let value = self.get(item.name).unwrap_or(item.default);
                let text = match item.value_type {
                    MiscValueType::Dbl => general(value),
                    MiscValueType::Int | MiscValueType::Bool => (value.round() as i64).to_string(),
                };
                out.line(format_args!("{text}\t# {}", item.description));
            }
            for value in self.extra.get(&section).into_iter().flatten() {
                out.line(general(*value));
            }
            out.close();
        }
    }
}
