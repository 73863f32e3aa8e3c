use hoi2_parser_macros::TextDeserialize;
use serde::{Deserialize, Serialize};

use crate::{
    GameDate, TextDeserialize, TextDeserializer,
    common_deserialize::take_entries,
    format::{NumberStyle, yes_no},
    presence::significant,
    scenario::TypeId,
    tables::{CountryTag, TreatyType},
    text_deserialize::TextError,
    text_err,
    text_lexer::TextToken,
    text_writer::TextWriter,
};

/// What the player is allowed to change. All allowed is the default and is not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct Rules {
    pub diplomacy: bool,
    pub production: bool,
    pub technology: bool,
}
impl Default for Rules {
    fn default() -> Self {
        return Rules {
            diplomacy: true,
            production: true,
            technology: true,
        };
    }
}
impl Rules {
    pub fn is_default(&self) -> bool {
        return self.diplomacy && self.production && self.technology;
    }

    fn write(&self, out: &mut TextWriter) {
        if self.is_default() {
            return;
        }
        out.open("rules");
        out.bool("diplomacy", self.diplomacy);
        out.bool("production", self.production);
        out.bool("technology", self.technology);
        out.close();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct Alliance {
    pub id: Option<TypeId>,
    pub participant: Vec<CountryTag>,
    pub name: Option<String>,
}
impl Alliance {
    fn write(&self, key: &str, out: &mut TextWriter) {
        out.open(key);
        out.opt_field("id", self.id);
        out.list("participant", &self.participant);
        if let Some(name) = &self.name {
            out.string("name", name);
        }
        out.close();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct WarSide {
    pub id: Option<TypeId>,
    pub participant: Vec<CountryTag>,
}
impl WarSide {
    fn write(&self, key: &str, out: &mut TextWriter) {
        out.open(key);
        out.opt_field("id", self.id);
        out.list("participant", &self.participant);
        out.close();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct War {
    pub id: Option<TypeId>,
    pub date: Option<GameDate>,
    pub enddate: Option<GameDate>,
    pub attackers: WarSide,
    pub defenders: WarSide,
}
impl War {
    fn write(&self, out: &mut TextWriter) {
        out.open("war");
        out.opt_field("id", self.id);
        out.opt_field("date", self.date);
        out.opt_field("enddate", self.enddate);
        self.attackers.write("attackers", out);
        self.defenders.write("defenders", out);
        out.close();
    }
}

/// A non-aggression pact, peace or trade agreement between two countries.
///
/// Quantities are signed; for trades the sign is the direction of the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treaty {
    pub kind: TreatyType,
    pub id: Option<TypeId>,
    pub countries: [CountryTag; 2],
    pub start_date: Option<GameDate>,
    pub expiry_date: Option<GameDate>,
    pub energy: f64,
    pub metal: f64,
    pub rare_materials: f64,
    pub oil: f64,
    pub supplies: f64,
    pub money: f64,
    /// `cancel = no` is written only when this is false
    pub cancel: bool,
}
impl Treaty {
    pub fn new(kind: TreatyType, first: CountryTag, second: CountryTag) -> Self {
        return Treaty {
            kind,
            id: None,
            countries: [first, second],
            start_date: None,
            expiry_date: None,
            energy: 0.0,
            metal: 0.0,
            rare_materials: 0.0,
            oil: 0.0,
            supplies: 0.0,
            money: 0.0,
            cancel: true,
        };
    }

    fn quantities(&self) -> [(&'static str, f64); 6] {
        return [
            ("energy", self.energy),
            ("metal", self.metal),
            ("rare_materials", self.rare_materials),
            ("oil", self.oil),
            ("supplies", self.supplies),
            ("money", self.money),
        ];
    }

    pub fn write(&self, out: &mut TextWriter) {
        out.open("treaty");
        out.opt_field("id", self.id);
        out.field("type", self.kind);
        for country in &self.countries {
            out.string("country", country.as_str());
        }
        out.opt_field("startdate", self.start_date);
        out.opt_field("expirydate", self.expiry_date);
        for (key, value) in self.quantities() {
            out.opt_number(key, significant(value), NumberStyle::Fixed(1));
        }
        if !self.cancel {
            out.field("cancel", yes_no(false));
        }
        out.close();
    }
}
impl<'de> TextDeserialize<'de> for Treaty {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut kind: Option<TreatyType> = None;
        let mut countries: Vec<CountryTag> = Vec::new();
        let mut treaty = Treaty::new(
            TreatyType::default(),
            CountryTag::default(),
            CountryTag::default(),
        );
        take_entries(&mut stream, "treaty", true, |key, stream| {
            match key {
                "id" => treaty.id = Some(stream.parse()?),
                "type" => kind = Some(stream.parse()?),
                "country" => countries.push(stream.parse()?),
                "startdate" => treaty.start_date = Some(stream.parse()?),
                "expirydate" => treaty.expiry_date = Some(stream.parse()?),
                "energy" => treaty.energy = stream.parse()?,
                "metal" => treaty.metal = stream.parse()?,
                "rare_materials" => treaty.rare_materials = stream.parse()?,
                "oil" => treaty.oil = stream.parse()?,
                "supplies" => treaty.supplies = stream.parse()?,
                "money" => treaty.money = stream.parse()?,
                "cancel" => treaty.cancel = stream.parse()?,
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        treaty.kind = kind.ok_or_else(|| TextError::MissingExpectedField("type".to_string()))?;
        treaty.countries = match countries.as_slice() {
            [first, second] => [*first, *second],
            _ => {
                return Err(text_err!(
                    "A treaty needs two countries, found {}",
                    countries.len()
                ));
            }
        };
        return Ok((treaty, stream));
    }
}

/// Dormant leaders, or the `all` marker making every leader dormant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DormantLeaders {
    All,
    Ids(Vec<u32>),
}
impl Default for DormantLeaders {
    fn default() -> Self {
        return DormantLeaders::Ids(Vec::new());
    }
}
impl DormantLeaders {
    pub fn write(&self, out: &mut TextWriter) {
        match self {
            DormantLeaders::All => out.field("dormant_leaders", "all"),
            DormantLeaders::Ids(ids) => out.list("dormant_leaders", ids),
        }
    }
}
impl<'de> TextDeserialize<'de> for DormantLeaders {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        if let Some(TextToken::StringUnquoted("all")) = stream.peek_token() {
            stream.eat_token();
            return Ok((DormantLeaders::All, stream));
        }
        let ids = stream.parse()?;
        return Ok((DormantLeaders::Ids(ids), stream));
    }
}

/// The `globaldata` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalData {
    pub rules: Rules,
    pub start_date: Option<GameDate>,
    pub end_date: Option<GameDate>,
    pub axis: Option<Alliance>,
    pub allies: Option<Alliance>,
    pub comintern: Option<Alliance>,
    pub alliances: Vec<Alliance>,
    pub wars: Vec<War>,
    pub non_aggressions: Vec<Treaty>,
    pub peaces: Vec<Treaty>,
    pub trades: Vec<Treaty>,
    pub dormant_leaders: DormantLeaders,
    pub dormant_ministers: Vec<u32>,
    pub dormant_teams: Vec<u32>,
}
impl GlobalData {
    /// Every treaty, grouped as they are written
    pub fn treaties(&self) -> impl Iterator<Item = &Treaty> {
        return self
            .non_aggressions
            .iter()
            .chain(&self.peaces)
            .chain(&self.trades);
    }

    /// Adds a treaty to the list of its kind
    pub fn add_treaty(&mut self, treaty: Treaty) {
        match treaty.kind {
            TreatyType::NonAggression => self.non_aggressions.push(treaty),
            TreatyType::Peace => self.peaces.push(treaty),
            TreatyType::Trade => self.trades.push(treaty),
        }
    }

    pub fn write(&self, out: &mut TextWriter) {
        out.open("globaldata");
        self.rules.write(out);
        out.opt_field("startdate", self.start_date);
        out.opt_field("enddate", self.end_date);
        for (key, alliance) in [
            ("axis", &self.axis),
            ("allies", &self.allies),
            ("comintern", &self.comintern),
        ] {
            if let Some(alliance) = alliance {
                alliance.write(key, out);
            }
        }
        for alliance in &self.alliances {
            alliance.write("alliance", out);
        }
        for war in &self.wars {
            war.write(out);
        }
        for treaty in self.treaties() {
            treaty.write(out);
        }
        self.dormant_leaders.write(out);
        out.list("dormant_ministers", &self.dormant_ministers);
        out.list("dormant_teams", &self.dormant_teams);
        out.close();
    }
}
impl<'de> TextDeserialize<'de> for GlobalData {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut data = GlobalData::default();
        take_entries(&mut stream, "globaldata", true, |key, stream| {
            match key {
                "rules" => data.rules = stream.parse()?,
                "startdate" => data.start_date = Some(stream.parse()?),
                "enddate" => data.end_date = Some(stream.parse()?),
                "axis" => data.axis = Some(stream.parse()?),
                "allies" => data.allies = Some(stream.parse()?),
                "comintern" => data.comintern = Some(stream.parse()?),
                "alliance" => data.alliances.push(stream.parse()?),
                "war" => data.wars.push(stream.parse()?),
                "treaty" => data.add_treaty(stream.parse()?),
                "dormant_leaders" => data.dormant_leaders = stream.parse()?,
                "dormant_ministers" => data.dormant_ministers = stream.parse()?,
                "dormant_teams" => data.dormant_teams = stream.parse()?,
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        return Ok((data, stream));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_date::Month;

    fn tag(text: &str) -> CountryTag {
        return text.parse().unwrap();
    }

    fn write(data: &GlobalData) -> String {
        let mut out = TextWriter::new();
        data.write(&mut out);
        return out.finish();
    }

    fn read(text: &str) -> GlobalData {
        let mut stream = TextDeserializer::from_str(text);
        assert_eq!(stream.parse::<&str>().unwrap(), "globaldata");
        stream.parse_token(TextToken::Equal).unwrap();
        return stream.parse().unwrap();
    }

    #[test]
    fn test_default_rules_are_dropped() {
        let mut data = GlobalData::default();
        assert!(!write(&data).contains("rules"));
        data.rules.production = false;
        let text = write(&data);
        assert!(text.contains(
            "\trules = {\r\n\t\tdiplomacy = yes\r\n\t\tproduction = no\r\n\t\ttechnology = yes\r\n\t}\r\n"
        ));
        assert_eq!(read(&text).rules, data.rules);
    }

    #[test]
    fn test_treaty_cancel() {
        let mut treaty = Treaty::new(TreatyType::NonAggression, tag("GER"), tag("SOV"));
        let mut out = TextWriter::new();
        treaty.write(&mut out);
        assert!(!out.finish().contains("cancel"));

        treaty.cancel = false;
        let mut out = TextWriter::new();
        treaty.write(&mut out);
        assert!(out.finish().contains("\tcancel = no\r\n"));
    }

    #[test]
    fn test_treaty_quantities() {
        let mut treaty = Treaty::new(TreatyType::Trade, tag("GER"), tag("SWE"));
        treaty.metal = -250.0;
        treaty.oil = 0.00003;
        treaty.start_date = Some(GameDate::new(1936, Month::JAN, 1));
        let mut out = TextWriter::new();
        treaty.write(&mut out);
        let text = out.finish();
        assert!(text.contains("\ttype = trade\r\n\tcountry = \"GER\"\r\n\tcountry = \"SWE\"\r\n"));
        assert!(text.contains("\tmetal = -250.0\r\n"));
        assert!(!text.contains("oil"));
        assert!(!text.contains("energy"));
    }

    #[test]
    fn test_treaty_needs_two_countries() {
        let mut stream = TextDeserializer::from_str("{ type = peace country = \"GER\" }");
        assert!(stream.parse::<Treaty>().is_err());
    }

    #[test]
    fn test_global_data_round_trip() {
        let mut data = GlobalData {
            start_date: Some(GameDate::new(1936, Month::JAN, 1)),
            axis: Some(Alliance {
                id: Some(TypeId { r#type: 15000, id: 1 }),
                participant: vec![tag("GER"), tag("ITA")],
                name: None,
            }),
            alliances: vec![Alliance {
                participant: vec![tag("CHI"), tag("CHC")],
                name: Some("United Front".to_string()),
                ..Default::default()
            }],
            wars: vec![War {
                id: Some(TypeId { r#type: 15000, id: 2 }),
                date: Some(GameDate::new(1937, Month::JUL, 7)),
                attackers: WarSide {
                    id: None,
                    participant: vec![tag("JAP")],
                },
                defenders: WarSide {
                    id: None,
                    participant: vec![tag("CHI")],
                },
                ..Default::default()
            }],
            dormant_leaders: DormantLeaders::All,
            dormant_teams: vec![3, 4],
            ..Default::default()
        };
        let mut trade = Treaty::new(TreatyType::Trade, tag("GER"), tag("SOV"));
        trade.energy = 12.5;
        data.add_treaty(trade);
        data.add_treaty(Treaty::new(TreatyType::NonAggression, tag("GER"), tag("POL")));

        let text = write(&data);
        let nap = text.find("type = non_aggression").unwrap();
        let trade = text.find("type = trade").unwrap();
        assert!(nap < trade);
        assert!(text.contains("\tdormant_leaders = all\r\n"));
        assert_eq!(read(&text), data);
    }
}
