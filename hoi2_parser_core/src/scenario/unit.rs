use hoi2_parser_macros::TextDeserialize;
use serde::{Deserialize, Serialize};

use crate::{
    GameDate, TextDeserialize, TextDeserializer,
    common_deserialize::take_entries,
    format::NumberStyle,
    presence::{is_positive, positive},
    scenario::{
        TypeId,
        fields::{NumField, num_field, read_into, write_all},
    },
    tables::{CountryTag, UnitType},
    text_deserialize::TextError,
    text_writer::TextWriter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Land,
    Naval,
    Air,
}
impl UnitKind {
    pub fn unit_key(&self) -> &'static str {
        return match self {
            UnitKind::Land => "landunit",
            UnitKind::Naval => "navalunit",
            UnitKind::Air => "airunit",
        };
    }
}

/// An attached brigade. The model is written only for a filled slot with a model of at least 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrigadeSlot {
    pub unit_type: Option<UnitType>,
    pub model: i32,
}
impl Default for BrigadeSlot {
    fn default() -> Self {
        return BrigadeSlot {
            unit_type: None,
            model: -1,
        };
    }
}

pub const BRIGADE_SLOTS: usize = 6;
const EXTRA_KEYS: [&str; BRIGADE_SLOTS] = ["extra", "extra1", "extra2", "extra3", "extra4", "extra5"];
const MODEL_KEYS: [&str; BRIGADE_SLOTS] = [
    "brigade_model",
    "brigade_model1",
    "brigade_model2",
    "brigade_model3",
    "brigade_model4",
    "brigade_model5",
];

/// Reads an `extra*` or `brigade_model*` entry into `slots`
pub(crate) fn read_brigade<'de>(
    slots: &mut [BrigadeSlot; BRIGADE_SLOTS],
    key: &str,
    stream: &mut TextDeserializer<'de>,
) -> Result<bool, TextError> {
    if let Some(index) = EXTRA_KEYS.iter().position(|extra| *extra == key) {
        slots[index].unit_type = Some(stream.parse()?);
        return Ok(true);
    }
    if let Some(index) = MODEL_KEYS.iter().position(|model| *model == key) {
        slots[index].model = stream.parse()?;
        return Ok(true);
    }
    return Ok(false);
}

/// Drops models read for slots that have no brigade, which are never written
pub(crate) fn settle_brigades(slots: &mut [BrigadeSlot; BRIGADE_SLOTS]) {
    for slot in slots.iter_mut().filter(|slot| slot.unit_type.is_none()) {
        slot.model = -1;
    }
}

pub(crate) fn write_brigades(slots: &[BrigadeSlot; BRIGADE_SLOTS], out: &mut TextWriter) {
    for (index, slot) in slots.iter().enumerate() {
        let Some(unit_type) = &slot.unit_type else {
            continue;
        };
        out.field(EXTRA_KEYS[index], unit_type);
        if slot.model >= 0 {
            out.field(MODEL_KEYS[index], slot.model);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: TypeId,
    pub name: String,
    pub unit_type: UnitType,
    pub model: i32,
    pub strength: f64,
    pub max_strength: f64,
    pub organisation: f64,
    pub max_organisation: f64,
    pub morale: f64,
    pub experience: f64,
    pub brigades: [BrigadeSlot; BRIGADE_SLOTS],
    pub dormant: bool,
    pub locked: bool,
    /// Land only
    pub offensive: Option<GameDate>,
    /// Naval and air only
    pub nuke: bool,
}

const DIVISION_STATS: &[NumField<Division>] = &[
    num_field!(strength, NumberStyle::General, is_positive),
    num_field!(max_strength, NumberStyle::General, is_positive),
    num_field!(organisation, NumberStyle::General, is_positive),
    num_field!(max_organisation, NumberStyle::General, is_positive),
    num_field!(morale, NumberStyle::General, is_positive),
    num_field!(experience, NumberStyle::General, is_positive),
];

impl Division {
    pub fn write(&self, key: &str, kind: UnitKind, out: &mut TextWriter) {
        out.open(key);
        out.field("id", self.id);
        out.opt_string("name", &self.name);
        out.field("type", &self.unit_type);
        out.field("model", self.model);
        write_all(DIVISION_STATS, self, out);
        write_brigades(&self.brigades, out);
        out.flag("dormant", self.dormant);
        out.flag("locked", self.locked);
        match kind {
            UnitKind::Land => out.opt_field("offensive", self.offensive),
            UnitKind::Naval | UnitKind::Air => out.flag("nuke", self.nuke),
        }
        out.close();
    }
}
impl<'de> TextDeserialize<'de> for Division {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut division = Division::default();
        take_entries(&mut stream, "division", true, |key, stream| {
            match key {
                "id" => division.id = stream.parse()?,
                "name" => division.name = stream.parse()?,
                "type" => division.unit_type = stream.parse()?,
                "model" => division.model = stream.parse()?,
                "dormant" => division.dormant = stream.parse()?,
                "locked" => division.locked = stream.parse()?,
                "offensive" => division.offensive = Some(stream.parse()?),
                "nuke" => division.nuke = stream.parse()?,
                _ => {
                    return Ok(read_into(DIVISION_STATS, &mut division, key, stream)?
                        || read_brigade(&mut division.brigades, key, stream)?);
                }
            }
            return Ok(true);
        })?;
        settle_brigades(&mut division.brigades);
        return Ok((division, stream));
    }
}

/// A land, naval or air unit. Which fields are written depends on its [`UnitKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct Unit {
    pub id: TypeId,
    pub name: String,
    pub control: Option<CountryTag>,
    pub leader: Option<u32>,
    pub location: u32,
    /// Naval and air only
    pub base: Option<u32>,
    /// Land only
    pub dig_in: f64,
    #[multiple]
    #[key("division")]
    pub divisions: Vec<Division>,
}
impl Unit {
    pub fn write(&self, kind: UnitKind, out: &mut TextWriter) {
        out.open(kind.unit_key());
        out.field("id", self.id);
        out.opt_string("name", &self.name);
        out.opt_field("control", self.control);
        out.opt_field("leader", self.leader);
        out.field("location", self.location);
        match kind {
            UnitKind::Land => {
                out.opt_number("dig_in", positive(self.dig_in), NumberStyle::Fixed(3));
            }
            UnitKind::Naval | UnitKind::Air => out.opt_field("base", self.base),
        }
        for division in &self.divisions {
            division.write("division", kind, out);
        }
        out.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_date::Month;

    fn land_unit() -> Unit {
        let mut division = Division {
            id: TypeId { r#type: 9000, id: 2 },
            name: "1. Infanterie-Division".to_string(),
            unit_type: UnitType::Infantry,
            model: 3,
            strength: 100.0,
            max_strength: 100.0,
            organisation: 0.00003,
            experience: 12.5,
            offensive: Some(GameDate::new(1939, Month::SEP, 1)),
            nuke: true,
            ..Default::default()
        };
        division.brigades[0] = BrigadeSlot {
            unit_type: Some(UnitType::Artillery),
            model: 1,
        };
        division.brigades[2] = BrigadeSlot {
            unit_type: Some(UnitType::Engineer),
            model: -1,
        };
        division.brigades[3].model = 4;
        return Unit {
            id: TypeId { r#type: 9000, id: 1 },
            name: "1. Armee".to_string(),
            control: Some("GER".parse().unwrap()),
            location: 1861,
            dig_in: 1.0,
            base: Some(5),
            divisions: vec![division],
            ..Default::default()
        };
    }

    #[test]
    fn test_write_land_unit() {
        let mut out = TextWriter::new();
        land_unit().write(UnitKind::Land, &mut out);
        let text = out.finish();
        assert!(text.starts_with("landunit = {\r\n\tid = { type = 9000 id = 1 }\r\n"));
        assert!(text.contains("\tdig_in = 1.000\r\n"));
        assert!(!text.contains("base"));
        assert!(text.contains("\t\ttype = infantry\r\n\t\tmodel = 3\r\n\t\tstrength = 100\r\n"));
        assert!(!text.contains("organisation"));
        assert!(text.contains("\t\textra = artillery\r\n\t\tbrigade_model = 1\r\n"));
        assert!(text.contains("\t\textra2 = engineer\r\n"));
        assert!(!text.contains("brigade_model2"));
        assert!(!text.contains("brigade_model3"));
        assert!(text.contains("offensive = { year = 1939 month = september day = 0 }"));
        assert!(!text.contains("nuke"));
    }

    #[test]
    fn test_naval_unit_fields() {
        let mut out = TextWriter::new();
        land_unit().write(UnitKind::Naval, &mut out);
        let text = out.finish();
        assert!(text.starts_with("navalunit = {\r\n"));
        assert!(text.contains("\tbase = 5\r\n"));
        assert!(!text.contains("dig_in"));
        assert!(text.contains("\t\tnuke = yes\r\n"));
        assert!(!text.contains("offensive"));
    }

    fn read_division(text: &str) -> Division {
        let mut stream = TextDeserializer::from_str(text);
        return stream.parse().unwrap();
    }

    #[test]
    fn test_brigade_guards() {
        let division = read_division(
            "{ type = infantry model = 2 brigade_model1 = 3 extra2 = artillery brigade_model2 = 0 }",
        );
        assert_eq!(division.brigades[1], BrigadeSlot::default());
        assert_eq!(
            division.brigades[2],
            BrigadeSlot {
                unit_type: Some(UnitType::Artillery),
                model: 0,
            }
        );

        let mut orphan = division.clone();
        orphan.brigades[4].model = 5;
        let mut out = TextWriter::new();
        orphan.write("division", UnitKind::Land, &mut out);
        let text = out.finish();
        assert!(text.contains("\textra2 = artillery\r\n\tbrigade_model2 = 0\r\n"));
        assert!(!text.contains("brigade_model4"));
        assert!(!text.contains("brigade_model1"));
        assert_eq!(read_division(&text["division = ".len()..]), division);
    }

    #[test]
    fn test_unit_round_trip() {
        let mut unit = land_unit();
        unit.base = None;
        unit.divisions[0].nuke = false;
        unit.divisions[0].organisation = 0.0;
        // a model without its brigade is not written
        unit.divisions[0].brigades[3].model = -1;

        let mut out = TextWriter::new();
        unit.write(UnitKind::Land, &mut out);
        let text = out.finish();
        let mut stream = TextDeserializer::from_str(&text);
        assert_eq!(stream.parse::<&str>().unwrap(), "landunit");
        stream.eat_token();
        assert_eq!(stream.parse::<Unit>().unwrap(), unit);
    }
}
