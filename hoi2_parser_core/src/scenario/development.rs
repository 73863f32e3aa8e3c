use serde::{Deserialize, Serialize};

use crate::{
    GameDate, TextDeserialize, TextDeserializer,
    common_deserialize::take_entries,
    format::NumberStyle,
    game::GameContext,
    presence::is_positive,
    scenario::{
        TypeId,
        unit::{BRIGADE_SLOTS, BrigadeSlot, read_brigade, settle_brigades, write_brigades},
    },
    tables::{BuildingType, ConvoyType, UnitType},
    text_deserialize::TextError,
    text_writer::TextWriter,
};

/// The fields that differ between the kinds of production orders
pub trait DevelopmentDetail: Default {
    /// Key of the record in the country block
    const KEY: &'static str;

    fn read_field<'de>(
        &mut self,
        key: &str,
        stream: &mut TextDeserializer<'de>,
    ) -> Result<bool, TextError>;

    fn write_fields(&self, out: &mut TextWriter);

    /// Called once the whole record has been read
    fn finish(&mut self) {}
}

/// A production order in progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Development<D> {
    pub id: TypeId,
    pub name: String,
    pub progress: f64,
    pub location: u32,
    pub cost: f64,
    pub date: Option<GameDate>,
    pub manpower: f64,
    /// Arsenal of Democracy only
    pub halted: bool,
    /// Arsenal of Democracy only
    pub close_when_finished: bool,
    /// Arsenal of Democracy only
    pub waitingforclosure: bool,
    pub total_progress: f64,
    pub size: u32,
    pub done: u32,
    pub days: u32,
    pub days_for_first: u32,
    pub gearing_bonus: f64,
    pub detail: D,
}

/// Progress, cost and the other quantities of an order are written with 4 decimals
fn write_quantity(out: &mut TextWriter, key: &str, value: f64) {
    if is_positive(value) {
        out.number(key, value, NumberStyle::Fixed(4));
    }
}

impl<D: DevelopmentDetail> Development<D> {
    pub fn write(&self, out: &mut TextWriter, context: &GameContext) {
        out.open(D::KEY);
        out.field("id", self.id);
        out.opt_string("name", &self.name);
        write_quantity(out, "progress", self.progress);
        out.field("location", self.location);
        write_quantity(out, "cost", self.cost);
        out.opt_field("date", self.date);
        write_quantity(out, "manpower", self.manpower);
        if context.is_aod() {
            out.flag("halted", self.halted);
            out.flag("close_when_finished", self.close_when_finished);
            out.flag("waitingforclosure", self.waitingforclosure);
        }
        write_quantity(out, "total_progress", self.total_progress);
        for (key, value) in [
            ("size", self.size),
            ("done", self.done),
            ("days", self.days),
            ("days_for_first", self.days_for_first),
        ] {
            if value > 0 {
                out.field(key, value);
            }
        }
        write_quantity(out, "gearing_bonus", self.gearing_bonus);
        self.detail.write_fields(out);
        out.close();
    }
}

impl<'de, D: DevelopmentDetail> TextDeserialize<'de> for Development<D> {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut record = Development::<D>::default();
        take_entries(&mut stream, D::KEY, true, |key, stream| {
            match key {
                "id" => record.id = stream.parse()?,
                "name" => record.name = stream.parse()?,
                "progress" => record.progress = stream.parse()?,
                "location" => record.location = stream.parse()?,
                "cost" => record.cost = stream.parse()?,
                "date" => record.date = Some(stream.parse()?),
                "manpower" => record.manpower = stream.parse()?,
                "halted" => record.halted = stream.parse()?,
                "close_when_finished" => record.close_when_finished = stream.parse()?,
                "waitingforclosure" => record.waitingforclosure = stream.parse()?,
                "total_progress" => record.total_progress = stream.parse()?,
                "size" => record.size = stream.parse()?,
                "done" => record.done = stream.parse()?,
                "days" => record.days = stream.parse()?,
                "days_for_first" => record.days_for_first = stream.parse()?,
                "gearing_bonus" => record.gearing_bonus = stream.parse()?,
                _ => return record.detail.read_field(key, stream),
            }
            return Ok(true);
        })?;
        record.detail.finish();
        return Ok((record, stream));
    }
}

/// A division being built
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DivisionDetail {
    pub unit_type: UnitType,
    pub model: i32,
    pub new_model: bool,
    pub unitcost: bool,
    pub brigades: [BrigadeSlot; BRIGADE_SLOTS],
}
impl DevelopmentDetail for DivisionDetail {
    const KEY: &'static str = "division_development";

    fn read_field<'de>(
        &mut self,
        key: &str,
        stream: &mut TextDeserializer<'de>,
    ) -> Result<bool, TextError> {
        match key {
            "type" => self.unit_type = stream.parse()?,
            "model" => self.model = stream.parse()?,
            "new_model" => self.new_model = stream.parse()?,
            "unitcost" => self.unitcost = stream.parse()?,
            _ => return read_brigade(&mut self.brigades, key, stream),
        }
        return Ok(true);
    }

    fn write_fields(&self, out: &mut TextWriter) {
        out.field("type", &self.unit_type);
        out.field("model", self.model);
        out.flag("new_model", self.new_model);
        out.flag("unitcost", self.unitcost);
        write_brigades(&self.brigades, out);
    }

    fn finish(&mut self) {
        settle_brigades(&mut self.brigades);
    }
}

/// A province building being built
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingDetail {
    pub building: BuildingType,
}
impl DevelopmentDetail for BuildingDetail {
    const KEY: &'static str = "province_development";

    fn read_field<'de>(
        &mut self,
        key: &str,
        stream: &mut TextDeserializer<'de>,
    ) -> Result<bool, TextError> {
        if key != "type" {
            return Ok(false);
        }
        self.building = stream.parse()?;
        return Ok(true);
    }

    fn write_fields(&self, out: &mut TextWriter) {
        out.field("type", self.building);
    }
}

/// Transports or escorts being built
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvoyDetail {
    pub convoy: ConvoyType,
}
impl DevelopmentDetail for ConvoyDetail {
    const KEY: &'static str = "convoy_development";

    fn read_field<'de>(
        &mut self,
        key: &str,
        stream: &mut TextDeserializer<'de>,
    ) -> Result<bool, TextError> {
        if key != "type" {
            return Ok(false);
        }
        self.convoy = stream.parse()?;
        return Ok(true);
    }

    fn write_fields(&self, out: &mut TextWriter) {
        out.field("type", self.convoy);
    }
}

pub type DivisionDevelopment = Development<DivisionDetail>;
pub type BuildingDevelopment = Development<BuildingDetail>;
pub type ConvoyDevelopment = Development<ConvoyDetail>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::GameType,
        game_date::Month,
    };

    fn write<D: DevelopmentDetail>(record: &Development<D>, context: &GameContext) -> String {
        let mut out = TextWriter::new();
        record.write(&mut out, context);
        return out.finish();
    }

    fn sample() -> DivisionDevelopment {
        let mut record = DivisionDevelopment {
            id: TypeId { r#type: 9100, id: 7 },
            name: "Panzer".to_string(),
            progress: 12.5,
            location: 1861,
            cost: 9.75,
            date: Some(GameDate::new(1936, Month::MAR, 15)),
            manpower: 12.0,
            halted: true,
            total_progress: 40.0,
            size: 2,
            days: 120,
            gearing_bonus: 1.1,
            ..Default::default()
        };
        record.detail.unit_type = UnitType::Armor;
        record.detail.model = 1;
        record.detail.brigades[1] = BrigadeSlot {
            unit_type: Some(UnitType::Artillery),
            model: 0,
        };
        return record;
    }

    #[test]
    fn test_fixed_precision_and_order() {
        let text = write(&sample(), &GameContext::new(GameType::HeartsOfIron2, 130));
        assert_eq!(
            text,
            "division_development = {\r\n\
             \tid = { type = 9100 id = 7 }\r\n\
             \tname = \"Panzer\"\r\n\
             \tprogress = 12.5000\r\n\
             \tlocation = 1861\r\n\
             \tcost = 9.7500\r\n\
             \tdate = { year = 1936 month = march day = 14 }\r\n\
             \tmanpower = 12.0000\r\n\
             \ttotal_progress = 40.0000\r\n\
             \tsize = 2\r\n\
             \tdays = 120\r\n\
             \tgearing_bonus = 1.1000\r\n\
             \ttype = armor\r\n\
             \tmodel = 1\r\n\
             \textra1 = artillery\r\n\
             \tbrigade_model1 = 0\r\n\
             }\r\n"
        );
    }

    #[test]
    fn test_aod_flags() {
        let context = GameContext::new(GameType::ArsenalOfDemocracy, 108);
        let text = write(&sample(), &context);
        assert!(text.contains("\tmanpower = 12.0000\r\n\thalted = yes\r\n\ttotal_progress"));
    }

    #[test]
    fn test_round_trip() {
        let context = GameContext::new(GameType::ArsenalOfDemocracy, 108);
        let record = sample();
        let text = write(&record, &context);
        let mut stream = TextDeserializer::from_str(&text);
        assert_eq!(stream.parse::<&str>().unwrap(), "division_development");
        stream.eat_token();
        assert_eq!(stream.parse::<DivisionDevelopment>().unwrap(), record);

        let mut convoy = ConvoyDevelopment {
            location: 5,
            ..Default::default()
        };
        convoy.detail.convoy = ConvoyType::Escorts;
        let text = write(&convoy, &context);
        assert!(text.starts_with("convoy_development = {\r\n"));
        assert!(text.contains("\ttype = escorts\r\n"));
        let mut stream = TextDeserializer::from_str(&text);
        stream.eat_token();
        stream.eat_token();
        assert_eq!(stream.parse::<ConvoyDevelopment>().unwrap(), convoy);
    }
}
