//! The scenario model, its record readers and writers, and the assembly of whole files.

use std::{collections::BTreeMap, fmt::Display};

use hoi2_parser_macros::TextDeserialize;
use serde::{Deserialize, Serialize};

use crate::{
    TextDeserializer,
    common_deserialize::take_entries,
    routing::FieldRouting,
    tables::{CountryTag, Tables},
    text_deserialize::{TextDeserializeWith, TextError},
    text_writer::{TextWriter, inline_record},
};

pub mod assembler;
pub mod country;
pub mod development;
pub mod fields;
pub mod global_data;
pub mod header;
pub mod province;
pub mod unit;

use country::CountrySettings;
use global_data::GlobalData;
use header::ScenarioHeader;
use province::ProvinceSettings;

/// Identifies leaders, ministers, units and most other game objects
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    TextDeserialize,
)]
pub struct TypeId {
    pub r#type: i32,
    pub id: i32,
}
impl Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{{ type = {} id = {} }}", self.r#type, self.id);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TextDeserialize)]
pub struct MapPoint {
    pub x: i32,
    pub y: i32,
}
impl Display for MapPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{{ x = {} y = {} }}", self.x, self.y);
    }
}

/// Which provinces are part of the map, and the visible area
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSettings {
    pub all: bool,
    pub included: Vec<u32>,
    pub excluded: Vec<u32>,
    pub top: Option<MapPoint>,
    pub bottom: Option<MapPoint>,
}
impl MapSettings {
    pub fn write(&self, out: &mut TextWriter) {
        out.open("map");
        out.bool("all", self.all);
        out.list("yes", &self.included);
        out.list("no", &self.excluded);
        out.opt_field("top", self.top);
        out.opt_field("bottom", self.bottom);
        out.close();
    }
}
impl<'de> crate::TextDeserialize<'de> for MapSettings {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut map = MapSettings::default();
        take_entries(&mut stream, "map", true, |key, stream| {
            match key {
                "all" => map.all = stream.parse()?,
                "yes" => map.included = stream.parse()?,
                "no" => map.excluded = stream.parse()?,
                "top" => map.top = Some(stream.parse()?),
                "bottom" => map.bottom = Some(stream.parse()?),
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        return Ok((map, stream));
    }
}

/// A whole scenario: the main `.eug` file plus the provinces and countries of its includes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    pub name: String,
    pub panel: String,
    pub header: ScenarioHeader,
    pub global_data: GlobalData,
    pub history_events: Vec<u32>,
    pub sleep_events: Vec<u32>,
    /// Savegame slot to day offset
    pub save_dates: BTreeMap<u32, i32>,
    pub map: Option<MapSettings>,
    pub events: Vec<String>,
    pub includes: Vec<String>,

    /// Province data merged from every include, by id
    pub provinces: BTreeMap<u32, ProvinceSettings>,
    pub countries: Vec<CountrySettings>,
}
impl ScenarioDocument {
    /// The field routing implied by the include list
    pub fn routing(&self) -> FieldRouting {
        return FieldRouting::from_includes(&self.includes);
    }

    pub fn country(&self, tag: CountryTag) -> Option<&CountrySettings> {
        return self.countries.iter().find(|country| country.tag == tag);
    }

    pub fn country_mut(&mut self, tag: CountryTag) -> Option<&mut CountrySettings> {
        return self.countries.iter_mut().find(|country| country.tag == tag);
    }

    /// Province data for `id`, created empty when missing
    pub fn province_mut(&mut self, id: u32) -> &mut ProvinceSettings {
        return self
            .provinces
            .entry(id)
            .or_insert_with(|| ProvinceSettings::new(id));
    }

    /// Writes the main scenario file
    pub fn write_main(&self, out: &mut TextWriter) {
        out.string("name", &self.name);
        out.opt_string("panel", &self.panel);
        self.header.write(out);
        self.global_data.write(out);
        out.list("history", &self.history_events);
        out.list("sleepevent", &self.sleep_events);
        if !self.save_dates.is_empty() {
            out.field("save_date", inline_record(&self.save_dates));
        }
        if let Some(map) = &self.map {
            map.write(out);
        }
        for event in &self.events {
            out.string("event", event);
        }
        for include in &self.includes {
            out.string("include", include);
        }
    }
}

/// Reads the main scenario file. Provinces and countries come from the includes.
impl<'de> TextDeserializeWith<'de, &Tables> for ScenarioDocument {
    fn take_with(
        mut stream: TextDeserializer<'de>,
        tables: &Tables,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut document = ScenarioDocument::default();
        take_entries(&mut stream, "scenario", false, |key, stream| {
            match key {
                "name" => document.name = stream.parse()?,
                "panel" => document.panel = stream.parse()?,
                "header" => document.header = stream.parse_with(tables)?,
                "globaldata" => document.global_data = stream.parse()?,
                "history" => document.history_events = stream.parse()?,
                "sleepevent" => document.sleep_events = stream.parse()?,
                "save_date" => document.save_dates = stream.parse()?,
                "map" => document.map = Some(stream.parse()?),
                "event" => document.events.push(stream.parse()?),
                "include" => document.includes.push(stream.parse()?),
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        return Ok((document, stream));
    }
}
