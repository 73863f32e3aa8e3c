use serde::{Deserialize, Serialize};

use crate::{
    GameDate, TextDeserializer,
    common_deserialize::take_entries,
    tables::{CountryTag, Tables},
    text_deserialize::{TextDeserializeWith, TextError},
    text_writer::TextWriter,
};

/// Scenario start or end, given either as a full date or only a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioBound {
    Date(GameDate),
    Year(i32),
}

/// Selection screen settings of one major country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorCountry {
    pub tag: CountryTag,
    pub desc: String,
    pub picture: String,
    pub bottom: bool,
    pub flag_ext: String,
    pub name: String,
}
impl MajorCountry {
    pub fn new(tag: CountryTag) -> Self {
        return MajorCountry {
            tag,
            desc: String::new(),
            picture: String::new(),
            bottom: false,
            flag_ext: String::new(),
            name: String::new(),
        };
    }

    fn take_body<'de>(tag: CountryTag, stream: &mut TextDeserializer<'de>) -> Result<Self, TextError> {
        let mut major = MajorCountry::new(tag);
        take_entries(stream, "major country", true, |key, stream| {
            match key {
                "desc" => major.desc = stream.parse()?,
                "picture" => major.picture = stream.parse()?,
                "bottom" => major.bottom = stream.parse()?,
                "flag_ext" => major.flag_ext = stream.parse()?,
                "name" => major.name = stream.parse()?,
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        return Ok(major);
    }

    fn write(&self, out: &mut TextWriter) {
        out.open(self.tag.as_str());
        out.opt_string("desc", &self.desc);
        out.opt_string("picture", &self.picture);
        out.flag("bottom", self.bottom);
        out.opt_string("flag_ext", &self.flag_ext);
        out.opt_string("name", &self.name);
        out.close();
    }
}

/// The `header` block: scenario name, span and the country selection screen.
///
/// Every country is in exactly one of three groups: major (in `majors` and `selectable`),
/// selectable but not major (only in `selectable`), or unselectable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioHeader {
    pub name: String,
    pub start: Option<ScenarioBound>,
    pub end: Option<ScenarioBound>,
    pub free: bool,
    pub combat: bool,
    pub selectable: Vec<CountryTag>,
    /// Order is the in-game selection order
    pub majors: Vec<MajorCountry>,
}

impl ScenarioHeader {
    pub fn is_selectable(&self, tag: CountryTag) -> bool {
        return self.selectable.contains(&tag);
    }

    pub fn is_major(&self, tag: CountryTag) -> bool {
        return self.majors.iter().any(|major| major.tag == tag);
    }

    /// Returns false if the country already was selectable
    pub fn add_selectable(&mut self, tag: CountryTag) -> bool {
        if self.is_selectable(tag) {
            return false;
        }
        self.selectable.push(tag);
        return true;
    }

    /// Also drops the country from the majors
    pub fn remove_selectable(&mut self, tag: CountryTag) -> bool {
        let before = self.selectable.len();
        self.selectable.retain(|other| *other != tag);
        self.remove_major(tag);
        return self.selectable.len() != before;
    }

    /// Appends a selectable country to the majors
    pub fn add_major(&mut self, tag: CountryTag) -> bool {
        if !self.is_selectable(tag) || self.is_major(tag) {
            return false;
        }
        self.majors.push(MajorCountry::new(tag));
        return true;
    }

    pub fn remove_major(&mut self, tag: CountryTag) -> bool {
        let before = self.majors.len();
        self.majors.retain(|major| major.tag != tag);
        return self.majors.len() != before;
    }

    pub fn move_major_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.majors.len() {
            return false;
        }
        self.majors.swap(index - 1, index);
        return true;
    }

    pub fn move_major_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.majors.len() {
            return false;
        }
        self.majors.swap(index, index + 1);
        return true;
    }

    pub fn selectable_non_majors(&self) -> Vec<CountryTag> {
        return self
            .selectable
            .iter()
            .copied()
            .filter(|tag| !self.is_major(*tag))
            .collect();
    }

    /// Countries of `tables` that cannot be selected
    pub fn unselectable(&self, tables: &Tables) -> Vec<CountryTag> {
        return tables
            .countries()
            .filter(|tag| !self.is_selectable(*tag))
            .collect();
    }

    pub fn write(&self, out: &mut TextWriter) {
        out.open("header");
        out.opt_string("name", &self.name);
        match self.start {
            Some(ScenarioBound::Date(date)) => out.field("startdate", date),
            Some(ScenarioBound::Year(year)) => out.field("startyear", year),
            None => {}
        }
        match self.end {
            Some(ScenarioBound::Date(date)) => out.field("enddate", date),
            Some(ScenarioBound::Year(year)) => out.field("endyear", year),
            None => {}
        }
        out.bool("free", self.free);
        out.bool("combat", self.combat);
        out.list("selectable", &self.selectable);
        for major in &self.majors {
            major.write(out);
        }
        out.close();
    }
}

impl<'de> TextDeserializeWith<'de, &Tables> for ScenarioHeader {
    fn take_with(
        mut stream: TextDeserializer<'de>,
        tables: &Tables,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        let mut header = ScenarioHeader::default();
        take_entries(&mut stream, "header", true, |key, stream| {
            match key {
                "name" => header.name = stream.parse()?,
                "startdate" => header.start = Some(ScenarioBound::Date(stream.parse()?)),
                "startyear" => header.start = Some(ScenarioBound::Year(stream.parse()?)),
                "enddate" => header.end = Some(ScenarioBound::Date(stream.parse()?)),
                "endyear" => header.end = Some(ScenarioBound::Year(stream.parse()?)),
                "free" => header.free = stream.parse()?,
                "combat" => header.combat = stream.parse()?,
                "selectable" => header.selectable = stream.parse()?,
                tag if tables.is_country(tag) => {
                    let major = MajorCountry::take_body(tag.parse()?, stream)?;
                    header.majors.push(major);
                }
                _ => return Ok(false),
            }
            return Ok(true);
        })?;
        return Ok((header, stream));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_date::Month;

    fn tag(text: &str) -> CountryTag {
        return text.parse().unwrap();
    }

    fn sample() -> ScenarioHeader {
        let mut header = ScenarioHeader {
            name: "SCEN_1936".to_string(),
            start: Some(ScenarioBound::Date(GameDate::new(1936, Month::JAN, 1))),
            end: Some(ScenarioBound::Year(1953)),
            free: true,
            ..Default::default()
        };
        for selectable in ["GER", "ENG", "FRA", "POL"] {
            header.add_selectable(tag(selectable));
        }
        header.add_major(tag("GER"));
        header.add_major(tag("ENG"));
        header.majors[0].desc = "GER_DESC".to_string();
        header.majors[1].bottom = true;
        return header;
    }

    #[test]
    fn test_write_header() {
        let mut out = TextWriter::new();
        sample().write(&mut out);
        let text = out.finish();
        assert!(text.starts_with("header = {\r\n\tname = \"SCEN_1936\"\r\n"));
        assert!(text.contains("\tstartdate = { year = 1936 month = january day = 0 }\r\n"));
        assert!(text.contains("\tendyear = 1953\r\n"));
        assert!(text.contains("\tselectable = { GER ENG FRA POL }\r\n"));
        assert!(text.contains("\tGER = {\r\n\t\tdesc = \"GER_DESC\"\r\n\t}\r\n"));
        assert!(text.contains("\tENG = {\r\n\t\tbottom = yes\r\n\t}\r\n"));
    }

    #[test]
    fn test_header_round_trip() {
        let header = sample();
        let mut out = TextWriter::new();
        header.write(&mut out);
        let text = out.finish();

        let mut stream = TextDeserializer::from_str(&text);
        assert_eq!(stream.parse::<&str>().unwrap(), "header");
        stream.eat_token();
        let read: ScenarioHeader = stream.parse_with(&Tables::standard()).unwrap();
        assert_eq!(read, header);
    }

    #[test]
    fn test_partition_edits() {
        let tables = Tables::standard();
        let mut header = sample();
        assert_eq!(header.selectable_non_majors(), vec![tag("FRA"), tag("POL")]);
        assert!(!header.add_major(tag("ITA")));
        assert!(header.add_selectable(tag("ITA")));
        assert!(header.add_major(tag("ITA")));
        assert!(header.move_major_up(2));
        assert_eq!(header.majors[1].tag, tag("ITA"));
        assert!(!header.move_major_down(2));

        assert!(header.remove_selectable(tag("GER")));
        assert!(!header.is_major(tag("GER")));
        let unselectable = header.unselectable(&tables);
        assert!(unselectable.contains(&tag("GER")));
        assert!(!unselectable.contains(&tag("ITA")));
        assert_eq!(
            unselectable.len() + header.selectable.len(),
            tables.countries().count()
        );
    }
}
