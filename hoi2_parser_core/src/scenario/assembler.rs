//! Splits a [`ScenarioDocument`] into the main file and its includes, and merges includes back.

use log::{debug, warn};

use crate::{
    TextDeserializer,
    common_deserialize::take_entries,
    game::GameContext,
    routing::{FieldGroup, ProvinceFile},
    scenario::{
        ScenarioDocument,
        country::CountrySettings,
        province::{ProvinceFilter, ProvinceSettings},
    },
    text_deserialize::TextError,
    text_writer::TextWriter,
};

/// One rendered file, keyed by its path as written in the scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub include: String,
    pub text: String,
}

/// Every file of a scenario, rendered in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFiles {
    pub main: String,
    /// In the order of the scenario's include list
    pub includes: Vec<RenderedFile>,
}
impl ScenarioFiles {
    pub fn include(&self, include: &str) -> Option<&str> {
        return self
            .includes
            .iter()
            .find(|file| file.include.eq_ignore_ascii_case(include))
            .map(|file| file.text.as_str());
    }

    /// The text of the first include of the given kind
    pub fn province_file(&self, kind: ProvinceFile) -> Option<&str> {
        return self
            .includes
            .iter()
            .find(|file| ProvinceFile::classify(&file.include) == kind)
            .map(|file| file.text.as_str());
    }
}

/// What one include file contributes to a scenario
#[derive(Debug, Default)]
pub struct IncludeContents {
    pub provinces: Vec<ProvinceSettings>,
    pub countries: Vec<CountrySettings>,
}

/// Reads the `province` and `country` records of an include file
pub fn read_include(text: &str, include: &str) -> Result<IncludeContents, TextError> {
    let mut contents = IncludeContents::default();
    let bases_dod = ProvinceFile::classify(include) == ProvinceFile::BasesDod;
    let mut stream = TextDeserializer::from_str(text);
    take_entries(&mut stream, include, false, |key, stream| {
        match key {
            "province" => {
                let mut province: ProvinceSettings = stream.parse()?;
                province.bases_dod = bases_dod;
                contents.provinces.push(province);
            }
            "country" => {
                let mut country: CountrySettings = stream.parse()?;
                country.file_name = include.to_string();
                contents.countries.push(country);
            }
            _ => return Ok(false),
        }
        return Ok(true);
    })?;
    return Ok(contents);
}

impl ScenarioDocument {
    /// Adds the contents of one include, merging provinces that are already known
    pub fn merge_include(&mut self, contents: IncludeContents) {
        for province in contents.provinces {
            self.province_mut(province.id).merge(&province);
        }
        for country in contents.countries {
            match self.country_mut(country.tag) {
                Some(existing) => {
                    warn!("Country {} is defined again in {}", country.tag, country.file_name);
                    *existing = country;
                }
                None => self.countries.push(country),
            }
        }
    }

    /// Renders the main file and every include this document owns
    pub fn assemble(&self, context: &GameContext) -> ScenarioFiles {
        let routing = self.routing();
        self.warn_unroutable(context);

        let mut main = TextWriter::new();
        self.write_main(&mut main);

        let mut includes = Vec::new();
        for include in &self.includes {
            let file = ProvinceFile::classify(include);
            let text = match file {
                ProvinceFile::Country => {
                    let sections = self
                        .countries
                        .iter()
                        .filter(|country| country.file_name.eq_ignore_ascii_case(include))
                        .map(|country| self.write_country_file(country, context))
                        .collect::<Vec<_>>();
                    if sections.is_empty() {
                        debug!("No country is saved to {include}, leaving it as is");
                        continue;
                    }
                    sections.join("\r\n")
                }
                _ => {
                    let filter = ProvinceFilter {
                        routing: &routing,
                        context,
                        file,
                    };
                    let mut out = TextWriter::new();
                    for province in self.provinces.values() {
                        province.write(&mut out, filter);
                    }
                    out.finish()
                }
            };
            includes.push(RenderedFile {
                include: include.clone(),
                text,
            });
        }
        return ScenarioFiles {
            main: main.finish(),
            includes,
        };
    }

    /// One country's part of a country file: its provinces, then the `country` block.
    /// A file shared by several countries holds one such part per country.
    pub fn write_country_file(&self, country: &CountrySettings, context: &GameContext) -> String {
        let routing = self.routing();
        let filter = ProvinceFilter {
            routing: &routing,
            context,
            file: ProvinceFile::Country,
        };

        let mut out = TextWriter::new();
        out.banner(&format!("Country definition for {}", country.tag));
        out.blank();

        let mut has_provinces = false;
        for id in &country.ownedprovinces {
            let Some(province) = self.provinces.get(id) else {
                continue;
            };
            if province.has_data_for(filter) {
                province.write(&mut out, filter);
                has_provinces = true;
            }
        }
        if has_provinces || context.is_dh() {
            out.blank();
            out.banner("Country main data");
            out.blank();
        }
        country.write(&mut out, context);
        return out.finish();
    }

    /// Logs province data that no file of this scenario will hold
    fn warn_unroutable(&self, context: &GameContext) {
        let routing = self.routing();
        let owned = |id: u32| {
            self.countries.iter().any(|country| {
                country.ownedprovinces.contains(&id)
                    && self.includes.iter().any(|include| {
                        include.eq_ignore_ascii_case(&country.file_name)
                    })
            })
        };
        let mut lost = 0;
        for province in self.provinces.values() {
            for group in FieldGroup::ALL {
                if !province.has_group_data(group) {
                    continue;
                }
                let owner = routing.owner(context.edition, group, province.bases_dod);
                let written = match owner {
                    Some(ProvinceFile::Country) => owned(province.id),
                    Some(_) => true,
                    None => false,
                };
                if !written {
                    lost += 1;
                }
            }
        }
        if lost > 0 {
            warn!("{lost} groups of province data have no file to be saved to");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::GameType,
        scenario::province::BuildingSize,
        tables::CountryTag,
    };

    fn tag(text: &str) -> CountryTag {
        return text.parse().unwrap();
    }

    fn document(includes: &[&str]) -> ScenarioDocument {
        let mut document = ScenarioDocument {
            name: "Test".to_string(),
            includes: includes.iter().map(|include| include.to_string()).collect(),
            ..Default::default()
        };
        let province = document.province_mut(1861);
        province.ic = Some(BuildingSize::completed(10.0));
        province.air_base = Some(BuildingSize::completed(4.0));
        province.supplypool = 500.0;
        province.points = 10;

        let mut country = CountrySettings::new(tag("GER"));
        country.file_name = "scenarios\\test\\germany.inc".to_string();
        country.ownedprovinces = vec![1861];
        document.countries.push(country);
        return document;
    }

    #[test]
    fn test_hoi2_routing() {
        let document = document(&[
            "scenarios\\test\\bases.inc",
            "scenarios\\test\\vp.inc",
            "scenarios\\test\\germany.inc",
        ]);
        let files = document.assemble(&GameContext::new(GameType::HeartsOfIron2, 130));
        assert_eq!(
            files.province_file(ProvinceFile::Bases),
            Some("province = { id = 1861 air_base = 4 }\r\n")
        );
        assert_eq!(
            files.province_file(ProvinceFile::Vp),
            Some("province = { id = 1861 points = 10 }\r\n")
        );
        let country = files.include("scenarios\\test\\germany.inc").unwrap();
        assert!(country.starts_with(
            "##############################\r\n\
             # Country definition for GER #\r\n\
             ##############################\r\n\
             \r\n\
             province = {\r\n\tid = 1861\r\n\tic = 10\r\n\tsupplypool = 500\r\n}\r\n\
             \r\n\
             #####################\r\n\
             # Country main data #\r\n\
             #####################\r\n\
             \r\n\
             country = {\r\n"
        ));
        assert!(files.main.contains("include = \"scenarios\\test\\germany.inc\"\r\n"));
    }

    #[test]
    fn test_darkest_hour_banner() {
        let document = document(&["scenarios\\test\\bases.inc", "scenarios\\test\\germany.inc"]);
        let files = document.assemble(&GameContext::new(GameType::DarkestHour, 103));
        let bases = files.province_file(ProvinceFile::Bases).unwrap();
        assert!(bases.contains("\tic = 10\r\n"));
        assert!(bases.contains("\tpoints = 10\r\n"));

        let country = files.include("scenarios\\test\\germany.inc").unwrap();
        assert!(!country.contains("province = "));
        assert!(country.contains("# Country main data #"));
    }

    #[test]
    fn test_read_and_merge_includes() {
        let mut document = ScenarioDocument::default();
        let bases = read_include(
            "province = { id = 3 air_base = 2 }\r\nprovince = { id = 4 naval_base = 1 }\r\n",
            "scenarios\\x\\bases.inc",
        )
        .unwrap();
        document.merge_include(bases);
        let country = read_include(
            "# Country definition for ENG\r\n\
             province = { id = 3 ic = 5 }\r\n\
             country = { tag = ENG ownedprovinces = { 3 4 } }\r\n",
            "scenarios\\x\\england.inc",
        )
        .unwrap();
        document.merge_include(country);

        assert_eq!(document.provinces.len(), 2);
        assert_eq!(document.provinces[&3].air_base, Some(BuildingSize::completed(2.0)));
        assert_eq!(document.provinces[&3].ic, Some(BuildingSize::completed(5.0)));
        let england = document.country(tag("ENG")).unwrap();
        assert_eq!(england.file_name, "scenarios\\x\\england.inc");
        assert_eq!(england.ownedprovinces, vec![3, 4]);
    }

    #[test]
    fn test_countries_sharing_a_file() {
        let include = "scenarios\\test\\benelux.inc";
        let mut document = ScenarioDocument {
            includes: vec![include.to_string()],
            ..Default::default()
        };
        for (country_tag, province) in [("BEL", 10), ("HOL", 11)] {
            document.province_mut(province).ic = Some(BuildingSize::completed(2.0));
            let mut country = CountrySettings::new(tag(country_tag));
            country.file_name = include.to_string();
            country.ownedprovinces = vec![province];
            document.countries.push(country);
        }

        let files = document.assemble(&GameContext::new(GameType::HeartsOfIron2, 130));
        let text = files.include(include).unwrap();
        let belgium = text.find("# Country definition for BEL #").unwrap();
        let holland = text.find("# Country definition for HOL #").unwrap();
        assert!(belgium < holland);

        let mut reread = ScenarioDocument {
            includes: document.includes.clone(),
            ..Default::default()
        };
        reread.merge_include(read_include(text, include).unwrap());
        assert_eq!(reread.countries, document.countries);
        assert_eq!(reread.provinces, document.provinces);
    }

    #[test]
    fn test_both_bases_files() {
        let bases = "scenarios\\test\\bases.inc";
        let bases_dod = "scenarios\\test\\bases_DOD.inc";
        let mut document = ScenarioDocument {
            includes: vec![bases.to_string(), bases_dod.to_string()],
            ..Default::default()
        };
        document.merge_include(read_include("province = { id = 3 air_base = 2 }\r\n", bases).unwrap());
        document.merge_include(
            read_include("province = { id = 5 naval_base = 1 }\r\n", bases_dod).unwrap(),
        );
        assert!(document.provinces[&5].bases_dod);
        document.province_mut(7).anti_air = Some(BuildingSize::completed(1.0));

        let files = document.assemble(&GameContext::new(GameType::HeartsOfIron2, 130));
        assert_eq!(
            files.include(bases),
            Some("province = { id = 3 air_base = 2 }\r\nprovince = { id = 7 anti_air = 1 }\r\n")
        );
        assert_eq!(
            files.include(bases_dod),
            Some("province = { id = 5 naval_base = 1 }\r\n")
        );
    }

    #[test]
    fn test_bad_include() {
        assert!(read_include("province = { id = x }", "bases.inc").is_err());
    }
}
