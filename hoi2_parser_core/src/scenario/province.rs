use hoi2_parser_macros::TextDeserialize;
use serde::{Deserialize, Serialize};

use crate::{
    TextDeserialize, TextDeserializer,
    format::{general, quoted},
    game::{GameContext, GameType},
    presence::{is_positive, is_significant},
    routing::{FieldGroup, FieldRouting, ProvinceFile},
    tables::WeatherType,
    text_deserialize::TextError,
    text_lexer::TextToken,
    text_writer::{TextWriter, inline_record},
};

/// A building of a province.
///
/// A completed building has a non-zero `size`. While under construction `size` is zero
/// and the building is written as `{ size = max_size current_size = current_size }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingSize {
    pub size: f64,
    pub max_size: f64,
    pub current_size: f64,
}
impl BuildingSize {
    pub fn completed(size: f64) -> Self {
        return BuildingSize {
            size,
            ..Default::default()
        };
    }

    pub fn under_construction(max_size: f64, current_size: f64) -> Self {
        return BuildingSize {
            size: 0.0,
            max_size,
            current_size,
        };
    }

    pub fn render(&self) -> String {
        if self.size == 0.0 {
            return format!(
                "{{ size = {} current_size = {} }}",
                general(self.max_size),
                general(self.current_size)
            );
        }
        return general(self.size);
    }
}
impl<'de> TextDeserialize<'de> for BuildingSize {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        if let Some(TextToken::OpenBracket) = stream.peek_token() {
            let shape: ConstructionShape = stream.parse()?;
            return Ok((
                BuildingSize::under_construction(shape.size, shape.current_size),
                stream,
            ));
        }
        let size = stream.parse()?;
        return Ok((BuildingSize::completed(size), stream));
    }
}

#[derive(TextDeserialize)]
struct ConstructionShape {
    #[default(0.0)]
    size: f64,
    #[default(0.0)]
    current_size: f64,
}

/// Per-province data spread over `bases.inc`, `depots.inc`, `vp.inc` and the country files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct ProvinceSettings {
    pub id: u32,
    /// Read from `bases_DOD.inc`
    #[skip]
    pub bases_dod: bool,

    pub ic: Option<BuildingSize>,
    pub infra: Option<BuildingSize>,
    pub landfort: Option<BuildingSize>,
    pub coastalfort: Option<BuildingSize>,
    pub anti_air: Option<BuildingSize>,
    pub air_base: Option<BuildingSize>,
    pub naval_base: Option<BuildingSize>,
    pub radar_station: Option<BuildingSize>,
    pub nuclear_reactor: Option<BuildingSize>,
    pub rocket_test: Option<BuildingSize>,
    pub synthetic_oil: Option<BuildingSize>,
    pub synthetic_rares: Option<BuildingSize>,
    pub nuclear_power: Option<BuildingSize>,

    pub supplypool: f64,
    pub oilpool: f64,
    pub energypool: f64,
    pub metalpool: f64,
    pub rarematerialspool: f64,

    pub energy: f64,
    pub max_energy: f64,
    pub metal: f64,
    pub max_metal: f64,
    pub rare_materials: f64,
    pub max_rare_materials: f64,
    pub oil: f64,
    pub max_oil: f64,
    pub manpower: f64,
    pub max_manpower: f64,

    pub revoltrisk: f64,
    pub points: i32,
    pub name: Option<String>,
    pub weather: Option<WeatherType>,
}

struct BuildingField {
    key: &'static str,
    group: FieldGroup,
    /// Written only for this edition
    edition: Option<GameType>,
    get: fn(&ProvinceSettings) -> Option<BuildingSize>,
    slot: fn(&mut ProvinceSettings) -> &mut Option<BuildingSize>,
}

struct QuantityField {
    key: &'static str,
    group: FieldGroup,
    get: fn(&ProvinceSettings) -> f64,
    slot: fn(&mut ProvinceSettings) -> &mut f64,
}

macro_rules! building {
    ($key:ident, $group:ident) => {
        building!($key, $group, None)
    };
    ($key:ident, $group:ident, $edition:expr) => {
        BuildingField {
            key: stringify!($key),
            group: FieldGroup::$group,
            edition: $edition,
            get: |province| province.$key,
            slot: |province| &mut province.$key,
        }
    };
}

macro_rules! quantity {
    ($key:ident, $group:ident) => {
        QuantityField {
            key: stringify!($key),
            group: FieldGroup::$group,
            get: |province| province.$key,
            slot: |province| &mut province.$key,
        }
    };
}

const AOD: Option<GameType> = Some(GameType::ArsenalOfDemocracy);

const BUILDINGS: &[BuildingField] = &[
    building!(ic, Buildings),
    building!(infra, Buildings),
    building!(landfort, Buildings),
    building!(coastalfort, Buildings),
    building!(anti_air, BaseBuildings),
    building!(air_base, BaseBuildings),
    building!(naval_base, BaseBuildings),
    building!(radar_station, Buildings),
    building!(nuclear_reactor, Buildings),
    building!(rocket_test, Buildings),
    building!(synthetic_oil, Buildings, AOD),
    building!(synthetic_rares, Buildings, AOD),
    building!(nuclear_power, Buildings, AOD),
];

const QUANTITIES: &[QuantityField] = &[
    quantity!(supplypool, Pools),
    quantity!(oilpool, Pools),
    quantity!(energypool, Pools),
    quantity!(metalpool, Pools),
    quantity!(rarematerialspool, Pools),
    quantity!(energy, Resources),
    quantity!(max_energy, Resources),
    quantity!(metal, Resources),
    quantity!(max_metal, Resources),
    quantity!(rare_materials, Resources),
    quantity!(max_rare_materials, Resources),
    quantity!(oil, Resources),
    quantity!(max_oil, Resources),
    quantity!(manpower, Resources),
    quantity!(max_manpower, Resources),
    quantity!(revoltrisk, Details),
];

/// Whether a field of `group` goes to `file`
#[derive(Clone, Copy)]
pub struct ProvinceFilter<'a> {
    pub routing: &'a FieldRouting,
    pub context: &'a GameContext,
    pub file: ProvinceFile,
}
impl<'a> ProvinceFilter<'a> {
    fn takes(&self, province: &ProvinceSettings, group: FieldGroup) -> bool {
        return self
            .routing
            .owns(self.context.edition, group, self.file, province.bases_dod);
    }
}

impl ProvinceSettings {
    pub fn new(id: u32) -> Self {
        return ProvinceSettings {
            id,
            ..Default::default()
        };
    }

    /// The `key = value` pairs this province writes to one file, in wire order
    fn routed_fields(&self, filter: ProvinceFilter) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        for building in BUILDINGS {
            if building.edition.is_some_and(|edition| edition != filter.context.edition) {
                continue;
            }
            if !filter.takes(self, building.group) {
                continue;
            }
            if let Some(size) = (building.get)(self) {
                fields.push((building.key, size.render()));
            }
        }
        for quantity in QUANTITIES {
            let value = (quantity.get)(self);
            if filter.takes(self, quantity.group) && is_positive(value) {
                fields.push((quantity.key, general(value)));
            }
        }
        if filter.takes(self, FieldGroup::VictoryPoints) && self.points > 0 {
            fields.push(("points", self.points.to_string()));
        }
        if filter.takes(self, FieldGroup::Details) {
            if let Some(name) = &self.name {
                fields.push(("name", quoted(name)));
            }
            if let Some(weather) = self.weather {
                fields.push(("weather", weather.to_string()));
            }
        }
        return fields;
    }

    /// A record spans several lines when it has a building under construction
    /// or anything besides completed buildings and victory points.
    fn is_multi_line(&self, filter: ProvinceFilter) -> bool {
        let constructing = BUILDINGS.iter().any(|building| {
            filter.takes(self, building.group)
                && building
                    .edition
                    .is_none_or(|edition| edition == filter.context.edition)
                && (building.get)(self).is_some_and(|size| is_significant(size.max_size))
        });
        let quantities = QUANTITIES.iter().any(|quantity| {
            filter.takes(self, quantity.group) && is_positive((quantity.get)(self))
        });
        let details = filter.takes(self, FieldGroup::Details)
            && (self.name.is_some() || self.weather.is_some());
        return constructing || quantities || details;
    }

    /// Whether this province writes anything to the filtered file
    pub fn has_data_for(&self, filter: ProvinceFilter) -> bool {
        return !self.routed_fields(filter).is_empty();
    }

    /// Writes `province = { ... }` with the fields routed to the filtered file, or nothing
    pub fn write(&self, out: &mut TextWriter, filter: ProvinceFilter) {
        let fields = self.routed_fields(filter);
        if fields.is_empty() {
            return;
        }
        if !self.is_multi_line(filter) {
            let record = inline_record(std::iter::once(("id", self.id.to_string())).chain(fields));
            out.field("province", record);
            return;
        }
        out.open("province");
        out.field("id", self.id);
        for (key, value) in fields {
            out.field(key, value);
        }
        out.close();
    }

    /// Copies every field that is set in `other` over this province
    pub fn merge(&mut self, other: &ProvinceSettings) {
        self.bases_dod |= other.bases_dod;
        for building in BUILDINGS {
            if let Some(size) = (building.get)(other) {
                *(building.slot)(self) = Some(size);
            }
        }
        for quantity in QUANTITIES {
            let value = (quantity.get)(other);
            if value != 0.0 {
                *(quantity.slot)(self) = value;
            }
        }
        if other.points != 0 {
            self.points = other.points;
        }
        if other.name.is_some() {
            self.name = other.name.clone();
        }
        if other.weather.is_some() {
            self.weather = other.weather;
        }
    }

    /// Whether any field of `group` would be written
    pub fn has_group_data(&self, group: FieldGroup) -> bool {
        let building = BUILDINGS
            .iter()
            .any(|building| building.group == group && (building.get)(self).is_some());
        let quantity = QUANTITIES
            .iter()
            .any(|quantity| quantity.group == group && is_positive((quantity.get)(self)));
        return building
            || quantity
            || match group {
                FieldGroup::VictoryPoints => self.points > 0,
                FieldGroup::Details => self.name.is_some() || self.weather.is_some(),
                _ => false,
            };
    }

    /// Keeps only the fields of groups for which `keep` is true
    pub fn retain_groups(&mut self, mut keep: impl FnMut(FieldGroup) -> bool) {
        for building in BUILDINGS {
            if !keep(building.group) {
                *(building.slot)(self) = None;
            }
        }
        for quantity in QUANTITIES {
            if !keep(quantity.group) {
                *(quantity.slot)(self) = 0.0;
            }
        }
        if !keep(FieldGroup::VictoryPoints) {
            self.points = 0;
        }
        if !keep(FieldGroup::Details) {
            self.name = None;
            self.weather = None;
        }
    }

    pub fn building(&self, key: &str) -> Option<BuildingSize> {
        return BUILDINGS
            .iter()
            .find(|building| building.key == key)
            .and_then(|building| (building.get)(self));
    }

    pub fn set_building(&mut self, key: &str, size: Option<BuildingSize>) -> bool {
        let Some(building) = BUILDINGS.iter().find(|building| building.key == key) else {
            return false;
        };
        *(building.slot)(self) = size;
        return true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DH: GameContext = GameContext {
        edition: GameType::DarkestHour,
        version: 103,
    };
    const BASES: FieldRouting = FieldRouting {
        bases: true,
        bases_dod: false,
        depots: false,
        vp: false,
        country_provinces: false,
    };

    fn write(province: &ProvinceSettings, routing: &FieldRouting, file: ProvinceFile) -> String {
        let mut out = TextWriter::new();
        province.write(
            &mut out,
            ProvinceFilter {
                routing,
                context: &DH,
                file,
            },
        );
        return out.finish();
    }

    #[test]
    fn test_building_size_shapes() {
        assert_eq!(
            BuildingSize::under_construction(40.0, 12.0).render(),
            "{ size = 40 current_size = 12 }"
        );
        assert_eq!(BuildingSize::completed(25.0).render(), "25");

        let mut stream = TextDeserializer::from_str("25 { size = 40 current_size = 12 }");
        assert_eq!(
            stream.parse::<BuildingSize>().unwrap(),
            BuildingSize::completed(25.0)
        );
        assert_eq!(
            stream.parse::<BuildingSize>().unwrap(),
            BuildingSize::under_construction(40.0, 12.0)
        );
    }

    #[test]
    fn test_single_and_multi_line() {
        let mut province = ProvinceSettings::new(1861);
        province.ic = Some(BuildingSize::completed(3.0));
        assert_eq!(
            write(&province, &BASES, ProvinceFile::Bases),
            "province = { id = 1861 ic = 3 }\r\n"
        );

        province.revoltrisk = 2.5;
        assert_eq!(
            write(&province, &BASES, ProvinceFile::Bases),
            "province = {\r\n\tid = 1861\r\n\tic = 3\r\n\trevoltrisk = 2.5\r\n}\r\n"
        );

        province.revoltrisk = 0.0;
        province.air_base = Some(BuildingSize::under_construction(4.0, 1.0));
        assert!(write(&province, &BASES, ProvinceFile::Bases).starts_with("province = {\r\n"));
    }

    #[test]
    fn test_depots_take_pools() {
        let mut province = ProvinceSettings::new(5);
        province.ic = Some(BuildingSize::completed(2.0));
        province.oilpool = 100.0;

        let bases = write(&province, &BASES, ProvinceFile::Bases);
        assert!(bases.contains("oilpool = 100"));

        let routing = FieldRouting {
            depots: true,
            ..BASES
        };
        let bases = write(&province, &routing, ProvinceFile::Bases);
        let depots = write(&province, &routing, ProvinceFile::Depots);
        assert!(!bases.contains("oilpool"));
        assert!(bases.contains("ic = 2"));
        assert_eq!(depots, "province = {\r\n\tid = 5\r\n\toilpool = 100\r\n}\r\n");
    }

    #[test]
    fn test_aod_buildings_are_gated() {
        let mut province = ProvinceSettings::new(9);
        province.synthetic_oil = Some(BuildingSize::completed(1.0));
        assert_eq!(write(&province, &BASES, ProvinceFile::Bases), "");
    }

    #[test]
    fn test_read_province() {
        let mut stream = TextDeserializer::from_str(
            "{ id = 12 points = 5 infra = { size = 10 current_size = 4 } energy = 3.5 weather = snow name = \"Berlin\" }",
        );
        let province: ProvinceSettings = stream.parse().unwrap();
        assert_eq!(province.id, 12);
        assert_eq!(province.points, 5);
        assert_eq!(
            province.infra,
            Some(BuildingSize::under_construction(10.0, 4.0))
        );
        assert_eq!(province.energy, 3.5);
        assert_eq!(province.weather, Some(WeatherType::Snow));
        assert_eq!(province.name.as_deref(), Some("Berlin"));
        assert_eq!(province.ic, None);
    }

    #[test]
    fn test_merge_and_retain() {
        let mut province = ProvinceSettings::new(3);
        province.ic = Some(BuildingSize::completed(4.0));
        let mut depot = ProvinceSettings::new(3);
        depot.supplypool = 50.0;
        province.merge(&depot);
        assert_eq!(province.supplypool, 50.0);
        assert_eq!(province.ic, Some(BuildingSize::completed(4.0)));

        province.retain_groups(|group| group == FieldGroup::Pools);
        assert_eq!(province.ic, None);
        assert_eq!(province.supplypool, 50.0);
    }
}
