use std::collections::BTreeMap;

use hoi2_parser_macros::TextDeserialize;
use serde::{Deserialize, Serialize};

use crate::{
    GameDate,
    format::NumberStyle,
    game::GameContext,
    presence::{is_significant, significant},
    scenario::{
        TypeId,
        development::{BuildingDevelopment, ConvoyDevelopment, DivisionDevelopment},
        fields::{NumField, num_field, write_all},
        unit::{Division, Unit, UnitKind},
    },
    tables::{CountryTag, GovernmentType},
    text_writer::{TextWriter, inline_record},
};

/// Relation towards one other country
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct Relation {
    pub tag: CountryTag,
    pub value: f64,
    pub access: bool,
    /// Independence guaranteed until this date
    pub guaranteed: Option<GameDate>,
}
impl Relation {
    fn write(&self, out: &mut TextWriter) {
        out.open("relation");
        out.field("tag", self.tag);
        out.number("value", self.value, NumberStyle::General);
        out.flag("access", self.access);
        out.opt_field("guaranteed", self.guaranteed);
        out.close();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct Diplomacy {
    #[multiple]
    #[key("relation")]
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct SpyInfo {
    pub country: CountryTag,
    pub numberofspies: u32,
}

/// Domestic policy sliders. Written in full whenever a country has them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct Policy {
    pub date: Option<GameDate>,
    pub democratic: i32,
    pub political_left: i32,
    pub freedom: i32,
    pub free_market: i32,
    pub professional_army: i32,
    pub defense_lobby: i32,
    pub interventionism: i32,
}
impl Policy {
    fn write(&self, out: &mut TextWriter) {
        out.open("policy");
        out.opt_field("date", self.date);
        out.field("democratic", self.democratic);
        out.field("political_left", self.political_left);
        out.field("freedom", self.freedom);
        out.field("free_market", self.free_market);
        out.field("professional_army", self.professional_army);
        out.field("defense_lobby", self.defense_lobby);
        out.field("interventionism", self.interventionism);
        out.close();
    }
}

/// Resources received every day from outside the map (`free` block)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct OffmapResources {
    pub manpower: f64,
    pub energy: f64,
    pub metal: f64,
    pub rare_materials: f64,
    pub oil: f64,
    pub supplies: f64,
    pub money: f64,
    pub transports: f64,
    pub escorts: f64,
}

const OFFMAP_FIELDS: &[NumField<OffmapResources>] = &[
    num_field!(manpower, NumberStyle::General, is_significant),
    num_field!(energy, NumberStyle::General, is_significant),
    num_field!(metal, NumberStyle::General, is_significant),
    num_field!(rare_materials, NumberStyle::General, is_significant),
    num_field!(oil, NumberStyle::General, is_significant),
    num_field!(supplies, NumberStyle::General, is_significant),
    num_field!(money, NumberStyle::General, is_significant),
    num_field!(transports, NumberStyle::General, is_significant),
    num_field!(escorts, NumberStyle::General, is_significant),
];

impl OffmapResources {
    pub fn is_empty(&self) -> bool {
        return !OFFMAP_FIELDS
            .iter()
            .any(|field| (field.present)((field.get)(self)));
    }

    fn write(&self, out: &mut TextWriter) {
        if self.is_empty() {
            return;
        }
        out.open("free");
        write_all(OFFMAP_FIELDS, self, out);
        out.close();
    }
}

/// Cabinet posts in wire order
pub const CABINET_POSTS: [&str; 10] = [
    "headofstate",
    "headofgovernment",
    "foreignminister",
    "armamentminister",
    "ministerofsecurity",
    "ministerofintelligence",
    "chiefofstaff",
    "chiefofarmy",
    "chiefofnavy",
    "chiefofair",
];

/// The `country = { ... }` block of a country file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TextDeserialize)]
#[or_default]
pub struct CountrySettings {
    /// Include path of the file this country is saved to
    #[skip]
    pub file_name: String,

    pub tag: CountryTag,
    pub puppet: Option<CountryTag>,
    pub control: Option<CountryTag>,
    pub name: Option<String>,
    pub flag_ext: Option<String>,
    pub ai: Option<String>,
    pub ai_settings: BTreeMap<String, i32>,
    pub intrinsic_gov_type: Option<GovernmentType>,
    pub belligerence: Option<i32>,
    pub capital: Option<u32>,
    pub dissent: f64,
    pub extra_tc: f64,
    pub ground_def_eff: f64,
    pub relative_manpower: bool,

    pub manpower: f64,
    pub energy: f64,
    pub metal: f64,
    pub rare_materials: f64,
    pub oil: f64,
    pub supplies: f64,
    pub money: f64,
    pub transports: u32,
    pub escorts: u32,

    #[key("free")]
    pub offmap: OffmapResources,
    pub diplomacy: Diplomacy,
    #[multiple]
    #[key("spyinfo")]
    pub spies: Vec<SpyInfo>,

    pub nationalprovinces: Vec<u32>,
    pub ownedprovinces: Vec<u32>,
    pub controlledprovinces: Vec<u32>,
    pub claimedprovinces: Vec<u32>,
    pub techapps: Vec<u32>,
    pub blueprints: Vec<u32>,
    pub inventions: Vec<u32>,

    pub policy: Option<Policy>,
    pub peacetime_ic_mod: f64,
    pub wartime_ic_mod: f64,

    pub headofstate: Option<TypeId>,
    pub headofgovernment: Option<TypeId>,
    pub foreignminister: Option<TypeId>,
    pub armamentminister: Option<TypeId>,
    pub ministerofsecurity: Option<TypeId>,
    pub ministerofintelligence: Option<TypeId>,
    pub chiefofstaff: Option<TypeId>,
    pub chiefofarmy: Option<TypeId>,
    pub chiefofnavy: Option<TypeId>,
    pub chiefofair: Option<TypeId>,

    /// Arsenal of Democracy only
    pub nationalidentity: Option<String>,
    /// Arsenal of Democracy only
    pub socialpolicy: Option<String>,
    /// Arsenal of Democracy only
    pub nationalculture: Option<String>,

    pub dormant_leaders: Vec<u32>,
    pub dormant_ministers: Vec<u32>,
    pub dormant_teams: Vec<u32>,
    #[multiple]
    #[key("steal_leader")]
    pub steal_leaders: Vec<u32>,

    #[multiple]
    #[key("landunit")]
    pub land_units: Vec<Unit>,
    #[multiple]
    #[key("navalunit")]
    pub naval_units: Vec<Unit>,
    #[multiple]
    #[key("airunit")]
    pub air_units: Vec<Unit>,

    #[multiple]
    #[key("division_development")]
    pub division_developments: Vec<DivisionDevelopment>,
    #[multiple]
    #[key("province_development")]
    pub building_developments: Vec<BuildingDevelopment>,
    #[multiple]
    #[key("convoy_development")]
    pub convoy_developments: Vec<ConvoyDevelopment>,

    /// Dormant land divisions
    #[multiple]
    #[key("landdivision")]
    pub dormant_divisions: Vec<Division>,
}

impl CountrySettings {
    pub fn new(tag: CountryTag) -> Self {
        return CountrySettings {
            tag,
            ..Default::default()
        };
    }

    /// Cabinet posts paired with their wire keys
    pub fn cabinet(&self) -> [(&'static str, Option<TypeId>); 10] {
        let posts = [
            self.headofstate,
            self.headofgovernment,
            self.foreignminister,
            self.armamentminister,
            self.ministerofsecurity,
            self.ministerofintelligence,
            self.chiefofstaff,
            self.chiefofarmy,
            self.chiefofnavy,
            self.chiefofair,
        ];
        return std::array::from_fn(|index| (CABINET_POSTS[index], posts[index]));
    }

    pub fn units(&self, kind: UnitKind) -> &[Unit] {
        return match kind {
            UnitKind::Land => &self.land_units,
            UnitKind::Naval => &self.naval_units,
            UnitKind::Air => &self.air_units,
        };
    }

    fn write_identity(&self, out: &mut TextWriter) {
        out.field("tag", self.tag);
        out.opt_field("puppet", self.puppet);
        out.opt_field("control", self.control);
        for (key, value) in [
            ("name", &self.name),
            ("flag_ext", &self.flag_ext),
            ("ai", &self.ai),
        ] {
            if let Some(value) = value {
                out.string(key, value);
            }
        }
        if !self.ai_settings.is_empty() {
            out.field("ai_settings", inline_record(&self.ai_settings));
        }
        out.opt_field("intrinsic_gov_type", self.intrinsic_gov_type);
        out.opt_field("belligerence", self.belligerence);
        out.opt_field("capital", self.capital);
        out.opt_number("dissent", significant(self.dissent), NumberStyle::General);
        out.opt_number("extra_tc", significant(self.extra_tc), NumberStyle::General);
        out.opt_number(
            "ground_def_eff",
            significant(self.ground_def_eff),
            NumberStyle::General,
        );
        out.flag("relative_manpower", self.relative_manpower);
    }

    fn write_reserves(&self, out: &mut TextWriter) {
        for (key, value) in [
            ("manpower", self.manpower),
            ("energy", self.energy),
            ("metal", self.metal),
            ("rare_materials", self.rare_materials),
            ("oil", self.oil),
            ("supplies", self.supplies),
            ("money", self.money),
        ] {
            out.number(key, value, NumberStyle::General);
        }
        out.field("transports", self.transports);
        out.field("escorts", self.escorts);
    }

    fn write_diplomacy(&self, out: &mut TextWriter) {
        if !self.diplomacy.relations.is_empty() {
            out.open("diplomacy");
            for relation in &self.diplomacy.relations {
                relation.write(out);
            }
            out.close();
        }
        for spy in &self.spies {
            out.open("spyinfo");
            out.field("country", spy.country);
            out.field("numberofspies", spy.numberofspies);
            out.close();
        }
    }

    pub fn write(&self, out: &mut TextWriter, context: &GameContext) {
        out.open("country");
        self.write_identity(out);
        self.write_reserves(out);
        self.offmap.write(out);
        self.write_diplomacy(out);

        out.list("nationalprovinces", &self.nationalprovinces);
        out.list("ownedprovinces", &self.ownedprovinces);
        out.list("controlledprovinces", &self.controlledprovinces);
        out.list("claimedprovinces", &self.claimedprovinces);
        out.list("techapps", &self.techapps);
        out.list("blueprints", &self.blueprints);
        out.list("inventions", &self.inventions);

        if let Some(policy) = &self.policy {
            policy.write(out);
        }
        out.opt_number(
            "peacetime_ic_mod",
            significant(self.peacetime_ic_mod),
            NumberStyle::General,
        );
        out.opt_number(
            "wartime_ic_mod",
            significant(self.wartime_ic_mod),
            NumberStyle::General,
        );
        for (key, minister) in self.cabinet() {
            out.opt_field(key, minister);
        }
        if context.is_aod() {
            for (key, idea) in [
                ("nationalidentity", &self.nationalidentity),
                ("socialpolicy", &self.socialpolicy),
                ("nationalculture", &self.nationalculture),
            ] {
                if let Some(idea) = idea {
                    out.string(key, idea);
                }
            }
        }

        out.list("dormant_leaders", &self.dormant_leaders);
        out.list("dormant_ministers", &self.dormant_ministers);
        out.list("dormant_teams", &self.dormant_teams);
        for leader in &self.steal_leaders {
            out.field("steal_leader", leader);
        }

        for kind in [UnitKind::Land, UnitKind::Naval, UnitKind::Air] {
            for unit in self.units(kind) {
                unit.write(kind, out);
            }
        }
        for development in &self.division_developments {
            development.write(out, context);
        }
        for development in &self.building_developments {
            development.write(out, context);
        }
        for development in &self.convoy_developments {
            development.write(out, context);
        }
        for division in &self.dormant_divisions {
            division.write("landdivision", UnitKind::Land, out);
        }
        out.close();
    }
}
