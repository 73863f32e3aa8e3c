//! Which physical file owns which group of province fields.

use serde::{Deserialize, Serialize};

use crate::game::GameType;

/// Files that province records are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvinceFile {
    Bases,
    BasesDod,
    Depots,
    Vp,
    /// The `.inc` file of the country owning the province
    Country,
}
impl ProvinceFile {
    /// Name of the include file, or `None` for country files which are named per country
    pub fn file_name(&self) -> Option<&'static str> {
        return match self {
            ProvinceFile::Bases => Some("bases.inc"),
            ProvinceFile::BasesDod => Some("bases_DOD.inc"),
            ProvinceFile::Depots => Some("depots.inc"),
            ProvinceFile::Vp => Some("vp.inc"),
            ProvinceFile::Country => None,
        };
    }

    /// Classifies an include path by its file name
    pub fn classify(include: &str) -> ProvinceFile {
        let name = include.rsplit(['\\', '/']).next().unwrap_or(include);
        return match name.to_ascii_lowercase().as_str() {
            "bases.inc" => ProvinceFile::Bases,
            "bases_dod.inc" => ProvinceFile::BasesDod,
            "depots.inc" => ProvinceFile::Depots,
            "vp.inc" => ProvinceFile::Vp,
            _ => ProvinceFile::Country,
        };
    }
}

/// Groups of province fields that are routed together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    /// `air_base naval_base anti_air`
    BaseBuildings,
    /// Every other building
    Buildings,
    /// `supplypool oilpool energypool metalpool rarematerialspool`
    Pools,
    /// Resource stocks and manpower
    Resources,
    /// `revoltrisk name weather`
    Details,
    /// `points`
    VictoryPoints,
}
impl FieldGroup {
    pub const ALL: [FieldGroup; 6] = [
        FieldGroup::BaseBuildings,
        FieldGroup::Buildings,
        FieldGroup::Pools,
        FieldGroup::Resources,
        FieldGroup::Details,
        FieldGroup::VictoryPoints,
    ];
}

/// Per-scenario flags telling which auxiliary files exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRouting {
    pub bases: bool,
    pub bases_dod: bool,
    pub depots: bool,
    pub vp: bool,
    pub country_provinces: bool,
}
impl FieldRouting {
    pub fn from_includes<S: AsRef<str>>(includes: &[S]) -> Self {
        let mut routing = FieldRouting::default();
        for include in includes {
            match ProvinceFile::classify(include.as_ref()) {
                ProvinceFile::Bases => routing.bases = true,
                ProvinceFile::BasesDod => routing.bases_dod = true,
                ProvinceFile::Depots => routing.depots = true,
                ProvinceFile::Vp => routing.vp = true,
                ProvinceFile::Country => routing.country_provinces = true,
            }
        }
        return routing;
    }

    /// The bases-family file a province is written to. With both files in the scenario,
    /// provinces read from `bases_DOD.inc` go back there and every other province goes to `bases.inc`.
    pub fn bases_file(&self, from_bases_dod: bool) -> Option<ProvinceFile> {
        return match (self.bases, self.bases_dod) {
            (true, true) if from_bases_dod => Some(ProvinceFile::BasesDod),
            (true, _) => Some(ProvinceFile::Bases),
            (false, true) => Some(ProvinceFile::BasesDod),
            (false, false) => None,
        };
    }

    /// The single file that `group` of a province is written to, if any.
    pub fn owner(
        &self,
        edition: GameType,
        group: FieldGroup,
        from_bases_dod: bool,
    ) -> Option<ProvinceFile> {
        match group {
            FieldGroup::VictoryPoints if self.vp => return Some(ProvinceFile::Vp),
            FieldGroup::Pools if self.depots => return Some(ProvinceFile::Depots),
            _ => {}
        }
        if let Some(bases) = self.bases_file(from_bases_dod) {
            if edition == GameType::DarkestHour || group == FieldGroup::BaseBuildings {
                return Some(bases);
            }
        }
        if self.country_provinces {
            return Some(ProvinceFile::Country);
        }
        return None;
    }

    pub fn owns(
        &self,
        edition: GameType,
        group: FieldGroup,
        file: ProvinceFile,
        from_bases_dod: bool,
    ) -> bool {
        return self.owner(edition, group, from_bases_dod) == Some(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            ProvinceFile::classify("scenarios\\1936\\bases_DOD.inc"),
            ProvinceFile::BasesDod
        );
        assert_eq!(ProvinceFile::classify("scenarios/1936/vp.inc"), ProvinceFile::Vp);
        assert_eq!(
            ProvinceFile::classify("scenarios\\1936\\ger.inc"),
            ProvinceFile::Country
        );
    }

    #[test]
    fn test_depots_take_pools() {
        let mut routing = FieldRouting {
            bases: true,
            country_provinces: true,
            ..Default::default()
        };
        let edition = GameType::DarkestHour;
        assert_eq!(
            routing.owner(edition, FieldGroup::Pools, false),
            Some(ProvinceFile::Bases)
        );
        routing.depots = true;
        assert_eq!(
            routing.owner(edition, FieldGroup::Pools, false),
            Some(ProvinceFile::Depots)
        );
        assert!(!routing.owns(edition, FieldGroup::Pools, ProvinceFile::Bases, false));
    }

    #[test]
    fn test_hoi2_bases_only_take_base_buildings() {
        let routing = FieldRouting::from_includes(&["bases.inc", "ger.inc"]);
        let edition = GameType::HeartsOfIron2;
        assert_eq!(
            routing.owner(edition, FieldGroup::BaseBuildings, false),
            Some(ProvinceFile::Bases)
        );
        assert_eq!(
            routing.owner(edition, FieldGroup::Buildings, false),
            Some(ProvinceFile::Country)
        );
    }

    #[test]
    fn test_every_group_has_at_most_one_owner() {
        let routing = FieldRouting {
            bases: true,
            bases_dod: true,
            depots: true,
            vp: true,
            country_provinces: true,
        };
        for edition in [
            GameType::HeartsOfIron2,
            GameType::ArsenalOfDemocracy,
            GameType::DarkestHour,
        ] {
            for (group, from_bases_dod) in FieldGroup::ALL
                .into_iter()
                .flat_map(|group| [(group, false), (group, true)])
            {
                let owners = [
                    ProvinceFile::Bases,
                    ProvinceFile::BasesDod,
                    ProvinceFile::Depots,
                    ProvinceFile::Vp,
                    ProvinceFile::Country,
                ]
                .into_iter()
                .filter(|file| routing.owns(edition, group, *file, from_bases_dod))
                .count();
                assert_eq!(owners, 1, "{edition} {group:?}");
            }
        }
    }

    #[test]
    fn test_both_bases_files() {
        let routing = FieldRouting::from_includes(&["bases.inc", "bases_DOD.inc"]);
        let edition = GameType::HeartsOfIron2;
        assert_eq!(
            routing.owner(edition, FieldGroup::BaseBuildings, false),
            Some(ProvinceFile::Bases)
        );
        assert_eq!(
            routing.owner(edition, FieldGroup::BaseBuildings, true),
            Some(ProvinceFile::BasesDod)
        );

        let dod_only = FieldRouting::from_includes(&["bases_DOD.inc"]);
        assert_eq!(dod_only.bases_file(false), Some(ProvinceFile::BasesDod));
    }

    #[test]
    fn test_no_owner() {
        let routing = FieldRouting::default();
        assert_eq!(routing.owner(GameType::DarkestHour, FieldGroup::Resources, false), None);
    }
}
