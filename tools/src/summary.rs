use std::fmt::{self, Write};

use hoi2_parser_core::{GameContext, ScenarioDocument, routing::FieldGroup, scenario::unit::UnitKind};

/// Writes a human readable overview of a loaded scenario
pub fn summarize(
    out: &mut impl Write,
    document: &ScenarioDocument,
    context: &GameContext,
) -> fmt::Result {
    writeln!(out, "{} ({:#} {})", document.name, context.edition, context.version)?;
    writeln!(
        out,
        "{} includes, {} provinces, {} countries",
        document.includes.len(),
        document.provinces.len(),
        document.countries.len()
    )?;

    let header = &document.header;
    let majors: Vec<String> = header.majors.iter().map(|major| major.tag.to_string()).collect();
    writeln!(
        out,
        "{} selectable, majors: {}",
        header.selectable.len(),
        majors.join(" ")
    )?;

    let data = &document.global_data;
    let named_alliances = [&data.axis, &data.allies, &data.comintern]
        .iter()
        .filter(|alliance| alliance.is_some())
        .count();
    writeln!(
        out,
        "{} alliances, {} wars, {} treaties",
        data.alliances.len() + named_alliances,
        data.wars.len(),
        data.treaties().count()
    )?;

    let routing = document.routing();
    for group in FieldGroup::ALL {
        if let Some(file) = routing.owner(context.edition, group, false) {
            writeln!(out, "  {group:?} -> {file:?}")?;
            continue;
        }
        let lost = document
            .provinces
            .values()
            .filter(|province| province.has_group_data(group))
            .count();
        if lost > 0 {
            writeln!(out, "  {group:?} -> nowhere, {lost} provinces would lose data")?;
        }
    }

    for country in &document.countries {
        writeln!(
            out,
            "{} [{}]: {} land, {} naval, {} air units",
            country.tag,
            country.file_name,
            country.units(UnitKind::Land).len(),
            country.units(UnitKind::Naval).len(),
            country.units(UnitKind::Air).len()
        )?;
    }
    return Ok(());
}
