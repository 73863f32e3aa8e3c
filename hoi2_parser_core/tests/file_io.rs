use std::path::Path;

use hoi2_parser_core::{
    GameContext, GameType, ScenarioError,
    io::{CodePage, GameRoot, PathResolver, load_misc, load_scenario, save_misc, save_scenario},
    misc::MiscSettings,
    scenario::province::BuildingSize,
    tables::{CountryTag, Tables},
};

const MAIN: &str = "name = \"Test 1936\"\r\n\
    header = {\r\n\
    \tselectable = { GER ENG }\r\n\
    \tGER = { desc = \"GER_DESC\" }\r\n\
    }\r\n\
    globaldata = {\r\n\
    \ttreaty = { type = trade country = \"GER\" country = \"ENG\" energy = 12.5 }\r\n\
    }\r\n\
    include = \"scenarios\\test\\bases.inc\"\r\n\
    include = \"scenarios\\test\\vp.inc\"\r\n\
    include = \"scenarios\\test\\germany.inc\"\r\n";

const BASES: &str = "province = { id = 1861 air_base = 4 }\r\n";
const VP: &str = "province = { id = 1861 points = 10 }\r\n";
const GERMANY: &str = "# Country definition for GER\r\n\
    province = { id = 1861 ic = 12 name = \"Berlin\" }\r\n\
    country = {\r\n\
    \ttag = GER\r\n\
    \tname = \"Deutsches Reich\"\r\n\
    \townedprovinces = { 1861 }\r\n\
    \tmanpower = 100\r\n\
    }\r\n";

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

fn game_root() -> (tempfile::TempDir, GameRoot) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "scenarios/test.eug", MAIN);
    write(dir.path(), "scenarios/test/bases.inc", BASES);
    write(dir.path(), "scenarios/test/vp.inc", VP);
    write(dir.path(), "scenarios/test/germany.inc", GERMANY);
    let root = GameRoot::new(dir.path(), None::<&Path>);
    return (dir, root);
}

#[test]
fn test_load_scenario() {
    let (dir, root) = game_root();
    let document = load_scenario(
        dir.path().join("scenarios/test.eug"),
        &root,
        &Tables::standard(),
        CodePage::default(),
    )
    .unwrap();

    assert_eq!(document.name, "Test 1936");
    assert_eq!(document.global_data.trades.len(), 1);
    let berlin = &document.provinces[&1861];
    assert_eq!(berlin.air_base, Some(BuildingSize::completed(4.0)));
    assert_eq!(berlin.ic, Some(BuildingSize::completed(12.0)));
    assert_eq!(berlin.points, 10);
    assert_eq!(berlin.name.as_deref(), Some("Berlin"));

    let germany = document.country("GER".parse::<CountryTag>().unwrap()).unwrap();
    assert_eq!(germany.file_name, "scenarios\\test\\germany.inc");
    assert_eq!(germany.manpower, 100.0);
}

#[test]
fn test_save_and_reload() {
    let (dir, root) = game_root();
    let main = dir.path().join("scenarios/test.eug");
    let tables = Tables::standard();
    let context = GameContext::new(GameType::HeartsOfIron2, 130);
    let mut document = load_scenario(&main, &root, &tables, CodePage::default()).unwrap();
    document.province_mut(1861).revoltrisk = 3.0;

    save_scenario(&document, &main, &root, &context, CodePage::default()).unwrap();
    let reloaded = load_scenario(&main, &root, &tables, CodePage::default()).unwrap();
    assert_eq!(reloaded, document);

    let bases = std::fs::read_to_string(root.target("scenarios\\test\\bases.inc")).unwrap();
    assert_eq!(bases, "province = { id = 1861 air_base = 4 }\r\n");
    let germany = std::fs::read_to_string(root.target("scenarios\\test\\germany.inc")).unwrap();
    assert!(germany.contains("\trevoltrisk = 3\r\n"));
    assert!(germany.contains("# Country main data #"));
    assert!(!germany.contains("points"));
}

#[test]
fn test_failed_load() {
    let (dir, root) = game_root();
    write(dir.path(), "scenarios/test/vp.inc", "province = { id = 1861 points = { }\r\n");
    let result = load_scenario(
        dir.path().join("scenarios/test.eug"),
        &root,
        &Tables::standard(),
        CodePage::default(),
    );
    assert!(matches!(result, Err(ScenarioError::Parse { .. })));

    std::fs::remove_file(dir.path().join("scenarios/test/vp.inc")).unwrap();
    let result = load_scenario(
        dir.path().join("scenarios/test.eug"),
        &root,
        &Tables::standard(),
        CodePage::default(),
    );
    assert!(matches!(result, Err(ScenarioError::MissingInclude(_))));
}

#[test]
fn test_mod_directory_first() {
    let (dir, _) = game_root();
    let modded = tempfile::tempdir().unwrap();
    write(modded.path(), "scenarios/test/vp.inc", "province = { id = 1861 points = 25 }\r\n");
    let root = GameRoot::new(dir.path(), Some(modded.path()));
    let document = load_scenario(
        dir.path().join("scenarios/test.eug"),
        &root,
        &Tables::standard(),
        CodePage::default(),
    )
    .unwrap();
    assert_eq!(document.provinces[&1861].points, 25);
    assert!(root.target("scenarios\\test\\vp.inc").starts_with(modded.path()));
}

#[test]
fn test_misc_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db/misc.txt");
    let context = GameContext::new(GameType::ArsenalOfDemocracy, 108);
    let mut misc = MiscSettings::default();
    misc.set("max_dissent", 80.0);

    save_misc(&misc, &path, &context, CodePage::default()).unwrap();
    assert_eq!(load_misc(&path, &context, CodePage::default()).unwrap(), misc);
}
