mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use hoi2_parser_core::{
    GameContext, GameType, ScenarioDocument,
    io::{CodePage, GameRoot, load_misc, load_scenario, save_misc, save_scenario},
    tables::Tables,
    text_writer::TextWriter,
};

#[derive(Parser)]
#[command(name = "scenario_tool")]
#[command(about = "Check, normalize and inspect Hearts of Iron II scenario files")]
struct Cli {
    #[command(flatten)]
    game: GameArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GameArgs {
    /// hoi2, aod or dh
    #[arg(long, global = true, default_value = "hoi2")]
    edition: GameType,
    /// Version number without the dot, e.g. 103 for Darkest Hour 1.03
    #[arg(long, global = true, default_value_t = 130)]
    game_version: u32,
    /// The game directory that include paths are relative to.
    /// Defaults to two levels above the scenario file.
    #[arg(long, global = true)]
    game_root: Option<PathBuf>,
    /// A mod directory whose files are read before the game's and saved to
    #[arg(long, global = true)]
    mod_dir: Option<PathBuf>,
    #[arg(long, global = true, default_value = "windows-1252")]
    codepage: String,
}
impl GameArgs {
    fn context(&self) -> GameContext {
        return GameContext::new(self.edition, self.game_version);
    }

    fn code_page(&self) -> Result<CodePage> {
        return Ok(CodePage::from_label(&self.codepage)?);
    }

    /// `scenarios/<name>.eug` lives two levels below the game root
    fn root_for(&self, scenario: &Path) -> Result<GameRoot> {
        let root = match &self.game_root {
            Some(root) => root.clone(),
            None => scenario
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .ok_or_else(|| {
                    anyhow!(
                        "Cannot find the game root of {}, use --game-root",
                        scenario.display()
                    )
                })?,
        };
        return Ok(GameRoot::new(root, self.mod_dir.as_ref()));
    }

    fn load(&self, scenario: &Path) -> Result<(ScenarioDocument, GameRoot)> {
        let root = self.root_for(scenario)?;
        let document = load_scenario(scenario, &root, &Tables::standard(), self.code_page()?)
            .with_context(|| format!("While loading {}", scenario.display()))?;
        return Ok((document, root));
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scenario and print a summary
    Check {
        #[arg(value_name = "SCENARIO")]
        file: PathBuf,
    },
    /// Load a scenario and save it again in canonical form
    Normalize {
        #[arg(value_name = "SCENARIO")]
        file: PathBuf,
    },
    /// Print a loaded scenario as JSON
    Dump {
        #[arg(value_name = "SCENARIO")]
        file: PathBuf,
    },
    /// Load a misc.txt and print it as it would be saved
    Misc {
        #[arg(value_name = "MISC")]
        file: PathBuf,
        /// Save it back in place
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let game = &cli.game;

    match &cli.command {
        Commands::Check { file } => {
            let (document, _) = game.load(file)?;
            let mut text = String::new();
            summary::summarize(&mut text, &document, &game.context())?;
            print!("{text}");
        }
        Commands::Normalize { file } => {
            let (document, root) = game.load(file)?;
            save_scenario(&document, file, &root, &game.context(), game.code_page()?)
                .with_context(|| format!("While saving {}", file.display()))?;
            println!(
                "Saved {} with {} includes",
                file.display(),
                document.includes.len()
            );
        }
        Commands::Dump { file } => {
            let (document, _) = game.load(file)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Misc { file, write } => {
            let context = game.context();
            let misc = load_misc(file, &context, game.code_page()?)
                .with_context(|| format!("While loading {}", file.display()))?;
            if *write {
                save_misc(&misc, file, &context, game.code_page()?)?;
                log::info!("Saved {}", file.display());
            } else {
                let mut out = TextWriter::new();
                misc.write(&mut out, &context);
                print!("{}", out.finish());
            }
        }
    }

    return Ok(());
}
