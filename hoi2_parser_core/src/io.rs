//! Reading and writing scenario files on disk.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, WINDOWS_1252};
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::{info, warn};
use tempfile::NamedTempFile;

use crate::{
    error::ScenarioError,
    game::GameContext,
    misc::MiscSettings,
    scenario::{ScenarioDocument, assembler::read_include},
    tables::Tables,
    text_deserialize::TextDeserializer,
    text_writer::TextWriter,
};

/// The text encoding of the game's files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePage(&'static Encoding);
impl Default for CodePage {
    fn default() -> Self {
        return CodePage(WINDOWS_1252);
    }
}
impl CodePage {
    /// Looks up an encoding by a label such as `windows-1252` or `shift_jis`
    pub fn from_label(label: &str) -> Result<Self, ScenarioError> {
        return Encoding::for_label(label.trim().as_bytes())
            .map(CodePage)
            .ok_or_else(|| ScenarioError::UnknownCodePage(label.to_string()));
    }

    pub fn name(&self) -> &'static str {
        return self.0.name();
    }

    pub fn decode<T: Read>(&self, buffer: T) -> Result<String, std::io::Error> {
        let mut text = "".to_string();
        DecodeReaderBytesBuilder::new()
            .encoding(Some(self.0))
            .build(buffer)
            .read_to_string(&mut text)?;
        return Ok(text);
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (bytes, _, unmappable) = self.0.encode(text);
        if unmappable {
            warn!("Some characters cannot be written in {}", self.name());
        }
        return bytes.into_owned();
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Result<String, ScenarioError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(ScenarioError::io(path))?;
        return self.decode(file).map_err(ScenarioError::io(path));
    }
}

/// Maps the include paths written in a scenario to files
pub trait PathResolver {
    /// The existing file to read `include` from
    fn resolve(&self, include: &str) -> Result<PathBuf, ScenarioError>;

    /// The file to save `include` to
    fn target(&self, include: &str) -> PathBuf;
}

/// The game directory, with an optional mod directory whose files take precedence
#[derive(Debug, Clone)]
pub struct GameRoot {
    pub root: PathBuf,
    pub modded: Option<PathBuf>,
}
impl GameRoot {
    pub fn new(root: impl AsRef<Path>, modded: Option<impl AsRef<Path>>) -> Self {
        return GameRoot {
            root: root.as_ref().to_path_buf(),
            modded: modded.map(|modded| modded.as_ref().to_path_buf()),
        };
    }

    /// Include paths are relative to the game root and use `\`
    fn relative(include: &str) -> PathBuf {
        return include
            .split(['\\', '/'])
            .filter(|part| !part.is_empty())
            .collect();
    }
}
impl PathResolver for GameRoot {
    fn resolve(&self, include: &str) -> Result<PathBuf, ScenarioError> {
        let relative = GameRoot::relative(include);
        for dir in self.modded.iter().chain(std::iter::once(&self.root)) {
            let path = dir.join(&relative);
            if path.is_file() {
                return Ok(path);
            }
        }
        return Err(ScenarioError::MissingInclude(include.to_string()));
    }

    fn target(&self, include: &str) -> PathBuf {
        let dir = self.modded.as_ref().unwrap_or(&self.root);
        return dir.join(GameRoot::relative(include));
    }
}

/// Loads a scenario and every include it names.
///
/// Nothing is returned unless every file loads.
pub fn load_scenario(
    main: impl AsRef<Path>,
    resolver: &impl PathResolver,
    tables: &Tables,
    code_page: CodePage,
) -> Result<ScenarioDocument, ScenarioError> {
    let main = main.as_ref();
    info!("Loading scenario {}", main.display());
    let text = code_page.read(main)?;
    let mut stream = TextDeserializer::from_str(&text);
    let mut document: ScenarioDocument = stream
        .parse_with(tables)
        .map_err(ScenarioError::parse(main))?;

    for include in document.includes.clone() {
        let path = resolver.resolve(&include)?;
        let text = code_page.read(&path)?;
        let contents = read_include(&text, &include).map_err(ScenarioError::parse(&path))?;
        info!(
            "Loaded {} provinces and {} countries from {include}",
            contents.provinces.len(),
            contents.countries.len()
        );
        document.merge_include(contents);
    }
    return Ok(document);
}

/// Writes `bytes` through a temporary file in the same directory, replacing `path` on success
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ScenarioError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(ScenarioError::io(dir))?;
    let mut file = NamedTempFile::new_in(dir).map_err(ScenarioError::io(dir))?;
    file.write_all(bytes).map_err(ScenarioError::io(path))?;
    file.persist(path)
        .map_err(|err| ScenarioError::io(path)(err.error))?;
    return Ok(());
}

/// Saves the main file to `main` and every include the document owns through `resolver`.
///
/// Every file is rendered before the first one is written.
pub fn save_scenario(
    document: &ScenarioDocument,
    main: impl AsRef<Path>,
    resolver: &impl PathResolver,
    context: &GameContext,
    code_page: CodePage,
) -> Result<(), ScenarioError> {
    let main = main.as_ref();
    let files = document.assemble(context);
    let mut outputs = vec![(main.to_path_buf(), code_page.encode(&files.main))];
    for file in &files.includes {
        outputs.push((resolver.target(&file.include), code_page.encode(&file.text)));
    }
    for (path, bytes) in &outputs {
        write_atomic(path, bytes)?;
    }
    info!("Saved scenario {} ({} files)", main.display(), outputs.len());
    return Ok(());
}

pub fn load_misc(
    path: impl AsRef<Path>,
    context: &GameContext,
    code_page: CodePage,
) -> Result<MiscSettings, ScenarioError> {
    let path = path.as_ref();
    let text = code_page.read(path)?;
    return MiscSettings::read(&text, context).map_err(ScenarioError::parse(path));
}

pub fn save_misc(
    misc: &MiscSettings,
    path: impl AsRef<Path>,
    context: &GameContext,
    code_page: CodePage,
) -> Result<(), ScenarioError> {
    let mut out = TextWriter::new();
    misc.write(&mut out, context);
    return write_atomic(path.as_ref(), &code_page.encode(&out.finish()));
}
