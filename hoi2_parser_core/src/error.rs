use std::path::PathBuf;

use crate::text_deserialize::TextError;

/// Failure to load or save one file of a scenario
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: TextError },
    #[error("Unknown code page `{0}`")]
    UnknownCodePage(String),
    #[error("Included file `{0}` was not found")]
    MissingInclude(String),
}
impl ScenarioError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> ScenarioError {
        let path = path.into();
        return move |source| ScenarioError::Io { path, source };
    }

    pub fn parse(path: impl Into<PathBuf>) -> impl FnOnce(TextError) -> ScenarioError {
        let path = path.into();
        return move |source| ScenarioError::Parse { path, source };
    }
}
