pub mod common_deserialize;
pub mod err_context;
pub mod error;
pub mod format;
pub mod game;
pub mod game_date;
pub mod io;
pub mod misc;
pub mod presence;
pub mod routing;
pub mod scenario;
pub mod tables;
pub mod text_deserialize;
pub mod text_lexer;
pub mod text_writer;

pub use error::ScenarioError;
pub use game::{GameContext, GameType};
pub use game_date::{GameDate, Month};
pub use scenario::ScenarioDocument;
pub use text_deserialize::{TextDeserialize, TextDeserializer, TextError};
