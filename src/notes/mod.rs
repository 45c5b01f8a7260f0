mod load;
mod model;
mod parse;

pub use load::{NoteSource, load_workspace};
pub use model::{Category, MapMetadata, Note, Workspace};
