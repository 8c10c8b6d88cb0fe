pub mod document;
pub mod slicer;

pub use document::ModelDocument;
pub use slicer::{Letter, LetterGeometry, slice_letters};
