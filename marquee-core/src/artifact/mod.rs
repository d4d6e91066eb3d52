mod kind;

pub use kind::{ArtifactKind, ParseArtifactKindError};
