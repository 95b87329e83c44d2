pub mod transient;

pub use transient::{ArtifactGuard, TransientStore};
