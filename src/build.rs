mod builder;
mod document;
mod feed;
pub mod format;
mod markdown;
mod paths;
mod render;
mod renderer;
mod source;

pub use builder::{BuildOptions, BuildResult, Builder, FeedOptions};
pub use document::{DocumentRecord, PageKind, PageMetadata};
