//! Client code for ogp-cache.
//!
//! This crate provides the collaborators that talk to the outside world
//! (conditional HTTP fetch, OGP extraction, image codec, card rendering) and
//! the preview pipeline built on them.

pub mod codec;
pub mod extract;
pub mod fetch;
pub mod preview;
pub mod render;
pub mod revalidate;

#[cfg(test)]
mod testing;

pub use codec::{ImageCodec, WebpCodec};
pub use extract::{MetadataExtractor, OgpExtractor, PageMetadata, decode_html};
pub use fetch::{ConditionalHeaders, FetchConfig, FetchResponse, Fetcher, HttpFetcher};
pub use preview::{CardRequest, PreviewService, THUMB_PREFIX};
#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::{CardImage, CardStyle, RenderError, RenderOptions, Renderer};
pub use revalidate::{Revalidation, revalidate};
