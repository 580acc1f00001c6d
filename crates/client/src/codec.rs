//! Image normalisation into the stored format.
//!
//! Every stored image is decoded and re-encoded, never passed through, so the
//! cache only ever serves one format whatever the origin sent.

use std::io::Cursor;

use image::ImageFormat;
use ogpcache_core::Error;

/// Decode-then-encode image conversion.
pub trait ImageCodec: Send + Sync {
    /// MIME type of the bytes produced by [`ImageCodec::reencode`].
    fn mime_type(&self) -> &'static str;

    fn reencode(&self, source: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Lossless WebP encoder backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebpCodec;

impl ImageCodec for WebpCodec {
    fn mime_type(&self) -> &'static str {
        "image/webp"
    }

    fn reencode(&self, source: &[u8]) -> Result<Vec<u8>, Error> {
        let decoded = image::load_from_memory(source).map_err(|e| Error::CodecFailed(format!("decode: {e}")))?;
        let rgba = decoded.to_rgba8();

        let mut out = Cursor::new(Vec::new());
        rgba.write_to(&mut out, ImageFormat::WebP)
            .map_err(|e| Error::CodecFailed(format!("encode: {e}")))?;
        Ok(out.into_inner())
    }
}
