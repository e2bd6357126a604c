//! Attachment decoding for PDF embedding.
//!
//! JPEG payloads go into the document untouched behind a DCTDecode
//! filter. Everything else the `image` crate can read is flattened to
//! raw 8-bit RGB, which the writer deflates with the rest of the
//! streams.

use dossier_schema::SharedData;
use image::ImageFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum DecodeError {
    #[error("unrecognized image data")]
    UnknownFormat,
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

pub(crate) struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub jpeg_passthrough: bool,
}

impl DecodedImage {
    /// Scales to the target width, preserving the aspect ratio, then
    /// clamps against the height cap.
    pub(crate) fn fit(&self, target_w: f32, max_h: f32) -> (f32, f32) {
        let ratio = self.width as f32 / self.height as f32;
        let mut w = target_w;
        let mut h = w / ratio;
        if h > max_h {
            h = max_h;
            w = h * ratio;
        }
        (w, h)
    }
}

pub(crate) fn decode(bytes: &SharedData) -> Result<DecodedImage, DecodeError> {
    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnknownFormat)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    if format == ImageFormat::Jpeg {
        return Ok(DecodedImage {
            width: decoded.width(),
            height: decoded.height(),
            data: bytes.as_ref().clone(),
            jpeg_passthrough: true,
        });
    }
    let rgb = decoded.to_rgb8();
    Ok(DecodedImage {
        width: rgb.width(),
        height: rgb.height(),
        data: rgb.into_raw(),
        jpeg_passthrough: false,
    })
}
