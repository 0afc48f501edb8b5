//! In-process frame extraction through FFmpeg's libraries.
//!
//! Only compiled with the `native` feature. [`NativeExtractor`] opens the
//! video with `ffmpeg-next`, seeks to the nearest keyframe before the
//! requested offset, then decodes forward to the first frame at or after it.
//! FFmpeg development libraries must be installed to build this backend.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::StillframeError;
use crate::extractor::FrameExtractor;
use crate::timestamp::parse_timestamp;

/// Decodes frames in-process instead of spawning `ffmpeg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExtractor;

impl NativeExtractor {
    /// Create the extractor, initialising FFmpeg.
    ///
    /// # Errors
    ///
    /// Returns [`StillframeError::ExtractionFailed`] if FFmpeg cannot be
    /// initialised.
    pub fn new() -> Result<Self, StillframeError> {
        ffmpeg_next::init().map_err(|error| {
            StillframeError::ExtractionFailed(format!("FFmpeg initialisation failed: {error}"))
        })?;
        Ok(Self)
    }
}

impl FrameExtractor for NativeExtractor {
    fn extract_frame(
        &self,
        video_path: &Path,
        seek: &str,
        destination: &Path,
    ) -> Result<(), StillframeError> {
        let offset = parse_timestamp(seek).ok_or_else(|| {
            StillframeError::ExtractionFailed(format!("invalid seek timestamp {seek:?}"))
        })?;
        log::debug!("Decoding {} at {:?}", video_path.display(), offset);

        let image = decode_frame_at(video_path, offset).map_err(|error| {
            StillframeError::ExtractionFailed(format!(
                "failed generating image from {}: {error}",
                video_path.display()
            ))
        })?;

        image
            .save_with_format(destination, image::ImageFormat::Jpeg)
            .map_err(|error| {
                StillframeError::ExtractionFailed(format!(
                    "failed writing frame to {}: {error}",
                    destination.display()
                ))
            })
    }
}

/// Decode the first frame whose presentation time is at or after `offset`.
fn decode_frame_at(video_path: &Path, offset: Duration) -> Result<RgbImage, ffmpeg_next::Error> {
    let mut input_context = ffmpeg_next::format::input(&video_path)?;
    let stream = input_context
        .streams()
        .best(Type::Video)
        .ok_or(ffmpeg_next::Error::StreamNotFound)?;
    let video_stream_index = stream.index();
    let time_base = stream.time_base();

    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().video()?;
    let (width, height) = (decoder.width(), decoder.height());

    let mut scaler = ScalingContext::get(
        decoder.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;

    // Container-level seek takes AV_TIME_BASE (microseconds).
    let seek_target = offset.as_micros() as i64;
    input_context.seek(seek_target, ..seek_target)?;

    let target_pts = duration_to_stream_timestamp(offset, time_base);
    let mut decoded_frame = VideoFrame::empty();
    let mut rgb_frame = VideoFrame::empty();

    for (stream, packet) in input_context.packets() {
        if stream.index() != video_stream_index {
            continue;
        }

        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if decoded_frame.pts().unwrap_or(0) >= target_pts {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return frame_to_image(&rgb_frame, width, height);
            }
        }
    }

    // Flush the decoder; past the end, the last decoded frame wins.
    decoder.send_eof()?;
    let mut last = None;
    while decoder.receive_frame(&mut decoded_frame).is_ok() {
        scaler.run(&decoded_frame, &mut rgb_frame)?;
        if decoded_frame.pts().unwrap_or(0) >= target_pts {
            return frame_to_image(&rgb_frame, width, height);
        }
        last = Some(frame_to_image(&rgb_frame, width, height)?);
    }

    last.ok_or(ffmpeg_next::Error::Eof)
}

/// Convert a [`Duration`] to a timestamp in the stream's time base.
fn duration_to_stream_timestamp(duration: Duration, time_base: Rational) -> i64 {
    let seconds = duration.as_secs_f64();
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    (seconds * denominator / numerator) as i64
}

/// Copy an RGB24 frame into an [`RgbImage`], dropping per-row padding.
fn frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<RgbImage, ffmpeg_next::Error> {
    let stride = rgb_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = rgb_frame.data(0);

    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }

    RgbImage::from_raw(width, height, buffer).ok_or(ffmpeg_next::Error::InvalidData)
}
