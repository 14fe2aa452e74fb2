//! Realtime input encoders.
//!
//! Audio: mono f32 at the device rate -> 16kHz PCM16 LE -> base64.
//! Screen: RGBA frame -> RGB -> JPEG -> base64.

use base64::prelude::*;
use image::codecs::jpeg::JpegEncoder;

use super::{CaptureError, CaptureResult, VideoFrame};
use crate::core::realtime::RealtimeInputChunk;

/// Sample rate of audio sent to the model.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Linear interpolation resampler.
pub fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if input.is_empty() || from_rate == 0 || from_rate == to_rate {
        return input.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = (input.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src = i as f64 / ratio;
        let idx = src.floor() as usize;
        let frac = (src - idx as f64) as f32;

        if idx + 1 < input.len() {
            output.push(input[idx] * (1.0 - frac) + input[idx + 1] * frac);
        } else {
            output.push(input.last().copied().unwrap_or(0.0));
        }
    }

    output
}

/// Clamp to [-1, 1] and convert to 16-bit signed little-endian PCM.
pub fn f32_to_pcm16_le(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Encode one microphone buffer as an `audio/pcm;rate=16000` chunk.
pub fn encode_audio_chunk(samples: &[f32], device_rate: u32) -> RealtimeInputChunk {
    let resampled = resample_linear(samples, device_rate, TARGET_SAMPLE_RATE);
    RealtimeInputChunk::audio(BASE64_STANDARD.encode(f32_to_pcm16_le(&resampled)))
}

fn rgba_to_rgb(frame: &VideoFrame) -> CaptureResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.rgba.len() != expected {
        return Err(CaptureError::EncodingFailed(format!(
            "frame buffer is {} bytes, expected {expected} for {}x{}",
            frame.rgba.len(),
            frame.width,
            frame.height
        )));
    }

    let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    for pixel in frame.rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }
    Ok(rgb)
}

/// Encode a frame at its native size as an `image/jpeg` chunk.
///
/// `quality` is 1..=100; 60 matches a 0.6 quality factor.
pub fn encode_jpeg_chunk(frame: &VideoFrame, quality: u8) -> CaptureResult<RealtimeInputChunk> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::EncodingFailed("empty frame".to_string()));
    }

    let rgb = rgba_to_rgb(frame)?;
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode(&rgb, frame.width, frame.height, image::ColorType::Rgb8.into())
        .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;

    Ok(RealtimeInputChunk::jpeg(BASE64_STANDARD.encode(jpeg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_48k_to_16k_length() {
        let input = vec![0.25f32; 480];
        let output = resample_linear(&input, 48_000, TARGET_SAMPLE_RATE);
        assert_eq!(output.len(), 160);
        assert!(output.iter().all(|s| (*s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_linear(&input, 16_000, 16_000), input);
    }

    #[test]
    fn test_pcm16_conversion_clamps() {
        let bytes = f32_to_pcm16_le(&[0.0, 1.0, -2.0]);
        assert_eq!(bytes.len(), 6);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 0);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), -i16::MAX);
    }

    #[test]
    fn test_audio_chunk_is_base64_pcm() {
        let chunk = encode_audio_chunk(&[0.5; 320], 32_000);
        assert_eq!(chunk.mime_type, "audio/pcm;rate=16000");
        let raw = BASE64_STANDARD.decode(&chunk.data).unwrap();
        assert_eq!(raw.len(), 160 * 2);
    }

    #[test]
    fn test_jpeg_chunk_decodes_with_native_size() {
        let frame = VideoFrame::solid(8, 6, [200, 10, 10, 255]);
        let chunk = encode_jpeg_chunk(&frame, 60).unwrap();
        assert_eq!(chunk.mime_type, "image/jpeg");

        let bytes = BASE64_STANDARD.decode(&chunk.data).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn test_jpeg_rejects_bad_frames() {
        assert!(encode_jpeg_chunk(&VideoFrame::solid(0, 4, [0; 4]), 60).is_err());

        let mut short = VideoFrame::solid(2, 2, [0; 4]);
        short.rgba.truncate(3);
        assert!(matches!(
            encode_jpeg_chunk(&short, 60),
            Err(CaptureError::EncodingFailed(_))
        ));
    }
}
