//! Screen frame types for the Playtrace capture stream.

use serde::{Deserialize, Serialize};

use crate::event::TimestampSecs;

/// Bytes per pixel in a frame buffer (RGB24).
pub const BYTES_PER_PIXEL: usize = 3;

/// A raw RGB24 pixel buffer with its geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Frame geometry, carried in export metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameBuffer {
    /// Create a frame buffer, validating that the pixel data matches the
    /// claimed geometry.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameGeometryError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(FrameGeometryError {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with one RGB value. Handy for tests and synthetic
    /// sources.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry {
            width: self.width,
            height: self.height,
        }
    }

    /// Raw RGB24 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the raw bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Pixel data did not match the claimed frame geometry.
#[derive(Debug, Clone, thiserror::Error)]
#[error("frame buffer {width}x{height} expects {expected} bytes, got {actual}")]
pub struct FrameGeometryError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

/// One timestamped captured frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenFrame {
    /// Fractional seconds since session start, stamped at receipt.
    pub timestamp_secs: TimestampSecs,

    /// The captured pixels.
    pub buffer: FrameBuffer,
}

impl ScreenFrame {
    pub fn new(timestamp_secs: TimestampSecs, buffer: FrameBuffer) -> Self {
        Self {
            timestamp_secs,
            buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_validated() {
        assert!(FrameBuffer::new(2, 2, vec![0u8; 12]).is_ok());
        assert!(FrameBuffer::new(2, 2, vec![0u8; 11]).is_err());
    }

    #[test]
    fn test_filled_buffer() {
        let buffer = FrameBuffer::filled(2, 1, [10, 20, 30]);
        assert_eq!(buffer.data(), &[10, 20, 30, 10, 20, 30]);
        assert_eq!(buffer.geometry(), FrameGeometry {
            width: 2,
            height: 1
        });
    }
}
