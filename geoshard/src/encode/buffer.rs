//! Owned buffer types and shared layout reading helpers.

use std::ops::{Deref, Range};
use thiserror::Error;

/// Errors raised while walking a binary layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A count field is negative, fractional or not finite
    #[error("Invalid count {value} at offset {offset}")]
    InvalidCount { offset: usize, value: f64 },

    /// The buffer ends before a declared field or coordinate run
    #[error("Buffer truncated at offset {offset}: need {needed} values, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Values remain after the declared number of features
    #[error("{remaining} unexpected trailing values at offset {offset}")]
    TrailingData { offset: usize, remaining: usize },
}

macro_rules! flat_buffer {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name(Vec<f64>);

        impl $name {
            /// Wraps raw values without validating the layout.
            pub fn from_vec(data: Vec<f64>) -> Self {
                Self(data)
            }

            /// Number of features declared in the header (0 for an empty buffer).
            pub fn feature_count(&self) -> usize {
                self.0.first().map_or(0, |count| *count as usize)
            }

            /// Everything after the leading feature count.
            pub fn payload(&self) -> &[f64] {
                self.0.get(1..).unwrap_or(&[])
            }

            pub fn as_slice(&self) -> &[f64] {
                &self.0
            }

            pub fn as_mut_slice(&mut self) -> &mut [f64] {
                &mut self.0
            }

            pub fn into_vec(self) -> Vec<f64> {
                self.0
            }

            /// Little-endian byte image of the buffer, the wire format
            /// handed to the renderer.
            pub fn to_le_bytes(&self) -> Vec<u8> {
                self.0.iter().flat_map(|v| v.to_le_bytes()).collect()
            }
        }

        impl Deref for $name {
            type Target = [f64];

            fn deref(&self) -> &[f64] {
                &self.0
            }
        }

        impl From<Vec<f64>> for $name {
            fn from(data: Vec<f64>) -> Self {
                Self(data)
            }
        }
    };
}

flat_buffer!(
    /// Encoded road network: `[count, {road_type, point_count, x, y, ...}+]`.
    RoadBuffer
);

flat_buffer!(
    /// Encoded polygons: `[count, {exterior_count, hole_count, ring data}+]`.
    PolygonBuffer
);

flat_buffer!(
    /// Encoded points: `[count, x1, y1, x2, y2, ...]`.
    PointBuffer
);

/// Cursor over a flat layout with bounds-checked reads.
pub(crate) struct LayoutReader<'a> {
    data: &'a [f64],
    offset: usize,
}

impl<'a> LayoutReader<'a> {
    pub(crate) fn new(data: &'a [f64]) -> Self {
        Self { data, offset: 0 }
    }

    /// Reads a non-negative integral count.
    pub(crate) fn count(&mut self) -> Result<usize, DecodeError> {
        let value = *self.data.get(self.offset).ok_or(DecodeError::Truncated {
            offset: self.offset,
            needed: 1,
            available: 0,
        })?;

        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(DecodeError::InvalidCount {
                offset: self.offset,
                value,
            });
        }

        self.offset += 1;
        Ok(value as usize)
    }

    /// Claims `point_count` coordinate pairs and returns their index range.
    pub(crate) fn coordinates(&mut self, point_count: usize) -> Result<Range<usize>, DecodeError> {
        let needed = point_count.checked_mul(2).ok_or(DecodeError::InvalidCount {
            offset: self.offset,
            value: point_count as f64,
        })?;
        let available = self.data.len() - self.offset;
        if needed > available {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed,
                available,
            });
        }

        let range = self.offset..self.offset + needed;
        self.offset += needed;
        Ok(range)
    }

    /// Fails if unread values remain.
    pub(crate) fn finish(&self) -> Result<(), DecodeError> {
        let remaining = self.data.len() - self.offset;
        if remaining > 0 {
            return Err(DecodeError::TrailingData {
                offset: self.offset,
                remaining,
            });
        }
        Ok(())
    }
}

/// Collects the coordinate pairs stored in `range`.
pub(crate) fn positions(data: &[f64], range: Range<usize>) -> Vec<(f64, f64)> {
    data[range].chunks_exact(2).map(|xy| (xy[0], xy[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count_and_payload() {
        let buffer = RoadBuffer::from_vec(vec![1.0, 4.0, 1.0, 0.5, 0.5]);
        assert_eq!(buffer.feature_count(), 1);
        assert_eq!(buffer.payload(), &[4.0, 1.0, 0.5, 0.5]);

        let empty = RoadBuffer::default();
        assert_eq!(empty.feature_count(), 0);
        assert!(empty.payload().is_empty());
    }

    #[test]
    fn test_to_le_bytes() {
        let buffer = PointBuffer::from_vec(vec![1.0, 2.5, -3.0]);
        let bytes = buffer.to_le_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[8..16], &2.5f64.to_le_bytes());
    }

    #[test]
    fn test_reader_rejects_bad_counts() {
        for bad in [-1.0, 1.5, f64::NAN, f64::INFINITY] {
            let data = [bad];
            let mut reader = LayoutReader::new(&data);
            assert!(matches!(
                reader.count(),
                Err(DecodeError::InvalidCount { offset: 0, .. })
            ));
        }
    }

    #[test]
    fn test_reader_detects_truncation() {
        let data = [2.0, 1.0, 2.0];
        let mut reader = LayoutReader::new(&data);
        reader.count().unwrap();
        let err = reader.coordinates(2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_reader_detects_trailing_data() {
        let data = [0.0, 9.0];
        let mut reader = LayoutReader::new(&data);
        reader.count().unwrap();
        assert_eq!(
            reader.finish(),
            Err(DecodeError::TrailingData {
                offset: 1,
                remaining: 1
            })
        );
    }
}
