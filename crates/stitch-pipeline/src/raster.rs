//! The assembled raster buffer.

use parking_lot::Mutex;

use crate::StripGeometry;

/// Placement errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaceError {
    /// Sequence outside the raster.
    #[error("sequence {sequence} outside raster of {total} strips")]
    OutOfRange {
        /// Offending sequence number.
        sequence: u32,
        /// Strips the raster holds.
        total: u32,
    },

    /// Strip does not fill its slot exactly.
    #[error("strip of {len} bytes does not fill slot of {expected}")]
    WrongLength {
        /// Bytes offered.
        len: usize,
        /// Bytes the slot requires.
        expected: usize,
    },
}

/// Flat byte buffer holding the concatenated inflated strips.
///
/// Strip `k` owns the disjoint range `[k * strip_bytes, (k+1) *
/// strip_bytes)`; the mutex is held only for the copy.
pub struct RasterBuffer {
    geometry: StripGeometry,
    bytes: Mutex<Vec<u8>>,
}

impl RasterBuffer {
    /// Allocate a zeroed raster for the given geometry.
    #[must_use]
    pub fn new(geometry: StripGeometry) -> Self {
        Self {
            geometry,
            bytes: Mutex::new(vec![0u8; geometry.raster_bytes()]),
        }
    }

    /// Copy an inflated strip into its slot.
    ///
    /// # Errors
    ///
    /// [`PlaceError::OutOfRange`] or [`PlaceError::WrongLength`] when the
    /// strip does not fit; the raster is untouched in either case.
    pub fn place(&self, sequence: u32, strip: &[u8]) -> Result<(), PlaceError> {
        if sequence >= self.geometry.total {
            return Err(PlaceError::OutOfRange {
                sequence,
                total: self.geometry.total,
            });
        }
        let slot = self.geometry.strip_bytes();
        if strip.len() != slot {
            return Err(PlaceError::WrongLength {
                len: strip.len(),
                expected: slot,
            });
        }

        let offset = sequence as usize * slot;
        self.bytes.lock()[offset..offset + slot].copy_from_slice(strip);
        Ok(())
    }

    /// Take the raster bytes out, leaving an empty buffer behind.
    #[must_use]
    pub fn take_bytes(&self) -> Vec<u8> {
        std::mem::take(&mut *self.bytes.lock())
    }

    /// Geometry the raster was allocated for.
    #[must_use]
    pub const fn geometry(&self) -> StripGeometry {
        self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> StripGeometry {
        StripGeometry {
            width: 2,
            height: 2,
            total: 3,
        }
    }

    #[test]
    fn strips_land_at_their_offsets() {
        let geometry = tiny();
        let raster = RasterBuffer::new(geometry);
        let slot = geometry.strip_bytes();

        raster.place(1, &vec![0xBB; slot]).unwrap();
        raster.place(0, &vec![0xAA; slot]).unwrap();
        raster.place(2, &vec![0xCC; slot]).unwrap();

        let bytes = raster.take_bytes();
        assert_eq!(bytes.len(), geometry.raster_bytes());
        assert!(bytes[..slot].iter().all(|&b| b == 0xAA));
        assert!(bytes[slot..2 * slot].iter().all(|&b| b == 0xBB));
        assert!(bytes[2 * slot..].iter().all(|&b| b == 0xCC));
    }

    #[test]
    fn out_of_range_sequence_is_rejected() {
        let raster = RasterBuffer::new(tiny());
        let err = raster.place(3, &vec![0; tiny().strip_bytes()]).unwrap_err();
        assert_eq!(
            err,
            PlaceError::OutOfRange {
                sequence: 3,
                total: 3
            }
        );
    }

    #[test]
    fn short_strip_is_rejected() {
        let raster = RasterBuffer::new(tiny());
        assert!(matches!(
            raster.place(0, &[0; 4]).unwrap_err(),
            PlaceError::WrongLength { len: 4, .. }
        ));
    }
}
