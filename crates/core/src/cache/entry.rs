//! Cached matrix entries

use super::error::{CacheError, CacheResult};

/// Byte width of one cached element (`f64`).
pub const ELEMENT_SIZE: usize = std::mem::size_of::<f64>();

/// Validate a `rows x cols` shape against `len` elements.
///
/// Returns the buffer length in bytes.
pub(crate) fn checked_byte_len(rows: usize, cols: usize, len: usize) -> CacheResult<usize> {
    let invalid = || CacheError::InvalidShape { rows, cols, len };
    let elements = rows.checked_mul(cols).ok_or_else(invalid)?;
    if elements != len {
        return Err(invalid());
    }
    elements.checked_mul(ELEMENT_SIZE).ok_or_else(invalid)
}

/// One cached matrix: shape, eviction rank and an owned copy of the data.
///
/// Entries are immutable once built. The buffer always holds exactly
/// `rows * cols` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    identifier: i64,
    priority: i64,
    rows: usize,
    cols: usize,
    buffer: Box<[f64]>,
}

impl CacheEntry {
    /// Copy `data` into a freshly allocated buffer.
    ///
    /// # Errors
    /// - [`CacheError::InvalidShape`] if `data.len() != rows * cols`
    /// - [`CacheError::AllocationFailed`] if the buffer cannot be reserved
    pub fn copy_from(
        identifier: i64,
        priority: i64,
        rows: usize,
        cols: usize,
        data: &[f64],
    ) -> CacheResult<Self> {
        let bytes = checked_byte_len(rows, cols, data.len())?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(data.len()).map_err(|_| CacheError::AllocationFailed { bytes })?;
        buffer.extend_from_slice(data);

        Ok(Self { identifier, priority, rows, cols, buffer: buffer.into_boxed_slice() })
    }

    pub fn identifier(&self) -> i64 {
        self.identifier
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements in the buffer.
    pub fn element_count(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer size in bytes.
    pub fn byte_len(&self) -> usize {
        self.buffer.len() * ELEMENT_SIZE
    }

    pub fn data(&self) -> &[f64] {
        &self.buffer
    }

    /// Copy the buffer into the front of `destination`.
    ///
    /// # Errors
    /// [`CacheError::BufferTooSmall`] if `destination` is shorter than the
    /// entry. Nothing is written in that case.
    pub fn copy_into(&self, destination: &mut [f64]) -> CacheResult<()> {
        let required = self.buffer.len();
        let actual = destination.len();
        let target = destination
            .get_mut(..required)
            .ok_or(CacheError::BufferTooSmall { required, actual })?;
        target.copy_from_slice(&self.buffer);
        Ok(())
    }
}
