//! Memory windows
//!
//! A [`MemoryWindow`] owns the byte buffer for the half-open address range
//! `[start, end)`. The decoder writes into it, the encoder reads from it.

use crate::error::WindowError;

/// An owned buffer covering the addresses `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWindow {
    start: u32,
    end: u32,
    data: Vec<u8>,
}

impl MemoryWindow {
    /// Create a window filled with `fill`
    ///
    /// Use `0xFF` to model erased flash.
    pub fn new(start: u32, end: u32, fill: u8) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::InvertedRange { start, end });
        }
        Ok(Self {
            start,
            end,
            data: vec![fill; (end - start) as usize],
        })
    }

    /// Wrap an existing buffer whose first byte lives at `start`
    pub fn from_vec(start: u32, data: Vec<u8>) -> Result<Self, WindowError> {
        let end = u32::try_from(data.len())
            .ok()
            .and_then(|len| start.checked_add(len))
            .ok_or(WindowError::TooLarge {
                start,
                len: data.len(),
            })?;
        Ok(Self { start, end, data })
    }

    /// First address covered
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last address covered
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of bytes in the window
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the window covers no addresses
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check that `[address, address + len)` lies inside the window
    pub fn contains_range(&self, address: u32, len: u32) -> bool {
        address >= self.start && address as u64 + len as u64 <= self.end as u64
    }

    /// Window contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable window contents
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give up the window and keep the buffer
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window() {
        let window = MemoryWindow::new(0x8000, 0x8010, 0xFF).unwrap();
        assert_eq!(window.start(), 0x8000);
        assert_eq!(window.end(), 0x8010);
        assert_eq!(window.len(), 0x10);
        assert!(window.as_slice().iter().all(|&b| b == 0xFF));

        let empty = MemoryWindow::new(0x100, 0x100, 0).unwrap();
        assert!(empty.is_empty());

        assert_eq!(
            MemoryWindow::new(0x200, 0x100, 0),
            Err(WindowError::InvertedRange {
                start: 0x200,
                end: 0x100
            })
        );
    }

    #[test]
    fn test_from_vec() {
        let window = MemoryWindow::from_vec(0x1_FFF0, vec![0; 0x20]).unwrap();
        assert_eq!(window.end(), 0x2_0010);
        assert_eq!(window.into_vec().len(), 0x20);

        assert_eq!(
            MemoryWindow::from_vec(0xFFFF_FFF0, vec![0; 0x20]),
            Err(WindowError::TooLarge {
                start: 0xFFFF_FFF0,
                len: 0x20
            })
        );
    }

    #[test]
    fn test_contains_range() {
        let window = MemoryWindow::new(0x100, 0x200, 0).unwrap();
        assert!(window.contains_range(0x100, 0x100));
        assert!(window.contains_range(0x1F0, 0x10));
        assert!(!window.contains_range(0x1F0, 0x11));
        assert!(!window.contains_range(0xFF, 1));
        assert!(!window.contains_range(0xFFFF_FFFF, 2));
    }
}
