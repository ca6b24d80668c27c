//! RAM and ROM storage behind the board bus.

use crate::BoardError;

/// Read/write memory. Addressed by offset into its window.
#[derive(Debug, Clone)]
pub struct Ram {
    bytes: Vec<u8>,
}

impl Ram {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn read(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    pub fn write(&mut self, offset: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(offset) {
            *byte = value;
        }
    }

    /// Copy `data` in at `offset`.
    pub fn load(&mut self, offset: usize, data: &[u8]) -> Result<(), BoardError> {
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= self.bytes.len())
            .ok_or(BoardError::ImageTooLarge {
                what: "RAM",
                len: offset.saturating_add(data.len()),
                capacity: self.bytes.len(),
            })?;
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }
}

/// Read-only memory. Contents change only through [`Rom::load`].
#[derive(Debug, Clone)]
pub struct Rom {
    bytes: Vec<u8>,
}

impl Rom {
    /// An erased ROM (all `0xFF`).
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0xFF; size],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn read(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// Program the ROM from offset 0. Bytes past the image stay erased.
    pub fn load(&mut self, image: &[u8]) -> Result<(), BoardError> {
        if image.len() > self.bytes.len() {
            return Err(BoardError::ImageTooLarge {
                what: "ROM",
                len: image.len(),
                capacity: self.bytes.len(),
            });
        }
        self.bytes.fill(0xFF);
        self.bytes[..image.len()].copy_from_slice(image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_reads_back_writes() {
        let mut ram = Ram::new(16);
        ram.write(3, 0xAB);
        assert_eq!(ram.read(3), 0xAB);
        assert_eq!(ram.read(99), 0);
    }

    #[test]
    fn ram_load_rejects_overflow() {
        let mut ram = Ram::new(4);
        assert!(ram.load(2, &[1, 2]).is_ok());
        assert!(matches!(
            ram.load(3, &[1, 2]),
            Err(BoardError::ImageTooLarge { capacity: 4, .. })
        ));
    }

    #[test]
    fn rom_load_erases_tail() {
        let mut rom = Rom::new(4);
        rom.load(&[1, 2, 3, 4]).unwrap();
        rom.load(&[9]).unwrap();
        assert_eq!(
            (rom.read(0), rom.read(1), rom.read(3)),
            (9, 0xFF, 0xFF)
        );
        assert!(rom.load(&[0; 5]).is_err());
    }
}
