//! Persistent byte-cell storage abstractions
//!
//! Provides a trait for the two single-byte non-volatile cells the bus
//! protocol needs: the device address and the initialization marker that
//! distinguishes a deliberately-stored address from blank storage.

/// Storage cells for persisted protocol state
///
/// Each cell holds exactly one byte. The backing implementation decides
/// how cells map onto the physical medium (EEPROM bytes, a wear-leveled
/// flash map, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageCell {
    /// This device's bus address
    DeviceAddress = 0,
    /// Sentinel marking that the address cell was deliberately written
    AddressInitMarker = 1,
}

impl StorageCell {
    /// Get the cell as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a cell from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageCell::DeviceAddress),
            1 => Some(StorageCell::AddressInitMarker),
            _ => None,
        }
    }
}

/// Errors from byte-cell storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Cell has never been written
    NotFound,
    /// Underlying storage operation failed
    Storage,
    /// Stored data failed integrity checks
    Corrupted,
}

/// Byte-cell storage trait
///
/// Implementations should make `write_byte` durable before resolving;
/// a cell read after a completed write must return the written value
/// across power cycles.
pub trait ByteStore {
    /// Read the byte stored in a cell
    ///
    /// Returns [`StoreError::NotFound`] for a cell that was never
    /// written, so callers can tell blank storage from a stored zero.
    fn read_byte(
        &mut self,
        cell: StorageCell,
    ) -> impl core::future::Future<Output = Result<u8, StoreError>>;

    /// Write one byte to a cell
    fn write_byte(
        &mut self,
        cell: StorageCell,
        value: u8,
    ) -> impl core::future::Future<Output = Result<(), StoreError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageCell {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageCell::from_u8(buffer[0]) {
            Some(cell) => Ok((cell, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
