//! Flash byte-cell store for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the
//! last 64KB of flash. The RP2040 has no EEPROM, so the one-byte cells
//! of the bus protocol (device address, init marker) live in a flash
//! map instead of raw bytes; the map distinguishes a never-written cell
//! from a stored zero, which the init-marker logic relies on.
//!
//! Implements the `ByteStore` trait from `pharos-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from pharos-hal
pub use pharos_hal::store::{StorageCell, StoreError};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico-class boards
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024; // 64KB for persisted cells
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// RP2040 flash-backed byte-cell store
///
/// Provides wear-leveled storage for the protocol's persisted cells.
pub struct FlashByteStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashByteStore<'d> {
    /// Create a new flash store instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Get the raw flash peripheral for low-level access
    pub fn flash(&mut self) -> &mut Flash<'d, FLASH, Async, FLASH_SIZE> {
        &mut self.flash
    }
}

// Implement the shared ByteStore trait
impl<'d> pharos_hal::ByteStore for FlashByteStore<'d> {
    async fn read_byte(&mut self, cell: StorageCell) -> Result<u8, StoreError> {
        let mut data_buffer = [0u8; 32];

        let result = map::fetch_item::<StorageCell, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &cell,
        )
        .await;

        match result {
            Ok(Some(data)) if !data.is_empty() => Ok(data[0]),
            Ok(Some(_)) => Err(StoreError::Corrupted),
            Ok(None) => Err(StoreError::NotFound),
            Err(_) => Err(StoreError::Storage),
        }
    }

    async fn write_byte(&mut self, cell: StorageCell, value: u8) -> Result<(), StoreError> {
        let mut data_buffer = [0u8; 32];
        let data: &[u8] = &[value];

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &cell,
            &data,
        )
        .await
        .map_err(|_| StoreError::Storage)
    }
}
