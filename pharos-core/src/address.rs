//! Persistent device address store
//!
//! Each node carries its one-byte bus address in non-volatile storage,
//! guarded by an initialization marker so blank storage is
//! distinguishable from a deliberately stored value. Address 0 is the
//! reserved broadcast address and can never be assigned to a device.

use pharos_hal::store::{ByteStore, StorageCell, StoreError};
use pharos_protocol::BROADCAST_ADDRESS;

/// Compile-time default address, adopted on first boot
pub const DEFAULT_ADDRESS: u8 = 0x31; // ASCII '1'

/// Marker value proving the address cell was deliberately written
///
/// Distinct from every valid address default and from the erased-memory
/// patterns (0x00 / 0xFF).
pub const ADDRESS_INIT_SENTINEL: u8 = 0xA5;

/// Errors from address-store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Attempted to assign the reserved broadcast address
    InvalidAddress,
    /// Underlying storage failed
    Store(StoreError),
}

impl From<StoreError> for AddressError {
    fn from(err: StoreError) -> Self {
        AddressError::Store(err)
    }
}

/// Persistent single-byte device address with an in-memory copy
pub struct AddressStore<S: ByteStore> {
    store: S,
    address: u8,
}

impl<S: ByteStore> AddressStore<S> {
    /// Wrap a byte store; the in-memory address holds the compile-time
    /// default until [`load`](Self::load) runs.
    pub fn new(store: S) -> Self {
        Self {
            store,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Load the persisted address, initializing storage on first boot
    ///
    /// When the marker cell does not hold the sentinel, or the stored
    /// address reads as the reserved broadcast value, the compile-time
    /// default is persisted and the marker written. Reads guard the
    /// writes, so calling this again changes nothing.
    pub async fn load(&mut self) -> Result<u8, AddressError> {
        let marker = self.store.read_byte(StorageCell::AddressInitMarker).await;
        let stored = self.store.read_byte(StorageCell::DeviceAddress).await;
        let initialized = matches!(marker, Ok(ADDRESS_INIT_SENTINEL));

        match stored {
            Ok(addr) if initialized && addr != BROADCAST_ADDRESS => {
                self.address = addr;
            }
            _ => {
                self.address = DEFAULT_ADDRESS;
                self.store
                    .write_byte(StorageCell::DeviceAddress, DEFAULT_ADDRESS)
                    .await?;
                if !initialized {
                    self.store
                        .write_byte(StorageCell::AddressInitMarker, ADDRESS_INIT_SENTINEL)
                        .await?;
                }
            }
        }
        Ok(self.address)
    }

    /// The current in-memory address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Persist a new address and update the in-memory copy
    ///
    /// The reserved broadcast address is rejected with a distinguished
    /// failure and the store is left unchanged.
    pub async fn set_address(&mut self, new_addr: u8) -> Result<(), AddressError> {
        if new_addr == BROADCAST_ADDRESS {
            return Err(AddressError::InvalidAddress);
        }
        self.store
            .write_byte(StorageCell::DeviceAddress, new_addr)
            .await?;
        self.address = new_addr;
        Ok(())
    }
}
