//! Configuration type definitions
//!
//! Plain structs with compile-time defaults. The one runtime-mutable
//! setting - the device's bus address - lives in the address store, not
//! here.

use pharos_protocol::FramingConfig;

/// Shared-bus configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusConfig {
    /// Line rate in bits per second
    pub baudrate: u32,
    /// Cadence of the protocol tick task in milliseconds
    pub tick_interval_ms: u32,
    /// Abandon an addressed-but-unterminated command after this long
    /// with no traffic; 0 disables the timeout
    pub idle_timeout_ms: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            baudrate: 19_200,
            tick_interval_ms: 10,
            idle_timeout_ms: 250,
        }
    }
}

impl BusConfig {
    /// Derive the framing parameters for the command link
    pub fn framing(&self) -> FramingConfig {
        let idle_timeout_ticks = if self.idle_timeout_ms == 0 {
            None
        } else {
            // At least one tick, even for a timeout below the cadence
            Some((self.idle_timeout_ms / self.tick_interval_ms.max(1)).max(1))
        };
        FramingConfig {
            idle_timeout_ticks,
            ..FramingConfig::default()
        }
    }
}

/// Panel render configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelConfig {
    /// Frame interval in milliseconds
    pub frame_interval_ms: u32,
    /// Brightness cap applied by the patterns (0-255)
    pub max_brightness: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 10,
            max_brightness: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_derives_tick_budget() {
        let cfg = BusConfig::default();
        let framing = cfg.framing();
        assert_eq!(framing.idle_timeout_ticks, Some(25));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let cfg = BusConfig {
            idle_timeout_ms: 0,
            ..BusConfig::default()
        };
        assert_eq!(cfg.framing().idle_timeout_ticks, None);
    }

    #[test]
    fn test_sub_tick_timeout_rounds_up_to_one() {
        let cfg = BusConfig {
            idle_timeout_ms: 3,
            tick_interval_ms: 10,
            ..BusConfig::default()
        };
        assert_eq!(cfg.framing().idle_timeout_ticks, Some(1));
    }
}
