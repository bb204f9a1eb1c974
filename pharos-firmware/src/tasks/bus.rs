//! Bus receive and transmit tasks
//!
//! The receive task feeds every wire byte into the shared transport
//! inside a critical section, standing in for the receive-complete
//! interrupt. The transmit task drains the transmit ring in enqueue
//! order, asserting the RS-485 driver only for the duration of the
//! frame - the bus is a shared medium and idles in the listening state.

use core::cell::RefCell;

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::uart::{Async, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;

use pharos_core::BusSerial;
use pharos_protocol::CommandLink;

use crate::channels::{COMMAND_READY, TX_KICK};

/// Command buffer capacity
pub const CMD_CAPACITY: usize = 64;
/// Response buffer capacity
pub const RESP_CAPACITY: usize = 80;
/// Fallback receive ring capacity
pub const RX_CAPACITY: usize = 64;
/// Transmit ring capacity; must hold a full response
pub const TX_CAPACITY: usize = 96;

/// The command link configured for this panel
pub type PanelLink = CommandLink<CMD_CAPACITY, RESP_CAPACITY>;
/// The bus transport with the link installed as receive handler
pub type PanelBus = BusSerial<PanelLink, RX_CAPACITY, TX_CAPACITY>;

/// The one shared bus transport
///
/// Shared between the receive path and the main-context lifecycle
/// calls; every access goes through this critical-section mutex.
pub static BUS: Mutex<CriticalSectionRawMutex, RefCell<PanelBus>> =
    Mutex::new(RefCell::new(PanelBus::new()));

/// Run `f` on the command link inside a critical section
pub fn with_link<R>(f: impl FnOnce(&mut PanelLink) -> R) -> Option<R> {
    BUS.lock(|bus| bus.borrow_mut().receive_handler().map(f))
}

/// Bus RX task - feeds received bytes through the protocol state machine
#[embassy_executor::task]
pub async fn bus_rx_task(mut rx: UartRx<'static, Async>) {
    info!("Bus RX task started");

    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => {
                let ready = BUS.lock(|bus| {
                    let mut bus = bus.borrow_mut();
                    bus.handle_rx(byte[0]);
                    bus.receive_handler()
                        .is_some_and(|link| link.is_command_ready())
                });
                if ready {
                    COMMAND_READY.signal(());
                }
            }
            Err(e) => {
                warn!("Bus read error: {:?}", e);
            }
        }
    }
}

/// Bus TX task - drives the line only while transmit data is queued
#[embassy_executor::task]
pub async fn bus_tx_task(mut tx: UartTx<'static, Async>, mut driver_enable: Output<'static>) {
    info!("Bus TX task started");

    loop {
        TX_KICK.wait().await;

        driver_enable.set_high();
        // Transceiver turnaround before the first start bit
        Timer::after_micros(10).await;

        while let Some(byte) = BUS.lock(|bus| bus.borrow_mut().next_tx_byte()) {
            if let Err(e) = tx.write(&[byte]).await {
                warn!("Bus write error: {:?}", e);
                break;
            }
        }

        // Hold the driver until the last stop bit has left the wire
        let _ = tx.blocking_flush();
        driver_enable.set_low();
    }
}
