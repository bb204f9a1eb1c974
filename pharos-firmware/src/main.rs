//! Pharos - Addressable LED Panel Firmware
//!
//! Main firmware binary for RP2040-based panel controllers. Each panel
//! node renders WS2812 animations locally and listens on a shared
//! RS-485 bus for commands addressed to it.
//!
//! Named after the Pharos of Alexandria - a signal light seen across
//! the whole harbor.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::uart::{Config as UartConfig, InterruptHandler as UartInterruptHandler, Uart};
use {defmt_rtt as _, panic_probe as _};

use pharos_core::address::AddressStore;
use pharos_core::{BusConfig, PanelConfig};
use pharos_hal_rp2040::flash::FlashByteStore;
use pharos_hal_rp2040::Ws2812Pio;
use pharos_protocol::CommandLink;

mod channels;
mod tasks;

use crate::tasks::bus::{PanelLink, BUS};

bind_interrupts!(struct Irqs {
    UART0_IRQ => UartInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pharos firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let bus_config = BusConfig::default();
    let panel_config = PanelConfig::default();

    // Load the persisted bus address; first boot writes the default
    let mut address_store = AddressStore::new(FlashByteStore::new(p.FLASH, p.DMA_CH2));
    let address = match address_store.load().await {
        Ok(addr) => addr,
        Err(_) => {
            warn!("Address store unavailable, using compile-time default");
            address_store.address()
        }
    };
    info!("Bus address: {}", address);

    // Wire the command link into the shared transport as its receive
    // handler; from here on every wire byte flows through the state
    // machine.
    let link: PanelLink = CommandLink::new(address, bus_config.framing());
    BUS.lock(|bus| bus.borrow_mut().set_receive_handler(link));

    // Bus UART and RS-485 driver-enable pin
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = bus_config.baudrate;
    let uart = Uart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (bus_tx, bus_rx) = uart.split();

    // Listening by default: only the transmitting device may assert
    // the shared line.
    let driver_enable = Output::new(p.PIN_2, Level::Low);
    info!("Bus UART initialized at {} baud", bus_config.baudrate);

    // PIO state machine for the self-clocked LED output
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let strip = Ws2812Pio::new(&mut common, sm0, p.PIN_3);
    info!("WS2812 output initialized");

    // Spawn tasks
    spawner.spawn(tasks::bus_rx_task(bus_rx)).unwrap();
    spawner
        .spawn(tasks::bus_tx_task(bus_tx, driver_enable))
        .unwrap();
    spawner.spawn(tasks::command_task(address_store)).unwrap();
    spawner
        .spawn(tasks::render_task(strip, panel_config))
        .unwrap();
    spawner
        .spawn(tasks::tick_task(bus_config.tick_interval_ms))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
