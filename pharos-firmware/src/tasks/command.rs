//! Command processor task
//!
//! Drains framed commands from the link, runs the application handlers,
//! and hands completed responses to the transmit path. Everything here
//! runs in the main context; only the short lifecycle calls touch the
//! shared link.

use core::fmt::Write as _;

use defmt::*;
use heapless::String;
use smart_leds::RGB8;

use pharos_core::address::{AddressError, AddressStore};
use pharos_hal_rp2040::flash::FlashByteStore;
use pharos_protocol::{parse_command, CommandError, PanelCommand};

use crate::channels::{RenderCommand, COMMAND_READY, RENDER_CHANNEL, TX_KICK};
use crate::tasks::bus::{with_link, BUS, CMD_CAPACITY};

/// Firmware identification reported by the `v` query
const IDENT: &str = concat!("pharos ", env!("CARGO_PKG_VERSION"));

/// Command task - application handlers for framed bus commands
#[embassy_executor::task]
pub async fn command_task(mut address_store: AddressStore<FlashByteStore<'static>>) {
    info!("Command task started");

    loop {
        COMMAND_READY.wait().await;

        // The signal may coalesce; drain every ready command
        loop {
            let mut payload = [0u8; CMD_CAPACITY];
            let Some(len) = with_link(|link| {
                if link.begin_command() {
                    Some(link.read_command(&mut payload))
                } else {
                    None
                }
            })
            .flatten() else {
                break;
            };

            handle_command(&payload[..len], &mut address_store).await;

            let response = with_link(|link| link.end_command()).flatten();
            if let Some(bytes) = response {
                let queued = BUS.lock(|bus| bus.borrow_mut().start_send(&bytes));
                match queued {
                    Ok(()) => TX_KICK.signal(()),
                    Err(e) => warn!("Response dropped: {:?}", e),
                }
            }
        }
    }
}

/// Run one command's handler between begin and end of processing
async fn handle_command(
    payload: &[u8],
    address_store: &mut AddressStore<FlashByteStore<'static>>,
) {
    match parse_command(payload) {
        Ok(PanelCommand::SetPattern(index)) => {
            forward(RenderCommand::Pattern(index));
        }
        Ok(PanelCommand::SetColor { r, g, b }) => {
            forward(RenderCommand::Color(RGB8 { r, g, b }));
        }
        Ok(PanelCommand::SetBrightness(level)) => {
            forward(RenderCommand::Brightness(level));
        }
        Ok(PanelCommand::SetAddress(addr)) => match address_store.set_address(addr).await {
            Ok(()) => {
                info!("Bus address changed to {}", addr);
                with_link(|link| link.set_address(addr));
            }
            Err(AddressError::InvalidAddress) => respond(b"e:addr0"),
            Err(AddressError::Store(_)) => respond(b"e:store"),
        },
        Ok(PanelCommand::Ident) => {
            let mut text: String<64> = String::new();
            let _ = write!(text, "{} @{}", IDENT, address_store.address());
            with_link(|link| {
                // Every panel answers an ident, even a broadcast one
                link.force_response_on_global();
                let _ = link.respond(text.as_bytes());
            });
        }
        Ok(PanelCommand::Status) => {
            let stats = with_link(|link| {
                let stats = (
                    link.overflow_count(),
                    link.timeout_count(),
                    link.overloaded(),
                );
                link.clear_overloaded();
                stats
            });
            let (overflow, timeouts, overloaded) = stats.unwrap_or((0, 0, false));
            let mut text: String<64> = String::new();
            let _ = write!(text, "ov={} to={} ld={}", overflow, timeouts, overloaded as u8);
            respond(text.as_bytes());
        }
        // A bare poke gets the default acknowledgment
        Err(CommandError::Empty) => {}
        Err(_) => respond(b"e:cmd"),
    }
}

fn forward(cmd: RenderCommand) {
    if RENDER_CHANNEL.try_send(cmd).is_err() {
        warn!("Render channel full, dropping command");
    }
}

fn respond(bytes: &[u8]) {
    with_link(|link| {
        let _ = link.respond(bytes);
    });
}
