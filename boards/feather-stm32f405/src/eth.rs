//! W5500 Ethernet bring-up on SPI2

use defmt::{error, info};
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice as SpiDeviceBus;
use embassy_net_wiznet::chip::W5500;
use embassy_net_wiznet::{Device, Runner};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Async;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;

/// Locally administered MAC of the clock's W5500
pub const MAC_ADDR: [u8; 6] = [0x02, 0x00, 0x00, 0x4e, 0x54, 0x50];

type SpiBus = Mutex<CriticalSectionRawMutex, Spi<'static, Async>>;

/// Driver half that must be polled for the W5500 to move frames
pub type W5500Runner = Runner<
    'static,
    W5500,
    SpiDeviceBus<'static, CriticalSectionRawMutex, Spi<'static, Async>, Output<'static>>,
    ExtiInput<'static>,
    Output<'static>,
>;

/// Ethernet peripherals bundle
pub struct EthPeripherals<'a> {
    pub spi: Spi<'a, Async>,
    pub cs: Output<'a>,
    pub reset: Output<'a>,
    pub int: ExtiInput<'a>,
}

/// Reset and initialize the W5500
///
/// Returns device and runner. Runner must be continuously polled for device
/// operation. A chip that never answers is logged and the caller parks.
pub async fn init_w5500(
    periph: EthPeripherals<'static>,
    mac_addr: [u8; 6],
) -> (Device<'static>, W5500Runner) {
    let EthPeripherals {
        spi,
        cs,
        mut reset,
        int,
    } = periph;

    info!("Performing W5500 hardware reset...");
    reset.set_low();
    Timer::after_millis(1).await;
    reset.set_high();
    Timer::after_millis(2).await;

    static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
    let spi_bus = SPI_BUS.init(Mutex::new(spi));
    let spi_device = SpiDeviceBus::new(spi_bus, cs);

    info!(
        "MAC address: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac_addr[0], mac_addr[1], mac_addr[2], mac_addr[3], mac_addr[4], mac_addr[5]
    );

    static STATE: StaticCell<embassy_net_wiznet::State<8, 8>> = StaticCell::new();
    let state = STATE.init(embassy_net_wiznet::State::<8, 8>::new());

    match embassy_net_wiznet::new(mac_addr, state, spi_device, int, reset).await {
        Ok(parts) => {
            info!("W5500 initialized");
            parts
        }
        Err(e) => {
            error!("W5500 did not respond: {}", defmt::Debug2Format(&e));
            core::future::pending().await
        }
    }
}
