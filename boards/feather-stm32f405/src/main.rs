#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;

mod eth;
mod lcd;
mod net;
mod rtc;

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2])]
mod app {
    use clock_core::{ClockConfig, ClockSyncController, DisplayRefreshLoop};
    use defmt::{error, info};
    use embassy_futures::join::join3;
    use embassy_net::{Config, StackResources};
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::i2c::{self, I2c};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode, LsConfig, LseConfig, LseMode};
    use embassy_stm32::rtc::{Rtc, RtcConfig};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use embassy_time::Delay;
    use static_cell::StaticCell;

    use crate::eth::{self, EthPeripherals};
    use crate::lcd::{self, Hd44780};
    use crate::net::{EmbassyUdp, EthLink};
    use crate::rtc::StmRtc;

    type Peri<T> = embassy_stm32::Peri<'static, T>;

    /// How long one connect may wait for link and DHCP
    const LINK_TIMEOUT_MS: u64 = 20_000;

    struct NetworkPeripherals {
        spi: Peri<peripherals::SPI2>,
        sck: Peri<peripherals::PB13>,
        mosi: Peri<peripherals::PB15>,
        miso: Peri<peripherals::PB14>,
        cs: Peri<peripherals::PC6>,
        reset: Peri<peripherals::PC3>,
        int: Peri<peripherals::PC2>,
        exti: Peri<peripherals::EXTI2>,
        dma_tx: Peri<peripherals::DMA1_CH4>,
        dma_rx: Peri<peripherals::DMA1_CH3>,
    }

    struct DisplayPeripherals {
        i2c: Peri<peripherals::I2C1>,
        scl: Peri<peripherals::PB6>,
        sda: Peri<peripherals::PB7>,
    }

    #[shared]
    struct Shared {}

    #[local]
    struct Local {}

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("NTP clock starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE, 32.768 kHz LSE (PC14/PC15)
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // HSE (12 MHz) / PREDIV(6) = 2 MHz (PLL input)
        // 2 MHz * MUL(168) = 336 MHz (VCO)
        // VCO / DIVP(4) = 84 MHz (SYSCLK)
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        // RTC keeps counting from the LSE between syncs
        config.rcc.ls = LsConfig {
            rtc: embassy_stm32::rcc::RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz(32_768),
                mode: LseMode::Oscillator(embassy_stm32::rcc::LseDrive::MediumHigh),
            }),
        };

        let p = embassy_stm32::init(config);
        info!("System initialized with HSE (12MHz) and LSE (32.768kHz)");

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC6,
            reset: p.PC3,
            int: p.PC2,
            exti: p.EXTI2,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };
        let display_periph = DisplayPeripherals {
            i2c: p.I2C1,
            scl: p.PB6,
            sda: p.PB7,
        };

        clock_task::spawn(net_periph, display_periph, p.RTC).ok();

        (Shared {}, Local {})
    }

    /// Clock task: network stack runners and the display refresh loop
    ///
    /// Everything that touches the RTC, the LCD or the stack lives in this
    /// one task, so the sync cycle and the display never interleave.
    #[task(priority = 1)]
    async fn clock_task(
        _cx: clock_task::Context,
        net_periph: NetworkPeripherals,
        display_periph: DisplayPeripherals,
        rtc_periph: Peri<peripherals::RTC>,
    ) -> ! {
        let config = ClockConfig {
            ssid: option_env!("CLOCK_SSID").unwrap_or(""),
            passphrase: option_env!("CLOCK_PASSPHRASE").unwrap_or(""),
            ..ClockConfig::default()
        };

        let rtc = StmRtc::new(Rtc::new(rtc_periph, RtcConfig::default()));
        info!("Internal RTC initialized with LSE (32.768kHz)");

        let mut i2c_config = i2c::Config::default();
        i2c_config.frequency = Hertz(100_000);
        let i2c = I2c::new_blocking(
            display_periph.i2c,
            display_periph.scl,
            display_periph.sda,
            i2c_config,
        );
        let display = match Hd44780::new(i2c, Delay, lcd::DEFAULT_ADDRESS) {
            Ok(display) => display,
            Err(e) => {
                error!("LCD init failed: {}", e);
                core::future::pending().await
            }
        };

        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(10_000_000); // 10 MHz for W5500
        let spi = Spi::new(
            net_periph.spi,
            net_periph.sck,
            net_periph.mosi,
            net_periph.miso,
            net_periph.dma_tx,
            net_periph.dma_rx,
            spi_config,
        );
        let eth_periph = EthPeripherals {
            spi,
            cs: Output::new(net_periph.cs, Level::High, Speed::VeryHigh),
            reset: Output::new(net_periph.reset, Level::High, Speed::Low),
            int: ExtiInput::new(net_periph.int, net_periph.exti, Pull::Up),
        };
        let (device, w5500_runner) = eth::init_w5500(eth_periph, eth::MAC_ADDR).await;

        static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            0x4e54_5043_4c4b_u64,
        );
        info!("Network stack initialized with DHCP");

        let sync = ClockSyncController::new(
            EthLink::new(stack, LINK_TIMEOUT_MS),
            EmbassyUdp::new(stack),
            &config,
        );
        let mut clock = DisplayRefreshLoop::new(rtc, display, Delay, sync, &config);

        let (never, _, _) = join3(clock.run(), w5500_runner.run(), net_runner.run()).await;
        never
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }
}
