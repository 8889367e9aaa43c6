#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod clock;
mod device_id;
mod eth;
mod network;
mod relay;
mod sensor;

stm32_tim2_monotonic!(Mono, 1_000_000);

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2, USART3])]
mod app {
    use super::*;
    use defmt::{debug, info};
    use embassy_futures::join::join3;
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use relay_core::{Capability, RelayConfig};

    use network::{manager, NetworkConfig, UdpBuffers, UdpTransport};
    use sensor::SensorPeripherals;

    type SpiPeripheral = embassy_stm32::Peri<'static, peripherals::SPI2>;
    type PinPB13 = embassy_stm32::Peri<'static, peripherals::PB13>;
    type PinPB15 = embassy_stm32::Peri<'static, peripherals::PB15>;
    type PinPB14 = embassy_stm32::Peri<'static, peripherals::PB14>;
    type PinPC6 = embassy_stm32::Peri<'static, peripherals::PC6>;
    type PinPC3 = embassy_stm32::Peri<'static, peripherals::PC3>;
    type PinPC2 = embassy_stm32::Peri<'static, peripherals::PC2>;
    type ExtiChannel = embassy_stm32::Peri<'static, peripherals::EXTI2>;
    type DmaTx = embassy_stm32::Peri<'static, peripherals::DMA1_CH4>;
    type DmaRx = embassy_stm32::Peri<'static, peripherals::DMA1_CH3>;

    struct NetworkPeripherals {
        spi: SpiPeripheral,
        sck: PinPB13,
        mosi: PinPB15,
        miso: PinPB14,
        cs: PinPC6,
        reset: PinPC3,
        int: PinPC2,
        exti: ExtiChannel,
        dma_tx: DmaTx,
        dma_rx: DmaRx,
    }

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        led: Output<'static>,
    }

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("Climate relay starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE
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

        let p = embassy_stm32::init(config);
        info!("System initialized: SYSCLK=84MHz");

        // TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
        let timer_clock_hz = 84_000_000;
        Mono::start(timer_clock_hz);
        info!("TIM2 monotonic timer initialized at 1 MHz");

        let relay_config = network::config::relay_config();

        let led = Output::new(p.PC1, Level::High, Speed::Low);

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

        let sensor_periph = SensorPeripherals {
            i2c: p.I2C1,
            scl: p.PB6,
            sda: p.PB7,
            dma_tx: p.DMA1_CH6,
            dma_rx: p.DMA1_CH0,
        };

        #[cfg(not(feature = "poll-loop"))]
        tick_timer::spawn(relay_config.first_tick_delay_ms, relay_config.period_ms).ok();
        status::spawn().ok();
        relay_task::spawn(net_periph, sensor_periph, relay_config).ok();

        (Shared {}, Local { led })
    }

    /// Periodic tick source for the deferred worker
    ///
    /// Runs from the highest-priority dispatcher interrupt. Each expiry only
    /// posts to the handoff slot; sampling and sending happen in `relay_task`.
    #[cfg(not(feature = "poll-loop"))]
    #[task(priority = 3)]
    async fn tick_timer(_cx: tick_timer::Context, first_tick_delay_ms: u32, period_ms: u32) {
        use relay_core::{Post, TickSource};

        let source = TickSource::new(&relay::TICKS);
        type Duration = <Mono as rtic_monotonics::Monotonic>::Duration;
        let period: Duration = u64::from(period_ms).millis();
        let first: Duration = u64::from(first_tick_delay_ms).millis();
        let mut next = Mono::now() + first;
        loop {
            Mono::delay_until(next).await;
            if source.fire() == Post::Coalesced {
                debug!("Tick coalesced, worker still busy");
            }
            next += period;
        }
    }

    /// Status LED and last-reading report
    #[task(priority = 1, local = [led])]
    async fn status(cx: status::Context) {
        info!("Status task started");
        loop {
            cx.local.led.set_high();
            Mono::delay(100.millis()).await;
            cx.local.led.set_low();
            match relay::STATUS.load() {
                Some(reading) => debug!(
                    "Last reading: {} C, {} % at {} ms",
                    reading.temperature, reading.humidity, reading.timestamp
                ),
                None => debug!("No reading yet"),
            }
            Mono::delay(4900.millis()).await;
        }
    }

    /// Relay task - owns the sensor, network stack and pipeline
    ///
    /// Stack is !Send and must remain within this task.
    #[task(priority = 1)]
    async fn relay_task(
        _cx: relay_task::Context,
        periph: NetworkPeripherals,
        sensor_periph: SensorPeripherals,
        config: RelayConfig,
    ) {
        use embassy_net::{Config, StackResources};
        use static_cell::StaticCell;

        info!("Relay task started");

        let sensor = sensor::init(sensor_periph).await;

        // Setup ethernet peripherals
        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(10_000_000); // 10 MHz for W5500

        let spi = Spi::new(
            periph.spi,
            periph.sck,
            periph.mosi,
            periph.miso,
            periph.dma_tx,
            periph.dma_rx,
            spi_config,
        );

        let cs = Output::new(periph.cs, Level::High, Speed::VeryHigh);
        let reset = Output::new(periph.reset, Level::High, Speed::Low);
        let int = ExtiInput::new(periph.int, periph.exti, Pull::Up);

        let eth_periph = eth::EthPeripherals {
            spi,
            cs,
            reset,
            int,
        };

        let net_config = NetworkConfig::from_device_id();
        let (device, w5500_runner) = match eth::init_w5500(eth_periph, net_config.mac_addr).await {
            Ok(eth) => eth,
            Err(e) => {
                // Keep sampling; every cycle reports the transmission failure
                let transport = Capability::<UdpTransport>::from_init("UDP transport", Err(e));
                relay::run(sensor, transport, &config).await
            }
        };

        static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            net_config.seed,
        );
        info!("Network stack initialized with DHCP");

        let app_logic = async {
            manager::wait_for_config(&stack, config.network_settle_ms).await;

            static UDP_BUFFERS: StaticCell<UdpBuffers> = StaticCell::new();
            let transport = Capability::from_init(
                "UDP transport",
                UdpTransport::bind(stack, UDP_BUFFERS.init(UdpBuffers::new()), &config),
            );
            relay::run(sensor, transport, &config).await
        };

        join3(w5500_runner.run(), net_runner.run(), app_logic).await;
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
