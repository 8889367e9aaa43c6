//! SHT3x on the Feather's STEMMA QT / I2C1 header

use defmt::debug;
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::mode::Async;
use embassy_stm32::{bind_interrupts, peripherals, Peri};
use embassy_time::Delay;
use relay_core::sht3x::{self, Sht3x};
use relay_core::Capability;

bind_interrupts!(pub struct I2cIrqs {
    I2C1_EV => i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

pub type Sensor = Sht3x<I2c<'static, Async>, Delay>;

/// I2C1 peripherals bundle (SCL = PB6, SDA = PB7)
pub struct SensorPeripherals {
    pub i2c: Peri<'static, peripherals::I2C1>,
    pub scl: Peri<'static, peripherals::PB6>,
    pub sda: Peri<'static, peripherals::PB7>,
    pub dma_tx: Peri<'static, peripherals::DMA1_CH6>,
    pub dma_rx: Peri<'static, peripherals::DMA1_CH0>,
}

/// Bring up the bus and probe the sensor once
pub async fn init(periph: SensorPeripherals) -> Capability<Sensor> {
    // Default config runs the bus at 100 kHz
    let bus = I2c::new(
        periph.i2c,
        periph.scl,
        periph.sda,
        I2cIrqs,
        periph.dma_tx,
        periph.dma_rx,
        i2c::Config::default(),
    );

    let mut sensor = Sht3x::new(bus, Delay, sht3x::DEFAULT_ADDRESS);
    let probed = sensor.probe().await.map(|status| {
        debug!("SHT3x status register: {=u16:#06x}", status);
        sensor
    });
    Capability::from_init("SHT3x sensor", probed)
}
