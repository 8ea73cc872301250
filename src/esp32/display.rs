use std::time::Duration;

use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::rmt::config::TransmitConfig;
use esp_idf_svc::hal::rmt::{PinState, Pulse, RmtChannel, TxRmtDriver, VariableLengthSignal};
use esp_idf_svc::sys::EspError;
use smart_leds::RGB8;

use crate::RingDisplay;
use crate::ring::RingFrame;

/// Error types for ESP32 LED ring operations.
#[derive(Debug, thiserror::Error)]
pub enum LedDisplayError {
    #[error("LED driver initialization failed: {0}")]
    DriverInit(EspError),
    #[error("LED update error: {0}")]
    Update(EspError),
}

/// WS2812 bit timings: (high, low) for a 0 bit and for a 1 bit.
struct BitPulses {
    zero: (Pulse, Pulse),
    one: (Pulse, Pulse),
}

/// WS2812 (NeoPixel, GRB order) ring driven via the ESP32 RMT peripheral.
pub struct Esp32LedRing {
    tx: TxRmtDriver<'static>,
    pulses: BitPulses,
}

impl Esp32LedRing {
    pub fn new<C: RmtChannel>(
        channel: impl Peripheral<P = C> + 'static,
        pin: impl Peripheral<P = impl OutputPin> + 'static,
    ) -> Result<Self, LedDisplayError> {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config).map_err(LedDisplayError::DriverInit)?;
        let ticks_hz = tx.counter_clock().map_err(LedDisplayError::DriverInit)?;
        let pulse = |state, nanos| {
            Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(nanos))
                .map_err(LedDisplayError::DriverInit)
        };
        let pulses = BitPulses {
            zero: (pulse(PinState::High, 350)?, pulse(PinState::Low, 800)?),
            one: (pulse(PinState::High, 700)?, pulse(PinState::Low, 600)?),
        };
        Ok(Self { tx, pulses })
    }

    fn encode(&self, pixels: &[RGB8]) -> Result<VariableLengthSignal, EspError> {
        let mut signal = VariableLengthSignal::new();
        for color in pixels {
            for byte in [color.g, color.r, color.b] {
                for bit in (0..8).rev() {
                    let (high, low) = if byte & (1 << bit) != 0 {
                        &self.pulses.one
                    } else {
                        &self.pulses.zero
                    };
                    signal.push([high, low])?;
                }
            }
        }
        Ok(signal)
    }
}

impl std::fmt::Debug for Esp32LedRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Esp32LedRing").finish_non_exhaustive()
    }
}

impl RingDisplay for Esp32LedRing {
    type Error = LedDisplayError;

    fn show(&mut self, frame: &RingFrame) -> Result<(), Self::Error> {
        let signal = self.encode(&frame.pixels()).map_err(LedDisplayError::Update)?;
        self.tx
            .start_blocking(&signal)
            .map_err(LedDisplayError::Update)
    }
}
