//! Device side: Wi-Fi, SNTP, HTTPS forecast client and the WS2812 ring.

mod clock;
mod display;
mod source;

pub use clock::SntpClock;
pub use display::{Esp32LedRing, LedDisplayError};
pub use source::{Esp32ForecastClient, FetchError};

use std::time::{Duration, Instant};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::EspError;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{error, info, warn};

use crate::config::{ApiConfig, ConfigError, DEFAULT_POSTCODE, RingConfig};
use crate::cycle::ForecastRing;
use crate::schedule::RefreshSchedule;

const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};
const POSTCODE: &str = match option_env!("CARBON_RING_POSTCODE") {
    Some(postcode) => postcode,
    None => DEFAULT_POSTCODE,
};

const POLL_INTERVAL_MS: u32 = 1000;

/// Error types for bringing up the device.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("ESP-IDF call failed: {0}")]
    Esp(#[from] EspError),
    #[error("Wi-Fi credentials too long")]
    Credentials,
    #[error("invalid ring configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Led(#[from] LedDisplayError),
}

fn connect_wifi(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> Result<BlockingWifi<EspWifi<'static>>, StartupError> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID.try_into().map_err(|_| StartupError::Credentials)?,
        password: WIFI_PASSWORD.try_into().map_err(|_| StartupError::Credentials)?,
        auth_method: if WIFI_PASSWORD.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;

    info!("Starting up WiFi interface");
    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("Connected. IP: {}", wifi.wifi().sta_netif().get_ip_info()?.ip);
    Ok(wifi)
}

fn ensure_connected(wifi: &mut BlockingWifi<EspWifi<'static>>) -> Result<(), EspError> {
    if !wifi.is_connected()? {
        warn!("WiFi connection lost, reconnecting");
        wifi.connect()?;
        wifi.wait_netif_up()?;
    }
    Ok(())
}

/// Bring up the device and run the refresh loop forever.
pub fn run() -> Result<(), StartupError> {
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut display = Esp32LedRing::new(peripherals.rmt.channel0, peripherals.pins.gpio6)?;
    let mut wifi = connect_wifi(peripherals.modem, sysloop, nvs)?;
    let mut clock = SntpClock::start()?;
    let mut source = Esp32ForecastClient::new(ApiConfig {
        postcode: POSTCODE.to_string(),
        ..ApiConfig::default()
    });

    let ring = ForecastRing::new(RingConfig::default())?;
    let mut schedule = RefreshSchedule::new(ring.config().refresh_period);
    info!(
        "{} LEDs, {}s per LED, refresh every {:?}",
        ring.config().led_count,
        ring.config().seconds_per_led(),
        schedule.period()
    );

    loop {
        if schedule.poll(Instant::now()) {
            match ensure_connected(&mut wifi) {
                Ok(()) => {
                    if let Err(e) = ring.refresh(&mut source, &mut clock, &mut display) {
                        error!("{e}");
                    }
                }
                Err(e) => error!("WiFi reconnect failed, skipping refresh: {e}"),
            }
        }
        let wait = schedule.remaining(Instant::now()).min(Duration::from_millis(
            u64::from(POLL_INTERVAL_MS),
        ));
        FreeRtos::delay_ms(wait.as_millis().max(1) as u32);
    }
}
