#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Carbon Intensity Ring - ESP32");
    if let Err(e) = carbon_ring::esp32::run() {
        log::error!("startup failed: {e}");
    }
    loop {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(1000);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> std::process::ExitCode {
    use carbon_ring::config::RingConfig;
    use carbon_ring::cycle::ForecastRing;
    use carbon_ring::mock::{FixtureSource, SyntheticSource};
    use std::process::ExitCode;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ring = match ForecastRing::new(RingConfig::default()) {
        Ok(ring) => ring,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Optional argument: path to a saved regional forecast response.
    match std::env::args().nth(1) {
        Some(path) => {
            let fixture = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|body| FixtureSource::from_json(&body).map_err(|e| e.to_string()));
            match fixture {
                Ok(fixture) => render_once(&ring, fixture),
                Err(e) => {
                    log::error!("failed to load forecast from {path}: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            log::info!("no forecast file given, using synthetic forecast");
            render_once(&ring, SyntheticSource::default())
        }
    }
}

/// Run a single refresh cycle against the terminal.
#[cfg(not(target_os = "espidf"))]
fn render_once(
    ring: &carbon_ring::cycle::ForecastRing,
    mut source: impl carbon_ring::ForecastSource,
) -> std::process::ExitCode {
    use carbon_ring::cycle::CycleOutcome;
    use carbon_ring::mock::{SystemClock, TerminalDisplay};
    use std::process::ExitCode;

    match ring.refresh(&mut source, &mut SystemClock, &mut TerminalDisplay::new()) {
        Ok(CycleOutcome::Rendered(_)) => ExitCode::SUCCESS,
        Ok(CycleOutcome::Skipped(reason)) => {
            log::warn!("nothing rendered: {reason:?}");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
