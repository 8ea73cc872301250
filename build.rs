fn main() {
    // Device credentials are baked in with option_env!
    for var in ["WIFI_SSID", "WIFI_PASSWORD", "CARBON_RING_POSTCODE"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    // ESP-IDF link arguments are only needed for the device build
    if std::env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "espidf") {
        embuild::espidf::sysenv::output();
    }
}
