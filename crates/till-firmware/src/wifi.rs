//! esp-radio Wi-Fi port.
//!
//! Uses the controller's blocking call variants so the core's cooperative
//! loop never has to poll a future: `connect` only initiates the join and
//! the core observes progress through `status`.

use esp_radio::wifi::{ClientConfiguration, Configuration, WifiController};
use heapless::Vec;
use log::{info, warn};
use till_core::net::{LinkStatus, MAX_SCAN_RESULTS, NetworkEntry, NetworkPort};

pub struct EspWifiPort<'d> {
    controller: WifiController<'d>,
}

impl<'d> EspWifiPort<'d> {
    /// Wrap a started controller.
    pub fn new(mut controller: WifiController<'d>) -> Self {
        // A client configuration must be set before scanning.
        let config = Configuration::Client(ClientConfiguration::default());
        if let Err(err) = controller.set_configuration(&config) {
            warn!("initial wifi configuration failed: {:?}", err);
        }
        if let Err(err) = controller.start() {
            warn!("wifi start failed: {:?}", err);
        }
        Self { controller }
    }
}

impl NetworkPort for EspWifiPort<'_> {
    fn scan(&mut self) -> Vec<NetworkEntry, MAX_SCAN_RESULTS> {
        let mut out = Vec::new();
        match self.controller.scan_n(MAX_SCAN_RESULTS) {
            Ok(results) => {
                for ap in results {
                    let mut ssid = heapless::String::new();
                    for ch in ap.ssid.chars().take(till_core::net::MAX_SSID_LEN) {
                        let _ = ssid.push(ch);
                    }
                    let _ = out.push(NetworkEntry {
                        ssid,
                        rssi: ap.signal_strength,
                    });
                }
                info!("scan returned {} access points", out.len());
            }
            Err(err) => warn!("wifi scan failed: {:?}", err),
        }
        out
    }

    fn connect(&mut self, ssid: &str, secret: &str) {
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.into(),
            password: secret.into(),
            ..Default::default()
        });
        if let Err(err) = self.controller.set_configuration(&config) {
            warn!("wifi configuration failed: {:?}", err);
            return;
        }
        // Initiate only; the core polls `status` with its own retry bound.
        if let Err(err) = self.controller.connect() {
            warn!("wifi connect failed to start: {:?}", err);
        }
    }

    fn status(&mut self) -> LinkStatus {
        if matches!(self.controller.is_connected(), Ok(true)) {
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }
}
