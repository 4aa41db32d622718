//! # Soft-AP Fallback
//!
//! When no known network answers, a device opens its own access point so it
//! can still be reached for configuration. `AP.json` describes that access
//! point. Every field except `ssid` has a default matching the firmware's
//! built-in values.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

const DEFAULT_AP_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 2, 1);
const DEFAULT_AP_SUBNET: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Soft access point settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointConfig {
    /// Network name broadcast by the device.
    pub ssid: String,
    /// WPA passphrase. Empty means an open network.
    #[serde(default)]
    pub password: String,
    /// 2.4 GHz channel.
    #[serde(default = "default_channel")]
    pub channel: u8,
    /// Hide the SSID from scans.
    #[serde(default)]
    pub hidden: bool,
    /// Maximum simultaneous stations.
    #[serde(default = "default_max_connections")]
    pub max_connections: u8,
    /// Address of the device on its own network.
    #[serde(default = "default_address")]
    pub local_ip: Ipv4Addr,
    /// Gateway handed out to stations.
    #[serde(default = "default_address")]
    pub gateway: Ipv4Addr,
    /// Subnet mask.
    #[serde(default = "default_subnet")]
    pub subnet: Ipv4Addr,
}

fn default_channel() -> u8 {
    1
}

fn default_max_connections() -> u8 {
    4
}

fn default_address() -> Ipv4Addr {
    DEFAULT_AP_ADDRESS
}

fn default_subnet() -> Ipv4Addr {
    DEFAULT_AP_SUBNET
}

impl AccessPointConfig {
    /// Decode a parsed `AP.json` document, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if `ssid` is missing or a field has the
    /// wrong type.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|source| CoreError::Decode {
            document: "AP.json",
            source,
        })
    }

    /// True when stations can join without a passphrase.
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}
