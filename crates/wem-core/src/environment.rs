//! # Known Networks
//!
//! `environments.json` maps each known SSID to the settings a device applies
//! after joining that network:
//!
//! ```json
//! {
//!   "HomeNet": {
//!     "wifi_password": "secret-pass",
//!     "gateway": "192.168.1.1",
//!     "subnet": "255.255.255.0",
//!     "mac_ip": {
//!       "5C:CF:7F:01:AB:9E": { "ip": "192.168.1.40", "comment": "hall sensor" }
//!     },
//!     "mqtt": { "broker": "192.168.1.2", "port": 1883 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::mac::MacAddress;

/// A static address assigned to one device on a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacBinding {
    /// Address the device should use.
    pub ip: Ipv4Addr,
    /// Free-form note, usually where the device is installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// MQTT broker settings attached to a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker host name or address.
    pub broker: String,
    /// Broker TCP port.
    pub port: u16,
    /// Optional user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Optional password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Settings for one known network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEnvironment {
    /// WPA passphrase.
    pub wifi_password: String,
    /// Static address for every device on this network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_ip: Option<Ipv4Addr>,
    /// Default gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    /// Subnet mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Ipv4Addr>,
    /// Host name to announce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Per-device address overrides. Two keys naming the same address in
    /// different spellings are a decode error.
    #[serde(
        default,
        deserialize_with = "unique_mac_table",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub mac_ip: BTreeMap<MacAddress, MacBinding>,
    /// MQTT broker reachable from this network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt: Option<MqttConfig>,
}

fn unique_mac_table<'de, D>(deserializer: D) -> Result<BTreeMap<MacAddress, MacBinding>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MacTableVisitor;

    impl<'de> Visitor<'de> for MacTableVisitor {
        type Value = BTreeMap<MacAddress, MacBinding>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from MAC address to address binding")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut table = BTreeMap::new();
            let mut spellings: BTreeMap<MacAddress, String> = BTreeMap::new();

            while let Some(key) = map.next_key::<String>()? {
                let mac = MacAddress::parse(&key).map_err(de::Error::custom)?;
                if let Some(first) = spellings.insert(mac, key.clone()) {
                    return Err(de::Error::custom(format!(
                        "duplicate mac_ip entry for {mac}: {first:?} and {key:?}"
                    )));
                }
                table.insert(mac, map.next_value::<MacBinding>()?);
            }
            Ok(table)
        }
    }

    deserializer.deserialize_map(MacTableVisitor)
}

/// The settings a device ends up with after joining a known network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationConfig {
    /// The joined network.
    pub ssid: String,
    /// WPA passphrase.
    pub password: String,
    /// Effective static address, if any. `None` means DHCP.
    pub local_ip: Option<Ipv4Addr>,
    /// Default gateway.
    pub gateway: Option<Ipv4Addr>,
    /// Subnet mask.
    pub subnet: Option<Ipv4Addr>,
    /// Host name to announce.
    pub host: Option<String>,
    /// The `mac_ip` entry that set `local_ip`, if one matched.
    pub mac_binding: Option<MacBinding>,
    /// MQTT broker settings.
    pub mqtt: Option<MqttConfig>,
}

impl StationConfig {
    /// Whether the device should configure a static address instead of DHCP.
    pub fn uses_static_ip(&self) -> bool {
        self.local_ip.is_some()
    }
}

/// All known networks, keyed by SSID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environments {
    networks: BTreeMap<String, NetworkEnvironment>,
}

impl Environments {
    /// Decode a parsed `environments.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the document is not an object of
    /// network entries.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|source| CoreError::Decode {
            document: "environments.json",
            source,
        })
    }

    /// Number of known networks.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// True when no networks are configured.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Look up the raw entry for an SSID.
    pub fn get(&self, ssid: &str) -> Option<&NetworkEnvironment> {
        self.networks.get(ssid)
    }

    /// `(ssid, password)` pairs a device registers with its multi-network
    /// scanner, in SSID order.
    pub fn known_networks(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.networks
            .iter()
            .map(|(ssid, env)| (ssid.as_str(), env.wifi_password.as_str()))
    }

    /// Compute the station settings for a device with address `mac` that
    /// joined `ssid`.
    ///
    /// SSIDs are matched exactly. A `mac_ip` entry for `mac` replaces the
    /// network-wide `local_ip`; gateway and subnet always come from the
    /// network entry.
    pub fn resolve(&self, ssid: &str, mac: MacAddress) -> Option<StationConfig> {
        let env = self.networks.get(ssid)?;

        let mac_binding = env.mac_ip.get(&mac).cloned();
        let local_ip = match &mac_binding {
            Some(binding) => {
                tracing::debug!(
                    %mac,
                    ip = %binding.ip,
                    comment = binding.comment.as_deref().unwrap_or(""),
                    "static address taken from mac_ip"
                );
                Some(binding.ip)
            }
            None => env.local_ip,
        };

        Some(StationConfig {
            ssid: ssid.to_string(),
            password: env.wifi_password.clone(),
            local_ip,
            gateway: env.gateway,
            subnet: env.subnet,
            host: env.host.clone(),
            mac_binding,
            mqtt: env.mqtt.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Environments {
        Environments::from_value(json!({
            "HomeNet": {
                "wifi_password": "home-secret",
                "local_ip": "192.168.1.50",
                "gateway": "192.168.1.1",
                "subnet": "255.255.255.0",
                "host": "sensor-node",
                "mac_ip": {
                    "5c:cf:7f:01:ab:9e": { "ip": "192.168.1.40", "comment": "hall" }
                },
                "mqtt": { "broker": "192.168.1.2", "port": 1883, "user": "dev" }
            },
            "Workshop": {
                "wifi_password": "shop-secret"
            }
        }))
        .unwrap()
    }

    #[test]
    fn known_networks_lists_every_ssid() {
        let envs = sample();
        let nets: Vec<_> = envs.known_networks().collect();
        assert_eq!(
            nets,
            vec![("HomeNet", "home-secret"), ("Workshop", "shop-secret")]
        );
        assert_eq!(envs.len(), 2);
        assert!(!envs.is_empty());
    }

    #[test]
    fn resolve_unknown_ssid_is_none() {
        let mac = MacAddress::parse("00:11:22:33:44:55").unwrap();
        assert!(sample().resolve("Elsewhere", mac).is_none());
    }

    #[test]
    fn resolve_ssid_is_case_sensitive() {
        let mac = MacAddress::parse("00:11:22:33:44:55").unwrap();
        assert!(sample().resolve("homenet", mac).is_none());
    }

    #[test]
    fn resolve_uses_network_address_without_mac_entry() {
        let mac = MacAddress::parse("00:11:22:33:44:55").unwrap();
        let station = sample().resolve("HomeNet", mac).unwrap();
        assert_eq!(station.local_ip, Some(Ipv4Addr::new(192, 168, 1, 50)));
        assert!(station.mac_binding.is_none());
        assert_eq!(station.host.as_deref(), Some("sensor-node"));
        assert_eq!(station.mqtt.as_ref().map(|m| m.port), Some(1883));
        assert!(station.uses_static_ip());
    }

    #[test]
    fn resolve_mac_entry_overrides_local_ip() {
        let mac = MacAddress::parse("5C:CF:7F:01:AB:9E").unwrap();
        let station = sample().resolve("HomeNet", mac).unwrap();
        assert_eq!(station.local_ip, Some(Ipv4Addr::new(192, 168, 1, 40)));
        assert_eq!(station.gateway, Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(
            station.mac_binding.and_then(|b| b.comment).as_deref(),
            Some("hall")
        );
    }

    #[test]
    fn resolve_network_without_addressing_uses_dhcp() {
        let mac = MacAddress::parse("5C:CF:7F:01:AB:9E").unwrap();
        let station = sample().resolve("Workshop", mac).unwrap();
        assert!(!station.uses_static_ip());
        assert!(station.gateway.is_none());
        assert!(station.mqtt.is_none());
    }

    #[test]
    fn from_value_rejects_missing_password() {
        let err = Environments::from_value(json!({ "Net": { "local_ip": "10.0.0.2" } }))
            .unwrap_err();
        assert!(matches!(err, CoreError::Decode { document: "environments.json", .. }));
    }

    #[test]
    fn from_value_rejects_bad_ip_and_bad_mac() {
        assert!(Environments::from_value(json!({
            "Net": { "wifi_password": "x", "gateway": "not-an-ip" }
        }))
        .is_err());
        assert!(Environments::from_value(json!({
            "Net": { "wifi_password": "x", "mac_ip": { "bogus": { "ip": "10.0.0.3" } } }
        }))
        .is_err());
    }

    #[test]
    fn from_value_rejects_same_mac_spelled_twice() {
        let err = Environments::from_value(json!({
            "Net": {
                "wifi_password": "x",
                "mac_ip": {
                    "AA:BB:CC:DD:EE:FF": { "ip": "10.0.0.3" },
                    "aa-bb-cc-dd-ee-ff": { "ip": "10.0.0.4" }
                }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, CoreError::Decode { document: "environments.json", .. }));
        assert!(err.to_string().contains("duplicate mac_ip entry for AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn distinct_macs_all_survive_decoding() {
        let envs = Environments::from_value(json!({
            "Net": {
                "wifi_password": "x",
                "mac_ip": {
                    "AA:BB:CC:DD:EE:01": { "ip": "10.0.0.3" },
                    "aa-bb-cc-dd-ee-02": { "ip": "10.0.0.4" }
                }
            }
        }))
        .unwrap();
        assert_eq!(envs.get("Net").map(|n| n.mac_ip.len()), Some(2));
    }

    #[test]
    fn empty_document_has_no_networks() {
        let envs = Environments::from_value(json!({})).unwrap();
        assert!(envs.is_empty());
        assert_eq!(envs.known_networks().count(), 0);
    }
}
