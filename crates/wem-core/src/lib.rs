#![deny(missing_docs)]

//! # wem-core: WiFi Environment Data Model
//!
//! Typed views of the two JSON documents a device carries in its
//! filesystem image:
//!
//! - `environments.json`: known networks keyed by SSID, each with a
//!   password, optional static addressing, optional per-MAC address
//!   overrides, and optional MQTT broker settings.
//! - `AP.json`: the soft access point a device opens when none of the
//!   known networks can be joined.
//!
//! The types here assume the documents already passed schema validation
//! (see `wem-schema`). Deserialization still rejects structurally wrong
//! input, so callers get a [`CoreError`] rather than a panic when they skip
//! that step.
//!
//! ## Resolution
//!
//! [`Environments::resolve`] reproduces what a device does after it joins a
//! network: pick the entry for the joined SSID, copy its addressing, and
//! let a `mac_ip` entry for the device's own MAC override `local_ip`.

pub mod access_point;
pub mod environment;
pub mod error;
pub mod mac;

pub use access_point::AccessPointConfig;
pub use environment::{
    Environments, MacBinding, MqttConfig, NetworkEnvironment, StationConfig,
};
pub use error::CoreError;
pub use mac::MacAddress;
