//! # MAC Addresses
//!
//! Devices report their address as `AA:BB:CC:DD:EE:FF`, but hand-edited
//! data files mix case and sometimes use `-` separators. [`MacAddress`]
//! parses either form and always displays the upper-case colon form, so
//! lookups in `mac_ip` tables do not depend on how the file was written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Build an address from raw octets.
    pub fn from_octets(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse `AA:BB:CC:DD:EE:FF` or `aa-bb-cc-dd-ee-ff`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidMac`] unless the input is exactly six
    /// two-digit hex octets joined by a single consistent separator.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidMac(s.to_string());

        let sep = if s.contains(':') { ':' } else { '-' };
        let parts: Vec<&str> = s.split(sep).collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_form() {
        let mac = MacAddress::parse("5C:CF:7F:01:AB:9E").unwrap();
        assert_eq!(mac.octets(), [0x5c, 0xcf, 0x7f, 0x01, 0xab, 0x9e]);
    }

    #[test]
    fn parses_lower_case_dash_form() {
        let a = MacAddress::parse("5c-cf-7f-01-ab-9e").unwrap();
        let b = MacAddress::parse("5C:CF:7F:01:AB:9E").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "5C:CF:7F:01:AB:9E");
    }

    #[test]
    fn rejects_mixed_separators() {
        assert!(MacAddress::parse("5C:CF-7F:01:AB:9E").is_err());
    }

    #[test]
    fn rejects_wrong_octet_count() {
        assert!(MacAddress::parse("5C:CF:7F:01:AB").is_err());
        assert!(MacAddress::parse("5C:CF:7F:01:AB:9E:00").is_err());
        assert!(MacAddress::parse("").is_err());
    }

    #[test]
    fn rejects_non_hex_and_short_octets() {
        assert!(MacAddress::parse("5C:CF:7F:01:AB:ZZ").is_err());
        assert!(MacAddress::parse("5C:CF:7F:1:AB:9E").is_err());
        assert!(MacAddress::parse("+5:CF:7F:01:AB:9E").is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let mac: MacAddress = serde_json::from_str("\"aa:bb:cc:dd:ee:ff\"").unwrap();
        assert_eq!(serde_json::to_string(&mac).unwrap(), "\"AA:BB:CC:DD:EE:FF\"");
        assert!(serde_json::from_str::<MacAddress>("\"nope\"").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Display output always parses back to the same address.
        #[test]
        fn display_parses_back(octets in any::<[u8; 6]>()) {
            let mac = MacAddress::from_octets(octets);
            prop_assert_eq!(MacAddress::parse(&mac.to_string()).unwrap(), mac);
        }

        /// Case and separator style never change the parsed address.
        #[test]
        fn spelling_is_irrelevant(octets in any::<[u8; 6]>(), lower in any::<bool>(), dash in any::<bool>()) {
            let sep = if dash { "-" } else { ":" };
            let text: Vec<String> = octets
                .iter()
                .map(|o| if lower { format!("{o:02x}") } else { format!("{o:02X}") })
                .collect();
            let parsed = MacAddress::parse(&text.join(sep)).unwrap();
            prop_assert_eq!(parsed.octets(), octets);
        }
    }
}
