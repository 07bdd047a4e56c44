//! SteamID value type.
//!
//! A SteamID is a 64-bit account identifier. The Web API transmits it as a
//! decimal string; users also see it in the legacy `STEAM_X:Y:Z` form and
//! the bracketed `[U:1:N]` form. All three parse into [`SteamId`].

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SteamError;

/// 64-bit id of the first individual account in the public universe.
const INDIVIDUAL_BASE: u64 = 0x0110_0001_0000_0000;

/// A Steam account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Individual account in the public universe from a 32-bit account id.
    pub const fn from_account_id(account_id: u32) -> Self {
        Self(INDIVIDUAL_BASE + account_id as u64)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Low 32 bits.
    pub const fn account_id(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    /// Top 8 bits.
    pub const fn universe(&self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Legacy `STEAM_0:Y:Z` rendering.
    pub fn to_steam2(&self) -> String {
        let account = self.account_id();
        format!("STEAM_0:{}:{}", account & 1, account >> 1)
    }

    /// Bracketed `[U:1:N]` rendering.
    pub fn to_steam3(&self) -> String {
        format!("[U:{}:{}]", self.universe(), self.account_id())
    }

    fn parse_steam2(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("STEAM_")?;
        let mut parts = rest.split(':');
        let _universe: u8 = parts.next()?.parse().ok()?;
        let y: u32 = parts.next()?.parse().ok()?;
        let z: u32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || y > 1 {
            return None;
        }
        let account = z.checked_mul(2)?.checked_add(y)?;
        Some(Self::from_account_id(account))
    }

    fn parse_steam3(s: &str) -> Option<Self> {
        let inner = s.strip_prefix("[U:")?.strip_suffix(']')?;
        let (universe, account) = inner.split_once(':')?;
        let universe: u64 = universe.parse().ok()?;
        let account: u32 = account.parse().ok()?;
        if universe == 0 || universe > 0xFF {
            return None;
        }
        Some(Self((universe << 56) | (INDIVIDUAL_BASE & 0x00FF_FFFF_0000_0000) | u64::from(account)))
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SteamId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for SteamId {
    type Err = SteamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u64>() {
            return Ok(Self(id));
        }
        Self::parse_steam2(s)
            .or_else(|| Self::parse_steam3(s))
            .ok_or_else(|| SteamError::InvalidSteamId(s.to_string()))
    }
}

impl Serialize for SteamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SteamIdVisitor;

        impl Visitor<'_> for SteamIdVisitor {
            type Value = SteamId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a SteamID as a string or unsigned integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<SteamId, E> {
                Ok(SteamId(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SteamId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SteamIdVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const GABEN: u64 = 76_561_197_960_287_930;

    #[test]
    fn renders_all_forms() {
        let id = SteamId::new(GABEN);
        assert_eq!(id.account_id(), 22_202);
        assert_eq!(id.to_string(), "76561197960287930");
        assert_eq!(id.to_steam2(), "STEAM_0:0:11101");
        assert_eq!(id.to_steam3(), "[U:1:22202]");
    }

    #[test]
    fn parses_all_forms() {
        let expected = SteamId::new(GABEN);
        assert_eq!("76561197960287930".parse::<SteamId>().unwrap(), expected);
        assert_eq!("STEAM_0:0:11101".parse::<SteamId>().unwrap(), expected);
        assert_eq!("STEAM_1:0:11101".parse::<SteamId>().unwrap(), expected);
        assert_eq!("[U:1:22202]".parse::<SteamId>().unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "STEAM_0:2:1", "[U:0:1]", "[U:1:x]", "gabe"] {
            assert!(
                matches!(input.parse::<SteamId>(), Err(SteamError::InvalidSteamId(_))),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn serde_uses_decimal_string_and_accepts_numbers() {
        let id = SteamId::new(GABEN);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"76561197960287930\"");
        let from_str: SteamId = serde_json::from_str("\"76561197960287930\"").unwrap();
        let from_num: SteamId = serde_json::from_str("76561197960287930").unwrap();
        assert_eq!(from_str, id);
        assert_eq!(from_num, id);
    }
}
