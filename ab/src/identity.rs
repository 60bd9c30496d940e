//! Device identity and transaction id sources

use tracing::debug;
use uuid::Uuid;

/// Provides the address prefix identifying this device, e.g. `mac:112233445566`
pub trait DeviceIdentity: Send + Sync {
    fn device_address(&self) -> String;
}

/// Generates transaction ids for requests that need a fresh one
pub trait TransactionIds: Send + Sync {
    fn next_id(&self) -> String;
}

/// Identity fixed at construction, usually read from config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    address: String,
}

impl StaticIdentity {
    /// Build an identity from a bare MAC address
    ///
    /// Separators are stripped and hex digits lowercased, so
    /// `11:22:33:AA:BB:CC` becomes `mac:112233aabbcc`.
    pub fn from_mac(mac: &str) -> Self {
        let normalized: String = mac
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        debug!(%mac, %normalized, "StaticIdentity::from_mac: called");
        Self {
            address: format!("mac:{}", normalized),
        }
    }
}

impl DeviceIdentity for StaticIdentity {
    fn device_address(&self) -> String {
        self.address.clone()
    }
}

/// Time-ordered UUID v7 transaction ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTransactionIds;

impl TransactionIds for UuidTransactionIds {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}
