//! Message addressing
//!
//! Addresses have the form `{device}/{service}/{application...}` where the
//! device part carries its own scheme, e.g. `mac:112233445566/aker/schedule`.

/// Service name this process publishes under
pub const SELF_SERVICE: &str = "webcfg";

/// Service that acknowledges schedule updates and deletes
pub const ACK_SERVICE: &str = "aker";

/// Application of the acknowledging service
pub const ACK_APPLICATION: &str = "schedule";

/// Service that answers service-status retrieves on behalf of the peer
pub const STATUS_SERVICE: &str = "parodus";

/// Application path for the peer's service status
pub const STATUS_APPLICATION: &str = "service-status/aker";

/// Source address for every request sent by this process
pub fn source_address(device: &str) -> String {
    format!("{}/{}", device, SELF_SERVICE)
}

/// Destination for schedule update and delete requests
pub fn schedule_address(device: &str) -> String {
    format!("{}/{}/{}", device, ACK_SERVICE, ACK_APPLICATION)
}

/// Destination for the service-status retrieve
pub fn status_address(device: &str) -> String {
    format!("{}/{}/{}", device, STATUS_SERVICE, STATUS_APPLICATION)
}
