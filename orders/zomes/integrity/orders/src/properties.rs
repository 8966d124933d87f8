use hdi::prelude::*;
use holochain_serialized_bytes::decode;

use crate::slot::DeliveryWindow;

// UTC-14:00 to UTC+14:00, the widest offsets in use
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// DNA properties for the orders DNA. Every field is optional in the DNA
/// manifest; missing ones take the default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OrdersProperties {
    pub opens_at: u8,
    pub closes_at: u8,
    pub utc_offset_minutes: i32,
    pub admin_pub_key_str: Option<String>, // Store agent allowed to move orders along
}

impl Default for OrdersProperties {
    fn default() -> Self {
        let window = DeliveryWindow::default();
        Self {
            opens_at: window.opens_at,
            closes_at: window.closes_at,
            utc_offset_minutes: 0,
            admin_pub_key_str: None,
        }
    }
}

impl OrdersProperties {
    // None when the bytes are not a properties map, e.g. no properties at all
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let decoded: Result<OrdersProperties, _> = decode(bytes);
        decoded.ok()
    }

    pub fn window(&self) -> DeliveryWindow {
        DeliveryWindow {
            opens_at: self.opens_at,
            closes_at: self.closes_at,
        }
    }

    pub fn is_admin(&self, agent: &AgentPubKey) -> bool {
        match &self.admin_pub_key_str {
            Some(admin_str) => agent.to_string() == *admin_str,
            None => false,
        }
    }

    pub fn check(self) -> Result<Self, String> {
        if !self.window().is_well_formed() {
            return Err(format!(
                "Invalid delivery hours in DNA properties: opens_at {} closes_at {}",
                self.opens_at, self.closes_at
            ));
        }
        let offsets = -MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES;
        if !offsets.contains(&self.utc_offset_minutes) {
            return Err(format!(
                "Invalid UTC offset in DNA properties: {} minutes",
                self.utc_offset_minutes
            ));
        }
        Ok(self)
    }
}

/// Properties this DNA was installed with, defaults when there are none.
pub fn installed_properties() -> ExternResult<OrdersProperties> {
    let properties_sb = dna_info()?.modifiers.properties;
    Ok(OrdersProperties::decode(properties_sb.bytes()).unwrap_or_default())
}

pub fn delivery_window() -> ExternResult<DeliveryWindow> {
    Ok(installed_properties()?.window())
}
