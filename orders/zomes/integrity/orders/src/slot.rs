use hdi::prelude::*;
use std::hash::{Hash, Hasher};

pub const DEFAULT_OPENS_AT: u8 = 7;
pub const DEFAULT_CLOSES_AT: u8 = 22;

// Bookable hours on the 24-hour clock. closes_at is never a start hour.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryWindow {
    pub opens_at: u8,
    pub closes_at: u8,
}

impl Default for DeliveryWindow {
    fn default() -> Self {
        Self {
            opens_at: DEFAULT_OPENS_AT,
            closes_at: DEFAULT_CLOSES_AT,
        }
    }
}

impl DeliveryWindow {
    pub fn is_well_formed(&self) -> bool {
        self.opens_at < self.closes_at && self.closes_at <= 24
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        slot.start_hour >= self.opens_at && slot.start_hour < self.closes_at
    }
}

/// A one-hour delivery window `[start_hour, start_hour + 1)`.
///
/// Two slots are the same slot when they start at the same hour; the labels
/// are derived from `start_hour` and carried along for the UI.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TimeSlot {
    pub start_hour: u8,
    pub display_label: String, // e.g. "11 – 12 PM"
    pub stored_label: String,  // e.g. "11:00 AM"
}

impl TimeSlot {
    pub fn starting_at(start_hour: u8) -> Self {
        let start_hour = start_hour % 24;
        let (start_12, start_period) = to_twelve_hour(start_hour);
        let (end_12, end_period) = to_twelve_hour((start_hour + 1) % 24);

        // Only the end period is shown, so "11 – 12 PM" starts at 11 AM.
        Self {
            start_hour,
            display_label: format!("{} – {} {}", start_12, end_12, end_period),
            stored_label: format!("{}:00 {}", start_12, start_period),
        }
    }

    /// Parses a label of the form `"9:00 PM"` back into its slot.
    pub fn from_stored_label(label: &str) -> Option<Self> {
        let (time, period) = label.trim().split_once(' ')?;
        let digits = time.strip_suffix(":00")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hour: u8 = digits.parse().ok()?;
        if !(1..=12).contains(&hour) {
            return None;
        }

        let start_hour = match (hour, period) {
            (12, "AM") => 0,
            (h, "AM") => h,
            (12, "PM") => 12,
            (h, "PM") => h + 12,
            _ => return None,
        };
        Some(Self::starting_at(start_hour))
    }
}

impl PartialEq for TimeSlot {
    fn eq(&self, other: &Self) -> bool {
        self.start_hour == other.start_hour
    }
}

impl Eq for TimeSlot {}

impl Hash for TimeSlot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start_hour.hash(state);
    }
}

pub fn to_twelve_hour(hour: u8) -> (u8, &'static str) {
    let period = if hour < 12 { "AM" } else { "PM" };
    let face = match hour {
        0 => 12,
        1..=12 => hour,
        _ => hour - 12,
    };
    (face, period)
}
