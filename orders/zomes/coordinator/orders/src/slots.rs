use hdk::prelude::*;
use orders_integrity::*;

use crate::config::orders_properties;

const MICROS_PER_SECOND: i64 = 1_000_000;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const MICROS_PER_DAY: i64 = SECONDS_PER_DAY * MICROS_PER_SECOND;

// Wall-clock view of an instant in the store's local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    pub hour: u8,
    pub day_start: i64, // UTC microseconds at which the local day began
}

impl LocalClock {
    pub fn at(now_micros: i64, utc_offset_minutes: i32) -> Self {
        let offset_seconds = i64::from(utc_offset_minutes) * 60;
        let local_seconds = now_micros.div_euclid(MICROS_PER_SECOND) + offset_seconds;
        let local_day = local_seconds.div_euclid(SECONDS_PER_DAY);
        let second_of_day = local_seconds.rem_euclid(SECONDS_PER_DAY);

        Self {
            hour: (second_of_day / SECONDS_PER_HOUR) as u8,
            day_start: (local_day * SECONDS_PER_DAY - offset_seconds) * MICROS_PER_SECOND,
        }
    }

    pub fn day_start_after(&self, days: i64) -> i64 {
        self.day_start + days * MICROS_PER_DAY
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryDay {
    Today,
    Tomorrow,
}

impl DeliveryDay {
    fn days_ahead(&self) -> i64 {
        match self {
            DeliveryDay::Today => 0,
            DeliveryDay::Tomorrow => 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GetDeliverySlotsInput {
    pub day: DeliveryDay,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeliverySlots {
    pub day: DeliveryDay,
    pub date: u64,
    pub slots: Vec<TimeSlot>,
}

/// Slots a customer can still book inside `window`.
///
/// Today the first slot starts the hour after `current_hour`; once that is
/// past `closes_at` nothing is left. Any later day starts at `opens_at`.
/// `closes_at` is never a start hour, so the last slot ends exactly at it.
pub fn bookable_slots(
    window: &DeliveryWindow,
    for_today: bool,
    current_hour: u8,
) -> Vec<TimeSlot> {
    let start_hour = if for_today {
        let next_hour = current_hour.saturating_add(1);
        if next_hour > window.closes_at {
            return Vec::new();
        }
        window.opens_at.max(window.closes_at.min(next_hour))
    } else {
        window.opens_at
    };

    (start_hour..window.closes_at)
        .map(TimeSlot::starting_at)
        .collect()
}

// Standard 7 AM to 10 PM delivery hours
pub fn generate_slots(for_today: bool, current_hour: u8) -> Vec<TimeSlot> {
    bookable_slots(&DeliveryWindow::default(), for_today, current_hour)
}

pub fn delivery_slots(
    window: &DeliveryWindow,
    clock: &LocalClock,
    day: DeliveryDay,
) -> DeliverySlots {
    DeliverySlots {
        day,
        date: clock.day_start_after(day.days_ahead()).max(0) as u64,
        slots: bookable_slots(window, day == DeliveryDay::Today, clock.hour),
    }
}

// The slot must be one get_delivery_slots offers right now
pub fn check_bookable(
    window: &DeliveryWindow,
    clock: &LocalClock,
    scheduled: &ScheduledDelivery,
) -> Result<TimeSlot, String> {
    let slot = scheduled
        .slot()
        .ok_or_else(|| format!("Unreadable delivery slot '{}'", scheduled.slot_label))?;

    let date = i64::try_from(scheduled.date)
        .map_err(|_| format!("Delivery date {} is out of range", scheduled.date))?;
    let offset = date - clock.day_start;
    if offset < 0 {
        return Err("Delivery date is in the past".into());
    }
    if offset % MICROS_PER_DAY != 0 {
        return Err("Delivery date must be the start of a local day".into());
    }

    let for_today = offset == 0;
    if bookable_slots(window, for_today, clock.hour).contains(&slot) {
        Ok(slot)
    } else {
        Err(format!(
            "Delivery slot '{}' is no longer available",
            scheduled.slot_label
        ))
    }
}

pub(crate) fn get_delivery_slots_impl(
    input: GetDeliverySlotsInput,
) -> ExternResult<DeliverySlots> {
    let properties = orders_properties()?;
    let clock = LocalClock::at(sys_time()?.as_micros(), properties.utc_offset_minutes);

    let slots = delivery_slots(&properties.window(), &clock, input.day);
    debug!(
        "[get_delivery_slots] {:?} at local hour {}: {} slots",
        input.day,
        clock.hour,
        slots.slots.len()
    );
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    // 2023-11-14T22:13:20Z
    const NOW: i64 = 1_700_000_000_000_000;

    fn hours(slots: &[TimeSlot]) -> Vec<u8> {
        slots.iter().map(|slot| slot.start_hour).collect()
    }

    #[test]
    fn last_slot_of_the_day_is_offered_until_eight_pm() {
        let slots = generate_slots(true, 20);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].display_label, "9 – 10 PM");
        assert_eq!(slots[0].stored_label, "9:00 PM");
    }

    #[test_case(21 ; "nine pm")]
    #[test_case(22 ; "ten pm")]
    #[test_case(23 ; "eleven pm")]
    #[test_case(u8::MAX ; "out of range hour")]
    fn nothing_left_late_in_the_day(current_hour: u8) {
        assert!(generate_slots(true, current_hour).is_empty());
    }

    #[test_case(0)]
    #[test_case(9)]
    #[test_case(22)]
    #[test_case(23)]
    fn future_days_offer_the_full_day(current_hour: u8) {
        let slots = generate_slots(false, current_hour);
        assert_eq!(slots.len(), 15);
        assert_eq!(slots[0].stored_label, "7:00 AM");
        assert_eq!(slots[14].display_label, "9 – 10 PM");
        assert_eq!(hours(&slots), (7..22).collect::<Vec<u8>>());
    }

    #[test]
    fn early_morning_today_matches_a_future_day() {
        for current_hour in 0..6 {
            assert_eq!(
                hours(&generate_slots(true, current_hour)),
                hours(&generate_slots(false, current_hour))
            );
        }
    }

    #[test]
    fn today_starts_the_hour_after_now() {
        let slots = generate_slots(true, 10);
        assert_eq!(hours(&slots), (11..22).collect::<Vec<u8>>());
        assert_eq!(slots[0].display_label, "11 – 12 PM");
        assert_eq!(slots[0].stored_label, "11:00 AM");
    }

    #[test]
    fn stored_labels_convert_back_to_their_start_hour() {
        for current_hour in 0..24 {
            for for_today in [true, false] {
                for slot in generate_slots(for_today, current_hour) {
                    let parsed = TimeSlot::from_stored_label(&slot.stored_label);
                    assert_eq!(parsed.map(|p| p.start_hour), Some(slot.start_hour));
                }
            }
        }
    }

    #[test]
    fn custom_window() {
        let window = DeliveryWindow {
            opens_at: 9,
            closes_at: 18,
        };
        assert_eq!(hours(&bookable_slots(&window, false, 12)), (9..18).collect::<Vec<u8>>());
        assert_eq!(hours(&bookable_slots(&window, true, 15)), vec![16, 17]);
        assert!(bookable_slots(&window, true, 17).is_empty());
    }

    #[test]
    fn local_clock_in_utc() {
        let clock = LocalClock::at(NOW, 0);
        assert_eq!(clock.hour, 22);
        assert_eq!(clock.day_start, 1_699_920_000_000_000);
    }

    #[test]
    fn local_clock_crosses_midnight_with_offset() {
        // 22:13 UTC is 03:43 the next morning at +05:30
        let clock = LocalClock::at(NOW, 330);
        assert_eq!(clock.hour, 3);
        assert_eq!(clock.day_start, 1_699_920_000_000_000 + 86_400_000_000 - 330 * 60_000_000);

        // and 14:13 the same day at -08:00
        let clock = LocalClock::at(NOW, -480);
        assert_eq!(clock.hour, 14);
        assert_eq!(clock.day_start, 1_699_920_000_000_000 + 480 * 60_000_000);
    }

    #[test]
    fn local_clock_before_the_epoch() {
        let clock = LocalClock::at(-1, 0);
        assert_eq!(clock.hour, 23);
        assert_eq!(clock.day_start, -86_400_000_000);
    }

    #[test]
    fn delivery_slots_for_tomorrow() {
        let clock = LocalClock::at(NOW, 0);
        let today = delivery_slots(&DeliveryWindow::default(), &clock, DeliveryDay::Today);
        assert!(today.slots.is_empty());
        assert_eq!(today.date, 1_699_920_000_000_000);

        let tomorrow = delivery_slots(&DeliveryWindow::default(), &clock, DeliveryDay::Tomorrow);
        assert_eq!(tomorrow.slots.len(), 15);
        assert_eq!(tomorrow.date, 1_699_920_000_000_000 + 86_400_000_000);
    }

    #[test]
    fn bookable_checks() {
        // 10:13 UTC
        let clock = LocalClock::at(NOW - 12 * 3_600_000_000, 0);
        let window = DeliveryWindow::default();
        let today = clock.day_start as u64;
        let tomorrow = clock.day_start_after(1) as u64;
        let at = |date: u64, label: &str| ScheduledDelivery {
            date,
            slot_label: label.to_string(),
        };

        assert_eq!(
            check_bookable(&window, &clock, &at(today, "11:00 AM")).map(|s| s.start_hour),
            Ok(11)
        );
        assert!(check_bookable(&window, &clock, &at(today, "10:00 AM")).is_err());
        assert!(check_bookable(&window, &clock, &at(tomorrow, "7:00 AM")).is_ok());
        assert!(check_bookable(&window, &clock, &at(tomorrow, "10:00 PM")).is_err());
        assert!(check_bookable(&window, &clock, &at(tomorrow + 1, "7:00 AM")).is_err());
        let yesterday = clock.day_start_after(-1) as u64;
        assert!(check_bookable(&window, &clock, &at(yesterday, "7:00 AM")).is_err());
        assert!(check_bookable(&window, &clock, &at(tomorrow, "noonish")).is_err());
    }
}
