//! Weekly availability plan.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ListingError, ListingResult};

pub const PLAN_TYPE_DAY: &str = "availability-plan/day";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    pub fn of(date: NaiveDate) -> Self {
        DayOfWeek::from(date.weekday())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Mon,
            Weekday::Tue => DayOfWeek::Tue,
            Weekday::Wed => DayOfWeek::Wed,
            Weekday::Thu => DayOfWeek::Thu,
            Weekday::Fri => DayOfWeek::Fri,
            Weekday::Sat => DayOfWeek::Sat,
            Weekday::Sun => DayOfWeek::Sun,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
            DayOfWeek::Sun => "sun",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub day_of_week: DayOfWeek,
    pub seats: u32,
}

/// Raw wire shape, validated into [`AvailabilityPlan`].
#[derive(Debug, Serialize, Deserialize)]
struct RawPlan {
    #[serde(rename = "type")]
    plan_type: String,
    entries: Vec<PlanEntry>,
}

/// Day-based availability plan: exactly one entry per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan", into = "RawPlan")]
pub struct AvailabilityPlan {
    // Indexed by weekday, Monday first.
    seats: [u32; 7],
}

impl AvailabilityPlan {
    /// Build a plan, rejecting missing or duplicated weekdays.
    pub fn new(entries: &[PlanEntry]) -> ListingResult<Self> {
        let mut seats: [Option<u32>; 7] = [None; 7];

        for entry in entries {
            let slot = &mut seats[Self::index(entry.day_of_week)];
            if slot.is_some() {
                return Err(ListingError::InvalidPlan(format!(
                    "duplicate entry for '{}'",
                    entry.day_of_week
                )));
            }
            *slot = Some(entry.seats);
        }

        let mut resolved = [0; 7];
        for (i, day) in DayOfWeek::ALL.iter().enumerate() {
            resolved[i] = seats[i]
                .ok_or_else(|| ListingError::InvalidPlan(format!("missing entry for '{day}'")))?;
        }

        Ok(AvailabilityPlan { seats: resolved })
    }

    /// The same seat count on every weekday.
    pub fn every_day(seats: u32) -> Self {
        AvailabilityPlan { seats: [seats; 7] }
    }

    pub fn entries(&self) -> Vec<PlanEntry> {
        DayOfWeek::ALL
            .iter()
            .map(|&day_of_week| PlanEntry {
                day_of_week,
                seats: self.seats_for(day_of_week),
            })
            .collect()
    }

    pub fn seats_for(&self, day: DayOfWeek) -> u32 {
        self.seats[Self::index(day)]
    }

    /// Seats the plan offers on the weekday of `date`.
    pub fn seats_on(&self, date: NaiveDate) -> u32 {
        self.seats_for(DayOfWeek::of(date))
    }

    fn index(day: DayOfWeek) -> usize {
        day as usize
    }
}

impl Default for AvailabilityPlan {
    /// Every night available with a single seat.
    fn default() -> Self {
        AvailabilityPlan::every_day(1)
    }
}

impl TryFrom<RawPlan> for AvailabilityPlan {
    type Error = ListingError;

    fn try_from(raw: RawPlan) -> Result<Self, Self::Error> {
        if raw.plan_type != PLAN_TYPE_DAY {
            return Err(ListingError::InvalidPlan(format!(
                "unsupported plan type '{}'",
                raw.plan_type
            )));
        }
        AvailabilityPlan::new(&raw.entries)
    }
}

impl From<AvailabilityPlan> for RawPlan {
    fn from(plan: AvailabilityPlan) -> Self {
        RawPlan {
            plan_type: PLAN_TYPE_DAY.to_string(),
            entries: plan.entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(seats: u32) -> Vec<PlanEntry> {
        DayOfWeek::ALL
            .iter()
            .map(|&day_of_week| PlanEntry { day_of_week, seats })
            .collect()
    }

    #[test]
    fn test_plan_from_complete_entries() {
        let mut entries = entries(1);
        entries[5].seats = 0; // saturday
        let plan = AvailabilityPlan::new(&entries).unwrap();

        assert_eq!(plan.seats_for(DayOfWeek::Sat), 0);
        assert_eq!(plan.seats_for(DayOfWeek::Sun), 1);
    }

    #[test]
    fn test_plan_rejects_duplicate_weekday() {
        let mut entries = entries(1);
        entries[1].day_of_week = DayOfWeek::Mon;

        let err = AvailabilityPlan::new(&entries).unwrap_err();
        assert!(err.to_string().contains("duplicate entry for 'mon'"));
    }

    #[test]
    fn test_plan_rejects_missing_weekday() {
        let entries = entries(1)[..6].to_vec();
        let err = AvailabilityPlan::new(&entries).unwrap_err();
        assert!(err.to_string().contains("missing entry for 'sun'"));
    }

    #[test]
    fn test_seats_on_uses_weekday() {
        let mut entries = entries(1);
        entries[0].seats = 4;
        let plan = AvailabilityPlan::new(&entries).unwrap();

        // 2024-03-11 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert_eq!(plan.seats_on(monday), 4);
        assert_eq!(plan.seats_on(monday.succ_opt().unwrap()), 1);
    }

    #[test]
    fn test_plan_json_shape() {
        let json = serde_json::to_value(AvailabilityPlan::default()).unwrap();
        assert_eq!(json["type"], "availability-plan/day");
        assert_eq!(json["entries"][0]["dayOfWeek"], "mon");
        assert_eq!(json["entries"][0]["seats"], 1);

        let parsed: AvailabilityPlan = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, AvailabilityPlan::default());
    }

    #[test]
    fn test_plan_json_rejects_unknown_type() {
        let json = serde_json::json!({ "type": "availability-plan/time", "entries": [] });
        assert!(serde_json::from_value::<AvailabilityPlan>(json).is_err());
    }
}
