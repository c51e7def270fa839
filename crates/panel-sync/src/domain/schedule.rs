//! Schedule Entity
//!
//! Weekly collection slot for one barangay.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::CollectionKind;
use super::list_item::ListItem;
use super::record::Record;
use crate::error::{ConsoleError, ConsoleResult};

/// Collection day, stored by full English name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn parse(s: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// A collection slot: `timeF`..`timeT` on `day` in `barangay`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub note: String,
    /// Area served
    pub barangay: String,
    pub day: Day,
    #[serde(rename = "timeF", with = "hhmm")]
    pub time_from: NaiveTime,
    #[serde(rename = "timeT", with = "hhmm")]
    pub time_to: NaiveTime,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Record for Schedule {
    const KIND: CollectionKind = CollectionKind::Schedules;

    fn validate(&self) -> ConsoleResult<()> {
        if self.barangay.trim().is_empty() {
            return Err(ConsoleError::invalid("schedule area is empty"));
        }
        if self.time_from >= self.time_to {
            return Err(ConsoleError::invalid(format!(
                "schedule ends before it starts ({} - {})",
                self.time_from.format("%H:%M"),
                self.time_to.format("%H:%M")
            )));
        }
        Ok(())
    }
}

/// Group schedule items by weekday, Monday first.
///
/// Items keep their list order within a day; items that do not decode as a
/// schedule are skipped. Days without items are omitted.
pub fn group_by_day(items: &[ListItem]) -> Vec<(Day, Vec<ListItem>)> {
    let mut groups: Vec<(Day, Vec<ListItem>)> = Day::ALL.iter().map(|d| (*d, Vec::new())).collect();
    for item in items {
        match Schedule::from_item(item) {
            Ok(schedule) => {
                let slot = Day::ALL.iter().position(|d| *d == schedule.day).unwrap_or(0);
                groups[slot].1.push(item.clone());
            }
            Err(e) => tracing::debug!(item = %item.id, error = %e, "skipping undecodable schedule"),
        }
    }
    groups.retain(|(_, items)| !items.is_empty());
    groups
}

/// `HH:MM` wire format used by the time inputs (seconds accepted on read)
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule_item(id: &str, day: &str) -> ListItem {
        let payload = json!({
            "note": "Trash Day",
            "barangay": "Poblacion",
            "day": day,
            "timeF": "08:00",
            "timeT": "10:30",
        });
        ListItem::new(id, payload.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_schedule_wire_shape() {
        let item = schedule_item("s1", "Tuesday");
        let schedule = Schedule::from_item(&item).expect("decode");
        assert_eq!(schedule.day, Day::Tuesday);
        assert_eq!(schedule.time_from, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        let payload = schedule.to_payload().expect("encode");
        assert_eq!(payload["timeT"], json!("10:30"));
        assert_eq!(payload["day"], json!("Tuesday"));
        assert!(!payload.contains_key("addedAt"));
    }

    #[test]
    fn test_schedule_rejects_inverted_range() {
        let mut schedule = Schedule::from_item(&schedule_item("s1", "Monday")).unwrap();
        schedule.time_to = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        let err = schedule.validate().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_unknown_day_does_not_decode() {
        let item = schedule_item("s1", "Someday");
        assert!(Schedule::from_item(&item).is_err());
        assert_eq!(Day::parse("friday"), Some(Day::Friday));
    }

    #[test]
    fn test_group_by_day() {
        let items = vec![
            schedule_item("a", "Wednesday"),
            schedule_item("b", "Monday"),
            schedule_item("c", "Wednesday"),
            schedule_item("bad", "Someday"),
        ];

        let groups = group_by_day(&items);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Day::Monday);
        assert_eq!(groups[1].0, Day::Wednesday);
        let ids: Vec<_> = groups[1].1.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
