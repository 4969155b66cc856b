//! Restaurant Model

use super::serde_helpers;
use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Restaurant ID type
pub type RestaurantId = RecordId;

/// Opening hours for one weekday. Both ends present, open strictly
/// before close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayHours {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time < self.close
    }
}

/// Weekly opening hours; `None` means closed that day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub sunday: Option<DayHours>,
    pub monday: Option<DayHours>,
    pub tuesday: Option<DayHours>,
    pub wednesday: Option<DayHours>,
    pub thursday: Option<DayHours>,
    pub friday: Option<DayHours>,
    pub saturday: Option<DayHours>,
}

impl WeeklyHours {
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&DayHours> {
        match weekday {
            Weekday::Sun => self.sunday.as_ref(),
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
        }
    }

    fn days(&self) -> [(&'static str, Option<&DayHours>); 7] {
        [
            ("Sunday", self.sunday.as_ref()),
            ("Monday", self.monday.as_ref()),
            ("Tuesday", self.tuesday.as_ref()),
            ("Wednesday", self.wednesday.as_ref()),
            ("Thursday", self.thursday.as_ref()),
            ("Friday", self.friday.as_ref()),
            ("Saturday", self.saturday.as_ref()),
        ]
    }

    /// Each open day must have open < close.
    pub fn validate(&self) -> Result<(), String> {
        for (day, hours) in self.days() {
            if let Some(h) = hours
                && h.open >= h.close
            {
                return Err(format!(
                    "{day}'s opening hour must be earlier than its closing hour"
                ));
            }
        }
        Ok(())
    }

    /// Human-readable per-day hours ("5:00 PM to 10:00 PM" / "closed").
    pub fn display_lines(&self) -> Vec<(String, String)> {
        self.days()
            .iter()
            .map(|(day, hours)| {
                let text = match hours {
                    Some(h) => format!(
                        "{} to {}",
                        format_ampm(h.open),
                        format_ampm(h.close)
                    ),
                    None => "closed".to_string(),
                };
                (day.to_string(), text)
            })
            .collect()
    }
}

fn format_ampm(time: NaiveTime) -> String {
    time.format("%I:%M %p")
        .to_string()
        .trim_start_matches('0')
        .to_string()
}

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RestaurantId>,
    pub name: String,
    pub description: String,
    /// Owning staff account
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,
    pub address: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default)]
    pub hours: WeeklyHours,
}

/// Create restaurant payload (registered together with a staff account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default)]
    pub hours: WeeklyHours,
}

/// Update restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<WeeklyHours>,
}
