use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::EntityId;

/// TV source types a user can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TvType {
    Free,
    Sky,
    Premium,
}

impl Display for TvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TvType::Free => "free",
            TvType::Sky => "sky",
            TvType::Premium => "premium",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TvType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(TvType::Free),
            "sky" => Ok(TvType::Sky),
            "premium" => Ok(TvType::Premium),
            other => Err(AppError::InvalidInput(format!(
                "{} is not a TV source type",
                other
            ))),
        }
    }
}

/// Day selector for schedule lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Today,
    Tomorrow,
    Future,
}

impl Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Day::Today => "today",
            Day::Tomorrow => "tomorrow",
            Day::Future => "future",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Day {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Day::Today),
            "tomorrow" => Ok(Day::Tomorrow),
            "future" => Ok(Day::Future),
            other => Err(AppError::InvalidInput(format!("{} is not a day", other))),
        }
    }
}

/// One slot of the broadcast schedule, as supplied by the schedule source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSlot {
    pub channel: String,
    /// Broadcast start, "HH:MM"
    pub time: String,
    pub title: Option<String>,
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub movie_url: Option<String>,
}

impl BroadcastSlot {
    /// Minutes since midnight, used for tie-breaking; unparsable times
    /// sort after every valid one.
    pub fn time_minutes(&self) -> Option<u32> {
        let (hours, minutes) = self.time.split_once(':')?;
        let hours: u32 = hours.parse().ok()?;
        let minutes: u32 = minutes.parse().ok()?;
        if hours < 24 && minutes < 60 {
            Some(hours * 60 + minutes)
        } else {
            None
        }
    }

    /// Title used for lexicographic tie-breaking
    pub fn sort_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.original_title.as_deref())
            .unwrap_or("")
    }
}

/// One ranked recommendation tied to a specific broadcast slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    #[serde(rename = "idIMDB")]
    pub id_imdb: EntityId,
    pub original_title: Option<String>,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub channel: String,
    pub channel_number: Option<u16>,
    pub time: String,
    pub run_times: Option<String>,
    pub simple_plot: Option<String>,
}

/// Logical channel number for one-tap tuning on the client
pub fn channel_number(channel: &str) -> Option<u16> {
    let number = match channel {
        "Rai 1" => 1,
        "Rai 2" => 2,
        "Rai 3" => 3,
        "Rete 4" => 4,
        "Canale 5" => 5,
        "Italia 1" => 6,
        "La7" => 7,
        "TV8" => 8,
        "Nove" => 9,
        "Rai 4" => 21,
        "Iris" => 22,
        "Rai Movie" => 24,
        "Rai Premium" => 25,
        "Cielo" => 26,
        "Paramount Channel" => 27,
        "La5" => 30,
        _ => return None,
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(time: &str, title: &str) -> BroadcastSlot {
        BroadcastSlot {
            channel: "Rai 1".to_string(),
            time: time.to_string(),
            title: Some(title.to_string()),
            original_title: None,
            year: None,
            genres: vec![],
            director: None,
            cast: vec![],
            movie_url: None,
        }
    }

    #[test]
    fn parses_broadcast_times() {
        assert_eq!(slot("21:15", "x").time_minutes(), Some(21 * 60 + 15));
        assert_eq!(slot("00:00", "x").time_minutes(), Some(0));
        assert_eq!(slot("24:00", "x").time_minutes(), None);
        assert_eq!(slot("prime time", "x").time_minutes(), None);
    }

    #[test]
    fn tv_type_round_trips() {
        for tv in [TvType::Free, TvType::Sky, TvType::Premium] {
            assert_eq!(tv.to_string().parse::<TvType>().unwrap(), tv);
        }
        assert!("cable".parse::<TvType>().is_err());
    }

    #[test]
    fn known_channels_have_numbers() {
        assert_eq!(channel_number("Rai 1"), Some(1));
        assert_eq!(channel_number("Canale 5"), Some(5));
        assert_eq!(channel_number("Some Local Channel"), None);
    }

    #[test]
    fn slot_deserializes_from_schedule_payload() {
        let json = r#"{
            "channel": "Rai 3",
            "time": "21:20",
            "title": "Il sorpasso",
            "originalTitle": null,
            "year": 1962,
            "genres": ["Comedy", "Drama"],
            "director": "Dino Risi",
            "cast": ["Vittorio Gassman", "Jean-Louis Trintignant"],
            "movieUrl": "http://example.com/il-sorpasso"
        }"#;
        let slot: BroadcastSlot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.channel, "Rai 3");
        assert_eq!(slot.genres.len(), 2);
        assert_eq!(slot.sort_title(), "Il sorpasso");
    }
}
