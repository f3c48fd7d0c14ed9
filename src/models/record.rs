use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Pomodoro => "pomodoro",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }
}

/// One completed phase: this user spent N minutes on subject S in phase
/// type T, ending at time X. Never mutated after creation; owned by the
/// session store thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub duration_minutes: f64,
    pub session_type: SessionType,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn records_serialize_camel_case() {
        let record = StudyRecord {
            id: "r1".into(),
            user_id: "u1".into(),
            subject: "Math".into(),
            duration_minutes: 25.0,
            session_type: SessionType::ShortBreak,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["durationMinutes"], 25.0);
        assert_eq!(value["sessionType"], "shortBreak");

        let back: StudyRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.session_type, SessionType::ShortBreak);
        assert_eq!(back.timestamp, record.timestamp);
    }
}
