use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

pub const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleDateTime(String);

impl GoogleDateTime {
    pub fn from_timestamp_millis(timestamp: i64) -> Self {
        let datetime_str = Utc
            .timestamp_millis_opt(timestamp)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
            .to_rfc3339();
        Self(datetime_str)
    }

    pub fn get_timestamp_millis(&self) -> i64 {
        DateTime::parse_from_rfc3339(&self.0)
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEventDateTime {
    #[serde(default)]
    pub date_time: Option<GoogleDateTime>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl GoogleCalendarEventDateTime {
    pub fn new(date_time_millis: i64) -> Self {
        Self {
            date_time: Some(GoogleDateTime::from_timestamp_millis(date_time_millis)),
            time_zone: Some(String::from("UTC")),
        }
    }

    pub fn get_timestamp_millis(&self) -> i64 {
        self.date_time
            .as_ref()
            .map(|dt| dt.get_timestamp_millis())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEvent {
    // All-day occurrences carry a date instead of a dateTime and cancelled
    // occurrences can come without a summary, so everything except start
    // and end is defaulted
    #[serde(default)]
    pub id: String,
    pub start: GoogleCalendarEventDateTime,
    pub end: GoogleCalendarEventDateTime,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCalendarEventAttributes {
    pub start: GoogleCalendarEventDateTime,
    pub end: GoogleCalendarEventDateTime,
    pub summary: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsResponse {
    // Google leaves `items` out entirely when the window is empty
    #[serde(default)]
    pub items: Vec<GoogleCalendarEvent>,
}

pub struct GoogleCalendarRestApi {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarRestApi {
    pub fn new(access_token: String, base_url: String) -> Self {
        let client = Client::new();

        Self {
            client,
            access_token,
            base_url,
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: String,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        match self
            .client
            .get(&format!("{}/{}", self.base_url, path))
            .query(query)
            .header("authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
        {
            Ok(res) => res.json::<T>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Google Calendar API GET error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!(
                    "[Network Error] Google Calendar API GET error. Error message: {:?}",
                    e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        body: &impl Serialize,
        path: String,
    ) -> anyhow::Result<T> {
        match self
            .client
            .post(&format!("{}/{}", self.base_url, path))
            .header("authorization", format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await
        {
            Ok(res) => res.json::<T>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!(
                    "[Network Error] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }

    /// Single, time-ordered occurrences of the primary calendar starting
    /// inside `[time_min, time_max)`
    pub async fn list_events(
        &self,
        time_min: i64,
        time_max: i64,
    ) -> anyhow::Result<ListEventsResponse> {
        let query = [
            ("timeMin", GoogleDateTime::from_timestamp_millis(time_min).0),
            ("timeMax", GoogleDateTime::from_timestamp_millis(time_max).0),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        self.get("calendars/primary/events".into(), &query).await
    }

    pub async fn insert(
        &self,
        body: &GoogleCalendarEventAttributes,
    ) -> anyhow::Result<GoogleCalendarEvent> {
        self.post(body, "calendars/primary/events".into()).await
    }
}
