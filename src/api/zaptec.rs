//! [Zaptec](https://api.zaptec.com/help/index.html) cloud API client.

use std::{
    fmt::{Debug, Formatter},
    str::FromStr,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, de};
use serde_with::serde_as;
use ureq::Agent;

use crate::{
    api::client,
    core::session::{ChargingSession, EnergySample},
    prelude::*,
    quantity::energy::KilowattHours,
};

const BASE_URL: &str = "https://api.zaptec.com";

const PAGE_SIZE: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Zaptec rejected the credentials (HTTP {0})")]
    Authentication(u16),

    #[error("Zaptec request failed")]
    Network(#[from] ureq::Error),
}

impl Error {
    fn from_token_request(error: ureq::Error) -> Self {
        match error {
            ureq::Error::StatusCode(status @ (400 | 401 | 403)) => Self::Authentication(status),
            error => Self::Network(error),
        }
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Build the credentials unless either part is blank.
    #[must_use]
    pub fn non_empty(username: String, password: String) -> Option<Self> {
        if username.trim().is_empty() || password.is_empty() {
            None
        } else {
            Some(Self { username, password })
        }
    }
}

pub struct Api {
    client: Agent,
    access_token: String,
}

impl Api {
    /// Exchange the credentials for an access token.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub fn authenticate(credentials: &Credentials) -> Result<Self, Error> {
        info!("authenticating…");
        let client = client::new();
        let response = client
            .post(format!("{BASE_URL}/oauth/token"))
            .send_form([
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .map_err(Error::from_token_request)?
            .body_mut()
            .read_json::<TokenResponse>()?;
        Ok(Self { client, access_token: response.access_token })
    }

    /// Fetch all sessions between the dates, `from` inclusive and `until` exclusive.
    #[instrument(skip_all, fields(from = %from, until = %until))]
    pub fn get_charge_history(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<ChargingSession>, Error> {
        let sessions = collect_pages(|page_index| {
            self.get_charge_history_page(from, until, page_index)
        })?;
        Ok(sessions.into_iter().map(ChargingSession::from).collect())
    }

    fn get_charge_history_page(
        &self,
        from: NaiveDate,
        until: NaiveDate,
        page_index: usize,
    ) -> Result<ChargeHistoryPage, Error> {
        Ok(self
            .client
            .get(format!("{BASE_URL}/api/chargehistory"))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/json")
            .query("From", format_date(from))
            .query("To", format_date(until))
            .query("PageIndex", page_index.to_string())
            .query("PageSize", PAGE_SIZE.to_string())
            .query("DetailLevel", "1")
            .call()?
            .body_mut()
            .read_json::<ChargeHistoryPage>()?)
    }
}

/// Fetch the first page and then the rest of the pages it announces.
fn collect_pages<E>(
    mut get_page: impl FnMut(usize) -> Result<ChargeHistoryPage, E>,
) -> Result<Vec<Session>, E> {
    let mut sessions = Vec::new();
    let mut page_index = 0;
    loop {
        let page = get_page(page_index)?;
        info!(page_index, n_pages = page.n_pages, n_sessions = page.data.len(), "fetched");
        sessions.extend(page.data);
        page_index += 1;
        if page_index >= page.n_pages {
            break;
        }
    }
    Ok(sessions)
}

fn format_date(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN).and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ChargeHistoryPage {
    #[serde(rename = "Pages", default)]
    n_pages: usize,

    #[serde(rename = "Data", default)]
    data: Vec<Session>,
}

#[serde_as]
#[derive(Deserialize)]
struct Session {
    #[serde(rename = "Id")]
    id: String,

    #[serde(rename = "DeviceName", default)]
    device_name: Option<String>,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(rename = "EnergyDetails", default)]
    energy_details: Vec<EnergyDetail>,
}

#[derive(Deserialize)]
struct EnergyDetail {
    #[serde(rename = "Timestamp", deserialize_with = "deserialize_timestamp")]
    timestamp: DateTime<Utc>,

    /// Energy delivered since the previous detail.
    #[serde(rename = "Energy")]
    energy: KilowattHours,
}

impl From<Session> for ChargingSession {
    fn from(session: Session) -> Self {
        let mut samples: Vec<_> = session
            .energy_details
            .into_iter()
            .map(|detail| EnergySample { timestamp: detail.timestamp, energy: detail.energy })
            .collect();
        samples.sort_by_key(|sample| sample.timestamp);
        Self { id: session.id, device_name: session.device_name, samples }
    }
}

/// Zaptec mixes offset and naive timestamps, the latter are in UTC.
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|timestamp| timestamp.to_utc())
        .or_else(|_| NaiveDateTime::from_str(timestamp).map(|timestamp| timestamp.and_utc()))
        .ok()
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let timestamp = String::deserialize(deserializer)?;
    parse_timestamp(&timestamp).ok_or_else(|| {
        de::Error::invalid_value(de::Unexpected::Str(&timestamp), &"an ISO 8601 timestamp")
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_deserialize_charge_history_ok() -> Result {
        // language=json
        let body = r#"{
            "Pages": 1,
            "Data": [
                {
                    "Id": "2f2a1b8c-6a5e-4a3e-9d1b-0c7a1f1b3e11",
                    "DeviceId": "ZAP012345",
                    "StartDateTime": "2023-09-29T22:48:12.913",
                    "EndDateTime": "2023-09-30T01:12:40.2",
                    "Energy": 2.5,
                    "CommitMetadata": 5,
                    "CommitEndDateTime": "2023-09-30T01:12:40.2",
                    "ChargerId": "6c1f0d25-5a4c-4e77-8b9b-5a3c6c1f0d25",
                    "DeviceName": "Garage",
                    "ExternallyEnded": false,
                    "EnergyDetails": [
                        { "Timestamp": "2023-09-30T00:00:00+00:00", "Energy": 1.5 },
                        { "Timestamp": "2023-09-29T23:00:00+00:00", "Energy": 1.0 }
                    ],
                    "SignedSession": "OCMF|{}"
                },
                {
                    "Id": "empty",
                    "EnergyDetails": null
                }
            ]
        }"#;
        let page = serde_json::from_str::<ChargeHistoryPage>(body)?;
        assert_eq!(page.n_pages, 1);
        let sessions: Vec<ChargingSession> =
            page.data.into_iter().map(ChargingSession::from).collect();
        assert_eq!(sessions.len(), 2);

        let session = &sessions[0];
        assert_eq!(session.id, "2f2a1b8c-6a5e-4a3e-9d1b-0c7a1f1b3e11");
        assert_eq!(session.device_name.as_deref(), Some("Garage"));
        assert_eq!(
            session.samples,
            [
                EnergySample {
                    timestamp: Utc.with_ymd_and_hms(2023, 9, 29, 23, 0, 0).unwrap(),
                    energy: KilowattHours(1.0),
                },
                EnergySample {
                    timestamp: Utc.with_ymd_and_hms(2023, 9, 30, 0, 0, 0).unwrap(),
                    energy: KilowattHours(1.5),
                },
            ]
        );
        assert!(sessions[1].samples.is_empty());
        Ok(())
    }

    fn page(n_pages: usize, ids: &[&str]) -> ChargeHistoryPage {
        ChargeHistoryPage {
            n_pages,
            data: ids
                .iter()
                .map(|id| Session {
                    id: (*id).to_string(),
                    device_name: None,
                    energy_details: Vec::new(),
                })
                .collect(),
        }
    }

    /// Returns the collected session IDs and the requested page indices.
    fn collect_ids(pages: Vec<ChargeHistoryPage>) -> (Vec<String>, Vec<usize>) {
        let mut pages = pages.into_iter();
        let mut requested = Vec::new();
        let sessions = collect_pages(|page_index| {
            requested.push(page_index);
            pages.next().ok_or(page_index)
        })
        .unwrap();
        (sessions.into_iter().map(|session| session.id).collect(), requested)
    }

    #[test]
    fn test_collect_pages_without_pages() {
        let (ids, requested) = collect_ids(vec![page(0, &[])]);
        assert!(ids.is_empty());
        assert_eq!(requested, [0]);
    }

    #[test]
    fn test_collect_single_page() {
        let (ids, requested) = collect_ids(vec![page(1, &["a", "b"])]);
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(requested, [0]);
    }

    #[test]
    fn test_collect_multiple_pages() {
        let pages = vec![page(3, &["a", "b"]), page(3, &["c"]), page(3, &["d", "e"])];
        let (ids, requested) = collect_ids(pages);
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
        assert_eq!(requested, [0, 1, 2]);
    }

    #[test]
    fn test_collect_pages_stops_on_error() {
        let mut requested = Vec::new();
        let result = collect_pages(|page_index| {
            requested.push(page_index);
            if page_index == 0 { Ok(page(3, &["a"])) } else { Err("unavailable") }
        });
        assert_eq!(result.err(), Some("unavailable"));
        assert_eq!(requested, [0, 1]);
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2023, 9, 29, 23, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2023-09-29T23:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-09-30T01:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-09-29T23:00:00"), Some(expected));
        assert!(parse_timestamp("2023-09-29T23:00:00.5").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        assert_eq!(format_date(date), "2023-09-01T00:00:00Z");
    }

    #[test]
    fn test_authentication_error() {
        assert!(matches!(
            Error::from_token_request(ureq::Error::StatusCode(400)),
            Error::Authentication(400)
        ));
        assert!(matches!(
            Error::from_token_request(ureq::Error::StatusCode(503)),
            Error::Network(ureq::Error::StatusCode(503))
        ));
    }

    #[test]
    fn test_credentials_redacted() {
        let credentials = Credentials::non_empty("user".into(), "hunter2".into()).unwrap();
        assert!(!format!("{credentials:?}").contains("hunter2"));
        assert!(Credentials::non_empty(" ".into(), "hunter2".into()).is_none());
        assert!(Credentials::non_empty("user".into(), String::new()).is_none());
    }

    #[test]
    #[ignore = "makes the API request"]
    fn test_get_charge_history_ok() -> Result {
        let credentials = Credentials::non_empty(
            std::env::var("ZAPTEC_USERNAME")?,
            std::env::var("ZAPTEC_PASSWORD")?,
        )
        .context("credentials are blank")?;
        let until = Utc::now().date_naive();
        let sessions = Api::authenticate(&credentials)?
            .get_charge_history(until - chrono::Days::new(30), until)?;
        for session in &sessions {
            assert!(session.samples.iter().is_sorted_by_key(|sample| sample.timestamp));
        }
        Ok(())
    }
}
