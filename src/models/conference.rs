// Allow dead code: record fields mirror the API for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// A conference record as served by the catalog API.
///
/// Older records in the catalog predate the venue and design fields, so
/// everything beyond the core identity fields is optional or defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Conference {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "osMap", default, skip_serializing_if = "Option::is_none")]
    pub os_map: Option<VenueMap>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub stakeholders: Vec<Stakeholder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignTheme>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VenueMap {
    #[serde(rename = "addressl1", default)]
    pub address_l1: Option<String>,
    #[serde(rename = "addressl2", default)]
    pub address_l2: Option<String>,
    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Speaker {
    #[serde(rename = "firstname", default)]
    pub first_name: String,
    #[serde(rename = "lastname", default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stakeholder {
    #[serde(rename = "firstname", default)]
    pub first_name: String,
    #[serde(rename = "lastname", default)]
    pub last_name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DesignTheme {
    #[serde(rename = "mainColor", default)]
    pub main_color: Option<String>,
    #[serde(rename = "secondColor", default)]
    pub second_color: Option<String>,
}

impl Conference {
    /// One-line speaker summary for the list table.
    pub fn speakers_display(&self) -> String {
        if self.speakers.is_empty() {
            return "-".to_string();
        }
        self.speakers
            .iter()
            .map(Speaker::full_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn duration_display(&self) -> String {
        self.duration
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("-")
            .to_string()
    }

    /// Single-line venue summary, or None when no address is on record.
    pub fn venue_display(&self) -> Option<String> {
        let map = self.os_map.as_ref()?;
        let parts: Vec<&str> = [
            map.address_l1.as_deref(),
            map.address_l2.as_deref(),
            map.postal_code.as_deref(),
            map.city.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

impl Speaker {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Parse a form line like "Ada Lovelace, Grace Hopper" into speakers.
    /// Entries without both a first and last name are dropped, matching the
    /// submit-time filtering the admin form always applied.
    pub fn parse_list(line: &str) -> Vec<Speaker> {
        line.split(',')
            .filter_map(|entry| {
                let mut words = entry.split_whitespace();
                let first = words.next()?.to_string();
                let last = words.collect::<Vec<_>>().join(" ");
                if last.is_empty() {
                    return None;
                }
                Some(Speaker {
                    first_name: first,
                    last_name: last,
                })
            })
            .collect()
    }
}

impl Stakeholder {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Parse a form line like "Ada Lovelace (CTO), Grace Hopper (Rear Admiral)".
    /// The parenthesized job title is optional; incomplete names are dropped.
    pub fn parse_list(line: &str) -> Vec<Stakeholder> {
        line.split(',')
            .filter_map(|entry| {
                let entry = entry.trim();
                let (name, job) = match entry.split_once('(') {
                    Some((name, rest)) => {
                        let job = rest.trim_end_matches(')').trim();
                        (name.trim(), (!job.is_empty()).then(|| job.to_string()))
                    }
                    None => (entry, None),
                };
                let mut words = name.split_whitespace();
                let first = words.next()?.to_string();
                let last = words.collect::<Vec<_>>().join(" ");
                if last.is_empty() {
                    return None;
                }
                Some(Stakeholder {
                    first_name: first,
                    last_name: last,
                    job,
                    img: None,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r##"{
            "id": "conf-42",
            "title": "RustConf",
            "date": "2025-09-10",
            "description": "The annual one",
            "img": "https://example.org/banner.png",
            "content": "Two days of talks.",
            "duration": "2 days",
            "osMap": {
                "addressl1": "12 Quai de la Loire",
                "addressl2": "",
                "postalCode": "44000",
                "city": "Nantes",
                "coordinates": ["47.21", "-1.55"]
            },
            "speakers": [{"firstname": "Ada", "lastname": "Lovelace"}],
            "stakeholders": [
                {"firstname": "Grace", "lastname": "Hopper", "job": "Rear Admiral", "img": ""}
            ],
            "design": {"mainColor": "#007bff", "secondColor": "#6c757d"}
        }"##;

        let conf: Conference = serde_json::from_str(json).expect("full record should parse");
        assert_eq!(conf.id, "conf-42");
        assert_eq!(conf.speakers.len(), 1);
        assert_eq!(conf.speakers[0].full_name(), "Ada Lovelace");
        assert_eq!(conf.stakeholders[0].job.as_deref(), Some("Rear Admiral"));
        assert_eq!(
            conf.venue_display().as_deref(),
            Some("12 Quai de la Loire, 44000, Nantes")
        );
        assert_eq!(
            conf.design.as_ref().unwrap().main_color.as_deref(),
            Some("#007bff")
        );

        // Round-trip keeps the API field names
        let out = serde_json::to_value(&conf).unwrap();
        assert!(out.get("osMap").is_some());
        assert_eq!(out["speakers"][0]["firstname"], "Ada");
    }

    #[test]
    fn test_parse_sparse_record() {
        let json = r#"{"id": "1", "title": "Legacy", "date": "2019-01-01",
                       "description": "d", "img": "", "content": "c"}"#;
        let conf: Conference = serde_json::from_str(json).expect("sparse record should parse");
        assert!(conf.os_map.is_none());
        assert!(conf.design.is_none());
        assert!(conf.speakers.is_empty());
        assert_eq!(conf.duration_display(), "-");
        assert_eq!(conf.speakers_display(), "-");
        assert!(conf.venue_display().is_none());
    }

    #[test]
    fn test_parse_speaker_list() {
        let speakers = Speaker::parse_list("Ada Lovelace, Grace Hopper, Solo");
        assert_eq!(speakers.len(), 2);
        assert_eq!(speakers[0].first_name, "Ada");
        assert_eq!(speakers[1].last_name, "Hopper");

        assert!(Speaker::parse_list("").is_empty());
        assert!(Speaker::parse_list("  ,  , ").is_empty());
    }

    #[test]
    fn test_parse_stakeholder_list() {
        let list = Stakeholder::parse_list("Ada Lovelace (CTO), Grace Hopper");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].job.as_deref(), Some("CTO"));
        assert!(list[1].job.is_none());
    }
}
