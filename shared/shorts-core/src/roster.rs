//! Roster and group CSV records

use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One performer row of the idol roster CSV
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterRecord {
    #[serde(rename = "name (english)")]
    pub name_en: String,

    #[serde(rename = "name (korean)")]
    pub name_ko: String,

    #[serde(rename = "group (english)")]
    pub group_en: String,

    #[serde(rename = "group (korean)")]
    pub group_ko: String,
}

impl RosterRecord {
    pub fn new(name_en: &str, name_ko: &str, group_en: &str, group_ko: &str) -> Self {
        Self {
            name_en: name_en.to_string(),
            name_ko: name_ko.to_string(),
            group_en: group_en.to_string(),
            group_ko: group_ko.to_string(),
        }
    }

    /// Canonical group identifier (lower-cased english group name)
    pub fn group_id(&self) -> String {
        self.group_en.to_lowercase()
    }

    /// Read roster rows from CSV with a header line
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Self>> {
        read_records(reader)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }
}

/// One group row of the group CSV (channel and wiki lookups)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRecord {
    #[serde(rename = "group (english)")]
    pub english: String,

    #[serde(rename = "group (korean)")]
    pub korean: String,

    /// Alternative english name, used as a wiki fallback
    #[serde(rename = "group (alternative)", default)]
    pub alternative: Option<String>,

    /// Channel handle or URL
    #[serde(alias = "youtube channel", default)]
    pub youtube: Option<String>,

    #[serde(rename = "channel id", alias = "Channel ID", alias = "channel_id", default)]
    pub channel_id: Option<String>,
}

impl GroupRecord {
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Self>> {
        let mut records: Vec<Self> = read_records(reader)?;
        // Empty cells come through as Some("")
        for record in &mut records {
            for field in [&mut record.alternative, &mut record.youtube, &mut record.channel_id] {
                if field.as_deref().map_or(false, |v| v.trim().is_empty()) {
                    *field = None;
                }
            }
        }
        Ok(records)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Write group rows back as CSV with the canonical header
    pub fn write_all<W: std::io::Write>(records: &[Self], writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_from_csv() {
        let csv = "name (english),name (korean),group (english),group (korean)\n\
                   Karina,카리나,aespa,에스파\n\
                   Yeji,예지,ITZY,있지\n";
        let rows = RosterRecord::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RosterRecord::new("Karina", "카리나", "aespa", "에스파"));
        assert_eq!(rows[1].group_id(), "itzy");
    }

    #[test]
    fn test_roster_missing_column_is_error() {
        let csv = "name (english),group (english)\nKarina,aespa\n";
        assert!(RosterRecord::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_group_csv_optional_columns() {
        let csv = "group (english),group (korean),youtube,Channel ID\n\
                   aespa,에스파,@aespa,UCEf_Bc-KVd7onSeifS3py9g\n\
                   ITZY,있지,,\n";
        let rows = GroupRecord::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(rows[0].youtube.as_deref(), Some("@aespa"));
        assert_eq!(rows[0].channel_id.as_deref(), Some("UCEf_Bc-KVd7onSeifS3py9g"));
        assert_eq!(rows[0].alternative, None);
        assert_eq!(rows[1].youtube, None);
        assert_eq!(rows[1].channel_id, None);
    }

    #[test]
    fn test_group_csv_write_keeps_header() {
        let rows = vec![GroupRecord {
            english: "aespa".to_string(),
            korean: "에스파".to_string(),
            alternative: None,
            youtube: Some("@aespa".to_string()),
            channel_id: Some("UC123".to_string()),
        }];
        let mut out = Vec::new();
        GroupRecord::write_all(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("group (english),group (korean),group (alternative),youtube,channel id"));
        assert_eq!(GroupRecord::from_reader(text.as_bytes()).unwrap(), rows);
    }
}
