// ABOUTME: Blog entry model and its serialization to the AtomPub request document
// ABOUTME: Resolves publish timestamps against the fixed UTC+9 publishing offset

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::xml::{APP_NAMESPACE, ATOM_NAMESPACE};

/// Offset of the publishing timezone (JST), in seconds east of UTC
pub const PUBLISHING_UTC_OFFSET_SECS: i32 = 9 * 3600;

pub const MARKDOWN_CONTENT_TYPE: &str = "text/x-markdown";

pub fn publishing_offset() -> FixedOffset {
    FixedOffset::east_opt(PUBLISHING_UTC_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// A publish time as supplied by the caller, with or without an offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Wall-clock time in the publishing timezone
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Pin the timestamp to an offset; naive values are read as UTC+9.
    /// Fails when the value has no UTC equivalent in chrono's range.
    pub fn resolve(&self) -> Result<DateTime<FixedOffset>> {
        match self {
            Timestamp::Zoned(dt) => Ok(*dt),
            Timestamp::Naive(naive) => {
                let offset = publishing_offset();
                naive
                    .checked_sub_offset(offset)
                    .map(|utc| DateTime::from_naive_utc_and_offset(utc, offset))
                    .ok_or_else(|| Error::Timestamp {
                        value: naive.to_string(),
                        source: None,
                    })
            }
        }
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Accepts RFC 3339, or `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]`
    /// without an offset.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp::Zoned(dt));
        }

        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .map(Timestamp::Naive)
            .map_err(|source| Error::Timestamp {
                value: s.to_string(),
                source: Some(source),
            })
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Timestamp::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::Zoned(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Zoned(dt.into())
    }
}

/// ISO 8601 with offset; fractional seconds only when present
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogEntry {
    pub title: String,
    /// Markdown body
    pub content: String,
    pub categories: Vec<String>,
    /// Appended after `categories`
    pub preset_categories: Vec<String>,
    /// `None` leaves the author to the service (the account's own id)
    pub author: Option<String>,
    /// `None` publishes at the current time
    pub updated: Option<Timestamp>,
    pub is_draft: bool,
}

impl BlogEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Categories in posting order: own categories, then presets
    pub fn all_categories(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .chain(self.preset_categories.iter())
            .map(String::as_str)
    }

    /// Publish time with the timezone rules applied
    pub fn updated_at(&self) -> Result<DateTime<FixedOffset>> {
        match &self.updated {
            Some(timestamp) => timestamp.resolve(),
            None => Ok(Utc::now().with_timezone(&publishing_offset())),
        }
    }

    /// Serialize to the Atom entry document the service accepts
    pub fn to_xml(&self) -> Result<String> {
        let updated = format_timestamp(&self.updated_at()?);
        let mut writer = Writer::new(Vec::new());

        write_event(
            &mut writer,
            Event::Start(
                BytesStart::new("entry")
                    .with_attributes([("xmlns", ATOM_NAMESPACE), ("xmlns:app", APP_NAMESPACE)]),
            ),
        )?;
        write_text_element(&mut writer, "title", &[], &self.title)?;
        write_text_element(&mut writer, "updated", &[], &updated)?;

        write_event(&mut writer, Event::Start(BytesStart::new("author")))?;
        let author = self.author.as_deref().unwrap_or_default();
        write_text_element(&mut writer, "name", &[], author)?;
        write_event(&mut writer, Event::End(BytesEnd::new("author")))?;

        write_text_element(
            &mut writer,
            "content",
            &[("type", MARKDOWN_CONTENT_TYPE)],
            &self.content,
        )?;

        write_event(&mut writer, Event::Start(BytesStart::new("app:control")))?;
        write_text_element(&mut writer, "app:draft", &[], yes_no(self.is_draft))?;
        // preview mode is not exposed
        write_text_element(&mut writer, "app:preview", &[], yes_no(false))?;
        write_event(&mut writer, Event::End(BytesEnd::new("app:control")))?;

        for category in self.all_categories() {
            write_event(
                &mut writer,
                Event::Empty(BytesStart::new("category").with_attributes([("term", category)])),
            )?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new("entry")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| Error::Serialize(e.to_string()))
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Serialize(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    write_event(
        writer,
        Event::Start(BytesStart::new(name).with_attributes(attributes.iter().copied())),
    )?;
    if !text.is_empty() {
        write_event(writer, Event::Text(BytesText::new(text)))?;
    }
    write_event(writer, Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_naive_timestamp_uses_publishing_offset() {
        let ts = Timestamp::Naive(naive(2024, 1, 1, 0));
        assert_eq!(format_timestamp(&ts.resolve().unwrap()), "2024-01-01T00:00:00+09:00");
    }

    #[test]
    fn test_zoned_timestamp_keeps_offset() {
        let ts: Timestamp = "2024-06-01T12:30:00-05:00".parse().unwrap();
        assert_eq!(format_timestamp(&ts.resolve().unwrap()), "2024-06-01T12:30:00-05:00");

        let utc: Timestamp = "2024-06-01T12:30:00Z".parse().unwrap();
        assert_eq!(format_timestamp(&utc.resolve().unwrap()), "2024-06-01T12:30:00+00:00");
    }

    #[test]
    fn test_timestamp_from_str_variants() {
        assert_eq!(
            "2024-01-01T09:00:00".parse::<Timestamp>().unwrap(),
            Timestamp::Naive(naive(2024, 1, 1, 9))
        );
        assert_eq!(
            "2024-01-01 09:00:00".parse::<Timestamp>().unwrap(),
            Timestamp::Naive(naive(2024, 1, 1, 9))
        );
        assert!(matches!(
            "next tuesday".parse::<Timestamp>(),
            Err(Error::Timestamp { .. })
        ));
    }

    #[test]
    fn test_fractional_seconds_survive() {
        let ts: Timestamp = "2024-01-01T00:00:00.250+09:00".parse().unwrap();
        assert_eq!(format_timestamp(&ts.resolve().unwrap()), "2024-01-01T00:00:00.250+09:00");
    }

    #[test]
    fn test_to_xml_element_order() {
        let mut entry = BlogEntry::new("Title", "Body");
        entry.updated = Some(Timestamp::Naive(naive(2024, 1, 1, 0)));
        entry.categories = vec!["A".to_string()];

        let xml = entry.to_xml().unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:app="http://www.w3.org/2007/app">"#,
                "<title>Title</title>",
                "<updated>2024-01-01T00:00:00+09:00</updated>",
                "<author><name></name></author>",
                r#"<content type="text/x-markdown">Body</content>"#,
                "<app:control><app:draft>no</app:draft><app:preview>no</app:preview></app:control>",
                r#"<category term="A"/>"#,
                "</entry>"
            )
        );
    }

    #[test]
    fn test_to_xml_escapes_markup() {
        let mut entry = BlogEntry::new("a < b", "x & y");
        entry.categories = vec![r#"say "hi""#.to_string()];
        let xml = entry.to_xml().unwrap();
        assert!(xml.contains("<title>a &lt; b</title>"));
        assert!(xml.contains("x &amp; y"));
        assert!(xml.contains(r#"term="say &quot;hi&quot;""#));
    }
}
