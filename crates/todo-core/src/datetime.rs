use std::fmt::Display;

use chrono::{
  DateTime,
  FixedOffset,
  Local,
  NaiveDate,
  NaiveDateTime,
  TimeZone
};
use tracing::debug;

const LOCAL_DATETIME_FORMATS: [&str; 4] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M"
];
const OFFSET_DATETIME_FORMATS: [&str; 2] = [
  "%Y-%m-%d %H:%M:%S%.f%:z",
  "%Y-%m-%d %H:%M:%S%.f%#z"
];
const TIME_FORMAT: &str = "%-I:%M %p";
const DATE_FORMAT: &str = "%m/%d/%Y";

/// A creation timestamp as handed to the
/// row: already parsed, or still the text
/// the API sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedAt {
  Parsed(DateTime<FixedOffset>),
  Text(String)
}

impl From<&str> for CreatedAt {
  fn from(text: &str) -> Self {
    CreatedAt::Text(text.to_string())
  }
}

impl From<DateTime<FixedOffset>>
  for CreatedAt
{
  fn from(
    value: DateTime<FixedOffset>
  ) -> Self {
    CreatedAt::Parsed(value)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DateParseError {
  #[error("empty date text")]
  Empty,
  #[error("unrecognised date text: {0:?}")]
  Unrecognised(String),
  #[error(
    "local time {0} does not exist in the \
     current timezone"
  )]
  NonexistentLocalTime(NaiveDateTime)
}

/// Parses ISO-8601 text. Text without an
/// offset is read as wall-clock time in
/// `tz`; a bare date is midnight.
pub fn parse_iso<Tz: TimeZone>(
  text: &str,
  tz: &Tz
) -> Result<DateTime<Tz>, DateParseError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(DateParseError::Empty);
  }

  if let Ok(parsed) =
    DateTime::parse_from_rfc3339(text)
  {
    return Ok(parsed.with_timezone(tz));
  }

  for format in OFFSET_DATETIME_FORMATS {
    if let Ok(parsed) =
      DateTime::parse_from_str(text, format)
    {
      return Ok(parsed.with_timezone(tz));
    }
  }

  let naive = LOCAL_DATETIME_FORMATS
    .iter()
    .find_map(|format| {
      NaiveDateTime::parse_from_str(
        text, format
      )
      .ok()
    })
    .or_else(|| {
      NaiveDate::parse_from_str(
        text, "%Y-%m-%d"
      )
      .ok()
      .and_then(|date| {
        date.and_hms_opt(0, 0, 0)
      })
    })
    .ok_or_else(|| {
      DateParseError::Unrecognised(
        text.to_string()
      )
    })?;

  tz.from_local_datetime(&naive)
    .earliest()
    .ok_or(
      DateParseError::NonexistentLocalTime(
        naive
      )
    )
}

/// Describes `date` relative to `base`:
/// `today at 3:04 PM`, `yesterday at ...`,
/// `last Monday at ...`, `Friday at ...`,
/// or `MM/DD/YYYY` beyond a week either way.
pub fn format_relative<Tz>(
  date: &DateTime<Tz>,
  base: &DateTime<Tz>
) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display
{
  let date =
    date.with_timezone(&base.timezone());
  let days = (date.date_naive()
    - base.date_naive())
  .num_days();
  let time =
    date.format(TIME_FORMAT).to_string();

  match days {
    | -6..=-2 => {
      format!(
        "last {} at {time}",
        date.format("%A")
      )
    }
    | -1 => format!("yesterday at {time}"),
    | 0 => format!("today at {time}"),
    | 1 => format!("tomorrow at {time}"),
    | 2..=6 => {
      format!(
        "{} at {time}",
        date.format("%A")
      )
    }
    | _ => {
      date.format(DATE_FORMAT).to_string()
    }
  }
}

/// Renders a creation timestamp relative to
/// `now`, or `fallback` when the text is not
/// a date.
pub fn format_created_at<Tz>(
  created: &CreatedAt,
  now: &DateTime<Tz>,
  fallback: &str
) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display
{
  let parsed = match created {
    | CreatedAt::Parsed(value) => {
      Ok(value.with_timezone(&now.timezone()))
    }
    | CreatedAt::Text(text) => {
      parse_iso(text, &now.timezone())
    }
  };

  match parsed {
    | Ok(date) => format_relative(&date, now),
    | Err(err) => {
      debug!(error = %err, "falling back to invalid date label");
      fallback.to_string()
    }
  }
}

/// [`format_created_at`] against the local
/// clock.
pub fn format_created(
  created: &CreatedAt,
  fallback: &str
) -> String {
  format_created_at(
    created,
    &Local::now(),
    fallback
  )
}

#[cfg(test)]
mod tests {
  use chrono::{
    FixedOffset,
    TimeZone,
    Utc
  };

  use super::*;

  const FALLBACK: &str = "Неверная дата";

  fn base() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
      .single()
      .expect("valid base")
  }

  fn render(text: &str) -> String {
    format_created_at(
      &CreatedAt::from(text),
      &base(),
      FALLBACK
    )
  }

  #[test]
  fn same_day_reads_today() {
    assert_eq!(
      render("2024-03-10T09:05:00Z"),
      "today at 9:05 AM"
    );
    assert_eq!(
      render("2024-03-10T21:45:10.123Z"),
      "today at 9:45 PM"
    );
  }

  #[test]
  fn neighbouring_days_use_words() {
    assert_eq!(
      render("2024-03-09T12:00:00Z"),
      "yesterday at 12:00 PM"
    );
    assert_eq!(
      render("2024-03-11T00:30:00Z"),
      "tomorrow at 12:30 AM"
    );
  }

  #[test]
  fn within_a_week_uses_weekday() {
    assert_eq!(
      render("2024-03-06T08:00:00Z"),
      "last Wednesday at 8:00 AM"
    );
    assert_eq!(
      render("2024-03-14T17:15:00Z"),
      "Thursday at 5:15 PM"
    );
  }

  #[test]
  fn beyond_a_week_uses_calendar_date() {
    assert_eq!(
      render("2024-03-03T08:00:00Z"),
      "03/03/2024"
    );
    assert_eq!(
      render("2024-03-17T08:00:00Z"),
      "03/17/2024"
    );
  }

  #[test]
  fn offsets_are_normalised_to_base_zone() {
    assert_eq!(
      render("2024-03-09T23:30:00-02:00"),
      "today at 1:30 AM"
    );
  }

  #[test]
  fn naive_and_date_only_text_are_local() {
    assert_eq!(
      render("2024-03-10T07:00:00"),
      "today at 7:00 AM"
    );
    assert_eq!(
      render("2024-03-08"),
      "last Friday at 12:00 AM"
    );
  }

  #[test]
  fn parsed_values_skip_text_parsing() {
    let offset = FixedOffset::east_opt(3600)
      .expect("valid offset");
    let value = offset
      .with_ymd_and_hms(2024, 3, 10, 13, 0, 0)
      .single()
      .expect("valid date");

    assert_eq!(
      format_created_at(
        &CreatedAt::from(value),
        &base(),
        FALLBACK
      ),
      "today at 12:00 PM"
    );
  }

  #[test]
  fn invalid_text_returns_fallback() {
    assert_eq!(render("not a date"), FALLBACK);
    assert_eq!(render(""), FALLBACK);
    assert_eq!(
      render("2024-13-45T99:00:00Z"),
      FALLBACK
    );
  }

  #[test]
  fn parse_iso_reports_reason() {
    assert!(matches!(
      parse_iso("   ", &Utc),
      Err(DateParseError::Empty)
    ));
    assert!(matches!(
      parse_iso("yesterday", &Utc),
      Err(DateParseError::Unrecognised(_))
    ));
  }
}
