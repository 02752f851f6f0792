use std::ops::Index;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{MetadateError, Result};

pub const TAG_PREFIX: &str = "#published ";
pub const TAG_FORMAT: &str = "#published %Y-%m-%d %H:%M:%S\n";

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(
        r"^#published (?P<year>[0-9]{4})-(?P<month>[0-1][0-9])-(?P<day>[0-3][0-9]) (?P<hour>[0-2][0-9]):(?P<minute>[0-5][0-9]):(?P<second>[0-5][0-9])\s*$"
    ).unwrap();
}

/// First metadata line carrying a published tag. Later ones are never looked at.
pub fn find_published(metadata: &[String]) -> Option<&str> {
    metadata.iter()
        .map(String::as_str)
        .find(|line| line.starts_with(TAG_PREFIX))
}

fn to_int<T: std::str::FromStr>(num_str: &str, line: &str) -> std::result::Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the line {}", num_str, line.trim_end())),
    }
}

/// Parses the local date time stored in a published line.
pub fn parse_published_date_time(line: &str) -> std::result::Result<NaiveDateTime, String> {
    let Some(caps) = TAG_REGEX.captures(line) else {
        return Err(format!("Unable to parse published line {}", line.trim_end()));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, line);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, line);

    let y: i32 = to_i32(caps.index("year"))?;
    let m: u32 = to_u32(caps.index("month"))?;
    let d: u32 = to_u32(caps.index("day"))?;
    let h: u32 = to_u32(caps.index("hour"))?;
    let mn: u32 = to_u32(caps.index("minute"))?;
    let s: u32 = to_u32(caps.index("second"))?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", line.trim_end()))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time in {}", line.trim_end()))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Epoch seconds of a published line, read in the host's local time zone.
/// When a DST change makes the local time ambiguous the earliest instant wins,
/// a local time skipped by DST is an error.
pub fn parse_published(line: &str) -> std::result::Result<i64, String> {
    parse_published_near(line, None)
}

/// Same as [`parse_published`], but in the hour repeated when DST ends the
/// instant equal to `current` wins. A line stamped from the second occurrence
/// of that hour then still reads back as the mtime it was stamped from.
pub fn parse_published_near(line: &str, current: Option<i64>) -> std::result::Result<i64, String> {
    let date_time = parse_published_date_time(line)?;
    resolve_local(Local.from_local_datetime(&date_time), current)
        .ok_or_else(|| format!("{} does not exist in the local time zone", date_time))
}

fn resolve_local<Tz: TimeZone>(candidates: LocalResult<DateTime<Tz>>, current: Option<i64>) -> Option<i64> {
    match candidates {
        LocalResult::Single(dt) => Some(dt.timestamp()),
        LocalResult::Ambiguous(first, second) => {
            let (first, second) = (first.timestamp(), second.timestamp());
            match current {
                Some(current) if current == second => Some(second),
                _ => Some(first.min(second)),
            }
        }
        LocalResult::None => None,
    }
}

/// Published line, with line ending, for the given epoch seconds.
pub fn format_published(epoch: i64) -> Result<String> {
    let utc = DateTime::from_timestamp(epoch, 0).ok_or(MetadateError::InvalidTimestamp(epoch))?;
    Ok(utc.with_timezone(&Local).format(TAG_FORMAT).to_string())
}

/// Same as [`format_published`] without the marker and line ending, for reports.
pub fn display_epoch(epoch: i64) -> String {
    match DateTime::from_timestamp(epoch, 0) {
        Some(utc) => utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use crate::test_data::ENTRY_TWO_TAGS;
    use crate::entry::Entry;

    use super::*;

    fn local_epoch(y: i32, m: u32, d: u32, h: u32, mn: u32, s: u32) -> i64 {
        Local.with_ymd_and_hms(y, m, d, h, mn, s).earliest().unwrap().timestamp()
    }

    #[test]
    fn test_parse_published_date_time() {
        let date_time = parse_published_date_time("#published 2009-08-05 22:36:17\n").unwrap();
        assert_eq!(date_time.format("%Y-%m-%d").to_string(), "2009-08-05");
        assert_eq!(date_time.format("%H:%M:%S").to_string(), "22:36:17");

        let date_time = parse_published_date_time("#published 2009-08-05 22:36:17").unwrap();
        assert_eq!(date_time.format("%H:%M:%S").to_string(), "22:36:17");

        let date_time = parse_published_date_time("#published 2009-08-05 22:36:17\r\n").unwrap();
        assert_eq!(date_time.format("%H:%M:%S").to_string(), "22:36:17");
    }

    #[test]
    fn test_parse_published() {
        let epoch = parse_published("#published 2009-08-05 22:36:17\n").unwrap();
        assert_eq!(epoch, local_epoch(2009, 8, 5, 22, 36, 17));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_published("#published 2009-13-05 22:36:17\n").is_err());
        assert!(parse_published("#published 2009-02-30 10:00:00\n").is_err());
        assert!(parse_published("#published 2009-02-10 25:00:00\n").is_err());
        assert!(parse_published("#published yesterday\n").is_err());
        assert!(parse_published("#published 2009-8-5 22:36:17\n").is_err());
        assert!(parse_published("#published 2009-08-05 22:36:17 extra\n").is_err());
        assert!(parse_published("published 2009-08-05 22:36:17\n").is_err());
    }

    #[test]
    fn test_format_published() {
        let epoch = local_epoch(2001, 9, 9, 1, 46, 40);
        assert_eq!(format_published(epoch).unwrap(), "#published 2001-09-09 01:46:40\n");
        assert_eq!(display_epoch(epoch), "2001-09-09 01:46:40");
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        let epoch = 1_000_000_000;
        let line = format_published(epoch).unwrap();
        assert_eq!(parse_published(&line).unwrap(), epoch);
    }

    #[test]
    fn test_out_of_range_epoch() {
        assert!(matches!(format_published(i64::MAX), Err(MetadateError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_first_tag_wins() {
        let entry = Entry::parse(ENTRY_TWO_TAGS);
        let line = find_published(&entry.metadata).unwrap();
        assert_eq!(line, "#published 2019-03-10 08:00:00\n");
    }

    #[test]
    fn test_no_tag() {
        let metadata = vec!["#tags a\n".to_string(), "#publishedx\n".to_string()];
        assert!(find_published(&metadata).is_none());
    }

    #[test]
    fn test_repeated_hour() {
        // 01:30 seen from both sides of a one hour shift back
        let summer = FixedOffset::east_opt(3600).unwrap();
        let winter = FixedOffset::east_opt(0).unwrap();
        let naive = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap().and_hms_opt(1, 30, 0).unwrap();
        let first = summer.from_local_datetime(&naive).unwrap();
        let second = winter.from_local_datetime(&naive).unwrap();
        let candidates = || LocalResult::Ambiguous(first, second);

        assert_eq!(resolve_local(candidates(), None), Some(first.timestamp()));
        assert_eq!(resolve_local(candidates(), Some(first.timestamp())), Some(first.timestamp()));
        assert_eq!(resolve_local(candidates(), Some(second.timestamp())), Some(second.timestamp()));
        assert_eq!(resolve_local(candidates(), Some(0)), Some(first.timestamp()));
    }

    #[test]
    fn test_skipped_hour() {
        assert_eq!(resolve_local(LocalResult::<DateTime<FixedOffset>>::None, Some(0)), None);
    }

    #[test]
    fn test_parse_published_near() {
        let line = "#published 2009-08-05 22:36:17\n";
        let epoch = parse_published(line).unwrap();
        assert_eq!(parse_published_near(line, Some(epoch + 7)).unwrap(), epoch);
    }
}
