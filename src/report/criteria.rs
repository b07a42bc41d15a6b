use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::Comment;

/// Which comments count as a stress-test result posted "today".
#[derive(Debug, Clone)]
pub struct QualificationCriteria {
    pub allowed_authors: HashSet<String>,
    /// A comment needs any one of these.
    pub required_phrases: Vec<String>,
    pub cutoff: DateTime<Utc>,
    /// Calendar day the cutoff belongs to; used when no date token is found.
    pub today: NaiveDate,
}

impl QualificationCriteria {
    /// Criteria whose cutoff is midnight of `now`'s day in `now`'s own time zone.
    pub fn for_day<Tz: TimeZone>(
        allowed_authors: &[String],
        required_phrases: &[String],
        now: &DateTime<Tz>,
    ) -> Self {
        let today = now.date_naive();
        let tz = now.timezone();
        // Midnight skipped by a DST jump; the day then starts at 01:00.
        let cutoff = [0, 1]
            .into_iter()
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .find_map(|time| tz.from_local_datetime(&today.and_time(time)).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| today.and_time(NaiveTime::MIN).and_utc());

        Self {
            allowed_authors: allowed_authors.iter().cloned().collect(),
            required_phrases: required_phrases.to_vec(),
            cutoff,
            today,
        }
    }

    pub fn accepts(&self, comment: &Comment) -> bool {
        self.allowed_authors.contains(&comment.author)
            && comment.created_at >= self.cutoff
            && self
                .required_phrases
                .iter()
                .any(|phrase| comment.text.contains(phrase.as_str()))
    }
}

/// User keywords, one per line. Order is kept and duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn parse(text: &str) -> Self {
        Self(
            text.split('\n')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDateTime};

    /// UTC-3 zone whose clocks skip from 23:59:59 to 01:00 on 2024-06-15.
    #[derive(Debug, Clone, Copy)]
    struct MidnightGap;

    impl MidnightGap {
        fn gap_day() -> NaiveDate {
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        }

        fn offset() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightGap {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            MidnightGap
        }

        fn offset_from_local_date(&self, _local: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(Self::offset())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let one_am = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
            if local.date() == Self::gap_day() && local.time() < one_am {
                LocalResult::None
            } else {
                LocalResult::Single(Self::offset())
            }
        }

        fn offset_from_utc_date(&self, _utc: &NaiveDate) -> FixedOffset {
            Self::offset()
        }

        fn offset_from_utc_datetime(&self, _utc: &NaiveDateTime) -> FixedOffset {
            Self::offset()
        }
    }

    fn taipei() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn criteria() -> QualificationCriteria {
        let now = taipei().with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
        QualificationCriteria::for_day(
            &["JIRAUSER50632".to_string()],
            &["請協助查看".to_string(), "也有同样问题".to_string()],
            &now,
        )
    }

    fn comment(author: &str, created_at: DateTime<Utc>, text: &str) -> Comment {
        Comment {
            author: author.into(),
            created_at,
            text: text.into(),
        }
    }

    #[test]
    fn cutoff_is_local_midnight() {
        let c = criteria();
        let expected = taipei().with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(c.cutoff, expected.with_timezone(&Utc));
        assert_eq!(c.today, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn skipped_midnight_starts_the_day_at_one() {
        let now = MidnightGap.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
        let c = QualificationCriteria::for_day(&[], &[], &now);

        let expected = Utc.with_ymd_and_hms(2024, 6, 15, 4, 0, 0).unwrap();
        assert_eq!(c.cutoff, expected);
        assert_eq!(c.today, MidnightGap::gap_day());
    }

    #[test]
    fn accepts_requires_all_three_conditions() {
        let c = criteria();
        let at_midnight = c.cutoff;
        let before = c.cutoff - chrono::Duration::seconds(1);

        assert!(c.accepts(&comment("JIRAUSER50632", at_midnight, "請協助查看")));
        assert!(c.accepts(&comment("JIRAUSER50632", at_midnight, "x 也有同样问题 y")));
        assert!(!c.accepts(&comment("someone", at_midnight, "請協助查看")));
        assert!(!c.accepts(&comment("JIRAUSER50632", before, "請協助查看")));
        assert!(!c.accepts(&comment("JIRAUSER50632", at_midnight, "please check")));
    }

    #[test]
    fn keyword_text_is_trimmed_and_blank_lines_dropped() {
        let set = KeywordSet::parse("  urgent \n\n\r\nDemo\nurgent\n   ");
        assert_eq!(set.as_slice(), ["urgent", "Demo", "urgent"]);
        assert!(KeywordSet::parse("\n  \n").is_empty());
    }
}
