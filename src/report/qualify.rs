use crate::models::{Comment, FeedItem};

use super::criteria::QualificationCriteria;

/// The most recent qualifying comment of `item`, if any.
pub fn qualify<'a>(item: &'a FeedItem, criteria: &QualificationCriteria) -> Option<&'a Comment> {
    item.comments_newest_first()
        .find(|comment| criteria.accepts(comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn criteria() -> QualificationCriteria {
        let now = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, 9, 0, 0)
            .unwrap();
        QualificationCriteria::for_day(
            &["JIRAUSER50632".to_string(), "JIRAUSER51966".to_string()],
            &["請協助查看".to_string()],
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

    fn item(comments: Vec<Comment>) -> FeedItem {
        FeedItem {
            title: Some("[DEMO-1] Hang".into()),
            link: "https://jira.example.com/browse/DEMO-1".into(),
            assignee: None,
            comments,
        }
    }

    #[test]
    fn returns_most_recent_qualifying_comment() {
        let c = criteria();
        let later = c.cutoff + chrono::Duration::hours(2);
        let item = item(vec![
            comment("JIRAUSER50632", c.cutoff, "first 請協助查看"),
            comment("JIRAUSER51966", later, "second 請協助查看"),
            comment("reviewer", later, "third 請協助查看"),
        ]);

        let found = qualify(&item, &c).unwrap();
        assert_eq!(found.text, "second 請協助查看");
    }

    #[test]
    fn absent_when_no_comment_meets_every_condition() {
        let c = criteria();
        let yesterday = c.cutoff - chrono::Duration::hours(1);
        let item = item(vec![
            comment("JIRAUSER50632", yesterday, "請協助查看"),
            comment("reviewer", c.cutoff, "請協助查看"),
            comment("JIRAUSER50632", c.cutoff, "looks fine"),
        ]);

        assert!(qualify(&item, &c).is_none());
    }

    #[test]
    fn repeated_calls_agree() {
        let c = criteria();
        let item = item(vec![comment("JIRAUSER50632", c.cutoff, "請協助查看")]);
        assert_eq!(qualify(&item, &c), qualify(&item, &c));
    }
}
