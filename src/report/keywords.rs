/// Keywords found in `fragment`, case-insensitively, in the caller's order.
pub fn match_keywords(keywords: &[String], fragment: &str) -> Vec<String> {
    let haystack = fragment.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn matches_case_insensitively_in_caller_order() {
        let keywords = words(&["TICKET", "other", "Urgent"]);
        assert_eq!(
            match_keywords(&keywords, "urgent ticket"),
            words(&["TICKET", "Urgent"])
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let keywords = words(&["demo", "demo"]);
        assert_eq!(match_keywords(&keywords, "Demo board"), keywords);
    }

    #[test]
    fn empty_keyword_list_matches_nothing() {
        assert!(match_keywords(&[], "anything").is_empty());
    }
}
