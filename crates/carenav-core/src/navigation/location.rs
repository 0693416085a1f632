//! Locations and link matching for active-item highlighting.
//!
//! A location is a pathname with an optional query string and fragment, as a browser router
//! reports it. Pathnames compare with trailing slashes ignored (the root stays `/`). Query
//! parameters compare as an unordered multiset and are not percent-decoded.

/// A parsed `pathname?query#hash`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pathname: String,
    query: Vec<(String, String)>,
    hash: Option<String>,
}

impl Location {
    /// Parses a location. Never fails; malformed pieces are kept as literal text.
    pub fn parse(raw: &str) -> Self {
        let (rest, hash) = match raw.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_owned())),
            None => (raw, None),
        };
        let (pathname, query) = match rest.split_once('?') {
            Some((pathname, query)) => (pathname, query),
            None => (rest, ""),
        };

        let mut params: Vec<(String, String)> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_owned(), value.to_owned()),
                None => (pair.to_owned(), String::new()),
            })
            .collect();
        params.sort();

        Self {
            pathname: normalise_pathname(pathname),
            query: params,
            hash: hash.filter(|hash| !hash.is_empty()),
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Treating `self` as a link target, whether it matches `location`.
    ///
    /// Pathnames must be equal. A target query must equal the location's query; a target hash
    /// must equal the location's hash. A target without a query or hash matches any.
    pub fn matches_target(&self, location: &Location) -> bool {
        if self.pathname != location.pathname {
            return false;
        }
        if !self.query.is_empty() && self.query != location.query {
            return false;
        }
        match &self.hash {
            Some(hash) => location.hash.as_ref() == Some(hash),
            None => true,
        }
    }

    /// How much of a location this target pins down: one for a query, one for a hash.
    pub(crate) fn specificity(&self) -> usize {
        usize::from(!self.query.is_empty()) + usize::from(self.hash.is_some())
    }
}

fn normalise_pathname(pathname: &str) -> String {
    let trimmed = pathname.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_parts() {
        let loc = Location::parse("/billing/?tab=invoices&page=2#top");
        assert_eq!(loc.pathname(), "/billing");
        assert_eq!(loc.hash(), Some("top"));
        assert_eq!(loc.specificity(), 2);
    }

    #[test]
    fn root_and_empty_are_the_same_path() {
        assert_eq!(Location::parse("").pathname(), "/");
        assert_eq!(Location::parse("///").pathname(), "/");
    }

    #[test]
    fn bare_target_matches_any_query_and_hash() {
        let target = Location::parse("/patients");
        assert!(target.matches_target(&Location::parse("/patients?page=3#row-9")));
        assert!(!target.matches_target(&Location::parse("/patients/new")));
    }

    #[test]
    fn query_order_does_not_matter() {
        let target = Location::parse("/reports?kind=daily&format=pdf");
        assert!(target.matches_target(&Location::parse("/reports?format=pdf&kind=daily")));
        assert!(!target.matches_target(&Location::parse("/reports?kind=daily")));
    }

    #[test]
    fn hash_must_match_when_declared() {
        let target = Location::parse("/settings#modules");
        assert!(target.matches_target(&Location::parse("/settings#modules")));
        assert!(!target.matches_target(&Location::parse("/settings#profile")));
        assert!(!target.matches_target(&Location::parse("/settings")));
    }
}
