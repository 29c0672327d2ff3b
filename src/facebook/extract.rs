//! Facebook profile URL -> username or numeric id.
//!
//! Facebook links come in several shapes (friends lists, group member pages,
//! Messenger threads, `profile.php`, vanity URLs). Each shape is one entry in
//! [`RULES`], checked in order. The group and Messenger rules are positional
//! heuristics tied to the URL scheme Facebook used when they were written;
//! they are kept as-is rather than generalised.

use log::debug;
use url::Url;

use crate::error::{ProxyError, ProxyResult};
use crate::identifier::ExtractedIdentifier;

pub const INVALID_URL: &str = "Invalid URL.";
pub const NO_IDENTIFIER: &str = "Could not extract username/ID from URL.";

const RELATIVE_BASE: &str = "https://www.facebook.com/";

/// The parts of a URL the rules look at.
#[derive(Debug)]
pub struct ParsedProfileUrl {
    path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ParsedProfileUrl {
    pub fn parse(raw: &str) -> ProxyResult<Self> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => parse_schemeless(raw)?,
            Err(_) => return Err(invalid_url()),
        };

        let path = url.path().to_string();
        // Segments are matched and sent upstream decoded; the raw path is only
        // used for the substring checks.
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| segment.to_string())
            })
            .collect();
        let query = url.query_pairs().into_owned().collect();

        Ok(ParsedProfileUrl {
            path,
            segments,
            query,
        })
    }

    /// First non-empty value of a query parameter.
    fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.clone())
    }

    fn segment(&self, index: usize) -> Option<String> {
        self.segments.get(index).cloned()
    }
}

/// `facebook.com/john.doe` has a host but no scheme. Anything else without a
/// scheme (`zuck`, `/zuck`, `john.doe`) is a bare path.
fn parse_schemeless(raw: &str) -> ProxyResult<Url> {
    let parsed = match raw.split_once('/') {
        Some((host, _)) if host.contains('.') => Url::parse(&format!("https://{}", raw)),
        _ => Url::parse(RELATIVE_BASE).and_then(|base| base.join(raw)),
    };
    parsed.map_err(|_| invalid_url())
}

fn invalid_url() -> ProxyError {
    ProxyError::InvalidUrl(INVALID_URL.to_string())
}

pub struct ExtractionRule {
    pub name: &'static str,
    pub applies: fn(&ParsedProfileUrl) -> bool,
    pub extract: fn(&ParsedProfileUrl) -> Option<String>,
}

/// Evaluated top to bottom. The first rule whose predicate holds decides the
/// result, even if its extractor comes back empty.
pub const RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "friends",
        applies: |url| url.path.contains("/friends/"),
        extract: |url| url.query_param("profile_id"),
    },
    ExtractionRule {
        name: "group-member",
        applies: |url| url.path.contains("/groups/") && url.segments.len() > 3,
        extract: |url| url.segment(3),
    },
    ExtractionRule {
        name: "messenger-thread",
        applies: |url| url.path.contains("/t/") && !url.path.contains("/e2ee/"),
        extract: |url| url.segment(1),
    },
    ExtractionRule {
        name: "profile-php",
        applies: |url| url.path == "/profile.php",
        extract: |url| url.query_param("id"),
    },
    ExtractionRule {
        name: "last-segment",
        applies: |url| !url.segments.is_empty(),
        extract: |url| url.segments.last().cloned(),
    },
];

/// The rule that decides `url`, if any.
pub fn matching_rule(url: &ParsedProfileUrl) -> Option<&'static ExtractionRule> {
    RULES.iter().find(|rule| (rule.applies)(url))
}

pub fn extract_identifier(raw: &str) -> ProxyResult<ExtractedIdentifier> {
    let parsed = ParsedProfileUrl::parse(raw)?;
    let rule = matching_rule(&parsed).ok_or_else(no_identifier)?;

    let identifier = (rule.extract)(&parsed)
        .and_then(|value| ExtractedIdentifier::classify(value))
        .ok_or_else(no_identifier)?;

    debug!("Facebook URL matched rule '{}', identifier: {}", rule.name, identifier);
    Ok(identifier)
}

fn no_identifier() -> ProxyError {
    ProxyError::Extraction(NO_IDENTIFIER.to_string())
}
