//! Metadata extraction from Markdown documents.
//!
//! Only the few structural pieces the index needs are read: an optional
//! `+++` TOML front matter block, the first level-one heading, and inline
//! link targets. Everything else in a body stays opaque.

use std::path::Path;
use std::sync::OnceLock;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Front matter delimiter line.
const FRONT_MATTER_FENCE: &str = "+++";

/// Metadata a document may declare in its front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Title overriding the heading.
    pub title: Option<String>,
    /// Ordinal overriding the file name prefix.
    pub ordinal: Option<u32>,
    /// Topic tags.
    pub tags: Vec<String>,
}

/// Split a document into its front matter block (if any) and body.
///
/// # Errors
///
/// Returns [`Error::MalformedFrontMatter`] if the opening fence is never
/// closed or the block is not valid TOML.
pub fn parse_front_matter<'a>(path: &Path, text: &'a str) -> Result<(FrontMatter, &'a str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = strip_fence_line(text) else {
        return Ok((FrontMatter::default(), text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let front = Figment::from(Toml::string(block))
                .extract::<FrontMatter>()
                .map_err(|e| Error::MalformedFrontMatter {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err(Error::MalformedFrontMatter {
        path: path.to_path_buf(),
        message: format!("unterminated '{FRONT_MATTER_FENCE}' block"),
    })
}

/// If `text` starts with a fence line, return what follows it.
fn strip_fence_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FRONT_MATTER_FENCE)?;
    if let Some(rest) = rest.strip_prefix("\r\n") {
        return Some(rest);
    }
    rest.strip_prefix('\n')
}

/// Check if a line opens or closes a fenced code block.
fn is_code_fence(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("```") || line.starts_with("~~~")
}

/// Iterate over `(line_number, line)` pairs outside fenced code blocks.
/// Line numbers are 1-based.
pub(crate) fn prose_lines(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let mut in_fence = false;
    text.lines().enumerate().filter_map(move |(i, line)| {
        if is_code_fence(line) {
            in_fence = !in_fence;
            return None;
        }
        (!in_fence).then_some((i + 1, line))
    })
}

/// The text of the first level-one ATX heading, outside code blocks.
#[must_use]
pub fn first_heading(body: &str) -> Option<String> {
    prose_lines(body).find_map(|(_, line)| {
        let title = line
            .strip_prefix("# ")?
            .trim()
            .trim_end_matches('#')
            .trim();
        (!title.is_empty()).then(|| title.to_string())
    })
}

/// Derive a readable title from a file stem, dropping the ordinal prefix.
///
/// # Examples
///
/// ```
/// use docatlas::content::markdown::title_from_stem;
/// use regex::Regex;
///
/// let ordinal = Regex::new(r"^(\d+)[-_. ]").unwrap();
/// assert_eq!(title_from_stem("02-clean_architecture", &ordinal), "clean architecture");
/// ```
#[must_use]
pub fn title_from_stem(stem: &str, ordinal: &Regex) -> String {
    let rest = ordinal
        .captures(stem)
        .filter(|caps| caps.get(1).is_some())
        .and_then(|caps| caps.get(0))
        .map_or(stem, |m| &stem[m.end()..]);
    let title = rest
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        stem.to_string()
    } else {
        title
    }
}

fn inline_link_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(r#"\[[^\]]*\]\(\s*(?:<([^>]+)>|([^)\s]+))(?:\s+"[^"]*")?\s*\)"#)
            .expect("inline link pattern is valid")
    })
}

/// Relative link targets of inline Markdown links, in order of appearance.
///
/// Targets with a URL scheme, absolute paths and same-page anchors are
/// skipped. Fragments and query strings are removed from the rest and
/// percent-escapes are decoded; a target that does not decode to UTF-8 is
/// kept as written.
#[must_use]
pub fn relative_link_targets(body: &str) -> Vec<String> {
    let mut targets = Vec::new();
    for (_, line) in prose_lines(body) {
        for caps in inline_link_regex().captures_iter(line) {
            let Some(target) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
                continue;
            };
            if target.starts_with('#') || target.starts_with('/') || has_scheme(target) {
                continue;
            }
            let path = target.split(['#', '?']).next().unwrap_or_default();
            if path.is_empty() {
                continue;
            }
            match urlencoding::decode(path) {
                Ok(decoded) => targets.push(decoded.into_owned()),
                Err(_) => targets.push(path.to_string()),
            }
        }
    }
    targets
}

/// Check for a URL scheme such as `https:` or `mailto:`.
fn has_scheme(target: &str) -> bool {
    match target.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("projects/p/01-a.md")
    }

    #[test]
    fn test_no_front_matter() {
        let (front, body) = parse_front_matter(path(), "# Title\n\nText").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "# Title\n\nText");
    }

    #[test]
    fn test_front_matter_parsed_and_stripped() {
        let text = "+++\ntitle = \"Custom\"\nordinal = 7\ntags = [\"clean\", \"tdd\"]\n+++\n# Heading\n";
        let (front, body) = parse_front_matter(path(), text).unwrap();
        assert_eq!(front.title.as_deref(), Some("Custom"));
        assert_eq!(front.ordinal, Some(7));
        assert_eq!(front.tags, vec!["clean".to_string(), "tdd".to_string()]);
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn test_front_matter_crlf() {
        let text = "+++\r\ntags = [\"x\"]\r\n+++\r\nbody";
        let (front, body) = parse_front_matter(path(), text).unwrap();
        assert_eq!(front.tags, vec!["x".to_string()]);
        assert_eq!(body, "body");
    }

    #[test]
    fn test_front_matter_unterminated() {
        let err = parse_front_matter(path(), "+++\ntitle = \"x\"\n# body").unwrap_err();
        assert!(matches!(err, Error::MalformedFrontMatter { .. }));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_front_matter_invalid_toml() {
        let err = parse_front_matter(path(), "+++\ntitle = \n+++\n").unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn test_front_matter_wrong_type() {
        let err = parse_front_matter(path(), "+++\nordinal = \"three\"\n+++\n").unwrap_err();
        assert!(matches!(err, Error::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_first_heading() {
        assert_eq!(
            first_heading("intro\n## Sub\n# Main Title #\n# Second").as_deref(),
            Some("Main Title")
        );
        assert_eq!(first_heading("no heading here"), None);
    }

    #[test]
    fn test_first_heading_skips_code_blocks() {
        let body = "```bash\n# not a title\n```\n# Real";
        assert_eq!(first_heading(body).as_deref(), Some("Real"));
    }

    #[test]
    fn test_title_from_stem() {
        let ordinal = Regex::new(r"^(\d+)[-_. ]").unwrap();
        assert_eq!(title_from_stem("01-camada-de-dominio", &ordinal), "camada de dominio");
        assert_eq!(title_from_stem("keynote_2019", &ordinal), "keynote 2019");
        assert_eq!(title_from_stem("07-", &ordinal), "07-");
    }

    #[test]
    fn test_relative_link_targets() {
        let body = "See [next](02-data.md) and [site](https://flutter.dev), \
                    [mail](mailto:a@b.c), [anchor](#top), [abs](/etc/x.md), \
                    [section](../other/03-x.md#part) and [spaced](<04 notes.md>).";
        assert_eq!(
            relative_link_targets(body),
            vec![
                "02-data.md".to_string(),
                "../other/03-x.md".to_string(),
                "04 notes.md".to_string(),
            ]
        );
    }

    #[test]
    fn test_link_targets_percent_decoded() {
        let body = "[a](05-configura%C3%A7%C3%A3o.md) [b](my%20notes.md) [c](bad%FF.md)";
        assert_eq!(
            relative_link_targets(body),
            vec![
                "05-configuração.md".to_string(),
                "my notes.md".to_string(),
                "bad%FF.md".to_string(),
            ]
        );
    }

    #[test]
    fn test_link_targets_skip_code_blocks() {
        let body = "```\n[x](01-a.md)\n```\n[y](02-b.md)";
        assert_eq!(relative_link_targets(body), vec!["02-b.md".to_string()]);
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://example.com"));
        assert!(has_scheme("mailto:x@y"));
        assert!(!has_scheme("02-data.md"));
        assert!(!has_scheme("../x.md"));
    }
}
