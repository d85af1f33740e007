use crate::aggregate::Member;
use crate::extract::StructuralWarning;
use regex::Regex;
use thiserror::Error;

/// Errors related to page header titles.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Header '{0}' does not match the expected pattern")]
    FormatError(String),
}

/// Reads the participant tuple (degree, semester, group) from a page title.
///
/// The pattern is expected to capture, in order: degree name, semester
/// number, optional group number and optional degree suffix.
#[derive(Clone, Debug)]
pub struct HeaderParser {
    pattern: Regex,
}

impl HeaderParser {
    pub const DEFAULT_PATTERN: &'static str =
        r"^Vorlesungsplan für\s+([\w\s/-]+) (\d+)\. Sem\.\s?[Grupe]*\s?\.?\s?(\d)?\.?\s?-?\s?([A-Za-z]*)";

    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn member(&self, title: &str) -> Result<Member, HeaderError> {
        let title = title.trim();
        let unrecognized = || HeaderError::FormatError(collapse_lines(title));
        let captures = self.pattern.captures(title).ok_or_else(unrecognized)?;
        let text = |index: usize| captures.get(index).map(|matcher| matcher.as_str()).unwrap_or_default();
        let degree = collapse_lines(&format!("{} {}", text(1), text(4)));
        let semester = text(2).parse::<u32>().map_err(|_| unrecognized())?;
        let group = match captures.get(3) {
            Some(matcher) => matcher.as_str().parse::<u32>().map_err(|_| unrecognized())?,
            None => 0,
        };
        Ok(Member {
            degree,
            semester,
            group,
        })
    }

    /// Like [`HeaderParser::member`], but an unrecognized title becomes the
    /// degree itself with semester and group zeroed.
    pub fn member_or_fallback(&self, title: &str) -> (Member, Option<StructuralWarning>) {
        match self.member(title) {
            Ok(member) => (member, None),
            Err(error) => {
                log::warn!("{error}, using the whole header as course identity");
                let header = collapse_lines(title);
                let warning = StructuralWarning::UnrecognizedHeader {
                    header: header.clone(),
                };
                (Member::new(&header, 0, 0), Some(warning))
            }
        }
    }
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN).expect("Hardcode regex pattern")
    }
}

/// Joins all whitespace runs (including line breaks) into single spaces.
pub fn collapse_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns a page title into a file-name friendly calendar key,
/// e.g. "Informatiker/-in B.Sc." → "Informatiker_B_Sc".
pub fn normalize_page_title(title: &str) -> String {
    title
        .replace("/-in", " ")
        .replace(['.', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_with_group_and_suffix() {
        let parser = HeaderParser::default();
        let member = parser.member("Vorlesungsplan für Informatik 3. Sem. Gruppe 1 - AE").unwrap();
        assert_eq!(member, Member::new("Informatik AE", 3, 1));
    }

    #[test]
    fn test_member_without_group() {
        let parser = HeaderParser::default();
        let member = parser.member("Vorlesungsplan für Mechatronik 2. Sem.").unwrap();
        assert_eq!(member, Member::new("Mechatronik", 2, 0));

        let member = parser.member("Vorlesungsplan für Elektrotechnik Energie 4. Sem.").unwrap();
        assert_eq!(member, Member::new("Elektrotechnik Energie", 4, 0));
    }

    #[test]
    fn test_fallback() {
        let parser = HeaderParser::default();
        assert!(parser.member("Raumbelegung C12\nWoche 3").is_err());

        let (member, warning) = parser.member_or_fallback("Raumbelegung C12\nWoche 3");
        assert_eq!(member, Member::new("Raumbelegung C12 Woche 3", 0, 0));
        assert_eq!(warning, Some(StructuralWarning::UnrecognizedHeader {
            header: "Raumbelegung C12 Woche 3".to_owned(),
        }));

        let (_, warning) = parser.member_or_fallback("Vorlesungsplan für Mechatronik 2. Sem.");
        assert!(warning.is_none());
    }

    #[test]
    fn test_normalize_page_title() {
        assert_eq!(normalize_page_title("Informatiker/-in B.Sc."), "Informatiker_B_Sc");
        assert_eq!(normalize_page_title(" Wirtschafts-Ingenieur  3. Sem "), "Wirtschafts_Ingenieur_3_Sem");
    }
}
