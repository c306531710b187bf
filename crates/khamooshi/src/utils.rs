use std::sync::LazyLock;

use regex::Regex;

use crate::types::Place;

static RE_BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("invalid regex: blank line"));

/// Reads places written as an alias line followed by a phrase line, with a
/// blank line between entries. Blocks with fewer than two lines are skipped;
/// lines after the phrase are ignored.
pub fn parse_places(input: &str) -> Vec<Place> {
    RE_BLANK_LINE
        .split(input)
        .filter_map(|block| {
            let mut lines = block.trim().split('\n');
            let alias = lines.next()?;
            let phrase = lines.next()?;
            Some(Place::new(alias.trim(), phrase.trim()))
        })
        .collect()
}

pub fn stringify_places(places: &[Place]) -> String {
    places
        .iter()
        .map(|p| format!("{}\n{}", p.alias, p.phrase))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_places() {
        let input = "Home\n123 Main St\n\nWork\n456 Office Rd";
        assert_eq!(
            parse_places(input),
            vec![
                Place::new("Home", "123 Main St"),
                Place::new("Work", "456 Office Rd"),
            ]
        );
    }

    #[test]
    fn test_parse_places_edge_cases() {
        assert!(parse_places("").is_empty());
        assert!(parse_places("only an alias").is_empty());

        let input = "  خانه \r\n خیابان رسالت \n \n\nlonely\n\nدفتر\nخیابان عدالت\nextra line\n";
        assert_eq!(
            parse_places(input),
            vec![
                Place::new("خانه", "خیابان رسالت"),
                Place::new("دفتر", "خیابان عدالت"),
            ]
        );
    }

    #[test]
    fn test_stringify_places() {
        let places = vec![
            Place::new("Home", "123 Main St"),
            Place::new("Work", "456 Office Rd"),
        ];
        let text = stringify_places(&places);
        assert_eq!(text, "Home\n123 Main St\n\nWork\n456 Office Rd");
        assert_eq!(parse_places(&text), places);
    }
}
