//! Card fallback for roster pages that do not use tables.

use super::PlayerRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

fn card_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse("[class*='roster'], [class*='player'], [class*='athlete']")
            .expect("card selector is valid")
    })
}

/// Separators between name and the rest of a card: runs of whitespace,
/// ` | ` and ` - `.
fn segment_split() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}| \| | - ").expect("segment regex is valid"))
}

fn position_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(G|F|C|GK|MF|FW|DB|RB|LB|WR|QB|TE|DL|OL|S|MB|OH|L|DS)\b")
            .expect("position regex is valid")
    })
}

/// Text nodes of an element, each trimmed, blanks dropped, joined by spaces.
fn card_text(card: ElementRef<'_>) -> String {
    card.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse one card's flattened text.
pub fn parse_card(text: &str) -> Option<PlayerRecord> {
    if text.to_lowercase().contains("powered by") {
        return None;
    }
    let first = segment_split().split(text).next()?;
    if first.chars().count() <= 2 {
        return None;
    }
    let position = position_token()
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or("");
    PlayerRecord::new(first, position)
}

/// Players from every card-like fragment, in document order.
pub fn extract_from_cards(document: &Html) -> Vec<PlayerRecord> {
    document
        .select(card_selector())
        .filter_map(|card| parse_card(&card_text(card)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card_segments() {
        let p = parse_card("Jordan Smith - G 6'2\" Senior").unwrap();
        assert_eq!(p.name, "Jordan Smith");
        assert_eq!(p.position, "G");

        let p = parse_card("Taylor Reed | Outside Hitter | OH").unwrap();
        assert_eq!(p.name, "Taylor Reed");
        assert_eq!(p.position, "OH");

        let p = parse_card("Sam Ortiz   Sophomore").unwrap();
        assert_eq!(p.name, "Sam Ortiz");
        assert_eq!(p.position, "");
    }

    #[test]
    fn test_parse_card_rejects_short_and_boilerplate() {
        assert!(parse_card("Jo").is_none());
        assert!(parse_card("Powered by Sidearm Sports").is_none());
        assert!(parse_card("").is_none());
    }

    #[test]
    fn test_extract_from_cards() {
        let html = r#"
        <ul>
          <li class="sidearm-roster-player"><h3>Alex Kim</h3> | <span>F</span></li>
          <li class="sidearm-roster-player"><h3>Bo Lee</h3> - <span>C</span></li>
          <div class="footer">Powered by Sidearm</div>
          <div class="athlete-card footer">Powered by PrestoSports</div>
        </ul>"#;
        let doc = Html::parse_document(html);
        let players = extract_from_cards(&doc);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Alex Kim");
        assert_eq!(players[0].position, "F");
        assert_eq!(players[1].name, "Bo Lee");
        assert_eq!(players[1].position, "C");
    }
}
