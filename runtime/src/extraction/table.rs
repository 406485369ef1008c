//! Table pass: find the most roster-like `<table>` and read its rows.

use super::PlayerRecord;
use crate::acquisition::links::element_text;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Header keywords; a table scores one point per keyword found in any of
/// its header cells.
const HEADER_KEYWORDS: [&str; 4] = ["name", "player", "pos", "position"];

fn selector(css: &'static str, cell: &'static OnceLock<Selector>) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("table selector is valid"))
}

fn table_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector("table", &SEL)
}

fn th_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector("th", &SEL)
}

fn tr_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector("tr", &SEL)
}

fn td_sel() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector("td", &SEL)
}

/// A scored candidate table with its resolved column indices.
#[derive(Debug)]
pub struct RosterTable<'a> {
    pub element: ElementRef<'a>,
    pub score: usize,
    pub name_col: Option<usize>,
    pub position_col: Option<usize>,
}

/// Number of header keywords that appear in at least one header cell.
pub fn header_score(headers: &[String]) -> usize {
    HEADER_KEYWORDS
        .iter()
        .filter(|k| headers.iter().any(|h| h.contains(*k)))
        .count()
}

fn header_cells(table: ElementRef<'_>) -> Vec<String> {
    table
        .select(th_sel())
        .map(|th| element_text(th).to_lowercase())
        .collect()
}

/// The highest-scoring table, if any scores above zero. Ties keep the
/// earliest table.
pub fn best_table(document: &Html) -> Option<RosterTable<'_>> {
    let mut best: Option<(ElementRef<'_>, usize, Vec<String>)> = None;
    for table in document.select(table_sel()) {
        let headers = header_cells(table);
        let score = header_score(&headers);
        if score > best.as_ref().map_or(0, |(_, s, _)| *s) {
            best = Some((table, score, headers));
        }
    }

    let (element, score, headers) = best?;
    Some(RosterTable {
        element,
        score,
        name_col: headers
            .iter()
            .position(|h| h.contains("name") || h.contains("player")),
        position_col: headers.iter().position(|h| h.contains("pos")),
    })
}

/// Players from the best table, in row order. Empty when no table scores.
pub fn extract_from_tables(document: &Html) -> Vec<PlayerRecord> {
    let Some(table) = best_table(document) else {
        return Vec::new();
    };
    tracing::debug!(score = table.score, "roster table selected");

    let mut players = Vec::new();
    for row in table.element.select(tr_sel()) {
        let cells: Vec<String> = row.select(td_sel()).map(element_text).collect();
        if cells.is_empty() {
            continue;
        }
        let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).map(String::as_str);
        let Some(name) = cell(table.name_col) else {
            continue;
        };
        if let Some(player) = PlayerRecord::new(name, cell(table.position_col).unwrap_or("")) {
            players.push(player);
        }
    }
    players
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_score() {
        let headers: Vec<String> = ["#", "full name", "pos.", "yr"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // "name" and "pos" match; "player" and "position" do not.
        assert_eq!(header_score(&headers), 2);
        assert_eq!(header_score(&[]), 0);
    }

    #[test]
    fn test_simple_roster_table() {
        let html = r#"<table>
            <tr><th>Name</th><th>Pos</th><th>Yr</th></tr>
            <tr><td>Jane Doe</td><td>SS</td><td>Fr</td></tr>
        </table>"#;
        let doc = Html::parse_document(html);
        let players = extract_from_tables(&doc);
        assert_eq!(players, vec![PlayerRecord::new("Jane Doe", "SS").unwrap()]);
    }

    #[test]
    fn test_highest_scoring_table_wins() {
        let html = r#"
        <table><tr><th>Date</th><th>Opponent</th><th>Player of the game</th></tr>
               <tr><td>Nov 4</td><td>Colby</td><td>Sam Smith</td></tr></table>
        <table><tr><th>No.</th><th>Player</th><th>Position</th></tr>
               <tr><td>12</td><td>Alex Kim</td><td>Guard</td></tr>
               <tr><td>3</td><td>Bo Lee</td><td>Forward</td></tr></table>
        "#;
        let doc = Html::parse_document(html);
        let table = best_table(&doc).unwrap();
        assert_eq!(table.score, 3);
        assert_eq!(table.name_col, Some(1));
        assert_eq!(table.position_col, Some(2));

        let players = extract_from_tables(&doc);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Alex Kim");
        assert_eq!(players[1].position, "Forward");
    }

    #[test]
    fn test_bad_names_are_skipped() {
        let html = r#"<table>
            <tr><th>Name</th><th>Position</th></tr>
            <tr><td>X</td><td>G</td></tr>
            <tr><td>Listen to pronunciation</td><td>G</td></tr>
            <tr><td>Chris Doe</td></tr>
            <tr><td></td><td>F</td></tr>
        </table>"#;
        let doc = Html::parse_document(html);
        let players = extract_from_tables(&doc);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Chris Doe");
        assert_eq!(players[0].position, "");
    }

    #[test]
    fn test_no_scoring_table() {
        let doc = Html::parse_document("<table><tr><th>Date</th></tr><tr><td>x</td></tr></table>");
        assert!(best_table(&doc).is_none());
        assert!(extract_from_tables(&doc).is_empty());
    }
}
