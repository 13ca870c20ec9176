use scraper::{ElementRef, Html};

use crate::matchup::MatchupError;

pub const PLATE_LOGS_HEADING: &str = "Plate Appearance Logs";

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Cell text of every `<tr>` in the located table, header row included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchupTable {
    pub rows: Vec<Vec<String>>,
}

impl MatchupTable {
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }
}

// Names are trusted; only spaces are rewritten.
pub fn matchup_url(base_url: &str, batter: &str, pitcher: &str) -> String {
    format!(
        "{base_url}?batter={}&pitcher={}",
        batter.replace(' ', "+"),
        pitcher.replace(' ', "+")
    )
}

/// Finds the first heading containing "Plate Appearance Logs" and the first
/// `<table>` after it in document order.
pub fn locate_matchup_table(html: &str) -> Result<MatchupTable, MatchupError> {
    let document = Html::parse_document(html);
    let mut heading_seen = false;
    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let name = element.value().name();
        if !heading_seen {
            if HEADING_TAGS.iter().any(|tag| *tag == name)
                && element_text(element).contains(PLATE_LOGS_HEADING)
            {
                heading_seen = true;
            }
            continue;
        }
        if name == "table" {
            return Ok(read_table(element));
        }
    }
    if heading_seen {
        Err(MatchupError::TableNotFound)
    } else {
        Err(MatchupError::HeaderNotFound)
    }
}

fn read_table(table: ElementRef<'_>) -> MatchupTable {
    let rows = descendant_elements(table, "tr")
        .map(|row| {
            descendant_elements(row, "td")
                .map(cell_text)
                .collect::<Vec<_>>()
        })
        .collect();
    MatchupTable { rows }
}

fn descendant_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

// Collapses markup whitespace so "Home\n  Run" reads "Home Run".
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{locate_matchup_table, matchup_url};
    use crate::matchup::MatchupError;

    #[test]
    fn url_replaces_spaces_only() {
        assert_eq!(
            matchup_url("https://example.test/bvp", "Heliot Ramos", "Bryan Woo"),
            "https://example.test/bvp?batter=Heliot+Ramos&pitcher=Bryan+Woo"
        );
        assert_eq!(
            matchup_url("https://example.test/bvp", "Ke'Bryan Hayes", "Woo"),
            "https://example.test/bvp?batter=Ke'Bryan+Hayes&pitcher=Woo"
        );
    }

    #[test]
    fn table_must_follow_heading() {
        let html = "<html><body><table><tr><td>x</td></tr></table>\
                    <h3>Plate Appearance Logs</h3><p>none</p></body></html>";
        assert!(matches!(
            locate_matchup_table(html),
            Err(MatchupError::TableNotFound)
        ));
    }

    #[test]
    fn heading_text_is_required() {
        let html = "<html><body><h3>Season Splits</h3><table><tr><td>x</td></tr></table></body></html>";
        assert!(matches!(
            locate_matchup_table(html),
            Err(MatchupError::HeaderNotFound)
        ));
    }

    #[test]
    fn nested_table_after_heading_is_found() {
        let html = "<div><h2><span>Plate Appearance Logs</span> (12)</h2></div>\
                    <section><div><table><tr><th>Date</th></tr>\
                    <tr><td>a</td><td>b</td></tr></table></div></section>";
        let table = locate_matchup_table(html).expect("table should be found");
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].is_empty());
        assert_eq!(table.rows[1], vec!["a".to_string(), "b".to_string()]);
        assert_eq!(table.data_rows().len(), 1);
    }

    #[test]
    fn cell_text_collapses_whitespace() {
        let html = "<h3>Plate Appearance Logs</h3><table><tr><th>h</th></tr>\
                    <tr><td>\n  Home\n   <b>Run</b> </td></tr></table>";
        let table = locate_matchup_table(html).expect("table should be found");
        assert_eq!(table.rows[1][0], "Home Run");
    }
}
