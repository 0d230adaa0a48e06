use scraper::{ElementRef, Selector};

/// Query surface the extractor runs against: a page snapshot or any
/// sub-tree of it. Driver-side failures never cross this boundary; a
/// selector that cannot be parsed or matches nothing is simply `None`.
pub trait Scope: Sized {
    /// First element matching `selector` under this scope, if any.
    fn query(&self, selector: &str) -> Option<Self>;

    /// All elements matching `selector` under this scope, document order.
    fn query_all(&self, selector: &str) -> Vec<Self>;

    /// Raw text content of this node, untrimmed.
    fn read_text(&self) -> String;
}

impl<'a> Scope for ElementRef<'a> {
    fn query(&self, selector: &str) -> Option<Self> {
        let parsed = Selector::parse(selector).ok()?;
        self.select(&parsed).next()
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select(&parsed).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn read_text(&self) -> String {
        self.text().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn query_finds_first_match_in_document_order() {
        let html = Html::parse_document("<ul><li>one</li><li>two</li></ul>");
        let root = html.root_element();
        let first = root.query("li").unwrap();
        assert_eq!(first.read_text(), "one");
    }

    #[test]
    fn bad_selector_is_a_miss_not_a_panic() {
        let html = Html::parse_document("<p>hi</p>");
        let root = html.root_element();
        assert!(root.query("p[").is_none());
        assert!(root.query_all("p[").is_empty());
    }
}
