use std::collections::BTreeMap;

use crate::record::FieldValue;
use crate::schema::{FieldKind, Locator, ProfileSchema, SectionSpec};
use crate::scope::Scope;

// Collapse runs of whitespace; profile markup duplicates text across
// visually-hidden spans and pads everything with newlines.
fn clean(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Try the locator's candidates in order and return the first non-empty
/// trimmed text. A candidate that matches nothing, or matches only blank
/// text, is a miss and evaluation moves on. All-miss returns `""`; this
/// never fails, whatever the locator contains.
pub fn extract<S: Scope>(scope: &S, locator: &Locator) -> String {
    for selector in locator.candidates() {
        if let Some(element) = scope.query(selector) {
            let text = clean(&element.read_text());
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Like `extract`, but the winning candidate supplies every match it has:
/// the first selector yielding at least one non-empty text wins and its
/// texts are returned in document order. All-miss returns an empty vec.
pub fn extract_text_list<S: Scope>(scope: &S, locator: &Locator) -> Vec<String> {
    for selector in locator.candidates() {
        let texts: Vec<String> = scope
            .query_all(selector)
            .iter()
            .map(|element| clean(&element.read_text()))
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            return texts;
        }
    }
    Vec::new()
}

/// Extract a repeating section (experience, education). The container is
/// located through its own candidate list; a missing container degrades
/// to an empty section. Items keep document order. An item survives only
/// if at least one of its identity sub-fields extracted non-empty; with
/// no identity configured, every sub-field counts.
pub fn extract_section<S: Scope>(scope: &S, spec: &SectionSpec) -> Vec<BTreeMap<String, String>> {
    let container = spec
        .container
        .candidates()
        .iter()
        .find_map(|selector| scope.query(selector));
    let Some(container) = container else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for element in container.query_all(&spec.item_selector) {
        let mut fields = BTreeMap::new();
        for item_field in &spec.item_fields {
            let value = extract(&element, &item_field.selectors);
            fields.insert(item_field.name.clone(), value);
        }

        let has_identity = if spec.identity.is_empty() {
            fields.values().any(|v| !v.is_empty())
        } else {
            spec.identity
                .iter()
                .any(|key| fields.get(key).is_some_and(|v| !v.is_empty()))
        };
        if has_identity {
            items.push(fields);
        }
    }
    items
}

/// One stateless pass over the snapshot: every schema field extracted in
/// declaration order, each independently of the others, no retries.
/// Every declared key is present in the result even when all empty.
pub fn assemble<S: Scope>(scope: &S, schema: &ProfileSchema) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    for field in &schema.fields {
        let value = match &field.kind {
            FieldKind::Text { selectors } => FieldValue::Text(extract(scope, selectors)),
            FieldKind::TextList { selectors } => {
                FieldValue::List(extract_text_list(scope, selectors))
            }
            FieldKind::Section(spec) => FieldValue::Items(extract_section(scope, spec)),
        };
        fields.insert(field.name.clone(), value);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ItemField;
    use scraper::Html;

    #[test]
    fn extract_falls_back_to_legacy_selector() {
        let html = Html::parse_document(r#"<h1 class="old-style"> Jane Doe </h1>"#);
        let root = html.root_element();
        let locator = Locator::new(&["h1.new-style", "h1.old-style"]);
        assert_eq!(extract(&root, &locator), "Jane Doe");
    }

    #[test]
    fn blank_match_is_a_miss_not_a_hit() {
        let html = Html::parse_document(
            r#"<h1 class="new-style">   </h1><h1 class="old-style">Jane</h1>"#,
        );
        let root = html.root_element();
        let locator = Locator::new(&["h1.new-style", "h1.old-style"]);
        assert_eq!(extract(&root, &locator), "Jane");
    }

    #[test]
    fn empty_locator_returns_empty_immediately() {
        let html = Html::parse_document("<p>hi</p>");
        let root = html.root_element();
        assert_eq!(extract(&root, &Locator::new(&[])), "");
    }

    #[test]
    fn all_miss_returns_empty_string() {
        let html = Html::parse_document("<p>hi</p>");
        let root = html.root_element();
        let locator = Locator::new(&[".nope", "#nothing", "broken["]);
        assert_eq!(extract(&root, &locator), "");
    }

    #[test]
    fn nested_whitespace_is_collapsed() {
        let html = Html::parse_document(
            "<h1 class=\"t\">\n  Jane\n  <span>Doe</span>\n</h1>",
        );
        let root = html.root_element();
        assert_eq!(extract(&root, &Locator::new(&["h1.t"])), "Jane Doe");
    }

    #[test]
    fn text_list_uses_first_candidate_with_matches() {
        let html = Html::parse_document(
            r#"<span class="new">Rust</span><span class="new"> </span>
               <span class="old">Stale</span>"#,
        );
        let root = html.root_element();
        let locator = Locator::new(&[".missing", ".new", ".old"]);
        assert_eq!(extract_text_list(&root, &locator), vec!["Rust".to_string()]);
    }

    #[test]
    fn text_list_all_miss_is_empty() {
        let html = Html::parse_document("<p>hi</p>");
        let root = html.root_element();
        assert!(extract_text_list(&root, &Locator::new(&[".nope"])).is_empty());
    }

    fn job_section_spec() -> SectionSpec {
        SectionSpec {
            container: Locator::new(&["#jobs-new", "#jobs"]),
            item_selector: "li.job".to_string(),
            item_fields: vec![
                ItemField {
                    name: "title".to_string(),
                    selectors: Locator::new(&[".title"]),
                },
                ItemField {
                    name: "company".to_string(),
                    selectors: Locator::new(&[".company"]),
                },
            ],
            identity: vec!["title".to_string(), "company".to_string()],
        }
    }

    #[test]
    fn section_keeps_partial_items_and_drops_identity_less_ones() {
        let html = Html::parse_document(
            r#"<ul id="jobs">
                <li class="job"><span class="title">Engineer</span><span class="company"></span></li>
                <li class="job"><span class="title"></span><span class="company"></span></li>
            </ul>"#,
        );
        let root = html.root_element();
        let items = extract_section(&root, &job_section_spec());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Engineer");
        assert_eq!(items[0]["company"], "");
    }

    #[test]
    fn section_preserves_document_order() {
        let html = Html::parse_document(
            r#"<ul id="jobs">
                <li class="job"><span class="title">First</span></li>
                <li class="job"><span class="title">Second</span></li>
                <li class="job"><span class="title">Third</span></li>
            </ul>"#,
        );
        let root = html.root_element();
        let items = extract_section(&root, &job_section_spec());
        let titles: Vec<&str> = items.iter().map(|i| i["title"].as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn missing_container_degrades_to_empty_section() {
        let html = Html::parse_document("<p>no jobs here</p>");
        let root = html.root_element();
        assert!(extract_section(&root, &job_section_spec()).is_empty());
    }

    #[test]
    fn empty_identity_list_means_any_field_keeps_the_item() {
        let mut spec = job_section_spec();
        spec.identity.clear();
        let html = Html::parse_document(
            r#"<ul id="jobs">
                <li class="job"><span class="company">Initech</span></li>
                <li class="job"></li>
            </ul>"#,
        );
        let root = html.root_element();
        let items = extract_section(&root, &spec);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["company"], "Initech");
    }

    #[test]
    fn assemble_fills_every_key_on_a_blank_page() {
        let html = Html::parse_document("<html><body></body></html>");
        let root = html.root_element();
        let schema = ProfileSchema::default();
        let fields = assemble(&root, &schema);
        assert_eq!(fields.len(), schema.fields.len());
        for name in schema.field_names() {
            assert!(fields[name].is_empty(), "field {} should be empty", name);
        }
        assert_eq!(fields["skills"], FieldValue::List(Vec::new()));
    }

    #[test]
    fn assemble_is_idempotent_on_an_unchanged_snapshot() {
        let html = Html::parse_document(
            r#"<h1 class="text-heading-xlarge">Jane Doe</h1>
               <div class="text-body-medium">Engineer</div>"#,
        );
        let root = html.root_element();
        let schema = ProfileSchema::default();
        let first = assemble(&root, &schema);
        let second = assemble(&root, &schema);
        assert_eq!(first, second);
    }
}
