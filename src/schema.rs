use serde::Deserialize;

/// Ordered list of candidate CSS selectors for one logical field.
/// Newest page layout first, legacy fallbacks last; the first candidate
/// that produces a non-empty match wins.
#[derive(Debug, Clone, Deserialize)]
pub struct Locator(pub Vec<String>);

impl Locator {
    pub fn new(selectors: &[&str]) -> Self {
        Locator(selectors.iter().map(|s| s.to_string()).collect())
    }

    pub fn candidates(&self) -> &[String] {
        &self.0
    }

    /// All candidates as one selector group, for driver-side waits.
    pub fn as_selector_group(&self) -> String {
        self.0.join(", ")
    }
}

/// One sub-field of a repeating list item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemField {
    pub name: String,
    pub selectors: Locator,
}

/// A repeating list section: container, item selector, per-item fields.
/// An item is kept only if at least one identity sub-field is non-empty;
/// an empty identity list means every sub-field counts as identity.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionSpec {
    pub container: Locator,
    pub item_selector: String,
    #[serde(default)]
    pub item_fields: Vec<ItemField>,
    #[serde(default)]
    pub identity: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text { selectors: Locator },
    TextList { selectors: Locator },
    Section(SectionSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// The full extraction schema: fields in assembly order.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSchema {
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,
}

impl Default for ProfileSchema {
    fn default() -> Self {
        ProfileSchema {
            fields: default_fields(),
        }
    }
}

impl ProfileSchema {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

// Built-in LinkedIn selector set. Overridable via [schema] in Config.toml.
fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            name: "name".to_string(),
            kind: FieldKind::Text {
                selectors: Locator::new(&[
                    "h1.text-heading-xlarge",
                    "h1.top-card-layout__title",
                    ".pv-top-card--list li.inline",
                ]),
            },
        },
        FieldSpec {
            name: "headline".to_string(),
            kind: FieldKind::Text {
                selectors: Locator::new(&[
                    ".text-body-medium",
                    ".top-card-layout__headline",
                    ".ph5.pb5 .mt2",
                ]),
            },
        },
        FieldSpec {
            name: "location".to_string(),
            kind: FieldKind::Text {
                selectors: Locator::new(&[
                    ".top-card--list-bullet",
                    ".top-card-layout__first-subline",
                    ".pv-top-card--list.pv-top-card--list-bullet",
                ]),
            },
        },
        FieldSpec {
            name: "about".to_string(),
            kind: FieldKind::Text {
                selectors: Locator::new(&[
                    "div.inline-show-more-text",
                    "section.summary",
                    ".pv-about-section",
                    ".pv-about__summary-text",
                ]),
            },
        },
        FieldSpec {
            name: "experience".to_string(),
            kind: FieldKind::Section(SectionSpec {
                container: Locator::new(&["#experience-section", "section.experience-section"]),
                item_selector: "li.artdeco-list__item".to_string(),
                item_fields: vec![
                    ItemField {
                        name: "title".to_string(),
                        selectors: Locator::new(&[".t-bold span", ".t-16.t-black.t-bold"]),
                    },
                    ItemField {
                        name: "company".to_string(),
                        selectors: Locator::new(&[".t-14.t-normal", ".pv-entity__secondary-title"]),
                    },
                    ItemField {
                        name: "duration".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__date-range span:nth-child(2)",
                            ".experience-item__duration",
                        ]),
                    },
                    ItemField {
                        name: "location".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__location span:nth-child(2)",
                            ".experience-item__location",
                        ]),
                    },
                    ItemField {
                        name: "description".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__description",
                            ".experience-item__description",
                        ]),
                    },
                ],
                identity: vec!["title".to_string(), "company".to_string()],
            }),
        },
        FieldSpec {
            name: "education".to_string(),
            kind: FieldKind::Section(SectionSpec {
                container: Locator::new(&["#education-section", "section.education-section"]),
                item_selector: ".pv-education-entity, .pv-profile-section__list-item".to_string(),
                item_fields: vec![
                    ItemField {
                        name: "school".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__school-name",
                            ".education__school-name",
                        ]),
                    },
                    ItemField {
                        name: "degree".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__degree-name",
                            ".education__item--degree-info",
                        ]),
                    },
                    ItemField {
                        name: "field".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__fos",
                            ".education__item--field-of-study",
                        ]),
                    },
                    ItemField {
                        name: "dates".to_string(),
                        selectors: Locator::new(&[
                            ".pv-entity__dates",
                            ".education__item--duration",
                        ]),
                    },
                ],
                identity: vec!["school".to_string()],
            }),
        },
        FieldSpec {
            name: "skills".to_string(),
            kind: FieldKind::TextList {
                selectors: Locator::new(&[
                    ".pv-skill-category-entity__name-text",
                    ".pv-skill-category-entity__name",
                    ".skill-category-entity__name",
                ]),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_lists_fields_in_assembly_order() {
        let schema = ProfileSchema::default();
        assert_eq!(
            schema.field_names(),
            vec![
                "name",
                "headline",
                "location",
                "about",
                "experience",
                "education",
                "skills"
            ]
        );
    }

    #[test]
    fn custom_schema_parses_from_toml() {
        let toml_src = r##"
            [[fields]]
            name = "name"
            kind = "text"
            selectors = ["h1.new-style", "h1.old-style"]

            [[fields]]
            name = "tags"
            kind = "text_list"
            selectors = [".tag"]

            [[fields]]
            name = "jobs"
            kind = "section"
            container = ["#jobs"]
            item_selector = "li.job"
            identity = ["title"]

            [[fields.item_fields]]
            name = "title"
            selectors = [".job-title"]
        "##;
        let schema: ProfileSchema = toml::from_str(toml_src).unwrap();
        assert_eq!(schema.field_names(), vec!["name", "tags", "jobs"]);
        match &schema.fields[2].kind {
            FieldKind::Section(spec) => {
                assert_eq!(spec.container.candidates(), &["#jobs".to_string()]);
                assert_eq!(spec.item_selector, "li.job");
                assert_eq!(spec.item_fields.len(), 1);
                assert_eq!(spec.identity, vec!["title".to_string()]);
            }
            other => panic!("expected section field, got {:?}", other),
        }
    }

    #[test]
    fn selector_group_joins_candidates() {
        let locator = Locator::new(&["#a", ".b"]);
        assert_eq!(locator.as_selector_group(), "#a, .b");
    }
}
