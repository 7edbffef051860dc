//! Behavioural tests for rtx-filter
//!
//! Each test parses a small fragment, runs one filter pass and checks the
//! serialized result.

use std::cell::Cell;
use std::rc::Rc;

use rtx_dom::{DomTree, NodeId, ns};
use rtx_filter::{
    AFTER_CHILDREN, AFTER_ELEMENT, BEFORE_ELEMENT, ElementFilterRuleConfig, FilterError, FilterRuleSet,
    FilterRuleSetConfiguration, HtmlFilter, element_rule, parse_rule_set_configurations, remove_if_empty,
    rename_to, text_rule, unwrap_element,
};
use rtx_markup::{inner_html, parse_html_fragment, parse_xml, to_xml};

fn filter_html(html: &str, rules: &FilterRuleSet) -> String {
    let (mut tree, body) = parse_html_fragment(html).unwrap();
    HtmlFilter::new(rules).apply_to(&mut tree, body).unwrap();
    inner_html(&tree, body)
}

fn filter_xml(xml: &str, rules: &FilterRuleSet) -> String {
    let mut tree = parse_xml(xml).unwrap();
    let root = tree.document_element().unwrap();
    HtmlFilter::new(rules).apply_to(&mut tree, root).unwrap();
    to_xml(&tree)
}

const SAMPLE: &str = "<parent>Lorem <el>Ipsum</el> Dolor</parent>";

// ============================================================================
// NO-OP INVARIANCE
// ============================================================================

#[test]
fn test_empty_rules_leave_html_unchanged() {
    let html = r#"<p class="x">Lorem <b>Ipsum</b></p>  <!-- c --><ul><li>a</li><li>b<br></li></ul>"#;
    assert_eq!(filter_html(html, &FilterRuleSet::new()), html);
}

#[test]
fn test_empty_rules_leave_xml_unchanged() {
    let xml = r#"<div xmlns="urn:data"><p>Lorem <strong>Ipsum</strong></p> <p/></div>"#;
    assert_eq!(filter_xml(xml, &FilterRuleSet::new()), xml);
}

#[test]
fn test_rules_for_other_tags_leave_tree_unchanged() {
    let rules = FilterRuleSet::new().with_element("table", rename_to("div"));
    assert_eq!(filter_html(SAMPLE, &rules), SAMPLE);
}

// ============================================================================
// STRUCTURAL CHANGES
// ============================================================================

#[test]
fn test_remove_keeps_surrounding_text() {
    let rules = FilterRuleSet::new().with_element("el", element_rule(|params| params.node.set_remove(true)));
    assert_eq!(filter_html(SAMPLE, &rules), "<parent>Lorem  Dolor</parent>");
}

#[test]
fn test_remove_changed_mind() {
    let rules = FilterRuleSet::new().with_element(
        "el",
        element_rule(|params| {
            params.node.set_remove(true)?;
            params.node.set_remove(false)
        }),
    );
    assert_eq!(filter_html(SAMPLE, &rules), SAMPLE);
}

#[test]
fn test_replace_by_children_restarts_at_first_child() {
    let c1_visits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&c1_visits);
    let rules = FilterRuleSet::new()
        .with_element("el", unwrap_element())
        .with_element(
            "c1",
            element_rule(move |params| {
                seen.set(seen.get() + 1);
                params.node.set_attribute("visited", "true")
            }),
        );

    let out = filter_html("<parent><el><c1></c1><c2></c2></el></parent>", &rules);
    assert_eq!(out, r#"<parent><c1 visited="true"></c1><c2></c2></parent>"#);
    assert_eq!(c1_visits.get(), 1);
}

#[test]
fn test_replace_empty_by_children() {
    let rules = FilterRuleSet::new().with_element("el", unwrap_element());
    assert_eq!(filter_html("<p>a<el></el>b</p>", &rules), "<p>ab</p>");
}

#[test]
fn test_remove_children() {
    let rules = FilterRuleSet::new().with_element(
        "el",
        element_rule(|params| params.node.set_remove_children(true)),
    );
    assert_eq!(filter_html(SAMPLE, &rules), "<parent>Lorem <el></el> Dolor</parent>");
}

#[test]
fn test_remove_if_empty_after_children() {
    let rules = FilterRuleSet::new()
        .with_element("b", element_rule(|params| params.node.set_remove(true)))
        .with_element(AFTER_CHILDREN, remove_if_empty());
    let out = filter_html("<p><i> <b>x</b> </i>y</p>", &rules);
    assert_eq!(out, "<p>y</p>");
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[test]
fn test_attribute_paths_are_equivalent() {
    let via_map = FilterRuleSet::new().with_element(
        "el",
        element_rule(|params| {
            let mut attributes = params.node.attributes();
            attributes.set("x", "v")?;
            assert!(attributes.has("x"));
            assert_eq!(attributes.keys(), vec!["x"]);
            Ok(())
        }),
    );
    let via_proxy = FilterRuleSet::new().with_element(
        "el",
        element_rule(|params| {
            params.node.set_attribute("x", "v")?;
            assert!(params.node.has_attribute("x"));
            assert_eq!(params.node.attribute_names(), vec!["x"]);
            Ok(())
        }),
    );
    let expected = r#"<parent>Lorem <el x="v">Ipsum</el> Dolor</parent>"#;
    assert_eq!(filter_html(SAMPLE, &via_map), expected);
    assert_eq!(filter_html(SAMPLE, &via_proxy), expected);
}

#[test]
fn test_namespace_published_once() {
    let rules = FilterRuleSet::new().with_element(
        "a",
        element_rule(|params| params.node.set_attribute("xlink:href", "https://example.org")),
    );
    let mut tree = parse_xml(r#"<div xmlns="urn:data"><p><a>1</a></p><a>2</a></div>"#).unwrap();
    let root = tree.document_element().unwrap();
    HtmlFilter::new(&rules).apply_to(&mut tree, root).unwrap();

    let declarations: Vec<String> = tree
        .attribute_names(root)
        .into_iter()
        .filter(|name| name.starts_with("xmlns:"))
        .collect();
    assert_eq!(declarations, vec!["xmlns:xlink"]);
    assert_eq!(tree.attribute_ns(root, ns::XMLNS, "xlink"), Some(ns::XLINK));

    let xml = to_xml(&tree);
    assert_eq!(xml.matches("xmlns:xlink=").count(), 1);
    assert_eq!(xml.matches(r#"xlink:href="https://example.org""#).count(), 2);
}

#[test]
fn test_unknown_prefix_written_verbatim() {
    let rules = FilterRuleSet::new().with_element(
        "p",
        element_rule(|params| params.node.set_attribute("xdiff:changetype", "added")),
    );
    let out = filter_xml(r#"<div xmlns="urn:data"><p>x</p></div>"#, &rules);
    assert_eq!(out, r#"<div xmlns="urn:data"><p xdiff:changetype="added">x</p></div>"#);
}

#[test]
fn test_class_list_in_rule() {
    let rules = FilterRuleSet::new().with_element(
        "el",
        element_rule(|params| {
            let mut classes = params.node.class_list();
            classes.add(&["b", "a"])?;
            classes.remove(&["old"])?;
            Ok(())
        }),
    );
    let out = filter_html(r#"<el class="old  a">x</el>"#, &rules);
    assert_eq!(out, r#"<el class="a b">x</el>"#);
}

#[test]
fn test_invalid_class_token_aborts_pass() {
    let rules = FilterRuleSet::new().with_element(
        "el",
        element_rule(|params| params.node.class_list().add(&["a b"])),
    );
    let (mut tree, body) = parse_html_fragment(r#"<el class="x">y</el>"#).unwrap();
    let err = HtmlFilter::new(&rules).apply_to(&mut tree, body).unwrap_err();
    assert!(matches!(err, FilterError::InvalidToken { .. }));
    assert_eq!(inner_html(&tree, body), r#"<el class="x">y</el>"#);
}

// ============================================================================
// RENAMING
// ============================================================================

#[test]
fn test_rename_replaces_element_once() {
    let new_visits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&new_visits);
    let rules = FilterRuleSet::new()
        .with_element("el", rename_to("new"))
        .with_element(
            "new",
            element_rule(move |_| {
                seen.set(seen.get() + 1);
                Ok(())
            }),
        );

    let out = filter_html(r#"<parent><el attr="v">a<i>b</i></el></parent>"#, &rules);
    assert_eq!(out, r#"<parent><new attr="v">a<i>b</i></new></parent>"#);
    assert_eq!(new_visits.get(), 0);
}

#[test]
fn test_renamed_element_children_are_filtered() {
    let rules = FilterRuleSet::new()
        .with_element("b", rename_to("strong"))
        .with_element("i", rename_to("em"));
    let out = filter_html("<p><b>a <i>b</i></b> <i>c</i></p>", &rules);
    assert_eq!(out, "<p><strong>a <em>b</em></strong> <em>c</em></p>");
}

#[test]
fn test_after_children_sees_replacement() {
    let rules = FilterRuleSet::new()
        .with_element("b", rename_to("strong"))
        .with_element(
            AFTER_CHILDREN,
            element_rule(|params| {
                let name = params.node.name();
                params.node.set_attribute("seen-as", name)
            }),
        );
    let out = filter_html("<b>x</b>", &rules);
    assert_eq!(out, r#"<strong seen-as="strong">x</strong>"#);
}

// ============================================================================
// COMPOSITION
// ============================================================================

fn label_default() -> FilterRuleSetConfiguration {
    FilterRuleSetConfiguration::new().with_element(
        "el",
        element_rule(|params| params.node.set_attribute("label", "data")),
    )
}

#[test]
fn test_custom_rule_calling_parent_shows_both_effects() {
    let custom = FilterRuleSetConfiguration::new().with_element(
        "el",
        element_rule(|params| {
            params.parent_rule()?;
            params.node.set_name("new")
        }),
    );
    let parsed = parse_rule_set_configurations(Some(&custom), Some(&label_default()));
    let out = filter_html(SAMPLE, &parsed.to_data);
    assert_eq!(out, r#"<parent>Lorem <new label="data">Ipsum</new> Dolor</parent>"#);
}

#[test]
fn test_default_rule_calling_parent_reaches_the_bottom() {
    let calls = Rc::new(Cell::new(0));
    let counted = Rc::clone(&calls);
    let default = FilterRuleSetConfiguration::new().with_element(
        "el",
        element_rule(move |params| {
            counted.set(counted.get() + 1);
            params.parent_rule()?;
            params.node.set_attribute("label", "data")
        }),
    );
    let custom = FilterRuleSetConfiguration::new().with_element(
        "el",
        element_rule(|params| {
            params.parent_rule()?;
            params.node.set_name("new")
        }),
    );
    let parsed = parse_rule_set_configurations(Some(&custom), Some(&default));
    let out = filter_html(SAMPLE, &parsed.to_data);
    assert_eq!(out, r#"<parent>Lorem <new label="data">Ipsum</new> Dolor</parent>"#);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_custom_rule_skipping_parent_shows_own_effect_only() {
    let custom = FilterRuleSetConfiguration::new().with_element(
        "el",
        element_rule(|params| params.node.set_name("new")),
    );
    let parsed = parse_rule_set_configurations(Some(&custom), Some(&label_default()));
    let out = filter_html(SAMPLE, &parsed.to_data);
    assert_eq!(out, "<parent>Lorem <new>Ipsum</new> Dolor</parent>");
}

#[test]
fn test_fan_out_restores_identity_on_the_way_back() {
    let heading = |level: &'static str| {
        ElementFilterRuleConfig::new()
            .with_to_data(element_rule(move |params| {
                params.node.set_name("p")?;
                params.node.set_attribute("class", level)
            }))
            .with_to_view_target(
                "p",
                element_rule(move |params| {
                    if params.node.class_list().contains(level) {
                        params.node.delete_attribute("class")?;
                        params.node.set_name(level)?;
                    }
                    Ok(())
                }),
            )
    };
    let config = FilterRuleSetConfiguration::new()
        .with_element("h1", heading("h1"))
        .with_element("h2", heading("h2"));
    let parsed = parse_rule_set_configurations(Some(&config), None);

    let data = filter_html("<h1>a</h1><h2>b</h2><p>c</p>", &parsed.to_data);
    assert_eq!(data, r#"<p class="h1">a</p><p class="h2">b</p><p>c</p>"#);
    let view = filter_html(&data, &parsed.to_view);
    assert_eq!(view, "<h1>a</h1><h2>b</h2><p>c</p>");
}

// ============================================================================
// BEFORE / AFTER KEYS
// ============================================================================

#[test]
fn test_before_and_after_fire_without_tag_rule() {
    let rules = FilterRuleSet::new()
        .with_element(
            BEFORE_ELEMENT,
            element_rule(|params| {
                if params.node.name() == "el" {
                    params.node.set_attribute("order", "before")?;
                }
                Ok(())
            }),
        )
        .with_element(
            AFTER_ELEMENT,
            element_rule(|params| {
                if let Some(order) = params.node.attribute("order").map(str::to_string) {
                    params.node.set_attribute("order", format!("{order} after"))?;
                }
                Ok(())
            }),
        );
    let out = filter_html(SAMPLE, &rules);
    assert_eq!(out, r#"<parent>Lorem <el order="before after">Ipsum</el> Dolor</parent>"#);
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_text_rule_rewrites_text() {
    let rules = FilterRuleSet::new().with_text(text_rule(|params| {
        let upper = params.node.text_content().to_uppercase();
        params.node.set_text_content(upper)
    }));
    assert_eq!(filter_html(SAMPLE, &rules), "<parent>LOREM <el>IPSUM</el> DOLOR</parent>");
}

#[test]
fn test_text_rule_removes_whitespace_only_text() {
    let rules = FilterRuleSet::new().with_text(text_rule(|params| {
        if params.node.text_content().trim().is_empty() {
            params.node.set_remove(true)?;
        }
        Ok(())
    }));
    assert_eq!(filter_html("<p>a</p>\n <p>b</p> ", &rules), "<p>a</p><p>b</p>");
}

#[test]
fn test_text_rule_sees_parent_element() {
    let rules = FilterRuleSet::new().with_text(text_rule(|params| {
        let in_el = params.node.parent_element().is_some_and(|parent| parent.name() == "el");
        if in_el {
            params.node.set_text_content("*")?;
        }
        Ok(())
    }));
    assert_eq!(filter_html(SAMPLE, &rules), "<parent>Lorem <el>*</el> Dolor</parent>");
}

// ============================================================================
// HELPERS
// ============================================================================

fn element_count(tree: &DomTree, parent: NodeId) -> usize {
    tree.children(parent).filter(|(_, node)| node.is_element()).count()
}

#[test]
fn test_deep_tree_is_fully_visited() {
    let depth = 64;
    let html = format!("{}x{}", "<span>".repeat(depth), "</span>".repeat(depth));
    let rules = FilterRuleSet::new().with_element("span", rename_to("em"));
    let (mut tree, body) = parse_html_fragment(&html).unwrap();
    HtmlFilter::new(&rules).apply_to(&mut tree, body).unwrap();

    let out = inner_html(&tree, body);
    assert_eq!(out.matches("<em>").count(), depth);
    assert!(!out.contains("span"));
    assert_eq!(element_count(&tree, body), 1);
}
