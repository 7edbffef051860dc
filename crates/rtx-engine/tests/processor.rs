//! End-to-end conversion tests for rtx-engine
//!
//! A small rule configuration in the style of a rich text editor: bold and
//! italic map to `strong`/`em`, headings are stored as classed paragraphs and
//! links carry their target as `xlink:href`.

use rtx_engine::filter::{
    AFTER_CHILDREN, ElementFilterRuleConfig, FilterError, FilterRuleSetConfiguration, TextFilterRuleConfig,
    element_rule, remove_if_empty, rename_to, resolve_attribute_aliases, text_rule,
};
use rtx_engine::{DataProcessor, ProcessorConfig, ProcessorError};

const DATA_NS: &str = "http://www.coremedia.com/2003/richtext-1.0";

fn heading(level: &'static str) -> ElementFilterRuleConfig {
    let class = format!("p--heading-{}", &level[1..]);
    let view_class = class.clone();
    ElementFilterRuleConfig::new()
        .with_to_data(element_rule(move |params| {
            params.node.set_name("p")?;
            params.node.class_list().add(&[class.as_str()])
        }))
        .with_to_view_target(
            "p",
            element_rule(move |params| {
                let mut classes = params.node.class_list();
                if classes.contains(&view_class) {
                    classes.remove(&[view_class.as_str()])?;
                    if classes.is_empty() {
                        params.node.delete_attribute("class")?;
                    }
                    params.node.set_name(level)?;
                }
                Ok(())
            }),
        )
}

fn configuration() -> FilterRuleSetConfiguration {
    FilterRuleSetConfiguration::new()
        .with_element(
            "b",
            ElementFilterRuleConfig::new()
                .with_to_data(rename_to("strong"))
                .with_to_view_target("strong", rename_to("b")),
        )
        .with_element("i", rename_to("em"))
        .with_element("h1", heading("h1"))
        .with_element("h2", heading("h2"))
        .with_element(
            "a",
            ElementFilterRuleConfig::new()
                .with_to_data(element_rule(|params| {
                    resolve_attribute_aliases(params.node, "href", &["data-href"])?;
                    if let Some(href) = params.node.attribute("href").map(str::to_string) {
                        params.node.delete_attribute("href")?;
                        params.node.set_attribute("xlink:href", href)?;
                    }
                    Ok(())
                }))
                .with_to_view(element_rule(|params| {
                    if let Some(href) = params.node.attribute("xlink:href").map(str::to_string) {
                        params.node.delete_attribute("xlink:href")?;
                        params.node.set_attribute("href", href)?;
                    }
                    Ok(())
                })),
        )
        .with_element("span", ElementFilterRuleConfig::new().with_to_data(element_rule(|params| {
            params.node.set_replace_by_children(true)
        })))
        .with_element(AFTER_CHILDREN, ElementFilterRuleConfig::new().with_to_data(element_rule(|params| {
            if params.node.name() == "p" {
                params.parent_rule()?;
            }
            Ok(())
        })))
        .with_text(TextFilterRuleConfig::new().with_to_data(text_rule(|params| {
            let text = params.node.text_content().replace('\u{a0}', " ");
            params.node.set_text_content(text)
        })))
}

fn processor() -> DataProcessor {
    DataProcessor::from_configurations(ProcessorConfig::default(), Some(&configuration()), None)
}

// ============================================================================
// TO DATA
// ============================================================================

#[test]
fn test_inline_formatting_to_data() {
    let xml = processor().to_data("<p><b>bold</b> and <i>italic</i></p>").unwrap();
    assert_eq!(
        xml,
        format!(r#"<div xmlns="{DATA_NS}"><p><strong>bold</strong> and <em>italic</em></p></div>"#)
    );
}

#[test]
fn test_heading_to_data() {
    let xml = processor().to_data("<h1>Title</h1><h2>Sub</h2>").unwrap();
    assert_eq!(
        xml,
        format!(
            r#"<div xmlns="{DATA_NS}"><p class="p--heading-1">Title</p><p class="p--heading-2">Sub</p></div>"#
        )
    );
}

#[test]
fn test_link_to_data_declares_xlink() {
    let xml = processor()
        .to_data(r#"<p><a data-href="https://example.org">x</a></p>"#)
        .unwrap();
    assert_eq!(
        xml,
        format!(
            r#"<div xmlns:xlink="http://www.w3.org/1999/xlink" xmlns="{DATA_NS}"><p><a xlink:href="https://example.org">x</a></p></div>"#
        )
    );
}

#[test]
fn test_span_unwrapped_and_nbsp_replaced() {
    let xml = processor().to_data("<p><span>a&nbsp;<b>b</b></span></p>").unwrap();
    assert_eq!(xml, format!(r#"<div xmlns="{DATA_NS}"><p>a <strong>b</strong></p></div>"#));
}

// ============================================================================
// TO VIEW
// ============================================================================

#[test]
fn test_heading_to_view() {
    let html = processor()
        .to_view(&format!(
            r#"<div xmlns="{DATA_NS}"><p class="p--heading-1">Title</p><p class="x p--heading-2">Sub</p><p>Text</p></div>"#
        ))
        .unwrap();
    assert_eq!(html, r#"<h1>Title</h1><h2 class="x">Sub</h2><p>Text</p>"#);
}

#[test]
fn test_link_to_view() {
    let html = processor()
        .to_view(&format!(
            r#"<div xmlns="{DATA_NS}" xmlns:xlink="http://www.w3.org/1999/xlink"><p><a xlink:href="https://example.org">x</a></p></div>"#
        ))
        .unwrap();
    assert_eq!(html, r#"<p><a href="https://example.org">x</a></p>"#);
}

#[test]
fn test_roundtrip() {
    let processor = processor();
    let view = "<h1>Title</h1><p><b>bold</b> text</p>";
    let data = processor.to_data(view).unwrap();
    assert_eq!(processor.to_view(&data).unwrap(), view);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_rule_error_surfaces() {
    let rules = FilterRuleSetConfiguration::new()
        .with_element("script", element_rule(|_| Err(FilterError::rule("scripts are not allowed"))));
    let processor = DataProcessor::from_configurations(ProcessorConfig::default(), Some(&rules), None);

    let err = processor.to_data("<p>a</p><script>x</script>").unwrap_err();
    assert!(matches!(err, ProcessorError::Filter(FilterError::Rule(_))));
    assert_eq!(err.to_string(), "Filter error: Rule failed: scripts are not allowed");
}

#[test]
fn test_data_without_root() {
    let err = processor().to_view("<!-- nothing -->").unwrap_err();
    assert!(matches!(err, ProcessorError::MissingRoot));
}

#[test]
fn test_empty_paragraph_rule_layering() {
    let default = FilterRuleSetConfiguration::new().with_element(AFTER_CHILDREN, remove_if_empty());
    let processor = DataProcessor::from_configurations(
        ProcessorConfig::default(),
        Some(&configuration()),
        Some(&default),
    );
    let xml = processor.to_data("<p> </p><h1>x</h1><ul><li></li></ul>").unwrap();
    // the custom `$$` rule only delegates for paragraphs
    assert_eq!(
        xml,
        format!(r#"<div xmlns="{DATA_NS}"><p class="p--heading-1">x</p><ul><li/></ul></div>"#)
    );
}
