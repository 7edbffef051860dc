//! Example: converting an HTML view to data and back
//!
//! Run with `RUST_LOG=rtx_filter=trace` to follow every visited node.

use rtx_engine::filter::{ElementFilterRuleConfig, FilterRuleSetConfiguration, rename_to, unwrap_element};
use rtx_engine::{DataProcessor, ProcessorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rules = FilterRuleSetConfiguration::new()
        .with_element(
            "b",
            ElementFilterRuleConfig::new()
                .with_to_data(rename_to("strong"))
                .with_to_view_target("strong", rename_to("b")),
        )
        .with_element(
            "i",
            ElementFilterRuleConfig::new()
                .with_to_data(rename_to("em"))
                .with_to_view_target("em", rename_to("i")),
        )
        .with_element("font", unwrap_element());
    let processor = DataProcessor::from_configurations(ProcessorConfig::default(), Some(&rules), None);

    let view = r#"<p>Some <b>bold</b>, <i>italic</i> and <font color="red">plain</font> text.</p>"#;
    let data = processor.to_data(view)?;
    let back = processor.to_view(&data)?;

    println!("rtx v{}", rtx_engine::VERSION);
    println!("view: {view}");
    println!("data: {data}");
    println!("back: {back}");
    Ok(())
}
