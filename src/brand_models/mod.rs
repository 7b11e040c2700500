//! Best-effort device brand/model listing from `<select>` widgets
//!
//! Phone-skin storefronts usually drive the product preview through a brand
//! dropdown and a model dropdown. Nothing here is required for the image
//! pipeline; every failure degrades to fewer (or zero) entries.

use anyhow::Result;
use log::{debug, warn};
use std::time::{Duration, Instant};

use crate::page::{ElementHandle, PageHandle};
use crate::schema::{BrandModels, SelectOption};

/// Anything that looks like a device picker
pub const DEVICE_PICKER_SELECTOR: &str = "select, [data-brand], .brand-select, .model-select";

pub const BRAND_SELECTORS: &[&str] = &[
    r#"select[name*="brand"]"#,
    r#"select[id*="brand"]"#,
    r#"select[class*="brand"]"#,
    "[data-brand]",
    ".brand-select",
    "#brand-select",
    r#"select:has(option[value*="Apple"])"#,
    r#"select:has(option[value*="Samsung"])"#,
];

pub const MODEL_SELECTORS: &[&str] = &[
    r#"select[name*="model"]"#,
    r#"select[id*="model"]"#,
    r#"select[class*="model"]"#,
    "[data-model]",
    ".model-select",
    "#model-select",
];

const BRAND_PLACEHOLDERS: &[&str] = &["Select Brand", "Choose Brand", "Select"];
const MODEL_PLACEHOLDERS: &[&str] = &["Select Model", "Choose Model", "Select"];

/// Models are not tied to a brand without driving the picker
pub const UNKNOWN_BRAND: &str = "unknown";

const PICKER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Scrape brand and model options from the page
///
/// Waits up to `picker_wait` for any device picker to appear, then takes the
/// first brand selector whose first match is a `<select>` with usable options,
/// and the first model selector with any match.
pub async fn extract_brand_models(page: &dyn PageHandle, picker_wait: Duration) -> BrandModels {
    let mut result = BrandModels::default();

    if !wait_for_picker(page, picker_wait).await {
        warn!("Device selection dropdowns not found, continuing...");
    }

    for selector in BRAND_SELECTORS {
        match brand_options(page, selector).await {
            Ok(brands) if !brands.is_empty() => {
                result.brands = brands;
                break;
            }
            Ok(_) => {}
            Err(e) => debug!("Brand selector '{selector}' failed: {e:#}"),
        }
    }

    for selector in MODEL_SELECTORS {
        match model_options(page, selector).await {
            Ok(Some(models)) => {
                if !models.is_empty() {
                    result.models.insert(UNKNOWN_BRAND.to_string(), models);
                }
                break;
            }
            Ok(None) => {}
            Err(e) => debug!("Model selector '{selector}' failed: {e:#}"),
        }
    }

    debug!(
        "Extracted {} brands, {} models",
        result.brands.len(),
        result.models.values().map(Vec::len).sum::<usize>()
    );
    result
}

async fn wait_for_picker(page: &dyn PageHandle, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if let Ok(found) = page.query_all(DEVICE_PICKER_SELECTOR).await
            && !found.is_empty()
        {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(PICKER_POLL_INTERVAL).await;
    }
}

async fn brand_options(page: &dyn PageHandle, selector: &str) -> Result<Vec<SelectOption>> {
    let elements = page.query_all(selector).await?;
    let Some(first) = elements.first() else {
        return Ok(Vec::new());
    };
    if first.tag_name().await? != "SELECT" {
        return Ok(Vec::new());
    }
    read_options(first.as_ref(), BRAND_PLACEHOLDERS).await
}

/// `None` when the selector matched nothing
async fn model_options(page: &dyn PageHandle, selector: &str) -> Result<Option<Vec<SelectOption>>> {
    let elements = page.query_all(selector).await?;
    let Some(first) = elements.first() else {
        return Ok(None);
    };
    read_options(first.as_ref(), MODEL_PLACEHOLDERS).await.map(Some)
}

async fn read_options(select: &dyn ElementHandle, placeholders: &[&str]) -> Result<Vec<SelectOption>> {
    let mut options = Vec::new();
    for option in select.query_all("option").await? {
        let Some(value) = option.attribute("value").await? else {
            continue;
        };
        if value.is_empty() || placeholders.contains(&value.as_str()) {
            continue;
        }
        let text = option.inner_text().await?.unwrap_or_default();
        options.push(SelectOption {
            value,
            text: text.trim().to_string(),
        });
    }
    Ok(options)
}
