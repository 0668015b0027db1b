use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::models::Vendor;
use crate::utils::error::AppError;
use crate::Result;

const MAX_NAME_CHARS: usize = 50;

static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static WORD_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w").unwrap());

/// What a pasted product URL resolves to before it becomes a catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub name: String,
    pub product_identifier: String,
    pub vendor: Vendor,
}

/// Derive vendor, item id and display name from a product page URL.
/// Apple pages carry no usable id, so they need the part number.
pub fn parse_product_url(raw: &str, part_number: Option<&str>) -> Result<ProductDetails> {
    let url = Url::parse(raw.trim()).map_err(|e| AppError::Validation(format!("Invalid URL: {}", e)))?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let part_number = part_number.map(str::trim).filter(|p| !p.is_empty());

    if host.contains("vivo.com") && !host.contains("iqoo.com") {
        return trailing_id(&url, "vivo", "(Vivo)", "Vivo Product", "Could not find a valid product ID in the Vivo URL.");
    }

    if host.contains("iqoo.com") {
        return trailing_id(&url, "iqoo", "(iQOO)", "iQOO Product", "Could not find a valid product ID in the iQOO URL.");
    }

    if host.contains("reliancedigital.in") {
        let segments = non_empty_segments(&url);
        let slug = segments
            .last()
            .copied()
            .filter(|slug| slug.len() >= 5)
            .ok_or_else(|| {
                AppError::Validation("Could not find a valid product slug in the Reliance Digital URL.".to_string())
            })?;
        let base = if segments.len() > 1 { segments[segments.len() - 2] } else { slug };
        let spaced = base.replace('-', " ");
        let title = WORD_START.replace_all(&spaced, |caps: &regex::Captures| caps[0].to_uppercase());

        return Ok(ProductDetails {
            name: format!("(R. Digital) {}...", truncate(&title)),
            product_identifier: slug.to_string(),
            vendor: Vendor::Unsupported("reliance_digital".to_string()),
        });
    }

    if host.contains("flipkart.com") {
        let pid = url
            .query_pairs()
            .find(|(key, value)| key == "pid" && !value.is_empty())
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| AppError::Validation("Flipkart URL is missing a \"pid\" query parameter.".to_string()))?;
        let slug = raw_segments(&url).get(1).copied().filter(|s| !s.is_empty());

        return Ok(ProductDetails {
            name: display_name("(Flipkart)", slug, "Flipkart Product"),
            product_identifier: pid,
            vendor: Vendor::Flipkart,
        });
    }

    if host.contains("amazon.in") {
        let segments = raw_segments(&url);
        let asin = segments
            .iter()
            .position(|s| *s == "dp")
            .and_then(|dp| {
                let asin = segments.get(dp + 1).copied().filter(|s| !s.is_empty())?;
                let slug = dp.checked_sub(1).and_then(|i| segments.get(i)).copied();
                Some((asin, slug))
            });
        let (asin, slug) = asin.ok_or_else(|| {
            AppError::Validation("Could not find a valid ASIN (e.g., /dp/B0CX59H5W7) in the Amazon URL.".to_string())
        })?;

        return Ok(ProductDetails {
            name: display_name("(Amazon)", slug.filter(|s| !s.is_empty()), "Amazon Product"),
            product_identifier: asin.to_string(),
            vendor: Vendor::Amazon,
        });
    }

    if host.contains("apple.com") {
        let part_number =
            part_number.ok_or_else(|| AppError::Validation("Apple products require a Part Number.".to_string()))?;
        let slug = raw_segments(&url).get(3).copied().filter(|s| !s.is_empty());

        return Ok(ProductDetails {
            name: display_name("(Apple)", slug, "Apple Product"),
            product_identifier: part_number.to_string(),
            vendor: Vendor::Unsupported("apple".to_string()),
        });
    }

    if host.contains("croma.com") {
        let segments = raw_segments(&url);
        let pid = segments
            .last()
            .copied()
            .filter(|pid| NUMERIC_ID.is_match(pid))
            .ok_or_else(|| AppError::Validation("Could not find a valid product ID in the Croma URL.".to_string()))?;
        let slug = segments.get(1).copied().filter(|s| !s.is_empty());

        return Ok(ProductDetails {
            name: display_name("(Croma)", slug, "Croma Product"),
            product_identifier: pid.to_string(),
            vendor: Vendor::Croma,
        });
    }

    Err(AppError::Validation(
        "Sorry, only Croma, Apple, Amazon, Flipkart, Vivo, iQOO, and Reliance Digital URLs are supported.".to_string(),
    ))
}

/// Vivo and iQOO: the id is the last path segment, the slug before it names the product.
fn trailing_id(url: &Url, tag: &str, prefix: &str, fallback: &str, error: &str) -> Result<ProductDetails> {
    let segments = non_empty_segments(url);
    let pid = segments
        .last()
        .filter(|pid| pid.len() >= 5)
        .ok_or_else(|| AppError::Validation(error.to_string()))?;
    let slug = segments.len().checked_sub(2).map(|i| segments[i]);

    Ok(ProductDetails {
        name: display_name(prefix, slug, fallback),
        product_identifier: pid.to_string(),
        vendor: Vendor::Unsupported(tag.to_string()),
    })
}

/// Path split on `/` keeping empty pieces, so index 0 is always the empty
/// string before the leading slash.
fn raw_segments(url: &Url) -> Vec<&str> {
    url.path().split('/').collect()
}

fn non_empty_segments(url: &Url) -> Vec<&str> {
    url.path().split('/').filter(|s| !s.is_empty()).collect()
}

fn display_name(prefix: &str, slug: Option<&str>, fallback: &str) -> String {
    let base = slug.map(|s| s.replace('-', " ")).unwrap_or_else(|| fallback.to_string());
    format!("{} {}...", prefix, truncate(&base))
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_NAME_CHARS).collect()
}
