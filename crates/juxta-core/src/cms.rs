//! Tolerant adaptation of WordPress-REST-shaped records (`?_embed` payloads)
//! into [`Item`]s. Unknown fields are ignored; unrepresentable values are
//! dropped with a warning instead of failing the batch.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::item::{AttrValue, Item, ItemId};
use crate::text::plain_text;

/// The media size whose URL backs the image cell.
const FULL_SIZE: &str = "full";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSize {
    #[serde(default)]
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    #[serde(default)]
    pub sizes: IndexMap<String, MediaSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedMedia {
    #[serde(default)]
    pub media_details: Option<MediaDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(rename = "wp:featuredmedia")]
    #[serde(default)]
    pub featured_media: Vec<FeaturedMedia>,
}

/// One record as the CMS delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: Value,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<Rendered>,
    #[serde(default)]
    pub content: Option<Rendered>,
    #[serde(rename = "_embedded")]
    #[serde(default)]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub acf: Option<serde_json::Map<String, Value>>,
}

/// Converts one raw record. Total: every shape produces an item.
///
/// The title is flattened to plain text here because every surface shows it
/// that way; the description stays the raw HTML fragment and is normalized at
/// aggregation time. Custom fields keep the record's own key order.
pub fn item_from_raw(raw: RawItem) -> Item {
    let id = item_id_from_json(&raw.id);
    let title = raw
        .title
        .map(|title| plain_text(&title.rendered))
        .unwrap_or_default();
    let description = raw
        .content
        .map(|content| content.rendered)
        .unwrap_or_default();
    let image = raw.embedded.as_ref().and_then(featured_image_url);

    let mut attributes = IndexMap::new();
    if let Some(acf) = raw.acf {
        for (key, value) in acf {
            match AttrValue::from_json(&value) {
                Some(attr) => {
                    attributes.insert(key, attr);
                }
                None => {
                    tracing::warn!(%key, "dropping custom field with no attribute representation");
                }
            }
        }
    }

    Item {
        id,
        title,
        description,
        image,
        date: raw.date,
        attributes,
    }
}

pub fn items_from_raw(raw_items: Vec<RawItem>) -> Vec<Item> {
    raw_items.into_iter().map(item_from_raw).collect()
}

/// Parses a JSON array of raw records, e.g. a WP `/wp/v2/<type>?_embed`
/// response body.
pub fn items_from_json(payload: &str) -> Result<Vec<Item>> {
    let raw_items: Vec<RawItem> = serde_json::from_str(payload)?;
    Ok(items_from_raw(raw_items))
}

fn item_id_from_json(value: &Value) -> ItemId {
    if let Some(id) = value.as_i64() {
        return ItemId::Int(id);
    }
    if let Some(id) = value.as_str() {
        return ItemId::Str(id.to_string());
    }
    tracing::warn!(%value, "unexpected id shape, keeping its JSON text");
    ItemId::Str(value.to_string())
}

fn featured_image_url(embedded: &Embedded) -> Option<String> {
    let media = embedded.featured_media.first()?;
    let details = media.media_details.as_ref()?;
    let size = details.sizes.get(FULL_SIZE)?;
    sanitize_image_url(&size.source_url)
}

/// Image URLs must be absolute http(s); anything else is rejected rather
/// than passed through to hosts that will embed it.
fn sanitize_image_url(raw: &str) -> Option<String> {
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!(url = %raw, "rejecting featured image with unparseable URL");
            return None;
        }
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        tracing::warn!(url = %raw, "rejecting featured image with non-http scheme");
        return None;
    }
    Some(parsed.to_string())
}
