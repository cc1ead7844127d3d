//! Side-by-side aggregation of selected items into a comparison table.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::item::{AttrValue, Item, ItemId, Scalar};
use crate::label::format_machine_name;
use crate::text::normalize_lines;

/// Display value for cells with nothing to show.
pub const MISSING_VALUE: &str = "N/A";
/// Separator between the elements of a list-valued cell.
pub const LIST_SEPARATOR: &str = ", ";

/// Well-known keys of the identity rows.
pub const IMAGE_KEY: &str = "image";
pub const TITLE_KEY: &str = "title";
pub const DESCRIPTION_KEY: &str = "description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Image,
    Title,
    Description,
    Attribute,
}

/// One table row: a display value per selected item, keyed and ordered by the
/// selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub kind: RowKind,
    pub key: String,
    pub label: String,
    pub values: IndexMap<ItemId, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Selection order, duplicates collapsed onto their first occurrence;
    /// every row's `values` iterates in this order.
    pub item_ids: Vec<ItemId>,
    pub rows: Vec<ComparisonRow>,
    /// Union of attribute keys across the compared items in first-seen order,
    /// regardless of any active-criteria filter.
    pub attribute_keys: IndexSet<String>,
}

/// An attribute key with its display label, for hosts building criteria
/// pickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Emit the Image/Title rows ahead of the description row.
    pub identity_rows: bool,
    /// Label overrides by machine key; identity row labels go through the
    /// same map, so hosts can relabel `title` and friends too.
    pub label_overrides: IndexMap<String, String>,
    /// When set, only attribute rows whose key is in the set are emitted.
    /// Identity rows and `attribute_keys` are unaffected.
    pub active_criteria: Option<IndexSet<String>>,
}

/// Builds the comparison table for `items`, in their given order.
///
/// The description row is always emitted; [`CompareOptions::identity_rows`]
/// adds the Image/Title rows ahead of it. Attribute rows follow the
/// first-seen union of the items' keys: the first item's keys in its own
/// order, then keys only later items introduce. A cell shows
/// [`MISSING_VALUE`] when the item has no such key, an empty string there,
/// or an empty list; lists join with [`LIST_SEPARATOR`]. Numeric `0` and
/// boolean `false` display literally.
///
/// Total over its inputs: zero items produce a table with empty columns.
pub fn aggregate(items: &[Item], options: &CompareOptions) -> ComparisonResult {
    let mut item_ids: Vec<ItemId> = Vec::new();
    for item in items {
        if !item_ids.contains(&item.id) {
            item_ids.push(item.id.clone());
        }
    }
    let attribute_keys = attribute_key_union(items);

    let mut rows = Vec::new();
    if options.identity_rows {
        rows.push(identity_row(RowKind::Image, IMAGE_KEY, items, options, |item| {
            item.image.clone().unwrap_or_default()
        }));
        rows.push(identity_row(RowKind::Title, TITLE_KEY, items, options, |item| {
            item.title.clone()
        }));
    }
    rows.push(identity_row(
        RowKind::Description,
        DESCRIPTION_KEY,
        items,
        options,
        |item| description_cell(&item.description),
    ));

    for key in &attribute_keys {
        if let Some(active) = &options.active_criteria {
            if !active.contains(key) {
                continue;
            }
        }
        let mut values = IndexMap::new();
        for item in items {
            values.insert(item.id.clone(), attribute_cell(item.attributes.get(key)));
        }
        rows.push(ComparisonRow {
            kind: RowKind::Attribute,
            key: key.clone(),
            label: format_machine_name(key, &options.label_overrides),
            values,
        });
    }

    ComparisonResult {
        item_ids,
        rows,
        attribute_keys,
    }
}

/// The unfiltered attribute-key union as (key, label) pairs.
pub fn criterion_options(
    items: &[Item],
    overrides: &IndexMap<String, String>,
) -> Vec<Criterion> {
    attribute_key_union(items)
        .into_iter()
        .map(|key| Criterion {
            label: format_machine_name(&key, overrides),
            key,
        })
        .collect()
}

fn attribute_key_union(items: &[Item]) -> IndexSet<String> {
    let mut keys = IndexSet::new();
    for item in items {
        for key in item.attributes.keys() {
            keys.insert(key.clone());
        }
    }
    keys
}

fn identity_row(
    kind: RowKind,
    key: &str,
    items: &[Item],
    options: &CompareOptions,
    cell: impl Fn(&Item) -> String,
) -> ComparisonRow {
    let mut values = IndexMap::new();
    for item in items {
        values.insert(item.id.clone(), cell(item));
    }
    ComparisonRow {
        kind,
        key: key.to_string(),
        label: format_machine_name(key, &options.label_overrides),
        values,
    }
}

fn description_cell(html: &str) -> String {
    let lines = normalize_lines(html);
    if lines.is_empty() {
        MISSING_VALUE.to_string()
    } else {
        lines.join("\n")
    }
}

fn attribute_cell(value: Option<&AttrValue>) -> String {
    match value {
        None => MISSING_VALUE.to_string(),
        Some(AttrValue::Scalar(Scalar::Text(text))) if text.is_empty() => {
            MISSING_VALUE.to_string()
        }
        Some(AttrValue::Scalar(scalar)) => scalar.to_string(),
        Some(AttrValue::List(elements)) if elements.is_empty() => MISSING_VALUE.to_string(),
        Some(AttrValue::List(elements)) => elements
            .iter()
            .map(Scalar::to_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_with_attrs(id: i64, title: &str, attrs: &[(&str, serde_json::Value)]) -> Item {
        let mut item = Item::new(id, title);
        for (key, value) in attrs {
            if let Some(value) = AttrValue::from_json(value) {
                item.attributes.insert(key.to_string(), value);
            }
        }
        item
    }

    fn attribute_rows(result: &ComparisonResult) -> Vec<&str> {
        result
            .rows
            .iter()
            .filter(|row| row.kind == RowKind::Attribute)
            .map(|row| row.key.as_str())
            .collect()
    }

    #[test]
    fn union_follows_first_seen_order() {
        let items = vec![
            item_with_attrs(1, "A", &[("color", json!("red")), ("size", json!("M"))]),
            item_with_attrs(2, "B", &[("size", json!("L")), ("weight", json!("2kg"))]),
        ];
        let result = aggregate(&items, &CompareOptions::default());
        assert_eq!(attribute_rows(&result), vec!["color", "size", "weight"]);
        assert_eq!(
            result.attribute_keys.iter().collect::<Vec<_>>(),
            vec!["color", "size", "weight"]
        );
    }

    #[test]
    fn missing_empty_and_empty_list_cells_show_the_sentinel() {
        let items = vec![
            item_with_attrs(
                1,
                "A",
                &[
                    ("color", json!("red")),
                    ("notes", json!("")),
                    ("extras", json!([])),
                ],
            ),
            item_with_attrs(2, "B", &[]),
        ];
        let result = aggregate(&items, &CompareOptions::default());
        let by_key = |key: &str| {
            result
                .rows
                .iter()
                .find(|row| row.key == key)
                .map(|row| row.values.values().cloned().collect::<Vec<_>>())
                .unwrap()
        };
        assert_eq!(by_key("color"), vec!["red", "N/A"]);
        assert_eq!(by_key("notes"), vec!["N/A", "N/A"]);
        assert_eq!(by_key("extras"), vec!["N/A", "N/A"]);
    }

    #[test]
    fn zero_and_false_display_literally() {
        let items = vec![item_with_attrs(
            1,
            "A",
            &[("doors", json!(0)), ("hybrid", json!(false))],
        )];
        let result = aggregate(&items, &CompareOptions::default());
        assert_eq!(result.rows[1].values[&ItemId::Int(1)], "0");
        assert_eq!(result.rows[2].values[&ItemId::Int(1)], "false");
    }

    #[test]
    fn lists_join_with_comma_space() {
        let items = vec![item_with_attrs(
            1,
            "A",
            &[("options", json!(["ABS", "Airbags", 2024]))],
        )];
        let result = aggregate(&items, &CompareOptions::default());
        assert_eq!(result.rows[1].values[&ItemId::Int(1)], "ABS, Airbags, 2024");
    }

    #[test]
    fn identity_rows_come_first_in_fixed_order() {
        let mut item = item_with_attrs(1, "Model S", &[("range", json!("600km"))]);
        item.image = Some("https://cms.example/full.jpg".to_string());
        item.description = "<p>Line one</p><br><p>Line two</p>".to_string();

        let options = CompareOptions {
            identity_rows: true,
            ..CompareOptions::default()
        };
        let result = aggregate(&[item], &options);

        let kinds: Vec<RowKind> = result.rows.iter().map(|row| row.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Image,
                RowKind::Title,
                RowKind::Description,
                RowKind::Attribute
            ]
        );
        assert_eq!(
            result.rows[0].values[&ItemId::Int(1)],
            "https://cms.example/full.jpg"
        );
        assert_eq!(result.rows[1].values[&ItemId::Int(1)], "Model S");
        assert_eq!(result.rows[2].values[&ItemId::Int(1)], "Line one\nLine two");
    }

    #[test]
    fn identity_cells_without_content() {
        let item = Item::new(1, "Bare");
        let options = CompareOptions {
            identity_rows: true,
            ..CompareOptions::default()
        };
        let result = aggregate(&[item], &options);
        // No image renders as an empty cell, not as the sentinel.
        assert_eq!(result.rows[0].values[&ItemId::Int(1)], "");
        assert_eq!(result.rows[2].values[&ItemId::Int(1)], MISSING_VALUE);
    }

    #[test]
    fn description_row_survives_without_identity_rows() {
        let mut item = item_with_attrs(1, "A", &[("color", json!("red"))]);
        item.description = "<p>Summary</p>".to_string();
        let result = aggregate(&[item], &CompareOptions::default());
        assert_eq!(result.rows[0].kind, RowKind::Description);
        assert_eq!(result.rows[0].values[&ItemId::Int(1)], "Summary");
        assert_eq!(result.rows[1].kind, RowKind::Attribute);
    }

    #[test]
    fn active_criteria_filters_rows_but_not_the_union() {
        let items = vec![
            item_with_attrs(1, "A", &[("color", json!("red")), ("size", json!("M"))]),
            item_with_attrs(2, "B", &[("weight", json!("2kg"))]),
        ];
        let options = CompareOptions {
            active_criteria: Some(IndexSet::from(["weight".to_string()])),
            ..CompareOptions::default()
        };
        let result = aggregate(&items, &options);
        assert_eq!(attribute_rows(&result), vec!["weight"]);
        assert_eq!(
            result.attribute_keys.iter().collect::<Vec<_>>(),
            vec!["color", "size", "weight"]
        );
    }

    #[test]
    fn labels_apply_overrides_to_attribute_and_identity_rows() {
        let items = vec![item_with_attrs(1, "A", &[("fuel_type", json!("Diesel"))])];
        let mut overrides = IndexMap::new();
        overrides.insert("fuel_type".to_string(), "Carburant".to_string());
        overrides.insert("title".to_string(), "Titre".to_string());
        let options = CompareOptions {
            identity_rows: true,
            label_overrides: overrides,
            ..CompareOptions::default()
        };
        let result = aggregate(&items, &options);
        assert_eq!(result.rows[1].label, "Titre");
        assert_eq!(result.rows[3].label, "Carburant");
    }

    #[test]
    fn columns_follow_selection_order() {
        let a = item_with_attrs(1, "A", &[("color", json!("red"))]);
        let b = item_with_attrs(2, "B", &[("color", json!("blue"))]);

        let forward = aggregate(&[a.clone(), b.clone()], &CompareOptions::default());
        assert_eq!(forward.item_ids, vec![ItemId::Int(1), ItemId::Int(2)]);
        assert_eq!(
            forward.rows[1].values.keys().collect::<Vec<_>>(),
            vec![&ItemId::Int(1), &ItemId::Int(2)]
        );

        let reversed = aggregate(&[b, a], &CompareOptions::default());
        assert_eq!(reversed.item_ids, vec![ItemId::Int(2), ItemId::Int(1)]);
        assert_eq!(
            reversed.rows[1].values.values().collect::<Vec<_>>(),
            vec!["blue", "red"]
        );
    }

    #[test]
    fn zero_items_produce_empty_columns() {
        let options = CompareOptions {
            identity_rows: true,
            ..CompareOptions::default()
        };
        let result = aggregate(&[], &options);
        assert_eq!(result.item_ids, Vec::<ItemId>::new());
        assert_eq!(result.rows.len(), 3);
        assert!(result.rows.iter().all(|row| row.values.is_empty()));
        assert!(result.attribute_keys.is_empty());
    }

    #[test]
    fn duplicate_selection_collapses_to_one_column() {
        let item = item_with_attrs(1, "A", &[("color", json!("red"))]);
        let result = aggregate(&[item.clone(), item], &CompareOptions::default());
        assert_eq!(result.item_ids, vec![ItemId::Int(1)]);
        assert!(result.rows.iter().all(|row| row.values.len() == 1));
    }

    #[test]
    fn criterion_options_pair_keys_with_labels() {
        let items = vec![
            item_with_attrs(1, "A", &[("fuel_type", json!("Diesel"))]),
            item_with_attrs(2, "B", &[("co2-emissions", json!(95))]),
        ];
        let criteria = criterion_options(&items, &IndexMap::new());
        assert_eq!(
            criteria,
            vec![
                Criterion {
                    key: "fuel_type".to_string(),
                    label: "Fuel Type".to_string()
                },
                Criterion {
                    key: "co2-emissions".to_string(),
                    label: "Co2 Emissions".to_string()
                },
            ]
        );
    }
}
