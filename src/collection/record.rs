//! Typed collection record schema and record-level presentation helpers.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

const DISCOGS_RELEASE_PAGE_BASE: &str = "https://www.discogs.com/release";

const TYPED_COLUMNS: &[&str] = &[
    "Artist",
    "Title",
    "Label",
    "Released",
    "Format",
    "Catalog#",
    "CatalogNumber",
    "CollectionFolder",
    "Collection Media Condition",
    "MediaCondition",
    "Collection Sleeve Condition",
    "SleeveCondition",
    "Date Added",
    "DateAdded",
    "Collection Notes",
    "Notes",
    "release_id",
    "ReleaseId",
];

/// Source row index of a record; stable for the lifetime of a loaded store.
pub type RecordId = usize;

/// One album entry from the collection export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub artist: String,
    pub title: String,
    pub label: String,
    pub released: String,
    pub format: String,
    pub catalog_number: String,
    pub collection_folder: String,
    pub media_condition: String,
    pub sleeve_condition: String,
    pub date_added: String,
    pub notes: String,
    pub release_id: Option<String>,
    /// Every source column, keyed by header name.
    pub columns: BTreeMap<String, String>,
}

impl Record {
    /// Builds a record from header/value pairs. Later duplicate headers win.
    pub fn from_pairs<'a>(id: RecordId, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let columns: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();

        let field = |names: &[&str]| -> String {
            names
                .iter()
                .find_map(|name| columns.get(*name))
                .cloned()
                .unwrap_or_default()
        };
        let release_id = Some(field(&["release_id", "ReleaseId"])).filter(|id| !id.is_empty());

        Self {
            id,
            artist: field(&["Artist"]),
            title: field(&["Title"]),
            label: field(&["Label"]),
            released: field(&["Released"]),
            format: field(&["Format"]),
            catalog_number: field(&["Catalog#", "CatalogNumber"]),
            collection_folder: field(&["CollectionFolder"]),
            media_condition: field(&["Collection Media Condition", "MediaCondition"]),
            sleeve_condition: field(&["Collection Sleeve Condition", "SleeveCondition"]),
            date_added: field(&["Date Added", "DateAdded"]),
            notes: field(&["Collection Notes", "Notes"]),
            release_id,
            columns,
        }
    }

    /// Non-empty source columns that no typed field reads, sorted by header.
    pub fn additional_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter(|(header, value)| {
                !value.is_empty() && !TYPED_COLUMNS.contains(&header.as_str())
            })
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    /// External catalog page for this release, when the export carries an id.
    pub fn catalog_page_url(&self) -> Option<String> {
        self.release_id
            .as_ref()
            .map(|release_id| format!("{DISCOGS_RELEASE_PAGE_BASE}/{release_id}"))
    }

    pub fn display_released(&self) -> &str {
        non_empty_or(&self.released, "Unknown")
    }

    /// Long-form `Date Added`, e.g. `November 21, 2025`.
    pub fn display_date_added(&self) -> String {
        format_date_added(&self.date_added)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Formats an export timestamp for display. Unparseable input is shown as-is.
pub fn format_date_added(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "Unknown".to_string();
    }

    let date = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .map(|timestamp| timestamp.date())
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map(|t| t.date()))
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Grading bucket derived from a free-text media or sleeve condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionCategory {
    Mint,
    NearMint,
    VeryGoodPlus,
    VeryGood,
    GoodPlus,
    Good,
    Fair,
    Unclassified,
}

impl ConditionCategory {
    /// Style hook consumed by renderers.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Mint => "condition-mint",
            Self::NearMint => "condition-nm",
            Self::VeryGoodPlus => "condition-vgp",
            Self::VeryGood => "condition-vg",
            Self::GoodPlus => "condition-gp",
            Self::Good => "condition-g",
            Self::Fair => "condition-f",
            Self::Unclassified => "",
        }
    }
}

enum ConditionPattern {
    ContainsAny(&'static [&'static str]),
    ContainsButNot(&'static str, &'static str),
    ContainsOrEquals(&'static str, &'static str),
}

impl ConditionPattern {
    fn matches(&self, label: &str) -> bool {
        match self {
            Self::ContainsAny(needles) => needles.iter().any(|needle| label.contains(needle)),
            Self::ContainsButNot(needle, excluded) => {
                label.contains(needle) && !label.contains(excluded)
            }
            Self::ContainsOrEquals(needle, exact) => label.contains(needle) || label == *exact,
        }
    }
}

// Order matters: first match wins. The trailing "f" rule also catches any
// label containing that letter.
const CONDITION_RULES: [(ConditionPattern, ConditionCategory); 7] = [
    (ConditionPattern::ContainsAny(&["mint (m)"]), ConditionCategory::Mint),
    (
        ConditionPattern::ContainsAny(&["near mint", "nm"]),
        ConditionCategory::NearMint,
    ),
    (
        ConditionPattern::ContainsAny(&["very good plus", "vg+"]),
        ConditionCategory::VeryGoodPlus,
    ),
    (
        ConditionPattern::ContainsButNot("very good", "plus"),
        ConditionCategory::VeryGood,
    ),
    (
        ConditionPattern::ContainsAny(&["good plus", "g+"]),
        ConditionCategory::GoodPlus,
    ),
    (
        ConditionPattern::ContainsOrEquals("good (g)", "good"),
        ConditionCategory::Good,
    ),
    (ConditionPattern::ContainsAny(&["fair", "f"]), ConditionCategory::Fair),
];

/// Classifies a condition label with the ordered rule table.
pub fn classify_condition(label: &str) -> ConditionCategory {
    if label.is_empty() {
        return ConditionCategory::Unclassified;
    }
    let lowered = label.to_lowercase();
    CONDITION_RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(&lowered))
        .map(|(_, category)| *category)
        .unwrap_or(ConditionCategory::Unclassified)
}

#[cfg(test)]
mod tests {
    use super::{classify_condition, format_date_added, ConditionCategory, Record};

    fn discogs_row() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Catalog#", "SHVL 804"),
            ("Artist", "Pink Floyd"),
            ("Title", "Wish You Were Here"),
            ("Label", "Harvest"),
            ("Format", "LP, Album"),
            ("Released", "1975"),
            ("release_id", "1873013"),
            ("CollectionFolder", "Shelf A"),
            ("Date Added", "2025-11-21 19:36:00"),
            ("Collection Media Condition", "Very Good Plus (VG+)"),
            ("Collection Sleeve Condition", ""),
            ("Collection Notes", "Gatefold"),
        ]
    }

    #[test]
    fn test_from_pairs_maps_export_columns() {
        let record = Record::from_pairs(3, discogs_row());
        assert_eq!(record.id, 3);
        assert_eq!(record.catalog_number, "SHVL 804");
        assert_eq!(record.media_condition, "Very Good Plus (VG+)");
        assert_eq!(record.notes, "Gatefold");
        assert_eq!(record.release_id.as_deref(), Some("1873013"));
        assert_eq!(record.format, "LP, Album");
        assert_eq!(record.columns.get("Format").map(String::as_str), Some("LP, Album"));
    }

    #[test]
    fn test_from_pairs_defaults_missing_columns_to_empty() {
        let record = Record::from_pairs(0, vec![("Artist", "Can")]);
        assert_eq!(record.title, "");
        assert_eq!(record.collection_folder, "");
        assert_eq!(record.release_id, None);
        assert_eq!(record.format, "");
        assert_eq!(record.columns.get("Nope"), None);
        assert_eq!(record.display_released(), "Unknown");
    }

    #[test]
    fn test_additional_columns_skip_typed_and_empty_columns() {
        let mut row = discogs_row();
        row.push(("Rating", "5"));
        row.push(("Collection Genre", ""));
        row.push(("Added By", "crate digger"));
        let record = Record::from_pairs(0, row);
        let extra: Vec<(&str, &str)> = record.additional_columns().collect();
        assert_eq!(extra, vec![("Added By", "crate digger"), ("Rating", "5")]);
    }

    #[test]
    fn test_from_pairs_accepts_logical_column_names() {
        let record = Record::from_pairs(
            0,
            vec![("CatalogNumber", "X-1"), ("ReleaseId", "42"), ("Notes", "n")],
        );
        assert_eq!(record.catalog_number, "X-1");
        assert_eq!(record.notes, "n");
        assert_eq!(
            record.catalog_page_url().as_deref(),
            Some("https://www.discogs.com/release/42")
        );
    }

    #[test]
    fn test_from_pairs_later_duplicate_header_wins() {
        let record = Record::from_pairs(0, vec![("Artist", "first"), ("Artist", "second")]);
        assert_eq!(record.artist, "second");
    }

    #[test]
    fn test_format_date_added() {
        assert_eq!(format_date_added("2025-11-21 19:36:00"), "November 21, 2025");
        assert_eq!(format_date_added("2024-03-05"), "March 5, 2024");
        assert_eq!(format_date_added(""), "Unknown");
        assert_eq!(format_date_added("sometime"), "sometime");
    }

    #[test]
    fn test_classify_condition_precedence() {
        assert_eq!(classify_condition("Mint (M)"), ConditionCategory::Mint);
        assert_eq!(classify_condition("Near Mint (NM or M-)"), ConditionCategory::NearMint);
        assert_eq!(
            classify_condition("Very Good Plus (VG+)"),
            ConditionCategory::VeryGoodPlus
        );
        assert_eq!(classify_condition("Very Good (VG)"), ConditionCategory::VeryGood);
        assert_eq!(classify_condition("Good Plus (G+)"), ConditionCategory::GoodPlus);
        assert_eq!(classify_condition("Good (G)"), ConditionCategory::Good);
        assert_eq!(classify_condition("good"), ConditionCategory::Good);
        assert_eq!(classify_condition("Fair (F)"), ConditionCategory::Fair);
        assert_eq!(classify_condition("Poor (P)"), ConditionCategory::Unclassified);
        assert_eq!(classify_condition(""), ConditionCategory::Unclassified);
    }

    #[test]
    fn test_classify_condition_letter_f_catch_all() {
        assert_eq!(classify_condition("Generic Sleeve, scuffed"), ConditionCategory::Fair);
        assert_eq!(ConditionCategory::Fair.css_class(), "condition-f");
    }
}
