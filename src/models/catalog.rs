//! Raw exhibitor records as the EventX catalog returns them.
//!
//! The catalog is inconsistent about shapes: industries show up as strings or
//! `{name}` objects, one or many, at the top level or inside one or many
//! `form3_data_entry` blocks; flags come back as `true`, `1` or `"1"`. Every
//! field here deserializes leniently so an odd shape degrades to "absent"
//! instead of failing the whole record.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Deserialize a field, falling back to its default when the shape is unexpected.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A value the catalog may send as a single item or a list of items.
///
/// Elements are read one at a time: a list element of the wrong shape is
/// dropped without discarding its siblings, and nested lists are never read
/// as items.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter(|item| !item.is_array() && !item.is_null())
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            Value::Null => Vec::new(),
            single => match serde_json::from_value(single) {
                Ok(item) => return Ok(OneOrMany::One(item)),
                Err(_) => Vec::new(),
            },
        };
        Ok(OneOrMany::Many(items))
    }
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// An industry, tag or product label: a bare string or a `{name}` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelEntry {
    Text(String),
    Named {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        en_name: Option<String>,
    },
    Unrecognized(Value),
}

impl LabelEntry {
    /// The display label, if the entry carries a non-blank one.
    pub fn label(&self) -> Option<&str> {
        let raw = match self {
            LabelEntry::Text(text) => Some(text.as_str()),
            LabelEntry::Named { name, en_name } => name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .or(en_name.as_deref()),
            LabelEntry::Unrecognized(_) => None,
        };
        raw.map(str::trim).filter(|label| !label.is_empty())
    }
}

/// Loosely typed scalar used for ids, flags and counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Unrecognized(Value),
}

impl Scalar {
    /// `true`, non-zero numbers, `"1"`, `"true"` and `"yes"` are set.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Bool(flag) => *flag,
            Scalar::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
            Scalar::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            Scalar::Unrecognized(_) => false,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            Scalar::Number(number) => number
                .as_u64()
                .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
                .map(|n| n.min(u32::MAX as u64) as u32),
            Scalar::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<String> {
        match self {
            Scalar::Number(number) => match (number.as_u64(), number.as_i64(), number.as_f64()) {
                (Some(n), _, _) => Some(n.to_string()),
                (None, Some(n), _) => Some(n.to_string()),
                (None, None, Some(n)) if n.is_finite() && n.fract() == 0.0 => {
                    Some(format!("{:.0}", n))
                }
                _ => Some(number.to_string()),
            },
            Scalar::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        }
    }
}

/// Sponsorship flags, found either on the exhibitor or on its `event_user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SponsorFlags {
    #[serde(default, deserialize_with = "lenient")]
    pub is_platinum_sponsorship: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub gold_sponsorship: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub silver_sponsorship: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BadgeRef {
    #[serde(default, deserialize_with = "lenient")]
    pub badge_user: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<UserRef>,
}

impl BadgeRef {
    /// Every user the badge points at, `badge_user` first.
    pub fn users(&self) -> impl Iterator<Item = &UserRef> {
        self.badge_user.iter().chain(self.user.iter())
    }
}

/// A nested company-profile block (`form3_data_entry`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Form3Entry {
    #[serde(default, deserialize_with = "lenient")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_industries: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub industries: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub products: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_profile: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<UserRef>,
}

/// Exhibitor record straight from the catalog, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExhibitor {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub en_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub company_industries: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub industries: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<OneOrMany<LabelEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    pub products: Option<OneOrMany<LabelEntry>>,

    #[serde(default, deserialize_with = "lenient")]
    pub company_description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_profile: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub about: Option<String>,

    #[serde(default, alias = "sponsorLevel", deserialize_with = "lenient")]
    pub sponsor_level: Option<String>,
    #[serde(flatten)]
    pub sponsorship: SponsorFlags,
    #[serde(default, deserialize_with = "lenient")]
    pub event_user: Option<SponsorFlags>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_partner: Option<Scalar>,

    #[serde(default, alias = "teamCount", deserialize_with = "lenient")]
    pub team_count: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub exhibitor_badges: Option<OneOrMany<BadgeRef>>,
    #[serde(default, deserialize_with = "lenient")]
    pub form3_data_entry: Option<OneOrMany<Form3Entry>>,
}

impl RawExhibitor {
    /// Catalog id as a string, if present.
    pub fn exhibitor_id(&self) -> Option<String> {
        self.id.as_ref().and_then(Scalar::as_id)
    }

    /// First non-blank display name, preferring the nested company name.
    pub fn display_name(&self) -> Option<String> {
        let nested = self
            .form3_entries()
            .iter()
            .filter_map(|entry| entry.company.as_deref());
        [self.en_name.as_deref(), self.company_name.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .chain(nested)
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_string)
    }

    pub fn badges(&self) -> &[BadgeRef] {
        self.exhibitor_badges
            .as_ref()
            .map(OneOrMany::as_slice)
            .unwrap_or(&[])
    }

    pub fn form3_entries(&self) -> &[Form3Entry] {
        self.form3_data_entry
            .as_ref()
            .map(OneOrMany::as_slice)
            .unwrap_or(&[])
    }
}
