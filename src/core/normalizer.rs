use crate::models::catalog::{BadgeRef, LabelEntry, OneOrMany, RawExhibitor, Scalar, SponsorFlags};
use crate::models::{ExhibitorAttributes, SponsorshipLevel};

/// Extract the uniform attribute view from a raw catalog record
///
/// Absent or odd-shaped data normalizes to empty collections, `NONE`,
/// `false` and `0`. Deterministic and side-effect free.
pub fn normalize(raw: &RawExhibitor) -> ExhibitorAttributes {
    ExhibitorAttributes {
        industry_tags: industry_tags(raw),
        country: country(raw),
        free_text_tags: free_text_tags(raw),
        description_text: description_text(raw),
        sponsorship_level: sponsorship_level(raw),
        is_partner: raw.is_partner.as_ref().is_some_and(Scalar::is_truthy),
        representative_count: representative_count(raw),
    }
}

/// Collects labels, trimmed, dropping blanks and case-insensitive duplicates.
#[derive(Default)]
struct LabelSet {
    folded: Vec<String>,
    labels: Vec<String>,
}

impl LabelSet {
    fn push(&mut self, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        let folded = label.to_lowercase();
        if !self.folded.contains(&folded) {
            self.folded.push(folded);
            self.labels.push(label.to_string());
        }
    }

    fn extend(&mut self, entries: Option<&OneOrMany<LabelEntry>>) {
        if let Some(entries) = entries {
            for label in entries.as_slice().iter().filter_map(LabelEntry::label) {
                self.push(label);
            }
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.labels
    }
}

fn industry_tags(raw: &RawExhibitor) -> Vec<String> {
    let mut tags = LabelSet::default();
    tags.extend(raw.company_industries.as_ref());
    tags.extend(raw.industries.as_ref());
    for entry in raw.form3_entries() {
        tags.extend(entry.company_industries.as_ref());
        tags.extend(entry.industries.as_ref());
    }
    for scalar in [&raw.sector, &raw.industry, &raw.category].into_iter().flatten() {
        tags.push(scalar);
    }
    tags.into_vec()
}

fn country(raw: &RawExhibitor) -> String {
    std::iter::once(raw.country.as_deref())
        .chain(raw.form3_entries().iter().map(|entry| entry.country.as_deref()))
        .flatten()
        .map(str::trim)
        .find(|country| !country.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn free_text_tags(raw: &RawExhibitor) -> Vec<String> {
    let mut tags = LabelSet::default();
    tags.extend(raw.tags.as_ref());
    tags.extend(raw.products.as_ref());
    for entry in raw.form3_entries() {
        tags.extend(entry.tags.as_ref());
        tags.extend(entry.products.as_ref());
    }
    tags.into_vec()
}

fn description_text(raw: &RawExhibitor) -> String {
    let top = [
        &raw.company_description,
        &raw.company_profile,
        &raw.description,
        &raw.about,
    ];
    let nested = raw
        .form3_entries()
        .iter()
        .flat_map(|entry| [&entry.company_description, &entry.company_profile]);

    let mut parts: Vec<&str> = Vec::new();
    for text in top.into_iter().chain(nested).flatten() {
        let text = text.trim();
        if !text.is_empty() && !parts.contains(&text) {
            parts.push(text);
        }
    }
    parts.join("\n")
}

fn flag_level(flags: &SponsorFlags) -> SponsorshipLevel {
    let set = |flag: &Option<Scalar>| flag.as_ref().is_some_and(Scalar::is_truthy);
    if set(&flags.is_platinum_sponsorship) {
        SponsorshipLevel::Platinum
    } else if set(&flags.gold_sponsorship) {
        SponsorshipLevel::Gold
    } else if set(&flags.silver_sponsorship) {
        SponsorshipLevel::Silver
    } else {
        SponsorshipLevel::None
    }
}

/// Highest tier among the explicit label and both flag blocks
fn sponsorship_level(raw: &RawExhibitor) -> SponsorshipLevel {
    let labelled = raw
        .sponsor_level
        .as_deref()
        .and_then(SponsorshipLevel::from_label)
        .unwrap_or_default();
    let on_event_user = raw.event_user.as_ref().map(flag_level).unwrap_or_default();

    labelled.max(on_event_user).max(flag_level(&raw.sponsorship))
}

fn representative_count(raw: &RawExhibitor) -> u32 {
    if let Some(count) = raw.team_count.as_ref().and_then(Scalar::as_count) {
        return count;
    }

    let badge_users = raw.badges().iter().flat_map(BadgeRef::users);
    let form3_users = raw.form3_entries().iter().filter_map(|entry| entry.user.as_ref());

    let mut ids: Vec<String> = Vec::new();
    for user in raw.user.iter().chain(badge_users).chain(form3_users) {
        if let Some(id) = user.id.as_ref().and_then(Scalar::as_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score;
    use crate::models::{ReasonCode, VisitorPreferences};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawExhibitor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_record_normalizes_to_defaults() {
        let attrs = normalize(&RawExhibitor::default());
        assert_eq!(attrs, ExhibitorAttributes::default());
    }

    #[test]
    fn test_industries_from_every_source() {
        let attrs = normalize(&raw(json!({
            "company_industries": [{ "name": "Construction" }, "Energy"],
            "sector": "construction",
            "form3_data_entry": [
                { "company_industries": [{ "en_name": "Water Treatment" }] },
                { "industries": "Real Estate" }
            ]
        })));

        assert_eq!(
            attrs.industry_tags,
            vec!["Construction", "Energy", "Water Treatment", "Real Estate"]
        );
    }

    #[test]
    fn test_country_falls_back_to_form3() {
        let attrs = normalize(&raw(json!({
            "country": "  ",
            "form3_data_entry": [{ "country": "" }, { "country": "Libya" }]
        })));
        assert_eq!(attrs.country, "Libya");
    }

    #[test]
    fn test_tags_description_and_products() {
        let attrs = normalize(&raw(json!({
            "tags": ["Cement", "Sustainability"],
            "products": [{ "name": "Ready-mix concrete" }],
            "description": "Premium cement manufacturer",
            "form3_data_entry": {
                "company_profile": "Serving Libya since 1975",
                "tags": ["cement"]
            }
        })));

        assert_eq!(
            attrs.free_text_tags,
            vec!["Cement", "Sustainability", "Ready-mix concrete"]
        );
        assert_eq!(
            attrs.description_text,
            "Premium cement manufacturer\nServing Libya since 1975"
        );
    }

    #[test]
    fn test_sponsorship_highest_tier_wins() {
        let attrs = normalize(&raw(json!({
            "silver_sponsorship": 1,
            "event_user": { "gold_sponsorship": "1" }
        })));
        assert_eq!(attrs.sponsorship_level, SponsorshipLevel::Gold);

        let attrs = normalize(&raw(json!({ "sponsorLevel": "platinum" })));
        assert_eq!(attrs.sponsorship_level, SponsorshipLevel::Platinum);

        let attrs = normalize(&raw(json!({ "gold_sponsorship": 0, "sponsor_level": "bronze" })));
        assert_eq!(attrs.sponsorship_level, SponsorshipLevel::None);
    }

    #[test]
    fn test_partner_flag_variants() {
        assert!(normalize(&raw(json!({ "is_partner": 1 }))).is_partner);
        assert!(normalize(&raw(json!({ "is_partner": true }))).is_partner);
        assert!(!normalize(&raw(json!({ "is_partner": 0 }))).is_partner);
        assert!(!normalize(&raw(json!({ "is_partner": null }))).is_partner);
    }

    #[test]
    fn test_representative_count() {
        let attrs = normalize(&raw(json!({ "teamCount": 6 })));
        assert_eq!(attrs.representative_count, 6);

        let attrs = normalize(&raw(json!({
            "user": { "id": 1 },
            "exhibitor_badges": [
                { "badge_user": { "id": 826 } },
                { "badge_user": { "id": 827 } },
                { "badge_user": null }
            ],
            "form3_data_entry": [{ "user": { "id": 1 } }, { "user": { "id": "900" } }]
        })));
        assert_eq!(attrs.representative_count, 4);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let record = raw(json!({
            "company_industries": ["Construction", "Energy"],
            "tags": ["Steel"],
            "country": "Libya"
        }));
        assert_eq!(normalize(&record), normalize(&record));
    }

    #[test]
    fn test_representative_count_reads_badge_user_field() {
        let attrs = normalize(&raw(json!({
            "exhibitor_badges": [
                { "user": { "id": 11 } },
                { "user": { "id": 12 } },
                { "badge_user": { "id": 12 }, "user": { "id": 13 } }
            ]
        })));
        assert_eq!(attrs.representative_count, 3);
    }

    #[test]
    fn test_malformed_list_elements_keep_their_siblings() {
        let attrs = normalize(&raw(json!({
            "id": 5,
            "form3_data_entry": [
                { "company_industries": [{ "name": "Construction" }], "country": "Libya" },
                null
            ],
            "exhibitor_badges": [
                { "badge_user": { "id": 1 } },
                { "badge_user": { "id": 2 } },
                { "badge_user": { "id": 3 } },
                { "badge_user": { "id": 4 } },
                null
            ]
        })));
        assert_eq!(attrs.industry_tags, vec!["Construction"]);
        assert_eq!(attrs.country, "Libya");
        assert_eq!(attrs.representative_count, 4);

        let preferences = VisitorPreferences::new(["Construction"]).with_country("Libya");
        assert_eq!(
            score(&preferences, &attrs),
            (60, vec![ReasonCode::Sector, ReasonCode::Country])
        );
    }
}
