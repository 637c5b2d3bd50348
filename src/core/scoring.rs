use crate::models::{ExhibitorAttributes, LookingFor, ReasonCode, ScoringWeights, VisitorPreferences};

/// Upper bound of a match score
pub const MAX_SCORE: u8 = 100;

/// Score one exhibitor against a visitor's preferences
///
/// Rules, each evaluated once, in this order:
/// ```text
/// sector overlap     +40 flat                      SECTOR
/// country match      +20                           COUNTRY
/// interest overlap   +5 per term, capped at +25    INTEREST
/// sponsorship        +15, +10 more for SPONSORS    SPONSOR
/// partner            +10, +10 more for PARTNERS    PARTNER
/// popularity         +5 above 3 representatives    TRENDING
/// ```
/// The sum is clamped to 100, not rescaled. Reasons appear at most once,
/// in rule order. Never fails: anything malformed simply does not match.
pub fn score(prefs: &VisitorPreferences, attrs: &ExhibitorAttributes) -> (u8, Vec<ReasonCode>) {
    score_with_weights(prefs, attrs, &ScoringWeights::default())
}

/// [`score`] with a custom point table
pub fn score_with_weights(
    prefs: &VisitorPreferences,
    attrs: &ExhibitorAttributes,
    weights: &ScoringWeights,
) -> (u8, Vec<ReasonCode>) {
    let mut total: u32 = 0;
    let mut reasons = Vec::new();

    if sector_overlap(&prefs.selected_industries, &attrs.industry_tags) {
        total = total.saturating_add(weights.sector);
        reasons.push(ReasonCode::Sector);
    }

    if let Some(country) = prefs.country_filter() {
        if contains_folded(&attrs.country, country) {
            total = total.saturating_add(weights.country);
            reasons.push(ReasonCode::Country);
        }
    }

    let interest_hits = interest_matches(prefs, attrs);
    if interest_hits > 0 {
        total = total.saturating_add(
            interest_hits
                .saturating_mul(weights.interest_per_match)
                .min(weights.interest_cap),
        );
        reasons.push(ReasonCode::Interest);
    }

    if attrs.sponsorship_level.is_sponsor() {
        total = total.saturating_add(weights.sponsor);
        if prefs.looking_for == LookingFor::Sponsors {
            total = total.saturating_add(weights.sponsor_focus);
        }
        reasons.push(ReasonCode::Sponsor);
    }

    if attrs.is_partner {
        total = total.saturating_add(weights.partner);
        if prefs.looking_for == LookingFor::Partners {
            total = total.saturating_add(weights.partner_focus);
        }
        reasons.push(ReasonCode::Partner);
    }

    if attrs.representative_count > weights.trending_min_representatives {
        total = total.saturating_add(weights.trending);
        reasons.push(ReasonCode::Trending);
    }

    let clamped = total.min(MAX_SCORE as u32) as u8;
    if clamped == 0 {
        // Zero-point rules (custom tables) do not explain anything.
        reasons.clear();
    }

    (clamped, reasons)
}

/// Case-insensitive substring test; blank needles never match
#[inline]
fn contains_folded(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Containment in either direction, so "Construction" overlaps
/// "Construction Materials" and vice versa
#[inline]
fn overlaps(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return false;
    }
    contains_folded(a, b) || contains_folded(b, a)
}

fn sector_overlap(selected: &[String], tags: &[String]) -> bool {
    selected
        .iter()
        .any(|industry| tags.iter().any(|tag| overlaps(industry, tag)))
}

/// Number of interest terms found in a free-text tag or the description
fn interest_matches(prefs: &VisitorPreferences, attrs: &ExhibitorAttributes) -> u32 {
    prefs
        .interest_terms()
        .into_iter()
        .filter(|term| {
            attrs.free_text_tags.iter().any(|tag| contains_folded(tag, term))
                || contains_folded(&attrs.description_text, term)
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SponsorshipLevel;

    fn attrs() -> ExhibitorAttributes {
        ExhibitorAttributes::default()
    }

    #[test]
    fn test_no_rule_triggered() {
        let prefs = VisitorPreferences::new(["Construction"]).with_country("Libya");
        let (score, reasons) = score(&prefs, &attrs());
        assert_eq!(score, 0);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_sector_only_is_flat_forty() {
        let prefs = VisitorPreferences::new(["Construction", "Materials"]);
        let mut exhibitor = attrs();
        exhibitor.industry_tags = vec!["Construction Materials".into(), "Materials".into()];

        let (score, reasons) = score(&prefs, &exhibitor);
        assert_eq!(score, 40);
        assert_eq!(reasons, vec![ReasonCode::Sector]);
    }

    #[test]
    fn test_sector_matches_in_both_directions() {
        let mut exhibitor = attrs();
        exhibitor.industry_tags = vec!["energy".into()];

        let (score, _) = score(&VisitorPreferences::new(["Renewable Energy"]), &exhibitor);
        assert_eq!(score, 40);
    }

    #[test]
    fn test_country_only_is_twenty() {
        let prefs = VisitorPreferences::new(["Healthcare"]).with_country("libya");
        let mut exhibitor = attrs();
        exhibitor.country = "Libya".into();

        let (score, reasons) = score(&prefs, &exhibitor);
        assert_eq!(score, 20);
        assert_eq!(reasons, vec![ReasonCode::Country]);
    }

    #[test]
    fn test_blank_country_never_matches() {
        let prefs = VisitorPreferences::new(["Healthcare"]).with_country("  ");
        let mut exhibitor = attrs();
        exhibitor.country = "Libya".into();
        assert_eq!(score(&prefs, &exhibitor).0, 0);
    }

    #[test]
    fn test_interest_capped_at_twenty_five() {
        let prefs = VisitorPreferences::new(["Steel"])
            .with_interests(["Cement", "Glass", "Timber", "Tiles", "Paint", "Roofing"]);
        let mut exhibitor = attrs();
        exhibitor.free_text_tags = vec!["Steel beams".into(), "Cement".into(), "Glass".into()];
        exhibitor.description_text = "Timber, tiles, paint and roofing supplies".into();

        let (score, reasons) = score(&prefs, &exhibitor);
        assert_eq!(score, 25);
        assert_eq!(reasons, vec![ReasonCode::Interest]);
    }

    #[test]
    fn test_interest_per_match() {
        let prefs = VisitorPreferences::new(["Cement"]).with_interests(["Solar"]);
        let mut exhibitor = attrs();
        exhibitor.free_text_tags = vec!["cement".into()];
        exhibitor.description_text = "We install solar farms".into();

        assert_eq!(score(&prefs, &exhibitor), (10, vec![ReasonCode::Interest]));
    }

    #[test]
    fn test_sponsor_bonus_depends_on_looking_for() {
        let mut exhibitor = attrs();
        exhibitor.sponsorship_level = SponsorshipLevel::Silver;

        let all = VisitorPreferences::new(["X"]);
        let sponsors = all.clone().with_looking_for(LookingFor::Sponsors);
        let partners = all.clone().with_looking_for(LookingFor::Partners);

        assert_eq!(score(&all, &exhibitor), (15, vec![ReasonCode::Sponsor]));
        assert_eq!(score(&sponsors, &exhibitor).0, 25);
        assert_eq!(score(&partners, &exhibitor).0, 15);
    }

    #[test]
    fn test_partner_bonus_depends_on_looking_for() {
        let mut exhibitor = attrs();
        exhibitor.is_partner = true;

        let all = VisitorPreferences::new(["X"]);
        let partners = all.clone().with_looking_for(LookingFor::Partners);

        assert_eq!(score(&all, &exhibitor), (10, vec![ReasonCode::Partner]));
        assert_eq!(score(&partners, &exhibitor).0, 20);
    }

    #[test]
    fn test_trending_threshold_is_strict() {
        let mut exhibitor = attrs();
        exhibitor.representative_count = 3;
        assert_eq!(score(&VisitorPreferences::new(["X"]), &exhibitor).0, 0);

        exhibitor.representative_count = 4;
        assert_eq!(
            score(&VisitorPreferences::new(["X"]), &exhibitor),
            (5, vec![ReasonCode::Trending])
        );
    }

    #[test]
    fn test_all_rules_clamped_to_hundred() {
        let prefs = VisitorPreferences::new(["Construction"])
            .with_interests(["Cement", "Steel", "Glass", "Timber"])
            .with_country("Libya")
            .with_looking_for(LookingFor::Sponsors);
        let exhibitor = ExhibitorAttributes {
            industry_tags: vec!["Construction Materials".into()],
            country: "Libya".into(),
            free_text_tags: vec![
                "construction".into(),
                "cement".into(),
                "steel".into(),
                "glass".into(),
                "timber".into(),
            ],
            description_text: String::new(),
            sponsorship_level: SponsorshipLevel::Platinum,
            is_partner: true,
            representative_count: 12,
        };

        let (score, reasons) = score(&prefs, &exhibitor);
        assert_eq!(score, 100);
        assert_eq!(
            reasons,
            vec![
                ReasonCode::Sector,
                ReasonCode::Country,
                ReasonCode::Interest,
                ReasonCode::Sponsor,
                ReasonCode::Partner,
                ReasonCode::Trending,
            ]
        );
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoringWeights {
            sector: 10,
            ..ScoringWeights::default()
        };
        let mut exhibitor = attrs();
        exhibitor.industry_tags = vec!["Construction".into()];

        let (score, _) =
            score_with_weights(&VisitorPreferences::new(["Construction"]), &exhibitor, &weights);
        assert_eq!(score, 10);
    }

    #[test]
    fn test_huge_weights_saturate_at_max() {
        let weights = ScoringWeights {
            sector: u32::MAX,
            country: u32::MAX,
            interest_per_match: u32::MAX,
            interest_cap: u32::MAX,
            sponsor: u32::MAX,
            sponsor_focus: u32::MAX,
            partner: u32::MAX,
            partner_focus: u32::MAX,
            trending: u32::MAX,
            trending_min_representatives: 0,
        };
        let exhibitor = ExhibitorAttributes {
            industry_tags: vec!["Construction".into()],
            country: "Libya".into(),
            free_text_tags: vec!["solar".into(), "cement".into()],
            sponsorship_level: SponsorshipLevel::Gold,
            is_partner: true,
            representative_count: 1,
            ..attrs()
        };
        let prefs = VisitorPreferences::new(["Construction"])
            .with_country("Libya")
            .with_interests(["solar", "cement"])
            .with_looking_for(LookingFor::Sponsors);

        let (score, reasons) = score_with_weights(&prefs, &exhibitor, &weights);
        assert_eq!(score, MAX_SCORE);
        assert_eq!(reasons.len(), 6);
    }
}
