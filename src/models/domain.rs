use serde::{Deserialize, Serialize};

/// Catalog identifier of an exhibitor
pub type ExhibitorId = String;

/// Which kind of exhibitor the visitor is primarily after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookingFor {
    #[default]
    All,
    Sponsors,
    Partners,
}

/// Visitor matching criteria
///
/// Frozen by a session once a ranking pass has been generated from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorPreferences {
    #[serde(rename = "selectedIndustries", default)]
    pub selected_industries: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(rename = "lookingFor", default)]
    pub looking_for: LookingFor,
    #[serde(default)]
    pub country: Option<String>,
}

impl VisitorPreferences {
    pub fn new<I, S>(selected_industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected_industries: selected_industries.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Initial preferences for a new session, seeded from the visitor's
    /// profile sector when they have one.
    pub fn seeded(profile_sector: Option<&str>) -> Self {
        let selected = profile_sector
            .map(str::trim)
            .filter(|sector| !sector.is_empty())
            .map(|sector| vec![sector.to_string()])
            .unwrap_or_default();
        Self::new(selected)
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_looking_for(mut self, looking_for: LookingFor) -> Self {
        self.looking_for = looking_for;
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    /// True when at least one non-blank industry is selected
    pub fn has_selection(&self) -> bool {
        self.selected_industries.iter().any(|i| !i.trim().is_empty())
    }

    /// Non-blank country filter, if any
    pub fn country_filter(&self) -> Option<&str> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|country| !country.is_empty())
    }

    /// Selected industries followed by extra interests, trimmed, blank
    /// entries dropped, de-duplicated case-insensitively.
    pub fn interest_terms(&self) -> Vec<&str> {
        let mut seen: Vec<String> = Vec::new();
        let mut terms = Vec::new();
        for term in self.selected_industries.iter().chain(self.interests.iter()) {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            let folded = term.to_lowercase();
            if !seen.contains(&folded) {
                seen.push(folded);
                terms.push(term);
            }
        }
        terms
    }
}

/// Paid promotion tier of an exhibitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SponsorshipLevel {
    #[default]
    None,
    Silver,
    Gold,
    Platinum,
}

impl SponsorshipLevel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "platinum" => Some(SponsorshipLevel::Platinum),
            "gold" => Some(SponsorshipLevel::Gold),
            "silver" => Some(SponsorshipLevel::Silver),
            _ => None,
        }
    }

    pub fn is_sponsor(self) -> bool {
        self != SponsorshipLevel::None
    }
}

/// Normalized per-exhibitor facts the scoring engine reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitorAttributes {
    #[serde(rename = "industryTags")]
    pub industry_tags: Vec<String>,
    pub country: String,
    #[serde(rename = "freeTextTags")]
    pub free_text_tags: Vec<String>,
    #[serde(rename = "descriptionText")]
    pub description_text: String,
    #[serde(rename = "sponsorshipLevel")]
    pub sponsorship_level: SponsorshipLevel,
    #[serde(rename = "isPartner")]
    pub is_partner: bool,
    #[serde(rename = "representativeCount")]
    pub representative_count: u32,
}

/// Why an exhibitor scored, in the order the rules are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Sector,
    Country,
    Interest,
    Sponsor,
    Partner,
    Trending,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::Sector => "SECTOR",
            ReasonCode::Country => "COUNTRY",
            ReasonCode::Interest => "INTEREST",
            ReasonCode::Sponsor => "SPONSOR",
            ReasonCode::Partner => "PARTNER",
            ReasonCode::Trending => "TRENDING",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SECTOR" => Some(ReasonCode::Sector),
            "COUNTRY" => Some(ReasonCode::Country),
            "INTEREST" => Some(ReasonCode::Interest),
            "SPONSOR" => Some(ReasonCode::Sponsor),
            "PARTNER" => Some(ReasonCode::Partner),
            "TRENDING" => Some(ReasonCode::Trending),
            _ => None,
        }
    }
}

/// Scored exhibitor, ephemeral
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "exhibitorId")]
    pub exhibitor_id: ExhibitorId,
    pub score: u8,
    pub reasons: Vec<ReasonCode>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "sponsorshipLevel", default)]
    pub sponsorship_level: SponsorshipLevel,
    #[serde(rename = "isPartner", default)]
    pub is_partner: bool,
}

impl MatchResult {
    /// Bare result without display fields
    pub fn new(exhibitor_id: impl Into<ExhibitorId>, score: u8, reasons: Vec<ReasonCode>) -> Self {
        Self {
            exhibitor_id: exhibitor_id.into(),
            score,
            reasons,
            name: None,
            country: String::new(),
            sponsorship_level: SponsorshipLevel::None,
            is_partner: false,
        }
    }
}

/// Persisted state of a saved match. Dismissals are never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Saved,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Saved => "SAVED",
        }
    }
}

/// Durable visitor/exhibitor pairing, unique per `(user_id, exhibitor_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMatch {
    pub id: uuid::Uuid,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "exhibitorId")]
    pub exhibitor_id: ExhibitorId,
    pub score: u8,
    pub reasons: Vec<ReasonCode>,
    pub status: MatchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SavedMatch {
    pub fn from_result(user_id: &str, result: &MatchResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id: user_id.to_string(),
            exhibitor_id: result.exhibitor_id.clone(),
            score: result.score,
            reasons: result.reasons.clone(),
            status: MatchStatus::Saved,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Industry taxonomy entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub id: String,
    pub name: String,
    #[serde(rename = "localizedName", default)]
    pub localized_name: Option<String>,
}

/// Point table of the scoring rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub sector: u32,
    pub country: u32,
    pub interest_per_match: u32,
    pub interest_cap: u32,
    pub sponsor: u32,
    pub sponsor_focus: u32,
    pub partner: u32,
    pub partner_focus: u32,
    pub trending: u32,
    /// Representative count an exhibitor must exceed to be trending
    pub trending_min_representatives: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            sector: 40,
            country: 20,
            interest_per_match: 5,
            interest_cap: 25,
            sponsor: 15,
            sponsor_focus: 10,
            partner: 10,
            partner_focus: 10,
            trending: 5,
            trending_min_representatives: 3,
        }
    }
}
