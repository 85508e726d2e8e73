// ********* Record data structures ***********

use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Answers about the tablet, the internet connection and the remote doctors.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalFeedback {
    pub id: String,
    pub name: String,
    pub tablet_working: String,
    pub internet_problems: String,
    pub know_how_to_use_tablet: String,
    pub get_help_quickly: String,
    pub doctors_respectful: String,
}

/// Answers about the clinic itself and the people working around it.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicWorkEnvironment {
    pub id: String,
    pub name: String,
    pub partner_staff_issues: String,
    pub comfortable_timings: String,
    pub clinic_clean: String,
    pub feel_safe: String,
    pub medicines_available: String,
    pub managers_helpful: String,
    pub monthly_target_completed: String,
    pub patients_behave_well: String,
    pub patients_trust_you: String,
    pub help_during_camps: String,
    pub equipment_working: String,
}

/// Answers about training, career and free-form suggestions.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrowthFeedback {
    pub id: String,
    pub name: String,
    pub require_training: String,
    pub proud_of_work: String,
    pub career_growth: String,
    pub friend_recommendation: String,
    pub clinic_distance: String,
    pub additional_help_needed: String,
    pub clinic_improvement_suggestions: String,
    pub feedback_for_management: String,
}

/// The three projections of a single survey row.
///
/// All three records carry the same identity.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeedbackTriple {
    pub technical: TechnicalFeedback,
    pub clinic: ClinicWorkEnvironment,
    pub growth: GrowthFeedback,
}

/// Gives access to the identity shared by the records of one row.
pub trait Identified {
    fn identity(&self) -> &str;
}

impl Identified for TechnicalFeedback {
    fn identity(&self) -> &str {
        &self.id
    }
}

impl Identified for ClinicWorkEnvironment {
    fn identity(&self) -> &str {
        &self.id
    }
}

impl Identified for GrowthFeedback {
    fn identity(&self) -> &str {
        &self.id
    }
}

/// The three collections kept by the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CollectionKind {
    Technical,
    Clinic,
    Growth,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Technical,
        CollectionKind::Clinic,
        CollectionKind::Growth,
    ];

    /// The key under which the collection is persisted.
    pub fn store_key(&self) -> &'static str {
        match self {
            CollectionKind::Technical => "technical_feedback",
            CollectionKind::Clinic => "clinic_work_environment",
            CollectionKind::Growth => "growth_feedback",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CollectionKind::Technical => "Technical Feedback",
            CollectionKind::Clinic => "Clinic & Work Environment",
            CollectionKind::Growth => "Growth & Feedback",
        }
    }

    pub fn from_name(name: &str) -> Option<CollectionKind> {
        match name.to_lowercase().as_str() {
            "technical" | "technical_feedback" => Some(CollectionKind::Technical),
            "clinic" | "clinic_work_environment" => Some(CollectionKind::Clinic),
            "growth" | "growth_feedback" => Some(CollectionKind::Growth),
            _ => None,
        }
    }
}

// ******** Categories *********

pub const YES_NO: &[&str] = &["Yes", "No"];
pub const YES_NO_SOMETIMES: &[&str] = &["Yes", "No", "Sometimes"];
pub const TRAINING: &[&str] = &["Yes", "No", "Maybe later"];

// ******** Output data structures *********

/// Counts per category, in the order the categories were given.
///
/// Every requested category is present, with a count of zero if nothing matched it.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Tally {
    pub counts: Vec<(String, u64)>,
}

impl Tally {
    pub fn get(&self, category: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| *count).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, u64)> {
        self.counts.iter()
    }
}

/// A tally built from two collections paired by identity.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompositeTally {
    pub tally: Tally,
    pub pairs: usize,
    /// Records of the left collection that found no partner.
    pub unmatched_left: usize,
    /// Records of the right collection that found no partner.
    pub unmatched_right: usize,
}

impl CompositeTally {
    pub fn is_aligned(&self) -> bool {
        self.unmatched_left == 0 && self.unmatched_right == 0
    }
}

/// Errors raised when the list of categories cannot be used for counting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    EmptyCategories,
    /// Two categories differ only by case, so a value could match both.
    DuplicateCategory(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyCategories => write!(f, "TallyError: no categories provided"),
            TallyErrors::DuplicateCategory(c) => {
                write!(f, "TallyError: category {:?} is listed more than once", c)
            }
        }
    }
}
