//! Mapping of one survey row onto the three record kinds.
//!
//! The header labels are the questions as they were authored in the survey form. Some of
//! them end with spaces and the lookups are exact: a trimmed label would silently miss the
//! column.

use std::collections::HashMap;
use std::fmt::Display;

use log::debug;

use crate::config::*;

/// A row of a survey export, keyed by header label.
pub type RawRow = HashMap<String, String>;

pub const NAME_AND_EMPLOYEE_ID: &str = "Name and Employee ID";

// Technical feedback
pub const TABLET_WORKING: &str = "Is the tablet working well for consultations?";
pub const INTERNET_PROBLEMS: &str = "Do you face internet problems during consultations?";
pub const KNOW_HOW_TO_USE_TABLET: &str = "Do you know how to use the tablet?";
pub const GET_HELP_QUICKLY: &str =
    "If tablet or internet has a problem, do you get help quickly?";
pub const DOCTORS_RESPECTFUL: &str = "Are the doctors nice and respectful during consultations?";

// Clinic and work environment
pub const PARTNER_STAFF_ISSUES: &str =
    "Do you face any problems working with the partner staff in the clinic?  ";
pub const COMFORTABLE_TIMINGS: &str = "Are you comfortable with the current clinic timings? ";
pub const CLINIC_CLEAN: &str = "Is your clinic clean and in a good condition?";
pub const FEEL_SAFE: &str = "Do you feel safe working alone in the clinic?";
pub const MEDICINES_AVAILABLE: &str = "Do you get all the medicines you need at the clinic?";
pub const MANAGERS_HELPFUL: &str = "Are your DCs and field managers helpful?";
pub const MONTHLY_TARGET_COMPLETED: &str = "Are you able to complete your monthly target?";
pub const PATIENTS_BEHAVE_WELL: &str = "Do patients behave well with you?";
pub const PATIENTS_TRUST_YOU: &str = "Do patients trust you at the clinic?";
pub const HELP_DURING_CAMPS: &str = "Do you get help during health diagnostic camps?";
pub const EQUIPMENT_WORKING: &str =
    "Are all the essential equipment in the clinic working properly?";

// Growth
pub const REQUIRE_TRAINING: &str = "Do you require any additional training?";
pub const PROUD_OF_WORK: &str = "Do you feel proud of your work?";
pub const CAREER_GROWTH: &str =
    "Do you feel you can grow in your career while working at M-Swasth? ";
pub const FRIEND_RECOMMENDATION: &str =
    "Would you tell a friend to work here? (Rate from 1 to 10)";
pub const CLINIC_DISTANCE: &str =
    "How far is the clinic from your residence? (in meters/ kilometers)";
pub const ADDITIONAL_HELP_NEEDED: &str = "Any additional help you require to work better?";
pub const CLINIC_IMPROVEMENT_SUGGESTIONS: &str = "Things that can make your clinic better";
pub const FEEDBACK_FOR_MANAGEMENT: &str = "Any feedback for the management";

/// Why a row did not produce any record.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum DropReason {
    /// The export has no "Name and Employee ID" column at all.
    MissingIdentityColumn,
    /// The identity cell is empty or only contains whitespace.
    BlankIdentity,
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::MissingIdentityColumn => {
                write!(f, "missing column {:?}", NAME_AND_EMPLOYEE_ID)
            }
            DropReason::BlankIdentity => write!(f, "blank {:?}", NAME_AND_EMPLOYEE_ID),
        }
    }
}

/// A row that passed validation. It can be mapped to records.
#[derive(Debug, Clone, Copy)]
pub struct ValidRow<'a> {
    row: &'a RawRow,
    name: &'a str,
}

impl<'a> ValidRow<'a> {
    /// The identity cell, as written in the export (not trimmed).
    pub fn name(&self) -> &'a str {
        self.name
    }

    fn cell(&self, header: &str) -> String {
        self.row.get(header).cloned().unwrap_or_default()
    }
}

/// Checks that the row has a usable identity.
pub fn validate_row(row: &RawRow) -> Result<ValidRow<'_>, DropReason> {
    match row.get(NAME_AND_EMPLOYEE_ID) {
        None => Err(DropReason::MissingIdentityColumn),
        Some(name) if name.trim().is_empty() => Err(DropReason::BlankIdentity),
        Some(name) => Ok(ValidRow { row, name }),
    }
}

/// Identity of the records produced from one line of one source.
///
/// Importing the same file again gives the same identities.
pub fn row_identity(source: &str, lineno: usize, name: &str) -> String {
    let digest = sha256::digest(format!("{}\u{1f}{:08}\u{1f}{}", source, lineno, name).as_str());
    digest[..12].to_string()
}

/// Maps a validated row onto the three record kinds. Missing columns become empty strings.
pub fn map_row(row: &ValidRow, id: &str) -> FeedbackTriple {
    let name = row.name().to_string();
    let technical = TechnicalFeedback {
        id: id.to_string(),
        name: name.clone(),
        tablet_working: row.cell(TABLET_WORKING),
        internet_problems: row.cell(INTERNET_PROBLEMS),
        know_how_to_use_tablet: row.cell(KNOW_HOW_TO_USE_TABLET),
        get_help_quickly: row.cell(GET_HELP_QUICKLY),
        doctors_respectful: row.cell(DOCTORS_RESPECTFUL),
    };
    let clinic = ClinicWorkEnvironment {
        id: id.to_string(),
        name: name.clone(),
        partner_staff_issues: row.cell(PARTNER_STAFF_ISSUES),
        comfortable_timings: row.cell(COMFORTABLE_TIMINGS),
        clinic_clean: row.cell(CLINIC_CLEAN),
        feel_safe: row.cell(FEEL_SAFE),
        medicines_available: row.cell(MEDICINES_AVAILABLE),
        managers_helpful: row.cell(MANAGERS_HELPFUL),
        monthly_target_completed: row.cell(MONTHLY_TARGET_COMPLETED),
        patients_behave_well: row.cell(PATIENTS_BEHAVE_WELL),
        patients_trust_you: row.cell(PATIENTS_TRUST_YOU),
        help_during_camps: row.cell(HELP_DURING_CAMPS),
        equipment_working: row.cell(EQUIPMENT_WORKING),
    };
    let growth = GrowthFeedback {
        id: id.to_string(),
        name,
        require_training: row.cell(REQUIRE_TRAINING),
        proud_of_work: row.cell(PROUD_OF_WORK),
        career_growth: row.cell(CAREER_GROWTH),
        friend_recommendation: row.cell(FRIEND_RECOMMENDATION),
        clinic_distance: row.cell(CLINIC_DISTANCE),
        additional_help_needed: row.cell(ADDITIONAL_HELP_NEEDED),
        clinic_improvement_suggestions: row.cell(CLINIC_IMPROVEMENT_SUGGESTIONS),
        feedback_for_management: row.cell(FEEDBACK_FOR_MANAGEMENT),
    };
    debug!("map_row: id: {:?} name: {:?}", id, technical.name);
    FeedbackTriple {
        technical,
        clinic,
        growth,
    }
}

/// Validates then maps a row. This is the path used when reading a file.
pub fn map_raw_row(
    row: &RawRow,
    source: &str,
    lineno: usize,
) -> Result<FeedbackTriple, DropReason> {
    let valid = validate_row(row)?;
    let id = row_identity(source, lineno, valid.name());
    Ok(map_row(&valid, &id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn maps_known_columns_and_defaults_the_rest() {
        let r = row(&[(NAME_AND_EMPLOYEE_ID, "Jane Doe"), (TABLET_WORKING, "Yes")]);
        let triple = map_raw_row(&r, "survey.csv", 2).unwrap();

        assert_eq!(triple.technical.name, "Jane Doe");
        assert_eq!(triple.technical.tablet_working, "Yes");
        assert_eq!(triple.technical.internet_problems, "");
        assert_eq!(triple.clinic.name, "Jane Doe");
        assert_eq!(triple.clinic, ClinicWorkEnvironment {
            id: triple.clinic.id.clone(),
            name: "Jane Doe".to_string(),
            ..Default::default()
        });
        assert_eq!(triple.growth, GrowthFeedback {
            id: triple.growth.id.clone(),
            name: "Jane Doe".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn identity_is_shared_by_the_triple() {
        let r = row(&[(NAME_AND_EMPLOYEE_ID, "Asha 1042")]);
        let triple = map_raw_row(&r, "survey.csv", 7).unwrap();
        assert_eq!(triple.technical.id.len(), 12);
        assert_eq!(triple.technical.id, triple.clinic.id);
        assert_eq!(triple.clinic.id, triple.growth.id);
    }

    #[test]
    fn identity_is_stable_and_line_dependent() {
        assert_eq!(
            row_identity("a.csv", 2, "Asha"),
            row_identity("a.csv", 2, "Asha")
        );
        assert_ne!(
            row_identity("a.csv", 2, "Asha"),
            row_identity("a.csv", 3, "Asha")
        );
        assert_ne!(
            row_identity("a.csv", 2, "Asha"),
            row_identity("b.csv", 2, "Asha")
        );
    }

    #[test]
    fn trailing_spaces_in_headers_are_significant() {
        let r = row(&[
            (NAME_AND_EMPLOYEE_ID, "Ravi"),
            (PARTNER_STAFF_ISSUES, "No"),
            (COMFORTABLE_TIMINGS, "Yes"),
            (CAREER_GROWTH, "Yes"),
            // Trimmed label: not recognised.
            ("Are you comfortable with the current clinic timings?", "No"),
        ]);
        let triple = map_raw_row(&r, "s.csv", 2).unwrap();
        assert_eq!(triple.clinic.partner_staff_issues, "No");
        assert_eq!(triple.clinic.comfortable_timings, "Yes");
        assert_eq!(triple.growth.career_growth, "Yes");
        assert!(PARTNER_STAFF_ISSUES.ends_with("?  "));
    }

    #[test]
    fn blank_identity_is_dropped() {
        let r = row(&[(NAME_AND_EMPLOYEE_ID, "  "), (TABLET_WORKING, "Yes")]);
        assert_eq!(
            validate_row(&r).map(|_| ()),
            Err(DropReason::BlankIdentity)
        );
        let r = row(&[(TABLET_WORKING, "Yes")]);
        assert_eq!(
            map_raw_row(&r, "s.csv", 2).map(|_| ()),
            Err(DropReason::MissingIdentityColumn)
        );
    }

    #[test]
    fn values_are_not_trimmed() {
        let r = row(&[(NAME_AND_EMPLOYEE_ID, " Meena "), (PROUD_OF_WORK, " yes")]);
        let triple = map_raw_row(&r, "s.csv", 2).unwrap();
        assert_eq!(triple.growth.name, " Meena ");
        assert_eq!(triple.growth.proud_of_work, " yes");
    }
}
