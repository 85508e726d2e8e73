// The pie charts of the dashboard.

use feedback_tally::builder::TallyBuilder;

use crate::dashboard::*;

/// Where the answers of a chart come from.
#[derive(Clone, Copy)]
pub enum ChartSource {
    Technical(fn(&TechnicalFeedback) -> &str),
    Clinic(fn(&ClinicWorkEnvironment) -> &str),
    Growth(fn(&GrowthFeedback) -> &str),
    /// "Yes" when the clinic is both clean and safe.
    CleanAndSafe,
}

#[derive(Clone, Copy)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub categories: &'static [&'static str],
    pub source: ChartSource,
}

pub struct ChartSection {
    pub title: &'static str,
    pub charts: &'static [ChartSpec],
}

fn tablet_working(t: &TechnicalFeedback) -> &str {
    &t.tablet_working
}

fn internet_problems(t: &TechnicalFeedback) -> &str {
    &t.internet_problems
}

fn doctors_respectful(t: &TechnicalFeedback) -> &str {
    &t.doctors_respectful
}

fn comfortable_timings(c: &ClinicWorkEnvironment) -> &str {
    &c.comfortable_timings
}

fn medicines_available(c: &ClinicWorkEnvironment) -> &str {
    &c.medicines_available
}

fn managers_helpful(c: &ClinicWorkEnvironment) -> &str {
    &c.managers_helpful
}

fn patients_trust_you(c: &ClinicWorkEnvironment) -> &str {
    &c.patients_trust_you
}

fn proud_of_work(g: &GrowthFeedback) -> &str {
    &g.proud_of_work
}

fn career_growth(g: &GrowthFeedback) -> &str {
    &g.career_growth
}

fn require_training(g: &GrowthFeedback) -> &str {
    &g.require_training
}

pub static SECTIONS: &[ChartSection] = &[
    ChartSection {
        title: "Tablet & Internet Performance",
        charts: &[
            ChartSpec {
                id: "tablet-working",
                title: "Tablet Working Well",
                categories: YES_NO,
                source: ChartSource::Technical(tablet_working),
            },
            ChartSpec {
                id: "internet-problems",
                title: "Internet Problems During Consultations",
                categories: YES_NO_SOMETIMES,
                source: ChartSource::Technical(internet_problems),
            },
            ChartSpec {
                id: "doctors-respectful",
                title: "Doctors' Behavior and Respect",
                categories: YES_NO,
                source: ChartSource::Technical(doctors_respectful),
            },
        ],
    },
    ChartSection {
        title: "Work Environment & Clinic Conditions",
        charts: &[
            ChartSpec {
                id: "comfortable-timings",
                title: "Comfortable with Clinic Timings",
                categories: YES_NO,
                source: ChartSource::Clinic(comfortable_timings),
            },
            ChartSpec {
                id: "clinic-clean-safe",
                title: "Clinic Clean & Safe",
                categories: YES_NO,
                source: ChartSource::CleanAndSafe,
            },
        ],
    },
    ChartSection {
        title: "Career Satisfaction & Growth",
        charts: &[
            ChartSpec {
                id: "proud-of-work",
                title: "Proud of Work",
                categories: YES_NO,
                source: ChartSource::Growth(proud_of_work),
            },
            ChartSpec {
                id: "career-growth",
                title: "Career Growth",
                categories: YES_NO,
                source: ChartSource::Growth(career_growth),
            },
            ChartSpec {
                id: "training-requirement",
                title: "Training Requirement",
                categories: TRAINING,
                source: ChartSource::Growth(require_training),
            },
        ],
    },
    ChartSection {
        title: "Additional Insights",
        charts: &[
            ChartSpec {
                id: "medicines-availability",
                title: "Medicines Availability",
                categories: YES_NO,
                source: ChartSource::Clinic(medicines_available),
            },
            ChartSpec {
                id: "helpful-managers",
                title: "Helpful Field Managers",
                categories: YES_NO,
                source: ChartSource::Clinic(managers_helpful),
            },
            ChartSpec {
                id: "patient-trust",
                title: "Patient Trust and Behavior",
                categories: YES_NO,
                source: ChartSource::Clinic(patients_trust_you),
            },
        ],
    },
];

/// Lowercases the label and replaces every run of other characters than `a-z0-9` by `-`.
pub fn slugify(label: &str) -> String {
    let mut res = String::with_capacity(label.len());
    let mut in_run = false;
    for c in label.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            res.push(c);
            in_run = false;
        } else if !in_run {
            res.push('-');
            in_run = true;
        }
    }
    res
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: u64,
    pub fill: String,
}

pub fn to_pie_data(tally: &Tally) -> Vec<PieSlice> {
    tally
        .iter()
        .map(|(name, value)| PieSlice {
            name: name.clone(),
            value: *value,
            fill: format!("var(--color-{})", slugify(name)),
        })
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub data: Vec<PieSlice>,
    pub total: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct SectionData {
    pub title: String,
    pub charts: Vec<ChartData>,
}

fn compute_tally(chart: &ChartSpec, snap: &FeedbackSnapshot) -> DashboardResult<Tally> {
    let answers: Vec<&str> = match chart.source {
        ChartSource::Technical(f) => snap.technical.iter().map(f).collect(),
        ChartSource::Clinic(f) => snap.clinic.iter().map(f).collect(),
        ChartSource::Growth(f) => snap.growth.iter().map(f).collect(),
        ChartSource::CleanAndSafe => {
            let ct = clean_and_safe(&snap.clinic);
            if !ct.is_aligned() {
                debug!(
                    "compute_tally: {}: {} records could not be paired",
                    chart.id,
                    ct.unmatched_left + ct.unmatched_right
                );
            }
            return Ok(ct.tally);
        }
    };
    let mut builder =
        TallyBuilder::new(chart.categories).context(InvalidChartSnafu { id: chart.id })?;
    for a in answers {
        builder.add_value(a);
    }
    if builder.skipped() > 0 {
        debug!(
            "compute_tally: {}: {} answers outside the categories",
            chart.id,
            builder.skipped()
        );
    }
    Ok(builder.build())
}

pub fn compute_chart(chart: &ChartSpec, snap: &FeedbackSnapshot) -> DashboardResult<ChartData> {
    let t = compute_tally(chart, snap)?;
    debug!("compute_chart: {}: {:?}", chart.id, t);
    Ok(ChartData {
        id: chart.id.to_string(),
        title: chart.title.to_string(),
        data: to_pie_data(&t),
        total: t.total(),
    })
}

pub fn compute_charts(snap: &FeedbackSnapshot) -> DashboardResult<Vec<SectionData>> {
    SECTIONS
        .iter()
        .map(|section| {
            Ok(SectionData {
                title: section.title.to_string(),
                charts: section
                    .charts
                    .iter()
                    .map(|chart| compute_chart(chart, snap))
                    .collect::<DashboardResult<Vec<ChartData>>>()?,
            })
        })
        .collect()
}

pub fn build_summary_js(
    config: &DashboardConfig,
    snap: &FeedbackSnapshot,
) -> DashboardResult<JSValue> {
    Ok(json!({
        "config": {
            "dashboardName": config.dashboard_name(),
        },
        "totals": DashboardData::from_snapshot(snap),
        "sections": compute_charts(snap)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ingest::FeedbackSource;

    fn default_snapshot() -> FeedbackSnapshot {
        let mut store = MemoryStore::new();
        let mut state = FeedbackStore::new();
        load_defaults(
            &mut store,
            &mut state,
            &FeedbackSource::embedded_default(),
            &IngestOptions::default(),
        )
        .unwrap();
        (*state.snapshot()).clone()
    }

    fn find<'a>(sections: &'a [SectionData], id: &str) -> &'a ChartData {
        sections
            .iter()
            .flat_map(|s| s.charts.iter())
            .find(|c| c.id == id)
            .unwrap()
    }

    fn values(c: &ChartData) -> Vec<(&str, u64)> {
        c.data.iter().map(|s| (s.name.as_str(), s.value)).collect()
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Yes"), "yes");
        assert_eq!(slugify("Maybe later"), "maybe-later");
        assert_eq!(slugify("Clean & Safe!"), "clean-safe-");
    }

    #[test]
    fn catalog_layout() {
        assert_eq!(SECTIONS.len(), 4);
        let n: usize = SECTIONS.iter().map(|s| s.charts.len()).sum();
        assert_eq!(n, 11);
    }

    #[test]
    fn charts_of_the_default_dataset() {
        let sections = compute_charts(&default_snapshot()).unwrap();
        assert_eq!(
            values(find(&sections, "tablet-working")),
            vec![("Yes", 4), ("No", 2)]
        );
        assert_eq!(
            values(find(&sections, "internet-problems")),
            vec![("Yes", 2), ("No", 2), ("Sometimes", 2)]
        );
        assert_eq!(
            values(find(&sections, "clinic-clean-safe")),
            vec![("Yes", 3), ("No", 3)]
        );
        assert_eq!(
            values(find(&sections, "training-requirement")),
            vec![("Yes", 3), ("No", 1), ("Maybe later", 2)]
        );
        let training = find(&sections, "training-requirement");
        assert_eq!(training.data[2].fill, "var(--color-maybe-later)");
        assert_eq!(training.total, 6);
    }

    #[test]
    fn answers_outside_the_categories_are_not_counted() {
        let mut snap = FeedbackSnapshot::default();
        for answer in ["Yes", " yes ", "Maybe", ""] {
            snap.technical.push(TechnicalFeedback {
                tablet_working: answer.to_string(),
                ..Default::default()
            });
        }
        let sections = compute_charts(&snap).unwrap();
        let c = find(&sections, "tablet-working");
        assert_eq!(values(c), vec![("Yes", 2), ("No", 0)]);
        assert_eq!(c.total, 2);
    }

    #[test]
    fn chart_with_repeated_categories_is_rejected() {
        let chart = ChartSpec {
            id: "broken",
            title: "Broken",
            categories: &["Yes", "yes"],
            source: ChartSource::Technical(tablet_working),
        };
        assert!(matches!(
            compute_chart(&chart, &FeedbackSnapshot::default()),
            Err(DashboardError::InvalidChart { .. })
        ));
    }

    #[test]
    fn empty_collections_give_zero_slices() {
        let sections = compute_charts(&FeedbackSnapshot::default()).unwrap();
        for c in sections.iter().flat_map(|s| s.charts.iter()) {
            assert!(!c.data.is_empty());
            assert_eq!(c.total, 0);
        }
    }

    #[test]
    fn summary_document() {
        let js = build_summary_js(&DashboardConfig::default(), &default_snapshot()).unwrap();
        assert_eq!(js["config"]["dashboardName"], "Nurse Feedback Dashboard");
        assert_eq!(js["totals"]["totalRecords"], 18);
        assert_eq!(js["sections"][0]["title"], "Tablet & Internet Performance");
        assert_eq!(js["sections"][0]["charts"][0]["data"][0]["value"], 4);
    }
}
