mod config;
use log::{debug, warn};

use std::collections::{HashMap, VecDeque};

pub mod builder;
pub mod manual;
pub mod mapper;

pub use crate::config::*;

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Counts the answers of a collection against a fixed list of categories.
///
/// Arguments:
/// * `records` the collection to count
/// * `projector` extracts the answer to count from one record
/// * `categories` the allowed answers, in display order
///
/// Answers are trimmed and compared without case. Answers that match no category are not
/// counted. Every category is present in the output, with zero if nothing matched.
pub fn tally<T, F>(records: &[T], projector: F, categories: &[&str]) -> Tally
where
    F: Fn(&T) -> &str,
{
    tally_values(records.iter().map(projector), categories)
}

/// Same as [`tally`], for answers that have already been extracted.
pub fn tally_values<I, S>(values: I, categories: &[&str]) -> Tally
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized: Vec<String> = categories.iter().map(|c| normalize(c)).collect();
    let mut counts: Vec<u64> = vec![0; categories.len()];
    let mut dropped: u64 = 0;
    for v in values {
        let v = normalize(v.as_ref());
        // The first matching category wins if the list has duplicates.
        match normalized.iter().position(|c| *c == v) {
            Some(idx) => counts[idx] += 1,
            None => dropped += 1,
        }
    }
    debug!(
        "tally_values: categories: {:?} counts: {:?} dropped: {:?}",
        categories, counts, dropped
    );
    Tally {
        counts: categories
            .iter()
            .map(|c| c.to_string())
            .zip(counts)
            .collect(),
    }
}

/// Pairs the records of two collections by identity, in order of appearance.
///
/// When several records share an identity, the n-th one on the left is paired with the
/// n-th one on the right. Returns the pairs along with the number of records left without
/// a partner on each side.
pub fn zip_by_identity<'a, L, R>(
    left: &'a [L],
    right: &'a [R],
) -> (Vec<(&'a L, &'a R)>, usize, usize)
where
    L: Identified,
    R: Identified,
{
    let mut waiting: HashMap<&str, VecDeque<&R>> = HashMap::new();
    for r in right.iter() {
        waiting.entry(r.identity()).or_default().push_back(r);
    }
    let mut pairs: Vec<(&L, &R)> = Vec::new();
    let mut unmatched_left: usize = 0;
    for l in left.iter() {
        match waiting.get_mut(l.identity()).and_then(|q| q.pop_front()) {
            Some(r) => pairs.push((l, r)),
            None => unmatched_left += 1,
        }
    }
    let unmatched_right: usize = waiting.values().map(|q| q.len()).sum();
    (pairs, unmatched_left, unmatched_right)
}

/// Tallies a value derived from two collections that describe the same rows.
///
/// The records are paired with [`zip_by_identity`], not by position. Records without a
/// partner are left out of the count and reported in the result.
pub fn tally_composite<L, R, D>(
    left: &[L],
    right: &[R],
    derive: D,
    categories: &[&str],
) -> CompositeTally
where
    L: Identified,
    R: Identified,
    D: Fn(&L, &R) -> String,
{
    let (pairs, unmatched_left, unmatched_right) = zip_by_identity(left, right);
    if unmatched_left > 0 || unmatched_right > 0 {
        warn!(
            "tally_composite: collections are not aligned: {} left and {} right records without a partner",
            unmatched_left, unmatched_right
        );
    }
    let tally = tally_values(pairs.iter().map(|(l, r)| derive(l, r)), categories);
    CompositeTally {
        tally,
        pairs: pairs.len(),
        unmatched_left,
        unmatched_right,
    }
}

fn is_yes(value: &str) -> bool {
    normalize(value) == "yes"
}

/// "Yes" for every clinic that is both clean and safe, "No" otherwise.
pub fn clean_and_safe(clinic: &[ClinicWorkEnvironment]) -> CompositeTally {
    tally_composite(
        clinic,
        clinic,
        |c: &ClinicWorkEnvironment, s: &ClinicWorkEnvironment| {
            if is_yes(&c.clinic_clean) && is_yes(&s.feel_safe) {
                "Yes".to_string()
            } else {
                "No".to_string()
            }
        },
        YES_NO,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Answer {
        id: String,
        v: String,
    }

    impl Identified for Answer {
        fn identity(&self) -> &str {
            &self.id
        }
    }

    fn answers(vals: &[(&str, &str)]) -> Vec<Answer> {
        vals.iter()
            .map(|(id, v)| Answer {
                id: id.to_string(),
                v: v.to_string(),
            })
            .collect()
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn case_insensitive_match_drops_unknown() {
        init();
        let records = answers(&[("a", "yes"), ("b", "Yes"), ("c", "no"), ("d", "maybe")]);
        let t = tally(&records, |r| r.v.as_str(), YES_NO);
        assert_eq!(
            t.counts,
            vec![("Yes".to_string(), 2), ("No".to_string(), 1)]
        );
    }

    #[test]
    fn absent_categories_are_zero() {
        let records = answers(&[("a", " sometimes "), ("b", "")]);
        let t = tally(&records, |r| r.v.as_str(), YES_NO_SOMETIMES);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("Yes"), Some(0));
        assert_eq!(t.get("No"), Some(0));
        assert_eq!(t.get("Sometimes"), Some(1));
        assert_eq!(t.get("Other"), None);
    }

    #[test]
    fn total_never_exceeds_records() {
        let records = answers(&[("a", "Yes"), ("b", "No"), ("c", "No"), ("d", "n/a")]);
        let t = tally(&records, |r| r.v.as_str(), YES_NO);
        assert_eq!(t.total(), 3);
        assert!(t.total() <= records.len() as u64);

        let empty: Vec<Answer> = vec![];
        let t = tally(&empty, |r| r.v.as_str(), TRAINING);
        assert_eq!(t.len(), 3);
        assert_eq!(t.total(), 0);
    }

    #[test]
    fn order_of_records_does_not_matter() {
        let mut records = answers(&[("a", "Yes"), ("b", "No"), ("c", "yes")]);
        let t1 = tally(&records, |r| r.v.as_str(), YES_NO);
        records.reverse();
        let t2 = tally(&records, |r| r.v.as_str(), YES_NO);
        assert_eq!(t1, t2);
    }

    #[test]
    fn composite_pairs_by_identity() {
        init();
        let clean = answers(&[("a", "Yes"), ("b", "Yes"), ("c", "No")]);
        // Same rows, different order.
        let safe = answers(&[("c", "Yes"), ("a", "yes"), ("b", "No")]);
        let res = tally_composite(
            &clean,
            &safe,
            |l, r| {
                if is_yes(&l.v) && is_yes(&r.v) {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                }
            },
            YES_NO,
        );
        assert!(res.is_aligned());
        assert_eq!(res.pairs, 3);
        assert_eq!(res.tally.get("Yes"), Some(1));
        assert_eq!(res.tally.get("No"), Some(2));
    }

    #[test]
    fn composite_reports_divergent_inputs() {
        init();
        let left = answers(&[("a", "Yes"), ("b", "Yes"), ("x", "Yes")]);
        let right = answers(&[("a", "Yes"), ("b", "Yes"), ("y", "Yes"), ("z", "Yes")]);
        let res = tally_composite(&left, &right, |_, _| "Yes".to_string(), YES_NO);
        assert!(!res.is_aligned());
        assert_eq!(res.pairs, 2);
        assert_eq!(res.unmatched_left, 1);
        assert_eq!(res.unmatched_right, 2);
        assert_eq!(res.tally.get("Yes"), Some(2));
    }

    #[test]
    fn duplicate_identities_pair_in_order() {
        let left = answers(&[("a", "1"), ("a", "2")]);
        let right = answers(&[("a", "x"), ("a", "y")]);
        let (pairs, ul, ur) = zip_by_identity(&left, &right);
        assert_eq!((ul, ur), (0, 0));
        let flat: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(l, r)| (l.v.as_str(), r.v.as_str()))
            .collect();
        assert_eq!(flat, vec![("1", "x"), ("2", "y")]);
    }

    #[test]
    fn clean_and_safe_needs_both() {
        let clinic = vec![
            ClinicWorkEnvironment {
                id: "1".to_string(),
                clinic_clean: "Yes".to_string(),
                feel_safe: " YES".to_string(),
                ..Default::default()
            },
            ClinicWorkEnvironment {
                id: "2".to_string(),
                clinic_clean: "Yes".to_string(),
                feel_safe: "No".to_string(),
                ..Default::default()
            },
            ClinicWorkEnvironment {
                id: "3".to_string(),
                ..Default::default()
            },
        ];
        let res = clean_and_safe(&clinic);
        assert!(res.is_aligned());
        assert_eq!(
            res.tally.counts,
            vec![("Yes".to_string(), 1), ("No".to_string(), 2)]
        );
    }

    #[test]
    fn records_round_trip_through_json() {
        let g = GrowthFeedback {
            id: "abc".to_string(),
            name: "Jane Doe".to_string(),
            career_growth: "Yes".to_string(),
            ..Default::default()
        };
        let js = serde_json::to_string(&vec![g.clone()]).unwrap();
        assert!(js.contains("\"careerGrowth\":\"Yes\""));
        let back: Vec<GrowthFeedback> = serde_json::from_str(&js).unwrap();
        assert_eq!(back, vec![g]);

        // Records stored without an identity still load.
        let legacy: Vec<TechnicalFeedback> =
            serde_json::from_str(r#"[{"name":"Old","tabletWorking":"No"}]"#).unwrap();
        assert_eq!(legacy[0].id, "");
        assert_eq!(legacy[0].tablet_working, "No");
    }
}
