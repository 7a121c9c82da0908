//! Three-stage price filter: yard, then material, then date range.
//!
//! Each stage keeps the indices of the records that survived it and every
//! stage before it. Changing a stage's criterion recomputes that stage and
//! the ones downstream from the cached output of the stage above; setting a
//! criterion equal to the current one recomputes nothing.
//!
//! Filtering only ever selects. The record set is held unchanged, in the
//! order it was supplied (date descending from the store).

use crate::domain::date_range::{self, ALL_DATES, DateRange};
use crate::domain::error::ScrapError;
use crate::domain::price_record::{PriceRecord, earliest_date};
use chrono::NaiveDate;

pub const ALL_YARDS: &str = "All Yards";
pub const ALL_MATERIALS: &str = "All Materials";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Yard,
    Material,
    DateRange,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [Stage::Yard, Stage::Material, Stage::DateRange];

    fn index(self) -> usize {
        match self {
            Stage::Yard => 0,
            Stage::Material => 1,
            Stage::DateRange => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCriterion {
    Unset,
    Equals(String),
    Within(DateRange),
}

impl FilterCriterion {
    pub fn is_unset(&self) -> bool {
        matches!(self, FilterCriterion::Unset)
    }

    /// `Equals` compares the yard or material exactly and case-sensitively;
    /// `Within` is inclusive at both ends. A criterion on a stage it does not
    /// belong to admits nothing.
    pub fn admits(&self, stage: Stage, record: &PriceRecord) -> bool {
        match (self, stage) {
            (FilterCriterion::Unset, _) => true,
            (FilterCriterion::Equals(value), Stage::Yard) => record.yard == *value,
            (FilterCriterion::Equals(value), Stage::Material) => record.material == *value,
            (FilterCriterion::Within(range), Stage::DateRange) => range.contains(record.date),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceFilterChain {
    records: Vec<PriceRecord>,
    criteria: [FilterCriterion; 3],
    passed: [Vec<usize>; 3],
    refilters: [u64; 3],
    /// Label and anchor of the current date-range criterion, kept so the
    /// range can follow a changed record set.
    range_label: Option<(String, NaiveDate)>,
}

impl PriceFilterChain {
    pub fn new(records: Vec<PriceRecord>) -> Self {
        let all: Vec<usize> = (0..records.len()).collect();
        Self {
            records,
            criteria: [
                FilterCriterion::Unset,
                FilterCriterion::Unset,
                FilterCriterion::Unset,
            ],
            passed: [all.clone(), all.clone(), all],
            refilters: [0; 3],
            range_label: None,
        }
    }

    /// Swap in a fresh record set (after an update or import) and re-run
    /// every stage with the current criteria.
    ///
    /// A range set by label is resolved again against the new earliest date,
    /// so "All Dates" fallbacks widen to cover older records. When the new
    /// set is empty the previous range is kept.
    pub fn replace_records(&mut self, records: Vec<PriceRecord>) {
        self.records = records;
        if let Some((label, today)) = &self.range_label {
            if let Ok(range) = date_range::resolve(label, *today, earliest_date(&self.records)) {
                self.criteria[Stage::DateRange.index()] = FilterCriterion::Within(range);
            }
        }
        self.refilter_from(Stage::Yard);
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn criterion(&self, stage: Stage) -> &FilterCriterion {
        &self.criteria[stage.index()]
    }

    /// How many times `stage` has been recomputed.
    pub fn refilter_count(&self, stage: Stage) -> u64 {
        self.refilters[stage.index()]
    }

    /// `"All Yards"` clears the stage. Returns whether the criterion changed.
    pub fn set_yard_filter(&mut self, value: &str) -> bool {
        self.set_criterion(Stage::Yard, equals_unless(value, ALL_YARDS))
    }

    /// `"All Materials"` clears the stage. Returns whether the criterion changed.
    pub fn set_material_filter(&mut self, value: &str) -> bool {
        self.set_criterion(Stage::Material, equals_unless(value, ALL_MATERIALS))
    }

    /// `"All Dates"` clears the stage; any other label is resolved against
    /// `today` and the earliest date in the full record set.
    pub fn set_daterange_filter(
        &mut self,
        label: &str,
        today: NaiveDate,
    ) -> Result<bool, ScrapError> {
        let criterion = if label == ALL_DATES {
            FilterCriterion::Unset
        } else {
            let range = date_range::resolve(label, today, earliest_date(&self.records))?;
            FilterCriterion::Within(range)
        };
        let changed = self.apply(Stage::DateRange, criterion);
        self.range_label = (label != ALL_DATES).then(|| (label.to_string(), today));
        Ok(changed)
    }

    /// Set a stage directly. A date range set this way is fixed and is not
    /// re-resolved by [`Self::replace_records`].
    pub fn set_criterion(&mut self, stage: Stage, criterion: FilterCriterion) -> bool {
        if stage == Stage::DateRange {
            self.range_label = None;
        }
        self.apply(stage, criterion)
    }

    fn apply(&mut self, stage: Stage, criterion: FilterCriterion) -> bool {
        let slot = &mut self.criteria[stage.index()];
        if *slot == criterion {
            return false;
        }
        *slot = criterion;
        self.refilter_from(stage);
        true
    }

    /// Records passing every active stage, in upstream order.
    pub fn evaluate(&self) -> Vec<&PriceRecord> {
        self.passed[Stage::DateRange.index()]
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.passed[Stage::DateRange.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn refilter_from(&mut self, first: Stage) {
        for stage in Stage::ORDER.into_iter().skip(first.index()) {
            let i = stage.index();
            let criterion = &self.criteria[i];
            let records = &self.records;
            let next: Vec<usize> = if i == 0 {
                (0..records.len())
                    .filter(|&idx| criterion.admits(stage, &records[idx]))
                    .collect()
            } else {
                self.passed[i - 1]
                    .iter()
                    .copied()
                    .filter(|&idx| criterion.admits(stage, &records[idx]))
                    .collect()
            };
            tracing::trace!(?stage, kept = next.len(), "refiltered stage");
            self.passed[i] = next;
            self.refilters[i] += 1;
        }
    }
}

fn equals_unless(value: &str, sentinel: &str) -> FilterCriterion {
    if value == sentinel {
        FilterCriterion::Unset
    } else {
        FilterCriterion::Equals(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(yard: &str, material: &str, price: f64, d: NaiveDate) -> PriceRecord {
        PriceRecord::new(yard, material, price, "lb", d)
    }

    fn sample_records() -> Vec<PriceRecord> {
        vec![
            record("Zubicks", "Copper", 3.25, date(2024, 2, 1)),
            record("Zubicks", "Aluminum", 0.60, date(2024, 2, 1)),
            record("Bergs", "Copper", 3.20, date(2024, 1, 15)),
            record("Zubicks", "Copper", 3.10, date(2024, 1, 1)),
            record("Bergs", "Brass", 2.05, date(2023, 11, 1)),
        ]
    }

    #[test]
    fn new_chain_passes_everything() {
        let chain = PriceFilterChain::new(sample_records());
        assert_eq!(chain.len(), 5);
        for stage in Stage::ORDER {
            assert!(chain.criterion(stage).is_unset());
        }
    }

    #[test]
    fn sentinels_clear_stages() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_yard_filter("Bergs");
        assert_eq!(chain.len(), 2);
        chain.set_yard_filter(ALL_YARDS);
        assert!(chain.criterion(Stage::Yard).is_unset());
        assert_eq!(chain.len(), 5);

        chain.set_material_filter("Brass");
        assert_eq!(chain.len(), 1);
        chain.set_material_filter(ALL_MATERIALS);
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn material_match_is_exact() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_material_filter("copper");
        assert!(chain.is_empty());
        chain.set_material_filter("Copp");
        assert!(chain.is_empty());
        chain.set_material_filter("Copper");
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn stale_value_yields_empty_result() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_yard_filter("Closed Yard");
        assert!(chain.evaluate().is_empty());
    }

    #[test]
    fn stages_compose_with_and() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_yard_filter("Zubicks");
        chain.set_material_filter("Copper");
        let rows = chain.evaluate();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.yard == "Zubicks" && r.material == "Copper"));
    }

    #[test]
    fn order_is_preserved() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_material_filter("Copper");
        let dates: Vec<NaiveDate> = chain.evaluate().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 2, 1), date(2024, 1, 15), date(2024, 1, 1)]);
    }

    #[test]
    fn date_range_is_inclusive_at_both_ends() {
        let mut chain = PriceFilterChain::new(sample_records());
        let range = DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        chain.set_criterion(Stage::DateRange, FilterCriterion::Within(range));
        let dates: Vec<NaiveDate> = chain.evaluate().iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 2, 1), date(2024, 2, 1), date(2024, 1, 15), date(2024, 1, 1)]
        );
    }

    #[test]
    fn relative_label_resolves_against_today() {
        let mut chain = PriceFilterChain::new(sample_records());
        // 2024-01-01 .. 2024-02-01
        chain.set_daterange_filter("This Month", date(2024, 2, 1)).unwrap();
        assert_eq!(chain.len(), 4);
        match chain.criterion(Stage::DateRange) {
            FilterCriterion::Within(range) => {
                assert_eq!(range.start(), date(2024, 1, 1));
                assert_eq!(range.end(), date(2024, 2, 1));
            }
            other => panic!("expected Within, got {other:?}"),
        }
    }

    #[test]
    fn all_dates_clears_without_needing_records() {
        let mut chain = PriceFilterChain::new(Vec::new());
        assert!(!chain.set_daterange_filter(ALL_DATES, date(2024, 2, 15)).unwrap());
        assert!(chain.is_empty());
    }

    #[test]
    fn unknown_label_on_empty_chain_reports_no_data() {
        let mut chain = PriceFilterChain::new(Vec::new());
        let err = chain
            .set_daterange_filter("Whenever", date(2024, 2, 15))
            .unwrap_err();
        assert!(matches!(err, ScrapError::NoDataAvailable));
        assert!(chain.criterion(Stage::DateRange).is_unset());
    }

    #[test]
    fn unknown_label_spans_full_history() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_daterange_filter("Whenever", date(2024, 2, 15)).unwrap();
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn setting_same_value_does_not_refilter() {
        let mut chain = PriceFilterChain::new(sample_records());
        assert!(chain.set_yard_filter("Zubicks"));
        let before = chain.refilter_count(Stage::Yard);
        assert!(!chain.set_yard_filter("Zubicks"));
        assert_eq!(chain.refilter_count(Stage::Yard), before);
    }

    #[test]
    fn only_downstream_stages_refilter() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_material_filter("Copper");
        assert_eq!(chain.refilter_count(Stage::Yard), 0);
        assert_eq!(chain.refilter_count(Stage::Material), 1);
        assert_eq!(chain.refilter_count(Stage::DateRange), 1);

        chain.set_daterange_filter("Last Year", date(2024, 2, 15)).unwrap();
        assert_eq!(chain.refilter_count(Stage::Material), 1);
        assert_eq!(chain.refilter_count(Stage::DateRange), 2);

        chain.set_yard_filter("Bergs");
        assert_eq!(chain.refilter_count(Stage::Yard), 1);
        assert_eq!(chain.refilter_count(Stage::Material), 2);
        assert_eq!(chain.refilter_count(Stage::DateRange), 3);
    }

    #[test]
    fn clearing_upstream_reexposes_downstream_matches() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_yard_filter("Bergs");
        chain.set_material_filter("Copper");
        assert_eq!(chain.len(), 1);

        chain.set_yard_filter(ALL_YARDS);
        assert_eq!(chain.len(), 3);
        assert!(chain.evaluate().iter().all(|r| r.material == "Copper"));
    }

    #[test]
    fn replace_records_keeps_criteria() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_material_filter("Copper");
        let mut updated = vec![record("Zubicks", "Copper", 3.40, date(2024, 3, 1))];
        updated.extend(sample_records());
        chain.replace_records(updated);
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.evaluate()[0].date, date(2024, 3, 1));
    }

    #[test]
    fn replace_records_widens_fallback_range_to_older_records() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_daterange_filter("Whenever", date(2024, 2, 15)).unwrap();

        let mut imported = sample_records();
        imported.push(record("Bergs", "Copper", 2.90, date(2022, 6, 1)));
        chain.replace_records(imported);

        assert_eq!(chain.len(), 6);
        match chain.criterion(Stage::DateRange) {
            FilterCriterion::Within(range) => assert_eq!(range.start(), date(2022, 6, 1)),
            other => panic!("expected Within, got {other:?}"),
        }
    }

    #[test]
    fn replace_records_keeps_fixed_range() {
        let mut chain = PriceFilterChain::new(sample_records());
        let range = DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        chain.set_criterion(Stage::DateRange, FilterCriterion::Within(range));

        let mut imported = sample_records();
        imported.push(record("Bergs", "Copper", 2.90, date(2022, 6, 1)));
        chain.replace_records(imported);

        assert_eq!(chain.criterion(Stage::DateRange), &FilterCriterion::Within(range));
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn criteria_on_foreign_stages_admit_nothing() {
        let copper = record("Zubicks", "Copper", 3.25, date(2024, 2, 1));
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 1)).unwrap();

        assert!(!FilterCriterion::Equals("2024-02-01".into()).admits(Stage::DateRange, &copper));
        assert!(!FilterCriterion::Within(range).admits(Stage::Yard, &copper));
        assert!(!FilterCriterion::Within(range).admits(Stage::Material, &copper));
        assert!(FilterCriterion::Within(range).admits(Stage::DateRange, &copper));
        assert!(FilterCriterion::Unset.admits(Stage::DateRange, &copper));
    }

    #[test]
    fn filtering_never_touches_the_record_set() {
        let mut chain = PriceFilterChain::new(sample_records());
        chain.set_yard_filter("Nobody");
        assert_eq!(chain.records(), sample_records().as_slice());
    }
}
