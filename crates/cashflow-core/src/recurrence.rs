//! Expansion of custom cash flows into dated occurrences.

use chrono::{Duration, NaiveDate};

use cashflow_domain::{
    shift_month, CustomCashFlow, DateWindow, FlowCategory, FlowEntry, FlowSchedule, FlowType,
    RecurrenceKind, RecurrenceRule, WINDOW_DAYS_LIMIT,
};

use crate::ProjectionError;

/// Upper bound on occurrences produced for a single rule, independent of the window check.
/// A daily rule over the longest allowed window stays within it.
pub const MAX_OCCURRENCES: u32 = WINDOW_DAYS_LIMIT as u32;

/// Occurrence dates of one rule inside one window.
///
/// Every date is computed from the anchor and the occurrence index rather than from the
/// previous date, so a monthly clamp (Jan 31 -> Feb 29) never shifts later months.
#[derive(Debug, Clone)]
pub struct OccurrenceDates {
    kind: RecurrenceKind,
    interval: i64,
    anchor: NaiveDate,
    limit: NaiveDate,
    index: u32,
    exhausted: bool,
}

impl OccurrenceDates {
    fn empty(kind: RecurrenceKind, anchor: NaiveDate) -> Self {
        Self {
            kind,
            interval: 1,
            anchor,
            limit: anchor,
            index: 0,
            exhausted: true,
        }
    }

    /// True when the cap stopped the sequence before the window end.
    pub fn is_truncated(&self) -> bool {
        !self.exhausted
            && self.index >= MAX_OCCURRENCES
            && self
                .nth_date(self.index)
                .is_some_and(|date| date <= self.limit)
    }

    fn nth_date(&self, index: u32) -> Option<NaiveDate> {
        let steps = self.interval * i64::from(index);
        match self.kind {
            RecurrenceKind::Weekly => add_days(self.anchor, steps * 7),
            RecurrenceKind::CustomDays => add_days(self.anchor, steps),
            RecurrenceKind::Monthly => shift_month(self.anchor, steps),
        }
    }
}

impl Iterator for OccurrenceDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.exhausted || self.index >= MAX_OCCURRENCES {
            return None;
        }
        match self.nth_date(self.index) {
            Some(date) if date <= self.limit => {
                self.index += 1;
                Some(date)
            }
            _ => {
                self.exhausted = true;
                None
            }
        }
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

pub struct RecurrenceExpander;

impl RecurrenceExpander {
    /// Rejects rules that cannot be expanded.
    pub fn validate(rule: &RecurrenceRule) -> Result<(), ProjectionError> {
        if rule.interval < 1 {
            return Err(ProjectionError::Validation(format!(
                "{} recurrence interval must be a positive integer, got {}",
                rule.kind, rule.interval
            )));
        }
        if let Some(end) = rule.end_date {
            if end < rule.start_date {
                return Err(ProjectionError::Validation(format!(
                    "recurrence ends on {end} before it starts on {}",
                    rule.start_date
                )));
            }
        }
        Ok(())
    }

    /// Occurrence dates of `rule` that fall in `window`.
    ///
    /// The first candidate is the later of the rule start and the window start; the
    /// sequence stops after the earlier of the rule end and the window end.
    pub fn dates(
        rule: &RecurrenceRule,
        window: DateWindow,
    ) -> Result<OccurrenceDates, ProjectionError> {
        Self::validate(rule)?;
        let until = rule.end_date.unwrap_or(window.end);
        let Some(span) = window.clamp(rule.start_date, until) else {
            return Ok(OccurrenceDates::empty(rule.kind, window.start));
        };
        Ok(OccurrenceDates {
            kind: rule.kind,
            interval: i64::from(rule.interval),
            anchor: span.start,
            limit: span.end,
            index: 0,
            exhausted: false,
        })
    }

    /// Dated entries for a custom flow, one-time or recurring, inside `window`.
    pub fn expand_flow(
        flow: &CustomCashFlow,
        window: DateWindow,
    ) -> Result<Vec<FlowEntry>, ProjectionError> {
        if !flow.amount.is_finite() {
            return Err(ProjectionError::Validation(format!(
                "custom flow {} has a non-finite amount",
                flow.id
            )));
        }
        let category = match flow.flow_type {
            FlowType::Inflow => FlowCategory::CustomInflow,
            FlowType::Outflow => FlowCategory::CustomOutflow,
        };
        let amount = flow.flow_type.signed(flow.amount);
        let description = flow.label();
        let source_id = flow.id.to_string();
        let entry = |date| {
            FlowEntry::new(date, source_id.clone(), category, description.clone(), amount)
        };

        let entries = match &flow.schedule {
            FlowSchedule::OneTime { date } if window.contains(*date) => vec![entry(*date)],
            FlowSchedule::OneTime { .. } => Vec::new(),
            FlowSchedule::Recurring { rule } => {
                let mut dates = Self::dates(rule, window)?;
                let entries: Vec<FlowEntry> = dates.by_ref().map(entry).collect();
                if dates.is_truncated() {
                    return Err(ProjectionError::Validation(format!(
                        "custom flow {} recurs more than {MAX_OCCURRENCES} times in {window}",
                        flow.id
                    )));
                }
                entries
            }
        };
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    fn expand(rule: &RecurrenceRule, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        RecurrenceExpander::dates(rule, window(start, end))
            .unwrap()
            .collect()
    }

    #[test]
    fn weekly_rule_yields_five_january_mondays() {
        let rule = RecurrenceRule::weekly(date(2024, 1, 1)).until(date(2024, 1, 31));
        let dates = expand(&rule, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22),
                date(2024, 1, 29),
            ]
        );
    }

    #[test]
    fn monthly_rule_clamps_to_month_end_without_drifting() {
        let rule = RecurrenceRule::monthly(date(2024, 1, 31));
        let dates = expand(&rule, date(2024, 1, 1), date(2024, 5, 31));
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 30),
                date(2024, 5, 31),
            ]
        );
    }

    #[test]
    fn monthly_rule_clamps_to_february_28_outside_leap_years() {
        let rule = RecurrenceRule::monthly(date(2023, 1, 29));
        let dates = expand(&rule, date(2023, 1, 1), date(2023, 3, 31));
        assert_eq!(
            dates,
            vec![date(2023, 1, 29), date(2023, 2, 28), date(2023, 3, 29)]
        );
    }

    #[test]
    fn custom_days_rule_steps_by_interval() {
        let rule = RecurrenceRule::every_days(10, date(2024, 1, 5));
        let dates = expand(&rule, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(
            dates,
            vec![date(2024, 1, 5), date(2024, 1, 15), date(2024, 1, 25)]
        );
    }

    #[test]
    fn first_candidate_is_window_start_when_rule_started_earlier() {
        let rule = RecurrenceRule::weekly(date(2023, 12, 1));
        let dates = expand(&rule, date(2024, 1, 3), date(2024, 1, 20));
        assert_eq!(
            dates,
            vec![date(2024, 1, 3), date(2024, 1, 10), date(2024, 1, 17)]
        );
    }

    #[test]
    fn rule_ending_before_window_yields_nothing() {
        let rule = RecurrenceRule::weekly(date(2023, 1, 1)).until(date(2023, 6, 1));
        let dates = expand(&rule, date(2024, 1, 1), date(2024, 1, 31));
        assert!(dates.is_empty());
    }

    #[test]
    fn zero_and_negative_intervals_are_rejected() {
        for interval in [0, -3] {
            let rule = RecurrenceRule::every_days(interval, date(2024, 1, 1));
            let span = window(date(2024, 1, 1), date(2024, 1, 31));
            let err = RecurrenceExpander::dates(&rule, span).unwrap_err();
            assert!(matches!(err, ProjectionError::Validation(_)));
        }
    }

    #[test]
    fn expansion_is_restartable() {
        let rule = RecurrenceRule::every_days(3, date(2024, 2, 1));
        let span = window(date(2024, 2, 1), date(2024, 3, 1));
        let iter = RecurrenceExpander::dates(&rule, span).unwrap();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        let third: Vec<_> = RecurrenceExpander::dates(&rule, span).unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first, third);
        assert!(!first.is_empty());
    }

    #[test]
    fn daily_rule_is_capped() {
        let rule = RecurrenceRule::every_days(1, date(2000, 1, 1));
        let mut iter = RecurrenceExpander::dates(&rule, window(date(2000, 1, 1), date(2040, 1, 1)))
            .unwrap();
        assert_eq!(iter.by_ref().count(), MAX_OCCURRENCES as usize);
        assert!(iter.is_truncated());
    }

    #[test]
    fn capped_flow_is_rejected_instead_of_cut_short() {
        let flow = CustomCashFlow::recurring(
            FlowType::Outflow,
            1.0,
            RecurrenceRule::every_days(1, date(2020, 1, 1)),
        );
        let span = window(date(2020, 1, 1), date(2033, 1, 1));
        let err = RecurrenceExpander::expand_flow(&flow, span).unwrap_err();
        assert!(matches!(err, ProjectionError::Validation(_)));
    }

    #[test]
    fn daily_flow_fills_the_longest_window() {
        let start = date(2020, 1, 1);
        let end = start + Duration::days(WINDOW_DAYS_LIMIT - 1);
        let flow =
            CustomCashFlow::recurring(FlowType::Outflow, 1.0, RecurrenceRule::every_days(1, start));
        let entries = RecurrenceExpander::expand_flow(&flow, window(start, end)).unwrap();
        assert_eq!(entries.len(), WINDOW_DAYS_LIMIT as usize);
        assert_eq!(entries.last().map(|entry| entry.date), Some(end));
    }

    #[test]
    fn end_date_inside_window_stops_expansion() {
        let rule = RecurrenceRule::weekly(date(2024, 1, 1)).until(date(2024, 1, 17));
        let dates = expand(&rule, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]);

        let rule = RecurrenceRule::monthly(date(2024, 1, 31)).until(date(2024, 3, 30));
        let dates = expand(&rule, date(2024, 1, 1), date(2024, 6, 30));
        assert_eq!(dates, vec![date(2024, 1, 31), date(2024, 2, 29)]);
    }

    #[test]
    fn end_date_on_an_occurrence_includes_it() {
        let rule = RecurrenceRule::every_days(5, date(2024, 1, 1)).until(date(2024, 1, 11));
        let dates = expand(&rule, date(2023, 12, 1), date(2024, 2, 29));
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 6), date(2024, 1, 11)]);
    }

    #[test]
    fn expanded_entries_carry_flow_details() {
        let flow = CustomCashFlow::recurring(
            FlowType::Outflow,
            250.0,
            RecurrenceRule::weekly(date(2024, 1, 1)),
        )
        .with_description("Payroll");
        let span = window(date(2024, 1, 1), date(2024, 1, 14));
        let entries = RecurrenceExpander::expand_flow(&flow, span).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| entry.amount == -250.0
            && entry.description == "Payroll"
            && entry.category == FlowCategory::CustomOutflow
            && entry.source_id == flow.id.to_string()));
    }

    #[test]
    fn one_time_flow_outside_window_is_dropped() {
        let flow = CustomCashFlow::one_time(FlowType::Inflow, 90.0, date(2024, 2, 1));
        let span = window(date(2024, 1, 1), date(2024, 1, 31));
        let entries = RecurrenceExpander::expand_flow(&flow, span).unwrap();
        assert!(entries.is_empty());
    }
}
