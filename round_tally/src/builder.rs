pub use crate::config::*;
use crate::schedule::{RoundSpec, SeasonSchedule};

/// A builder for season schedules.
///
/// ```
/// use round_tally::builder::Builder;
/// # use round_tally::AggregationError;
///
/// let schedule = Builder::new("2023")?
///     .rounds(&["Qualifier", "Stage 1", "Knockout 1"])?
///     .bracket(&["Knockout 1"])?
///     .eliminated("Stage 1", &[("Anna", "Series A")])?
///     .build()?;
///
/// assert_eq!(schedule.round_names().len(), 3);
/// # Ok::<(), AggregationError>(())
/// ```
pub struct Builder {
    pub(crate) _season: String,
    pub(crate) _rounds: Vec<RoundSpec>,
}

impl Builder {
    pub fn new(season: &str) -> Result<Builder, AggregationError> {
        if season.is_empty() {
            return Err(AggregationError::InvalidSchedule(
                "empty season identifier".to_string(),
            ));
        }
        Ok(Builder {
            _season: season.to_string(),
            _rounds: Vec::new(),
        })
    }

    /// Appends regular rounds, in chronological order.
    pub fn rounds(mut self, names: &[&str]) -> Result<Builder, AggregationError> {
        for name in names {
            self.add_round(RoundSpec::regular(name))?;
        }
        Ok(self)
    }

    /// Flags already declared rounds as wildcard rounds.
    pub fn wildcard(mut self, names: &[&str]) -> Result<Builder, AggregationError> {
        for name in names {
            self.round_mut(name)?.wildcard = true;
        }
        Ok(self)
    }

    /// Flags already declared rounds as knockout (bracket) rounds.
    pub fn bracket(mut self, names: &[&str]) -> Result<Builder, AggregationError> {
        for name in names {
            self.round_mut(name)?.bracket = true;
        }
        Ok(self)
    }

    /// Records the contestants, as (name, series) pairs, eliminated in a round.
    pub fn eliminated(
        mut self,
        round: &str,
        contestants: &[(&str, &str)],
    ) -> Result<Builder, AggregationError> {
        let r = self.round_mut(round)?;
        for (name, series) in contestants {
            r.eliminated.push(Contestant::new(name, series));
        }
        Ok(self)
    }

    /// Adds a fully described round.
    pub fn add_round(&mut self, round: RoundSpec) -> Result<(), AggregationError> {
        let name = strip_label(&round.name);
        if self._rounds.iter().any(|r| strip_label(&r.name) == name) {
            return Err(AggregationError::InvalidSchedule(format!(
                "round {:?} is defined twice",
                round.name
            )));
        }
        self._rounds.push(round);
        Ok(())
    }

    pub fn build(self) -> Result<SeasonSchedule, AggregationError> {
        SeasonSchedule::new(&self._season, self._rounds)
    }

    fn round_mut(&mut self, name: &str) -> Result<&mut RoundSpec, AggregationError> {
        let stripped = strip_label(name);
        self._rounds
            .iter_mut()
            .find(|r| strip_label(&r.name) == stripped)
            .ok_or_else(|| AggregationError::InvalidSchedule(format!("unknown round {:?}", name)))
    }
}
