mod config;
pub mod builder;
pub mod manual;
mod normalize;
mod schedule;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::normalize::{normalize, normalize_cell};
pub use crate::schedule::{RoundSpec, SeasonRegistry, SeasonSchedule};

/// The season is a 4-digit year directly followed by this marker in the name
/// of the table, for example `votes_2023_season.csv`.
const SEASON_PATTERN: &str = r"(\d{4})_season";

static SEASON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SEASON_PATTERN).expect("season pattern is a valid regex"));

/// Finds the season in the name of a table.
pub fn detect_season(source_name: &str) -> Option<String> {
    SEASON_RE
        .captures(source_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Per-round aggregation of a vote table against the schedule of its season.
///
/// The aggregator is validated once at construction and is read-only
/// afterwards: all the queries recompute their results from the table.
#[derive(Debug, Clone)]
pub struct RoundAggregator {
    season: String,
    schedule: SeasonSchedule,
    table: VoteTable,
    // Canonical order of the rounds, as defined by the schedule.
    rounds: Vec<String>,
    wildcard_rounds: HashSet<String>,
    // Stripped round label -> physical column.
    round_columns: HashMap<String, usize>,
    name_column: usize,
    series_column: usize,
    avatar_column: Option<usize>,
    extra_columns: Vec<String>,
}

impl RoundAggregator {
    /// Builds an aggregator.
    ///
    /// Arguments:
    /// * `table` the contestant-by-round table
    /// * `source_name` the display name of the table (or the base name of
    /// its file). The season is detected from it.
    /// * `registry` the configured seasons
    /// * `layout` the labels of the identity columns
    pub fn from_table(
        table: VoteTable,
        source_name: &str,
        registry: &SeasonRegistry,
        layout: &TableLayout,
    ) -> Result<RoundAggregator, AggregationError> {
        let headers = table.stripped_headers();
        debug!("from_table: headers: {:?}", headers);

        let season = detect_season(source_name)
            .ok_or_else(|| AggregationError::SeasonUndetectable(source_name.to_string()))?;
        debug!("from_table: season: {}", season);
        let schedule = registry.schedule(&season)?.clone();
        let expected = schedule.round_names();
        let wildcard_rounds = schedule.wildcard_rounds();

        let name_column = table
            .column(&layout.name_column)
            .ok_or_else(|| AggregationError::MissingIdentityColumn(layout.name_column.clone()))?;
        let series_column = table.column(&layout.series_column).ok_or_else(|| {
            AggregationError::MissingIdentityColumn(layout.series_column.clone())
        })?;
        let avatar_column = table.column(&layout.avatar_column);

        // The first column with a given label wins, like the lookup by label.
        let mut round_columns: HashMap<String, usize> = HashMap::new();
        for (idx, h) in headers.iter().enumerate() {
            if !layout.is_identity(h) {
                round_columns.entry(h.clone()).or_insert(idx);
            }
        }

        let missing: Vec<String> = expected
            .iter()
            .filter(|r| !round_columns.contains_key(*r))
            .cloned()
            .collect();
        if !missing.is_empty() {
            warn!("from_table: missing round columns: {:?}", missing);
            return Err(AggregationError::MissingRoundColumns(missing));
        }

        let extra_columns: Vec<String> = headers
            .iter()
            .filter(|h| !layout.is_identity(h) && !expected.contains(*h))
            .cloned()
            .collect();
        if !extra_columns.is_empty() {
            warn!("from_table: extra columns are ignored: {:?}", extra_columns);
        }

        info!(
            "Loaded season {}: {} contestants, {} rounds",
            season,
            table.num_rows(),
            expected.len()
        );

        Ok(RoundAggregator {
            season,
            schedule,
            table,
            rounds: expected,
            wildcard_rounds,
            round_columns,
            name_column,
            series_column,
            avatar_column,
            extra_columns,
        })
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    /// All the rounds, in chronological order.
    pub fn vote_rounds(&self) -> &[String] {
        &self.rounds
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn num_contestants(&self) -> usize {
        self.table.num_rows()
    }

    /// The contestants, in the order of the table.
    pub fn contestants(&self) -> Vec<ContestantInfo> {
        (0..self.table.num_rows())
            .map(|row| {
                let avatar = self
                    .avatar_column
                    .map(|col| self.table.cell(row, col).text())
                    .filter(|s| !s.trim().is_empty());
                ContestantInfo {
                    contestant: self.contestant(row),
                    avatar,
                }
            })
            .collect()
    }

    /// The canonical rounds minus the excluded ones, and minus the wildcard
    /// rounds if requested. The chronological order is preserved.
    pub fn filtered_rounds(&self, excluded_columns: &[String], exclude_wildcard: bool) -> Vec<String> {
        let excluded: HashSet<String> = excluded_columns.iter().map(|c| strip_label(c)).collect();
        let res: Vec<String> = self
            .rounds
            .iter()
            .filter(|r| !excluded.contains(*r))
            .filter(|r| !(exclude_wildcard && self.wildcard_rounds.contains(*r)))
            .cloned()
            .collect();
        debug!(
            "filtered_rounds: excluded: {:?} exclude_wildcard: {} -> {:?}",
            excluded_columns, exclude_wildcard, res
        );
        res
    }

    /// The votes of every contestant for the given rounds.
    ///
    /// With `exclude_ranking`, the votes of a contestant are masked starting
    /// from the first of the given rounds in which the schedule eliminates
    /// them. The eliminating round keeps its own value only if it is a
    /// knockout round: in that case the tally of the round is the
    /// elimination itself.
    pub fn vote_data(&self, round_labels: &[String], exclude_ranking: bool) -> Vec<ContestantVotes> {
        if round_labels.is_empty() {
            return Vec::new();
        }
        let columns: Vec<Option<usize>> = round_labels
            .iter()
            .map(|r| {
                let col = self.round_columns.get(&strip_label(r)).cloned();
                if col.is_none() {
                    debug!("vote_data: round {:?} has no column", r);
                }
                col
            })
            .collect();

        let mut res: Vec<ContestantVotes> = Vec::with_capacity(self.table.num_rows());
        for row in 0..self.table.num_rows() {
            let contestant = self.contestant(row);
            let mut votes: Vec<Option<f64>> = columns
                .iter()
                .map(|col| col.and_then(|c| normalize_cell(self.table.cell(row, c))))
                .collect();

            if exclude_ranking {
                if let Some(elim_idx) = self.elimination_index(&contestant, round_labels) {
                    let keep_own = self.schedule.is_bracket_round(&round_labels[elim_idx]);
                    debug!(
                        "vote_data: {:?} eliminated in {:?} (bracket: {})",
                        contestant, round_labels[elim_idx], keep_own
                    );
                    for (idx, v) in votes.iter_mut().enumerate() {
                        if idx > elim_idx || (idx == elim_idx && !keep_own) {
                            *v = None;
                        }
                    }
                }
            }

            res.push(ContestantVotes { contestant, votes });
        }
        res
    }

    /// The number of contestants still active when entering each round.
    ///
    /// The eliminations are accumulated only over the given rounds: leaving a
    /// round out also leaves its eliminations out of all the later counts.
    pub fn active_headcount(
        &self,
        round_labels: &[String],
        vote_data: &[ContestantVotes],
    ) -> Vec<(String, u64)> {
        let universe: HashSet<&Contestant> = vote_data.iter().map(|cv| &cv.contestant).collect();
        let mut cumulative_eliminated: HashSet<&Contestant> = HashSet::new();
        let mut res: Vec<(String, u64)> = Vec::with_capacity(round_labels.len());
        for round in round_labels.iter() {
            let still_active = universe
                .iter()
                .filter(|c| !cumulative_eliminated.contains(*c))
                .count();
            res.push((round.clone(), still_active as u64));
            // Eliminations of this round only count from the next round onward.
            cumulative_eliminated.extend(self.schedule.eliminated(round).iter());
        }
        debug!("active_headcount: {:?}", res);
        res
    }

    /// The votes and headcounts for the filtered rounds.
    ///
    /// Eliminations and headcounts are always computed over the complete
    /// chronology, then restricted to the filtered rounds.
    pub fn votes_by_rounds(
        &self,
        excluded_columns: &[String],
        exclude_wildcard: bool,
        exclude_ranking: bool,
    ) -> VotesByRounds {
        info!(
            "votes_by_rounds: excluded_columns: {:?} exclude_wildcard: {} exclude_ranking: {}",
            excluded_columns, exclude_wildcard, exclude_ranking
        );
        let rounds = self.filtered_rounds(excluded_columns, exclude_wildcard);
        if rounds.is_empty() {
            warn!("votes_by_rounds: no round left after filtering");
            return VotesByRounds::default();
        }

        let all_rounds = &self.rounds;
        let all_votes = self.vote_data(all_rounds, exclude_ranking);
        let all_headcounts = self.active_headcount(all_rounds, &all_votes);

        let positions: HashMap<&str, usize> = all_rounds
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.as_str(), idx))
            .collect();
        let selected: Vec<usize> = rounds
            .iter()
            .filter_map(|r| positions.get(r.as_str()).cloned())
            .collect();

        let votes: Vec<ContestantVotes> = all_votes
            .into_iter()
            .map(|cv| ContestantVotes {
                votes: selected.iter().map(|idx| cv.votes[*idx]).collect(),
                contestant: cv.contestant,
            })
            .collect();
        let headcounts: Vec<(String, u64)> = selected
            .iter()
            .map(|idx| all_headcounts[*idx].clone())
            .collect();

        VotesByRounds {
            votes,
            rounds,
            headcounts,
        }
    }

    fn contestant(&self, row: usize) -> Contestant {
        Contestant {
            name: self.table.cell(row, self.name_column).text(),
            series: self.table.cell(row, self.series_column).text(),
        }
    }

    // Position of the first of the rounds in which the contestant is eliminated.
    fn elimination_index(&self, contestant: &Contestant, round_labels: &[String]) -> Option<usize> {
        round_labels
            .iter()
            .position(|r| self.schedule.eliminated(r).contains(contestant))
    }
}
