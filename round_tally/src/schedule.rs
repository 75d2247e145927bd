use log::debug;

use std::collections::{HashMap, HashSet};

use crate::config::*;

/// One round of a season.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundSpec {
    pub name: String,
    /// Exhibition rounds that run in parallel to the eliminations.
    pub wildcard: bool,
    /// Knockout rounds: the tally of the round is itself the elimination event.
    pub bracket: bool,
    /// The contestants eliminated exactly in this round.
    pub eliminated: Vec<Contestant>,
}

impl RoundSpec {
    pub fn regular(name: &str) -> RoundSpec {
        RoundSpec {
            name: name.to_string(),
            wildcard: false,
            bracket: false,
            eliminated: Vec::new(),
        }
    }
}

/// The static schedule of a season: the rounds in chronological order, and
/// who got eliminated in each of them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeasonSchedule {
    season: String,
    rounds: Vec<RoundSpec>,
}

impl SeasonSchedule {
    /// Checks that the round names are unique and that every contestant is
    /// eliminated at most once.
    ///
    /// Round names are stored with their whitespace removed, the same way the
    /// column labels of a table are compared.
    pub fn new(season: &str, rounds: Vec<RoundSpec>) -> Result<SeasonSchedule, AggregationError> {
        if season.is_empty() {
            return Err(AggregationError::InvalidSchedule(
                "empty season identifier".to_string(),
            ));
        }
        let rounds: Vec<RoundSpec> = rounds
            .into_iter()
            .map(|r| RoundSpec {
                name: strip_label(&r.name),
                ..r
            })
            .collect();
        let mut names: HashSet<&str> = HashSet::new();
        let mut eliminated: HashMap<&Contestant, &str> = HashMap::new();
        for r in rounds.iter() {
            if !names.insert(r.name.as_str()) {
                return Err(AggregationError::InvalidSchedule(format!(
                    "season {}: round {:?} is defined twice",
                    season, r.name
                )));
            }
            for c in r.eliminated.iter() {
                if let Some(previous) = eliminated.insert(c, r.name.as_str()) {
                    return Err(AggregationError::InvalidSchedule(format!(
                        "season {}: {:?} is eliminated both in {:?} and {:?}",
                        season, c, previous, r.name
                    )));
                }
            }
        }
        debug!(
            "SeasonSchedule::new: season {} with {} rounds, {} eliminations",
            season,
            rounds.len(),
            eliminated.len()
        );
        Ok(SeasonSchedule {
            season: season.to_string(),
            rounds,
        })
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn rounds(&self) -> &[RoundSpec] {
        &self.rounds
    }

    pub fn round_names(&self) -> Vec<String> {
        self.rounds.iter().map(|r| r.name.clone()).collect()
    }

    pub fn wildcard_rounds(&self) -> HashSet<String> {
        self.rounds
            .iter()
            .filter(|r| r.wildcard)
            .map(|r| r.name.clone())
            .collect()
    }

    /// The contestants eliminated in this round. Unknown rounds have no
    /// eliminations.
    pub fn eliminated(&self, round: &str) -> &[Contestant] {
        self.round(round)
            .map(|r| r.eliminated.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_bracket_round(&self, round: &str) -> bool {
        self.round(round).map(|r| r.bracket).unwrap_or(false)
    }

    fn round(&self, round: &str) -> Option<&RoundSpec> {
        let round = strip_label(round);
        self.rounds.iter().find(|r| r.name == round)
    }
}

/// All the configured seasons.
///
/// Seasons are only ever added: a schedule that is registered is never
/// modified afterwards, since that would change the historical headcounts.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SeasonRegistry {
    seasons: HashMap<String, SeasonSchedule>,
}

impl SeasonRegistry {
    pub fn new() -> SeasonRegistry {
        SeasonRegistry {
            seasons: HashMap::new(),
        }
    }

    pub fn register(&mut self, schedule: SeasonSchedule) -> Result<(), AggregationError> {
        if self.seasons.contains_key(schedule.season()) {
            return Err(AggregationError::DuplicateSeason(
                schedule.season().to_string(),
            ));
        }
        self.seasons.insert(schedule.season().to_string(), schedule);
        Ok(())
    }

    pub fn schedule(&self, season: &str) -> Result<&SeasonSchedule, AggregationError> {
        self.seasons
            .get(season)
            .ok_or_else(|| AggregationError::UnknownSeason(season.to_string()))
    }

    /// The configured seasons, sorted.
    pub fn seasons(&self) -> Vec<&str> {
        let mut res: Vec<&str> = self.seasons.keys().map(|s| s.as_str()).collect();
        res.sort_unstable();
        res
    }

    pub fn rounds(&self, season: &str) -> Result<Vec<String>, AggregationError> {
        Ok(self.schedule(season)?.round_names())
    }

    pub fn wildcard_rounds(&self, season: &str) -> Result<HashSet<String>, AggregationError> {
        Ok(self.schedule(season)?.wildcard_rounds())
    }

    pub fn eliminated(
        &self,
        season: &str,
        round: &str,
    ) -> Result<Vec<Contestant>, AggregationError> {
        Ok(self.schedule(season)?.eliminated(round).to_vec())
    }

    pub fn is_bracket_round(&self, season: &str, round: &str) -> Result<bool, AggregationError> {
        Ok(self.schedule(season)?.is_bracket_round(round))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn registry() -> SeasonRegistry {
        let schedule = Builder::new("2023")
            .unwrap()
            .rounds(&["R1", "X", "R2", "K1"])
            .unwrap()
            .wildcard(&["X"])
            .unwrap()
            .bracket(&["K1"])
            .unwrap()
            .eliminated("R2", &[("Alice", "S1"), ("Bob", "S2")])
            .unwrap()
            .build()
            .unwrap();
        let mut reg = SeasonRegistry::new();
        reg.register(schedule).unwrap();
        reg
    }

    #[test]
    fn rounds_keep_their_order() {
        let reg = registry();
        assert_eq!(reg.rounds("2023").unwrap(), vec!["R1", "X", "R2", "K1"]);
    }

    #[test]
    fn unknown_season_fails() {
        let reg = registry();
        assert_eq!(
            reg.rounds("1999"),
            Err(AggregationError::UnknownSeason("1999".to_string()))
        );
        assert!(reg.wildcard_rounds("1999").is_err());
        assert!(reg.eliminated("1999", "R1").is_err());
    }

    #[test]
    fn wildcards_and_brackets() {
        let reg = registry();
        let expected: HashSet<String> = ["X".to_string()].into_iter().collect();
        assert_eq!(reg.wildcard_rounds("2023").unwrap(), expected);
        assert!(reg.is_bracket_round("2023", "K1").unwrap());
        assert!(!reg.is_bracket_round("2023", "R2").unwrap());
        assert!(!reg.is_bracket_round("2023", "nope").unwrap());
    }

    #[test]
    fn eliminated_defaults_to_empty() {
        let reg = registry();
        assert_eq!(
            reg.eliminated("2023", "R2").unwrap(),
            vec![Contestant::new("Alice", "S1"), Contestant::new("Bob", "S2")]
        );
        assert!(reg.eliminated("2023", "R1").unwrap().is_empty());
        assert!(reg.eliminated("2023", "not a round").unwrap().is_empty());
    }

    #[test]
    fn seasons_are_never_overwritten() {
        let mut reg = registry();
        let other = SeasonSchedule::new("2023", vec![RoundSpec::regular("Z")]).unwrap();
        assert_eq!(
            reg.register(other),
            Err(AggregationError::DuplicateSeason("2023".to_string()))
        );
        assert_eq!(reg.rounds("2023").unwrap().len(), 4);
    }

    #[test]
    fn double_elimination_is_rejected() {
        let mut r1 = RoundSpec::regular("R1");
        r1.eliminated.push(Contestant::new("Alice", "S1"));
        let mut r2 = RoundSpec::regular("R2");
        r2.eliminated.push(Contestant::new("Alice", "S1"));
        let res = SeasonSchedule::new("2024", vec![r1, r2]);
        assert!(matches!(res, Err(AggregationError::InvalidSchedule(_))));
    }

    #[test]
    fn same_name_different_series_is_fine() {
        let mut r1 = RoundSpec::regular("R1");
        r1.eliminated.push(Contestant::new("Alice", "S1"));
        let mut r2 = RoundSpec::regular("R2");
        r2.eliminated.push(Contestant::new("Alice", "S2"));
        assert!(SeasonSchedule::new("2024", vec![r1, r2]).is_ok());
    }

    #[test]
    fn round_names_are_stripped() {
        let mut r2 = RoundSpec::regular("Stage 2");
        r2.bracket = true;
        r2.eliminated.push(Contestant::new("Alice", "S1"));
        let schedule =
            SeasonSchedule::new("2024", vec![RoundSpec::regular(" Stage 1"), r2]).unwrap();
        assert_eq!(schedule.round_names(), vec!["Stage1", "Stage2"]);
        assert!(schedule.is_bracket_round("Stage 2"));
        assert!(schedule.is_bracket_round("Stage2"));
        assert_eq!(schedule.eliminated("Stage 2").len(), 1);
        assert_eq!(schedule.eliminated("Sta ge2").len(), 1);
    }

    #[test]
    fn spaced_duplicates_are_rejected() {
        let res = SeasonSchedule::new(
            "2024",
            vec![RoundSpec::regular("R 1"), RoundSpec::regular("R1")],
        );
        assert!(matches!(res, Err(AggregationError::InvalidSchedule(_))));
    }

    #[test]
    fn duplicate_round_names_are_rejected() {
        let res = SeasonSchedule::new(
            "2024",
            vec![RoundSpec::regular("R1"), RoundSpec::regular("R1")],
        );
        assert!(matches!(res, Err(AggregationError::InvalidSchedule(_))));
    }
}
