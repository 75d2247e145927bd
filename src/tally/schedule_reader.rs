use log::debug;

use round_tally::{AggregationError, Contestant, RoundSpec, SeasonRegistry};
use serde::{Deserialize, Serialize};

use crate::tally::*;

/// The schedules that ship with the program.
const BUILTIN_SCHEDULES: &str = include_str!("../../seasons/builtin.json");

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EliminatedContestant {
    pub character: String,
    pub series: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    pub name: String,
    pub wildcard: Option<bool>,
    pub bracket: Option<bool>,
    pub eliminated: Option<Vec<EliminatedContestant>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SeasonConfig {
    pub season: String,
    pub rounds: Vec<RoundConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub seasons: Vec<SeasonConfig>,
}

impl RoundConfig {
    fn to_spec(&self) -> RoundSpec {
        RoundSpec {
            name: self.name.clone(),
            wildcard: self.wildcard.unwrap_or(false),
            bracket: self.bracket.unwrap_or(false),
            eliminated: self
                .eliminated
                .iter()
                .flatten()
                .map(|e| Contestant::new(&e.character, &e.series))
                .collect(),
        }
    }
}

pub fn read_registry(path: &str) -> TallyResult<SeasonRegistry> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_registry(&contents)
}

pub fn builtin_registry() -> TallyResult<SeasonRegistry> {
    parse_registry(BUILTIN_SCHEDULES)
}

pub fn parse_registry(contents: &str) -> TallyResult<SeasonRegistry> {
    let config: ScheduleConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    build_registry(&config).context(ScheduleSnafu {})
}

fn build_registry(config: &ScheduleConfig) -> Result<SeasonRegistry, AggregationError> {
    let mut registry = SeasonRegistry::new();
    for season in config.seasons.iter() {
        let mut builder = round_tally::builder::Builder::new(&season.season)?;
        for r in season.rounds.iter() {
            builder.add_round(r.to_spec())?;
        }
        let schedule = builder.build()?;
        debug!(
            "build_registry: season {} with rounds {:?}",
            schedule.season(),
            schedule.round_names()
        );
        registry.register(schedule)?;
    }
    Ok(registry)
}
