// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A contestant of the tournament.
///
/// Contestants are identified by the pair (name, series): two characters may
/// share a name as long as they come from different series.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct Contestant {
    pub name: String,
    pub series: String,
}

impl Contestant {
    pub fn new(name: &str, series: &str) -> Contestant {
        Contestant {
            name: name.to_string(),
            series: series.to_string(),
        }
    }
}

/// A raw cell, as read from the input table.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    /// Numeric cells coming from spreadsheets.
    Number(f64),
}

impl Cell {
    /// The textual content of the cell. Numbers are rendered without a
    /// trailing `.0` when they are integral.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => "".to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Removes all the whitespace from a column label.
///
/// Labels typed by hand often carry stray spaces. They are compared to the
/// round names of the schedule only after this normalization.
pub fn strip_label(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A contestant-by-round table: one row per contestant, one column per round
/// plus the identity columns.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct VoteTable {
    /// The header row, as found in the file.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl VoteTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> VoteTable {
        VoteTable { headers, rows }
    }

    /// The physical index of a column, looked up by its stripped label.
    pub fn column(&self, label: &str) -> Option<usize> {
        let target = strip_label(label);
        self.headers.iter().position(|h| strip_label(h) == target)
    }

    /// The stripped labels of all the columns, in physical order.
    pub fn stripped_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| strip_label(h)).collect()
    }

    /// Access to a cell. Rows shorter than the header read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

// ******** Output data structures *********

/// The votes of one contestant, aligned with the list of rounds that was
/// requested.
#[derive(PartialEq, Debug, Clone)]
pub struct ContestantVotes {
    pub contestant: Contestant,
    /// `None` is an absent vote, which is different from a recorded zero.
    pub votes: Vec<Option<f64>>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContestantInfo {
    pub contestant: Contestant,
    pub avatar: Option<String>,
}

/// The full result of a query by rounds.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct VotesByRounds {
    pub votes: Vec<ContestantVotes>,
    pub rounds: Vec<String>,
    /// The number of contestants still active when entering each round, in
    /// the order of `rounds`.
    pub headcounts: Vec<(String, u64)>,
}

impl VotesByRounds {
    pub fn headcount(&self, round: &str) -> Option<u64> {
        self.headcounts
            .iter()
            .find(|(r, _)| r == round)
            .map(|(_, c)| *c)
    }
}

/// Errors that prevent building a schedule or an aggregator.
///
/// All of them are detected eagerly: an aggregator that was successfully
/// built can always be queried.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AggregationError {
    /// The season is not configured in the registry.
    UnknownSeason(String),
    /// No season could be found in the name of the table.
    SeasonUndetectable(String),
    /// Some rounds of the schedule have no column in the table.
    MissingRoundColumns(Vec<String>),
    /// The column with the names or the series of the contestants is missing.
    MissingIdentityColumn(String),
    InvalidSchedule(String),
    /// A season can be registered only once.
    DuplicateSeason(String),
}

impl AggregationError {
    /// True for the errors caused by a table that does not match its schedule.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AggregationError::SeasonUndetectable(_)
                | AggregationError::MissingRoundColumns(_)
                | AggregationError::MissingIdentityColumn(_)
        )
    }
}

impl Error for AggregationError {}

impl Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::UnknownSeason(s) => write!(f, "no schedule configured for season {}", s),
            AggregationError::SeasonUndetectable(name) => {
                write!(f, "cannot detect the season from the name {:?}", name)
            }
            AggregationError::MissingRoundColumns(cols) => {
                write!(f, "the table is missing the round columns {:?}", cols)
            }
            AggregationError::MissingIdentityColumn(col) => {
                write!(f, "the table is missing the column {:?}", col)
            }
            AggregationError::InvalidSchedule(msg) => write!(f, "invalid schedule: {}", msg),
            AggregationError::DuplicateSeason(s) => {
                write!(f, "season {} is already registered", s)
            }
        }
    }
}

// ********* Configuration **********

/// The labels of the identity columns of a table. Every other column is a
/// round column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableLayout {
    pub index_column: String,
    pub name_column: String,
    pub series_column: String,
    pub voice_credit_column: String,
    pub total_column: String,
    /// Optional in the table.
    pub avatar_column: String,
}

impl TableLayout {
    pub fn identity_columns(&self) -> [&str; 6] {
        [
            self.index_column.as_str(),
            self.name_column.as_str(),
            self.series_column.as_str(),
            self.voice_credit_column.as_str(),
            self.total_column.as_str(),
            self.avatar_column.as_str(),
        ]
    }

    pub fn is_identity(&self, label: &str) -> bool {
        let label = strip_label(label);
        self.identity_columns()
            .iter()
            .any(|c| strip_label(c) == label)
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        TableLayout {
            index_column: "序号".to_string(),
            name_column: "角色".to_string(),
            series_column: "作品".to_string(),
            voice_credit_column: "CV".to_string(),
            total_column: "累计得票数".to_string(),
            avatar_column: "头像".to_string(),
        }
    }
}
