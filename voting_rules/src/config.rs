// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

use snafu::{ensure, Snafu};

/// An alternative (candidate option) of the election, numbered from 1.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Alternative(pub u32);

impl Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A voter, numbered from 1. Every agent owns exactly one ranking.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Agent(pub u32);

impl Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accumulated score of each alternative.
pub type Scores<S> = BTreeMap<Alternative, S>;

/// The rankings of all the agents, most preferred alternative first.
///
/// Invariant: there is at least one agent, and every ranking is a permutation
/// of the same non-empty set of alternatives.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceProfile {
    rankings: BTreeMap<Agent, Vec<Alternative>>,
}

impl PreferenceProfile {
    pub fn new(
        rankings: BTreeMap<Agent, Vec<Alternative>>,
    ) -> Result<PreferenceProfile, VotingErrors> {
        let (first_agent, first_ranking) = match rankings.iter().next() {
            Some(p) => p,
            None => {
                return InvalidInputSnafu {
                    reason: "the preference profile has no agent",
                }
                .fail()
            }
        };
        let reference: BTreeSet<Alternative> = first_ranking.iter().cloned().collect();
        ensure!(
            !reference.is_empty(),
            InvalidInputSnafu {
                reason: format!("agent {} ranks no alternative", first_agent)
            }
        );
        for (agent, ranking) in rankings.iter() {
            ensure!(
                agent.0 > 0,
                InvalidInputSnafu {
                    reason: "agent ids start at 1"
                }
            );
            let seen: BTreeSet<Alternative> = ranking.iter().cloned().collect();
            ensure!(
                seen.len() == ranking.len(),
                InvalidInputSnafu {
                    reason: format!("agent {} ranks an alternative more than once", agent)
                }
            );
            ensure!(
                seen == reference,
                InvalidInputSnafu {
                    reason: format!(
                        "agent {} does not rank the same alternatives as agent {}",
                        agent, first_agent
                    )
                }
            );
        }
        ensure!(
            reference.iter().all(|a| a.0 > 0),
            InvalidInputSnafu {
                reason: "alternative ids start at 1"
            }
        );
        Ok(PreferenceProfile { rankings })
    }

    pub fn rankings(&self) -> &BTreeMap<Agent, Vec<Alternative>> {
        &self.rankings
    }

    pub fn ranking(&self, agent: Agent) -> Option<&[Alternative]> {
        self.rankings.get(&agent).map(|r| r.as_slice())
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.rankings.keys().cloned().collect()
    }

    /// All the ranked alternatives, in increasing order.
    pub fn alternatives(&self) -> Vec<Alternative> {
        let mut res: Vec<Alternative> = self
            .rankings
            .values()
            .next()
            .map(|r| r.to_vec())
            .unwrap_or_default();
        res.sort();
        res
    }

    pub fn num_alternatives(&self) -> usize {
        self.rankings.values().next().map(|r| r.len()).unwrap_or(0)
    }

    pub fn num_agents(&self) -> usize {
        self.rankings.len()
    }

    /// A new profile in which the given alternatives have been struck from
    /// every ranking. The relative order of the others is kept.
    pub fn without(
        &self,
        eliminated: &BTreeSet<Alternative>,
    ) -> Result<PreferenceProfile, VotingErrors> {
        let rankings: BTreeMap<Agent, Vec<Alternative>> = self
            .rankings
            .iter()
            .map(|(agent, ranking)| {
                let rest: Vec<Alternative> = ranking
                    .iter()
                    .filter(|a| !eliminated.contains(a))
                    .cloned()
                    .collect();
                (*agent, rest)
            })
            .collect();
        PreferenceProfile::new(rankings)
    }
}

/// Access to a worksheet-like table of numbers.
///
/// Rows are agents, columns are alternatives. Both are indexed from 1, as in
/// a spreadsheet.
pub trait ValuationSource {
    fn max_row(&self) -> usize;
    fn max_column(&self) -> usize;
    /// The numerical value of a cell, if it holds one.
    fn value(&self, row: usize, col: usize) -> Option<f64>;
}

/// How happy each agent would be with each alternative.
///
/// Invariant: at least one row and one column, all rows have the same width
/// and all the cells are finite numbers.
#[derive(PartialEq, Debug, Clone)]
pub struct ValuationTable {
    rows: Vec<Vec<f64>>,
}

impl ValuationTable {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<ValuationTable, VotingErrors> {
        ensure!(
            !rows.is_empty(),
            InvalidInputSnafu {
                reason: "the valuation table is empty"
            }
        );
        let width = rows[0].len();
        ensure!(
            width > 0,
            InvalidInputSnafu {
                reason: "the valuation table has no column"
            }
        );
        for (idx, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == width,
                InvalidInputSnafu {
                    reason: format!(
                        "row {} has {} values, expected {}",
                        idx + 1,
                        row.len(),
                        width
                    )
                }
            );
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return InvalidInputSnafu {
                    reason: format!("cell ({}, {}) is not a finite number", idx + 1, col + 1),
                }
                .fail();
            }
        }
        Ok(ValuationTable { rows })
    }

    /// Reads every cell of the source. All the cells must hold a number.
    pub fn from_source<V: ValuationSource + ?Sized>(
        source: &V,
    ) -> Result<ValuationTable, VotingErrors> {
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(source.max_row());
        for row in 1..=source.max_row() {
            let mut values: Vec<f64> = Vec::with_capacity(source.max_column());
            for col in 1..=source.max_column() {
                match source.value(row, col) {
                    Some(v) => values.push(v),
                    None => {
                        return InvalidInputSnafu {
                            reason: format!("cell ({}, {}) does not hold a number", row, col),
                        }
                        .fail()
                    }
                }
            }
            rows.push(values);
        }
        ValuationTable::new(rows)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_agents(&self) -> usize {
        self.rows.len()
    }

    pub fn num_alternatives(&self) -> usize {
        self.rows[0].len()
    }
}

impl ValuationSource for ValuationTable {
    fn max_row(&self) -> usize {
        self.rows.len()
    }

    fn max_column(&self) -> usize {
        self.num_alternatives()
    }

    fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.rows
            .get(row.checked_sub(1)?)
            .and_then(|r| r.get(col.checked_sub(1)?))
            .cloned()
    }
}

// ********* Configuration **********

/// Selects a single winner among tied alternatives.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreak {
    /// The alternative with the highest number.
    Max,
    /// The alternative with the lowest number.
    Min,
    /// The alternative that this agent ranks the highest.
    Agent(Agent),
}

impl FromStr for TieBreak {
    type Err = VotingErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "max" => Ok(TieBreak::Max),
            "min" => Ok(TieBreak::Min),
            x => match x.parse::<u32>() {
                Ok(id) if id > 0 => Ok(TieBreak::Agent(Agent(id))),
                _ => InvalidInputSnafu {
                    reason: format!("unknown tie-break option {:?}", x),
                }
                .fail(),
            },
        }
    }
}

impl Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreak::Max => write!(f, "max"),
            TieBreak::Min => write!(f, "min"),
            TieBreak::Agent(agent) => write!(f, "{}", agent),
        }
    }
}

/// The voting rules that can be dispatched by `run_voting_stats`.
#[derive(PartialEq, Debug, Clone)]
pub enum VotingRule {
    Dictatorship(Agent),
    Plurality,
    Veto,
    Borda,
    Harmonic,
    /// Generic positional scoring. The vector does not need to be sorted.
    ScoringRule(Vec<f64>),
    Stv,
    RangeVoting,
}

impl VotingRule {
    pub fn name(&self) -> &'static str {
        match self {
            VotingRule::Dictatorship(_) => "dictatorship",
            VotingRule::Plurality => "plurality",
            VotingRule::Veto => "veto",
            VotingRule::Borda => "borda",
            VotingRule::Harmonic => "harmonic",
            VotingRule::ScoringRule(_) => "scoring",
            VotingRule::Stv => "stv",
            VotingRule::RangeVoting => "range",
        }
    }
}

// ******** Output data structures *********

/// Statistics for one round of STV
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// Number of agents ranking each remaining alternative first.
    pub tally: Vec<(Alternative, u64)>,
    /// Empty for the last round.
    pub eliminated: Vec<Alternative>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub winner: Alternative,
    /// All the alternatives that tied for the win, in increasing order.
    pub tied: Vec<Alternative>,
    /// The final score of each alternative, as displayed.
    pub tally: Vec<(Alternative, String)>,
    /// Only filled by STV.
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent a rule from selecting a winner.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    #[snafu(display("Invalid input: {reason}"))]
    InvalidInput { reason: String },
    #[snafu(display("Agent {agent} is not part of the preference profile"))]
    UnknownAgent { agent: Agent },
    #[snafu(display("No score to choose a winner from"))]
    EmptyScores {},
}
