use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::debug;
use snafu::ensure;

use crate::config::*;

/// Turns the valuations of the agents into their preference orderings.
///
/// Each row of the table becomes the ranking of the agent with the same
/// number: alternatives sorted by decreasing value. Alternatives with the
/// same value keep the order of their columns.
pub fn generate_preferences(values: &ValuationTable) -> Result<PreferenceProfile, VotingErrors> {
    let mut rankings: BTreeMap<Agent, Vec<Alternative>> = BTreeMap::new();
    for (row_idx, row) in values.rows().iter().enumerate() {
        let mut valued: Vec<(Alternative, f64)> = row
            .iter()
            .enumerate()
            .map(|(col_idx, v)| (Alternative((col_idx + 1) as u32), *v))
            .collect();
        // sort_by is stable
        valued.sort_by(|(_, v1), (_, v2)| v2.partial_cmp(v1).unwrap_or(Ordering::Equal));
        let ranking: Vec<Alternative> = valued.into_iter().map(|(alt, _)| alt).collect();
        debug!(
            "generate_preferences: agent {}: {:?}",
            row_idx + 1,
            ranking
        );
        rankings.insert(Agent((row_idx + 1) as u32), ranking);
    }
    PreferenceProfile::new(rankings)
}

/// A builder for assembling a preference profile one agent at a time.
///
/// ```
/// use voting_rules::builder::Builder;
/// use voting_rules::{plurality, Alternative, TieBreak};
/// # use voting_rules::VotingErrors;
///
/// let mut builder = Builder::new();
/// builder.add_ranking_simple(&[1, 2, 3])?;
/// builder.add_ranking_simple(&[2, 1, 3])?;
/// let profile = builder.build()?;
///
/// assert_eq!(plurality(&profile, &TieBreak::Max)?, Alternative(2));
/// # Ok::<(), VotingErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _rankings: BTreeMap<Agent, Vec<Alternative>>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _rankings: BTreeMap::new(),
        }
    }

    /// Adds the ranking of the next agent. Agents are numbered 1, 2, ... in
    /// the order they are added.
    pub fn add_ranking_simple(&mut self, alternatives: &[u32]) -> Result<(), VotingErrors> {
        let agent = Agent(self._rankings.len() as u32 + 1);
        let ranking: Vec<Alternative> = alternatives.iter().map(|a| Alternative(*a)).collect();
        self.add_ranking(agent, &ranking)
    }

    /// Adds the ranking of a given agent, most preferred alternative first.
    pub fn add_ranking(
        &mut self,
        agent: Agent,
        ranking: &[Alternative],
    ) -> Result<(), VotingErrors> {
        ensure!(
            !self._rankings.contains_key(&agent),
            InvalidInputSnafu {
                reason: format!("agent {} already has a ranking", agent)
            }
        );
        self._rankings.insert(agent, ranking.to_vec());
        Ok(())
    }

    pub fn build(&self) -> Result<PreferenceProfile, VotingErrors> {
        PreferenceProfile::new(self._rankings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts(ids: &[u32]) -> Vec<Alternative> {
        ids.iter().map(|a| Alternative(*a)).collect()
    }

    #[test]
    fn rankings_follow_decreasing_values() {
        let table = ValuationTable::new(vec![
            vec![0.5, 3.0, 1.0],
            vec![7.0, -2.0, 4.0],
        ])
        .unwrap();
        let profile = generate_preferences(&table).unwrap();
        assert_eq!(profile.num_agents(), 2);
        assert_eq!(profile.ranking(Agent(1)).unwrap(), alts(&[2, 3, 1]).as_slice());
        assert_eq!(profile.ranking(Agent(2)).unwrap(), alts(&[1, 3, 2]).as_slice());
    }

    #[test]
    fn equal_values_keep_column_order() {
        let table = ValuationTable::new(vec![vec![1.0, 5.0, 1.0, 5.0]]).unwrap();
        let profile = generate_preferences(&table).unwrap();
        assert_eq!(
            profile.ranking(Agent(1)).unwrap(),
            alts(&[2, 4, 1, 3]).as_slice()
        );
    }

    #[test]
    fn empty_or_ragged_tables_are_rejected() {
        assert!(matches!(
            ValuationTable::new(vec![]),
            Err(VotingErrors::InvalidInput { .. })
        ));
        assert!(matches!(
            ValuationTable::new(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(VotingErrors::InvalidInput { .. })
        ));
        assert!(matches!(
            ValuationTable::new(vec![vec![1.0, f64::NAN]]),
            Err(VotingErrors::InvalidInput { .. })
        ));
    }

    struct Grid(Vec<Vec<Option<f64>>>);

    impl ValuationSource for Grid {
        fn max_row(&self) -> usize {
            self.0.len()
        }
        fn max_column(&self) -> usize {
            self.0.iter().map(|r| r.len()).max().unwrap_or(0)
        }
        fn value(&self, row: usize, col: usize) -> Option<f64> {
            self.0.get(row - 1).and_then(|r| r.get(col - 1)).cloned().flatten()
        }
    }

    #[test]
    fn table_from_source() {
        let grid = Grid(vec![vec![Some(1.0), Some(2.0)], vec![Some(4.0), Some(3.0)]]);
        let table = ValuationTable::from_source(&grid).unwrap();
        assert_eq!(table.num_agents(), 2);
        assert_eq!(table.num_alternatives(), 2);
        assert_eq!(table.value(2, 1), Some(4.0));

        let holes = Grid(vec![vec![Some(1.0), None]]);
        assert!(matches!(
            ValuationTable::from_source(&holes),
            Err(VotingErrors::InvalidInput { .. })
        ));
    }

    #[test]
    fn builder_numbers_agents() {
        let mut builder = Builder::new();
        builder.add_ranking_simple(&[3, 1, 2]).unwrap();
        builder.add_ranking_simple(&[1, 2, 3]).unwrap();
        let profile = builder.build().unwrap();
        assert_eq!(profile.agents(), vec![Agent(1), Agent(2)]);
        assert_eq!(profile.alternatives(), alts(&[1, 2, 3]));
    }

    #[test]
    fn builder_rejects_inconsistent_rankings() {
        let mut builder = Builder::new();
        builder.add_ranking(Agent(1), &alts(&[1, 2])).unwrap();
        assert!(builder.add_ranking(Agent(1), &alts(&[2, 1])).is_err());

        builder.add_ranking(Agent(2), &alts(&[1, 3])).unwrap();
        assert!(matches!(
            builder.build(),
            Err(VotingErrors::InvalidInput { .. })
        ));

        let mut dup = Builder::new();
        dup.add_ranking_simple(&[1, 1]).unwrap();
        assert!(dup.build().is_err());

        assert!(Builder::new().build().is_err());
    }

    #[test]
    fn without_removes_alternatives() {
        let mut builder = Builder::new();
        builder.add_ranking_simple(&[3, 1, 2]).unwrap();
        builder.add_ranking_simple(&[1, 2, 3]).unwrap();
        let profile = builder.build().unwrap();
        let reduced = profile
            .without(&[Alternative(1)].into_iter().collect())
            .unwrap();
        assert_eq!(reduced.ranking(Agent(1)).unwrap(), alts(&[3, 2]).as_slice());
        assert_eq!(reduced.ranking(Agent(2)).unwrap(), alts(&[2, 3]).as_slice());
        // The original profile is untouched.
        assert_eq!(profile.num_alternatives(), 3);
    }
}
