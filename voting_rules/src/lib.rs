mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};
use num::{BigInt, BigRational, One, ToPrimitive, Zero};
use snafu::{ensure, OptionExt};

use std::{cmp::Ordering, collections::BTreeSet};

pub use crate::builder::generate_preferences;
pub use crate::config::*;

// **** Aggregation and tie-breaking ****

/// Returns all the alternatives that reach the maximum score.
///
/// The order of the returned alternatives carries no meaning: use `tie_break`
/// to select a single winner.
pub fn get_max_val<S: PartialOrd>(scores: &Scores<S>) -> Result<Vec<Alternative>, VotingErrors> {
    let max_score: &S = scores
        .values()
        .fold(None, |acc: Option<&S>, s| match acc {
            Some(m) if *m >= *s => Some(m),
            _ => Some(s),
        })
        .context(EmptyScoresSnafu {})?;
    Ok(scores
        .iter()
        .filter(|(_, s)| *s == max_score)
        .map(|(alt, _)| *alt)
        .collect())
}

/// Selects one winner among the tied alternatives.
///
/// A single winner is returned as is, whatever the policy.
pub fn tie_break(
    preferences: &PreferenceProfile,
    policy: &TieBreak,
    winners: &[Alternative],
) -> Result<Alternative, VotingErrors> {
    if let [single] = winners {
        return Ok(*single);
    }
    let res = match policy {
        TieBreak::Max => winners.iter().max().cloned().context(EmptyScoresSnafu {})?,
        TieBreak::Min => winners.iter().min().cloned().context(EmptyScoresSnafu {})?,
        TieBreak::Agent(agent) => {
            let ranking = preferences
                .ranking(*agent)
                .context(UnknownAgentSnafu { agent: *agent })?;
            ranking
                .iter()
                .find(|alt| winners.contains(alt))
                .cloned()
                .context(InvalidInputSnafu {
                    reason: format!("agent {} ranks none of {:?}", agent, winners),
                })?
        }
    };
    debug!(
        "tie_break: policy {} selected {} among {:?}",
        policy, res, winners
    );
    Ok(res)
}

fn select_winner<S: PartialOrd + std::fmt::Debug>(
    preferences: &PreferenceProfile,
    tie: &TieBreak,
    scores: &Scores<S>,
) -> Result<Alternative, VotingErrors> {
    debug!("select_winner: scores: {:?}", scores);
    let winners = get_max_val(scores)?;
    tie_break(preferences, tie, &winners)
}

// Every alternative starts at zero, including the ones nobody gives points to.
fn zero_scores<S: Zero>(preferences: &PreferenceProfile) -> Scores<S> {
    preferences
        .alternatives()
        .into_iter()
        .map(|alt| (alt, S::zero()))
        .collect()
}

// **** Voting rules ****

/// The winner is the alternative that the given agent ranks first.
pub fn dictatorship(
    preferences: &PreferenceProfile,
    agent: Agent,
) -> Result<Alternative, VotingErrors> {
    let ranking = preferences
        .ranking(agent)
        .context(UnknownAgentSnafu { agent })?;
    ranking.first().cloned().context(InvalidInputSnafu {
        reason: format!("agent {} has an empty ranking", agent),
    })
}

/// Positional scores: the highest value of the vector goes to the most
/// preferred alternative of each agent, the second highest to the second
/// alternative, and so on.
pub fn scoring_rule_scores<S>(
    preferences: &PreferenceProfile,
    score_vector: &[S],
) -> Result<Scores<S>, VotingErrors>
where
    S: Zero + Clone + PartialOrd,
{
    let num_alternatives = preferences.num_alternatives();
    ensure!(
        score_vector.len() == num_alternatives,
        InvalidInputSnafu {
            reason: format!(
                "the score vector has {} values for {} alternatives",
                score_vector.len(),
                num_alternatives
            )
        }
    );
    ensure!(
        score_vector
            .iter()
            .all(|s| s.partial_cmp(&S::zero()).is_some()),
        InvalidInputSnafu {
            reason: "the score vector contains a value that cannot be compared"
        }
    );
    let mut sorted_vector: Vec<S> = score_vector.to_vec();
    sorted_vector.sort_by(|s1, s2| s2.partial_cmp(s1).unwrap_or(Ordering::Equal));

    let mut scores: Scores<S> = zero_scores(preferences);
    for ranking in preferences.rankings().values() {
        for (alt, points) in ranking.iter().zip(sorted_vector.iter()) {
            if let Some(s) = scores.get_mut(alt) {
                *s = s.clone() + points.clone();
            }
        }
    }
    Ok(scores)
}

pub fn scoring_rule<S>(
    preferences: &PreferenceProfile,
    score_vector: &[S],
    tie: &TieBreak,
) -> Result<Alternative, VotingErrors>
where
    S: Zero + Clone + PartialOrd + std::fmt::Debug,
{
    let scores = scoring_rule_scores(preferences, score_vector)?;
    select_winner(preferences, tie, &scores)
}

/// Number of agents ranking each alternative first.
pub fn plurality_scores(preferences: &PreferenceProfile) -> Scores<u64> {
    let mut votes: Scores<u64> = zero_scores(preferences);
    for ranking in preferences.rankings().values() {
        if let Some(count) = ranking.first().and_then(|alt| votes.get_mut(alt)) {
            *count += 1;
        }
    }
    votes
}

pub fn plurality(preferences: &PreferenceProfile, tie: &TieBreak) -> Result<Alternative, VotingErrors> {
    select_winner(preferences, tie, &plurality_scores(preferences))
}

/// Every agent gives one point to all the alternatives except its least
/// preferred one.
pub fn veto_scores(preferences: &PreferenceProfile) -> Scores<u64> {
    let mut scores: Scores<u64> = zero_scores(preferences);
    for ranking in preferences.rankings().values() {
        let num_approved = ranking.len().saturating_sub(1);
        for alt in ranking.iter().take(num_approved) {
            if let Some(s) = scores.get_mut(alt) {
                *s += 1;
            }
        }
    }
    scores
}

pub fn veto(preferences: &PreferenceProfile, tie: &TieBreak) -> Result<Alternative, VotingErrors> {
    select_winner(preferences, tie, &veto_scores(preferences))
}

/// The alternative at position j (starting at 1) gets m - j points.
pub fn borda_scores(preferences: &PreferenceProfile) -> Scores<u64> {
    let num_alternatives = preferences.num_alternatives() as u64;
    let mut scores: Scores<u64> = zero_scores(preferences);
    for ranking in preferences.rankings().values() {
        for (idx, alt) in ranking.iter().enumerate() {
            if let Some(s) = scores.get_mut(alt) {
                *s += num_alternatives - (idx as u64 + 1);
            }
        }
    }
    scores
}

pub fn borda(preferences: &PreferenceProfile, tie: &TieBreak) -> Result<Alternative, VotingErrors> {
    select_winner(preferences, tie, &borda_scores(preferences))
}

/// The alternative at position j (starting at 1) gets 1/j points.
///
/// The sums are exact fractions, so that alternatives with the same total
/// are always tied.
pub fn harmonic_scores(preferences: &PreferenceProfile) -> Scores<BigRational> {
    let mut scores: Scores<BigRational> = zero_scores(preferences);
    for ranking in preferences.rankings().values() {
        for (idx, alt) in ranking.iter().enumerate() {
            if let Some(s) = scores.get_mut(alt) {
                *s += BigRational::new(BigInt::one(), BigInt::from(idx + 1));
            }
        }
    }
    scores
}

pub fn harmonic(preferences: &PreferenceProfile, tie: &TieBreak) -> Result<Alternative, VotingErrors> {
    select_winner(preferences, tie, &harmonic_scores(preferences))
}

/// Single transferable vote.
///
/// In each round, the alternatives that are ranked first the least often are
/// removed. When all the remaining alternatives are tied, they are the
/// possible winners, and the tie is broken against the original preferences.
pub fn stv(preferences: &PreferenceProfile, tie: &TieBreak) -> Result<Alternative, VotingErrors> {
    stv_with_stats(preferences, tie).map(|res| res.winner)
}

/// Runs STV and records the statistics of every round.
///
/// The tally of the result is the one of the last round.
pub fn stv_with_stats(
    preferences: &PreferenceProfile,
    tie: &TieBreak,
) -> Result<VotingResult, VotingErrors> {
    // Each round works on a new reduced profile. The input is never modified.
    let mut cur_profile: PreferenceProfile = preferences.clone();
    let mut round_stats: Vec<RoundStats> = Vec::new();

    // At least one alternative is removed per round, and never all of them.
    loop {
        let round = round_stats.len() as u32 + 1;
        let remaining = cur_profile.alternatives();
        let tally = plurality_scores(&cur_profile);
        let min_count: u64 = tally
            .values()
            .min()
            .cloned()
            .context(EmptyScoresSnafu {})?;
        let least: Vec<Alternative> = tally
            .iter()
            .filter_map(|(alt, count)| if *count == min_count { Some(*alt) } else { None })
            .collect();
        debug!(
            "stv: round {}: tally {:?}, lowest count {} for {:?}",
            round, tally, min_count, least
        );

        let tally_vec: Vec<(Alternative, u64)> = tally.iter().map(|(a, c)| (*a, *c)).collect();
        if least.len() == remaining.len() {
            round_stats.push(RoundStats {
                round,
                tally: tally_vec.clone(),
                eliminated: Vec::new(),
            });
            let winner = tie_break(preferences, tie, &least)?;
            info!(
                "stv: finished after {} rounds, finalists {:?}, winner {}",
                round, least, winner
            );
            return Ok(VotingResult {
                winner,
                tied: least,
                tally: tally_vec
                    .iter()
                    .map(|(a, c)| (*a, c.to_string()))
                    .collect(),
                round_stats,
            });
        }

        round_stats.push(RoundStats {
            round,
            tally: tally_vec,
            eliminated: least.clone(),
        });
        let eliminated: BTreeSet<Alternative> = least.into_iter().collect();
        cur_profile = cur_profile.without(&eliminated)?;
    }
}

/// Sum of the valuations of all the agents, for each alternative.
///
/// The sums are exact: equal totals do not depend on the order of the rows.
pub fn range_voting_scores(values: &ValuationTable) -> Scores<BigRational> {
    let mut totals: Scores<BigRational> = Scores::new();
    for col in 0..values.num_alternatives() {
        let mut total = BigRational::zero();
        for row in values.rows() {
            // The cells of a valuation table are finite.
            if let Some(v) = BigRational::from_float(row[col]) {
                total += v;
            }
        }
        totals.insert(Alternative((col + 1) as u32), total);
    }
    totals
}

/// Converts a score vector to exact fractions. Infinite values and NaN are rejected.
pub fn exact_score_vector(score_vector: &[f64]) -> Result<Vec<BigRational>, VotingErrors> {
    score_vector
        .iter()
        .map(|v| {
            BigRational::from_float(*v).context(InvalidInputSnafu {
                reason: format!("the score vector contains {}", v),
            })
        })
        .collect()
}

// Exact sums of floating point values are shown as decimal numbers.
fn decimal_string(score: &BigRational) -> String {
    match score.to_f64() {
        Some(f) => f.to_string(),
        None => score.to_string(),
    }
}

/// The winner has the maximum sum of valuations.
///
/// The tie-break uses the preferences derived from the same valuations.
pub fn range_voting(values: &ValuationTable, tie: &TieBreak) -> Result<Alternative, VotingErrors> {
    let totals = range_voting_scores(values);
    debug!("range_voting: totals: {:?}", totals);
    let winners = get_max_val(&totals)?;
    tie_break(&generate_preferences(values)?, tie, &winners)
}

fn scored_result<S: PartialOrd + std::fmt::Debug>(
    preferences: &PreferenceProfile,
    tie: &TieBreak,
    scores: &Scores<S>,
    show: impl Fn(&S) -> String,
) -> Result<VotingResult, VotingErrors> {
    let winner = select_winner(preferences, tie, scores)?;
    let mut tied = get_max_val(scores)?;
    tied.sort();
    Ok(VotingResult {
        winner,
        tied,
        tally: scores.iter().map(|(a, s)| (*a, show(s))).collect(),
        round_stats: Vec::new(),
    })
}

/// Runs a voting rule on a table of valuations.
///
/// The preferences of the agents are derived from the valuations, except
/// for range voting which uses the valuations directly.
///
/// Arguments:
/// * `values` the valuations of the agents (rows) for the alternatives (columns)
/// * `rule` the voting rule to apply
/// * `tie` the policy to select a single winner. It is not used by dictatorship.
pub fn run_voting_stats(
    values: &ValuationTable,
    rule: &VotingRule,
    tie: &TieBreak,
) -> Result<VotingResult, VotingErrors> {
    info!(
        "run_voting_stats: {} agents, {} alternatives, rule: {:?}, tie-break: {}",
        values.num_agents(),
        values.num_alternatives(),
        rule,
        tie
    );
    let preferences = generate_preferences(values)?;
    let res = match rule {
        VotingRule::Dictatorship(agent) => {
            let winner = dictatorship(&preferences, *agent)?;
            VotingResult {
                winner,
                tied: vec![winner],
                tally: Vec::new(),
                round_stats: Vec::new(),
            }
        }
        VotingRule::Plurality => {
            scored_result(&preferences, tie, &plurality_scores(&preferences), u64::to_string)?
        }
        VotingRule::Veto => {
            scored_result(&preferences, tie, &veto_scores(&preferences), u64::to_string)?
        }
        VotingRule::Borda => {
            scored_result(&preferences, tie, &borda_scores(&preferences), u64::to_string)?
        }
        VotingRule::Harmonic => scored_result(
            &preferences,
            tie,
            &harmonic_scores(&preferences),
            BigRational::to_string,
        )?,
        VotingRule::ScoringRule(score_vector) => scored_result(
            &preferences,
            tie,
            &scoring_rule_scores(&preferences, &exact_score_vector(score_vector)?)?,
            decimal_string,
        )?,
        VotingRule::Stv => stv_with_stats(&preferences, tie)?,
        VotingRule::RangeVoting => scored_result(
            &preferences,
            tie,
            &range_voting_scores(values),
            decimal_string,
        )?,
    };
    info!(
        "run_voting_stats: {}: winner {} (tied: {:?})",
        rule.name(),
        res.winner,
        res.tied
    );
    Ok(res)
}
