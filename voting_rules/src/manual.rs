/*!

This is the long-form manual for `voting_rules` and `vrules`.

## Input

The input of an election is a table of valuations. Each row corresponds to an
agent (a voter) and each column to an alternative (a candidate). The value of a
cell is a number that tells how happy the agent would be if that alternative
were selected. Agents and alternatives are numbered from 1, in the order of the
rows and the columns.

```text
      alt 1  alt 2  alt 3
agent 1   5      3      1
agent 2   2      6      1
```

The preferences of an agent are obtained by sorting the alternatives by
decreasing value. When two alternatives have the same value, the one with the
lowest column comes first.

The following input formats are supported by `vrules`:
* `csv` Comma Separated Values, one agent per line, without header by default.
* `xlsx` Excel spreadsheet. The first worksheet is used unless the name of a
  worksheet is provided.

The first row and the first column holding values can be changed with the
`firstValueRowIndex` and `firstValueColumnIndex` options of the configuration
file (1-based, spreadsheet column letters are accepted).

## Voting rules

* `dictatorship` the winner is the first choice of a designated agent.
* `plurality` each agent gives one point to its first choice.
* `veto` each agent gives one point to every alternative except its last choice.
* `borda` the alternative ranked at position j gets m - j points, where m is the
  number of alternatives.
* `harmonic` the alternative ranked at position j gets 1/j points. Scores are
  computed as exact fractions.
* `scoring` generic positional scoring: the highest value of the score vector
  goes to the first choice of each agent, the second highest value to the second
  choice and so on. The vector must have one value per alternative.
* `stv` single transferable vote: the alternatives that are ranked first the
  least often are removed, round after round. When all the remaining alternatives
  are tied, they are the possible winners.
* `range` the winner has the maximum sum of valuations.

## Tie-breaking

When several alternatives reach the best score, a single winner is selected
with one of these options:
* `max` the alternative with the highest number
* `min` the alternative with the lowest number
* an agent number: the alternative this agent prefers, according to its full
  (original) preferences.

Asking for an agent that is not part of the election is an error. It is not an
error when the winner is not tied.

## Configuration

Instead of command line flags, an election can be described with a JSON file:

```json
{
  "outputSettings": { "contestName": "Board election" },
  "valuationSources": [
    { "provider": "csv", "filePath": "values.csv" }
  ],
  "rules": { "votingRule": "scoring", "tiebreakMode": "2", "scoreVector": [3, 1, 0] }
}
```

The paths of the sources are relative to the configuration file. When several
sources are listed, their rows are concatenated.

## Output

The summary of the election is a JSON document with the tally of each
alternative, the alternatives tied for the win and the winner. The STV rule also
reports the tally of each round and the eliminated alternatives.

*/
