use crate::election::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub rule: String,
    pub tiebreak: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstValueColumnIndex")]
    _first_value_column_index: Option<JSValue>,
    #[serde(rename = "firstValueRowIndex")]
    _first_value_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str, excel_worksheet_name: Option<String>) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_value_column_index: None,
            _first_value_row_index: None,
            excel_worksheet_name,
        }
    }

    /// The first column holding values (0-based). Defaults to the first column.
    pub fn first_value_column_index(&self) -> ElectionResult<usize> {
        match self._first_value_column_index {
            None => Ok(0),
            Some(_) => Ok(read_js_int(&self._first_value_column_index)? - 1),
        }
    }

    /// The first row holding values (0-based). Defaults to the first row.
    pub fn first_value_row_index(&self) -> ElectionResult<usize> {
        match self._first_value_row_index {
            None => Ok(0),
            Some(_) => Ok(read_js_int(&self._first_value_row_index)? - 1),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRules {
    #[serde(rename = "votingRule")]
    pub voting_rule: String,
    /// "max", "min" or an agent number.
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<JSValue>,
    pub dictator: Option<JSValue>,
    #[serde(rename = "scoreVector")]
    pub score_vector: Option<Vec<f64>>,
}

impl ElectionRules {
    pub fn voting_rule(&self) -> ElectionResult<VotingRule> {
        let rule = match self.voting_rule.as_str() {
            "dictatorship" => {
                let agent = match read_js_int(&self.dictator).map(u32::try_from) {
                    Ok(Ok(x)) => Agent(x),
                    Ok(Err(_)) => whatever!("dictator {:?} is not a valid agent number", self.dictator),
                    Err(_) => whatever!("dictatorship requires the number of an agent in 'dictator'"),
                };
                VotingRule::Dictatorship(agent)
            }
            "plurality" => VotingRule::Plurality,
            "veto" => VotingRule::Veto,
            "borda" => VotingRule::Borda,
            "harmonic" => VotingRule::Harmonic,
            "scoring" | "scoringRule" => match self.score_vector.clone() {
                Some(v) => VotingRule::ScoringRule(v),
                None => whatever!("the scoring rule requires a 'scoreVector'"),
            },
            "stv" => VotingRule::Stv,
            "range" | "rangeVoting" => VotingRule::RangeVoting,
            x => whatever!("Unknown voting rule {:?}", x),
        };
        Ok(rule)
    }

    pub fn tie_break(&self) -> ElectionResult<TieBreak> {
        let s = match &self.tiebreak_mode {
            None => {
                debug!("tie_break: no tiebreak mode, using max");
                return Ok(TieBreak::Max);
            }
            Some(JSValue::String(s)) => s.clone(),
            Some(JSValue::Number(n)) => n.to_string(),
            Some(x) => whatever!("Cannot use tiebreak mode {:?}", x),
        };
        s.parse::<TieBreak>().context(VotingSnafu {})
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "valuationSources")]
    pub valuation_sources: Vec<FileSource>,
    pub rules: ElectionRules,
}

pub fn read_summary(path: String) -> ElectionResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads a positive index, starting at 1. Spreadsheet column names (A, B, ..., AA, ...)
/// are also accepted.
fn read_js_int(x: &Option<JSValue>) -> ElectionResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => s
            .to_ascii_lowercase()
            .chars()
            .try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add(c as usize - 'a' as usize + 1)
            })
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {})?,
        _ => return ParsingJsonNumberSnafu {}.fail(),
    };
    ensure!(res >= 1, ParsingJsonNumberSnafu {});
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_from_numbers_and_columns() {
        assert_eq!(read_js_int(&Some(json!(3))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("2"))).unwrap(), 2);
        assert_eq!(read_js_int(&Some(json!("B"))).unwrap(), 2);
        assert_eq!(read_js_int(&Some(json!("aa"))).unwrap(), 27);
        assert!(read_js_int(&Some(json!(0))).is_err());
        assert!(read_js_int(&Some(json!(-1))).is_err());
        assert!(read_js_int(&None).is_err());
        assert_eq!(read_js_int(&Some(json!("XFD"))).unwrap(), 16384);
        assert!(matches!(
            read_js_int(&Some(json!("ZZZZZZZZZZZZZZZZ"))),
            Err(ElectionError::ParsingJsonNumber {})
        ));
    }

    #[test]
    fn parse_config() {
        let js = r#"{
            "outputSettings": { "contestName": "test" },
            "valuationSources": [
                { "provider": "csv", "filePath": "a.csv", "firstValueRowIndex": 2, "firstValueColumnIndex": "C" }
            ],
            "rules": { "votingRule": "scoring", "tiebreakMode": 4, "scoreVector": [1, 0.5, 0] }
        }"#;
        let config: ElectionConfig = serde_json::from_str(js).unwrap();
        let source = &config.valuation_sources[0];
        assert_eq!(source.first_value_row_index().unwrap(), 1);
        assert_eq!(source.first_value_column_index().unwrap(), 2);
        assert_eq!(
            config.rules.voting_rule().unwrap(),
            VotingRule::ScoringRule(vec![1.0, 0.5, 0.0])
        );
        assert_eq!(config.rules.tie_break().unwrap(), TieBreak::Agent(Agent(4)));
    }

    #[test]
    fn rules_validation() {
        let mut rules = ElectionRules {
            voting_rule: "dictatorship".to_string(),
            tiebreak_mode: None,
            dictator: None,
            score_vector: None,
        };
        assert!(rules.voting_rule().is_err());
        rules.dictator = Some(json!(2));
        assert_eq!(rules.voting_rule().unwrap(), VotingRule::Dictatorship(Agent(2)));
        assert_eq!(rules.tie_break().unwrap(), TieBreak::Max);
        rules.dictator = Some(json!(4294967297u64));
        assert!(matches!(
            rules.voting_rule(),
            Err(ElectionError::Whatever { .. })
        ));
        rules.dictator = Some(json!(2));

        rules.voting_rule = "approval".to_string();
        assert!(rules.voting_rule().is_err());

        rules.tiebreak_mode = Some(json!("random"));
        assert!(matches!(
            rules.tie_break(),
            Err(ElectionError::Voting {
                source: VotingErrors::InvalidInput { .. }
            })
        ));
        rules.tiebreak_mode = Some(json!(true));
        assert!(rules.tie_break().is_err());
    }

    #[test]
    fn default_indices() {
        let source = FileSource::new("xlsx", "votes.xlsx", Some("Sheet1".to_string()));
        assert_eq!(source.first_value_row_index().unwrap(), 0);
        assert_eq!(source.first_value_column_index().unwrap(), 0);
    }
}
