use minihack_core::EngineError;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

use crate::level::{Level, Rule, RuleRow, Scenario};

#[derive(Debug, Deserialize)]
struct PresetRow {
    name: String,
    levels: Vec<Level>,
    #[serde(default)]
    rules: Vec<RuleRow>,
}

static PRESET_MAP: OnceCell<HashMap<String, Scenario>> = OnceCell::new();

fn load_presets() -> HashMap<String, Scenario> {
    let mut map = HashMap::new();
    let data = include_str!("../data/presets.json");
    let rows: Vec<PresetRow> = match serde_json::from_str(data) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "preset file is malformed; no presets loaded");
            return map;
        }
    };
    for row in rows {
        let rules: Result<Vec<Rule>, EngineError> = row.rules.into_iter().map(Rule::try_from).collect();
        let scenario = match rules {
            Ok(rules) => Scenario { name: row.name.clone(), levels: row.levels, rules },
            Err(e) => {
                warn!(preset = %row.name, error = %e, "skipping preset with bad rules");
                continue;
            }
        };
        if let Err(e) = scenario.validate() {
            warn!(preset = %row.name, error = %e, "skipping invalid preset");
            continue;
        }
        map.insert(row.name, scenario);
    }
    map
}

/// Built-in scenario by name.
pub fn preset_scenario(name: &str) -> Result<Scenario, EngineError> {
    PRESET_MAP
        .get_or_init(load_presets)
        .get(name)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(format!("scenario preset {name}")))
}

/// Names of every built-in scenario, sorted.
pub fn preset_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PRESET_MAP.get_or_init(load_presets).keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
