//! Pod manifests: a charter and a crew described in a TOML or JSON file.
//!
//! Applying a manifest walks the wizard the same way an operator would
//! (charter, recruit, edit, finalize, connect), leaving the pod in the
//! mapping phase ready to deploy.

use std::path::Path;

use serde::Deserialize;

use crate::controller::PodController;
use crate::error::{HivemindError, Result};
use crate::pod::{ModelId, Tool, UnitPatch};

#[derive(Debug, Clone, Deserialize)]
pub struct PodManifest {
    pub name: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub approval_rule: String,
    pub budget: Option<f64>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    pub model: Option<ModelId>,
    pub tools: Option<Vec<Tool>>,
    /// Name of the unit this one hands work to.
    pub handoff_to: Option<String>,
}

impl PodManifest {
    /// Parse by extension: `.json` as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(toml::from_str(&contents)?)
        }
    }

    /// Built-in crew: a product lead, an architect, a CI engineer and a
    /// compliance checker that will stop for approval.
    pub fn demo() -> Self {
        let spec = |name: &str, role: &str, goal: &str, backstory: &str| UnitSpec {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            model: None,
            tools: None,
            handoff_to: None,
        };
        Self {
            name: "Apollo Infrastructure".into(),
            goal: "Get PR #314 merged with CI green.".into(),
            approval_rule: "Staging branch auto-merge".into(),
            budget: None,
            units: vec![
                UnitSpec {
                    model: Some(ModelId::Gemini3Pro),
                    tools: Some(vec![Tool::Jira, Tool::Calendar]),
                    handoff_to: Some("Byte-7".into()),
                    ..spec(
                        "Sarah Chen",
                        "Product Lead",
                        "Ensure milestone alignment and team cohesion.",
                        "A veteran supervisor model with 10k hours in simulated management environments.",
                    )
                },
                UnitSpec {
                    model: Some(ModelId::Gemini3Pro),
                    tools: Some(vec![Tool::GitHub, Tool::Terminal]),
                    handoff_to: Some("Nia".into()),
                    ..spec(
                        "Byte-7",
                        "Lead Architect",
                        "Refactor core infrastructure for extreme scalability.",
                        "An LLM-driven coder trained on high-performance C++ and Rust codebases.",
                    )
                },
                UnitSpec {
                    tools: Some(vec![Tool::GitHub, Tool::Terminal]),
                    handoff_to: Some("Vera".into()),
                    ..spec(
                        "Nia",
                        "CI Engineer",
                        "Keep the pipeline fast and green.",
                        "Grew up parsing build logs.",
                    )
                },
                UnitSpec {
                    model: Some(ModelId::FlashLite),
                    tools: Some(vec![Tool::ResearchDB]),
                    ..spec(
                        "Vera",
                        "Compliance Checker",
                        "Block anything that touches production without sign-off.",
                        "Audits every dependency twice.",
                    )
                },
            ],
        }
    }

    /// Drive `controller` from charter to mapping with this manifest's crew.
    pub fn apply(&self, controller: &mut PodController) -> Result<()> {
        controller.set_charter(&self.name, &self.goal, &self.approval_rule);
        if let Some(budget) = self.budget {
            controller.set_budget(budget);
        }
        controller.recruit_workforce()?;

        for spec in &self.units {
            let id = controller.add_unit()?;
            controller.update_unit(
                &id,
                UnitPatch {
                    name: Some(spec.name.clone()),
                    role: Some(spec.role.clone()),
                    goal: Some(spec.goal.clone()),
                    backstory: Some(spec.backstory.clone()),
                    model: spec.model,
                    tools: spec.tools.clone(),
                },
            );
        }
        controller.finalize_squad()?;

        for spec in &self.units {
            let Some(target) = &spec.handoff_to else {
                continue;
            };
            let roster = controller.roster();
            let (Some(source), Some(target_unit)) =
                (roster.find_by_name(&spec.name), roster.find_by_name(target))
            else {
                return Err(HivemindError::Config(format!(
                    "{} hands off to unknown unit {target}",
                    spec.name
                )));
            };
            let (source_id, target_id) = (source.id.clone(), target_unit.id.clone());
            controller.toggle_connection(&source_id, &target_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::Phase;

    #[test]
    fn demo_manifest_reaches_mapping_with_handoffs() {
        let mut c = PodController::default();
        PodManifest::demo().apply(&mut c).unwrap();
        assert_eq!(c.phase(), Phase::Mapping);
        assert_eq!(c.roster().len(), 4);

        let sarah = c.roster().find_by_name("Sarah Chen").unwrap();
        let byte = c.roster().find_by_name("Byte-7").unwrap();
        assert_eq!(sarah.connections, vec![byte.id.clone()]);
        assert_eq!(sarah.cost_per_hour, 3.50);
        assert!(c.roster().find_by_name("Vera").unwrap().connections.is_empty());

        c.deploy().unwrap();
        assert!(c.roster().units()[0].is_manager);
    }

    #[test]
    fn loads_toml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.toml");
        std::fs::write(
            &path,
            r#"
name = "Hermes"
budget = 25.0

[[units]]
name = "Ada"
role = "Dev"
model = "gemini-flash-lite-latest"
tools = ["GitHub"]
handoff_to = "Bo"

[[units]]
name = "Bo"
role = "Policy Reviewer"
"#,
        )
        .unwrap();

        let manifest = PodManifest::load(&path).unwrap();
        assert_eq!(manifest.name, "Hermes");
        assert_eq!(manifest.units.len(), 2);
        assert_eq!(manifest.units[0].model, Some(ModelId::FlashLite));
        assert_eq!(manifest.units[0].tools, Some(vec![Tool::GitHub]));

        let mut c = PodController::default();
        manifest.apply(&mut c).unwrap();
        assert_eq!(c.pod().budget, 25.0);
        let bo = c.roster().find_by_name("Bo").unwrap();
        // Unspecified tools keep the recruit default.
        assert_eq!(bo.tools, vec![Tool::Terminal]);
    }

    #[test]
    fn loads_json_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.json");
        std::fs::write(
            &path,
            r#"{"name": "Iris", "units": [{"name": "A", "role": "Dev"}]}"#,
        )
        .unwrap();
        let manifest = PodManifest::load(&path).unwrap();
        assert_eq!(manifest.name, "Iris");
        assert!(manifest.budget.is_none());
    }

    #[test]
    fn unknown_handoff_target_is_config_error() {
        let mut manifest = PodManifest::demo();
        manifest.units[0].handoff_to = Some("Nobody".into());
        let mut c = PodController::default();
        assert!(matches!(
            manifest.apply(&mut c),
            Err(HivemindError::Config(_))
        ));
    }
}
