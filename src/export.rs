//! Crew configuration export.
//!
//! Renders the roster as a multi-document YAML blob, one document per unit,
//! separated by `---` lines. Display only; nothing reads it back.

use crate::classify::is_manager_role;
use crate::pod::LaborUnit;

const DOCUMENT_SEPARATOR: &str = "\n---\n";

pub fn render_crew_config(units: &[LaborUnit]) -> String {
    units
        .iter()
        .map(render_unit)
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

fn render_unit(unit: &LaborUnit) -> String {
    let mut doc = String::new();
    push_block(&mut doc, "role", &unit.role);
    push_block(&mut doc, "goal", &unit.goal);
    push_block(&mut doc, "backstory", &unit.backstory);
    doc.push_str(&format!("model: {}\n", unit.model));
    if unit.tools.is_empty() {
        doc.push_str("tools: []\n");
    } else {
        doc.push_str("tools:\n");
        for tool in &unit.tools {
            doc.push_str(&format!("  - {tool}\n"));
        }
    }
    doc.push_str("verbose: true\n");
    doc.push_str(&format!(
        "allow_delegation: {}\n",
        is_manager_role(&unit.role)
    ));
    // A JSON array of strings is also a valid YAML flow sequence.
    let connections =
        serde_json::to_string(&unit.connections).unwrap_or_else(|_| "[]".to_string());
    doc.push_str(&format!("connections: {connections}"));
    doc
}

/// `key: |2-` literal block with every line of `text` indented two spaces.
/// The explicit indent keeps leading spaces on the first line.
fn push_block(doc: &mut String, key: &str, text: &str) {
    doc.push_str(key);
    doc.push_str(": |2-\n");
    if text.is_empty() {
        doc.push_str("  \n");
        return;
    }
    for line in text.lines() {
        doc.push_str("  ");
        doc.push_str(line);
        doc.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::pod::{ModelId, Tool};

    fn unit(role: &str, tools: Vec<Tool>, connections: &[&str]) -> LaborUnit {
        let mut u = LaborUnit::recruit();
        u.role = role.into();
        u.goal = "Keep CI green.".into();
        u.backstory = "Trained on build logs.\nHates flaky tests.".into();
        u.set_model(ModelId::Gemini3Pro);
        u.tools = tools;
        u.connections = connections.iter().map(|c| c.to_string()).collect();
        u
    }

    fn parse_all(yaml: &str) -> Vec<serde_yaml::Value> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|doc| serde_yaml::Value::deserialize(doc).unwrap())
            .collect()
    }

    #[test]
    fn one_document_per_unit() {
        let units = vec![
            unit("Project Manager", vec![Tool::Jira, Tool::Calendar], &["agent-2"]),
            unit("Lead Architect", vec![Tool::GitHub], &[]),
            unit("Compliance Checker", vec![], &[]),
        ];
        let yaml = render_crew_config(&units);
        assert_eq!(yaml.matches("\n---\n").count(), 2);

        let docs = parse_all(&yaml);
        assert_eq!(docs.len(), 3);

        let manager = &docs[0];
        assert_eq!(manager["role"].as_str(), Some("Project Manager"));
        assert_eq!(manager["goal"].as_str(), Some("Keep CI green."));
        assert_eq!(
            manager["backstory"].as_str(),
            Some("Trained on build logs.\nHates flaky tests.")
        );
        assert_eq!(manager["model"].as_str(), Some("gemini-3-pro-preview"));
        assert_eq!(manager["verbose"].as_bool(), Some(true));
        assert_eq!(manager["allow_delegation"].as_bool(), Some(true));
        let tools: Vec<&str> = manager["tools"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert_eq!(tools, vec!["Jira", "Calendar"]);
        assert_eq!(manager["connections"][0].as_str(), Some("agent-2"));

        assert_eq!(docs[1]["allow_delegation"].as_bool(), Some(false));
        assert!(docs[2]["tools"].as_sequence().unwrap().is_empty());
        assert!(docs[2]["connections"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn connections_render_as_literal_array() {
        let yaml = render_crew_config(&[unit("Dev", vec![], &["agent-7"])]);
        assert!(yaml.ends_with(r#"connections: ["agent-7"]"#));
    }

    #[test]
    fn leading_spaces_survive_literal_blocks() {
        let mut u = unit("Dev", vec![Tool::Terminal], &[]);
        u.backstory = "    indented\nnext".into();
        u.goal = String::new();
        let docs = parse_all(&render_crew_config(&[u]));
        assert_eq!(docs[0]["backstory"].as_str(), Some("    indented\nnext"));
        assert_eq!(docs[0]["goal"].as_str(), Some(""));
        assert_eq!(docs[0]["role"].as_str(), Some("Dev"));
    }

    #[test]
    fn empty_roster_renders_nothing() {
        assert_eq!(render_crew_config(&[]), "");
    }
}
