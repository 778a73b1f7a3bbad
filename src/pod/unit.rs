use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::ModelId;

const AVATAR_BASE: &str = "https://api.dicebear.com/9.x/pixel-art/svg";
const AVATAR_BACKGROUND: &str = "f1f5f9";

/// Fixed tool vocabulary a unit can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    GitHub,
    Slack,
    PowerPoint,
    Terminal,
    Email,
    ResearchDB,
    BillingAPI,
    Jira,
    Calendar,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::GitHub => "GitHub",
            Tool::Slack => "Slack",
            Tool::PowerPoint => "PowerPoint",
            Tool::Terminal => "Terminal",
            Tool::Email => "Email",
            Tool::ResearchDB => "ResearchDB",
            Tool::BillingAPI => "BillingAPI",
            Tool::Jira => "Jira",
            Tool::Calendar => "Calendar",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Idle,
    Working,
    /// Halted by the risk check until a human approves.
    WaitingApproval,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Idle => write!(f, "idle"),
            UnitStatus::Working => write!(f, "working"),
            UnitStatus::WaitingApproval => write!(f, "waiting_approval"),
        }
    }
}

/// Floor coordinates as percentages of the office map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A simulated worker (ALU).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborUnit {
    pub id: String,
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub model: ModelId,
    pub cost_per_hour: f64,
    pub reliability: f64,
    pub status: UnitStatus,
    /// Always within `0.0..=100.0`.
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    pub avatar: String,
    pub tools: Vec<Tool>,
    /// Handoff targets. The roster keeps at most one entry here.
    pub connections: Vec<String>,
    pub position: Position,
    #[serde(default)]
    pub is_manager: bool,
}

impl LaborUnit {
    /// A blank recruit with a fresh id and the default model and toolset.
    pub fn recruit() -> Self {
        let id = format!("agent-{}", Uuid::new_v4().simple());
        let model = ModelId::DEFAULT;
        let meta = model.metadata();
        Self {
            avatar: avatar_url(&id),
            id,
            name: String::new(),
            role: String::new(),
            goal: String::new(),
            backstory: String::new(),
            model,
            cost_per_hour: meta.cost,
            reliability: meta.reliability,
            status: UnitStatus::Idle,
            progress: 0.0,
            current_task: None,
            tools: vec![Tool::Terminal],
            connections: Vec::new(),
            position: Position::new(50.0, 50.0),
            is_manager: false,
        }
    }

    /// Name for display, falling back to role and then a generic label.
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.role.is_empty() {
            &self.role
        } else {
            "Labor Unit"
        }
    }

    /// Switch model and re-derive cost and reliability from the catalog.
    pub fn set_model(&mut self, model: ModelId) {
        let meta = model.metadata();
        self.model = model;
        self.cost_per_hour = meta.cost;
        self.reliability = meta.reliability;
    }

    pub fn has_tool(&self, tool: Tool) -> bool {
        self.tools.contains(&tool)
    }

    pub fn toggle_tool(&mut self, tool: Tool) {
        if let Some(pos) = self.tools.iter().position(|t| *t == tool) {
            self.tools.remove(pos);
        } else {
            self.tools.push(tool);
        }
    }

    /// Return to the idle pool with progress cleared.
    pub fn reset_idle(&mut self) {
        self.status = UnitStatus::Idle;
        self.progress = 0.0;
    }

    /// Begin a fresh task from zero progress.
    pub fn start_task(&mut self, task: String) {
        self.status = UnitStatus::Working;
        self.progress = 0.0;
        self.current_task = Some(task);
    }
}

/// Deterministic identicon URL for a unit id.
pub fn avatar_url(id: &str) -> String {
    format!("{AVATAR_BASE}?seed={id}&backgroundColor={AVATAR_BACKGROUND}")
}

/// Partial update for the editable fields of a unit. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UnitPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub goal: Option<String>,
    pub backstory: Option<String>,
    pub model: Option<ModelId>,
    pub tools: Option<Vec<Tool>>,
}

impl UnitPatch {
    pub fn apply(self, unit: &mut LaborUnit) {
        if let Some(name) = self.name {
            unit.name = name;
        }
        if let Some(role) = self.role {
            unit.role = role;
        }
        if let Some(goal) = self.goal {
            unit.goal = goal;
        }
        if let Some(backstory) = self.backstory {
            unit.backstory = backstory;
        }
        if let Some(model) = self.model {
            unit.set_model(model);
        }
        if let Some(tools) = self.tools {
            unit.tools = tools;
        }
    }
}
