//! Agent Goals
//!
//! Goals are rendered into the system prompt in priority order. Priority has
//! no other effect on control flow.

use serde::{Deserialize, Serialize};

/// A declared objective of an agent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Lower values are listed first
    pub priority: i32,

    /// Short identifier
    pub name: String,

    /// Free-form instructions shown to the model
    pub description: String,
}

impl Goal {
    pub fn new(priority: i32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            priority,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Render as a single prompt line: `[priority] name: description`
    pub fn render(&self) -> String {
        format!("[{}] {}: {}", self.priority, self.name, self.description.trim())
    }
}

/// Order goals by priority, keeping declaration order among equal priorities.
pub fn ordered(goals: &[Goal]) -> Vec<&Goal> {
    let mut sorted: Vec<&Goal> = goals.iter().collect();
    sorted.sort_by_key(|g| g.priority);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_stable() {
        let goals = vec![
            Goal::new(2, "b", "second"),
            Goal::new(1, "a", "first"),
            Goal::new(2, "c", "third"),
        ];

        let names: Vec<&str> = ordered(&goals).iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_negative_priorities_come_first() {
        let goals = vec![
            Goal::new(0, "zero", "z"),
            Goal::new(-5, "urgent", "u"),
            Goal::new(3, "later", "l"),
        ];

        let names: Vec<&str> = ordered(&goals).iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["urgent", "zero", "later"]);
        assert_eq!(goals[1].render(), "[-5] urgent: u");
    }

    #[test]
    fn test_render() {
        let goal = Goal::new(1, "file_management", "  Manage files\n");
        assert_eq!(goal.render(), "[1] file_management: Manage files");
    }
}
