//! Skill registry for binding skills to the host's tool names.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::Skill;
use crate::error::{Error, Result};

/// Registry of all skills exposed to the agent runtime.
pub struct SkillRegistry {
    skills: RwLock<HashMap<String, Arc<dyn Skill>>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self {
            skills: RwLock::new(HashMap::new()),
        }
    }

    /// Register a skill, replacing any skill with the same name.
    pub async fn register(&self, skill: Arc<dyn Skill>) {
        let mut skills = self.skills.write().await;
        skills.insert(skill.name().to_string(), skill);
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Skill>> {
        let skills = self.skills.read().await;
        skills.get(name).cloned()
    }

    /// Registered skill names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let skills = self.skills.read().await;
        let mut names: Vec<String> = skills.keys().cloned().collect();
        names.sort();
        names
    }

    /// Tool descriptors (`name`, `description`, `parameters`) for the host.
    pub async fn descriptors(&self) -> Vec<Value> {
        let skills = self.all().await;
        let mut descriptors: Vec<Value> = skills
            .iter()
            .map(|skill| {
                serde_json::json!({
                    "name": skill.name(),
                    "description": skill.description(),
                    "parameters": skill.parameters(),
                })
            })
            .collect();
        descriptors.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
        descriptors
    }

    pub async fn all(&self) -> Vec<Arc<dyn Skill>> {
        let skills = self.skills.read().await;
        skills.values().cloned().collect()
    }

    /// Execute a skill by name.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        // Clone the skill out so the lock is not held across the call
        let skill = self
            .get(name)
            .await
            .ok_or_else(|| Error::UnknownSkill(name.to_string()))?;

        tracing::debug!(skill = name, "Invoking skill");
        skill.execute(args).await
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoSkill;

    #[async_trait]
    impl Skill for EchoSkill {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Returns its arguments."
        }

        fn parameters(&self) -> Value {
            serde_json::json!({"type": "object"})
        }

        async fn execute(&self, args: Value) -> Result<Value> {
            Ok(args)
        }
    }

    #[tokio::test]
    async fn test_register_and_invoke() {
        let registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill)).await;

        assert_eq!(registry.names().await, vec!["echo".to_string()]);
        let result = registry.invoke("echo", serde_json::json!({"x": 1})).await.unwrap();
        assert_eq!(result["x"], 1);

        let descriptors = registry.descriptors().await;
        assert_eq!(descriptors[0]["name"], "echo");
    }

    #[tokio::test]
    async fn test_unknown_skill() {
        let registry = SkillRegistry::new();
        let err = registry.invoke("missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, Error::UnknownSkill(name) if name == "missing"));
    }
}
