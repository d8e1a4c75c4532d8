use crate::handle::AgentHandle;
use autocare_core::{AutocareError, AutocareResult, TaskKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Agent handles keyed by registry key, iterated in registration order.
///
/// Keys are not validated against [`TaskKind`]; an agent registered under a
/// key no kind maps to is simply never routed to.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    order: Vec<String>,
    agents: HashMap<String, Arc<AgentHandle>>,
}

impl AgentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `key`, returning the handle it replaced.
    ///
    /// Replacing keeps the key's original position in registration order.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        handle: AgentHandle,
    ) -> Option<Arc<AgentHandle>> {
        let key = key.into();
        let previous = self.agents.insert(key.clone(), Arc::new(handle));
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    /// Handle registered under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<AgentHandle>> {
        self.agents.get(key).cloned()
    }

    /// Resolve the agent responsible for `kind` through the fixed
    /// kind-to-key table.
    pub fn route(&self, kind: TaskKind) -> AutocareResult<(String, Arc<AgentHandle>)> {
        let key = kind.registry_key();
        self.get(key)
            .map(|handle| (key.to_string(), handle))
            .ok_or_else(|| AutocareError::RouteNotFound {
                kind: kind.to_string(),
            })
    }

    /// `(key, handle)` pairs in registration order.
    pub fn entries(&self) -> Vec<(String, Arc<AgentHandle>)> {
        self.order
            .iter()
            .filter_map(|key| self.agents.get(key).map(|h| (key.clone(), Arc::clone(h))))
            .collect()
    }

    /// Keys in registration order.
    pub fn keys(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// `true` when no agent is registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
