//! Test helpers: an in-memory gateway with scripted responses.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use sentinel_common::ApiOperation;
use serde_json::Value;

use crate::client::Gateway;
use crate::error::{Error, Result};

/// Scripted response: `Ok` body or `Err` detail (surfaced as `Error::Api`).
pub type Scripted = std::result::Result<Value, String>;

/// A `Gateway` that records every call and answers from a script.
///
/// Queued responses (`script`) are consumed first; after that the standing
/// response (`respond`) is returned. Operations with neither fail.
pub struct ScriptedGateway {
    agent_id: String,
    queued: Mutex<HashMap<ApiOperation, VecDeque<Scripted>>>,
    standing: Mutex<HashMap<ApiOperation, Scripted>>,
    calls: Mutex<Vec<(ApiOperation, Value)>>,
}

impl ScriptedGateway {
    pub fn new(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            queued: Mutex::new(HashMap::new()),
            standing: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call to `operation` with `response`.
    pub fn respond(&self, operation: ApiOperation, response: Scripted) {
        self.standing.lock().unwrap().insert(operation, response);
    }

    /// Answer the next calls to `operation` with `responses`, in order.
    pub fn script(&self, operation: ApiOperation, responses: Vec<Scripted>) {
        self.queued
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .extend(responses);
    }

    /// Every call made so far, with its arguments.
    pub fn calls(&self) -> Vec<(ApiOperation, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<ApiOperation> {
        self.calls().into_iter().map(|(op, _)| op).collect()
    }

    fn answer(&self, operation: ApiOperation, args: Value) -> Result<Value> {
        self.calls.lock().unwrap().push((operation, args));

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        let response = queued.or_else(|| self.standing.lock().unwrap().get(&operation).cloned());

        match response {
            Some(Ok(value)) => Ok(value),
            Some(Err(detail)) => Err(Error::Api(detail)),
            None => Err(Error::Communication(format!(
                "no scripted response for {}",
                operation
            ))),
        }
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    async fn query(&self, operation: ApiOperation, args: Value) -> Result<Value> {
        self.answer(operation, args)
    }

    async fn mutate(&self, operation: ApiOperation, args: Value) -> Result<Value> {
        self.answer(operation, args)
    }
}
