//! Per-item assembly of the namespace exposed to user code.
//!
//! The context is rebuilt for every item index and never shared across
//! indices: a read-mostly snapshot of data-proxy bindings plus a small set
//! of callable accessors bound to the current execution request.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::core::types::JsonObject;

/// Pass-through helper exposed unchanged to user code.
pub type HelperFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Helper that authenticates with the calling node's credentials.
/// Arguments are the credential type and the request options.
pub type AuthHelperFn = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

/// Host-engine capabilities the context assembler draws from.
///
/// Supplied by the execution engine; inputs are assumed well-formed.
pub trait ContextCaller: Send + Sync {
    /// Resolve a named parameter for the current node execution.
    fn node_parameter(&self, name: &str) -> Option<Value>;

    /// Read workflow-scoped static data of the given kind (e.g. "global").
    fn workflow_static_data(&self, kind: &str) -> Value;

    /// Persist workflow-scoped static data of the given kind.
    fn set_workflow_static_data(&self, kind: &str, data: Value);

    /// HTTP helper that authenticates as this caller.
    fn http_request_with_authentication(
        &self,
        credential_type: &str,
        options: Value,
    ) -> Result<Value>;

    /// Paginated variant of the authenticated HTTP helper.
    fn request_with_authentication_paginated(
        &self,
        credential_type: &str,
        options: Value,
    ) -> Result<Value>;

    /// Helpers forwarded to user code without re-binding.
    fn passthrough_helpers(&self) -> HashMap<String, HelperFn>;

    /// Expression bindings (`$json`, `$node`, ...) for one input row.
    fn data_proxy(&self, item_index: usize) -> JsonObject;
}

/// Helper bundle exposed to user code.
///
/// The two credential-sensitive helpers are re-bound to the caller so they
/// keep the correct authentication identity when invoked later from inside
/// the sandbox.
pub struct Helpers {
    pub http_request_with_authentication: AuthHelperFn,
    pub request_with_authentication_paginated: AuthHelperFn,
    pub passthrough: HashMap<String, HelperFn>,
}

/// Everything visible to user code for one input row.
///
/// Data-proxy bindings are spread at the top level of the sandbox namespace
/// and win over the fixed names on collision (which in practice does not
/// occur).
pub struct SandboxContext {
    /// `$getNodeParameter`
    pub get_node_parameter: Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>,
    /// `$getWorkflowStaticData`
    pub get_workflow_static_data: Arc<dyn Fn(&str) -> Value + Send + Sync>,
    /// Writer counterpart of `$getWorkflowStaticData`.
    pub set_workflow_static_data: Arc<dyn Fn(&str, Value) + Send + Sync>,
    pub helpers: Helpers,
    /// Dynamically named bindings for this item index.
    pub bindings: JsonObject,
}

/// Assemble the sandbox context for `item_index`.
///
/// Each call produces an independent context; no mutable state is shared
/// between calls with different indices.
pub fn build_context(caller: &Arc<dyn ContextCaller>, item_index: usize) -> SandboxContext {
    let helpers = Helpers {
        http_request_with_authentication: {
            let caller = Arc::clone(caller);
            Arc::new(move |credential_type: &str, options: Value| {
                caller.http_request_with_authentication(credential_type, options)
            })
        },
        request_with_authentication_paginated: {
            let caller = Arc::clone(caller);
            Arc::new(move |credential_type: &str, options: Value| {
                caller.request_with_authentication_paginated(credential_type, options)
            })
        },
        passthrough: caller.passthrough_helpers(),
    };

    SandboxContext {
        get_node_parameter: {
            let caller = Arc::clone(caller);
            Arc::new(move |name: &str| caller.node_parameter(name))
        },
        get_workflow_static_data: {
            let caller = Arc::clone(caller);
            Arc::new(move |kind: &str| caller.workflow_static_data(kind))
        },
        set_workflow_static_data: {
            let caller = Arc::clone(caller);
            Arc::new(move |kind: &str, data: Value| caller.set_workflow_static_data(kind, data))
        },
        helpers,
        bindings: caller.data_proxy(item_index),
    }
}
