//! Dependency-aware batch execution.
//!
//! The [`BatchExecutor`] runs a list of create/update/delete operations
//! against the API, sequencing dependents after their dependencies and
//! running independent operations concurrently under a semaphore. An
//! operation's endpoint or payload may reference an earlier operation's
//! result through `$<index>.<field>` or `$<id>.<field>` placeholders,
//! resolved at execution time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::clients::{HttpClient, HttpMethod, HttpRequest};

/// The kind of API mutation an operation performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOperationType {
    /// POST a new resource.
    Create,
    /// PATCH an existing resource.
    Update,
    /// DELETE an existing resource.
    Delete,
}

impl BatchOperationType {
    const fn method(self) -> HttpMethod {
        match self {
            Self::Create => HttpMethod::Post,
            Self::Update => HttpMethod::Patch,
            Self::Delete => HttpMethod::Delete,
        }
    }
}

/// One operation in a batch.
///
/// # Example
///
/// ```rust
/// use pco_api::batch::BatchOperation;
/// use serde_json::json;
///
/// let create = BatchOperation::create(
///     "create-person",
///     "Person",
///     "/people/v2/people",
///     json!({"data": {"type": "Person", "attributes": {"first_name": "Jean"}}}),
/// );
///
/// // The email depends on the person and references its id.
/// let email = BatchOperation::create(
///     "create-email",
///     "Email",
///     "/people/v2/people/$0.id/emails",
///     json!({"data": {"type": "Email", "attributes": {"address": "jean@example.test"}}}),
/// )
/// .with_dependencies(vec!["create-person".to_string()]);
/// ```
#[derive(Clone, Debug)]
pub struct BatchOperation {
    /// Caller-assigned identifier, referenced by `dependencies`.
    pub id: String,
    /// The mutation kind.
    pub op_type: BatchOperationType,
    /// The JSON:API resource type this operation touches.
    pub resource_type: String,
    /// The endpoint, possibly containing `$ref.field` placeholders.
    pub endpoint: String,
    /// The JSON body, possibly containing placeholders in string values.
    pub data: Option<serde_json::Value>,
    /// IDs of operations that must succeed before this one starts.
    pub dependencies: Vec<String>,
}

impl BatchOperation {
    /// Creates a POST operation.
    pub fn create(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        endpoint: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            op_type: BatchOperationType::Create,
            resource_type: resource_type.into(),
            endpoint: endpoint.into(),
            data: Some(data),
            dependencies: Vec::new(),
        }
    }

    /// Creates a PATCH operation.
    pub fn update(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        endpoint: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            op_type: BatchOperationType::Update,
            resource_type: resource_type.into(),
            endpoint: endpoint.into(),
            data: Some(data),
            dependencies: Vec::new(),
        }
    }

    /// Creates a DELETE operation.
    pub fn delete(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            op_type: BatchOperationType::Delete,
            resource_type: resource_type.into(),
            endpoint: endpoint.into(),
            data: None,
            dependencies: Vec::new(),
        }
    }

    /// Declares the operations that must succeed before this one starts.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// The outcome of one operation.
#[derive(Clone, Debug)]
pub struct BatchResult {
    /// The operation's caller-assigned identifier.
    pub operation_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result payload (the JSON:API primary data) on success.
    pub data: Option<serde_json::Value>,
    /// The failure message on error.
    pub error: Option<String>,
}

/// The aggregate outcome of a batch.
#[derive(Clone, Debug)]
pub struct BatchSummary {
    /// Number of operations submitted.
    pub total: usize,
    /// Number that succeeded.
    pub successful: usize,
    /// Number that failed (scheduled but unsuccessful).
    pub failed: usize,
    /// `successful / total`; 1.0 for an empty batch.
    pub success_rate: f64,
    /// Per-operation results in submission order. Operations never
    /// scheduled (after an abort) have no entry.
    pub results: Vec<BatchResult>,
    /// Wall-clock time for the whole batch.
    pub duration: Duration,
}

/// Tuning for [`BatchExecutor::execute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    /// When false, the first failure stops scheduling of not-yet-started
    /// operations. When true, failures are recorded and independent
    /// operations continue.
    pub continue_on_error: bool,
    /// In-flight request bound within a scheduling wave.
    pub max_concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            max_concurrency: 5,
        }
    }
}

/// Executes batches of dependent operations through a borrowed [`HttpClient`].
#[derive(Clone, Copy, Debug)]
pub struct BatchExecutor<'a> {
    client: &'a HttpClient,
}

impl<'a> BatchExecutor<'a> {
    /// Creates an executor over the given client.
    #[must_use]
    pub const fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Executes the batch. Equivalent to
    /// [`execute_observed`](Self::execute_observed) with no-op callbacks.
    pub async fn execute(
        &self,
        operations: Vec<BatchOperation>,
        options: &BatchOptions,
    ) -> BatchSummary {
        self.execute_observed(operations, options, |_| {}, |_| {})
            .await
    }

    /// Executes the batch, reporting each settled operation and the final
    /// summary.
    ///
    /// Callbacks are observability hooks only; their return values never
    /// influence scheduling. `on_operation` fires once per completed
    /// operation, `on_complete` once at batch end.
    pub async fn execute_observed<O, C>(
        &self,
        operations: Vec<BatchOperation>,
        options: &BatchOptions,
        mut on_operation: O,
        on_complete: C,
    ) -> BatchSummary
    where
        O: FnMut(&BatchResult),
        C: FnOnce(&BatchSummary),
    {
        let started = Instant::now();
        let total = operations.len();
        let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));

        // Result payloads keyed by operation id and by submission index,
        // so placeholders can use either form.
        let mut payloads: HashMap<String, serde_json::Value> = HashMap::new();
        let mut succeeded: Vec<String> = Vec::new();
        let mut failed_ids: Vec<String> = Vec::new();
        let mut completed: Vec<(usize, BatchResult)> = Vec::new();

        let mut pending: Vec<(usize, BatchOperation)> =
            operations.into_iter().enumerate().collect();
        let mut aborted = false;

        while !pending.is_empty() && !aborted {
            // Operations whose dependencies already failed can never run.
            let (blocked, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|(_, op)| {
                op.dependencies.iter().any(|dep| failed_ids.contains(dep))
            });
            pending = rest;

            for (index, op) in blocked {
                let result = BatchResult {
                    operation_id: op.id.clone(),
                    success: false,
                    data: None,
                    error: Some(format!("Dependency of operation '{}' failed", op.id)),
                };
                failed_ids.push(op.id);
                on_operation(&result);
                completed.push((index, result));
                if !options.continue_on_error {
                    aborted = true;
                }
            }
            if aborted {
                break;
            }

            let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|(_, op)| {
                op.dependencies.iter().all(|dep| succeeded.contains(dep))
            });
            pending = waiting;

            if ready.is_empty() {
                // Unknown or cyclic dependencies: fail the stragglers
                // rather than looping forever.
                for (index, op) in pending.drain(..) {
                    let result = BatchResult {
                        operation_id: op.id.clone(),
                        success: false,
                        data: None,
                        error: Some(format!(
                            "Operation '{}' has unresolved dependencies",
                            op.id
                        )),
                    };
                    failed_ids.push(op.id);
                    on_operation(&result);
                    completed.push((index, result));
                }
                break;
            }

            let wave = ready.iter().map(|(index, op)| {
                let semaphore = Arc::clone(&semaphore);
                let payloads = &payloads;
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .expect("semaphore should never be closed");
                    (*index, self.run_operation(op, payloads).await)
                }
            });

            let settled = join_all(wave).await;

            let mut wave_failed = false;
            for (index, result) in settled {
                if result.success {
                    if let Some(payload) = &result.data {
                        payloads.insert(result.operation_id.clone(), payload.clone());
                        payloads.insert(index.to_string(), payload.clone());
                    }
                    succeeded.push(result.operation_id.clone());
                } else {
                    failed_ids.push(result.operation_id.clone());
                    wave_failed = true;
                }
                on_operation(&result);
                completed.push((index, result));
            }

            if wave_failed && !options.continue_on_error {
                aborted = true;
            }
        }

        completed.sort_by_key(|(index, _)| *index);
        let results: Vec<BatchResult> = completed.into_iter().map(|(_, r)| r).collect();
        let successful = results.iter().filter(|r| r.success).count();
        let failed = results.len() - successful;
        let success_rate = if total == 0 {
            1.0
        } else {
            successful as f64 / total as f64
        };

        let summary = BatchSummary {
            total,
            successful,
            failed,
            success_rate,
            results,
            duration: started.elapsed(),
        };
        on_complete(&summary);
        summary
    }

    /// Resolves placeholders and issues one operation's request.
    async fn run_operation(
        &self,
        op: &BatchOperation,
        payloads: &HashMap<String, serde_json::Value>,
    ) -> BatchResult {
        let failure = |message: String| BatchResult {
            operation_id: op.id.clone(),
            success: false,
            data: None,
            error: Some(message),
        };

        let endpoint = match resolve_placeholders(&op.endpoint, payloads) {
            Ok(endpoint) => endpoint,
            Err(message) => return failure(message),
        };

        let body = match &op.data {
            Some(data) => match resolve_placeholders_in_value(data, payloads) {
                Ok(resolved) => Some(resolved),
                Err(message) => return failure(message),
            },
            None => None,
        };

        let mut builder = HttpRequest::builder(op.op_type.method(), endpoint);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = match builder.build() {
            Ok(request) => request,
            Err(error) => return failure(error.to_string()),
        };

        match self.client.request(request).await {
            Ok(response) => BatchResult {
                operation_id: op.id.clone(),
                success: true,
                data: Some(primary_data(response.data)),
                error: None,
            },
            Err(error) => failure(error.to_string()),
        }
    }
}

/// Extracts the JSON:API primary data from a response body.
///
/// `$ref.field` placeholders index into this payload, so `$0.id` reaches
/// the created resource's id without spelling out the envelope.
fn primary_data(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

/// Replaces `$ref.field` placeholders in a string.
///
/// `ref` is a submission index (`$0`) or an operation id (`$create-person`);
/// `field` is a single key into the referenced result payload. A `$` not
/// followed by a full `ref.field` token is not a placeholder and passes
/// through literally, so payload text like `"Gave $50"` survives untouched.
/// Unresolvable references produce an error naming the placeholder.
fn resolve_placeholders(
    input: &str,
    payloads: &HashMap<String, serde_json::Value>,
) -> Result<String, String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(dollar) = rest.find('$') {
        output.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        let Some((reference, field, consumed)) = split_placeholder(after) else {
            output.push('$');
            rest = after;
            continue;
        };

        let value = payloads
            .get(reference)
            .and_then(|payload| payload.get(field))
            .ok_or_else(|| format!("Unresolved placeholder '${reference}.{field}'"))?;

        match value {
            serde_json::Value::String(s) => output.push_str(s),
            other => output.push_str(&other.to_string()),
        }

        rest = &after[consumed..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Splits a `ref.field` token off the front of `text`.
///
/// Returns the reference, the field, and the bytes consumed, or `None` when
/// the text does not start with a complete token.
fn split_placeholder(text: &str) -> Option<(&str, &str, usize)> {
    let ref_end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(text.len());
    if ref_end == 0 || !text[ref_end..].starts_with('.') {
        return None;
    }

    let after_dot = &text[ref_end + 1..];
    let field_end = after_dot
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(after_dot.len());
    if field_end == 0 {
        return None;
    }

    Some((&text[..ref_end], &after_dot[..field_end], ref_end + 1 + field_end))
}

/// Recursively resolves placeholders in every string of a JSON value.
fn resolve_placeholders_in_value(
    value: &serde_json::Value,
    payloads: &HashMap<String, serde_json::Value>,
) -> Result<serde_json::Value, String> {
    match value {
        serde_json::Value::String(s) if s.contains('$') => {
            Ok(serde_json::Value::String(resolve_placeholders(s, payloads)?))
        }
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| resolve_placeholders_in_value(item, payloads))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, item)| {
                resolve_placeholders_in_value(item, payloads).map(|v| (key.clone(), v))
            })
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(serde_json::Value::Object),
        other => Ok(other.clone()),
    }
}
