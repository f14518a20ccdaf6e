//! The JSON-RPC 1.1 wire types, and the rules for turning an HTTP response into a result.
use crate::error::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;

/// Protocol revision literal sent in every request envelope.
pub const JSON_RPC_VERSION: &str = "1.1";

/// How many of the values in a response's `result` array the caller wants.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResultArity {
    /// Unwrap the first element of the `result` array
    Single,

    /// Return the whole `result` array as-is
    Multiple,
}

impl ResultArity {
    /// Apply this arity to the `result` member of a successful response.
    pub(crate) fn unwrap_result(self, result: Value, status: u16) -> Result<Value> {
        match (self, result) {
            (ResultArity::Multiple, result) => Ok(result),
            (ResultArity::Single, Value::Array(values)) => {
                Ok(values.into_iter().next().unwrap_or(Value::Null))
            }
            (ResultArity::Single, other) => MalformedResponseSnafu {
                status,
                reason: format!("expected 'result' to be an array, got {other}"),
            }
            .fail(),
        }
    }
}

/// A single JSON-RPC 1.1 request envelope.
///
/// Built fresh for every call and thrown away as soon as it's serialized.  The `id` is only there
/// to correlate log events; each HTTP request gets exactly one response so there's nothing to
/// match it against.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    method: &'a str,
    params: &'a [Value],
    version: &'static str,
    id: String,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a [Value]) -> Self {
        Self::with_id(method, params, uuid::Uuid::now_v7().to_string())
    }

    pub fn with_id(method: &'a str, params: &'a [Value], id: impl Into<String>) -> Self {
        Self {
            method,
            params,
            version: JSON_RPC_VERSION,
            id: id.into(),
        }
    }

    pub fn method(&self) -> &str {
        self.method
    }

    pub fn params(&self) -> &[Value] {
        self.params
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context(InvalidRequestSnafu {
            method: self.method,
        })
    }
}

/// A parsed response body.
#[derive(Clone, Debug, PartialEq)]
pub enum RpcResponse {
    Success { result: Value },
    Error { error: Value },
}

impl RpcResponse {
    /// Interpret a parsed response body that arrived with a non-error status.
    ///
    /// A non-null `error` member wins over `result`, since some servers send both with one of
    /// them set to `null`.  Returns `None` if the body isn't an object or has neither member.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut members) = value else {
            return None;
        };

        match (members.remove("result"), members.remove("error")) {
            (_, Some(error)) if !error.is_null() => Some(RpcResponse::Error { error }),
            (Some(result), _) => Some(RpcResponse::Success { result }),
            _ => None,
        }
    }

    /// Interpret a parsed response body that arrived with an error status.
    ///
    /// Any `error` member makes this a service error, including `"error": null`.  A `result` is
    /// never a success here.
    pub fn from_error_value(value: Value) -> Option<Self> {
        let Value::Object(mut members) = value else {
            return None;
        };

        members
            .remove("error")
            .map(|error| RpcResponse::Error { error })
    }
}

/// Turn the status and raw body of an HTTP response into the outcome of the call.
///
/// A zero-length body on a non-error status is a success with a `null` result, while an empty
/// body on an error status is malformed.  Anything else has to be JSON.
pub fn classify_response(status: u16, body: &[u8], arity: ResultArity) -> Result<Value> {
    let error_status = status >= 500;

    if body.is_empty() {
        if error_status {
            return MalformedResponseSnafu {
                status,
                reason: "empty response body",
            }
            .fail();
        }
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| RpcError::MalformedResponse {
        status,
        reason: format!("response body is not valid JSON: {e}"),
    })?;

    if error_status {
        return match RpcResponse::from_error_value(value) {
            Some(RpcResponse::Error { error }) => ServiceSnafu {
                status,
                detail: error,
            }
            .fail(),
            _ => MalformedResponseSnafu {
                status,
                reason: "error status without an 'error' member",
            }
            .fail(),
        };
    }

    match RpcResponse::from_value(value) {
        Some(RpcResponse::Error { error }) => ServiceSnafu {
            status,
            detail: error,
        }
        .fail(),
        Some(RpcResponse::Success { result }) => arity.unwrap_result(result, status),
        None => MalformedResponseSnafu {
            status,
            reason: "response has neither a 'result' nor an 'error' member",
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn request_envelope_shape() {
        let params = vec![json!("obj1"), json!("Genome"), json!("ws1")];
        let request = RpcRequest::with_id("workspaceService.get_object", &params, "12345");
        let json = String::from_utf8(request.to_json().unwrap()).unwrap();
        expect_test::expect![[r#"{"method":"workspaceService.get_object","params":["obj1","Genome","ws1"],"version":"1.1","id":"12345"}"#]]
            .assert_eq(&json);
    }

    #[test]
    fn request_params_are_verbatim() {
        let params = vec![
            json!({"id": "x", "nested": [1, 2, 3]}),
            json!(null),
            json!(3.5),
            json!([]),
        ];
        let request = RpcRequest::new("workspaceService.save_object", &params);
        let value: Value = serde_json::from_slice(&request.to_json().unwrap()).unwrap();

        assert_eq!(value["method"], json!("workspaceService.save_object"));
        assert_eq!(value["params"], Value::Array(params.clone()));
        assert_eq!(value["version"], json!("1.1"));
        assert_eq!(value["id"], json!(request.id()));
    }

    #[test]
    fn serialization_is_stable_apart_from_id() {
        let params = vec![json!("a"), json!({"b": [1, {"c": null}]})];
        let first: Value =
            serde_json::from_slice(&RpcRequest::new("svc.op", &params).to_json().unwrap()).unwrap();
        let second: Value =
            serde_json::from_slice(&RpcRequest::new("svc.op", &params).to_json().unwrap()).unwrap();

        for field in ["method", "params", "version"] {
            assert_eq!(
                serde_json::to_vec(&first[field]).unwrap(),
                serde_json::to_vec(&second[field]).unwrap()
            );
        }
        assert_ne!(first["id"], second["id"]);
    }

    #[test]
    fn empty_params_serialize_as_empty_array() {
        let request = RpcRequest::with_id("workspaceService.list_workspaces", &[], "1");
        let value: Value = serde_json::from_slice(&request.to_json().unwrap()).unwrap();
        assert_eq!(value["params"], json!([]));
    }

    #[test]
    fn single_arity_unwraps_first_element() {
        let result = classify_response(200, br#"{"result": [42]}"#, ResultArity::Single).unwrap();
        assert_eq!(result, json!(42));
    }

    #[test]
    fn multiple_arity_returns_whole_array() {
        let body = br#"{"result": [{"id":"obj1"}, {"meta":"m"}]}"#;
        let result = classify_response(200, body, ResultArity::Multiple).unwrap();
        assert_eq!(result, json!([{"id": "obj1"}, {"meta": "m"}]));
    }

    #[test]
    fn single_arity_of_empty_array_is_null() {
        let result = classify_response(200, br#"{"result": []}"#, ResultArity::Single).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn single_arity_of_non_array_is_malformed() {
        let err = classify_response(200, br#"{"result": 7}"#, ResultArity::Single).unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 200, .. });
    }

    #[test]
    fn error_status_with_error_member_is_service_error() {
        let err = classify_response(500, br#"{"error":"not found"}"#, ResultArity::Single)
            .unwrap_err();
        assert_matches!(err, RpcError::ServiceError { status: 500, ref detail } if detail == &json!("not found"));
    }

    #[test]
    fn error_member_wins_over_null_result() {
        let body = br#"{"version":"1.1","result":null,"error":{"message":"boom","code":-32500}}"#;
        let err = classify_response(500, body, ResultArity::Single).unwrap_err();
        assert_eq!(err.service_message(), Some("boom"));
    }

    #[test]
    fn error_status_with_null_error_is_service_error() {
        for body in [&br#"{"error": null}"#[..], &br#"{"result": null, "error": null}"#[..]] {
            let err = classify_response(500, body, ResultArity::Single).unwrap_err();
            assert_matches!(err, RpcError::ServiceError { status: 500, detail: Value::Null });
        }
    }

    #[test]
    fn null_error_beside_result_is_success_on_ok_status() {
        let body = br#"{"version":"1.1","result":[{"id":"obj1"}],"error":null}"#;
        let result = classify_response(200, body, ResultArity::Single).unwrap();
        assert_eq!(result, json!({"id": "obj1"}));
    }

    #[test]
    fn error_status_with_empty_body_is_malformed() {
        for body in [&b""[..], &b"  \n"[..]] {
            let err = classify_response(503, body, ResultArity::Single).unwrap_err();
            assert_matches!(err, RpcError::MalformedResponse { status: 503, .. });
        }
    }

    #[test]
    fn error_status_with_garbage_body_is_malformed() {
        let err = classify_response(500, b"<html>Internal Server Error</html>", ResultArity::Single)
            .unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 500, .. });
    }

    #[test]
    fn error_status_with_result_only_is_malformed() {
        let err = classify_response(500, br#"{"result": [1]}"#, ResultArity::Single).unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 500, .. });
    }

    #[test]
    fn empty_body_on_success_is_null() {
        let result = classify_response(200, b"", ResultArity::Single).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn whitespace_body_on_success_is_malformed() {
        let err = classify_response(200, b" \r\n", ResultArity::Single).unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 200, .. });
    }

    #[test]
    fn garbage_body_on_success_is_malformed() {
        let err = classify_response(200, b"not json", ResultArity::Multiple).unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 200, .. });
    }

    #[test]
    fn body_without_result_or_error_is_malformed() {
        let err = classify_response(200, br#"{"id": "1"}"#, ResultArity::Single).unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 200, .. });

        let err = classify_response(200, b"[1, 2]", ResultArity::Single).unwrap_err();
        assert_matches!(err, RpcError::MalformedResponse { status: 200, .. });
    }

    #[test]
    fn error_member_on_non_error_status_is_service_error() {
        let err = classify_response(400, br#"{"error": {"message": "bad"}}"#, ResultArity::Single)
            .unwrap_err();
        assert_matches!(err, RpcError::ServiceError { status: 400, .. });
    }

    #[test]
    fn arity_parses_from_str() {
        assert_eq!("single".parse::<ResultArity>().unwrap(), ResultArity::Single);
        assert_eq!("multiple".parse::<ResultArity>().unwrap(), ResultArity::Multiple);
        assert_eq!(ResultArity::Multiple.to_string(), "multiple");
    }
}
