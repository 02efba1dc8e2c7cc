//! `Runtime` domain payloads: expression evaluation and remote objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for `Runtime.evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
	/// JavaScript expression to evaluate
	pub expression: String,
	/// Serialize the result by value instead of returning an object handle
	pub return_by_value: bool,
	/// Await the result if it is a promise
	pub await_promise: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context_id: Option<i64>,
}

impl EvaluateParams {
	/// By-value evaluation that awaits promises.
	pub fn by_value(expression: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			return_by_value: true,
			await_promise: true,
			context_id: None,
		}
	}
}

/// Mirror of a JavaScript value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	/// `object`, `function`, `undefined`, `string`, `number`, `boolean`, `symbol` or `bigint`
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,
	/// Primitive value or by-value serialization
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	/// `NaN`, `Infinity`, `-Infinity`, `-0` or a bigint literal
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unserializable_value: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_id: Option<String>,
}

impl RemoteObject {
	/// JavaScript truthiness of the mirrored value.
	pub fn is_truthy(&self) -> bool {
		if let Some(unserializable) = &self.unserializable_value {
			return !matches!(unserializable.as_str(), "NaN" | "-0" | "0n");
		}
		match self.kind.as_str() {
			"undefined" => false,
			"boolean" => self.value.as_ref().and_then(Value::as_bool).unwrap_or(false),
			"number" => self.value.as_ref().and_then(Value::as_f64).is_some_and(|n| n != 0.0),
			"string" => self.value.as_ref().and_then(Value::as_str).is_some_and(|s| !s.is_empty()),
			"object" => self.subtype.as_deref() != Some("null"),
			_ => true,
		}
	}

	/// The by-value result, or `null` for `undefined` and handles.
	pub fn into_value(self) -> Value {
		self.value.unwrap_or(Value::Null)
	}
}

/// Details of an exception thrown during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
	#[serde(default)]
	pub exception_id: i64,
	/// Short message, usually `Uncaught`
	pub text: String,
	#[serde(default)]
	pub line_number: i64,
	#[serde(default)]
	pub column_number: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	/// The thrown value
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
	/// Best available message: the thrown value's description, else `text`.
	pub fn message(&self) -> String {
		self.exception
			.as_ref()
			.and_then(|exception| exception.description.clone())
			.unwrap_or_else(|| self.text.clone())
	}
}

/// Result document of `Runtime.evaluate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
	pub result: RemoteObject,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception_details: Option<ExceptionDetails>,
}
