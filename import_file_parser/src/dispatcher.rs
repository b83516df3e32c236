use serde_json::{Map, Number, Value};

use crate::error::DispatchError;
use crate::models::ParsedRow;
use crate::queue::QueueSender;

/// Columns sent as numbers rather than strings.
pub const NUMERIC_FIELDS: [&str; 2] = ["price", "count"];

pub struct RowDispatcher<Q> {
    queue: Q,
}

impl<Q: QueueSender> RowDispatcher<Q> {
    pub fn new(queue: Q) -> Self {
        RowDispatcher { queue }
    }

    /// Sends one row to the queue and returns its message id. An error here
    /// concerns this row only; callers log it and move on to the next row.
    pub async fn dispatch(&self, row: &ParsedRow) -> Result<String, DispatchError> {
        let body = serde_json::to_string(&build_message(row))?;
        let message_id = self
            .queue
            .send_message(body)
            .await
            .map_err(DispatchError::Send)?;
        message_id.ok_or(DispatchError::MissingMessageId)
    }
}

/// Copies every field of the row as a string, then overwrites the numeric
/// fields with their coerced value. A numeric field missing from the row is
/// added as if it were not a number.
pub fn build_message(row: &ParsedRow) -> Map<String, Value> {
    let mut message = row
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect::<Map<_, _>>();
    for field in NUMERIC_FIELDS {
        let number = row.get(field).map_or(f64::NAN, |raw| coerce_number(raw));
        message.insert(field.to_string(), number_value(number));
    }
    message
}

/// Loose string-to-number conversion: surrounding whitespace is ignored, a
/// blank string is zero, and anything that is not a plain decimal literal
/// is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let is_decimal_literal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_decimal_literal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral values become JSON integers. JSON has no NaN or infinity, so
/// those become null.
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
