//! Translation of loosely typed, caller-facing JSON input into the engine's typed API.
//!
//! Accepts the shapes a scripting host would pass: numbers or strings for positions, per-axis
//! hashes with alias keys, camelCase option keys, `queue: false` for immediate scrolls and
//! `ignoreUser: true | "scroll" | "click"`.

use serde_json::Value;

use scrollable::{
    AxisPositions, ExitCallback, IgnoreUser, LockSpeed, Position, PositionValue, QueueName,
    QueueSelection, Result, ScrollError, ScrollOptions, StopOptions,
};

/// Named durations, as understood by jQuery-style hosts.
pub const FAST_MS: u64 = 200;
pub const SLOW_MS: u64 = 600;

/// Converts a position argument.
///
/// `null`, `false` and `""` request no move; objects are per-axis hashes keyed by axis aliases.
pub fn position_from_json(value: &Value) -> Result<Position> {
    match value {
        Value::Object(map) => {
            let pairs = map
                .iter()
                .map(|(key, v)| Ok((key.as_str(), value_from_json(v)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Position::Axes(AxisPositions::from_pairs(pairs)?))
        }
        other => Ok(Position::Value(value_from_json(other)?)),
    }
}

fn value_from_json(value: &Value) -> Result<PositionValue> {
    match value {
        Value::Null | Value::Bool(false) => Ok(PositionValue::Empty),
        Value::Number(n) => n
            .as_f64()
            .map(PositionValue::Number)
            .ok_or_else(|| ScrollError::InvalidPosition(n.to_string())),
        Value::String(s) => Ok(PositionValue::Text(s.clone())),
        other => Err(ScrollError::InvalidPosition(other.to_string())),
    }
}

/// Converts a `scrollTo` options hash. `null` yields the defaults; unknown keys are ignored.
pub fn options_from_json(value: &Value) -> Result<ScrollOptions> {
    let mut options = ScrollOptions::new();
    let map = match value {
        Value::Null => return Ok(options),
        Value::Object(map) => map,
        other => return Err(not_an_object("options", other)),
    };

    for (key, v) in map {
        match key.as_str() {
            "axis" => {
                let axis = v.as_str().ok_or_else(|| ScrollError::InvalidAxisName(v.to_string()))?;
                options.axis = Some(axis.to_owned());
            }
            "queue" => options.queue = Some(queue_from_json(v)?),
            "duration" => options.duration_ms = duration_from_json(v)?,
            "ignoreUser" => options.ignore_user = Some(ignore_user_from_json(v)?),
            "userScrollThreshold" => {
                let threshold = v.as_f64().ok_or_else(|| ScrollError::InvalidOption {
                    option: "userScrollThreshold",
                    reason: format!("expected a number, got {v}"),
                })?;
                options.user_scroll_threshold = Some(threshold);
            }
            "lockSpeedBelow" => options.lock_speed_below = Some(lock_speed_from_json(v)),
            "append" => options.append = truthy(v),
            "merge" => options.merge = truthy(v),
            "notifyCancelled" => options.notify_cancelled = (!v.is_null()).then(|| v.clone()),
            _ => {
                adebug!(key = %key, "ignoring option");
            }
        }
    }
    Ok(options)
}

/// Converts a `stopScroll` options hash (`jumpToTargetPosition`, `notifyCancelled`, `queue`).
pub fn stop_options_from_json(value: &Value) -> Result<StopOptions> {
    let mut options = StopOptions::new();
    let map = match value {
        Value::Null => return Ok(options),
        Value::Object(map) => map,
        other => return Err(not_an_object("options", other)),
    };
    if let Some(v) = map.get("jumpToTargetPosition") {
        options.jump_to_target_position = truthy(v);
    }
    if let Some(v) = map.get("notifyCancelled").filter(|v| !v.is_null()) {
        options.notify_cancelled = Some(v.clone());
    }
    if let Some(v) = map.get("queue") {
        options.queue = Some(queue_from_json(v)?);
    }
    Ok(options)
}

/// Converts a callback-name argument: `null` (all four), a name, a space- or comma-separated
/// list, or an array of names.
pub fn callbacks_from_json(value: &Value) -> Result<Option<Vec<ExitCallback>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => s
            .split([' ', ','])
            .filter(|name| !name.is_empty())
            .map(str::parse::<ExitCallback>)
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| ScrollError::InvalidOption {
                        option: "callbacks",
                        reason: format!("expected a callback name, got {item}"),
                    })?
                    .parse::<ExitCallback>()
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        other => Err(ScrollError::InvalidOption {
            option: "callbacks",
            reason: format!("expected a name or a list of names, got {other}"),
        }),
    }
}

/// Converts a queue argument: `false` for immediate scrolls, `"fx"` for the host's default
/// effects queue, any other string for a caller-managed queue. `null`/`true` keep the engine's
/// own queue.
pub fn queue_from_json(value: &Value) -> Result<QueueSelection> {
    match value {
        Value::Null | Value::Bool(true) => Ok(QueueSelection::Queued(QueueName::Internal)),
        Value::Bool(false) => Ok(QueueSelection::Unqueued),
        Value::String(s) if s == "fx" => Ok(QueueSelection::Queued(QueueName::Default)),
        Value::String(s) => Ok(QueueSelection::Queued(QueueName::named(s.as_str()))),
        other => Err(ScrollError::InvalidOption {
            option: "queue",
            reason: format!("expected a queue name or false, got {other}"),
        }),
    }
}

fn duration_from_json(value: &Value) -> Result<Option<u64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64().map(|ms| ms.max(0.0).round() as u64)),
        Value::String(s) => match s.as_str() {
            "fast" => Ok(Some(FAST_MS)),
            "slow" => Ok(Some(SLOW_MS)),
            // Unknown speed names fall back to the default duration.
            _ => Ok(None),
        },
        other => Err(ScrollError::InvalidOption {
            option: "duration",
            reason: format!("expected milliseconds or a speed name, got {other}"),
        }),
    }
}

fn ignore_user_from_json(value: &Value) -> Result<IgnoreUser> {
    match value {
        Value::Null => Ok(IgnoreUser::Never),
        Value::Bool(b) => Ok(IgnoreUser::from(*b)),
        Value::String(s) => s.parse(),
        other => Err(ScrollError::InvalidOption {
            option: "ignoreUser",
            reason: format!("expected true, \"scroll\" or \"click\", got {other}"),
        }),
    }
}

fn lock_speed_from_json(value: &Value) -> LockSpeed {
    match value {
        Value::Number(n) => n.as_f64().map_or(LockSpeed::Off, LockSpeed::Below),
        Value::String(s) => s.parse().unwrap_or(LockSpeed::Off),
        _ => LockSpeed::Off,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn not_an_object(option: &'static str, value: &Value) -> ScrollError {
    ScrollError::InvalidOption {
        option,
        reason: format!("expected an object, got {value}"),
    }
}
