//! Canonical serialisation of values.
//!
//! Everything that crosses a process boundary goes through [`WireValue`]:
//! an owned, deeply copied mirror of [`Value`] with a fixed, tagged JSON
//! encoding. Shared cells are flattened (copy-by-value), and a hosting
//! instance travels as its proxy - the wire never carries a live object.

// Layer 1: Standard library imports
use std::collections::{BTreeMap, HashMap};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Layer 3: Internal module imports
use crate::ids::ActorId;
use crate::value::{PassiveInstance, Proxy, Value};

/// The portable form of a value.
///
/// Field maps are ordered so that equal values serialise to equal bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WireValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Void,
    Array(Vec<WireValue>),
    Passive {
        module: String,
        typename: String,
        fields: BTreeMap<String, WireValue>,
    },
    Proxy {
        actor_id: ActorId,
        home_env: String,
    },
    Io,
}

impl From<&Value> for WireValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(i) => Self::Int(*i),
            Value::Str(s) => Self::Str(s.clone()),
            Value::Bool(b) => Self::Bool(*b),
            Value::Void => Self::Void,
            Value::Array(items) => {
                Self::Array(items.lock().iter().map(WireValue::from).collect())
            }
            Value::Passive(cell) => {
                let instance = cell.lock();
                Self::Passive {
                    module: instance.module.clone(),
                    typename: instance.typename.clone(),
                    fields: instance
                        .fields()
                        .iter()
                        .map(|(name, value)| (name.clone(), WireValue::from(value)))
                        .collect(),
                }
            }
            Value::Active(instance) => {
                let proxy = instance.proxy();
                Self::Proxy {
                    actor_id: proxy.actor_id,
                    home_env: proxy.home_env,
                }
            }
            Value::Proxy(proxy) => Self::Proxy {
                actor_id: proxy.actor_id,
                home_env: proxy.home_env.clone(),
            },
            Value::Io => Self::Io,
        }
    }
}

impl From<WireValue> for Value {
    fn from(wire: WireValue) -> Self {
        match wire {
            WireValue::Int(i) => Self::Int(i),
            WireValue::Str(s) => Self::Str(s),
            WireValue::Bool(b) => Self::Bool(b),
            WireValue::Void => Self::Void,
            WireValue::Array(items) => {
                Self::array(items.into_iter().map(Value::from).collect())
            }
            WireValue::Passive {
                module,
                typename,
                fields,
            } => {
                let fields: HashMap<String, Value> = fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect();
                Self::passive(PassiveInstance::new(module, typename, fields))
            }
            WireValue::Proxy { actor_id, home_env } => Self::Proxy(Proxy { actor_id, home_env }),
            WireValue::Io => Self::Io,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireValue::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(WireValue::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::value::ActiveInstance;

    fn round_trip(value: &Value) -> WireValue {
        let json = serde_json::to_string(value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        let wire = WireValue::from(&back);
        assert_eq!(wire, WireValue::from(value));
        wire
    }

    #[test]
    fn test_round_trip_primitives() {
        round_trip(&Value::Int(-42));
        round_trip(&Value::Str("hello".to_string()));
        round_trip(&Value::Bool(true));
        round_trip(&Value::Void);
        round_trip(&Value::Io);
    }

    #[test]
    fn test_round_trip_array() {
        round_trip(&Value::array(vec![
            Value::Int(1),
            Value::array(vec![Value::Str("nested".to_string())]),
            Value::Void,
        ]));
    }

    #[test]
    fn test_round_trip_passive_instance() {
        let mut fields = HashMap::new();
        fields.insert("count".to_string(), Value::Int(7));
        fields.insert("label".to_string(), Value::Str("c".to_string()));
        round_trip(&Value::passive(PassiveInstance::new(
            "main".to_string(),
            "Counter".to_string(),
            fields,
        )));
    }

    #[test]
    fn test_round_trip_proxy() {
        round_trip(&Value::Proxy(Proxy {
            actor_id: ActorId::new(),
            home_env: "beta".to_string(),
        }));
    }

    #[test]
    fn test_passive_instances_are_copied_not_shared() {
        let original = Value::passive(PassiveInstance::new(
            "main".to_string(),
            "Box".to_string(),
            HashMap::new(),
        ));

        let json = serde_json::to_string(&original).unwrap();
        let copy: Value = serde_json::from_str(&json).unwrap();

        // Mutating the copy leaves the original untouched.
        if let Value::Passive(cell) = &copy {
            cell.lock().set_field("x", Value::Int(1));
        }
        if let Value::Passive(cell) = &original {
            assert!(cell.lock().get_field("x").is_err());
        }
    }

    #[test]
    fn test_hosting_instance_serialises_as_proxy() {
        let instance = Arc::new(ActiveInstance::new(
            "main".to_string(),
            "Worker".to_string(),
            ActorId::new(),
            "alpha".to_string(),
            HashMap::new(),
        ));
        let id = instance.actor_id;

        let json = serde_json::to_string(&Value::Active(instance)).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();

        let Value::Proxy(proxy) = back else {
            panic!("expected proxy");
        };
        assert_eq!(proxy.actor_id, id);
        assert_eq!(proxy.home_env, "alpha");
    }

    #[test]
    fn test_encoding_is_tagged_and_stable() {
        let json = serde_json::to_string(&Value::Int(5)).unwrap();
        assert_eq!(json, r#"{"kind":"int","value":5}"#);

        let json = serde_json::to_string(&Value::Void).unwrap();
        assert_eq!(json, r#"{"kind":"void"}"#);
    }
}
