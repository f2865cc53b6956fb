use serde_json::Value;

use super::{ConfigError, ConfigState, Endpoint, Topology};

/// Key hosts may nest the plugin's settings under.
const NAMESPACE_KEY: &str = "redis";

/// Resolves host-supplied settings into a topology.
///
/// - absent or `null` settings resolve to `None`
/// - an object with a truthy `redis` key is unwrapped to that value first
/// - strings are parsed as JSON exactly once
/// - arrays become a [`Topology::Cluster`], objects a [`Topology::Single`]
///
/// # Examples
///
/// ```
/// use coolredis_core::config::{resolve, Topology};
/// use serde_json::json;
///
/// let single = resolve(Some(&json!({"host": "localhost", "port": 6379, "db": 0}))).unwrap();
/// assert!(matches!(single, Some(Topology::Single(_))));
///
/// let cluster = resolve(Some(&json!("[{\"port\": 7000}]"))).unwrap();
/// assert!(matches!(cluster, Some(Topology::Cluster(nodes)) if nodes.len() == 1));
///
/// assert_eq!(resolve(None).unwrap(), None);
/// ```
pub fn resolve(value: Option<&Value>) -> Result<Option<Topology>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match unwrap_namespace(value) {
        Value::String(raw) => {
            let parsed: Value =
                serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
            if parsed.is_string() {
                return Err(ConfigError::UnsupportedShape("string"));
            }
            topology_from(&parsed)
        }
        other => topology_from(other),
    }
}

/// Same as [`resolve`], folded into a [`ConfigState`].
pub fn resolve_state(value: Option<&Value>) -> ConfigState {
    match resolve(value) {
        Ok(Some(topology)) => ConfigState::Resolved(topology),
        Ok(None) => ConfigState::Missing,
        Err(e) => ConfigState::Invalid(e),
    }
}

fn unwrap_namespace(value: &Value) -> &Value {
    match value.get(NAMESPACE_KEY) {
        Some(inner) if is_truthy(inner) => inner,
        _ => value,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn topology_from(value: &Value) -> Result<Option<Topology>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(nodes) => {
            let endpoints = nodes
                .iter()
                .map(endpoint_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Topology::Cluster(endpoints)))
        }
        Value::Object(_) => endpoint_from(value).map(|e| Some(Topology::Single(e))),
        Value::Bool(_) => Err(ConfigError::UnsupportedShape("boolean")),
        Value::Number(_) => Err(ConfigError::UnsupportedShape("number")),
        Value::String(_) => Err(ConfigError::UnsupportedShape("string")),
    }
}

fn endpoint_from(value: &Value) -> Result<Endpoint, ConfigError> {
    let endpoint: Endpoint = serde_json::from_value(value.clone())
        .map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
    endpoint.validate()?;
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_resolve_to_none() {
        assert_eq!(resolve(None).unwrap(), None);
        assert_eq!(resolve(Some(&Value::Null)).unwrap(), None);
        assert_eq!(resolve(Some(&json!("null"))).unwrap(), None);
    }

    #[test]
    fn test_object_selects_single() {
        let topology = resolve(Some(&json!({"host": "localhost", "port": 6379, "db": 0})))
            .unwrap()
            .unwrap();
        assert_eq!(
            topology,
            Topology::Single(Endpoint::new("localhost", 6379))
        );
    }

    #[test]
    fn test_sequence_selects_cluster() {
        let topology = resolve(Some(&json!([
            {"host": "10.0.0.1", "port": 7000},
            {"host": "10.0.0.2", "port": 7001}
        ])))
        .unwrap()
        .unwrap();

        let Topology::Cluster(nodes) = topology else {
            panic!("expected cluster topology");
        };
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].host, "10.0.0.1");
        assert_eq!(nodes[1].port, 7001);
    }

    #[test]
    fn test_empty_sequence_is_still_cluster() {
        assert_eq!(
            resolve(Some(&json!([]))).unwrap(),
            Some(Topology::Cluster(vec![]))
        );
    }

    #[test]
    fn test_string_is_parsed_once() {
        let single = resolve(Some(&json!(r#"{"host":"cache","port":6380}"#)))
            .unwrap()
            .unwrap();
        assert_eq!(single, Topology::Single(Endpoint::new("cache", 6380)));

        let cluster = resolve(Some(&json!(r#"[{"port":7000}]"#))).unwrap().unwrap();
        assert!(cluster.is_cluster());
    }

    #[test]
    fn test_double_encoded_string_is_rejected() {
        let encoded = serde_json::to_string(r#"{"host":"cache"}"#).unwrap();
        assert_eq!(
            resolve(Some(&Value::String(encoded))),
            Err(ConfigError::UnsupportedShape("string"))
        );
    }

    #[test]
    fn test_malformed_string() {
        assert!(matches!(
            resolve(Some(&json!("{not json"))),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_namespace_key_is_unwrapped() {
        let nested = resolve(Some(&json!({"redis": {"host": "nested", "port": 6379}})))
            .unwrap()
            .unwrap();
        assert_eq!(nested, Topology::Single(Endpoint::new("nested", 6379)));

        let nested_cluster = resolve(Some(&json!({"redis": [{"port": 7000}]})))
            .unwrap()
            .unwrap();
        assert!(nested_cluster.is_cluster());

        let nested_string = resolve(Some(&json!({"redis": "[]"}))).unwrap().unwrap();
        assert_eq!(nested_string, Topology::Cluster(vec![]));
    }

    #[test]
    fn test_falsy_namespace_key_is_ignored() {
        // The outer object is used as-is, so `redis` is just an unknown field.
        let topology = resolve(Some(&json!({"redis": false, "host": "outer"})))
            .unwrap()
            .unwrap();
        assert_eq!(topology, Topology::Single(Endpoint::new("outer", 6379)));
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(
            resolve(Some(&json!(42))),
            Err(ConfigError::UnsupportedShape("number"))
        );
        assert_eq!(
            resolve(Some(&json!(true))),
            Err(ConfigError::UnsupportedShape("boolean"))
        );
        assert_eq!(
            resolve(Some(&json!("7"))),
            Err(ConfigError::UnsupportedShape("number"))
        );
    }

    #[test]
    fn test_invalid_endpoint_in_cluster() {
        assert!(matches!(
            resolve(Some(&json!([{"port": 7000}, {"port": "not-a-port"}]))),
            Err(ConfigError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            resolve(Some(&json!({"host": ""}))),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_resolve_state() {
        assert_eq!(resolve_state(None), ConfigState::Missing);
        assert!(matches!(
            resolve_state(Some(&json!(1))),
            ConfigState::Invalid(ConfigError::UnsupportedShape("number"))
        ));
        assert!(matches!(
            resolve_state(Some(&json!([]))),
            ConfigState::Resolved(Topology::Cluster(_))
        ));
    }
}
