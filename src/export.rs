//! Cypher DUMP export — serialize a graph as Cypher statements.
//!
//! Produces a script loadable into any Cypher-compatible database. The
//! reserved reification key is the one layer-internal artifact in the store
//! and is never emitted; shadow nodes are exported as plain nodes.

use std::io::Write;
use crate::model::*;
use crate::storage::StorageBackend;
use crate::tx::TxMode;
use crate::typed::is_reserved_key;
use crate::Result;

/// Export a graph as a Cypher DUMP script.
///
/// Writes CREATE statements for all nodes and relationships in the graph.
pub async fn export_cypher_dump<B: StorageBackend>(
    backend: &B,
    writer: &mut dyn Write,
) -> Result<()> {
    let tx = backend.begin_tx(TxMode::ReadOnly).await?;

    // Header
    writeln!(writer, "// typed-graph Cypher DUMP")?;
    writeln!(writer, "// Nodes: {}", backend.node_count(&tx).await?)?;
    writeln!(writer, "// Relationships: {}", backend.relationship_count(&tx).await?)?;
    writeln!(writer)?;

    // Export all nodes
    let nodes = backend.all_nodes(&tx).await?;
    for node in &nodes {
        let props_str = format_properties(&node.properties);

        writeln!(
            writer,
            "CREATE (n {{_id: {}{}}});",
            node.id.0,
            if props_str.is_empty() { String::new() } else { format!(", {}", props_str) }
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "// Relationships")?;

    // Export all relationships
    for node in &nodes {
        let rels = backend.get_relationships(
            &tx,
            node.id,
            Direction::Outgoing,
            None,
        ).await?;

        for rel in rels {
            let props_str = format_properties(&rel.properties);
            let props_part = if props_str.is_empty() {
                String::new()
            } else {
                format!(" {{{}}}", props_str)
            };

            writeln!(
                writer,
                "MATCH (a {{_id: {}}}), (b {{_id: {}}}) CREATE (a)-[:{}{}]->(b);",
                rel.src.0,
                rel.dst.0,
                rel.rel_type,
                props_part,
            )?;
        }
    }

    backend.commit_tx(tx).await?;
    Ok(())
}

/// Format a PropertyMap as Cypher property string (key: value, ...).
fn format_properties(props: &PropertyMap) -> String {
    let mut parts = Vec::new();
    for (key, value) in props.iter() {
        // The reserved key stays inside the layer.
        if is_reserved_key(key) {
            continue;
        }
        parts.push(format!("{}: {}", key, format_value(value)));
    }
    parts.sort();
    parts.join(", ")
}

/// Format a Value as a Cypher literal.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{}", f),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Bytes(b) => {
            let inner: Vec<String> = b.iter().map(|x| x.to_string()).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::List(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Map(m) => {
            let inner: Vec<String> = m.iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        Value::DateTime(dt) => format!("datetime('{}')", dt.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::String("hello".into())), "'hello'");
        assert_eq!(format_value(&Value::Int(42)), "42");
        assert_eq!(format_value(&Value::Float(3.14)), "3.14");
        assert_eq!(format_value(&Value::Bool(true)), "true");
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&Value::Bytes(vec![1, 2])), "[1, 2]");
    }

    #[test]
    fn test_format_properties_skips_reserved_key() {
        let mut props = PropertyMap::new();
        props.insert("name".into(), Value::String("Ada".into()));
        props.insert(
            "typed_graph.internal.shadow_node_id".into(),
            Value::Int(7),
        );
        let result = format_properties(&props);
        assert!(result.contains("name: 'Ada'"));
        assert!(!result.contains("shadow_node_id"));
    }
}
