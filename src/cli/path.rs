use std::path::Path;

use anyhow::Result;
use tessera::knowledge::paths::{find_path, ConnectionPath, PathStep};

use super::{input, Output};

/// Print the shortest connection between two nodes of an edge dump.
pub fn run(edges_path: &Path, from: &str, to: &str, max_depth: usize, output: Output) -> Result<()> {
    let edges = input::load_edges(edges_path)?;
    let path = find_path(&edges, from, to, max_depth);

    output.emit(&path, |path: &Option<ConnectionPath>| match path {
        None => println!("No path from {from} to {to} within {max_depth} hop(s)."),
        Some(path) => {
            println!("{} hop(s): {}", path.len(), path.node_ids.join(" -> "));
            for step in &path.steps {
                println!("  {} {} {} [{}]", step.from, arrow(step), step.to, step.kind);
            }
        }
    })
}

/// Direction marker for one hop. Symmetric kinds read the same both ways.
fn arrow(step: &PathStep) -> &'static str {
    match (step.kind.is_directional(), step.forward) {
        (false, _) => "--",
        (true, true) => "->",
        (true, false) => "<-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera::knowledge::types::RelationKind;

    fn step(kind: RelationKind, forward: bool) -> PathStep {
        PathStep {
            from: "a".into(),
            to: "b".into(),
            edge_id: "e1".into(),
            kind,
            forward,
        }
    }

    #[test]
    fn test_arrow_only_for_directional_kinds() {
        assert_eq!(arrow(&step(RelationKind::Blocks, true)), "->");
        assert_eq!(arrow(&step(RelationKind::DerivedFrom, false)), "<-");
        assert_eq!(arrow(&step(RelationKind::RelatesTo, true)), "--");
        assert_eq!(arrow(&step(RelationKind::Duplicates, false)), "--");
    }
}
