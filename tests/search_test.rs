mod helpers;

use helpers::{node_at, now, progress};
use tessera::config::RelationsConfig;
use tessera::embedding::{EmbeddingProvider, HashingVectorizer};
use tessera::index::{ExactIndex, SharedIndex, VectorIndex};
use tessera::knowledge::paths::find_path;
use tessera::knowledge::relations::{rebuild_relationships, RelationshipScorer};
use tessera::knowledge::search::{NodeSearch, SearchOptions};
use tessera::knowledge::tags::TagCooccurrence;
use tessera::knowledge::types::{Node, NodeType};

fn corpus() -> Vec<Node> {
    vec![
        progress("hook", "git commit capture hook installed").with_tags(["git", "hooks"]),
        progress("cli", "command line flags for the capture tool").with_tags(["cli", "hooks"]),
        progress("boat", "sailboat hull measurements recorded").with_tags(["sailing"]),
        node_at(
            "why",
            NodeType::Decision,
            "capture commits through a post-commit hook",
            3,
        )
        .with_tags(["git", "design"]),
    ]
}

#[test]
fn search_finds_related_nodes_best_first() {
    let provider = HashingVectorizer::new(256);
    let nodes = corpus();
    let search = NodeSearch::exact(&provider, &nodes);

    let results = search.search(
        "commit capture hook",
        &nodes,
        &TagCooccurrence::from_nodes(&nodes),
        &SearchOptions::default(),
    );
    assert_eq!(results[0].id, "hook");
    assert!(results.iter().all(|r| r.id != "boat"));
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.iter().all(|r| r.score > 0.0 && r.score <= 1.0));
}

#[test]
fn tag_filter_expands_through_cooccurrence() {
    let nodes = corpus();
    let cooccurrence = TagCooccurrence::from_nodes(&nodes);
    assert_eq!(cooccurrence.count("git", "hooks"), 1);
    assert_eq!(cooccurrence.count("hooks", "cli"), 1);

    let expanded = cooccurrence.expand(&["git"], 5);
    assert_eq!(expanded, vec!["design", "hooks"]);
    assert!(cooccurrence.expand(&["sailing"], 5).is_empty());
}

#[test]
fn shared_index_serves_concurrent_readers() {
    let provider = HashingVectorizer::new(256);
    let index = SharedIndex::new(ExactIndex::new(provider.dimensions()));
    index.build(
        corpus()
            .iter()
            .map(|n| (n.id.clone(), provider.embed(&n.content)))
            .collect(),
    );

    let query = provider.embed("sailboat hull");
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = index.clone();
            let query = query.clone();
            std::thread::spawn(move || index.search(&query, 1))
        })
        .collect();
    for reader in readers {
        let hits = reader.join().unwrap();
        assert_eq!(hits[0].id, "boat");
    }

    let mut wrong_width = ExactIndex::new(128);
    wrong_width.add("x".into(), provider.embed("sailboat"));
    assert!(wrong_width.is_empty());
}

#[test]
fn rebuilt_edges_connect_through_a_shared_neighbor() {
    let nodes = corpus();
    let scorer = RelationshipScorer::from_config(256, &RelationsConfig::default());
    let report = rebuild_relationships(&nodes, &scorer, &RelationsConfig::default(), now());

    let path = find_path(&report.edges, "cli", "why", 3).expect("cli and why are connected");
    assert_eq!(path.node_ids.first().map(String::as_str), Some("cli"));
    assert_eq!(path.node_ids.last().map(String::as_str), Some("why"));
    assert_eq!(path.steps.len(), path.node_ids.len() - 1);
    assert!(find_path(&report.edges, "cli", "boat", 3).is_none());
}
