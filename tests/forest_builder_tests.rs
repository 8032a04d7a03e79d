use schedule_tree::{
    Forest, ForestBuilder, Node, OrphanPolicy, Placement, build_forest,
};
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

fn csv(ids: &[&str]) -> String {
    let mut raw = String::from("ID,Name\r\n");
    for id in ids {
        raw.push_str(&format!("{id},Task {id}\r\n"));
    }
    raw
}

fn ids(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::id).collect()
}

#[test]
fn flat_input_yields_roots_in_order() {
    let forest = build_forest(&csv(&["1", "2", "3"]), ',');
    assert_eq!(ids(forest.roots()), ["1", "2", "3"]);
    assert!(forest.roots().iter().all(Node::is_leaf));
}

#[test]
fn one_level_of_nesting() {
    let forest = build_forest(&csv(&["1", "1.1", "1.2"]), ',');
    assert_eq!(forest.roots().len(), 1);
    let root = &forest.roots()[0];
    assert!(!root.is_leaf());
    assert_eq!(ids(root.children()), ["1.1", "1.2"]);
    assert!(root.children().iter().all(Node::is_leaf));
}

#[test]
fn deep_chain() {
    let forest = build_forest(&csv(&["1", "1.1", "1.1.1"]), ',');
    let root = &forest.roots()[0];
    let middle = &root.children()[0];
    let inner = &middle.children()[0];
    assert_eq!(root.children().len(), 1);
    assert_eq!(middle.children().len(), 1);
    assert_eq!(inner.id(), "1.1.1");
    assert!(inner.is_leaf());
    assert_eq!(inner.depth(), 3);
}

#[test]
fn orphan_is_promoted_to_root() {
    let build = ForestBuilder::new().build(&csv(&["1", "9.9", "1.1"])).unwrap();
    assert_eq!(ids(build.forest.roots()), ["1", "9.9"]);
    assert_eq!(
        build.placements[1].placement,
        Placement::Orphaned {
            parent_id: "9".into()
        }
    );
    assert_eq!(build.orphans().count(), 1);
}

/// Log sink shared between the subscriber and the test body.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn build_logged(policy: OrphanPolicy, raw: &str) -> (Forest, String) {
    let logs = LogBuffer::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let build = tracing::subscriber::with_default(subscriber, || {
        ForestBuilder::new().orphan_policy(policy).build(raw).unwrap()
    });
    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    (build.forest, text)
}

#[test]
fn warn_policy_promotes_and_logs() {
    let (forest, logs) = build_logged(OrphanPolicy::Warn, &csv(&["1", "9.9"]));
    assert_eq!(ids(forest.roots()), ["1", "9.9"]);
    assert_eq!(logs.matches("promoting record to root").count(), 1, "logs:\n{logs}");
    assert!(logs.contains("WARN"), "logs:\n{logs}");
    assert!(logs.contains("id=9.9") && logs.contains("parent_id=9"), "logs:\n{logs}");
}

#[test]
fn promote_policy_stays_silent() {
    let (forest, logs) = build_logged(OrphanPolicy::Promote, &csv(&["1", "9.9"]));
    assert_eq!(ids(forest.roots()), ["1", "9.9"]);
    assert!(logs.is_empty(), "unexpected logs:\n{logs}");
}

#[test]
fn parent_must_precede_child() {
    // "2" arrives after "2.1", so "2.1" is promoted and "2" stays childless.
    let forest = build_forest(&csv(&["2.1", "2"]), ',');
    assert_eq!(ids(forest.roots()), ["2.1", "2"]);
    assert!(forest.roots().iter().all(Node::is_leaf));
}

#[test]
fn sibling_order_follows_input_across_interleaving() {
    let forest = build_forest(&csv(&["1", "2", "1.1", "2.1", "1.2", "1.1.1", "2.2"]), ',');
    let one = forest.find("1").unwrap();
    let two = forest.find("2").unwrap();
    assert_eq!(ids(one.children()), ["1.1", "1.2"]);
    assert_eq!(ids(two.children()), ["2.1", "2.2"]);
    let walked: Vec<(usize, &str)> = forest.walk().map(|(l, n)| (l, n.id())).collect();
    assert_eq!(
        walked,
        [
            (0, "1"),
            (1, "1.1"),
            (2, "1.1.1"),
            (1, "1.2"),
            (0, "2"),
            (1, "2.1"),
            (1, "2.2")
        ]
    );
    assert_eq!(forest.len(), 7);
}

#[test]
fn children_present_iff_named_as_parent() {
    let input = ["1", "1.1", "1.1.1", "1.2", "2", "3.1", "3", "3.2", "3.2.1"];
    let build = ForestBuilder::new().build(&csv(&input)).unwrap();

    let named_parents: HashSet<&str> = build
        .placements
        .iter()
        .filter_map(|placed| match &placed.placement {
            Placement::Attached { parent_id } => Some(parent_id.as_str()),
            _ => None,
        })
        .collect();

    for (_, node) in build.forest.walk() {
        assert_eq!(
            !node.is_leaf(),
            named_parents.contains(node.id()),
            "node {}",
            node.id()
        );
    }
    assert_eq!(build.forest.len(), input.len());
}

#[test]
fn serialized_leaves_omit_children() {
    let forest = build_forest(&csv(&["1", "1.1"]), ',');
    let json = serde_json::to_value(&forest).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "data": { "ID": "1", "Name": "Task 1" },
                "children": [
                    { "data": { "ID": "1.1", "Name": "Task 1.1" } }
                ]
            }
        ])
    );
}

#[test]
fn rebuilding_is_idempotent() {
    let raw = csv(&["1", "1.1", "7.7", "2", "2.1", "1.2"]);
    assert_eq!(build_forest(&raw, ','), build_forest(&raw, ','));
}

#[test]
fn empty_and_header_only_inputs() {
    assert_eq!(build_forest("", ','), Forest::default());
    assert!(build_forest("ID,Name\r\n", ',').is_empty());
}

#[test]
fn custom_delimiter_and_separator() {
    let raw = "ID;Name\n1;Site\n1.1;Survey\n";
    let build = ForestBuilder::new()
        .delimiter(';')
        .line_separator("\n")
        .build(raw)
        .unwrap();
    let root = &build.forest.roots()[0];
    assert_eq!(root.data().get("Name"), Some("Site"));
    assert_eq!(ids(root.children()), ["1.1"]);
}

#[test]
fn missing_id_column_makes_everything_a_root() {
    let forest = build_forest("Name\r\nA\r\nB\r\n", ',');
    assert_eq!(forest.roots().len(), 2);
    assert_eq!(forest.roots()[0].id(), "");
}

#[test]
fn raw_values_are_kept_verbatim() {
    let forest = build_forest(
        "ID,Name,Start\r\n1, Pour slab ,2023-01-01T08:00:00\r\n",
        ',',
    );
    let data = forest.roots()[0].data();
    assert_eq!(data.get("Name"), Some(" Pour slab "));
    assert_eq!(data.get("Start"), Some("2023-01-01T08:00:00"));
}
