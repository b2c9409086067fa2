//! A small document model built from fields and lists.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_bind::{BindError, EdgeField, NodeList};
use trellis_graph::Graph;

#[test]
fn test_document_model() {
    let mut graph = Graph::new();
    graph.register_subkind("Editor", "Person");
    let doc = graph.add_node("Document");
    let alice = graph.add_node("Person");
    let bob = graph.add_node("Editor");
    let section = graph.add_node("Section");

    let owner = EdgeField::outgoing("owner", "Person", "owner")
        .attach(&mut graph, doc)
        .unwrap();
    let sections = NodeList::outgoing(&mut graph, doc, "section", "Section", "sections").unwrap();
    let owned = NodeList::incoming(&mut graph, alice, "owner", "Document", "documents").unwrap();

    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    graph
        .on_property_change(doc, move |_, _, name| sink.borrow_mut().push(name.to_string()))
        .unwrap();

    owner.set(&mut graph, Some(alice)).unwrap();
    sections.push(&mut graph, section).unwrap();
    assert_eq!(owned.to_vec(&graph), vec![doc]);

    owner.set(&mut graph, Some(bob)).unwrap();
    assert!(owned.is_empty(&graph));
    assert_eq!(owner.get(&graph).unwrap(), Some(bob));
    assert_eq!(*changes.borrow(), vec!["owner", "sections", "owner", "owner"]);

    // Deleting the owner leaves the required field unset.
    graph.delete_node(bob).unwrap();
    assert!(matches!(owner.get(&graph), Err(BindError::Missing { .. })));
    assert_eq!(sections.to_vec(&graph), vec![section]);
}

#[test]
fn test_list_rejects_item_kind_through_raw_connect() {
    let mut graph = Graph::new();
    let doc = graph.add_node("Document");
    let stranger = graph.add_node("Person");
    let sections = NodeList::outgoing(&mut graph, doc, "section", "Section", "sections").unwrap();

    assert!(graph.connect(doc, stranger, "section").is_err());
    assert!(sections.is_empty(&graph));
    assert!(graph.node(stranger).unwrap().incoming().is_empty());
}
