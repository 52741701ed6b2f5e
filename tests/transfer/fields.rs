//! Integration tests for field transfer
//!
//! Primitives, narrowing, containers, and `impl_transfer!`.

use scenery_foundation::{AssetId, ErrorKind};
use scenery_transfer::{
    Document, DocumentWriter, Node, Serializer, SerializerExt, Transfer, impl_transfer,
};

#[derive(Debug, Clone, PartialEq, Default)]
struct Stats {
    level: u8,
    hp: i32,
    speed: f32,
    name: String,
    alive: bool,
    tags: Vec<String>,
    color: [f32; 4],
    parent: Option<AssetId>,
}

impl_transfer!(Stats {
    level,
    hp,
    speed,
    name,
    alive,
    tags,
    color,
    parent,
});

#[derive(Debug, Clone, PartialEq, Default)]
struct Waypoint {
    x: f64,
    y: f64,
}

impl_transfer!(Waypoint { x, y });

#[derive(Debug, Clone, PartialEq, Default)]
struct Route {
    points: Vec<Waypoint>,
}

impl Transfer for Route {
    fn transfer<S: Serializer + ?Sized>(&mut self, serializer: &mut S) -> scenery_transfer::Result<()> {
        serializer.vector(&mut self.points, "points")
    }
}

fn sample() -> Stats {
    Stats {
        level: 12,
        hp: -4,
        speed: 1.5,
        name: "Scout".into(),
        alive: true,
        tags: vec!["fast".into(), "small".into()],
        color: [1.0, 0.5, 0.25, 1.0],
        parent: Some(AssetId::new(77)),
    }
}

fn save<T: Transfer>(value: &mut T, name: &str) -> Document {
    let mut writer = DocumentWriter::new();
    writer.object(value, name).unwrap();
    writer.finish().unwrap()
}

fn load<T: Transfer + Default>(doc: &Document, name: &str) -> scenery_transfer::Result<T> {
    let mut value = T::default();
    doc.reader().object(&mut value, name)?;
    Ok(value)
}

fn object(fields: Vec<(&str, Node)>) -> Node {
    Node::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

// =============================================================================
// Saving
// =============================================================================

#[test]
fn save_writes_named_fields() {
    let doc = save(&mut sample(), "Stats");

    assert_eq!(doc.root.pointer("Stats/level"), Some(&Node::UInt(12)));
    assert_eq!(doc.root.pointer("Stats/hp"), Some(&Node::Int(-4)));
    assert_eq!(doc.root.pointer("Stats/speed"), Some(&Node::Float(1.5)));
    assert_eq!(doc.root.pointer("Stats/name"), Some(&Node::Text("Scout".into())));
    assert_eq!(doc.root.pointer("Stats/alive"), Some(&Node::Bool(true)));
    assert_eq!(doc.root.pointer("Stats/tags/1"), Some(&Node::Text("small".into())));
    assert_eq!(doc.root.pointer("Stats/color/2"), Some(&Node::Float(0.25)));
    assert_eq!(doc.root.pointer("Stats/parent"), Some(&Node::UInt(77)));
}

#[test]
fn none_is_not_written() {
    let mut stats = Stats {
        parent: None,
        ..sample()
    };
    let doc = save(&mut stats, "Stats");
    assert!(doc.root.pointer("Stats/parent").is_none());
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn saved_fields_load_back() {
    let doc = save(&mut sample(), "Stats");
    let loaded: Stats = load(&doc, "Stats").unwrap();
    assert_eq!(loaded, sample());
}

#[test]
fn missing_fields_keep_defaults() {
    let doc = Document::new(object(vec![("Stats", object(vec![("hp", Node::Int(9))]))]));
    let loaded: Stats = load(&doc, "Stats").unwrap();
    assert_eq!(loaded.hp, 9);
    assert_eq!(loaded.level, 0);
    assert!(loaded.name.is_empty());
    assert_eq!(loaded.parent, None);
}

#[test]
fn missing_object_is_skipped() {
    let doc = Document::new(object(vec![]));
    let loaded: Stats = load(&doc, "Stats").unwrap();
    assert_eq!(loaded, Stats::default());
}

#[test]
fn short_array_keeps_trailing_values() {
    let doc = Document::new(object(vec![(
        "Stats",
        object(vec![("color", Node::Array(vec![Node::Float(0.5), Node::Int(0)]))]),
    )]));

    let mut stats = Stats {
        color: [1.0; 4],
        ..Stats::default()
    };
    doc.reader().object(&mut stats, "Stats").unwrap();
    assert_eq!(stats.color, [0.5, 0.0, 1.0, 1.0]);
}

#[test]
fn vector_load_replaces_contents() {
    let mut route = Route {
        points: vec![Waypoint { x: 1.0, y: 2.0 }, Waypoint { x: 3.0, y: 4.0 }],
    };
    let doc = save(&mut route, "Route");
    assert_eq!(doc.root.pointer("Route/points/1/x"), Some(&Node::Float(3.0)));

    let mut target = Route {
        points: vec![Waypoint::default(); 5],
    };
    doc.reader().object(&mut target, "Route").unwrap();
    assert_eq!(target, route);
}

// =============================================================================
// Range and type checks
// =============================================================================

#[test]
fn narrow_integer_overflow_is_out_of_range() {
    let doc = Document::new(object(vec![("Stats", object(vec![("level", Node::UInt(300))]))]));
    let err = load::<Stats>(&doc, "Stats").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OutOfRange { ref field, .. } if field == "level"));
}

#[test]
fn negative_into_unsigned_is_out_of_range() {
    let doc = Document::new(object(vec![("Stats", object(vec![("level", Node::Int(-1))]))]));
    let err = load::<Stats>(&doc, "Stats").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OutOfRange { .. }));
}

#[test]
fn float_overflow_is_out_of_range() {
    let doc = Document::new(object(vec![("Stats", object(vec![("speed", Node::Float(1e300))]))]));
    let err = load::<Stats>(&doc, "Stats").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OutOfRange { ref field, .. } if field == "speed"));
}

#[test]
fn wrong_type_reports_path() {
    let doc = Document::new(object(vec![("Stats", object(vec![("name", Node::Bool(false))]))]));
    let err = load::<Stats>(&doc, "Stats").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch { expected: "text", found: "bool", .. }
    ));
    assert_eq!(err.context.unwrap().path, vec!["Stats"]);
}

#[test]
fn wrong_type_in_vector_reports_index() {
    let doc = Document::new(object(vec![(
        "Route",
        object(vec![(
            "points",
            Node::Array(vec![
                object(vec![("x", Node::Float(0.0))]),
                object(vec![("x", Node::Text("far".into()))]),
            ]),
        )]),
    )]));
    let err = load::<Route>(&doc, "Route").unwrap_err();
    assert_eq!(err.context.unwrap().path, vec!["Route", "points[1]"]);
}
