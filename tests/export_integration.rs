//! Export, description and analysis payloads built from a session

use std::cell::RefCell;

use family_constellation::ports::{GatewayError, WriterSink, DEFAULT_EXPORT_FILE};
use family_constellation::{
    AnalysisGateway, ArrangementConfig, MemoryStore, NewEntity, Payload, Point, RoleCatalog,
    Session, SvgConfig,
};

fn family() -> Session<MemoryStore> {
    let mut session = Session::open(
        MemoryStore::new(),
        ArrangementConfig::default(),
        RoleCatalog::default(),
    )
    .unwrap();
    let dad = session.add(NewEntity::new("Li", "父亲")).unwrap();
    session.move_to(dad, Point::new(300.0, 150.0)).unwrap();
    session
}

/// Records what it was asked and answers with a fixed reply
struct Recording {
    reply: Result<String, GatewayError>,
    seen: RefCell<Vec<Payload>>,
}

impl AnalysisGateway for Recording {
    fn analyze(&self, payload: &Payload) -> Result<String, GatewayError> {
        self.seen.borrow_mut().push(payload.clone());
        self.reply.clone()
    }
}

#[test]
fn test_export_json_format() {
    let session = family();
    insta::assert_snapshot!(session.export_json().unwrap(), @r###"
    [
      {
        "id": 1,
        "name": "Li",
        "role": "父亲",
        "icon": "👨",
        "gender": "male",
        "shape": "square",
        "isDeceased": false,
        "x": 300.0,
        "y": 150.0,
        "direction": "north",
        "width": 80.0,
        "height": 80.0
      }
    ]
    "###);
}

#[test]
fn test_default_export_file_name() {
    assert_eq!(DEFAULT_EXPORT_FILE, "family-arrangement.json");
}

#[test]
fn test_export_to_writer_ends_with_newline() {
    let session = family();
    let mut sink = WriterSink::new(Vec::new());
    session.export_to(&mut sink).unwrap();
    let written = String::from_utf8(sink.into_inner()).unwrap();
    assert!(written.starts_with('['));
    assert!(written.ends_with("]\n"));
    assert_eq!(session.store().saves(), 2);
}

#[test]
fn test_analysis_receives_description_and_prompt() {
    let session = family();
    let gateway = Recording {
        reply: Ok("<think>draft</think>\n\nThe father stands alone.".to_string()),
        seen: RefCell::new(Vec::new()),
    };

    let outcome = session.analyze(&gateway, &session.payload());
    assert!(outcome.success);
    assert_eq!(outcome.analysis.as_deref(), Some("The father stands alone."));

    let seen = gateway.seen.borrow();
    match &seen[0] {
        Payload::Arrangement {
            entities,
            description,
            prompt,
        } => {
            assert_eq!(entities.len(), 1);
            assert_eq!(
                description,
                "父亲 (Li, male, square, living) at (300, 150), facing north, size 80x80."
            );
            assert!(prompt.ends_with(description.as_str()));
        }
        Payload::Snapshot { .. } => panic!("expected arrangement payload"),
    }
}

#[test]
fn test_analysis_failure_is_reported_not_raised() {
    let session = family();
    let gateway = Recording {
        reply: Err(GatewayError::Request("HTTP 502".to_string())),
        seen: RefCell::new(Vec::new()),
    };

    let outcome = session.analyze(&gateway, &session.snapshot(&SvgConfig::default()));
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("analysis request failed: HTTP 502"));
    assert!(matches!(gateway.seen.borrow()[0], Payload::Snapshot { .. }));
}
