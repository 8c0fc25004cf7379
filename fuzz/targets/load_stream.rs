#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yamlgraph::{dump_stream, load_stream, Event, ScalarStyle};

const TAGS: &[&str] = &[
    "tag:yaml.org,2002:hash",
    "tag:yaml.org,2002:hash:Point",
    "tag:yaml.org,2002:array:Stack",
    "tag:yaml.org,2002:ref",
    "tag:yaml.org,2002:scalar:Unit",
    "tag:yaml.org,2002:code",
    "tag:yaml.org,2002:regexp",
    "tag:yaml.org,2002:str",
    "!local",
];

#[derive(Debug, Arbitrary)]
enum FuzzEvent {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart { anchor: Option<u8>, tag: Option<u8> },
    MappingEnd,
    SequenceStart { anchor: Option<u8>, tag: Option<u8> },
    SequenceEnd,
    Scalar { value: Vec<u8>, quoted: bool, tag: Option<u8> },
    Alias(u8),
}

fn anchor(n: u8) -> String {
    format!("a{}", n % 4)
}

fn tag(n: u8) -> String {
    TAGS[n as usize % TAGS.len()].to_string()
}

impl From<FuzzEvent> for Event {
    fn from(e: FuzzEvent) -> Self {
        match e {
            FuzzEvent::StreamStart => Event::StreamStart,
            FuzzEvent::StreamEnd => Event::StreamEnd,
            FuzzEvent::DocumentStart => Event::DocumentStart,
            FuzzEvent::DocumentEnd => Event::DocumentEnd,
            FuzzEvent::MappingStart { anchor: a, tag: t } => Event::MappingStart {
                anchor: a.map(anchor),
                tag: t.map(tag),
            },
            FuzzEvent::MappingEnd => Event::MappingEnd,
            FuzzEvent::SequenceStart { anchor: a, tag: t } => Event::SequenceStart {
                anchor: a.map(anchor),
                tag: t.map(tag),
            },
            FuzzEvent::SequenceEnd => Event::SequenceEnd,
            FuzzEvent::Scalar { value, quoted, tag: t } => Event::Scalar {
                value: value.into(),
                style: if quoted {
                    ScalarStyle::Quoted
                } else {
                    ScalarStyle::Plain
                },
                tag: t.map(tag),
            },
            FuzzEvent::Alias(n) => Event::alias(anchor(n)),
        }
    }
}

fuzz_target!(|input: Vec<FuzzEvent>| {
    let events: Vec<Event> = input.into_iter().map(Event::from).collect();

    // The loader must reject bad input with an error, never a panic.
    let Ok(docs) = load_stream(events) else {
        return;
    };

    // Whatever loads must dump, and must load back to the same structure.
    let dumped = dump_stream(&docs).expect("loaded documents must dump");
    let reloaded = load_stream(dumped).expect("dumped stream must load");
    assert_eq!(docs.len(), reloaded.len());
    for (a, b) in docs.iter().zip(&reloaded) {
        assert!(a.structurally_eq(b), "roundtrip mismatch\nleft: {a:?}\nright: {b:?}");
    }
});
