//! Property-based tests for frame detection and request encoding.

use proptest::prelude::*;
use proptest::sample::Index;

use xcli_client::codec::{Arguments, CommandRequest, OptionMap};
use xcli_client::protocol::{self, FrameDetector};

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z_-]{0,11}"
}

/// Attribute text, including characters that need escaping.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>&\"'=/_.-]{0,24}"
}

fn request() -> impl Strategy<Value = CommandRequest> {
    (
        1u64..1_000_000,
        name(),
        prop::collection::btree_map(name(), text(), 0..6),
        prop::collection::btree_map(name(), text(), 0..6),
        prop::option::of("[a-z][a-z0-9_]{0,11}"),
    )
        .prop_map(|(id, command, options, args, remote_target)| CommandRequest {
            id,
            command,
            options: options.into_iter().collect::<OptionMap>(),
            arguments: args.into_iter().collect::<Arguments>(),
            remote_target,
        })
}

/// Distinct, sorted cut positions strictly inside `0..len`.
fn cuts(len: usize, picks: &[Index]) -> Vec<usize> {
    let mut cuts: Vec<usize> = picks
        .iter()
        .map(|pick| pick.index(len))
        .filter(|&cut| cut > 0)
        .collect();
    cuts.sort_unstable();
    cuts.dedup();
    cuts
}

const NESTED_RESPONSE: &str = r#"<command id="3"><aserver status="DELIVERY_SUCCESSFUL"/><administrator><command><code value="SUCCESS"/><status value="0"/><status_str value="Command completed successfully"/><return><volume id="1"><name value="a&amp;b"/><size value="17"/></volume><volume id="2"><name value="x &lt; y"/></volume></return></command></administrator></command>"#;

proptest! {
    #[test]
    fn test_request_round_trip(request in request()) {
        let root = protocol::parse(&request.to_bytes()).unwrap();
        let decoded = CommandRequest::from_element(&root).unwrap();
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn test_detector_closes_on_last_byte(
        request in request(),
        picks in prop::collection::vec(any::<Index>(), 0..10),
    ) {
        let doc = request.to_bytes();
        let cuts = cuts(doc.len(), &picks);

        let mut detector = FrameDetector::new();
        let mut start = 0;
        for cut in cuts {
            detector.feed(&doc[start..cut]).unwrap();
            prop_assert!(!detector.is_closed(), "closed early at byte {}", cut);
            start = cut;
        }
        detector.feed(&doc[start..]).unwrap();
        prop_assert!(detector.is_closed());

        let root = detector.finish().unwrap();
        prop_assert_eq!(CommandRequest::from_element(&root).unwrap(), request);
    }

    #[test]
    fn test_detector_nested_response(picks in prop::collection::vec(any::<Index>(), 0..16)) {
        let doc = NESTED_RESPONSE.as_bytes();
        let mut detector = FrameDetector::new();
        let mut start = 0;
        for cut in cuts(doc.len(), &picks) {
            detector.feed(&doc[start..cut]).unwrap();
            prop_assert!(!detector.is_closed());
            start = cut;
        }
        detector.feed(&doc[start..]).unwrap();
        prop_assert!(detector.is_closed());

        let root = detector.close().unwrap();
        let name = root
            .find_attr("administrator/command/return/volume/name", "value")
            .unwrap();
        prop_assert_eq!(name, "a&b");
    }
}
