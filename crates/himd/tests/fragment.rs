mod common;

use common::{TifFixture, TrackRecord};
use himd::{ErrorKind, ParseError, Table};

fn track_at(first_fragment: u16) -> TrackRecord {
    TrackRecord {
        first_fragment,
        ..Default::default()
    }
}

#[test]
fn decodes_fragment_fields() {
    let mut fx = TifFixture::new();
    fx.fragment(10, [9, 8, 7, 6, 5, 4, 3, 2], 0x0100, 0x01FF, 3, 17, 0x2, 0x0ABC);
    let image = fx.build();

    let f = image.decode_fragment(10).unwrap();
    assert_eq!(f.index, 10);
    assert_eq!(f.key, [9, 8, 7, 6, 5, 4, 3, 2]);
    assert_eq!(f.first_block, 0x0100);
    assert_eq!(f.last_block, 0x01FF);
    assert_eq!(f.first_frame, 3);
    assert_eq!(f.last_frame, 17);
    assert_eq!(f.fragment_type, 0x2);
    assert_eq!(f.next, 0x0ABC);
    assert_eq!(f.block_count(), Some(0x100));
}

#[test]
fn walks_chain_in_link_order() {
    let mut fx = TifFixture::new();
    fx.plain_fragment(4, 100, 109, 2)
        .plain_fragment(2, 10, 10, 7)
        .plain_fragment(7, 500, 549, 0);
    fx.track(1, &track_at(4));
    let image = fx.build();
    let track = image.decode_track(1).unwrap();

    let order: Vec<u16> = image
        .walk_fragments(track.first_fragment)
        .map(|f| f.unwrap().index)
        .collect();
    assert_eq!(order, vec![4, 2, 7]);

    // 10 + 1 + 50
    assert_eq!(image.total_blocks(&track).unwrap(), 61);
}

#[test]
fn walk_is_restartable() {
    let mut fx = TifFixture::new();
    fx.plain_fragment(1, 0, 3, 2).plain_fragment(2, 4, 8, 0);
    let image = fx.build();

    let chain = image.walk_fragments(1);
    let first: Vec<_> = chain.clone().collect();
    let second: Vec<_> = chain.collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(image.walk_fragments(1).collect::<Vec<_>>(), first);
}

#[test]
fn zero_start_is_an_empty_chain() {
    let image = TifFixture::new().build();
    assert_eq!(image.walk_fragments(0).count(), 0);
}

#[test]
fn link_outside_domain_ends_walk_with_error() {
    let mut fx = TifFixture::new();
    fx.plain_fragment(1, 0, 0, 4000);
    fx.track(1, &track_at(1));
    let image = fx.build();

    let items: Vec<_> = image.walk_fragments(1).collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert_eq!(
        items[1],
        Err(ParseError::IndexOutOfRange {
            table: Table::Fragment,
            index: 4000
        })
    );

    let track = image.decode_track(1).unwrap();
    assert_eq!(
        image.total_blocks(&track).unwrap_err().kind(),
        ErrorKind::OutOfRange
    );
}

#[test]
fn cyclic_chain_stops_at_step_limit() {
    let mut fx = TifFixture::new();
    fx.plain_fragment(1, 0, 0, 2).plain_fragment(2, 1, 1, 1);
    fx.track(1, &track_at(1));
    let image = fx.build();

    let items: Vec<_> = image.walk_fragments(1).with_step_limit(5).collect();
    assert_eq!(items.len(), 6);
    assert!(items[..5].iter().all(Result::is_ok));
    assert_eq!(
        items[5],
        Err(ParseError::FragmentChainLoops { first: 1, steps: 5 })
    );

    // The default budget also terminates.
    let track = image.decode_track(1).unwrap();
    assert!(matches!(
        image.total_blocks(&track),
        Err(ParseError::FragmentChainLoops { first: 1, .. })
    ));
    assert!(image.total_blocks_with_limit(&track, 2).is_err());
}

#[test]
fn reversed_block_range_is_reported() {
    let mut fx = TifFixture::new();
    fx.plain_fragment(3, 20, 10, 0);
    fx.track(2, &track_at(3));
    let image = fx.build();
    let track = image.decode_track(2).unwrap();

    assert_eq!(
        image.total_blocks(&track),
        Err(ParseError::InvalidBlockRange {
            fragment: 3,
            first_block: 20,
            last_block: 10
        })
    );
}
