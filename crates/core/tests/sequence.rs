mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{harness, jpeg, located};
use trailview_core::error::CoreError;
use trailview_core::identity::CallerIdentity;
use trailview_core::sequence::SequenceAssembler;
use trailview_core::store::PanoramaStore;

#[tokio::test]
async fn unresolvable_ids_are_dropped() {
    let h = harness(located(1.0, 1.0, 0.0)).await;
    let user = CallerIdentity::user("3");
    let a = h.lifecycle.upload(&user, &jpeg()).await.unwrap().id;
    let b = h.lifecycle.upload(&user, &jpeg()).await.unwrap().id;

    let assembler = SequenceAssembler::new(Arc::clone(h.lifecycle.store()));
    let seq = assembler.create(&user, &[a, b, 999]).await.unwrap();

    let found = assembler.get(seq).await.unwrap();
    assert_eq!(found.member_ids, vec![a, b]);
    assert_eq!(
        h.store.find_by_id(b).await.unwrap().unwrap().sequence_id,
        Some(seq)
    );
}

#[tokio::test]
async fn duplicates_keep_first_position() {
    let h = harness(located(1.0, 1.0, 0.0)).await;
    let user = CallerIdentity::user("3");
    let a = h.lifecycle.upload(&user, &jpeg()).await.unwrap().id;
    let b = h.lifecycle.upload(&user, &jpeg()).await.unwrap().id;

    let assembler = SequenceAssembler::new(Arc::clone(h.lifecycle.store()));
    let seq = assembler.create(&user, &[b, a, b]).await.unwrap();
    assert_eq!(assembler.get(seq).await.unwrap().member_ids, vec![b, a]);
}

#[tokio::test]
async fn nothing_resolves_is_empty_sequence() {
    let h = harness(located(1.0, 1.0, 0.0)).await;
    let assembler = SequenceAssembler::new(Arc::clone(h.lifecycle.store()));

    assert_matches!(
        assembler.create(&CallerIdentity::user("3"), &[998, 999]).await,
        Err(CoreError::EmptySequence)
    );
    assert_matches!(
        assembler.create(&CallerIdentity::user("3"), &[]).await,
        Err(CoreError::EmptySequence)
    );
}

#[tokio::test]
async fn anonymous_cannot_create() {
    let h = harness(located(1.0, 1.0, 0.0)).await;
    let assembler = SequenceAssembler::new(Arc::clone(h.lifecycle.store()));

    assert_matches!(
        assembler.create(&CallerIdentity::anonymous(), &[1]).await,
        Err(CoreError::Unauthorized(_))
    );
}

#[tokio::test]
async fn missing_sequence_is_not_found() {
    let h = harness(located(1.0, 1.0, 0.0)).await;
    let assembler = SequenceAssembler::new(Arc::clone(h.lifecycle.store()));

    assert_matches!(
        assembler.get(42).await,
        Err(CoreError::NotFound { entity: "Sequence", id: 42 })
    );
}

#[tokio::test]
async fn reattaching_moves_panoramas_to_new_sequence() {
    let h = harness(located(1.0, 1.0, 0.0)).await;
    let user = CallerIdentity::user("3");
    let a = h.lifecycle.upload(&user, &jpeg()).await.unwrap().id;
    let b = h.lifecycle.upload(&user, &jpeg()).await.unwrap().id;

    let assembler = SequenceAssembler::new(Arc::clone(h.lifecycle.store()));
    let first = assembler.create(&user, &[a, b]).await.unwrap();
    let second = assembler.create(&user, &[b]).await.unwrap();
    h.store.attach_sequence(&[a], second).await;

    assert!(assembler.get(first).await.unwrap().member_ids.is_empty());
    assert_eq!(assembler.get(second).await.unwrap().member_ids, vec![a, b]);
}
