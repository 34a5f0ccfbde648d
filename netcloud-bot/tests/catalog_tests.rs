//! Catalog matching scenarios
//!
//! Tests cover:
//! - Poster announcements: publication, registry entry, ledger row
//! - Rejected announcements: no outbound call, no ledger write
//! - Videos arriving before / after their announcement
//! - Placeholder captions resolving to the latest announcement
//! - Failure handling in video publication

mod helpers;

use std::sync::atomic::Ordering;

use helpers::{catalog, document, poster, video, Sent, CHANNEL};
use netcloud_bot::catalog::{
    AnnouncementOutcome, CatalogState, PostOutcome, Rejection, VideoOutcome,
};
use netcloud_bot::publisher::{permalink, Attachment, InboundPost};
use netcloud_common::{normalize, Genre};

const INCEPTION: &str = "Titre - Inception\nGenre - Science-Fiction";

fn published_reference(outcome: &AnnouncementOutcome) -> i64 {
    match outcome {
        AnnouncementOutcome::Published { reference, .. } => *reference,
        other => panic!("expected publication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_announcement_is_published_and_recorded() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let outcome = catalog
        .handle_announcement(&mut state, &poster(1, INCEPTION))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        AnnouncementOutcome::Published {
            title: "inception".into(),
            genre: Genre::ScienceFiction,
            reference: 100,
            row: 2,
            released: None,
        }
    );

    // Registry keyed by normalized title
    let entry = state.registry.get(&normalize("Inception")).unwrap();
    assert_eq!(entry.genre, Genre::ScienceFiction);
    assert_eq!(entry.reference, 100);
    assert_eq!(state.registry.len(), 1);

    // Poster went to the Science-Fiction topic with the full caption
    assert_eq!(
        catalog.publisher().sent(),
        vec![Sent::Poster {
            file_id: "photo-1".into(),
            caption: INCEPTION.into(),
            topic: 7,
            message_id: 100,
        }]
    );

    // One entry row plus one blank row below it
    let rows = catalog.ledger().rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], "inception");
    assert_eq!(rows[0][2], permalink(CHANNEL, 100));
    assert!(rows[0][2].ends_with("/100"));
    assert_eq!(rows[0][3], "✅");
    assert_eq!(rows[0][4], "Science-Fiction");
    assert!(rows[1].iter().all(String::is_empty));
}

#[tokio::test]
async fn test_unsupported_genre_is_rejected_without_side_effects() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let outcome = catalog
        .handle_announcement(&mut state, &poster(1, "Titre - Django\nGenre - Western"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        AnnouncementOutcome::Rejected(Rejection::UnknownGenre("Western".into()))
    );
    assert!(state.registry.is_empty());
    assert!(catalog.publisher().sent().is_empty());
    assert_eq!(catalog.ledger().write_count(), 0);
}

#[tokio::test]
async fn test_malformed_announcements_are_rejected() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let cases = [
        ("Titre - Inception", Rejection::TooFewLines(1)),
        ("Titre - Inception\nScience-Fiction", Rejection::MissingGenreMarker),
        ("Titre - ???\nGenre - Action", Rejection::EmptyTitle),
    ];

    for (caption, expected) in cases {
        let outcome = catalog
            .handle_announcement(&mut state, &poster(1, caption))
            .await
            .unwrap();
        assert_eq!(outcome, AnnouncementOutcome::Rejected(expected));
    }

    assert!(state.registry.is_empty());
    assert!(catalog.publisher().sent().is_empty());
    assert_eq!(catalog.ledger().write_count(), 0);
}

#[tokio::test]
async fn test_video_after_announcement_is_published_immediately() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    catalog
        .handle_announcement(&mut state, &poster(1, INCEPTION))
        .await
        .unwrap();

    let outcome = catalog
        .handle_video(&mut state, video(2, Some("_Inception_ (2010)")))
        .await;

    assert_eq!(outcome, VideoOutcome::Queued { caption: "_Inception_ (2010)".into() });

    let outcome = catalog
        .handle_video(&mut state, video(3, Some("_Inception_")))
        .await;

    assert_eq!(
        outcome,
        VideoOutcome::Published {
            title: "inception".into(),
            message_id: 101,
        }
    );
    assert!(state.registry.is_empty());
    assert_eq!(state.queue.len(), 1, "only the mismatched video stays queued");

    // Reply to the poster, underscores stripped from the caption
    assert_eq!(
        catalog.publisher().replies(),
        vec![Sent::Reply {
            media: Attachment::Video("video-3".into()),
            caption: "Inception".into(),
            reply_to: 100,
            message_id: 101,
        }]
    );

    // Ledger link now points at the video
    assert_eq!(catalog.ledger().rows()[0][2], permalink(CHANNEL, 101));
}

#[tokio::test]
async fn test_video_before_announcement_is_queued_then_released_once() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let outcome = catalog
        .handle_video(&mut state, document(10, Some("Inception")))
        .await;
    assert_eq!(outcome, VideoOutcome::Queued { caption: "Inception".into() });
    catalog
        .handle_video(&mut state, video(11, Some("inception!")))
        .await;
    assert_eq!(state.queue.len(), 2);
    assert!(catalog.publisher().sent().is_empty());

    let outcome = catalog
        .handle_announcement(&mut state, &poster(12, INCEPTION))
        .await
        .unwrap();

    match outcome {
        AnnouncementOutcome::Published {
            reference,
            released,
            ..
        } => {
            assert_eq!(reference, 100);
            assert_eq!(
                released,
                Some(VideoOutcome::Published {
                    title: "inception".into(),
                    message_id: 101,
                })
            );
        }
        other => panic!("expected publication, got {other:?}"),
    }

    // First queued video wins; exactly one entry consumed
    assert_eq!(state.queue.len(), 1);
    assert_eq!(state.queue.iter().next().unwrap().post.message_id, 11);
    assert!(!state.registry.contains("inception"));

    let replies = catalog.publisher().replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0],
        Sent::Reply {
            media: Attachment::Document("doc-10".into()),
            caption: "Inception".into(),
            reply_to: 100,
            message_id: 101,
        }
    );
    assert_eq!(catalog.ledger().rows()[0][2], permalink(CHANNEL, 101));
}

#[tokio::test]
async fn test_placeholder_caption_uses_latest_announcement() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    catalog
        .handle_announcement(&mut state, &poster(1, "Titre - Heat\nGenre - Policier"))
        .await
        .unwrap();
    let alien = catalog
        .handle_announcement(&mut state, &poster(2, "Titre - Alien\nGenre - Horreur"))
        .await
        .unwrap();

    let outcome = catalog.handle_video(&mut state, video(3, Some("_"))).await;

    assert_eq!(
        outcome,
        VideoOutcome::Published {
            title: "alien".into(),
            message_id: 102,
        }
    );
    match &catalog.publisher().replies()[0] {
        Sent::Reply { reply_to, caption, .. } => {
            assert_eq!(*reply_to, published_reference(&alien));
            assert_eq!(caption, "");
        }
        other => panic!("unexpected {other:?}"),
    }

    // No caption at all now resolves to the remaining title
    let outcome = catalog.handle_video(&mut state, video(4, None)).await;
    assert_eq!(
        outcome,
        VideoOutcome::Published {
            title: "heat".into(),
            message_id: 103,
        }
    );
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn test_placeholder_with_nothing_pending_never_matches() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let outcome = catalog.handle_video(&mut state, video(1, Some("_"))).await;
    assert_eq!(outcome, VideoOutcome::Queued { caption: "_".into() });

    let outcome = catalog
        .handle_announcement(&mut state, &poster(2, INCEPTION))
        .await
        .unwrap();

    match outcome {
        AnnouncementOutcome::Published { released, .. } => assert_eq!(released, None),
        other => panic!("expected publication, got {other:?}"),
    }
    assert_eq!(state.queue.len(), 1);
    assert!(state.registry.contains("inception"));
}

#[tokio::test]
async fn test_failed_video_send_keeps_entry_pending() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    catalog
        .handle_announcement(&mut state, &poster(1, INCEPTION))
        .await
        .unwrap();

    catalog.publisher().fail_replies.store(true, Ordering::SeqCst);
    let outcome = catalog
        .handle_video(&mut state, video(2, Some("Inception")))
        .await;

    assert_eq!(outcome, VideoOutcome::Failed { title: "inception".into() });
    assert!(state.registry.contains("inception"));
    assert!(state.queue.is_empty(), "failed videos are not queued");
    assert_eq!(catalog.ledger().rows()[0][2], permalink(CHANNEL, 100));

    // A fresh upload is the only retry path
    catalog.publisher().fail_replies.store(false, Ordering::SeqCst);
    let outcome = catalog
        .handle_video(&mut state, video(3, Some("Inception")))
        .await;

    assert!(matches!(outcome, VideoOutcome::Published { .. }));
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn test_released_video_that_fails_is_dropped_from_queue() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    catalog
        .handle_video(&mut state, video(1, Some("Heat")))
        .await;
    assert_eq!(state.queue.len(), 1);

    catalog.publisher().fail_replies.store(true, Ordering::SeqCst);
    let outcome = catalog
        .handle_announcement(&mut state, &poster(2, "Titre - Heat\nGenre - Policier"))
        .await
        .unwrap();

    match outcome {
        AnnouncementOutcome::Published { released, .. } => {
            assert_eq!(released, Some(VideoOutcome::Failed { title: "heat".into() }));
        }
        other => panic!("expected publication, got {other:?}"),
    }
    assert!(state.queue.is_empty(), "released video is consumed even on failure");
    assert!(state.registry.contains("heat"));
    assert!(catalog.publisher().replies().is_empty());
}

#[tokio::test]
async fn test_ledger_failure_during_video_publication_is_swallowed() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    catalog
        .handle_announcement(&mut state, &poster(1, INCEPTION))
        .await
        .unwrap();

    catalog.ledger().fail_reads.store(true, Ordering::SeqCst);
    let outcome = catalog
        .handle_video(&mut state, video(2, Some("Inception")))
        .await;

    assert_eq!(outcome, VideoOutcome::Failed { title: "inception".into() });
    assert!(state.registry.contains("inception"));
    assert_eq!(catalog.publisher().replies().len(), 1);
}

#[tokio::test]
async fn test_poster_failure_propagates_without_state_change() {
    let catalog = catalog();
    let mut state = CatalogState::new();
    catalog.publisher().fail_posters.store(true, Ordering::SeqCst);

    let result = catalog
        .handle_announcement(&mut state, &poster(1, INCEPTION))
        .await;

    assert!(result.is_err());
    assert!(state.registry.is_empty());
    assert_eq!(catalog.ledger().write_count(), 0);
}

#[tokio::test]
async fn test_repeated_announcement_replaces_pending_entry() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    catalog
        .handle_announcement(&mut state, &poster(1, "Titre - Heat\nGenre - Policier"))
        .await
        .unwrap();
    catalog
        .handle_announcement(&mut state, &poster(2, INCEPTION))
        .await
        .unwrap();
    catalog
        .handle_announcement(&mut state, &poster(3, "Titre - HEAT!\nGenre - Thriller"))
        .await
        .unwrap();

    assert_eq!(state.registry.len(), 2);
    let heat = state.registry.get("heat").unwrap();
    assert_eq!(heat.reference, 102);
    assert_eq!(heat.genre, Genre::Thriller);
    assert_eq!(state.registry.last_title(), Some("heat"));
}

#[tokio::test]
async fn test_successive_announcements_keep_blank_separators() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let mut appended = Vec::new();
    for (id, caption) in [
        (1, "Titre - Heat\nGenre - Policier"),
        (2, INCEPTION),
        (3, "Titre - Alien\nGenre - Horreur"),
    ] {
        match catalog
            .handle_announcement(&mut state, &poster(id, caption))
            .await
            .unwrap()
        {
            AnnouncementOutcome::Published { row, .. } => appended.push(row),
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(appended, vec![2, 4, 6]);

    // Entries alternate with the blank rows inserted below them
    let rows = catalog.ledger().rows();
    assert_eq!(rows.len(), 6);
    let titles: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(titles, vec!["heat", "", "inception", "", "alien", ""]);
    for blank in [1, 3, 5] {
        assert!(rows[blank].iter().all(String::is_empty), "row {} not blank", blank + 2);
    }
}

#[tokio::test]
async fn test_handle_post_dispatches_by_attachment() {
    let catalog = catalog();
    let mut state = CatalogState::new();

    let text_only = InboundPost {
        chat_id: helpers::STORAGE_CHAT,
        message_id: 1,
        text: Some("hello".into()),
        attachment: None,
    };
    assert_eq!(
        catalog.handle_post(&mut state, text_only).await.unwrap(),
        PostOutcome::Ignored
    );

    let outcome = catalog
        .handle_post(&mut state, poster(2, INCEPTION))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        PostOutcome::Announcement(AnnouncementOutcome::Published { .. })
    ));

    let outcome = catalog
        .handle_post(&mut state, document(3, Some("Inception")))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        PostOutcome::Video(VideoOutcome::Published { .. })
    ));
}
