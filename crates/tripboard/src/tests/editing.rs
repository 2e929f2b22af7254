//! Editing stored points through the trip controller

use std::time::Duration;

use jiff::Timestamp;
use tripboard_core::{FilterType, PointId};

use super::Harness;
use crate::components::edit_form::FormField;
use crate::controllers::Mode;
use crate::event::{AppKeyEvent, KeyCode};
use crate::session::EditorKey;
use crate::worker::PersistenceRequest;

fn id(value: &str) -> PointId {
    PointId::from(value)
}

#[test]
fn test_sample_trip_is_listed() {
    let h = Harness::new();
    assert_eq!(h.trip.controllers().len(), 4);
    assert_eq!(h.trip.open_forms(), 0);
    assert_eq!(h.pickers.live(), 0);
    let summary = h.trip.status().summary().unwrap();
    assert!(summary.total > 0);
}

#[test]
fn test_enter_opens_selected_point() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Down));
    h.press(AppKeyEvent::plain(KeyCode::Enter));

    let controller = h.trip.controller(&id("2")).unwrap();
    assert_eq!(controller.mode(), Mode::Edit);
    assert_eq!(h.trip.session().open_editor(), Some(&EditorKey::Point(id("2"))));
    assert_eq!(h.pickers.live(), 2);
}

#[test]
fn test_opening_another_point_closes_the_first() {
    let mut h = Harness::new();
    h.trip.open(0, h.at.wall);
    h.trip.open(1, h.at.wall);

    assert_eq!(h.trip.open_forms(), 1);
    assert_eq!(h.trip.controllers()[0].mode(), Mode::Default);
    assert_eq!(h.trip.controllers()[1].mode(), Mode::Edit);
    assert_eq!(h.pickers.live(), 2);
    assert_eq!(h.trip.session().open_editor(), Some(&EditorKey::Point(id("2"))));
}

#[test]
fn test_escape_closes_form_and_frees_pickers() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::plain(KeyCode::Esc));

    assert_eq!(h.trip.open_forms(), 0);
    assert_eq!(h.pickers.live(), 0);
    assert!(h.trip.session().open_editor().is_none());
}

#[test]
fn test_submit_waits_for_backend_before_changing_trip() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    // Type, Destination, StartDate, EndDate -> Price
    h.tab(4);
    h.type_text("5");
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));

    assert_eq!(h.dispatcher.sent().len(), 1);
    assert!(matches!(
        &h.dispatcher.sent()[0],
        PersistenceRequest::Update { favorite_only: false, .. }
    ));
    assert_eq!(h.trip.collection().get(&id("1")).unwrap().price, 160);
    let controller = h.trip.controller(&id("1")).unwrap();
    assert!(!controller.form().is_interactive());
    assert_eq!(controller.form().save_label(), "Saving...");
    assert!(h.trip.is_pending(&EditorKey::Point(id("1"))));

    // A second submit while saving is ignored
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));
    assert_eq!(h.dispatcher.sent().len(), 1);

    h.respond();
    assert_eq!(h.trip.collection().get(&id("1")).unwrap().price, 1605);
    let controller = h.trip.controller(&id("1")).unwrap();
    assert_eq!(controller.mode(), Mode::Default);
    assert_eq!(controller.point().price, 1605);
    assert!(!h.trip.is_pending(&EditorKey::Point(id("1"))));
    assert!(h.trip.session().open_editor().is_none());
    assert_eq!(h.pickers.live(), 0);
}

#[test]
fn test_update_payload_keeps_entered_dates() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));

    let sent = h.dispatcher.sent();
    let PersistenceRequest::Update { point, .. } = &sent[0] else {
        panic!("expected update, got {:?}", sent[0]);
    };
    let from: Timestamp = point.date_from.parse().unwrap();
    let to: Timestamp = point.date_to.parse().unwrap();
    assert_eq!(from, "2019-03-18T10:30:00Z".parse::<Timestamp>().unwrap());
    assert_eq!(to, "2019-03-18T12:00:00Z".parse::<Timestamp>().unwrap());
    assert!(to >= from);
}

#[test]
fn test_unreadable_date_blocks_submit() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    // Type, Destination -> StartDate
    h.tab(2);
    h.type_text("9");
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));

    assert!(h.dispatcher.sent().is_empty());
    assert!(!h.trip.is_pending(&EditorKey::Point(id("1"))));
    let controller = h.trip.controller(&id("1")).unwrap();
    assert_eq!(controller.mode(), Mode::Edit);
    let form = controller.form();
    assert!(form.is_interactive());
    let (field, _) = form.date_error().unwrap();
    assert_eq!(*field, FormField::StartDate);
    assert_eq!(h.trip.collection().get(&id("1")).unwrap().price, 160);
}

#[test]
fn test_failed_save_keeps_form_open_and_shakes() {
    let mut h = Harness::new();
    h.dispatcher.backend.fail_next("server unreachable");
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.tab(4);
    h.type_text("5");
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));
    h.respond();

    assert_eq!(h.trip.collection().get(&id("1")).unwrap().price, 160);
    let controller = h.trip.controller(&id("1")).unwrap();
    assert_eq!(controller.mode(), Mode::Edit);
    assert!(controller.form().is_interactive());
    assert!(controller.form().is_shaking());
    assert!(h.trip.status().error().is_some());

    h.advance(Duration::from_millis(599));
    assert!(h.trip.controller(&id("1")).unwrap().form().is_shaking());
    h.advance(Duration::from_millis(1));
    assert!(!h.trip.controller(&id("1")).unwrap().form().is_shaking());

    // The edit survived and can be retried
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));
    h.respond();
    assert_eq!(h.trip.collection().get(&id("1")).unwrap().price, 1605);
}

#[test]
fn test_escape_ignored_while_saving() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));
    h.press(AppKeyEvent::plain(KeyCode::Esc));

    assert_eq!(h.trip.open_forms(), 1);
    h.respond();
    assert_eq!(h.trip.open_forms(), 0);
}

#[test]
fn test_favorite_flips_only_after_confirmation() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('f')));

    assert!(matches!(
        &h.dispatcher.sent()[0],
        PersistenceRequest::Update { favorite_only: true, .. }
    ));
    let form = h.trip.controller(&id("1")).unwrap().form();
    assert!(!form.is_favorite());
    assert!(form.shown_favorite());

    h.respond();
    let controller = h.trip.controller(&id("1")).unwrap();
    assert_eq!(controller.mode(), Mode::Edit);
    assert!(controller.form().is_favorite());
    assert!(h.trip.collection().get(&id("1")).unwrap().is_favorite);
}

#[test]
fn test_failed_favorite_rolls_star_back() {
    let mut h = Harness::new();
    h.dispatcher.backend.fail_next("server unreachable");
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('f')));
    assert!(h.trip.controller(&id("1")).unwrap().form().shown_favorite());

    h.respond();
    let controller = h.trip.controller(&id("1")).unwrap();
    assert_eq!(controller.mode(), Mode::Edit);
    assert!(!controller.form().shown_favorite());
    assert!(!controller.form().is_favorite());
    assert!(controller.form().is_shaking());
    assert!(!h.trip.collection().get(&id("1")).unwrap().is_favorite);
}

#[test]
fn test_favorite_refused_while_saving() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('s')));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('f')));

    assert_eq!(h.dispatcher.sent().len(), 1);
}

#[test]
fn test_overlapping_favorite_requests_are_refused() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('f')));
    h.press(AppKeyEvent::ctrl(KeyCode::Char('f')));

    assert_eq!(h.dispatcher.sent().len(), 1);
    let form = h.trip.controller(&id("1")).unwrap().form();
    assert!(form.is_shaking());
    // The refused second toggle leaves the first one's star in place
    assert!(form.shown_favorite());
}

#[test]
fn test_delete_removes_point_after_confirmation() {
    let mut h = Harness::new();
    h.trip.open(1, h.at.wall);
    h.press(AppKeyEvent::ctrl(KeyCode::Char('d')));

    assert_eq!(
        h.dispatcher.sent(),
        vec![PersistenceRequest::Delete { id: id("2") }]
    );
    assert_eq!(
        h.trip.controller(&id("2")).unwrap().form().delete_label(),
        "Deleting..."
    );
    assert_eq!(h.trip.collection().len(), 4);

    h.respond();
    assert_eq!(h.trip.collection().len(), 3);
    assert!(h.trip.controller(&id("2")).is_none());
    assert!(h.trip.session().open_editor().is_none());
    assert_eq!(h.pickers.live(), 0);
}

#[test]
fn test_filter_keys_narrow_the_list() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::char('2'));
    assert_eq!(h.trip.collection().filter(), FilterType::Future);
    assert_eq!(h.trip.controllers().len(), 1);

    h.press(AppKeyEvent::char('3'));
    assert_eq!(h.trip.controllers().len(), 3);

    h.press(AppKeyEvent::char('1'));
    assert_eq!(h.trip.controllers().len(), 4);
}

#[test]
fn test_quit_only_from_the_list() {
    let mut h = Harness::new();
    h.press(AppKeyEvent::plain(KeyCode::Enter));
    let quit = AppKeyEvent::char('q');
    assert_ne!(
        h.trip.handle_key(&quit, &h.keys, h.at),
        crate::components::EventResult::Exit
    );
    h.press(AppKeyEvent::plain(KeyCode::Esc));
    assert_eq!(
        h.trip.handle_key(&quit, &h.keys, h.at),
        crate::components::EventResult::Exit
    );
}
