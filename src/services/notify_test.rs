use super::*;

#[test]
fn helpers_emit_matching_levels_in_order() {
    let (notifier, mut rx) = channel();
    notifier.success("saved");
    notifier.error("nope");
    notifier.info("fyi");

    let got: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert_eq!(
        got,
        vec![
            Notification { level: NotificationLevel::Success, message: "saved".into() },
            Notification { level: NotificationLevel::Error, message: "nope".into() },
            Notification { level: NotificationLevel::Info, message: "fyi".into() },
        ]
    );
}

#[test]
fn closed_receiver_is_ignored() {
    let (notifier, rx) = channel();
    drop(rx);
    notifier.error("nobody listening");
}

#[test]
fn silent_notifier_discards() {
    Notifier::silent().success("ignored");
}

#[test]
fn clones_share_the_channel() {
    let (notifier, mut rx) = channel();
    notifier.clone().info("from clone");
    assert_eq!(rx.try_recv().unwrap().message, "from clone");
}

#[test]
fn level_names() {
    assert_eq!(NotificationLevel::Success.as_str(), "success");
    assert_eq!(NotificationLevel::Error.as_str(), "error");
    assert_eq!(NotificationLevel::Info.as_str(), "info");
}
