use super::*;
use crate::net::types::{Role, User};
use crate::state::session::SessionStore;

fn navigator_with(role: Option<Role>) -> (SessionStore, Navigator) {
    let store = SessionStore::new();
    store.settle(role.map(|r| User::minimal("someone", r)));
    let navigator = Navigator::new(store.handle());
    (store, navigator)
}

#[test]
fn starts_at_index() {
    let store = SessionStore::new();
    let navigator = Navigator::new(store.handle());
    assert_eq!(navigator.current(), Location::at(Route::Index));
}

#[test]
fn anonymous_protected_request_lands_on_login_with_from() {
    let (_store, navigator) = navigator_with(None);
    let decision = navigator.navigate("/my-bookings");
    assert_eq!(decision, Admission::RedirectToLogin { from: Some(Route::MyBookings) });
    assert_eq!(
        navigator.current(),
        Location { route: Route::Login, from: Some(Route::MyBookings) }
    );
}

#[test]
fn wrong_role_lands_on_default() {
    let (_store, navigator) = navigator_with(Some(Role::Student));
    navigator.navigate("/admin/users");
    assert_eq!(navigator.current(), Location::at(Route::Dashboard));
}

#[test]
fn pending_keeps_requested_route() {
    let store = SessionStore::new();
    let navigator = Navigator::new(store.handle());
    assert_eq!(navigator.navigate("/profile"), Admission::Pending);
    assert_eq!(navigator.current().route, Route::Profile);
}

#[test]
fn revalidate_after_bootstrap_applies_guard() {
    let store = SessionStore::new();
    let navigator = Navigator::new(store.handle());
    navigator.navigate("/admin/rooms");
    store.settle(Some(User::minimal("s", Role::Lecturer)));
    assert_eq!(navigator.revalidate(), Admission::RedirectToDefault(Route::Dashboard));
    assert_eq!(navigator.current().route, Route::Dashboard);
}

#[test]
fn revalidate_on_login_keeps_from() {
    let (_store, navigator) = navigator_with(None);
    navigator.navigate("/book-room");
    assert_eq!(navigator.revalidate(), Admission::Allow);
    assert_eq!(navigator.current().from, Some(Route::BookRoom));
}

#[test]
fn return_after_login_resumes_remembered_route() {
    let (store, navigator) = navigator_with(None);
    navigator.navigate("/book-room");
    store.settle(Some(User::minimal("s", Role::Student)));
    assert_eq!(navigator.return_after_login(), Admission::Allow);
    assert_eq!(navigator.current(), Location::at(Route::BookRoom));
}

#[test]
fn return_after_login_without_from_goes_to_role_default() {
    let (store, navigator) = navigator_with(None);
    navigator.navigate("/login");
    store.settle(Some(User::minimal("a", Role::Admin)));
    navigator.return_after_login();
    assert_eq!(navigator.current().route, Route::AdminDashboard);
}

#[test]
fn replace_skips_guard() {
    let (_store, navigator) = navigator_with(None);
    navigator.replace(Route::AdminUsers);
    assert_eq!(navigator.current(), Location::at(Route::AdminUsers));
}

#[tokio::test]
async fn subscribers_see_moves() {
    let (_store, navigator) = navigator_with(Some(Role::Admin));
    let mut rx = navigator.subscribe();
    navigator.clone().navigate("/admin/equipment");
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().route, Route::AdminEquipment);
}
