//! Role gating driven by the session store.

mod helpers;

use shiphub_auth::{GuardDecision, GuardWatch, RoleGuard};
use shiphub_entity::session::AuthState;
use shiphub_entity::user::{LOGIN_PATH, UserRole};

use helpers::{SessionFixture, accepted, user};

#[test]
fn test_super_admin_passes_any_gate() {
    let guard = RoleGuard::new([UserRole::Merchant]);
    let state = AuthState::authenticated(user(UserRole::SuperAdmin), "tok-1");
    assert_eq!(guard.evaluate(&state), GuardDecision::Authorized);
}

#[test]
fn test_wrong_role_redirects_to_own_landing() {
    let guard = RoleGuard::new([UserRole::Admin]);
    let state = AuthState::authenticated(user(UserRole::Courier), "tok-1");

    let decision = guard.evaluate(&state);

    assert_eq!(
        decision,
        GuardDecision::WrongRole {
            role: UserRole::Courier,
            redirect: "/courier",
        }
    );
    assert_eq!(decision.redirect(), Some("/courier"));
}

#[test]
fn test_unresolved_session_is_checking() {
    let guard = RoleGuard::new([UserRole::Admin]);
    assert_eq!(guard.evaluate(&AuthState::default()), GuardDecision::Checking);
    assert_eq!(
        guard.evaluate(&AuthState::signed_out(None)),
        GuardDecision::Unauthorized {
            redirect: LOGIN_PATH
        }
    );
}

#[tokio::test]
async fn test_decision_follows_session_and_allowed_roles() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));
    let watch = GuardWatch::spawn(
        RoleGuard::new([UserRole::Merchant]),
        fixture.session.subscribe(),
    );
    assert_eq!(watch.decision(), GuardDecision::Checking);

    fixture.session.check_auth().await;
    assert_eq!(
        watch.resolved().await,
        GuardDecision::Unauthorized {
            redirect: LOGIN_PATH
        }
    );

    let mut decisions = watch.subscribe();
    fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    let decision = *decisions
        .wait_for(GuardDecision::is_authorized)
        .await
        .unwrap();
    assert_eq!(decision, GuardDecision::Authorized);

    watch.set_allowed_roles([UserRole::Courier]);
    let decision = *decisions
        .wait_for(|d| !d.is_authorized())
        .await
        .unwrap();
    assert_eq!(
        decision,
        GuardDecision::WrongRole {
            role: UserRole::Merchant,
            redirect: "/merchant",
        }
    );
    assert!(watch.allowed_roles().contains(&UserRole::Courier));

    fixture.session.logout().await;
    let decision = *decisions
        .wait_for(|d| matches!(d, GuardDecision::Unauthorized { .. }))
        .await
        .unwrap();
    assert_eq!(decision.redirect(), Some(LOGIN_PATH));
}
