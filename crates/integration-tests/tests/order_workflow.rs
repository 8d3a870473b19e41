//! Integration tests for the order placement workflow and status state
//! machine, exercised at the service level with stubbed providers.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use khaja_core::{OrderId, OrderStatus, Role};
use khaja_integration_tests::{
    FailingNotifier, RecordingNotifier, StubVerifier, count_rows, create_user, test_pool,
};
use khaja_server::db::OrderRepository;
use khaja_server::services::notifications::{NotificationDispatcher, Notifier};
use khaja_server::services::orders::{OrderError, OrderService, PlaceOrder, PlaceOrderLine};
use khaja_server::services::payments::PaymentVerifier;

fn cod_submission() -> PlaceOrder {
    PlaceOrder {
        user_id: None,
        guest_name: Some("Asha".to_owned()),
        guest_phone: Some("9800000001".to_owned()),
        guest_email: None,
        address: "Patan Durbar Square".to_owned(),
        payment_method: "cod".to_owned(),
        payment_token: None,
        amount: None,
        lines: vec![
            PlaceOrderLine {
                item_id: None,
                qty: 2,
                price: Decimal::new(550, 2), // 5.50
            },
            PlaceOrderLine {
                item_id: None,
                qty: 1,
                price: Decimal::new(1000, 2), // 10.00
            },
        ],
    }
}

// =============================================================================
// Placement
// =============================================================================

#[tokio::test]
async fn test_cod_order_computes_total_and_persists_lines() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let placed = service.place(cod_submission()).await.expect("place order");

    assert_eq!(placed.total, Decimal::new(2100, 2)); // 21.00

    let order = OrderRepository::new(&pool)
        .get(placed.id)
        .await
        .expect("fetch")
        .expect("order exists");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::new(2100, 2));
    assert_eq!(order.items.as_deref().map(<[_]>::len), Some(2));
}

#[tokio::test]
async fn test_invalid_payload_writes_nothing() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let mut no_items = cod_submission();
    no_items.lines.clear();
    let mut blank_address = cod_submission();
    blank_address.address = "  ".to_owned();
    let mut no_identity = cod_submission();
    no_identity.guest_name = None;
    let mut zero_qty = cod_submission();
    zero_qty.lines[0].qty = 0;

    for bad in [no_items, blank_address, no_identity, zero_qty] {
        let err = service.place(bad).await.expect_err("rejected");
        assert!(matches!(err, OrderError::InvalidPayload(_)));
    }

    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "order_items").await, 0);
}

#[tokio::test]
async fn test_duplicate_submissions_create_distinct_orders() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let first = service.place(cod_submission()).await.expect("first");
    let second = service.place(cod_submission()).await.expect("second");

    assert_ne!(first.id, second.id);
    assert_eq!(count_rows(&pool, "orders").await, 2);
}

#[tokio::test]
async fn test_contact_snapshot_filled_from_account() {
    let pool = test_pool().await;
    let user_id = create_user(&pool, "Bibek", "9811111111", Role::User).await;
    let service = OrderService::new(&pool, None, None);

    let mut submission = cod_submission();
    submission.user_id = Some(user_id);
    submission.guest_name = None;
    submission.guest_phone = None;

    let placed = service.place(submission).await.expect("place");

    let order = OrderRepository::new(&pool)
        .get(placed.id)
        .await
        .expect("fetch")
        .expect("order exists");
    assert_eq!(order.guest_name.as_deref(), Some("Bibek"));
    assert_eq!(order.guest_phone.as_deref(), Some("9811111111"));
}

#[tokio::test]
async fn test_supplied_contact_wins_over_account() {
    let pool = test_pool().await;
    let user_id = create_user(&pool, "Bibek", "9811111111", Role::User).await;
    let service = OrderService::new(&pool, None, None);

    let mut submission = cod_submission();
    submission.user_id = Some(user_id);

    let placed = service.place(submission).await.expect("place");

    let order = OrderRepository::new(&pool)
        .get(placed.id)
        .await
        .expect("fetch")
        .expect("order exists");
    assert_eq!(order.guest_name.as_deref(), Some("Asha"));
    assert_eq!(order.guest_phone.as_deref(), Some("9800000001"));
}

// =============================================================================
// Wallet payments
// =============================================================================

fn khalti_submission() -> PlaceOrder {
    let mut submission = cod_submission();
    submission.payment_method = "khalti".to_owned();
    submission.payment_token = Some("tok_test".to_owned());
    submission.amount = Some(2100);
    submission
}

#[tokio::test]
async fn test_wallet_without_verifier_is_unavailable() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let err = service
        .place(khalti_submission())
        .await
        .expect_err("no verifier");
    assert!(matches!(err, OrderError::ProviderUnavailable));
    assert_eq!(count_rows(&pool, "orders").await, 0);
}

#[tokio::test]
async fn test_wallet_declined_writes_nothing() {
    let pool = test_pool().await;
    let verifier: Arc<dyn PaymentVerifier> = Arc::new(StubVerifier::declining());
    let service = OrderService::new(&pool, Some(&verifier), None);

    let err = service
        .place(khalti_submission())
        .await
        .expect_err("declined");
    assert!(matches!(err, OrderError::PaymentNotConfirmed));
    assert_eq!(count_rows(&pool, "orders").await, 0);
    assert_eq!(count_rows(&pool, "order_items").await, 0);
}

#[tokio::test]
async fn test_wallet_confirmed_creates_order() {
    let pool = test_pool().await;
    let stub = Arc::new(StubVerifier::confirming());
    let verifier: Arc<dyn PaymentVerifier> = Arc::clone(&stub) as Arc<dyn PaymentVerifier>;
    let service = OrderService::new(&pool, Some(&verifier), None);

    let placed = service.place(khalti_submission()).await.expect("place");

    assert_eq!(stub.calls(), 1);
    assert_eq!(placed.total, Decimal::new(2100, 2));
    assert_eq!(count_rows(&pool, "orders").await, 1);
}

#[tokio::test]
async fn test_wallet_without_token_is_invalid_payload() {
    let pool = test_pool().await;
    let verifier: Arc<dyn PaymentVerifier> = Arc::new(StubVerifier::confirming());
    let service = OrderService::new(&pool, Some(&verifier), None);

    let mut submission = khalti_submission();
    submission.payment_token = None;

    let err = service.place(submission).await.expect_err("no token");
    assert!(matches!(err, OrderError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_card_tag_is_unsupported_on_this_path() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let mut submission = cod_submission();
    submission.payment_method = "stripe".to_owned();

    let err = service.place(submission).await.expect_err("card tag");
    assert!(matches!(err, OrderError::UnsupportedPaymentMethod(_)));
}

#[tokio::test]
async fn test_unknown_payment_tag_is_unsupported() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let mut submission = cod_submission();
    submission.payment_method = "barter".to_owned();

    let err = service.place(submission).await.expect_err("unknown tag");
    assert!(matches!(err, OrderError::UnsupportedPaymentMethod(_)));
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notification_failure_does_not_fail_order() {
    let pool = test_pool().await;
    let notifier = Arc::new(FailingNotifier::new());
    let dispatcher = NotificationDispatcher::with_policy(
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        3,
        Duration::from_millis(1),
    );
    let service = OrderService::new(&pool, None, Some(&dispatcher));

    let placed = service.place(cod_submission()).await.expect("place");
    assert_eq!(count_rows(&pool, "orders").await, 1);

    // Give the detached delivery task time to exhaust its retries.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.calls(), 3);

    // Order stands regardless.
    let order = OrderRepository::new(&pool)
        .get(placed.id)
        .await
        .expect("fetch")
        .expect("order exists");
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_notification_carries_order_id_and_total() {
    let pool = test_pool().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::with_policy(
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        3,
        Duration::from_millis(1),
    );
    let service = OrderService::new(&pool, None, Some(&dispatcher));

    let placed = service.place(cod_submission()).await.expect("place");

    tokio::time::sleep(Duration::from_millis(50)).await;
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let (to, body) = &sent[0];
    assert_eq!(to, "9800000001");
    assert!(body.contains(&format!("#{}", placed.id)));
    assert!(body.contains("21.00"));
}

#[tokio::test]
async fn test_no_phone_means_no_notification() {
    let pool = test_pool().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::with_policy(
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        3,
        Duration::from_millis(1),
    );
    let service = OrderService::new(&pool, None, Some(&dispatcher));

    let mut submission = cod_submission();
    submission.guest_phone = None;
    service.place(submission).await.expect("place");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(notifier.sent().is_empty());
}

// =============================================================================
// Status state machine
// =============================================================================

#[tokio::test]
async fn test_status_walks_the_full_chain() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");

    for target in ["approved", "dispatched", "delivered"] {
        let status = service
            .update_status(placed.id, target)
            .await
            .expect("forward step");
        assert_eq!(status.to_string(), target);
    }
}

#[tokio::test]
async fn test_status_skip_is_rejected_without_mutation() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");

    let err = service
        .update_status(placed.id, "delivered")
        .await
        .expect_err("skip");
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    let order = OrderRepository::new(&pool)
        .get(placed.id)
        .await
        .expect("fetch")
        .expect("order exists");
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_status_reversal_is_rejected() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");

    service
        .update_status(placed.id, "approved")
        .await
        .expect("approve");
    let err = service
        .update_status(placed.id, "pending")
        .await
        .expect_err("reversal");
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_status_delivered_is_terminal() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");

    for target in ["approved", "dispatched", "delivered"] {
        service.update_status(placed.id, target).await.expect("step");
    }

    let err = service
        .update_status(placed.id, "approved")
        .await
        .expect_err("terminal");
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_status_cancelled_is_not_an_updatable_target() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");

    let err = service
        .update_status(placed.id, "cancelled")
        .await
        .expect_err("not allowed");
    assert!(matches!(err, OrderError::InvalidStatus(_)));
}

#[tokio::test]
async fn test_status_garbage_target_is_invalid() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");

    let err = service
        .update_status(placed.id, "shipped")
        .await
        .expect_err("unknown value");
    assert!(matches!(err, OrderError::InvalidStatus(_)));
}

#[tokio::test]
async fn test_status_write_is_conditional_on_current_status() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);
    let placed = service.place(cod_submission()).await.expect("place");
    let repo = OrderRepository::new(&pool);

    // First writer moves the order forward.
    let first = repo
        .update_status(placed.id, OrderStatus::Pending, OrderStatus::Approved)
        .await
        .expect("first write");
    assert_eq!(first, 1);

    // A second writer still holding the stale status writes nothing.
    let second = repo
        .update_status(placed.id, OrderStatus::Pending, OrderStatus::Approved)
        .await
        .expect("second write");
    assert_eq!(second, 0);
    assert_eq!(
        repo.get_status(placed.id).await.expect("status"),
        Some(OrderStatus::Approved)
    );

    // The workflow reports the lost race as a bad transition, not success.
    let err = service
        .update_status(placed.id, "approved")
        .await
        .expect_err("stale transition");
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_status_unknown_order_is_not_found() {
    let pool = test_pool().await;
    let service = OrderService::new(&pool, None, None);

    let err = service
        .update_status(OrderId::new(9999), "approved")
        .await
        .expect_err("unknown order");
    assert!(matches!(err, OrderError::NotFound));
}
