//! Integration tests for booking status transitions.
//!
//! Tests cover:
//! - The start/complete/cancel scenarios staff and admins run into
//! - Success if and only if the edge exists and the role is granted it
//! - Failed requests leave the stored status untouched

mod common;

use common::*;
use uuid::Uuid;

#[tokio::test]
async fn staff_starts_an_assigned_job() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let booking = booking_in_status(&db, &cast.customer, Some(&cast.staff), BookingStatus::Assigned).await;
    assert!(can_start(&booking));
    assert!(!can_complete(&booking));

    let lifecycle = BookingLifecycle::new(db.clone());
    let started = lifecycle
        .request_transition(booking.id, BookingStatus::InProgress, Role::Staff)
        .await?;

    assert_eq!(started.status, BookingStatus::InProgress);
    assert!(can_complete(&started));
    assert!(!can_start(&started));

    let stored = db.fetch_booking(booking.id).await?.expect("booking exists");
    assert_eq!(stored.status, BookingStatus::InProgress);
    Ok(())
}

#[tokio::test]
async fn staff_completes_a_started_job() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let booking = booking_in_status(&db, &cast.customer, Some(&cast.staff), BookingStatus::InProgress).await;

    let lifecycle = BookingLifecycle::new(db.clone());
    let done = lifecycle
        .request_transition(booking.id, BookingStatus::Completed, Role::Staff)
        .await?;

    assert_eq!(done.status, BookingStatus::Completed);
    assert!(!can_start(&done));
    assert!(!can_complete(&done));
    Ok(())
}

#[tokio::test]
async fn staff_cannot_assign_a_pending_booking() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let booking = booking_in_status(&db, &cast.customer, None, BookingStatus::Pending).await;

    let lifecycle = BookingLifecycle::new(db.clone());
    let err = lifecycle
        .request_transition(booking.id, BookingStatus::Assigned, Role::Staff)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), TransitionErrorKind::Forbidden);
    let stored = db.fetch_booking(booking.id).await?.expect("booking exists");
    assert_eq!(stored.status, BookingStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_cancel_a_completed_booking() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let booking = booking_in_status(&db, &cast.customer, Some(&cast.staff), BookingStatus::Completed).await;

    let lifecycle = BookingLifecycle::new(db.clone());
    let err = lifecycle
        .request_transition(booking.id, BookingStatus::Cancelled, Role::Admin)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransitionError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled
        }
    ));
    let stored = db.fetch_booking(booking.id).await?.expect("booking exists");
    assert_eq!(stored.status, BookingStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn unknown_booking_is_not_found_for_every_role() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let lifecycle = BookingLifecycle::new(db.clone());
    let missing = Uuid::new_v4();

    for role in [Role::Customer, Role::Staff, Role::Admin] {
        for target in BookingStatus::ALL {
            let err = lifecycle
                .request_transition(missing, target, role)
                .await
                .unwrap_err();
            assert!(
                matches!(err, TransitionError::NotFound { booking_id } if booking_id == missing),
                "{role} -> {target}: {err}"
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn customer_may_not_transition() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let booking = booking_in_status(&db, &cast.customer, None, BookingStatus::Pending).await;

    let lifecycle = BookingLifecycle::new(db.clone());
    let err = lifecycle
        .request_transition(booking.id, BookingStatus::Cancelled, Role::Customer)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), TransitionErrorKind::Forbidden);
    Ok(())
}

#[tokio::test]
async fn succeeds_iff_edge_exists_and_role_is_granted() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let lifecycle = BookingLifecycle::new(db.clone());

    for role in [Role::Customer, Role::Staff, Role::Admin] {
        for from in BookingStatus::ALL {
            for target in BookingStatus::ALL {
                let booking = booking_in_status(&db, &cast.customer, Some(&cast.staff), from).await;
                let expected = from.can_transition_to(target) && role.may_request(from, target);

                let result = lifecycle.request_transition(booking.id, target, role).await;
                let stored = db.fetch_booking(booking.id).await?.expect("booking exists");

                match result {
                    Ok(updated) => {
                        assert!(expected, "{role}: {from} -> {target} should have failed");
                        assert_eq!(updated.status, target);
                        assert_eq!(stored.status, target);
                    }
                    Err(err) => {
                        assert!(!expected, "{role}: {from} -> {target} failed: {err}");
                        assert!(matches!(
                            err.kind(),
                            TransitionErrorKind::Forbidden | TransitionErrorKind::InvalidTransition
                        ));
                        assert_eq!(stored.status, from, "failed request changed the status");
                    }
                }
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn terminal_bookings_never_move() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let lifecycle = BookingLifecycle::new(db.clone());

    for terminal in [BookingStatus::Completed, BookingStatus::Cancelled] {
        let booking = booking_in_status(&db, &cast.customer, Some(&cast.staff), terminal).await;
        for role in [Role::Customer, Role::Staff, Role::Admin] {
            let expected = match role {
                Role::Customer => TransitionErrorKind::Forbidden,
                Role::Staff | Role::Admin => TransitionErrorKind::InvalidTransition,
            };
            for target in BookingStatus::ALL {
                let err = lifecycle
                    .request_transition(booking.id, target, role)
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), expected, "{role}: {terminal} -> {target}");
            }
        }
        let stored = db.fetch_booking(booking.id).await?.expect("booking exists");
        assert_eq!(stored.status, terminal);
    }
    Ok(())
}

#[tokio::test]
async fn admin_can_confirm_and_assign() -> anyhow::Result<()> {
    let db = create_memory_db().await;
    let cast = make_cast(&db).await;
    let booking = booking_in_status(&db, &cast.customer, None, BookingStatus::Pending).await;
    let lifecycle = BookingLifecycle::new(db.clone());

    let confirmed = lifecycle
        .request_transition(booking.id, BookingStatus::Confirmed, Role::Admin)
        .await?;
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    db.assign_staff(booking.id, cast.staff.id).await?;
    let assigned = lifecycle
        .request_transition(booking.id, BookingStatus::Assigned, Role::Admin)
        .await?;
    assert_eq!(assigned.status, BookingStatus::Assigned);
    assert_eq!(assigned.assigned_staff_id, Some(cast.staff.id));
    assert!(assigned.updated_at >= booking.updated_at);
    Ok(())
}
