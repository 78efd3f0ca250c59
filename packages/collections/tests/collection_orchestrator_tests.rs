// ABOUTME: Integration tests for the collection orchestrator
// ABOUTME: Tests upserts, fee rules, acceptance, rejection, date sync, orphan cleanup and arrival

mod common;

use autohub_collections::{
    CollectionFilter, CollectionOrchestrator, CollectionStatus, DefineCollectionInput,
};
use autohub_core::UserRole;
use autohub_storage::StorageError;
use autohub_vehicles::{CollectionMethod, VehicleStatus};
use common::{
    collection_count, create_actor, create_address, create_vehicle, day, force_status, setup,
    today, vehicle,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn collect_point(
    vehicle_ids: &[&String],
    address_id: &str,
    date: chrono::NaiveDate,
) -> DefineCollectionInput {
    DefineCollectionInput {
        vehicle_ids: vehicle_ids.iter().map(|id| id.to_string()).collect(),
        method: CollectionMethod::CollectPoint,
        address_id: Some(address_id.to_string()),
        date,
    }
}

#[tokio::test]
async fn test_define_collection_links_vehicles() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let result = orchestrator
        .define_collection(
            &fx.client,
            collect_point(&[&v1.id, &v2.id, &v1.id], &fx.address.id, day(5)),
            today(),
        )
        .await
        .unwrap();

    let collection_id = result.collection_id.unwrap();
    assert_eq!(result.vehicle_ids.len(), 2);

    let detail = orchestrator
        .get_collection(&fx.client, &collection_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.collection.status, CollectionStatus::Requested);
    assert_eq!(detail.summary.collection.collection_fee_per_vehicle, None);
    assert_eq!(detail.summary.vehicle_count, 2);
    assert_eq!(
        detail.summary.collection.collection_address,
        "Rua das Flores, 100 - Centro, Curitiba/PR"
    );

    let linked = vehicle(&fx.pool, &v1.id).await;
    assert_eq!(linked.status, VehicleStatus::AwaitingCollectionApproval);
    assert_eq!(linked.collection_method, Some(CollectionMethod::CollectPoint));
    assert_eq!(linked.pickup_address_id.as_deref(), Some(fx.address.id.as_str()));
    assert_eq!(linked.estimated_arrival_date, Some(day(5)));
    assert_eq!(linked.collection_id.as_deref(), Some(collection_id.as_str()));
}

#[tokio::test]
async fn test_define_collection_reuses_row_and_clears_fee() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let first = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap();
    let collection_id = first.collection_id.unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(80)))
        .await
        .unwrap();

    let second = orchestrator
        .define_collection(&fx.client, collect_point(&[&v2.id], &fx.address.id, day(5)), today())
        .await
        .unwrap();

    assert_eq!(second.collection_id.as_deref(), Some(collection_id.as_str()));
    assert_eq!(collection_count(&fx.pool).await, 1);

    let detail = orchestrator
        .get_collection(&fx.admin, &collection_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.collection.status, CollectionStatus::Requested);
    assert_eq!(detail.summary.collection.collection_fee_per_vehicle, None);
    assert_eq!(detail.summary.vehicle_count, 2);
}

#[tokio::test]
async fn test_define_collection_rejects_approved_date() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let collection_id = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(50)))
        .await
        .unwrap();
    orchestrator
        .accept_collection(&fx.client, &collection_id)
        .await
        .unwrap();

    let err = orchestrator
        .define_collection(&fx.client, collect_point(&[&v2.id], &fx.address.id, day(5)), today())
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(msg) if msg.contains("existing approved collection")));
    assert_eq!(
        vehicle(&fx.pool, &v2.id).await.status,
        VehicleStatus::AwaitingCollectionDefinition
    );
}

#[tokio::test]
async fn test_define_collection_validation() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let past = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(1)), today())
        .await
        .unwrap_err();
    assert!(matches!(past, StorageError::Validation(_)));

    let empty = orchestrator
        .define_collection(&fx.client, collect_point(&[], &fx.address.id, day(5)), today())
        .await
        .unwrap_err();
    assert!(matches!(empty, StorageError::Validation(_)));

    force_status(&fx.pool, &v1.id, VehicleStatus::InAnalysis).await;
    let busy = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap_err();
    assert!(matches!(busy, StorageError::InvalidState(_)));

    let other = create_actor(&fx.pool, "other@example.com", UserRole::Client).await;
    let other_vehicle = create_vehicle(&fx.pool, &other, "OTH1234").await;
    let foreign = orchestrator
        .define_collection(
            &fx.client,
            collect_point(&[&other_vehicle.id], &fx.address.id, day(5)),
            today(),
        )
        .await
        .unwrap_err();
    assert!(matches!(foreign, StorageError::Forbidden(_)));

    assert_eq!(collection_count(&fx.pool).await, 0);
}

#[tokio::test]
async fn test_fee_required_before_acceptance() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let collection_id = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();

    let no_fee = orchestrator
        .set_collection_fee(&fx.admin, &collection_id, None)
        .await
        .unwrap_err();
    assert!(matches!(&no_fee, StorageError::Validation(msg) if msg.contains("no fee selected")));

    let zero_fee = orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(zero_fee, StorageError::Validation(_)));

    let not_admin = orchestrator
        .set_collection_fee(&fx.client, &collection_id, Some(dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(not_admin, StorageError::Forbidden(_)));

    let early = orchestrator
        .accept_collection(&fx.client, &collection_id)
        .await
        .unwrap_err();
    assert!(matches!(&early, StorageError::Validation(msg) if msg.contains("no fee selected")));
}

#[tokio::test]
async fn test_accept_collection_moves_vehicles() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let collection_id = orchestrator
        .define_collection(
            &fx.client,
            collect_point(&[&v1.id, &v2.id], &fx.address.id, day(5)),
            today(),
        )
        .await
        .unwrap()
        .collection_id
        .unwrap();

    let priced = orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(75.50)))
        .await
        .unwrap();
    assert_eq!(priced.collection.status, CollectionStatus::Proposed);
    assert_eq!(priced.total_fee, Some(dec!(151.00)));

    let accepted = orchestrator
        .accept_collection(&fx.client, &collection_id)
        .await
        .unwrap();
    assert_eq!(accepted.collection.status, CollectionStatus::Approved);

    for id in [&v1.id, &v2.id] {
        assert_eq!(
            vehicle(&fx.pool, id).await.status,
            VehicleStatus::AwaitingCollection
        );
    }

    let again = orchestrator
        .accept_collection(&fx.client, &collection_id)
        .await
        .unwrap_err();
    assert!(matches!(again, StorageError::InvalidState(_)));
}

#[tokio::test]
async fn test_reject_collection_unlinks_vehicles() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let collection_id = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(120)))
        .await
        .unwrap();

    let rejected = orchestrator
        .reject_collection(&fx.client, &collection_id, Some("Too expensive".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.collection.status, CollectionStatus::Rejected);
    assert_eq!(
        rejected.collection.rejection_reason.as_deref(),
        Some("Too expensive")
    );
    assert_eq!(rejected.vehicle_count, 0);

    let released = vehicle(&fx.pool, &v1.id).await;
    assert_eq!(released.status, VehicleStatus::AwaitingCollectionDefinition);
    assert!(released.collection_id.is_none());
    assert!(released.estimated_arrival_date.is_none());
    assert!(released.pickup_address_id.is_none());

    // A rejected row at the same key is revived by a new request
    let revived = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap();
    assert_eq!(revived.collection_id.as_deref(), Some(collection_id.as_str()));
    let detail = orchestrator
        .get_collection(&fx.client, &collection_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.collection.status, CollectionStatus::Requested);
    assert_eq!(detail.summary.collection.collection_fee_per_vehicle, None);
    assert!(detail.summary.collection.rejection_reason.is_none());
    assert_eq!(detail.summary.vehicle_count, 1);
    assert_eq!(collection_count(&fx.pool).await, 1);
}

#[tokio::test]
async fn test_propose_new_date_merges_and_removes_orphan() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let early = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    let late = orchestrator
        .define_collection(&fx.client, collect_point(&[&v2.id], &fx.address.id, day(9)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &early, Some(dec!(40)))
        .await
        .unwrap();

    let merged = orchestrator
        .propose_new_date(&fx.admin, &early, day(9), today())
        .await
        .unwrap();

    assert_eq!(merged.collection.id, late);
    assert_eq!(merged.collection.status, CollectionStatus::Proposed);
    assert_eq!(merged.collection.collection_fee_per_vehicle, Some(dec!(40)));
    assert_eq!(merged.vehicle_count, 2);
    assert_eq!(collection_count(&fx.pool).await, 1);

    let moved = vehicle(&fx.pool, &v1.id).await;
    assert_eq!(moved.estimated_arrival_date, Some(day(9)));
    assert_eq!(moved.collection_id.as_deref(), Some(late.as_str()));
}

#[tokio::test]
async fn test_client_date_proposal_resets_fee() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let collection_id = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(40)))
        .await
        .unwrap();

    let moved = orchestrator
        .propose_new_date(&fx.client, &collection_id, day(12), today())
        .await
        .unwrap();

    assert_eq!(moved.collection.id, collection_id);
    assert_eq!(moved.collection.collection_date, day(12));
    assert_eq!(moved.collection.status, CollectionStatus::Requested);
    assert_eq!(moved.collection.collection_fee_per_vehicle, None);
    assert_eq!(
        vehicle(&fx.pool, &v1.id).await.estimated_arrival_date,
        Some(day(12))
    );

    let stranger = create_actor(&fx.pool, "stranger@example.com", UserRole::Client).await;
    let err = orchestrator
        .propose_new_date(&stranger, &collection_id, day(14), today())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));
}

#[tokio::test]
async fn test_propose_new_date_onto_approved_conflicts() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let approved = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(9)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &approved, Some(dec!(30)))
        .await
        .unwrap();
    orchestrator
        .accept_collection(&fx.client, &approved)
        .await
        .unwrap();

    let open = orchestrator
        .define_collection(&fx.client, collect_point(&[&v2.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();

    let err = orchestrator
        .propose_new_date(&fx.admin, &open, day(9), today())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
    assert_eq!(
        vehicle(&fx.pool, &v2.id).await.estimated_arrival_date,
        Some(day(5))
    );
}

#[tokio::test]
async fn test_bring_to_yard_detaches_and_cleans_orphans() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap();
    assert_eq!(collection_count(&fx.pool).await, 1);

    let result = orchestrator
        .define_collection(
            &fx.client,
            DefineCollectionInput {
                vehicle_ids: vec![v1.id.clone()],
                method: CollectionMethod::BringToYard,
                address_id: None,
                date: day(6),
            },
            today(),
        )
        .await
        .unwrap();

    assert!(result.collection_id.is_none());
    assert_eq!(result.orphans_removed, 1);
    assert_eq!(collection_count(&fx.pool).await, 0);

    let yard = vehicle(&fx.pool, &v1.id).await;
    assert_eq!(yard.status, VehicleStatus::AwaitingArrival);
    assert_eq!(yard.collection_method, Some(CollectionMethod::BringToYard));
    assert_eq!(yard.estimated_arrival_date, Some(day(6)));
    assert!(yard.pickup_address_id.is_none());
    assert!(yard.collection_id.is_none());
}

#[tokio::test]
async fn test_collect_point_address_checks() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let other = create_actor(&fx.pool, "other@example.com", UserRole::Client).await;
    let other_address = create_address(&fx.pool, &other, "Rua Alheia").await;
    let err = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &other_address.id, day(5)), today())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));

    let missing = orchestrator
        .define_collection(
            &fx.client,
            DefineCollectionInput {
                vehicle_ids: vec![v1.id.clone()],
                method: CollectionMethod::CollectPoint,
                address_id: None,
                date: day(5),
            },
            today(),
        )
        .await
        .unwrap_err();
    assert!(matches!(missing, StorageError::Validation(_)));
}

#[tokio::test]
async fn test_confirm_arrival_completes_collection() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    let v2 = create_vehicle(&fx.pool, &fx.client, "XYZ9876").await;

    let collection_id = orchestrator
        .define_collection(
            &fx.client,
            collect_point(&[&v1.id, &v2.id], &fx.address.id, day(5)),
            today(),
        )
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(60)))
        .await
        .unwrap();
    orchestrator
        .accept_collection(&fx.client, &collection_id)
        .await
        .unwrap();

    let arrived = orchestrator
        .confirm_arrival(&fx.admin, &v1.id)
        .await
        .unwrap();
    assert_eq!(arrived.status, VehicleStatus::ArrivalConfirmed);

    let detail = orchestrator
        .get_collection(&fx.admin, &collection_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.collection.status, CollectionStatus::Approved);

    orchestrator
        .confirm_arrival(&fx.admin, &v2.id)
        .await
        .unwrap();
    let detail = orchestrator
        .get_collection(&fx.admin, &collection_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.collection.status, CollectionStatus::Completed);

    let twice = orchestrator
        .confirm_arrival(&fx.admin, &v2.id)
        .await
        .unwrap_err();
    assert!(matches!(twice, StorageError::InvalidState(_)));
}

#[tokio::test]
async fn test_confirm_arrival_requires_linked_specialist() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    force_status(&fx.pool, &v1.id, VehicleStatus::AwaitingArrival).await;

    let specialist = create_actor(&fx.pool, "spec@example.com", UserRole::Specialist).await;
    let err = orchestrator
        .confirm_arrival(&specialist, &v1.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));

    autohub_security::UserStorage::new(fx.pool.clone())
        .link_specialist(&fx.client.id, &specialist.id)
        .await
        .unwrap();
    let arrived = orchestrator
        .confirm_arrival(&specialist, &v1.id)
        .await
        .unwrap();
    assert_eq!(arrived.status, VehicleStatus::ArrivalConfirmed);

    let client_err = orchestrator
        .confirm_arrival(&fx.client, &v1.id)
        .await
        .unwrap_err();
    assert!(matches!(client_err, StorageError::Forbidden(_)));
}

#[tokio::test]
async fn test_list_collections_is_scoped() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;
    orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap();

    let other = create_actor(&fx.pool, "other@example.com", UserRole::Client).await;
    let other_address = create_address(&fx.pool, &other, "Rua B").await;
    let other_vehicle = create_vehicle(&fx.pool, &other, "OTH1234").await;
    orchestrator
        .define_collection(&other, collect_point(&[&other_vehicle.id], &other_address.id, day(7)), today())
        .await
        .unwrap();

    let all = orchestrator
        .list_collections(&fx.admin, CollectionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].collection.collection_date, day(5));

    let own = orchestrator
        .list_collections(&fx.client, CollectionFilter::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].collection.client_id, fx.client.id);

    let approved = orchestrator
        .list_collections(
            &fx.admin,
            CollectionFilter {
                status: Some(CollectionStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(approved.is_empty());

    let partner = create_actor(&fx.pool, "partner@example.com", UserRole::Partner).await;
    let err = orchestrator
        .list_collections(&partner, CollectionFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));

    let removed = orchestrator.cleanup_orphans(&fx.admin, None).await.unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn test_admin_date_move_without_target_keeps_fee() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let collection_id = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();
    orchestrator
        .set_collection_fee(&fx.admin, &collection_id, Some(dec!(55.50)))
        .await
        .unwrap();

    let moved = orchestrator
        .propose_new_date(&fx.admin, &collection_id, day(12), today())
        .await
        .unwrap();

    assert_eq!(moved.collection.id, collection_id);
    assert_eq!(moved.collection.collection_date, day(12));
    assert_eq!(moved.collection.status, CollectionStatus::Proposed);
    assert_eq!(moved.collection.collection_fee_per_vehicle, Some(dec!(55.50)));
    assert_eq!(moved.vehicle_count, 1);
    assert_eq!(collection_count(&fx.pool).await, 1);
    assert_eq!(
        vehicle(&fx.pool, &v1.id).await.estimated_arrival_date,
        Some(day(12))
    );
}

#[tokio::test]
async fn test_oversized_fee_is_a_validation_error() {
    let fx = setup().await;
    let orchestrator = CollectionOrchestrator::new(fx.pool.clone());
    let v1 = create_vehicle(&fx.pool, &fx.client, "ABC1D23").await;

    let collection_id = orchestrator
        .define_collection(&fx.client, collect_point(&[&v1.id], &fx.address.id, day(5)), today())
        .await
        .unwrap()
        .collection_id
        .unwrap();

    for fee in [Decimal::MAX, dec!(1000000000.01)] {
        let err = orchestrator
            .set_collection_fee(&fx.admin, &collection_id, Some(fee))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    let detail = orchestrator
        .get_collection(&fx.admin, &collection_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.collection.status, CollectionStatus::Requested);
    assert_eq!(detail.summary.collection.collection_fee_per_vehicle, None);
}
