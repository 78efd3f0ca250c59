// ABOUTME: Collection orchestration across vehicles and vehicle_collections
// ABOUTME: Define, price, reschedule, accept, reject and reconcile pickups in single transactions

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::storage::{self, CollectionStorage};
use super::types::{
    CollectionDetail, CollectionFilter, CollectionStatus, CollectionSummary,
    DefineCollectionInput, DefineCollectionResult, VehicleCollection,
};
use autohub_core::{validate_collection_fee, Actor, UserRole, ValidationError};
use autohub_security::{ensure_admin, ensure_client_access, UserStorage};
use autohub_storage::{placeholders, StorageError};
use autohub_vehicles::{
    row_to_vehicle, transition_vehicles, AddressStorage, CollectionMethod, Vehicle, VehicleStatus,
};

pub struct CollectionOrchestrator {
    pool: SqlitePool,
    collections: CollectionStorage,
    addresses: AddressStorage,
    users: UserStorage,
}

impl CollectionOrchestrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            collections: CollectionStorage::new(pool.clone()),
            addresses: AddressStorage::new(pool.clone()),
            users: UserStorage::new(pool.clone()),
            pool,
        }
    }

    /// Choose how the client's vehicles reach the yard.
    ///
    /// `collect_point` upserts the collection for `(client, address, date)` and
    /// links the vehicles to it; `bring_to_yard` detaches them from any pickup.
    pub async fn define_collection(
        &self,
        actor: &Actor,
        input: DefineCollectionInput,
        today: NaiveDate,
    ) -> Result<DefineCollectionResult, StorageError> {
        actor.require_role(&[UserRole::Client])?;

        let mut vehicle_ids: Vec<String> = Vec::with_capacity(input.vehicle_ids.len());
        for id in input.vehicle_ids {
            if !vehicle_ids.contains(&id) {
                vehicle_ids.push(id);
            }
        }
        if vehicle_ids.is_empty() {
            return Err(StorageError::Validation(
                "At least one vehicle is required".to_string(),
            ));
        }
        if input.date < today {
            return Err(StorageError::Validation(format!(
                "Collection date {} is in the past",
                input.date
            )));
        }

        let address = match input.method {
            CollectionMethod::CollectPoint => {
                let address_id = input.address_id.as_deref().ok_or_else(|| {
                    StorageError::Validation("address_id is required for collect_point".to_string())
                })?;
                let address = self.addresses.get_address(address_id).await?;
                if address.client_id != actor.id {
                    return Err(StorageError::Forbidden(format!(
                        "Address {} does not belong to client {}",
                        address.id, actor.id
                    )));
                }
                if !address.is_collect_point {
                    return Err(StorageError::Validation(format!(
                        "Address {} is not a collect point",
                        address.id
                    )));
                }
                Some(address)
            }
            CollectionMethod::BringToYard => None,
        };

        let mut tx = self.pool.begin().await?;

        for vehicle in load_vehicles(&mut tx, &vehicle_ids).await? {
            if vehicle.client_id != actor.id {
                return Err(StorageError::Forbidden(format!(
                    "Vehicle {} does not belong to client {}",
                    vehicle.id, actor.id
                )));
            }
            if !VehicleStatus::COLLECTION_PENDING.contains(&vehicle.status) {
                return Err(StorageError::InvalidState(format!(
                    "Vehicle {} is {} and its collection can no longer be defined",
                    vehicle.plate, vehicle.status
                )));
            }
        }

        let collection_id = match address {
            Some(address) => {
                let collection_id =
                    match storage::find_by_key(&mut tx, &actor.id, &address.id, input.date).await? {
                        Some(existing) if existing.status.is_locked() => {
                            return Err(StorageError::Conflict(
                                "existing approved collection for this date".to_string(),
                            ));
                        }
                        Some(existing) => {
                            storage::set_status_and_fee(
                                &mut tx,
                                &existing.id,
                                CollectionStatus::Requested,
                                None,
                            )
                            .await?;
                            existing.id
                        }
                        None => {
                            storage::insert_collection(
                                &mut tx,
                                &actor.id,
                                &address.id,
                                &address.label(),
                                input.date,
                            )
                            .await?
                        }
                    };

                storage::link_vehicles(
                    &mut tx,
                    &vehicle_ids,
                    Some(CollectionMethod::CollectPoint),
                    Some(&address.id),
                    Some(input.date),
                    Some(&collection_id),
                )
                .await?;
                transition_vehicles(
                    &mut tx,
                    &vehicle_ids,
                    &[VehicleStatus::AwaitingCollectionDefinition],
                    VehicleStatus::AwaitingCollectionApproval,
                    &actor.id,
                    Some("collection requested"),
                )
                .await?;

                Some(collection_id)
            }
            None => {
                storage::link_vehicles(
                    &mut tx,
                    &vehicle_ids,
                    Some(CollectionMethod::BringToYard),
                    None,
                    Some(input.date),
                    None,
                )
                .await?;
                transition_vehicles(
                    &mut tx,
                    &vehicle_ids,
                    &VehicleStatus::COLLECTION_PENDING,
                    VehicleStatus::AwaitingArrival,
                    &actor.id,
                    Some("client brings vehicle to the yard"),
                )
                .await?;

                None
            }
        };

        let orphans_removed = storage::delete_orphans(&mut tx, Some(&actor.id)).await?;

        tx.commit().await?;

        info!(
            "Collection defined for {} vehicles of client {} ({:?})",
            vehicle_ids.len(),
            actor.id,
            input.method
        );

        Ok(DefineCollectionResult {
            collection_id,
            vehicle_ids,
            orphans_removed,
        })
    }

    /// Price a requested collection per vehicle
    pub async fn set_collection_fee(
        &self,
        actor: &Actor,
        collection_id: &str,
        fee: Option<Decimal>,
    ) -> Result<CollectionSummary, StorageError> {
        ensure_admin(actor)?;
        let fee = validate_collection_fee(fee)?;

        let mut tx = self.pool.begin().await?;

        let collection = storage::get_collection(&mut tx, collection_id).await?;
        ensure_open(&collection)?;
        storage::set_status_and_fee(&mut tx, collection_id, CollectionStatus::Proposed, Some(fee))
            .await?;

        tx.commit().await?;

        info!("Collection {} priced at {} per vehicle", collection_id, fee);
        self.collections.get_summary(collection_id).await
    }

    /// Move a collection, and every pending vehicle sharing its address and date, to `new_date`
    pub async fn propose_new_date(
        &self,
        actor: &Actor,
        collection_id: &str,
        new_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<CollectionSummary, StorageError> {
        actor.require_role(&[UserRole::Client, UserRole::Admin])?;
        if new_date < today {
            return Err(StorageError::Validation(format!(
                "Collection date {} is in the past",
                new_date
            )));
        }

        let mut tx = self.pool.begin().await?;

        let collection = storage::get_collection(&mut tx, collection_id).await?;
        ensure_owner_or_admin(actor, &collection)?;
        ensure_open(&collection)?;

        if collection.collection_date == new_date {
            tx.commit().await?;
            return self.collections.get_summary(collection_id).await;
        }

        let target = storage::find_by_key(
            &mut tx,
            &collection.client_id,
            &collection.address_id,
            new_date,
        )
        .await?;
        if target.as_ref().is_some_and(|t| t.status.is_locked()) {
            return Err(StorageError::Conflict(
                "existing approved collection for this date".to_string(),
            ));
        }

        let vehicle_ids = vehicles_sharing_pickup(&mut tx, &collection).await?;

        let destination_id = match target {
            Some(target) => {
                let (status, fee) = if actor.is_admin() {
                    (collection.status, collection.collection_fee_per_vehicle)
                } else {
                    (CollectionStatus::Requested, None)
                };
                storage::set_status_and_fee(&mut tx, &target.id, status, fee).await?;
                debug!(
                    "Merging collection {} into {} at {}",
                    collection.id, target.id, new_date
                );
                target.id
            }
            None => {
                storage::set_date(&mut tx, &collection.id, new_date).await?;
                if !actor.is_admin() {
                    storage::set_status_and_fee(
                        &mut tx,
                        &collection.id,
                        CollectionStatus::Requested,
                        None,
                    )
                    .await?;
                }
                collection.id.clone()
            }
        };

        storage::reschedule_vehicles(&mut tx, &vehicle_ids, new_date, &destination_id).await?;
        storage::delete_orphans(&mut tx, Some(&collection.client_id)).await?;

        tx.commit().await?;

        info!(
            "Collection {} moved from {} to {} ({} vehicles)",
            collection_id,
            collection.collection_date,
            new_date,
            vehicle_ids.len()
        );
        self.collections.get_summary(&destination_id).await
    }

    pub async fn accept_collection(
        &self,
        actor: &Actor,
        collection_id: &str,
    ) -> Result<CollectionSummary, StorageError> {
        actor.require_role(&[UserRole::Client])?;

        let mut tx = self.pool.begin().await?;

        let collection = storage::get_collection(&mut tx, collection_id).await?;
        ensure_owner(actor, &collection)?;

        match (collection.status, collection.collection_fee_per_vehicle) {
            (CollectionStatus::Requested, _) | (CollectionStatus::Proposed, None) => {
                return Err(ValidationError::MissingFee.into());
            }
            (CollectionStatus::Proposed, Some(_)) => {}
            (status, _) => {
                return Err(StorageError::InvalidState(format!(
                    "Collection {} is {} and cannot be accepted",
                    collection_id, status
                )));
            }
        }

        storage::set_status(&mut tx, collection_id, CollectionStatus::Approved, None).await?;

        let linked = storage::linked_vehicle_ids(&mut tx, collection_id).await?;
        transition_vehicles(
            &mut tx,
            &linked,
            &[VehicleStatus::AwaitingCollectionApproval],
            VehicleStatus::AwaitingCollection,
            &actor.id,
            Some("collection approved"),
        )
        .await?;

        tx.commit().await?;

        info!("Collection {} approved by client {}", collection_id, actor.id);
        self.collections.get_summary(collection_id).await
    }

    pub async fn reject_collection(
        &self,
        actor: &Actor,
        collection_id: &str,
        reason: Option<String>,
    ) -> Result<CollectionSummary, StorageError> {
        actor.require_role(&[UserRole::Client])?;

        let mut tx = self.pool.begin().await?;

        let collection = storage::get_collection(&mut tx, collection_id).await?;
        ensure_owner(actor, &collection)?;
        ensure_open(&collection)?;

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        storage::set_status(
            &mut tx,
            collection_id,
            CollectionStatus::Rejected,
            reason.as_deref(),
        )
        .await?;

        let linked = storage::linked_vehicle_ids(&mut tx, collection_id).await?;
        storage::link_vehicles(&mut tx, &linked, None, None, None, None).await?;
        transition_vehicles(
            &mut tx,
            &linked,
            &[VehicleStatus::AwaitingCollectionApproval],
            VehicleStatus::AwaitingCollectionDefinition,
            &actor.id,
            Some("collection rejected"),
        )
        .await?;

        tx.commit().await?;

        info!(
            "Collection {} rejected by client {} ({} vehicles released)",
            collection_id,
            actor.id,
            linked.len()
        );
        self.collections.get_summary(collection_id).await
    }

    /// Delete open collections with no linked vehicles
    pub async fn cleanup_orphans(
        &self,
        actor: &Actor,
        client_id: Option<&str>,
    ) -> Result<u64, StorageError> {
        ensure_admin(actor)?;

        let mut conn = self.pool.acquire().await?;
        let removed = storage::delete_orphans(&mut conn, client_id).await?;

        info!("Orphan cleanup removed {} collections", removed);
        Ok(removed)
    }

    /// Record a vehicle reaching the yard and complete its collection once all arrived
    pub async fn confirm_arrival(
        &self,
        actor: &Actor,
        vehicle_id: &str,
    ) -> Result<Vehicle, StorageError> {
        actor.require_role(&[UserRole::Admin, UserRole::Specialist])?;

        let client_id: String = sqlx::query_scalar("SELECT client_id FROM vehicles WHERE id = ?")
            .bind(vehicle_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::not_found_or("Vehicle"))?;
        ensure_client_access(&self.pool, actor, &client_id).await?;

        let mut tx = self.pool.begin().await?;

        let ids = vec![vehicle_id.to_string()];
        let moved = transition_vehicles(
            &mut tx,
            &ids,
            &[VehicleStatus::AwaitingCollection, VehicleStatus::AwaitingArrival],
            VehicleStatus::ArrivalConfirmed,
            &actor.id,
            Some("arrival confirmed"),
        )
        .await?;
        if moved.is_empty() {
            return Err(StorageError::InvalidState(format!(
                "Vehicle {} is not awaiting arrival",
                vehicle_id
            )));
        }

        let vehicle = load_vehicles(&mut tx, &ids)
            .await?
            .pop()
            .ok_or_else(|| StorageError::NotFound("Vehicle".to_string()))?;

        if let Some(collection_id) = &vehicle.collection_id {
            let collection = storage::get_collection(&mut tx, collection_id).await?;
            let waiting: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM vehicles WHERE collection_id = ? AND status = ?",
            )
            .bind(collection_id)
            .bind(VehicleStatus::AwaitingCollection)
            .fetch_one(&mut *tx)
            .await?;

            if collection.status == CollectionStatus::Approved && waiting == 0 {
                storage::set_status(&mut tx, collection_id, CollectionStatus::Completed, None)
                    .await?;
                info!("Collection {} completed", collection_id);
            }
        }

        tx.commit().await?;

        info!("Arrival confirmed for vehicle {}", vehicle_id);
        Ok(vehicle)
    }

    /// Collections visible to the actor; partners have no access
    pub async fn list_collections(
        &self,
        actor: &Actor,
        filter: CollectionFilter,
    ) -> Result<Vec<CollectionSummary>, StorageError> {
        match actor.role {
            UserRole::Admin => self.collections.list_summaries(None, &filter).await,
            UserRole::Client => {
                let own = [actor.id.clone()];
                self.collections.list_summaries(Some(&own), &filter).await
            }
            UserRole::Specialist => {
                let clients: Vec<String> = self
                    .users
                    .list_specialist_clients(&actor.id)
                    .await?
                    .into_iter()
                    .map(|user| user.id)
                    .collect();
                self.collections.list_summaries(Some(&clients), &filter).await
            }
            UserRole::Partner => Err(StorageError::Forbidden(
                "Partners cannot view collections".to_string(),
            )),
        }
    }

    pub async fn get_collection(
        &self,
        actor: &Actor,
        collection_id: &str,
    ) -> Result<CollectionDetail, StorageError> {
        let detail = self.collections.get_detail(collection_id).await?;
        ensure_client_access(&self.pool, actor, &detail.summary.collection.client_id).await?;
        Ok(detail)
    }
}

fn ensure_open(collection: &VehicleCollection) -> Result<(), StorageError> {
    if collection.status.is_open() {
        Ok(())
    } else {
        Err(StorageError::InvalidState(format!(
            "Collection {} is {}",
            collection.id, collection.status
        )))
    }
}

fn ensure_owner(actor: &Actor, collection: &VehicleCollection) -> Result<(), StorageError> {
    if collection.client_id == actor.id {
        Ok(())
    } else {
        Err(StorageError::Forbidden(format!(
            "Collection {} belongs to another client",
            collection.id
        )))
    }
}

fn ensure_owner_or_admin(actor: &Actor, collection: &VehicleCollection) -> Result<(), StorageError> {
    if actor.is_admin() {
        Ok(())
    } else {
        ensure_owner(actor, collection)
    }
}

/// Load vehicles by id, failing if any is missing
async fn load_vehicles(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> Result<Vec<Vehicle>, StorageError> {
    let query = format!(
        "SELECT * FROM vehicles WHERE id IN ({}) ORDER BY plate",
        placeholders(ids.len())
    );
    let mut select = sqlx::query(&query);
    for id in ids {
        select = select.bind(id);
    }
    let rows = select.fetch_all(&mut *conn).await?;

    let vehicles = rows
        .iter()
        .map(row_to_vehicle)
        .collect::<Result<Vec<Vehicle>, _>>()?;

    if let Some(missing) = ids.iter().find(|id| !vehicles.iter().any(|v| &v.id == *id)) {
        return Err(StorageError::NotFound(format!("Vehicle {}", missing)));
    }

    Ok(vehicles)
}

/// Vehicles linked to the collection plus pending vehicles at the same pickup and date
async fn vehicles_sharing_pickup(
    conn: &mut SqliteConnection,
    collection: &VehicleCollection,
) -> Result<Vec<String>, StorageError> {
    let query = format!(
        r#"
        SELECT id FROM vehicles
        WHERE collection_id = ?
           OR (client_id = ? AND pickup_address_id = ? AND estimated_arrival_date = ?
               AND status IN ({}))
        ORDER BY plate
        "#,
        placeholders(VehicleStatus::COLLECTION_PENDING.len())
    );

    let mut select = sqlx::query_scalar::<_, String>(&query)
        .bind(&collection.id)
        .bind(&collection.client_id)
        .bind(&collection.address_id)
        .bind(collection.collection_date);
    for status in VehicleStatus::COLLECTION_PENDING {
        select = select.bind(status);
    }

    Ok(select.fetch_all(&mut *conn).await?)
}
