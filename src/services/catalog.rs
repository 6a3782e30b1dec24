use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{NewService, Service, ServicePatch};
use crate::services::scheduling::find_service;

pub fn create_service(conn: &Connection, new: &NewService) -> Result<Service, AppError> {
    let id = queries::create_service(conn, new)?;
    tracing::info!(service_id = id, name = %new.name, "service created");
    find_service(conn, id)
}

/// Name, price and description are always editable. The duration is frozen
/// once any booking points at the service, since booked intervals derive
/// from it.
pub fn update_service(conn: &mut Connection, id: i64, patch: ServicePatch) -> Result<Service, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut service = find_service(&tx, id)?;

    if patch
        .duration_minutes
        .is_some_and(|duration| duration != service.duration_minutes)
    {
        let referenced = queries::count_bookings_for_service(&tx, id)?;
        if referenced > 0 {
            tracing::warn!(service_id = id, bookings = referenced, "refusing to change duration of referenced service");
            return Err(AppError::Conflict(
                "cannot change the duration of a service that has bookings".to_string(),
            ));
        }
    }

    service.apply(patch);
    queries::update_service(&tx, &service)?;
    let service = find_service(&tx, id)?;
    tx.commit()?;

    tracing::info!(service_id = id, "service updated");
    Ok(service)
}

/// Services stay while any booking, cancelled or not, still points at them.
pub fn delete_service(conn: &Connection, id: i64) -> Result<(), AppError> {
    find_service(conn, id)?;

    let referenced = queries::count_bookings_for_service(conn, id)?;
    if referenced > 0 {
        tracing::warn!(service_id = id, bookings = referenced, "refusing to delete referenced service");
        return Err(AppError::Conflict(
            "cannot delete a service that has bookings".to_string(),
        ));
    }

    queries::delete_service(conn, id)?;
    tracing::info!(service_id = id, "service deleted");
    Ok(())
}
