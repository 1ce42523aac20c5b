use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use super::{
    dto::SlotRequest,
    repo::{Availability, NewAvailability},
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    wire::clean_optional,
};

pub const MAX_SLOTS_PER_REQUEST: usize = 100;

/// Checks one slot descriptor and binds it to the host.
pub fn validate_slot(host_id: Uuid, slot: SlotRequest) -> ApiResult<NewAvailability> {
    if slot.start_time >= slot.end_time {
        return Err(ApiError::bad_request("start_time must be before end_time"));
    }
    if slot.max_capacity < 1 {
        return Err(ApiError::bad_request("max_capacity must be at least 1"));
    }
    if let Some(p) = slot.price_override {
        if !p.is_finite() || p < 0.0 {
            return Err(ApiError::bad_request("price_override must be >= 0"));
        }
    }
    Ok(NewAvailability {
        host_id,
        experience_id: slot.experience_id,
        available_date: slot.available_date,
        start_time: slot.start_time,
        end_time: slot.end_time,
        max_capacity: slot.max_capacity,
        price_override: slot.price_override,
        notes: clean_optional(slot.notes),
    })
}

/// Persists a host's proposed schedule.
///
/// Every slot becomes its own row: overlapping or repeated slots are stored
/// as-is, so submitting the same payload twice yields two sets of rows.
pub async fn add_slots(
    state: &AppState,
    host_id: Uuid,
    slots: Vec<SlotRequest>,
) -> ApiResult<Vec<Availability>> {
    if slots.is_empty() {
        return Err(ApiError::bad_request("slots must be non-empty"));
    }
    if slots.len() > MAX_SLOTS_PER_REQUEST {
        return Err(ApiError::bad_request("too many slots in one request"));
    }

    let referenced: HashSet<Uuid> = slots.iter().filter_map(|s| s.experience_id).collect();
    for experience_id in referenced {
        let owned = state
            .store
            .experience_by_id(experience_id)
            .await?
            .is_some_and(|e| e.host_id == host_id);
        if !owned {
            return Err(ApiError::not_found("Experience not found"));
        }
    }

    let rows = slots
        .into_iter()
        .map(|s| validate_slot(host_id, s))
        .collect::<ApiResult<Vec<_>>>()?;
    let inserted = state.store.insert_availability(rows).await?;
    info!(%host_id, count = inserted.len(), "availability slots added");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::repo::AvailabilityFilter;
    use crate::experiences::repo::{ActivityType, Difficulty, NewExperience};
    use time::macros::{date, time};

    fn slot() -> SlotRequest {
        SlotRequest {
            experience_id: None,
            available_date: date!(2030 - 08 - 01),
            start_time: time!(9:00),
            end_time: time!(11:00),
            max_capacity: 6,
            price_override: None,
            notes: None,
        }
    }

    #[test]
    fn rejects_inverted_window_and_zero_capacity() {
        let mut s = slot();
        s.end_time = time!(9:00);
        assert!(validate_slot(Uuid::nil(), s).is_err());

        let mut s = slot();
        s.max_capacity = 0;
        assert!(validate_slot(Uuid::nil(), s).is_err());

        let mut s = slot();
        s.price_override = Some(-5.0);
        assert!(validate_slot(Uuid::nil(), s).is_err());
    }

    #[tokio::test]
    async fn identical_submissions_create_distinct_rows() {
        let state = AppState::fake();
        let host = Uuid::new_v4();

        let first = add_slots(&state, host, vec![slot()]).await.unwrap();
        let second = add_slots(&state, host, vec![slot()]).await.unwrap();
        assert_ne!(first[0].id, second[0].id);

        let all = state
            .store
            .list_availability(AvailabilityFilter {
                host_id: Some(host),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].start_time, all[1].start_time);
    }

    #[tokio::test]
    async fn overlapping_slots_are_accepted() {
        let state = AppState::fake();
        let mut late = slot();
        late.start_time = time!(10:00);
        late.end_time = time!(12:00);
        let rows = add_slots(&state, Uuid::new_v4(), vec![slot(), late])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn rejects_foreign_experience() {
        let state = AppState::fake();
        let other_host = Uuid::new_v4();
        let exp = state
            .store
            .create_experience(NewExperience {
                host_id: other_host,
                title: "Jet ski".into(),
                description: None,
                location: "Marina".into(),
                activity_type: ActivityType::JetSki,
                difficulty_level: Difficulty::Intermediate,
                price_per_person: 120.0,
                duration_hours: 1.0,
                min_guests: 1,
                max_guests: 2,
            })
            .await
            .unwrap();

        let mut s = slot();
        s.experience_id = Some(exp.id);
        let err = add_slots(&state, Uuid::new_v4(), vec![s.clone()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        assert_eq!(add_slots(&state, other_host, vec![s]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_empty_batch() {
        let state = AppState::fake();
        assert!(matches!(
            add_slots(&state, Uuid::new_v4(), vec![]).await,
            Err(ApiError::BadRequest(_))
        ));
    }
}
