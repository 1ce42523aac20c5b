//! In-process store with the same contract as `PgStore`.
//!
//! Used when `STORE=memory` and by the handler tests. Uniqueness rules that
//! Postgres enforces with constraints (user email, one profile per host,
//! one review per booking) are checked here by hand.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::repo::{NewUser, User, UserRepo},
    availability::repo::{Availability, AvailabilityFilter, AvailabilityRepo, NewAvailability},
    bookings::repo::{Booking, BookingRepo, BookingStatus, NewBooking, PaymentStatus},
    experiences::repo::{
        Experience, ExperienceChanges, ExperienceFilter, ExperienceRepo, NewExperience,
    },
    hosts::repo::{HostProfile, HostProfileChanges, HostRepo, NewHostProfile},
    reviews::repo::{NewReview, Review, ReviewRepo},
};

use super::UniqueViolation;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    hosts: Vec<HostProfile>,
    experiences: Vec<Experience>,
    availability: Vec<Availability>,
    bookings: Vec<Booking>,
    reviews: Vec<Review>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> OffsetDateTime) {
    rows.sort_by_key(|r| std::cmp::Reverse(created_at(r)));
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        anyhow::ensure!(
            !t.users.iter().any(|u| u.email == user.email),
            UniqueViolation("Email")
        );
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl HostRepo for MemoryStore {
    async fn host_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<HostProfile>> {
        let t = self.tables.read().await;
        Ok(t.hosts.iter().find(|h| h.user_id == user_id).cloned())
    }

    async fn create_host(&self, host: NewHostProfile) -> anyhow::Result<HostProfile> {
        let mut t = self.tables.write().await;
        anyhow::ensure!(
            !t.hosts.iter().any(|h| h.user_id == host.user_id),
            UniqueViolation("Host profile")
        );
        let now = OffsetDateTime::now_utc();
        let row = HostProfile {
            id: Uuid::new_v4(),
            user_id: host.user_id,
            business_name: host.business_name,
            description: host.description,
            location: host.location,
            phone: host.phone,
            website: host.website,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        t.hosts.push(row.clone());
        Ok(row)
    }

    async fn update_host(
        &self,
        host_id: Uuid,
        changes: HostProfileChanges,
    ) -> anyhow::Result<Option<HostProfile>> {
        let mut t = self.tables.write().await;
        let Some(h) = t.hosts.iter_mut().find(|h| h.id == host_id) else {
            return Ok(None);
        };
        if let Some(v) = changes.business_name {
            h.business_name = v;
        }
        if changes.description.is_some() {
            h.description = changes.description;
        }
        if changes.location.is_some() {
            h.location = changes.location;
        }
        if changes.phone.is_some() {
            h.phone = changes.phone;
        }
        if changes.website.is_some() {
            h.website = changes.website;
        }
        h.updated_at = OffsetDateTime::now_utc();
        Ok(Some(h.clone()))
    }
}

#[async_trait]
impl ExperienceRepo for MemoryStore {
    async fn create_experience(&self, exp: NewExperience) -> anyhow::Result<Experience> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let row = Experience {
            id: Uuid::new_v4(),
            host_id: exp.host_id,
            title: exp.title,
            description: exp.description,
            location: exp.location,
            activity_type: exp.activity_type,
            difficulty_level: exp.difficulty_level,
            price_per_person: exp.price_per_person,
            duration_hours: exp.duration_hours,
            min_guests: exp.min_guests,
            max_guests: exp.max_guests,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.experiences.push(row.clone());
        Ok(row)
    }

    async fn experience_by_id(&self, id: Uuid) -> anyhow::Result<Option<Experience>> {
        let t = self.tables.read().await;
        Ok(t.experiences.iter().find(|e| e.id == id).cloned())
    }

    async fn list_experiences(&self, filter: ExperienceFilter) -> anyhow::Result<Vec<Experience>> {
        let t = self.tables.read().await;
        let location = filter.location.as_deref().map(str::to_lowercase);
        let mut rows: Vec<Experience> = t
            .experiences
            .iter()
            .filter(|e| e.is_active)
            .filter(|e| filter.activity_type.map_or(true, |a| e.activity_type == a))
            .filter(|e| {
                location
                    .as_deref()
                    .map_or(true, |l| e.location.to_lowercase().contains(l))
            })
            .filter(|e| filter.max_price.map_or(true, |p| e.price_per_person <= p))
            .cloned()
            .collect();
        newest_first(&mut rows, |e| e.created_at);
        Ok(rows
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn list_host_experiences(&self, host_id: Uuid) -> anyhow::Result<Vec<Experience>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Experience> = t
            .experiences
            .iter()
            .filter(|e| e.host_id == host_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |e| e.created_at);
        Ok(rows)
    }

    async fn update_experience(
        &self,
        host_id: Uuid,
        id: Uuid,
        changes: ExperienceChanges,
    ) -> anyhow::Result<Option<Experience>> {
        let mut t = self.tables.write().await;
        let Some(e) = t
            .experiences
            .iter_mut()
            .find(|e| e.id == id && e.host_id == host_id)
        else {
            return Ok(None);
        };
        if let Some(v) = changes.title {
            e.title = v;
        }
        if changes.description.is_some() {
            e.description = changes.description;
        }
        if let Some(v) = changes.location {
            e.location = v;
        }
        if let Some(v) = changes.activity_type {
            e.activity_type = v;
        }
        if let Some(v) = changes.difficulty_level {
            e.difficulty_level = v;
        }
        if let Some(v) = changes.price_per_person {
            e.price_per_person = v;
        }
        if let Some(v) = changes.duration_hours {
            e.duration_hours = v;
        }
        if let Some(v) = changes.min_guests {
            e.min_guests = v;
        }
        if let Some(v) = changes.max_guests {
            e.max_guests = v;
        }
        if let Some(v) = changes.is_active {
            e.is_active = v;
        }
        e.updated_at = OffsetDateTime::now_utc();
        Ok(Some(e.clone()))
    }
}

#[async_trait]
impl AvailabilityRepo for MemoryStore {
    async fn insert_availability(
        &self,
        slots: Vec<NewAvailability>,
    ) -> anyhow::Result<Vec<Availability>> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let rows: Vec<Availability> = slots
            .into_iter()
            .map(|s| Availability {
                id: Uuid::new_v4(),
                host_id: s.host_id,
                experience_id: s.experience_id,
                available_date: s.available_date,
                start_time: s.start_time,
                end_time: s.end_time,
                max_capacity: s.max_capacity,
                price_override: s.price_override,
                notes: s.notes,
                created_at: now,
            })
            .collect();
        t.availability.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn list_availability(
        &self,
        filter: AvailabilityFilter,
    ) -> anyhow::Result<Vec<Availability>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Availability> = t
            .availability
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.available_date, a.start_time));
        Ok(rows)
    }

    async fn delete_availability(&self, host_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.availability.len();
        t.availability
            .retain(|a| !(a.id == id && a.host_id == host_id));
        Ok(t.availability.len() < before)
    }
}

#[async_trait]
impl BookingRepo for MemoryStore {
    async fn insert_booking(&self, b: NewBooking) -> anyhow::Result<Booking> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let row = Booking {
            id: Uuid::new_v4(),
            user_id: b.user_id,
            experience_id: b.experience_id,
            host_id: b.host_id,
            booking_date: b.booking_date,
            booking_time: b.booking_time,
            number_of_guests: b.number_of_guests,
            total_price: b.total_price,
            special_requests: b.special_requests,
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.bookings.push(row.clone());
        Ok(row)
    }

    async fn booking_by_id(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
        let t = self.tables.read().await;
        Ok(t.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_user_bookings(&self, user_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Booking> = t
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |b| b.created_at);
        Ok(rows)
    }

    async fn list_host_bookings(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
    ) -> anyhow::Result<Vec<Booking>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Booking> = t
            .bookings
            .iter()
            .filter(|b| b.host_id == host_id)
            .filter(|b| status.map_or(true, |s| b.booking_status == s))
            .cloned()
            .collect();
        newest_first(&mut rows, |b| b.created_at);
        Ok(rows)
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment: Option<PaymentStatus>,
    ) -> anyhow::Result<Option<Booking>> {
        let mut t = self.tables.write().await;
        let Some(b) = t.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        b.booking_status = status;
        if let Some(p) = payment {
            b.payment_status = p;
        }
        b.updated_at = OffsetDateTime::now_utc();
        Ok(Some(b.clone()))
    }
}

#[async_trait]
impl ReviewRepo for MemoryStore {
    async fn insert_review(&self, r: NewReview) -> anyhow::Result<Review> {
        let mut t = self.tables.write().await;
        anyhow::ensure!(
            !t.reviews.iter().any(|x| x.booking_id == r.booking_id),
            UniqueViolation("Review")
        );
        let row = Review {
            id: Uuid::new_v4(),
            booking_id: r.booking_id,
            user_id: r.user_id,
            experience_id: r.experience_id,
            host_id: r.host_id,
            rating: r.rating,
            comment: r.comment,
            created_at: OffsetDateTime::now_utc(),
        };
        t.reviews.push(row.clone());
        Ok(row)
    }

    async fn review_for_booking(&self, booking_id: Uuid) -> anyhow::Result<Option<Review>> {
        let t = self.tables.read().await;
        Ok(t.reviews.iter().find(|r| r.booking_id == booking_id).cloned())
    }

    async fn list_experience_reviews(&self, experience_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Review> = t
            .reviews
            .iter()
            .filter(|r| r.experience_id == experience_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |r| r.created_at);
        Ok(rows)
    }

    async fn list_host_reviews(&self, host_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Review> = t
            .reviews
            .iter()
            .filter(|r| r.host_id == host_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |r| r.created_at);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo::Role,
        error::ApiError,
        experiences::repo::{ActivityType, Difficulty},
    };

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            full_name: None,
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn second_insert_past_the_precheck_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("diver@reef.io")).await.unwrap();

        let err = store.create_user(new_user("diver@reef.io")).await.unwrap_err();
        assert!(err.downcast_ref::<UniqueViolation>().is_some());
        assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));

        let review = NewReview {
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            experience_id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            rating: 4,
            comment: None,
        };
        store.insert_review(review.clone()).await.unwrap();
        let err = store.insert_review(review).await.unwrap_err();
        assert_eq!(ApiError::from(err).status(), axum::http::StatusCode::CONFLICT);
    }

    async fn titles(store: &MemoryStore, filter: ExperienceFilter) -> Vec<String> {
        store
            .list_experiences(ExperienceFilter { limit: 20, ..filter })
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect()
    }

    #[tokio::test]
    async fn catalogue_filters() {
        let store = MemoryStore::new();
        let host_id = Uuid::new_v4();
        for (title, location, activity, price) in [
            ("Reef dive", "Coral Bay", ActivityType::ScubaDiving, 120.0),
            ("Bay kayak", "Coral Bay", ActivityType::Kayaking, 40.0),
            ("Harbor kayak", "Old Harbor", ActivityType::Kayaking, 55.0),
        ] {
            store
                .create_experience(NewExperience {
                    host_id,
                    title: title.into(),
                    description: None,
                    location: location.into(),
                    activity_type: activity,
                    difficulty_level: Difficulty::Beginner,
                    price_per_person: price,
                    duration_hours: 2.0,
                    min_guests: 1,
                    max_guests: 6,
                })
                .await
                .unwrap();
        }
        let kayaks = titles(
            &store,
            ExperienceFilter {
                activity_type: Some(ActivityType::Kayaking),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(kayaks.len(), 2);

        let coral = titles(
            &store,
            ExperienceFilter {
                location: Some("coral".into()),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(coral.len(), 2);
        assert!(!coral.contains(&"Harbor kayak".to_string()));

        let cheap = titles(
            &store,
            ExperienceFilter {
                max_price: Some(55.0),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(cheap.len(), 2);
        assert!(!cheap.contains(&"Reef dive".to_string()));

        let combined = titles(
            &store,
            ExperienceFilter {
                activity_type: Some(ActivityType::Kayaking),
                location: Some("harbor".into()),
                max_price: Some(60.0),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(combined, vec!["Harbor kayak".to_string()]);
    }
}
