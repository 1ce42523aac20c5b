use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
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

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, created_at";
const HOST_COLUMNS: &str = "id, user_id, business_name, description, location, phone, website, \
     is_verified, created_at, updated_at";
const EXPERIENCE_COLUMNS: &str = "id, host_id, title, description, location, activity_type, \
     difficulty_level, price_per_person, duration_hours, min_guests, max_guests, is_active, \
     created_at, updated_at";
const AVAILABILITY_COLUMNS: &str = "id, host_id, experience_id, available_date, start_time, \
     end_time, max_capacity, price_override, notes, created_at";
const BOOKING_COLUMNS: &str = "id, user_id, experience_id, host_id, booking_date, booking_time, \
     number_of_guests, total_price, special_requests, booking_status, payment_status, \
     created_at, updated_at";
const REVIEW_COLUMNS: &str =
    "id, booking_id, user_id, experience_id, host_id, rating, comment, created_at";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

/// Maps a unique-constraint failure to [`UniqueViolation`] so callers can
/// answer 409; any other error keeps `context`.
fn unique_or(err: sqlx::Error, what: &'static str, context: &'static str) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return UniqueViolation(what).into();
        }
    }
    anyhow::Error::new(err).context(context)
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find user by email")
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find user by id")
    }

    async fn create_user(&self, user: NewUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(user.role)
            .fetch_one(&self.db)
            .await
            .map_err(|e| unique_or(e, "Email", "insert user"))
    }
}

#[async_trait]
impl HostRepo for PgStore {
    async fn host_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<HostProfile>> {
        let sql = format!("SELECT {HOST_COLUMNS} FROM host_profiles WHERE user_id = $1");
        sqlx::query_as::<_, HostProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("find host profile by user")
    }

    async fn create_host(&self, host: NewHostProfile) -> anyhow::Result<HostProfile> {
        let sql = format!(
            r#"
            INSERT INTO host_profiles (user_id, business_name, description, location, phone, website)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {HOST_COLUMNS}
            "#
        );
        sqlx::query_as::<_, HostProfile>(&sql)
            .bind(host.user_id)
            .bind(&host.business_name)
            .bind(&host.description)
            .bind(&host.location)
            .bind(&host.phone)
            .bind(&host.website)
            .fetch_one(&self.db)
            .await
            .map_err(|e| unique_or(e, "Host profile", "insert host profile"))
    }

    async fn update_host(
        &self,
        host_id: Uuid,
        changes: HostProfileChanges,
    ) -> anyhow::Result<Option<HostProfile>> {
        let sql = format!(
            r#"
            UPDATE host_profiles
               SET business_name = COALESCE($2, business_name),
                   description   = COALESCE($3, description),
                   location      = COALESCE($4, location),
                   phone         = COALESCE($5, phone),
                   website       = COALESCE($6, website),
                   updated_at    = now()
             WHERE id = $1
            RETURNING {HOST_COLUMNS}
            "#
        );
        sqlx::query_as::<_, HostProfile>(&sql)
            .bind(host_id)
            .bind(&changes.business_name)
            .bind(&changes.description)
            .bind(&changes.location)
            .bind(&changes.phone)
            .bind(&changes.website)
            .fetch_optional(&self.db)
            .await
            .context("update host profile")
    }
}

#[async_trait]
impl ExperienceRepo for PgStore {
    async fn create_experience(&self, exp: NewExperience) -> anyhow::Result<Experience> {
        let sql = format!(
            r#"
            INSERT INTO experiences
                (host_id, title, description, location, activity_type, difficulty_level,
                 price_per_person, duration_hours, min_guests, max_guests)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Experience>(&sql)
            .bind(exp.host_id)
            .bind(&exp.title)
            .bind(&exp.description)
            .bind(&exp.location)
            .bind(exp.activity_type)
            .bind(exp.difficulty_level)
            .bind(exp.price_per_person)
            .bind(exp.duration_hours)
            .bind(exp.min_guests)
            .bind(exp.max_guests)
            .fetch_one(&self.db)
            .await
            .context("insert experience")
    }

    async fn experience_by_id(&self, id: Uuid) -> anyhow::Result<Option<Experience>> {
        let sql = format!("SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE id = $1");
        sqlx::query_as::<_, Experience>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find experience")
    }

    async fn list_experiences(&self, filter: ExperienceFilter) -> anyhow::Result<Vec<Experience>> {
        let sql = format!(
            r#"
            SELECT {EXPERIENCE_COLUMNS}
              FROM experiences
             WHERE is_active
               AND ($1::text IS NULL OR activity_type = $1)
               AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
               AND ($3::double precision IS NULL OR price_per_person <= $3)
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5
            "#
        );
        sqlx::query_as::<_, Experience>(&sql)
            .bind(filter.activity_type)
            .bind(&filter.location)
            .bind(filter.max_price)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.db)
            .await
            .context("list experiences")
    }

    async fn list_host_experiences(&self, host_id: Uuid) -> anyhow::Result<Vec<Experience>> {
        let sql = format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE host_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Experience>(&sql)
            .bind(host_id)
            .fetch_all(&self.db)
            .await
            .context("list host experiences")
    }

    async fn update_experience(
        &self,
        host_id: Uuid,
        id: Uuid,
        changes: ExperienceChanges,
    ) -> anyhow::Result<Option<Experience>> {
        let sql = format!(
            r#"
            UPDATE experiences
               SET title            = COALESCE($3, title),
                   description      = COALESCE($4, description),
                   location         = COALESCE($5, location),
                   activity_type    = COALESCE($6, activity_type),
                   difficulty_level = COALESCE($7, difficulty_level),
                   price_per_person = COALESCE($8, price_per_person),
                   duration_hours   = COALESCE($9, duration_hours),
                   min_guests       = COALESCE($10, min_guests),
                   max_guests       = COALESCE($11, max_guests),
                   is_active        = COALESCE($12, is_active),
                   updated_at       = now()
             WHERE id = $1 AND host_id = $2
            RETURNING {EXPERIENCE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Experience>(&sql)
            .bind(id)
            .bind(host_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.location)
            .bind(changes.activity_type)
            .bind(changes.difficulty_level)
            .bind(changes.price_per_person)
            .bind(changes.duration_hours)
            .bind(changes.min_guests)
            .bind(changes.max_guests)
            .bind(changes.is_active)
            .fetch_optional(&self.db)
            .await
            .context("update experience")
    }
}

#[async_trait]
impl AvailabilityRepo for PgStore {
    async fn insert_availability(
        &self,
        slots: Vec<NewAvailability>,
    ) -> anyhow::Result<Vec<Availability>> {
        let sql = format!(
            r#"
            INSERT INTO host_availability
                (host_id, experience_id, available_date, start_time, end_time,
                 max_capacity, price_override, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {AVAILABILITY_COLUMNS}
            "#
        );
        let mut tx = self.db.begin().await.context("begin tx")?;
        let mut rows = Vec::with_capacity(slots.len());
        for slot in &slots {
            let row = sqlx::query_as::<_, Availability>(&sql)
                .bind(slot.host_id)
                .bind(slot.experience_id)
                .bind(slot.available_date)
                .bind(slot.start_time)
                .bind(slot.end_time)
                .bind(slot.max_capacity)
                .bind(slot.price_override)
                .bind(&slot.notes)
                .fetch_one(&mut *tx)
                .await
                .context("insert availability")?;
            rows.push(row);
        }
        tx.commit().await.context("commit tx")?;
        Ok(rows)
    }

    async fn list_availability(
        &self,
        filter: AvailabilityFilter,
    ) -> anyhow::Result<Vec<Availability>> {
        let sql = format!(
            r#"
            SELECT {AVAILABILITY_COLUMNS}
              FROM host_availability
             WHERE ($1::uuid IS NULL OR host_id = $1)
               AND ($2::uuid IS NULL OR experience_id IS NULL OR experience_id = $2)
               AND ($3::date IS NULL OR available_date >= $3)
               AND ($4::date IS NULL OR available_date <= $4)
             ORDER BY available_date ASC, start_time ASC
            "#
        );
        sqlx::query_as::<_, Availability>(&sql)
            .bind(filter.host_id)
            .bind(filter.experience_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(&self.db)
            .await
            .context("list availability")
    }

    async fn delete_availability(&self, host_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM host_availability WHERE id = $1 AND host_id = $2")
            .bind(id)
            .bind(host_id)
            .execute(&self.db)
            .await
            .context("delete availability")?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingRepo for PgStore {
    async fn insert_booking(&self, b: NewBooking) -> anyhow::Result<Booking> {
        let sql = format!(
            r#"
            INSERT INTO bookings
                (user_id, experience_id, host_id, booking_date, booking_time,
                 number_of_guests, total_price, special_requests, booking_status, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(b.user_id)
            .bind(b.experience_id)
            .bind(b.host_id)
            .bind(b.booking_date)
            .bind(b.booking_time)
            .bind(b.number_of_guests)
            .bind(b.total_price)
            .bind(&b.special_requests)
            .bind(BookingStatus::Pending)
            .bind(PaymentStatus::Pending)
            .fetch_one(&self.db)
            .await
            .context("insert booking")
    }

    async fn booking_by_id(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find booking")
    }

    async fn list_user_bookings(&self, user_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list user bookings")
    }

    async fn list_host_bookings(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
    ) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            r#"
            SELECT {BOOKING_COLUMNS}
              FROM bookings
             WHERE host_id = $1
               AND ($2::text IS NULL OR booking_status = $2)
             ORDER BY created_at DESC
            "#
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(host_id)
            .bind(status)
            .fetch_all(&self.db)
            .await
            .context("list host bookings")
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment: Option<PaymentStatus>,
    ) -> anyhow::Result<Option<Booking>> {
        let sql = format!(
            r#"
            UPDATE bookings
               SET booking_status = $2,
                   payment_status = COALESCE($3, payment_status),
                   updated_at     = now()
             WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .bind(status)
            .bind(payment)
            .fetch_optional(&self.db)
            .await
            .context("update booking status")
    }
}

#[async_trait]
impl ReviewRepo for PgStore {
    async fn insert_review(&self, r: NewReview) -> anyhow::Result<Review> {
        let sql = format!(
            r#"
            INSERT INTO reviews (booking_id, user_id, experience_id, host_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REVIEW_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(r.booking_id)
            .bind(r.user_id)
            .bind(r.experience_id)
            .bind(r.host_id)
            .bind(r.rating)
            .bind(&r.comment)
            .fetch_one(&self.db)
            .await
            .map_err(|e| unique_or(e, "Review", "insert review"))
    }

    async fn review_for_booking(&self, booking_id: Uuid) -> anyhow::Result<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE booking_id = $1");
        sqlx::query_as::<_, Review>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.db)
            .await
            .context("find review for booking")
    }

    async fn list_experience_reviews(&self, experience_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE experience_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(experience_id)
            .fetch_all(&self.db)
            .await
            .context("list experience reviews")
    }

    async fn list_host_reviews(&self, host_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE host_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(host_id)
            .fetch_all(&self.db)
            .await
            .context("list host reviews")
    }
}
