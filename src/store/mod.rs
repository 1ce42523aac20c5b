use crate::{
    auth::repo::UserRepo, availability::repo::AvailabilityRepo, bookings::repo::BookingRepo,
    experiences::repo::ExperienceRepo, hosts::repo::HostRepo, reviews::repo::ReviewRepo,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A write collided with a uniqueness rule (duplicate email, second host
/// profile, second review of a booking).
#[derive(Debug, thiserror::Error)]
#[error("{0} already exists")]
pub struct UniqueViolation(pub &'static str);

/// Everything the handlers need from the system of record.
pub trait Store:
    UserRepo + HostRepo + ExperienceRepo + AvailabilityRepo + BookingRepo + ReviewRepo
{
}

impl<T> Store for T where
    T: UserRepo + HostRepo + ExperienceRepo + AvailabilityRepo + BookingRepo + ReviewRepo
{
}
