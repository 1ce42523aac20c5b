use time::Date;

use super::dto::{DashboardResponse, DashboardStats};
use crate::{
    bookings::repo::{Booking, BookingStatus},
    experiences::repo::Experience,
    reviews::repo::Review,
};

/// Share of a confirmed booking's price that goes to the host.
pub const HOST_REVENUE_SHARE: f64 = 0.85;

const PREVIEW_LEN: usize = 5;

/// Reduces a host's rows into the dashboard figures.
pub fn summarize(
    bookings: &[Booking],
    experiences: &[Experience],
    reviews: &[Review],
    today: Date,
) -> DashboardResponse {
    let confirmed_total: f64 = bookings
        .iter()
        .filter(|b| b.booking_status == BookingStatus::Confirmed)
        .map(|b| b.total_price)
        .sum();

    let mut upcoming: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.booking_status.is_active() && b.booking_date >= today)
        .cloned()
        .collect();
    let active_bookings = upcoming.len();
    upcoming.sort_by_key(|b| (b.booking_date, b.booking_time));
    upcoming.truncate(PREVIEW_LEN);

    let mut recent = bookings.to_vec();
    recent.sort_by_key(|b| std::cmp::Reverse(b.created_at));
    recent.truncate(PREVIEW_LEN);

    let average_rating = if reviews.is_empty() {
        0.0
    } else {
        let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
        (sum / reviews.len() as f64 * 10.0).round() / 10.0
    };

    DashboardResponse {
        stats: DashboardStats {
            total_revenue: confirmed_total * HOST_REVENUE_SHARE,
            active_bookings,
            total_bookings: bookings.len(),
            total_experiences: experiences.len(),
            active_experiences: experiences.iter().filter(|e| e.is_active).count(),
            average_rating,
            review_count: reviews.len(),
        },
        upcoming_bookings: upcoming,
        recent_bookings: recent,
    }
}
