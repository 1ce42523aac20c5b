use serde::Serialize;

use crate::bookings::repo::Booking;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub active_bookings: usize,
    pub total_bookings: usize,
    pub total_experiences: usize,
    pub active_experiences: usize,
    pub average_rating: f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub upcoming_bookings: Vec<Booking>,
    pub recent_bookings: Vec<Booking>,
}
