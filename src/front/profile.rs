use ntex::web;
use ntex_identity::Identity;
use serde_json::json;

use crate::{
    front::{self, AppState, middleware, utils},
    models,
};

/// Booking as rendered on the profile view
#[derive(serde::Serialize)]
struct BookingRow {
    id: i64,
    movie_title: String,
    status: String,
    start_time: String,
    seats: Vec<String>,
    ticket_count: usize,
    total_price: String,
}

impl From<&models::booking::Booking> for BookingRow {
    fn from(booking: &models::booking::Booking) -> Self {
        Self {
            id: booking.id,
            movie_title: booking.movie_title.to_string(),
            status: booking.booking_status.to_string(),
            start_time: booking.start_time_display(),
            seats: booking.seat_labels(),
            ticket_count: booking.tickets.len(),
            total_price: format!("{:.2}", booking.total_price),
        }
    }
}

/// Profile view: identity plus booking history.
///
/// The session is hydrated through the full lifecycle here (including the
/// silent refresh of an expired token); an empty result means the user has
/// to authenticate again.
#[web::get("")]
async fn get_profile_view(
    identity: Identity,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let manager = front::session_manager(identity, &app_state);
    manager.initialize().await;

    let Some(user) = manager.current().user else {
        utils::remember_redirect_target(&cookie, "/profile");
        return utils::redirect_to("/login");
    };

    middleware::csrf_token::issue_for_session(&cookie, &app_state)?;

    let context = tera::Context::from_value(json!({
        "logged_in": true,
        "username": &user.username,
        "enabled": &user.enabled,
        "booking_count": user.bookings.len(),
        "bookings": user.bookings.iter().map(BookingRow::from).collect::<Vec<_>>(),
    }))
    .unwrap_or_default();

    utils::render_view("profile.html", &context)
}
