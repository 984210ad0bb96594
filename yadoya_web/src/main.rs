use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use yadoya::{
    domain::core::{Booking, Currency, Guest, Money, Room},
    service::{BookingDraft, GuestDraft, HotelError, HotelService},
    YadoyaConfig,
};

#[tokio::main]
async fn main() {
    match YadoyaConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::from(&config.logger.level))
                .init();
            serve(&config).await;
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("アプリケーションエラー: {}", error);
        }
    }
}

async fn serve(config: &YadoyaConfig) {
    let state = Arc::new(AppState {
        service: HotelService::new(),
        usd_to_inr: config.exchange.usd_to_inr,
    });
    let app = Router::new()
        .route("/rooms", get(rooms))
        .route("/rooms/available", get(available_rooms))
        .route("/rooms/:number", get(room))
        .route("/guests", get(guests).post(register_guest))
        .route("/guests/:id", get(guest))
        .route("/guests/:id/bookings", get(guest_bookings))
        .route("/bookings", get(bookings).post(create_booking))
        .route("/bookings/due", get(bookings_for_check_in))
        .route("/bookings/staying", get(currently_staying))
        .route("/bookings/:id", get(booking))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .route("/bookings/:id/check-in", post(check_in))
        .route("/bookings/:id/check-out", post(check_out))
        .route("/bookings/:id/charges", post(add_charges))
        .with_state(state);

    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

struct AppState {
    service: HotelService,
    usd_to_inr: f64,
}

impl AppState {
    /// 固定レートの表示用換算。正確性は保証しない
    fn in_inr(&self, money: Money) -> f64 {
        money.amount() as f64 * self.usd_to_inr / 100.0
    }

    fn room_view(&self, room: Room) -> RoomView {
        let price_in_inr = self.in_inr(room.price_per_night());
        RoomView { room, price_in_inr }
    }

    fn booking_view(&self, booking: Booking) -> BookingView {
        let final_total = booking.final_total();
        BookingView {
            final_total_in_inr: self.in_inr(final_total),
            final_total,
            booking,
        }
    }
}

#[derive(Serialize)]
struct RoomView {
    #[serde(flatten)]
    room: Room,
    price_in_inr: f64,
}

#[derive(Serialize)]
struct BookingView {
    #[serde(flatten)]
    booking: Booking,
    final_total: Money,
    final_total_in_inr: f64,
}

#[derive(Deserialize)]
struct ChargeRequest {
    amount: i64,
    description: String,
}

struct ApiError(HotelError);

impl From<HotelError> for ApiError {
    fn from(value: HotelError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            HotelError::RoomNotFound(_)
            | HotelError::GuestNotFound(_)
            | HotelError::BookingNotFound => StatusCode::NOT_FOUND,
            HotelError::RoomUnavailable(_) | HotelError::Booking(_) => StatusCode::CONFLICT,
            HotelError::Guest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomView>> {
    let rooms = state.service.rooms().await;
    Json(rooms.into_iter().map(|r| state.room_view(r)).collect())
}

async fn available_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomView>> {
    let rooms = state.service.available_rooms().await;
    Json(rooms.into_iter().map(|r| state.room_view(r)).collect())
}

async fn room(
    State(state): State<Arc<AppState>>,
    Path(number): Path<u32>,
) -> Result<Json<RoomView>, ApiError> {
    let room = state
        .service
        .room(number.into())
        .await
        .ok_or(HotelError::RoomNotFound(number.into()))?;
    Ok(Json(state.room_view(room)))
}

async fn register_guest(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<GuestDraft>,
) -> Result<(StatusCode, Json<Guest>), ApiError> {
    let guest = state.service.register_guest(draft).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

async fn guests(State(state): State<Arc<AppState>>) -> Json<Vec<Guest>> {
    Json(state.service.guests().await)
}

async fn guest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Guest>, ApiError> {
    let guest = state
        .service
        .guest(id.into())
        .await
        .ok_or(HotelError::GuestNotFound(id.into()))?;
    Ok(Json(guest))
}

async fn guest_bookings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Json<Vec<BookingView>> {
    let bookings = state.service.guest_bookings(id.into()).await;
    Json(bookings.into_iter().map(|b| state.booking_view(b)).collect())
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<BookingDraft>,
) -> Result<(StatusCode, Json<BookingView>), ApiError> {
    let booking = state.service.create_booking(draft).await?;
    Ok((StatusCode::CREATED, Json(state.booking_view(booking))))
}

async fn bookings(State(state): State<Arc<AppState>>) -> Json<Vec<BookingView>> {
    let bookings = state.service.bookings().await;
    Json(bookings.into_iter().map(|b| state.booking_view(b)).collect())
}

async fn booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<BookingView>, ApiError> {
    let booking = state
        .service
        .booking(id.into())
        .await
        .ok_or(HotelError::BookingNotFound)?;
    Ok(Json(state.booking_view(booking)))
}

async fn bookings_for_check_in(State(state): State<Arc<AppState>>) -> Json<Vec<BookingView>> {
    let bookings = state.service.bookings_for_check_in().await;
    Json(bookings.into_iter().map(|b| state.booking_view(b)).collect())
}

async fn currently_staying(State(state): State<Arc<AppState>>) -> Json<Vec<BookingView>> {
    let bookings = state.service.currently_staying().await;
    Json(bookings.into_iter().map(|b| state.booking_view(b)).collect())
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.service.cancel_booking(id.into()).await {
        Ok(Json(json!({ "message": "Booking cancelled." })))
    } else {
        Err(HotelError::BookingNotFound.into())
    }
}

async fn check_in(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.service.check_in(id.into()).await?;
    Ok(Json(json!({ "message": "Guest checked in successfully." })))
}

async fn check_out(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let total = state.service.check_out(id.into()).await?;
    Ok(Json(json!({
        "message": "Guest checked out successfully.",
        "final_total": total,
        "final_total_display": total.to_string(),
        "final_total_in_inr": state.in_inr(total),
    })))
}

async fn add_charges(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<ChargeRequest>,
) -> StatusCode {
    state
        .service
        .add_charges(
            id.into(),
            Money::new(request.amount, Currency::USD),
            &request.description,
        )
        .await;
    StatusCode::NO_CONTENT
}
