use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::core::{
    Booking, BookingError, BookingId, CoreEvent, Guest, GuestError, GuestId, Money, Room,
    RoomNumber,
};
use crate::domain::Entity;
use crate::infrastructure::Registry;

/// 業務エラー
#[derive(Error, Debug)]
pub enum HotelError {
    #[error("Room {0} does not exist.")]
    RoomNotFound(RoomNumber),
    #[error("Room {0} is not available.")]
    RoomUnavailable(RoomNumber),
    #[error("Guest {0} is not registered.")]
    GuestNotFound(GuestId),
    #[error("Booking not found.")]
    BookingNotFound,
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Guest(#[from] GuestError),
}

/// 宿泊客の登録内容
#[derive(Clone, Debug, Deserialize)]
pub struct GuestDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// 予約の申込内容
#[derive(Clone, Debug, Deserialize)]
pub struct BookingDraft {
    pub room_number: RoomNumber,
    pub guest_id: GuestId,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
}

/// ホテル業務サービス。宿帳をひとつのロックの内側に持ち、
/// 複数ステップの更新（空室確認・採番・登録・空室フラグ反転）を
/// まとめてひとつのクリティカルセクションで行う
pub struct HotelService {
    registry: RwLock<Registry>,
}

impl HotelService {
    pub fn new() -> Self {
        let mut registry = Registry::with_seed_rooms();
        for room in registry.rooms_mut() {
            publish(room);
        }
        Self {
            registry: RwLock::new(registry),
        }
    }

    pub async fn rooms(&self) -> Vec<Room> {
        self.registry.read().await.rooms().cloned().collect()
    }

    pub async fn room(&self, number: RoomNumber) -> Option<Room> {
        self.registry.read().await.room(number).cloned()
    }

    pub async fn available_rooms(&self) -> Vec<Room> {
        self.registry
            .read()
            .await
            .rooms()
            .filter(|r| r.is_available())
            .cloned()
            .collect()
    }

    pub async fn register_guest(&self, draft: GuestDraft) -> Result<Guest, HotelError> {
        let mut registry = self.registry.write().await;
        let id = registry.next_guest_id();
        let mut guest = Guest::register(id, draft.name, draft.email, draft.phone, draft.address)?;
        publish(&mut guest);
        registry.insert_guest(guest.clone());
        Ok(guest)
    }

    pub async fn guest(&self, id: GuestId) -> Option<Guest> {
        self.registry.read().await.guest(id).cloned()
    }

    pub async fn guests(&self) -> Vec<Guest> {
        self.registry.read().await.guests().cloned().collect()
    }

    /// 空室確認から空室フラグ反転までをロック内で行うため、
    /// 同じ客室への同時申込のどちらか一方しか成功しない
    pub async fn create_booking(&self, draft: BookingDraft) -> Result<Booking, HotelError> {
        let mut registry = self.registry.write().await;
        registry
            .guest(draft.guest_id)
            .ok_or(HotelError::GuestNotFound(draft.guest_id))?;
        let room = registry
            .room_mut(draft.room_number)
            .ok_or(HotelError::RoomNotFound(draft.room_number))?;
        room.hold()
            .map_err(|_| HotelError::RoomUnavailable(draft.room_number))?;
        let price_per_night = room.price_per_night();
        publish(room);

        let id = registry.next_booking_id();
        let mut booking = Booking::reserve(
            id,
            draft.room_number,
            draft.guest_id,
            draft.check_in_date,
            draft.check_out_date,
            price_per_night,
        );
        publish(&mut booking);
        registry.insert_booking(booking.clone());
        Ok(booking)
    }

    /// 予約の現在のステータスは確認しない。既知の予約なら必ずキャンセルし、
    /// 客室が残っていれば空室に戻す
    pub async fn cancel_booking(&self, id: BookingId) -> bool {
        let mut registry = self.registry.write().await;
        let Some(booking) = registry.booking_mut(id) else {
            return false;
        };
        let room_number = booking.room_number();
        booking.cancel();
        publish(booking);
        if let Some(room) = registry.room_mut(room_number) {
            room.release();
            publish(room);
        }
        true
    }

    pub async fn check_in(&self, id: BookingId) -> Result<(), HotelError> {
        let mut registry = self.registry.write().await;
        let booking = registry.booking_mut(id).ok_or(HotelError::BookingNotFound)?;
        booking.check_in(Utc::now())?;
        publish(booking);
        Ok(())
    }

    /// チェックアウトし、最終請求額を返す。予定日を過ぎていれば
    /// 超過日数 × 室料を追加料金として加算してから請求する
    pub async fn check_out(&self, id: BookingId) -> Result<Money, HotelError> {
        let now = Utc::now();
        let mut registry = self.registry.write().await;
        let booking = registry.booking_mut(id).ok_or(HotelError::BookingNotFound)?;
        booking.check_out(now)?;
        let room_number = booking.room_number();
        let late_days = booking.late_days(now.date_naive());
        publish(booking);

        let rate = registry.room_mut(room_number).map(|room| {
            room.release();
            publish(room);
            room.price_per_night()
        });

        let booking = registry.booking_mut(id).ok_or(HotelError::BookingNotFound)?;
        if late_days > 0 {
            if let Some(rate) = rate {
                booking.add_charges(rate * late_days, "Late checkout");
            }
        }
        let total = booking.final_total();
        publish(booking);
        Ok(total)
    }

    /// 不明な予約IDなら何もしない。金額の妥当性もステータスも確認せず
    /// 加算する。明細はイベントログにのみ残る
    pub async fn add_charges(&self, id: BookingId, amount: Money, description: &str) {
        let mut registry = self.registry.write().await;
        if let Some(booking) = registry.booking_mut(id) {
            booking.add_charges(amount, description);
            publish(booking);
        }
    }

    /// 本日チェックイン対象の予約
    pub async fn bookings_for_check_in(&self) -> Vec<Booking> {
        let today = Utc::now().date_naive();
        self.registry
            .read()
            .await
            .bookings()
            .filter(|b| b.is_due_for_check_in(today))
            .cloned()
            .collect()
    }

    /// 滞在中の予約
    pub async fn currently_staying(&self) -> Vec<Booking> {
        self.registry
            .read()
            .await
            .bookings()
            .filter(|b| b.is_staying())
            .cloned()
            .collect()
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.registry.read().await.bookings().cloned().collect()
    }

    pub async fn booking(&self, id: BookingId) -> Option<Booking> {
        self.registry.read().await.booking(id).cloned()
    }

    pub async fn guest_bookings(&self, guest_id: GuestId) -> Vec<Booking> {
        self.registry
            .read()
            .await
            .bookings()
            .filter(|b| b.guest_id() == guest_id)
            .cloned()
            .collect()
    }
}

impl Default for HotelService {
    fn default() -> Self {
        Self::new()
    }
}

fn publish<E>(entity: &mut E)
where
    E: Entity,
    E::Event: Into<CoreEvent>,
{
    for event in entity.pop_all() {
        info!("ドメインイベント ({}): {:?}", E::ENTITY_NAME, event.into());
    }
}
