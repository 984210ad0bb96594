use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Event, EventQueue, Id};

use super::{GuestId, Money, RoomNumber};

/// 予約ID
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Deref,
    Default,
)]
pub struct BookingId(u64);

impl Id for BookingId {
    type Inner = u64;
}

/// 予約ステータス
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
pub enum BookingStatus {
    #[default]
    #[display(fmt = "Reserved")]
    Reserved,
    #[display(fmt = "CheckedIn")]
    CheckedIn,
    #[display(fmt = "CheckedOut")]
    CheckedOut,
    #[display(fmt = "Cancelled")]
    Cancelled,
}

/// 予約イベント
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEvent {
    /// 予約が作成された
    BookingReserved {
        id: BookingId,
        room_number: RoomNumber,
        guest_id: GuestId,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        total_price: Money,
    },
    /// チェックインした
    GuestCheckedIn { id: BookingId, at: DateTime<Utc> },
    /// チェックアウトした
    GuestCheckedOut { id: BookingId, at: DateTime<Utc> },
    /// 予約がキャンセルされた
    BookingCancelled { id: BookingId },
    /// 追加料金が発生した。明細はこのイベントにのみ残る
    ChargesAdded {
        id: BookingId,
        amount: Money,
        description: String,
    },
}

impl Event for BookingEvent {
    type Id = BookingId;
}

/// 予約エンティティ。ステータス遷移だけが唯一の変更で、削除はされない
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Booking {
    id: BookingId,
    room_number: RoomNumber,
    guest_id: GuestId,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    total_price: Money,
    status: BookingStatus,
    checked_in: bool,
    checked_out: bool,
    actual_check_in: Option<DateTime<Utc>>,
    actual_check_out: Option<DateTime<Utc>>,
    additional_charges: Money,
    #[serde(skip)]
    events: EventQueue<BookingEvent>,
}

impl Booking {
    /// 泊数は日付の丸一日差。0泊以下は弾かず、合計も0またはマイナスになる
    /// （呼び出し側で防ぐ前提の仕様）
    pub fn reserve(
        id: BookingId,
        room_number: RoomNumber,
        guest_id: GuestId,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        price_per_night: Money,
    ) -> Self {
        let nights = (check_out_date - check_in_date).num_days();
        let total_price = price_per_night * nights;
        let mut entity = Booking {
            id,
            room_number,
            guest_id,
            check_in_date,
            check_out_date,
            total_price,
            status: BookingStatus::Reserved,
            additional_charges: Money::zero(price_per_night.currency()),
            ..Booking::default()
        };
        entity.events.push(BookingEvent::BookingReserved {
            id,
            room_number,
            guest_id,
            check_in_date,
            check_out_date,
            total_price,
        });
        entity
    }

    pub fn check_in(&mut self, now: DateTime<Utc>) -> Result<(), BookingError> {
        self.validate_check_in(now.date_naive())?;
        self.checked_in = true;
        self.status = BookingStatus::CheckedIn;
        self.actual_check_in = Some(now);
        self.events
            .push(BookingEvent::GuestCheckedIn { id: self.id, at: now });
        Ok(())
    }

    pub fn check_out(&mut self, now: DateTime<Utc>) -> Result<(), BookingError> {
        self.validate_check_out()?;
        self.checked_out = true;
        self.status = BookingStatus::CheckedOut;
        self.actual_check_out = Some(now);
        self.events
            .push(BookingEvent::GuestCheckedOut { id: self.id, at: now });
        Ok(())
    }

    /// 現在のステータスを確認せず上書きする。チェックイン済み・チェックアウト
    /// 済みの予約もキャンセルできる（仕様上の既知の挙動）
    pub fn cancel(&mut self) {
        self.status = BookingStatus::Cancelled;
        self.events
            .push(BookingEvent::BookingCancelled { id: self.id });
    }

    /// 無条件に加算する。明細はイベントログにのみ残る
    pub fn add_charges(&mut self, amount: Money, description: impl Into<String>) {
        self.additional_charges += amount;
        self.events.push(BookingEvent::ChargesAdded {
            id: self.id,
            amount,
            description: description.into(),
        });
    }

    pub fn room_number(&self) -> RoomNumber {
        self.room_number
    }

    pub fn guest_id(&self) -> GuestId {
        self.guest_id
    }

    pub fn check_in_date(&self) -> NaiveDate {
        self.check_in_date
    }

    pub fn check_out_date(&self) -> NaiveDate {
        self.check_out_date
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn is_checked_in(&self) -> bool {
        self.checked_in
    }

    pub fn is_checked_out(&self) -> bool {
        self.checked_out
    }

    pub fn actual_check_in(&self) -> Option<DateTime<Utc>> {
        self.actual_check_in
    }

    pub fn actual_check_out(&self) -> Option<DateTime<Utc>> {
        self.actual_check_out
    }

    pub fn additional_charges(&self) -> Money {
        self.additional_charges
    }

    /// 最終請求額 = 宿泊料 + 追加料金
    pub fn final_total(&self) -> Money {
        self.total_price + self.additional_charges
    }

    /// 予定チェックアウト日からの超過日数
    pub fn late_days(&self, today: NaiveDate) -> i64 {
        (today - self.check_out_date).num_days().max(0)
    }

    /// 本日チェックイン対象か
    pub fn is_due_for_check_in(&self, today: NaiveDate) -> bool {
        self.status == BookingStatus::Reserved
            && !self.checked_in
            && !self.checked_out
            && self.check_in_date <= today
    }

    /// 滞在中か
    pub fn is_staying(&self) -> bool {
        self.checked_in && !self.checked_out && self.status == BookingStatus::CheckedIn
    }

    fn validate_check_in(&self, today: NaiveDate) -> Result<(), BookingError> {
        if self.status == BookingStatus::Cancelled {
            return Err(BookingError::CheckInCancelled);
        }
        if self.checked_in {
            return Err(BookingError::AlreadyCheckedIn);
        }
        if self.checked_out {
            return Err(BookingError::AlreadyCheckedOut);
        }
        if today < self.check_in_date {
            return Err(BookingError::BeforeCheckInDate);
        }
        Ok(())
    }

    fn validate_check_out(&self) -> Result<(), BookingError> {
        if self.status == BookingStatus::Cancelled {
            return Err(BookingError::CheckOutCancelled);
        }
        if !self.checked_in {
            return Err(BookingError::NotCheckedIn);
        }
        if self.checked_out {
            return Err(BookingError::AlreadyCheckedOut);
        }
        Ok(())
    }
}

impl Entity for Booking {
    type Id = BookingId;
    type Event = BookingEvent;

    const ENTITY_NAME: &'static str = "booking";

    fn id(&self) -> Self::Id {
        self.id
    }

    fn events(&self) -> &EventQueue<Self::Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<Self::Event> {
        &mut self.events
    }
}

impl PartialEq for Booking {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.room_number == other.room_number
            && self.guest_id == other.guest_id
            && self.check_in_date == other.check_in_date
            && self.check_out_date == other.check_out_date
            && self.total_price == other.total_price
            && self.status == other.status
            && self.checked_in == other.checked_in
            && self.checked_out == other.checked_out
            && self.additional_charges == other.additional_charges
    }
}

impl Eq for Booking {}

/// 予約エラー
#[derive(Error, Display, Debug)]
pub enum BookingError {
    /// キャンセル済みの予約にはチェックインできません
    #[display(fmt = "Cannot check in a cancelled booking.")]
    CheckInCancelled,
    /// チェックイン済みです
    #[display(fmt = "Guest is already checked in.")]
    AlreadyCheckedIn,
    /// チェックアウト済みです
    #[display(fmt = "Guest has already checked out.")]
    AlreadyCheckedOut,
    /// 予定日より前にはチェックインできません
    #[display(fmt = "Cannot check in before the scheduled check-in date.")]
    BeforeCheckInDate,
    /// キャンセル済みの予約にはチェックアウトできません
    #[display(fmt = "Cannot check out a cancelled booking.")]
    CheckOutCancelled,
    /// まだチェックインしていません
    #[display(fmt = "Guest has not checked in yet.")]
    NotCheckedIn,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::domain::core::Currency;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn reserve() -> Booking {
        Booking::reserve(
            BookingId::from(1),
            RoomNumber::from(101),
            GuestId::from(1),
            date(2024, 1, 10),
            date(2024, 1, 12),
            Money::new(10_000, Currency::USD),
        )
    }

    #[test]
    fn test_reserve_total_price() {
        let booking = reserve();
        assert_eq!(booking.status(), BookingStatus::Reserved);
        assert_eq!(booking.total_price(), Money::new(20_000, Currency::USD));
        assert_eq!(booking.final_total(), Money::new(20_000, Currency::USD));
        assert!(!booking.is_checked_in());
        assert!(!booking.is_checked_out());
    }

    #[test]
    fn test_reserve_zero_or_negative_nights() {
        // 0泊以下はこの層では弾かない（仕様）
        let booking = Booking::reserve(
            BookingId::from(1),
            RoomNumber::from(101),
            GuestId::from(1),
            date(2024, 1, 10),
            date(2024, 1, 10),
            Money::new(10_000, Currency::USD),
        );
        assert_eq!(booking.total_price(), Money::zero(Currency::USD));

        let booking = Booking::reserve(
            BookingId::from(2),
            RoomNumber::from(101),
            GuestId::from(1),
            date(2024, 1, 12),
            date(2024, 1, 10),
            Money::new(10_000, Currency::USD),
        );
        assert_eq!(booking.total_price(), Money::new(-20_000, Currency::USD));
    }

    #[test]
    fn test_check_in_before_scheduled_date() {
        let mut booking = reserve();
        let err = booking.check_in(at(2024, 1, 9)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot check in before the scheduled check-in date."
        );
        assert_eq!(booking.status(), BookingStatus::Reserved);
    }

    #[test]
    fn test_check_in_once() {
        let mut booking = reserve();
        booking.check_in(at(2024, 1, 10)).unwrap();
        assert_eq!(booking.status(), BookingStatus::CheckedIn);
        assert!(booking.is_checked_in());
        assert_eq!(booking.actual_check_in(), Some(at(2024, 1, 10)));

        let err = booking.check_in(at(2024, 1, 10)).unwrap_err();
        assert_eq!(err.to_string(), "Guest is already checked in.");
    }

    #[test]
    fn test_check_in_cancelled() {
        let mut booking = reserve();
        booking.cancel();
        let err = booking.check_in(at(2024, 1, 10)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot check in a cancelled booking.");
    }

    #[test]
    fn test_check_out_requires_check_in() {
        let mut booking = reserve();
        let err = booking.check_out(at(2024, 1, 12)).unwrap_err();
        assert_eq!(err.to_string(), "Guest has not checked in yet.");

        booking.check_in(at(2024, 1, 10)).unwrap();
        booking.check_out(at(2024, 1, 12)).unwrap();
        assert_eq!(booking.status(), BookingStatus::CheckedOut);
        assert_eq!(booking.actual_check_out(), Some(at(2024, 1, 12)));

        let err = booking.check_out(at(2024, 1, 12)).unwrap_err();
        assert_eq!(err.to_string(), "Guest has already checked out.");
    }

    #[test]
    fn test_late_days() {
        let booking = reserve();
        assert_eq!(booking.late_days(date(2024, 1, 12)), 0);
        assert_eq!(booking.late_days(date(2024, 1, 11)), 0);
        assert_eq!(booking.late_days(date(2024, 1, 15)), 3);
    }

    #[test]
    fn test_additional_charges() {
        let mut booking = reserve();
        booking.add_charges(Money::new(5_000, Currency::USD), "Minibar");
        booking.add_charges(Money::new(2_500, Currency::USD), "Laundry");
        assert_eq!(
            booking.additional_charges(),
            Money::new(7_500, Currency::USD)
        );
        assert_eq!(booking.final_total(), Money::new(27_500, Currency::USD));

        // 明細はイベントとしてだけ残る
        let events = booking.pop_all();
        assert!(events.contains(&BookingEvent::ChargesAdded {
            id: BookingId::from(1),
            amount: Money::new(5_000, Currency::USD),
            description: "Minibar".to_owned(),
        }));
    }

    #[test]
    fn test_cancel_overwrites_any_state() {
        let mut booking = reserve();
        booking.check_in(at(2024, 1, 10)).unwrap();
        booking.check_out(at(2024, 1, 12)).unwrap();
        booking.add_charges(Money::new(1_000, Currency::USD), "Minibar");

        booking.cancel();
        assert_eq!(booking.status(), BookingStatus::Cancelled);
        // 料金はそのまま残る
        assert_eq!(booking.final_total(), Money::new(21_000, Currency::USD));
    }

    #[test]
    fn test_query_predicates() {
        let mut booking = reserve();
        assert!(!booking.is_due_for_check_in(date(2024, 1, 9)));
        assert!(booking.is_due_for_check_in(date(2024, 1, 10)));
        assert!(booking.is_due_for_check_in(date(2024, 1, 11)));
        assert!(!booking.is_staying());

        booking.check_in(at(2024, 1, 10)).unwrap();
        assert!(!booking.is_due_for_check_in(date(2024, 1, 10)));
        assert!(booking.is_staying());

        booking.check_out(at(2024, 1, 12)).unwrap();
        assert!(!booking.is_staying());
    }
}
