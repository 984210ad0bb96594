use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Event, EventQueue, Id};

use super::Money;

/// 客室番号
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
pub struct RoomNumber(u32);

impl Id for RoomNumber {
    type Inner = u32;
}

/// 客室の種別
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
pub enum RoomType {
    #[default]
    #[display(fmt = "Standard")]
    Standard,
    #[display(fmt = "Deluxe")]
    Deluxe,
    #[display(fmt = "Suite")]
    Suite,
}

/// 客室イベント
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomEvent {
    /// 客室が登録された
    RoomOpened {
        number: RoomNumber,
        room_type: RoomType,
        price_per_night: Money,
        description: String,
    },
    /// 客室が予約で押さえられた
    RoomHeld { number: RoomNumber },
    /// 客室が空室に戻った
    RoomReleased { number: RoomNumber },
}

impl Event for RoomEvent {
    type Id = RoomNumber;
}

/// 客室エンティティ
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Room {
    number: RoomNumber,
    room_type: RoomType,
    price_per_night: Money,
    available: bool,
    description: String,
    #[serde(skip)]
    events: EventQueue<RoomEvent>,
}

impl Room {
    pub fn open(
        number: RoomNumber,
        room_type: RoomType,
        price_per_night: Money,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let mut entity = Room {
            number,
            room_type,
            price_per_night,
            available: true,
            description: description.clone(),
            ..Room::default()
        };
        entity.events.push(RoomEvent::RoomOpened {
            number,
            room_type,
            price_per_night,
            description,
        });
        entity
    }

    /// 空室でなければ失敗する。呼び出し側のロック内で実行することで
    /// 「空室確認と確保」をひとつの操作として成立させる
    pub fn hold(&mut self) -> Result<(), RoomError> {
        if !self.available {
            return Err(RoomError::NotAvailable);
        }
        self.available = false;
        self.events.push(RoomEvent::RoomHeld {
            number: self.number,
        });
        Ok(())
    }

    pub fn release(&mut self) {
        if !self.available {
            self.available = true;
            self.events.push(RoomEvent::RoomReleased {
                number: self.number,
            });
        }
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn price_per_night(&self) -> Money {
        self.price_per_night
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Entity for Room {
    type Id = RoomNumber;
    type Event = RoomEvent;

    const ENTITY_NAME: &'static str = "room";

    fn id(&self) -> Self::Id {
        self.number
    }

    fn events(&self) -> &EventQueue<Self::Event> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<Self::Event> {
        &mut self.events
    }
}

impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
            && self.room_type == other.room_type
            && self.price_per_night == other.price_per_night
            && self.available == other.available
            && self.description == other.description
    }
}

impl Eq for Room {}

/// 客室エラー
#[derive(Error, Display, Debug)]
pub enum RoomError {
    /// 空室ではありません
    #[display(fmt = "Room is not available")]
    NotAvailable,
}

#[cfg(test)]
mod tests {
    use crate::domain::core::Currency;

    use super::*;

    #[test]
    fn test_room_open() {
        let room = Room::open(
            RoomNumber::from(101),
            RoomType::Standard,
            Money::new(10_000, Currency::USD),
            "Standard Room with Single Bed",
        );
        assert_eq!(room.id(), RoomNumber::from(101));
        assert!(room.is_available());
        assert_eq!(room.price_per_night(), Money::new(10_000, Currency::USD));
        assert_eq!(room.description(), "Standard Room with Single Bed");
    }

    #[test]
    fn test_room_hold_release() {
        let mut room = Room::open(
            RoomNumber::from(201),
            RoomType::Deluxe,
            Money::new(20_000, Currency::USD),
            "Deluxe Room with Double Bed",
        );
        assert!(room.hold().is_ok());
        assert!(!room.is_available());

        // 二重の確保は失敗する
        assert!(room.hold().is_err());

        room.release();
        assert!(room.is_available());
        assert!(room.hold().is_ok());
    }

    #[test]
    fn test_room_events() {
        let mut room = Room::open(
            RoomNumber::from(301),
            RoomType::Suite,
            Money::new(30_000, Currency::USD),
            "Luxury Suite with King Bed",
        );
        room.hold().unwrap();
        room.release();
        // 既に空室なら何も起きない
        room.release();
        let events = room.pop_all();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            RoomEvent::RoomHeld {
                number: RoomNumber::from(301)
            }
        );
        assert_eq!(
            events[2],
            RoomEvent::RoomReleased {
                number: RoomNumber::from(301)
            }
        );
        assert!(room.peek().is_none());
    }
}
