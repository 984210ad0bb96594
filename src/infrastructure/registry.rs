use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::domain::core::{
    Booking, BookingId, Currency, Guest, GuestId, Money, Room, RoomNumber, RoomType,
};
use crate::domain::Entity;

/// プロセス起動時に登録される固定の客室リスト
static SEED_ROOMS: Lazy<Vec<Room>> = Lazy::new(|| {
    vec![
        Room::open(
            RoomNumber::from(101),
            RoomType::Standard,
            Money::new(10_000, Currency::USD),
            "Standard Room with Single Bed",
        ),
        Room::open(
            RoomNumber::from(102),
            RoomType::Standard,
            Money::new(10_000, Currency::USD),
            "Standard Room with Single Bed",
        ),
        Room::open(
            RoomNumber::from(201),
            RoomType::Deluxe,
            Money::new(20_000, Currency::USD),
            "Deluxe Room with Double Bed",
        ),
        Room::open(
            RoomNumber::from(202),
            RoomType::Deluxe,
            Money::new(20_000, Currency::USD),
            "Deluxe Room with Double Bed",
        ),
        Room::open(
            RoomNumber::from(301),
            RoomType::Suite,
            Money::new(30_000, Currency::USD),
            "Luxury Suite with King Bed",
        ),
    ]
});

/// 宿帳。客室・宿泊客・予約の3つの台帳と採番カウンタを持つ。
/// それ自体は同期を持たず、サービス側のロックの内側で使う
#[derive(Debug)]
pub struct Registry {
    rooms: BTreeMap<RoomNumber, Room>,
    guests: BTreeMap<GuestId, Guest>,
    bookings: BTreeMap<BookingId, Booking>,
    next_guest_id: u64,
    next_booking_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
            guests: BTreeMap::new(),
            bookings: BTreeMap::new(),
            next_guest_id: 1,
            next_booking_id: 1,
        }
    }

    pub fn with_seed_rooms() -> Self {
        let mut registry = Self::new();
        for room in SEED_ROOMS.iter() {
            registry.insert_room(room.clone());
        }
        registry
    }

    /// 採番。1始まりで単調増加、再利用もリセットもしない
    pub fn next_guest_id(&mut self) -> GuestId {
        let id = self.next_guest_id;
        self.next_guest_id += 1;
        GuestId::from(id)
    }

    pub fn next_booking_id(&mut self) -> BookingId {
        let id = self.next_booking_id;
        self.next_booking_id += 1;
        BookingId::from(id)
    }

    /// キーが既にあれば登録せず false を返す
    pub fn insert_room(&mut self, room: Room) -> bool {
        insert_if_absent(&mut self.rooms, room.id(), room)
    }

    pub fn insert_guest(&mut self, guest: Guest) -> bool {
        insert_if_absent(&mut self.guests, guest.id(), guest)
    }

    pub fn insert_booking(&mut self, booking: Booking) -> bool {
        insert_if_absent(&mut self.bookings, booking.id(), booking)
    }

    pub fn room(&self, number: RoomNumber) -> Option<&Room> {
        self.rooms.get(&number)
    }

    pub fn room_mut(&mut self, number: RoomNumber) -> Option<&mut Room> {
        self.rooms.get_mut(&number)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.values_mut()
    }

    pub fn guest(&self, id: GuestId) -> Option<&Guest> {
        self.guests.get(&id)
    }

    pub fn guests(&self) -> impl Iterator<Item = &Guest> {
        self.guests.values()
    }

    pub fn booking(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    pub fn booking_mut(&mut self, id: BookingId) -> Option<&mut Booking> {
        self.bookings.get_mut(&id)
    }

    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_if_absent<K: Ord, V>(map: &mut BTreeMap<K, V>, key: K, value: V) -> bool {
    match map.entry(key) {
        std::collections::btree_map::Entry::Vacant(entry) => {
            entry.insert(value);
            true
        }
        std::collections::btree_map::Entry::Occupied(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_rooms() {
        let registry = Registry::with_seed_rooms();
        assert_eq!(registry.rooms().count(), 5);
        let room = registry.room(RoomNumber::from(101)).unwrap();
        assert_eq!(room.price_per_night(), Money::new(10_000, Currency::USD));
        assert!(room.is_available());
        let suite = registry.room(RoomNumber::from(301)).unwrap();
        assert_eq!(suite.room_type(), RoomType::Suite);
    }

    #[test]
    fn test_insert_if_absent() {
        let mut registry = Registry::with_seed_rooms();
        let duplicate = Room::open(
            RoomNumber::from(101),
            RoomType::Suite,
            Money::new(99_900, Currency::USD),
            "Duplicate",
        );
        assert!(!registry.insert_room(duplicate));
        // 既存の登録が勝つ
        assert_eq!(
            registry.room(RoomNumber::from(101)).unwrap().room_type(),
            RoomType::Standard
        );
    }

    #[test]
    fn test_counters_are_per_instance() {
        let mut a = Registry::new();
        let mut b = Registry::new();
        assert_eq!(a.next_guest_id(), GuestId::from(1));
        assert_eq!(a.next_guest_id(), GuestId::from(2));
        // 別インスタンスはカウンタを共有しない
        assert_eq!(b.next_guest_id(), GuestId::from(1));
        assert_eq!(a.next_booking_id(), BookingId::from(1));
        assert_eq!(a.next_booking_id(), BookingId::from(2));
    }
}
