mod booking;
mod guest;
mod money;
mod room;

use derive_more::From;

pub use self::booking::*;
pub use self::guest::*;
pub use self::money::*;
pub use self::room::*;

/// 全エンティティのドメインイベント
#[derive(Clone, Debug, PartialEq, Eq, From)]
pub enum CoreEvent {
    RoomEvent(RoomEvent),
    GuestEvent(GuestEvent),
    BookingEvent(BookingEvent),
}
