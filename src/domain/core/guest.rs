use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Event, EventQueue, Id};

/// 宿泊客ID
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
pub struct GuestId(u64);

impl Id for GuestId {
    type Inner = u64;
}

/// 宿泊客イベント
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestEvent {
    /// 宿泊客が登録された
    GuestRegistered {
        id: GuestId,
        name: String,
        email: String,
    },
}

impl Event for GuestEvent {
    type Id = GuestId;
}

/// 宿泊客エンティティ。登録後は変更されない
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Guest {
    id: GuestId,
    name: String,
    email: String,
    phone: String,
    address: String,
    #[serde(skip)]
    events: EventQueue<GuestEvent>,
}

impl Guest {
    pub fn register(
        id: GuestId,
        name: String,
        email: String,
        phone: String,
        address: String,
    ) -> Result<Self, GuestError> {
        Self::validate_registered(&name, &email, &phone, &address)?;
        let mut entity = Guest {
            id,
            name: name.clone(),
            email: email.clone(),
            phone,
            address,
            ..Guest::default()
        };
        entity
            .events
            .push(GuestEvent::GuestRegistered { id, name, email });
        Ok(entity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn validate_registered(
        name: &str,
        email: &str,
        phone: &str,
        address: &str,
    ) -> Result<(), GuestError> {
        Self::validate_name(name)?;
        Self::validate_email(email)?;
        Self::validate_phone(phone)?;
        Self::validate_address(address)?;
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), GuestError> {
        match name.trim().is_empty() {
            true => Err(GuestError::NameIsBlank),
            false => Ok(()),
        }
    }

    fn validate_email(email: &str) -> Result<(), GuestError> {
        let valid = email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });
        match valid {
            true => Ok(()),
            false => Err(GuestError::EmailIsInvalid),
        }
    }

    fn validate_phone(phone: &str) -> Result<(), GuestError> {
        match phone.trim().is_empty() {
            true => Err(GuestError::PhoneIsBlank),
            false => Ok(()),
        }
    }

    fn validate_address(address: &str) -> Result<(), GuestError> {
        match address.trim().is_empty() {
            true => Err(GuestError::AddressIsBlank),
            false => Ok(()),
        }
    }
}

impl Entity for Guest {
    type Id = GuestId;
    type Event = GuestEvent;

    const ENTITY_NAME: &'static str = "guest";

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

impl PartialEq for Guest {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.email == other.email
            && self.phone == other.phone
            && self.address == other.address
    }
}

impl Eq for Guest {}

/// 宿泊客エラー
#[derive(Error, Display, Debug)]
pub enum GuestError {
    /// 名前が空欄です
    #[display(fmt = "Guest name cannot be blank")]
    NameIsBlank,
    /// メールアドレスが不正です
    #[display(fmt = "Guest email is invalid")]
    EmailIsInvalid,
    /// 電話番号が空欄です
    #[display(fmt = "Guest phone number cannot be blank")]
    PhoneIsBlank,
    /// 住所が空欄です
    #[display(fmt = "Guest address cannot be blank")]
    AddressIsBlank,
}
