//! Strongly typed identifiers for the booking aggregates.
//!
//! Every identifier wraps a UUID. Distinct types keep a doctor id from being
//! passed where a patient id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id! {
    /// Identifier of a registered patient.
    PatientId
}

define_id! {
    /// Identifier of a registered doctor.
    DoctorId
}

define_id! {
    /// Identifier of a booked appointment.
    AppointmentId
}

define_id! {
    /// Identifier of a ledger transaction.
    TransactionId
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_canonical_uuid() {
        let id: DoctorId = "3fa85f64-5717-4562-b3fc-2c963f66afa6"
            .parse()
            .expect("valid uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn rejects_malformed_input() {
        assert!("not-a-uuid".parse::<PatientId>().is_err());
    }

    #[rstest]
    fn serialises_as_bare_string() {
        let uuid = Uuid::nil();
        let json = serde_json::to_value(AppointmentId::from_uuid(uuid)).expect("serialise id");
        assert_eq!(json, serde_json::json!(uuid.to_string()));
    }
}
