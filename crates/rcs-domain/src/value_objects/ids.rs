//! Resource identifiers
//!
//! Every resource gets its own identifier type so a policy ID can never be
//! passed where a webhook ID is expected. Auto Scale and Monitoring use
//! opaque string IDs; Cloud Load Balancers uses integers, which are accepted
//! from JSON either as numbers or as strings and written back as numbers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new<S: Into<String>>(id: S) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        resource_id!($(#[$meta])* $name);

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self)
            }
        }
    };
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        resource_id!($(#[$meta])* $name);

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.0.parse::<u64>() {
                    Ok(number) => serializer.serialize_u64(number),
                    Err(_) => serializer.serialize_str(&self.0),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(Self(NumberOrString::deserialize(deserializer)?.into_string()))
            }
        }
    };
}

/// Wire form of integer identifiers
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

// Auto Scale
string_id!(
    /// Identifier of an Auto Scale scaling group
    ScalingGroupId
);
string_id!(
    /// Identifier of a scaling policy
    PolicyId
);
string_id!(
    /// Identifier of a policy webhook
    WebhookId
);

// Cloud Load Balancers
numeric_id!(
    /// Identifier of a load balancer
    LoadBalancerId
);
numeric_id!(
    /// Identifier of a load balancer node
    NodeId
);
numeric_id!(
    /// Identifier of a load balancer virtual IP
    VirtualIpId
);
numeric_id!(
    /// Identifier of an access list entry
    NetworkItemId
);
numeric_id!(
    /// Identifier of a load balancer metadata item
    MetadataId
);

// Cloud Monitoring
string_id!(
    /// Identifier of a monitored entity
    EntityId
);
string_id!(
    /// Identifier of a check
    CheckId
);
string_id!(
    /// Identifier of an alarm
    AlarmId
);
string_id!(
    /// Identifier of a notification
    NotificationId
);
string_id!(
    /// Identifier of a notification plan
    NotificationPlanId
);
string_id!(
    /// Identifier of a monitoring zone
    MonitoringZoneId
);
string_id!(
    /// Identifier of a check type (e.g. `remote.http`)
    CheckTypeId
);
string_id!(
    /// Identifier of a notification type (e.g. `email`)
    NotificationTypeId
);
