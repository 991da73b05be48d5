//! (De)serialization through each type's canonical string form.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Bandwidth, Bytes, Limit, Percent, Priority, Ratio, SeedCount, Status, Timedelta, Timestamp};

struct FromStrVisitor<T>(PhantomData<T>);
impl<T> Visitor<'_> for FromStrVisitor<T>
where
    T: FromStr,
    T::Err: Display,
{
    type Value = T;
    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a string")
    }
    fn visit_str<E: DeError>(self, value: &str) -> Result<T, E> {
        value.parse().map_err(E::custom)
    }
}

macro_rules! via_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_str(FromStrVisitor(PhantomData))
            }
        }
    )+};
}

via_str!(Bandwidth, Bytes, Limit, Percent, Priority, Ratio, SeedCount, Status, Timedelta, Timestamp);
