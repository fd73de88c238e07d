use super::ChainedHashMap;

use serde::de::{Deserialize, Error, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use serde::Deserializer;

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

const NAME: &str = "ChainedHashMap";
const FIELDS: &[&str] = &["size", "entries"];

/// The entries of a [`ChainedHashMap`] serialized as a plain map.
struct SerializeEntries<'m, K, V, H>(&'m ChainedHashMap<K, V, H>)
where
    H: BuildHasher;

impl<K, V, H> Serialize for SerializeEntries<'_, K, V, H>
where
    K: Serialize,
    V: Serialize,
    H: BuildHasher,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K, V, H> Serialize for ChainedHashMap<K, V, H>
where
    K: Serialize,
    V: Serialize,
    H: BuildHasher,
{
    /// Serializes the map as `{ size, entries }` so that the capacity survives a round trip.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct(NAME, FIELDS.len())?;
        state.serialize_field("size", &(self.capacity() / 2))?;
        state.serialize_field("entries", &SerializeEntries(self))?;
        state.end()
    }
}

enum Field {
    Size,
    Entries,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl Visitor<'_> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("`size` or `entries`")
            }

            fn visit_str<E: Error>(self, value: &str) -> Result<Field, E> {
                match value {
                    "size" => Ok(Field::Size),
                    "entries" => Ok(Field::Entries),
                    _ => Err(E::unknown_field(value, FIELDS)),
                }
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

/// Entries buffered in input order until the size of the map is known.
struct Entries<K, V>(Vec<(K, V)>);

impl<'de, K, V> Deserialize<'de> for Entries<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<K, V>(PhantomData<fn() -> (K, V)>);

        impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Entries<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of entries")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Builds a [`ChainedHashMap`] of the given size from `{ size, entries }`.
pub struct ChainedHashMapVisitor<K, V, H> {
    marker: PhantomData<fn() -> (K, V, H)>,
}

impl<K, V, H> ChainedHashMapVisitor<K, V, H> {
    fn new() -> Self {
        ChainedHashMapVisitor {
            marker: PhantomData,
        }
    }
}

/// Sets the entries in order; a repeated key takes the last value even once the map is full.
fn build<K, V, H, E>(size: usize, entries: Vec<(K, V)>) -> Result<ChainedHashMap<K, V, H>, E>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
    E: Error,
{
    if size > usize::MAX / 2 {
        return Err(E::custom(format_args!("size {size} is too large")));
    }
    let mut map = ChainedHashMap::with_hasher(size, H::default());
    let capacity = map.capacity();
    for (key, val) in entries {
        if let Err((key, val)) = map.try_set(key, val) {
            match map.get_mut(&key) {
                Some(slot) => *slot = val,
                None => {
                    return Err(E::custom(format_args!(
                        "more than {capacity} distinct keys for size {size}"
                    )))
                }
            }
        }
    }
    Ok(map)
}

impl<'de, K, V, H> Visitor<'de> for ChainedHashMapVisitor<K, V, H>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    H: BuildHasher + Default,
{
    type Value = ChainedHashMap<K, V, H>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a ChainedHashMap")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let size = seq
            .next_element()?
            .ok_or_else(|| A::Error::invalid_length(0, &self))?;
        let Entries(entries) = seq
            .next_element()?
            .ok_or_else(|| A::Error::invalid_length(1, &self))?;
        build(size, entries)
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut size = None;
        let mut entries = None;
        while let Some(field) = access.next_key()? {
            match field {
                Field::Size => {
                    if size.is_some() {
                        return Err(M::Error::duplicate_field("size"));
                    }
                    size = Some(access.next_value()?);
                }
                Field::Entries => {
                    if entries.is_some() {
                        return Err(M::Error::duplicate_field("entries"));
                    }
                    let Entries(buffered) = access.next_value()?;
                    entries = Some(buffered);
                }
            }
        }
        let size = size.ok_or_else(|| M::Error::missing_field("size"))?;
        let entries = entries.ok_or_else(|| M::Error::missing_field("entries"))?;
        build(size, entries)
    }
}

impl<'de, K, V, H> Deserialize<'de> for ChainedHashMap<K, V, H>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    H: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct(NAME, FIELDS, ChainedHashMapVisitor::<K, V, H>::new())
    }
}
