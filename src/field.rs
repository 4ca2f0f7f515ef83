use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{Config, Error, SafeId, UuidCodec};

struct CachedSafeId {
    generation: u64,
    safe_id: Arc<SafeId<UuidCodec>>,
}

thread_local! {
    static SAFE_ID_CACHE: RefCell<HashMap<&'static str, CachedSafeId>> = RefCell::new(HashMap::new());
}

fn get_or_create_safe_id(name: &'static str) -> Result<Arc<SafeId<UuidCodec>>, Error> {
    let generation = Config::global_generation();
    SAFE_ID_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(cached) = cache.get(name) {
            if cached.generation == generation {
                return Ok(cached.safe_id.clone());
            }
        }
        let config = Config::global()
            .ok_or(Error::KeyImport("global configuration is not set"))?
            .namespace(name)
            .map_err(|_| Error::KeyImport("type marker name must not be empty"))?;
        let safe_id = Arc::new(SafeId::new(UuidCodec, &config)?);
        cache.insert(
            name,
            CachedSafeId {
                generation,
                safe_id: safe_id.clone(),
            },
        );
        Ok(safe_id)
    })
}

pub trait TypeMarker: std::fmt::Debug {
    fn name() -> &'static str;
}

/// A generic type-safe object ID field (a wrapped UUID).
///
/// When serialized with Serde, the UUID is automatically encrypted into a URL safe
/// token. Deserialization decrypts the token back to the UUID. The type marker's
/// `fn name()` selects a key namespace, so a token issued for one type of object
/// does not decrypt as another.
///
/// With the `diesel` feature, the field maps to Postgres `uuid` columns.
///
/// # Examples
///
/// ```
/// use safeid_rs;
/// use serde::{Serialize, Deserialize};
/// use serde_json;
///
/// #[derive(Clone, Copy, Debug)]
/// pub struct ExampleIdMarker;
/// impl safeid_rs::TypeMarker for ExampleIdMarker {
///     fn name() -> &'static str { "example" }
/// }
///
/// type ExampleId = safeid_rs::Field<ExampleIdMarker>;
///
/// #[derive(serde::Serialize)]
/// struct Example {
///     pub id: ExampleId,
/// }
///
/// safeid_rs::Config::set_global(safeid_rs::Config::new(vec![0u8; 8]));
/// let obj = Example { id: ExampleId::from(uuid::Uuid::nil()) };
/// let obj_str = serde_json::to_string(&obj).unwrap();
/// assert_eq!(obj_str, "{\"id\":\"THnd2PRPndQ2VU8ks6OXamiajo8yzZEgS4pxwo5qgqVOzNMW\"}");
/// ```
#[cfg_attr(feature = "diesel", derive(diesel::expression::AsExpression))]
#[cfg_attr(feature = "diesel", diesel(sql_type = diesel::sql_types::Uuid))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field<T: TypeMarker> {
    id: Uuid,
    _marker: std::marker::PhantomData<T>,
}

impl<T: TypeMarker> From<Field<T>> for Uuid {
    /// Returns the raw `Uuid` value.
    fn from(field: Field<T>) -> Self {
        field.id
    }
}

impl<T: TypeMarker> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Field {{ id: {}, marker: {} }}", self.id, T::name())
    }
}

impl<T: TypeMarker> Field<T> {
    /// Creates a `Field<T>` value from a `Uuid`.
    pub fn from(id: Uuid) -> Self {
        Field {
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// Encrypts the ID into its token using the global configuration.
    pub fn encrypt(self) -> Result<String, Error> {
        let safe_id = get_or_create_safe_id(T::name())?;
        safe_id.encrypt_uuid(&self.id)
    }

    /// Decrypts a token issued for this type using the global configuration.
    pub fn decrypt(token: &str) -> Result<Self, Error> {
        let safe_id = get_or_create_safe_id(T::name())?;
        Ok(Field::from(safe_id.decrypt_uuid(token)?))
    }
}

impl<T: TypeMarker> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let safe_id = get_or_create_safe_id(T::name()).map_err(serde::ser::Error::custom)?;
        let token = safe_id
            .encrypt_uuid(&self.id)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&token)
    }
}

impl<'de, T: TypeMarker> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        let safe_id = get_or_create_safe_id(T::name()).map_err(serde::de::Error::custom)?;
        let id = safe_id
            .decrypt_uuid(&token)
            .map_err(serde::de::Error::custom)?;
        Ok(Field::from(id))
    }
}

#[cfg(feature = "diesel")]
mod sql {
    use diesel::deserialize::{self, FromSql, Queryable};
    use diesel::pg::{Pg, PgValue};
    use diesel::serialize::{self, Output, ToSql};
    use diesel::sql_types;
    use uuid::Uuid;

    use super::{Field, TypeMarker};

    impl<T: TypeMarker> ToSql<sql_types::Uuid, Pg> for Field<T> {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
            <Uuid as ToSql<sql_types::Uuid, Pg>>::to_sql(&self.id, out)
        }
    }

    impl<T: TypeMarker> FromSql<sql_types::Uuid, Pg> for Field<T> {
        fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
            let id = <Uuid as FromSql<sql_types::Uuid, Pg>>::from_sql(bytes)?;
            Ok(Field::from(id))
        }
    }

    impl<T> Queryable<sql_types::Uuid, Pg> for Field<T>
    where
        T: TypeMarker,
    {
        type Row = <Uuid as Queryable<sql_types::Uuid, Pg>>::Row;

        fn build(row: Self::Row) -> deserialize::Result<Self> {
            let id = Uuid::build(row)?;
            Ok(Field::from(id))
        }
    }
}
