//! Records and their field catalogs.
//!
//! A record is a plain struct whose fields correspond to columns.  Each
//! record type can list its fields by logical column name, either as
//! settable slots (to read a row into) or as borrowed parameter values
//! (to write a row from).  That listing is a [`FieldCatalog`].

use crate::client::{Client, FromColumn};

/// A struct that maps onto database rows by column name.
///
/// This is generally derived.  Fields are matched to columns by their
/// lower-cased name, and fields whose column isn't in a result are left
/// at their `Default` value, so the struct needs to implement `Default`.
#[cfg_attr(
    feature = "derive",
    doc = r##"

```
use dbx::Record;

#[derive(Debug, Default, Record)]
pub struct Holding {
    pub ts: String,
    pub loc: String,
    pub currency: String,
    pub notes: Option<String>,
}
```
"##
)]
///
/// Use the `column` attribute to read a field from a differently-named
/// column, and `skip` (or `column = "-"`) to leave a field out entirely.
#[cfg_attr(
    feature = "derive",
    doc = r##"

```
use dbx::Record;

#[derive(Default, Record)]
pub struct Widget {
    #[dbx(column = "type")]
    pub kind: String,
    #[dbx(skip)]
    pub cached_label: String,
    #[dbx(column = "-")]
    pub scratch: Vec<u8>,
}
```
"##
)]
///
/// If two fields resolve to the same column name, the one declared later
/// wins.  Nothing checks for this, so take care when renaming.
///
/// Only structs with named fields can be records.
#[cfg_attr(
    feature = "derive",
    doc = r##"

```compile_fail
#[derive(Default, dbx::Record)]
enum Status {
    #[default]
    Open,
    Closed,
}
```

```compile_fail
#[derive(Default, dbx::Record)]
struct Pair(i32, String);
```
"##
)]
pub trait Record<C: Client>: Default {
    /// Settable slots for every persisted field, in declaration order.
    fn fields(&mut self) -> FieldCatalog<&mut dyn FromColumn<C>>;

    /// The current value of every persisted field, in declaration order.
    fn values(&self) -> FieldCatalog<C::Param<'_>>;
}

impl<C: Client, R: Record<C>> Record<C> for Box<R> {
    fn fields(&mut self) -> FieldCatalog<&mut dyn FromColumn<C>> {
        (**self).fields()
    }

    fn values(&self) -> FieldCatalog<C::Param<'_>> {
        (**self).values()
    }
}

/// An ordered mapping from logical column name to something about a field.
///
/// Entries keep the order they were first inserted in.  Inserting a name
/// that's already present replaces that entry's accessor.
#[derive(Debug, Clone)]
pub struct FieldCatalog<A> {
    entries: Vec<(&'static str, A)>,
}

impl<A> Default for FieldCatalog<A> {
    fn default() -> Self {
        FieldCatalog::new()
    }
}

impl<A> FieldCatalog<A> {
    pub fn new() -> Self {
        FieldCatalog { entries: vec![] }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        FieldCatalog {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Adds an entry, returning the accessor it replaced if the name was taken.
    pub fn insert(&mut self, name: &'static str, accessor: A) -> Option<A> {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, accessor)),
            None => {
                self.entries.push((name, accessor));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&A> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, accessor)| accessor)
    }

    /// Removes and returns the accessor for `name`.
    pub fn take(&mut self, name: &str) -> Option<A> {
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> IntoIterator for FieldCatalog<A> {
    type Item = (&'static str, A);
    type IntoIter = std::vec::IntoIter<(&'static str, A)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
