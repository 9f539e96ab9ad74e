//! Mapping result rows onto records.
//!
//! Columns are matched to record fields by name, using the names the
//! cursor reports for the statement that actually ran.  A column with no
//! matching field is decoded and thrown away; a field with no matching
//! column keeps its default value.

use crate::client::{Client, Cursor, Target};
use crate::error::Error;
use crate::record::Record;

/// Reads the next row of `cursor` into a new record.
///
/// If there are no more rows this returns the cursor's terminal error
/// when it has one, and an error of kind
/// [`NoRows`](crate::error::ErrorKind::NoRows) otherwise.
pub fn materialize_one<C, R>(cursor: &mut dyn Cursor<C>) -> Result<R, Error<C::Error>>
where
    C: Client,
    R: Record<C>,
{
    match materialize_opt(cursor)? {
        Some(record) => Ok(record),
        None => Err(Error::no_rows()),
    }
}

/// Reads the next row of `cursor` into a new record, if there is a row.
pub fn materialize_opt<C, R>(cursor: &mut dyn Cursor<C>) -> Result<Option<R>, Error<C::Error>>
where
    C: Client,
    R: Record<C>,
{
    if !cursor.advance() {
        return match cursor.terminal_error() {
            Some(err) => Err(err),
            None => Ok(None),
        };
    }

    scan(cursor).map(Some)
}

/// Reads every remaining row of `cursor` into records.
///
/// An empty result is an empty `Vec`.
pub fn materialize_all<C, R>(cursor: &mut dyn Cursor<C>) -> Result<Vec<R>, Error<C::Error>>
where
    C: Client,
    R: Record<C>,
{
    let mut records = vec![];
    while cursor.advance() {
        records.push(scan(cursor)?);
    }

    if let Some(err) = cursor.terminal_error() {
        return Err(err);
    }

    Ok(records)
}

/// Decodes the cursor's current row into a fresh record.
fn scan<C, R>(cursor: &mut dyn Cursor<C>) -> Result<R, Error<C::Error>>
where
    C: Client,
    R: Record<C>,
{
    let mut record = R::default();
    let mut fields = record.fields();

    let mut targets = Vec::with_capacity(cursor.column_names().len());
    for column in cursor.column_names() {
        match fields.take(column) {
            Some(field) => targets.push(Target::Field(field)),
            None => {
                tracing::trace!(column = column.as_str(), "discarding unmatched column");
                targets.push(Target::Discard);
            }
        }
    }

    if !fields.is_empty() {
        tracing::trace!(
            missing = ?fields.names().collect::<Vec<_>>(),
            "fields without a column keep their default"
        );
    }
    drop(fields);

    cursor.decode_into(&mut targets)?;
    drop(targets);

    Ok(record)
}

/// Decodes `row` into `targets` positionally.
///
/// This is the shared body of the backends' [`Cursor::decode_into`]:
/// fields decode themselves, and `discard` is called for the rest.
pub fn decode_row<C, D>(
    row: &C::Row<'_>,
    targets: &mut [Target<'_, C>],
    mut discard: D,
) -> Result<(), Error<C::Error>>
where
    C: Client,
    D: FnMut(&C::Row<'_>, usize) -> Result<(), Error<C::Error>>,
{
    for (index, target) in targets.iter_mut().enumerate() {
        match target {
            Target::Field(field) => field.from_column(row, index)?,
            Target::Discard => discard(row, index)?,
        }
    }
    Ok(())
}
