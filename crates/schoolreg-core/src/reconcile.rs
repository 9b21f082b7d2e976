//! Matching a validated row to zero or one stored record, then merging and
//! persisting it.

use tracing::debug;

use crate::{
  error::RowError,
  school::{ActorId, NewSchool, School},
  store::SchoolStore,
  validate::ValidRow,
};

/// The outcome of looking up a natural key.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
  /// A live record already carries this `school_no`.
  Found(School),
  /// No live record does; the row becomes a new record with this key.
  NotFound(String),
}

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
  Created(School),
  Updated(School),
}

impl Reconciled {
  pub fn school(&self) -> &School {
    match self {
      Self::Created(school) | Self::Updated(school) => school,
    }
  }

  pub fn into_school(self) -> School {
    match self {
      Self::Created(school) | Self::Updated(school) => school,
    }
  }

  pub fn is_created(&self) -> bool { matches!(self, Self::Created(_)) }
}

/// Look up the live record for `school_no`. Exactly one store query; no
/// secondary keys are consulted.
pub async fn resolve<S: SchoolStore>(
  store: &S,
  school_no: &str,
) -> Result<Target, S::Error> {
  Ok(match store.find_by_key(school_no).await? {
    Some(school) => Target::Found(school),
    None => Target::NotFound(school_no.to_owned()),
  })
}

/// Merge `row` into its target record, or create one, and persist.
///
/// Attributes the row does not carry are left untouched on an existing record
/// and unset on a new one.
pub async fn reconcile<S: SchoolStore>(
  store: &S,
  row: ValidRow,
  actor: Option<ActorId>,
) -> Result<Reconciled, RowError> {
  let ValidRow { school_no, patch } = row;

  match resolve(store, &school_no).await.map_err(RowError::from_store)? {
    Target::Found(mut school) => {
      debug!(%school_no, school_id = %school.school_id, "updating existing school");
      school.apply(patch);
      school.updated_by = actor;
      let school = store.update(school).await.map_err(RowError::from_store)?;
      Ok(Reconciled::Updated(school))
    }
    Target::NotFound(school_no) => {
      debug!(%school_no, "creating new school");
      let mut input = NewSchool::from_patch(school_no, patch)?;
      input.created_by = actor;
      let school = store.create(input).await.map_err(RowError::from_store)?;
      Ok(Reconciled::Created(school))
    }
  }
}
