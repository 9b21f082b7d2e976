//! Core types and the import pipeline for the school directory.
//!
//! A raw spreadsheet row flows through [`normalize`](normalize::normalize),
//! [`Validator::validate`](validate::Validator::validate) and
//! [`reconcile`](reconcile::reconcile), and its outcome is counted in a
//! [`BatchTally`](tally::BatchTally). This crate is free of HTTP and database
//! dependencies; storage is reached through [`store::SchoolStore`].

// We intentionally use native `async fn` in traits.
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod field;
pub mod lifecycle;
pub mod normalize;
pub mod reconcile;
pub mod row;
pub mod school;
pub mod seed;
pub mod store;
pub mod tally;
pub mod validate;

pub use error::{Error, Result, RowError};

#[cfg(test)]
pub(crate) mod test_helpers {
  use std::sync::Mutex;

  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use crate::{
    field::Field,
    school::*,
    store::{SchoolQuery, SchoolStore, StoreError, UniqueViolation},
  };

  pub(crate) fn central_college() -> School {
    let at = Utc.with_ymd_and_hms(2025, 10, 19, 0, 0, 0).unwrap();
    School {
      school_id:        Uuid::new_v4(),
      school_no:        "SCH001".into(),
      school_census_no: Some("CEN001".into()),
      school_name_en:   "Central College".into(),
      school_name_ta:   None,
      school_name_si:   None,
      school_type:      SchoolType::OneAb,
      school_category:  SchoolCategory::National,
      division:         Some("Central Division".into()),
      zone:             None,
      district:         Some("Colombo".into()),
      province:         Some("Western".into()),
      address:          None,
      phone:            Some("0111234567".into()),
      email:            Some("info@centralcollege.lk".into()),
      website:          None,
      established_year: Some(1950),
      geo_lat:          Some(6.927079),
      geo_lng:          Some(79.861244),
      school_map_url:   None,
      created_by:       None,
      updated_by:       None,
      deleted_by:       None,
      created_at:       at,
      updated_at:       at,
      deleted_at:       None,
    }
  }

  #[derive(Debug, thiserror::Error)]
  pub(crate) enum MemoryError {
    #[error("{0}")]
    Unique(UniqueViolation),
    #[error("not found")]
    NotFound,
  }

  impl StoreError for MemoryError {
    fn unique_violation(&self) -> Option<UniqueViolation> {
      match self {
        Self::Unique(v) => Some(v.clone()),
        Self::NotFound => None,
      }
    }

    fn is_not_found(&self) -> bool { matches!(self, Self::NotFound) }
  }

  /// A `SchoolStore` over a vector, enforcing the same unique keys as the
  /// SQLite backend.
  #[derive(Debug, Default)]
  pub(crate) struct MemoryStore {
    schools: Mutex<Vec<School>>,
  }

  impl MemoryStore {
    fn check_unique(
      schools: &[School],
      candidate: &School,
    ) -> Result<(), MemoryError> {
      for other in schools.iter().filter(|s| s.school_id != candidate.school_id)
      {
        if other.school_no == candidate.school_no {
          return Err(MemoryError::Unique(UniqueViolation {
            field: Field::SchoolNo,
            value: candidate.school_no.clone(),
          }));
        }
        if let Some(census) = &candidate.school_census_no
          && other.school_census_no.as_ref() == Some(census)
        {
          return Err(MemoryError::Unique(UniqueViolation {
            field: Field::SchoolCensusNo,
            value: census.clone(),
          }));
        }
      }
      Ok(())
    }

    fn with_school(
      &self,
      id: Uuid,
      f: impl FnOnce(&mut School),
    ) -> Result<School, MemoryError> {
      let mut schools = self.schools.lock().unwrap();
      let school = schools
        .iter_mut()
        .find(|s| s.school_id == id)
        .ok_or(MemoryError::NotFound)?;
      f(school);
      Ok(school.clone())
    }
  }

  impl SchoolStore for MemoryStore {
    type Error = MemoryError;

    async fn find_by_key(
      &self,
      school_no: &str,
    ) -> Result<Option<School>, MemoryError> {
      let schools = self.schools.lock().unwrap();
      Ok(
        schools
          .iter()
          .find(|s| s.school_no == school_no && !s.is_trashed())
          .cloned(),
      )
    }

    async fn get(&self, id: Uuid) -> Result<Option<School>, MemoryError> {
      let schools = self.schools.lock().unwrap();
      Ok(schools.iter().find(|s| s.school_id == id).cloned())
    }

    async fn create(&self, input: NewSchool) -> Result<School, MemoryError> {
      let now = Utc::now();
      let school = School {
        school_id:        Uuid::new_v4(),
        school_no:        input.school_no,
        school_census_no: input.school_census_no,
        school_name_en:   input.school_name_en,
        school_name_ta:   input.school_name_ta,
        school_name_si:   input.school_name_si,
        school_type:      input.school_type,
        school_category:  input.school_category,
        division:         input.division,
        zone:             input.zone,
        district:         input.district,
        province:         input.province,
        address:          input.address,
        phone:            input.phone,
        email:            input.email,
        website:          input.website,
        established_year: input.established_year,
        geo_lat:          input.geo_lat,
        geo_lng:          input.geo_lng,
        school_map_url:   input.school_map_url,
        created_by:       input.created_by,
        updated_by:       input.created_by,
        deleted_by:       None,
        created_at:       now,
        updated_at:       now,
        deleted_at:       None,
      };
      let mut schools = self.schools.lock().unwrap();
      Self::check_unique(&schools, &school)?;
      schools.push(school.clone());
      Ok(school)
    }

    async fn update(&self, mut school: School) -> Result<School, MemoryError> {
      let mut schools = self.schools.lock().unwrap();
      Self::check_unique(&schools, &school)?;
      let slot = schools
        .iter_mut()
        .find(|s| s.school_id == school.school_id)
        .ok_or(MemoryError::NotFound)?;
      school.updated_at = Utc::now();
      *slot = school.clone();
      Ok(school)
    }

    async fn soft_delete(
      &self,
      id: Uuid,
      actor: Option<Uuid>,
    ) -> Result<School, MemoryError> {
      self.with_school(id, |s| {
        if s.deleted_at.is_none() {
          s.deleted_at = Some(Utc::now());
          s.deleted_by = actor;
        }
      })
    }

    async fn restore(&self, id: Uuid) -> Result<School, MemoryError> {
      self.with_school(id, |s| {
        s.deleted_at = None;
        s.deleted_by = None;
      })
    }

    async fn force_delete(&self, id: Uuid) -> Result<(), MemoryError> {
      let mut schools = self.schools.lock().unwrap();
      let before = schools.len();
      schools.retain(|s| s.school_id != id);
      if schools.len() == before {
        return Err(MemoryError::NotFound);
      }
      Ok(())
    }

    async fn list(
      &self,
      query: &SchoolQuery,
    ) -> Result<Vec<School>, MemoryError> {
      let schools = self.schools.lock().unwrap();
      Ok(schools.iter().filter(|s| query.matches(s)).cloned().collect())
    }

    async fn distinct_provinces(&self) -> Result<Vec<String>, MemoryError> {
      let schools = self.schools.lock().unwrap();
      let mut provinces: Vec<String> = schools
        .iter()
        .filter(|s| !s.is_trashed())
        .filter_map(|s| s.province.clone())
        .filter(|p| !p.is_empty())
        .collect();
      provinces.sort();
      provinces.dedup();
      Ok(provinces)
    }
  }
}
