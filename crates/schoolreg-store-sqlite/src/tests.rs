//! Integration tests for `SqliteStore` against an in-memory database.

use rstest::rstest;
use schoolreg_core::{
  field::Field,
  lifecycle::TrashedFilter,
  school::{NewSchool, SchoolCategory, SchoolType},
  store::{SchoolQuery, SchoolStore, SortKey, StoreError},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn central() -> NewSchool {
  NewSchool {
    school_census_no: Some("CEN001".into()),
    division: Some("Central Division".into()),
    district: Some("Colombo".into()),
    province: Some("Western".into()),
    email: Some("info@centralcollege.lk".into()),
    established_year: Some(1950),
    geo_lat: Some(6.927079),
    geo_lng: Some(79.861244),
    ..NewSchool::new(
      "SCH001",
      "Central College",
      SchoolType::OneAb,
      SchoolCategory::National,
    )
  }
}

fn western() -> NewSchool {
  NewSchool {
    school_census_no: Some("CEN002".into()),
    district: Some("Gampaha".into()),
    province: Some("Western".into()),
    website: Some("https://westernhigh.lk".into()),
    ..NewSchool::new(
      "SCH002",
      "Western High School",
      SchoolType::OneC,
      SchoolCategory::Province,
    )
  }
}

fn hill() -> NewSchool {
  NewSchool {
    province: Some("Central".into()),
    geo_lat: Some(7.29),
    ..NewSchool::new(
      "SCH003",
      "Hill Side Vidyalaya",
      SchoolType::Type2,
      SchoolCategory::Semigovernment,
    )
  }
}

// ─── Create and read ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_round_trip() {
  let s = store().await;
  let actor = Uuid::new_v4();

  let created = s
    .create(NewSchool { created_by: Some(actor), ..central() })
    .await
    .unwrap();
  assert_eq!(created.created_by, Some(actor));
  assert_eq!(created.updated_by, Some(actor));
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get(created.school_id).await.unwrap().unwrap();
  assert_eq!(fetched.school_no, "SCH001");
  assert_eq!(fetched.school_type, SchoolType::OneAb);
  assert_eq!(fetched.established_year, Some(1950));
  assert_eq!(fetched.geo_lng, Some(79.861244));
  assert_eq!(fetched.zone, None);
  assert_eq!(fetched.created_by, Some(actor));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_key_ignores_trashed_rows() {
  let s = store().await;
  let created = s.create(central()).await.unwrap();

  let found = s.find_by_key("SCH001").await.unwrap().unwrap();
  assert_eq!(found.school_id, created.school_id);
  assert!(s.find_by_key("SCH999").await.unwrap().is_none());

  s.soft_delete(created.school_id, None).await.unwrap();
  assert!(s.find_by_key("SCH001").await.unwrap().is_none());
  assert!(s.get(created.school_id).await.unwrap().is_some());
}

// ─── Uniqueness ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_school_no_is_a_unique_violation() {
  let s = store().await;
  s.create(central()).await.unwrap();

  let err = s
    .create(NewSchool { school_census_no: None, ..central() })
    .await
    .unwrap_err();
  let violation = err.unique_violation().expect("unique violation");
  assert_eq!(violation.field, Field::SchoolNo);
  assert_eq!(violation.value, "SCH001");
}

#[tokio::test]
async fn duplicate_census_no_is_a_unique_violation() {
  let s = store().await;
  s.create(central()).await.unwrap();

  let err = s
    .create(NewSchool { school_census_no: Some("CEN001".into()), ..western() })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::UniqueViolation(ref v) if v.field == Field::SchoolCensusNo && v.value == "CEN001"
  ));
  assert_eq!(s.list(&SchoolQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_census_numbers_do_not_collide() {
  let s = store().await;
  s.create(NewSchool { school_census_no: None, ..central() })
    .await
    .unwrap();
  s.create(NewSchool { school_census_no: None, ..western() })
    .await
    .unwrap();
}

#[tokio::test]
async fn trashed_rows_keep_their_keys() {
  let s = store().await;
  let created = s.create(central()).await.unwrap();
  s.soft_delete(created.school_id, None).await.unwrap();

  let err = s.create(central()).await.unwrap_err();
  assert!(err.unique_violation().is_some());
}

#[tokio::test]
async fn update_into_a_taken_key_is_rejected() {
  let s = store().await;
  s.create(central()).await.unwrap();
  let mut other = s.create(western()).await.unwrap();

  other.school_no = "SCH001".into();
  let err = s.update(other).await.unwrap_err();
  assert_eq!(err.unique_violation().unwrap().field, Field::SchoolNo);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_persists_every_attribute() {
  let s = store().await;
  let mut school = s.create(central()).await.unwrap();
  let actor = Uuid::new_v4();

  school.email = Some("office@centralcollege.lk".into());
  school.geo_lat = None;
  school.school_category = SchoolCategory::Private;
  school.updated_by = Some(actor);
  let updated = s.update(school.clone()).await.unwrap();
  assert!(updated.updated_at >= school.updated_at);

  let fetched = s.get(school.school_id).await.unwrap().unwrap();
  assert_eq!(fetched.email.as_deref(), Some("office@centralcollege.lk"));
  assert_eq!(fetched.geo_lat, None);
  assert_eq!(fetched.school_category, SchoolCategory::Private);
  assert_eq!(fetched.updated_by, Some(actor));
  assert_eq!(fetched.created_at, school.created_at);
}

#[tokio::test]
async fn update_missing_school_is_not_found() {
  let s = store().await;
  let mut school = s.create(central()).await.unwrap();
  s.force_delete(school.school_id).await.unwrap();

  school.zone = Some("Zone 9".into());
  let err = s.update(school).await.unwrap_err();
  assert!(err.is_not_found());
}

// ─── Soft delete, restore, force delete ──────────────────────────────────────

#[tokio::test]
async fn soft_delete_and_restore() {
  let s = store().await;
  let created = s.create(central()).await.unwrap();
  let actor = Uuid::new_v4();

  let trashed = s.soft_delete(created.school_id, Some(actor)).await.unwrap();
  assert!(trashed.is_trashed());
  assert_eq!(trashed.deleted_by, Some(actor));

  let again = s.soft_delete(created.school_id, None).await.unwrap();
  assert_eq!(again.deleted_at, trashed.deleted_at);
  assert_eq!(again.deleted_by, Some(actor));

  let restored = s.restore(created.school_id).await.unwrap();
  assert!(!restored.is_trashed());
  assert_eq!(restored.deleted_by, None);

  let still = s.restore(created.school_id).await.unwrap();
  assert!(!still.is_trashed());
}

#[tokio::test]
async fn lifecycle_on_missing_school_is_not_found() {
  let s = store().await;
  let id = Uuid::new_v4();
  assert!(s.soft_delete(id, None).await.unwrap_err().is_not_found());
  assert!(s.restore(id).await.unwrap_err().is_not_found());
  assert!(s.force_delete(id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn force_delete_frees_the_key() {
  let s = store().await;
  let created = s.create(central()).await.unwrap();
  s.soft_delete(created.school_id, None).await.unwrap();
  s.force_delete(created.school_id).await.unwrap();

  assert!(s.get(created.school_id).await.unwrap().is_none());
  s.create(central()).await.unwrap();
}

// ─── Listing ─────────────────────────────────────────────────────────────────

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.create(central()).await.unwrap();
  s.create(western()).await.unwrap();
  let hill = s.create(hill()).await.unwrap();
  s.soft_delete(hill.school_id, None).await.unwrap();
  s
}

fn numbers(schools: &[schoolreg_core::school::School]) -> Vec<&str> {
  schools.iter().map(|s| s.school_no.as_str()).collect()
}

#[rstest]
#[case(TrashedFilter::Without, vec!["SCH001", "SCH002"])]
#[case(TrashedFilter::With, vec!["SCH001", "SCH003", "SCH002"])]
#[case(TrashedFilter::Only, vec!["SCH003"])]
#[tokio::test]
async fn list_respects_trashed_filter(
  #[case] trashed: TrashedFilter,
  #[case] expected: Vec<&str>,
) {
  let s = seeded().await;
  let all = s
    .list(&SchoolQuery { trashed, ..SchoolQuery::default() })
    .await
    .unwrap();
  assert_eq!(numbers(&all), expected);
}

#[tokio::test]
async fn list_filters_by_attributes() {
  let s = seeded().await;

  let query = SchoolQuery { has_email: Some(true), ..SchoolQuery::default() };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), ["SCH001"]);

  let query = SchoolQuery { has_website: Some(false), ..SchoolQuery::default() };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), ["SCH001"]);

  let query = SchoolQuery {
    school_type: Some(SchoolType::OneC),
    ..SchoolQuery::default()
  };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), ["SCH002"]);

  let query = SchoolQuery {
    province: Some("Western".into()),
    school_category: Some(SchoolCategory::National),
    ..SchoolQuery::default()
  };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), ["SCH001"]);
}

#[rstest]
#[case("central", vec!["SCH001"])]
#[case("GAMPAHA", vec!["SCH002"])]
#[case("cen00", vec!["SCH001", "SCH002"])]
#[case("%", vec![])]
#[tokio::test]
async fn list_searches_text_columns(
  #[case] search: &str,
  #[case] expected: Vec<&str>,
) {
  let s = seeded().await;
  let query = SchoolQuery { search: Some(search.into()), ..SchoolQuery::default() };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), expected);
}

#[tokio::test]
async fn list_sorts_and_pages() {
  let s = seeded().await;

  let query = SchoolQuery {
    sort: SortKey::SchoolNo,
    descending: true,
    trashed: TrashedFilter::With,
    ..SchoolQuery::default()
  };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), [
    "SCH003", "SCH002", "SCH001"
  ]);

  let query = SchoolQuery { limit: Some(1), offset: Some(1), ..query };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), ["SCH002"]);

  let query = SchoolQuery { limit: None, offset: Some(2), ..query };
  assert_eq!(numbers(&s.list(&query).await.unwrap()), ["SCH001"]);
}

#[tokio::test]
async fn distinct_provinces_skip_trashed_and_empty() {
  let s = seeded().await;
  s.create(NewSchool {
    province: Some(String::new()),
    ..NewSchool::new("SCH004", "Lake School", SchoolType::Type3, SchoolCategory::Private)
  })
  .await
  .unwrap();
  s.create(NewSchool {
    province: Some("Southern".into()),
    ..NewSchool::new("SCH005", "Bay School", SchoolType::Type3, SchoolCategory::Private)
  })
  .await
  .unwrap();

  assert_eq!(s.distinct_provinces().await.unwrap(), ["Southern", "Western"]);
}
