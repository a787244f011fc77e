//! Field catalog: the static per-model schema.
//!
//! Every document field is declared once with a [`FieldKind`]. The subsets
//! used by the query builder and the formatters (filterable, aggregable,
//! full-text eligible, displayed) are derived from the kinds, so a new field
//! shows up everywhere its kind allows unless it is left out explicitly.
//!
//! [`validate_all`] is run once at startup; the tables are never consulted
//! in an unvalidated state by the server.

use std::collections::HashSet;

use crate::{Error, Model, Result};

// ─── Field kinds ─────────────────────────────────────────────────────────────

/// How a field is stored in the engine, and therefore how it may be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Untokenised string. Exact-match filterable and aggregable.
  Keyword,
  /// Tokenised string. Searchable through `fulltext`, not exact-filterable.
  Text,
  /// Whole number. Exact-match filterable like a keyword, but left out of
  /// `fulltext` and never aggregated.
  Integer,
  /// Calendar date. Range-filterable, never part of full-text.
  Date,
  /// Denormalised list of cross-reference stubs with the given keys.
  Relation(&'static [&'static str]),
}

impl FieldKind {
  pub fn is_filterable(self) -> bool {
    matches!(self, Self::Keyword | Self::Integer)
  }

  pub fn is_fulltext(self) -> bool { matches!(self, Self::Keyword | Self::Text) }

  pub fn is_relation(self) -> bool { matches!(self, Self::Relation(_)) }
}

/// A single declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
  pub name: &'static str,
  pub kind: FieldKind,
}

const fn kw(name: &'static str) -> FieldDef {
  FieldDef { name, kind: FieldKind::Keyword }
}

const fn text(name: &'static str) -> FieldDef {
  FieldDef { name, kind: FieldKind::Text }
}

const fn int(name: &'static str) -> FieldDef {
  FieldDef { name, kind: FieldKind::Integer }
}

const fn date(name: &'static str) -> FieldDef {
  FieldDef { name, kind: FieldKind::Date }
}

const fn rel(name: &'static str, keys: &'static [&'static str]) -> FieldDef {
  FieldDef { name, kind: FieldKind::Relation(keys) }
}

/// Pretty labels for the raw values of one field.
pub type Choices = &'static [(&'static str, &'static str)];

// ─── Model catalog ───────────────────────────────────────────────────────────

/// Static description of one model's documents.
#[derive(Debug)]
pub struct ModelCatalog {
  pub model:            Model,
  /// All fields, in display order.
  pub fields:           &'static [FieldDef],
  /// Projection requested from the engine for list and search views.
  pub list_fields:      &'static [&'static str],
  /// Fields with a terms aggregation for faceting.
  pub agg_fields:       &'static [&'static str],
  /// Fields with fragment highlighting on full-text searches.
  pub highlight_fields: &'static [&'static str],
  /// Filter params that target a flattened `<param>_id` field instead of a
  /// nested object.
  pub nested_filters:   &'static [&'static str],
  /// Human-facing facet names.
  pub labels:           &'static [(&'static str, &'static str)],
  /// Pretty labels for field values, keyed by field.
  pub choices:          &'static [(&'static str, Choices)],
}

impl ModelCatalog {
  pub fn field(&self, name: &str) -> Option<&FieldDef> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn kind(&self, name: &str) -> Option<FieldKind> {
    self.field(name).map(|f| f.kind)
  }

  /// Fields accepted as exact-match filter params, including nested params.
  pub fn filterable(&self) -> impl Iterator<Item = &'static str> + '_ {
    self
      .fields
      .iter()
      .filter(|f| f.kind.is_filterable())
      .map(|f| f.name)
      .chain(self.nested_filters.iter().copied())
  }

  /// Fields whose values are concatenated into the `fulltext` field.
  pub fn fulltext_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self
      .fields
      .iter()
      .filter(|f| f.kind.is_fulltext())
      .map(|f| f.name)
  }

  /// Relation fields, with their stub keys.
  pub fn relations(
    &self,
  ) -> impl Iterator<Item = (&'static str, &'static [&'static str])> + '_ {
    self.fields.iter().filter_map(|f| match f.kind {
      FieldKind::Relation(keys) => Some((f.name, keys)),
      _ => None,
    })
  }

  pub fn label(&self, field: &str) -> String {
    self
      .labels
      .iter()
      .find(|(name, _)| *name == field)
      .map(|(_, label)| (*label).to_owned())
      .unwrap_or_else(|| field.to_owned())
  }

  pub fn choice_label(&self, field: &str, value: &str) -> Option<&'static str> {
    self
      .choices
      .iter()
      .find(|(name, _)| *name == field)
      .and_then(|(_, choices)| choices.iter().find(|(k, _)| *k == value))
      .map(|(_, label)| *label)
  }

  /// Check the catalog's internal consistency.
  pub fn validate(&self) -> Result<()> {
    let model = self.model;
    let mut seen = HashSet::new();
    for f in self.fields {
      if !seen.insert(f.name) {
        return Err(Error::Catalog(format!("{model}: duplicate field {}", f.name)));
      }
    }
    if self.field(model.id_field()).is_none() {
      return Err(Error::Catalog(format!(
        "{model}: identifier {} is not declared",
        model.id_field()
      )));
    }
    for name in self.list_fields.iter().chain(self.highlight_fields) {
      if self.field(name).is_none() {
        return Err(Error::Catalog(format!("{model}: unknown field {name}")));
      }
    }
    for name in self.agg_fields {
      if self.kind(name) != Some(FieldKind::Keyword) {
        return Err(Error::Catalog(format!(
          "{model}: aggregation field {name} is not a keyword"
        )));
      }
    }
    for name in self.fulltext_fields() {
      if matches!(self.kind(name), Some(FieldKind::Date | FieldKind::Relation(_)))
      {
        return Err(Error::Catalog(format!(
          "{model}: {name} cannot be searched as full text"
        )));
      }
    }
    for name in self.nested_filters {
      if self.field(name).is_some() {
        return Err(Error::Catalog(format!(
          "{model}: nested filter {name} shadows a declared field"
        )));
      }
    }
    Ok(())
  }
}

/// The catalog for `model`.
pub fn catalog(model: Model) -> &'static ModelCatalog {
  match model {
    Model::Person => &PERSON,
    Model::FarRecord => &FAR_RECORD,
    Model::WraRecord => &WRA_RECORD,
    Model::FarPage => &FAR_PAGE,
  }
}

/// Validate every model's catalog.
pub fn validate_all() -> Result<()> {
  validate_together(&[&PERSON, &FAR_RECORD, &WRA_RECORD, &FAR_PAGE])
}

/// Validate catalogs that may be searched together.
///
/// A param nested in one model and declared in another is filtered on both
/// fields, so the declared field must take exact matches.
fn validate_together(catalogs: &[&ModelCatalog]) -> Result<()> {
  catalogs.iter().try_for_each(|cat| cat.validate())?;
  for nesting in catalogs {
    for name in nesting.nested_filters {
      for other in catalogs {
        match other.kind(name) {
          Some(kind) if !kind.is_filterable() => {
            return Err(Error::Catalog(format!(
              "{}: nested filter {name} is a {kind:?} field in {}",
              nesting.model, other.model
            )));
          }
          _ => {}
        }
      }
    }
  }
  Ok(())
}

// ─── Shared vocabularies ─────────────────────────────────────────────────────

pub const CAMPS: Choices = &[
  ("1-topaz", "Topaz"),
  ("2-poston", "Poston"),
  ("3-gilariver", "Gila River"),
  ("4-amache", "Amache"),
  ("5-heartmountain", "Heart Mountain"),
  ("6-jerome", "Jerome"),
  ("7-manzanar", "Manzanar"),
  ("8-minidoka", "Minidoka"),
  ("9-rohwer", "Rohwer"),
  ("10-tulelake", "Tule Lake"),
];

pub const GENDERS: Choices = &[("F", "Female"), ("M", "Male")];

const PERSON_STUB: &[&str] = &["nr_id", "preferred_name"];

// ─── Person ──────────────────────────────────────────────────────────────────

pub static PERSON: ModelCatalog = ModelCatalog {
  model:            Model::Person,
  fields:           &[
    kw("nr_id"),
    text("family_name"),
    text("given_name"),
    text("given_name_alt"),
    text("other_names"),
    text("middle_name"),
    text("prefix_name"),
    text("suffix_name"),
    text("jp_name"),
    text("preferred_name"),
    date("birth_date"),
    text("birth_date_text"),
    text("birth_place"),
    kw("birth_year"),
    date("death_date"),
    text("death_date_text"),
    text("wra_family_no"),
    text("wra_individual_no"),
    kw("citizenship"),
    text("alien_registration_no"),
    kw("gender"),
    kw("preexclusion_residence_city"),
    kw("preexclusion_residence_state"),
    kw("postexclusion_residence_city"),
    kw("postexclusion_residence_state"),
    kw("exclusion_order_title"),
    kw("exclusion_order_id"),
    date("timestamp"),
    rel("facilities", &["facility_id", "entry_date", "exit_date"]),
    rel("far_records", &["far_record_id", "last_name", "first_name"]),
    rel("wra_records", &[
      "wra_record_id",
      "lastname",
      "firstname",
      "middleinitial",
    ]),
    rel("family", PERSON_STUB),
  ],
  list_fields:      &[
    "nr_id",
    "family_name",
    "given_name",
    "given_name_alt",
    "other_names",
    "middle_name",
    "prefix_name",
    "suffix_name",
    "jp_name",
    "preferred_name",
    "birth_year",
    "wra_family_no",
    "wra_individual_no",
    "alien_registration_no",
    "preexclusion_residence_city",
    "postexclusion_residence_city",
    "exclusion_order_title",
  ],
  agg_fields:       &[
    "citizenship",
    "gender",
    "preexclusion_residence_city",
    "preexclusion_residence_state",
    "postexclusion_residence_city",
    "postexclusion_residence_state",
    "exclusion_order_title",
    "exclusion_order_id",
  ],
  highlight_fields: &[
    "birth_date_text",
    "birth_place",
    "family_name",
    "given_name",
    "other_names",
    "preferred_name",
    "preexclusion_residence_city",
    "postexclusion_residence_city",
  ],
  nested_filters:   &["facility"],
  labels:           &[
    ("citizenship", "Citizenship"),
    ("gender", "Gender"),
    ("preexclusion_residence_city", "Pre-exclusion City"),
    ("preexclusion_residence_state", "Pre-exclusion State"),
    ("postexclusion_residence_city", "Post-exclusion City"),
    ("postexclusion_residence_state", "Post-exclusion State"),
    ("exclusion_order_title", "Exclusion Order"),
    ("exclusion_order_id", "Exclusion Order ID"),
  ],
  choices:          &[("gender", GENDERS)],
};

// ─── FAR record ──────────────────────────────────────────────────────────────

pub static FAR_RECORD: ModelCatalog = ModelCatalog {
  model:            Model::FarRecord,
  fields:           &[
    kw("far_record_id"),
    kw("facility"),
    kw("far_page"),
    kw("original_order"),
    kw("family_number"),
    kw("far_line_id"),
    text("last_name"),
    text("first_name"),
    text("other_names"),
    kw("date_of_birth"),
    kw("year_of_birth"),
    kw("sex"),
    kw("marital_status"),
    kw("citizenship"),
    kw("alien_registration"),
    kw("entry_type_code"),
    kw("entry_type"),
    kw("entry_category"),
    kw("entry_facility"),
    kw("pre_evacuation_address"),
    kw("pre_evacuation_state"),
    kw("date_of_original_entry"),
    kw("departure_type_code"),
    kw("departure_type"),
    kw("departure_category"),
    kw("departure_facility"),
    kw("departure_date"),
    kw("departure_state"),
    kw("camp_address_original"),
    kw("camp_address_block"),
    kw("camp_address_barracks"),
    kw("camp_address_room"),
    kw("reference"),
    text("original_notes"),
    date("timestamp"),
    rel("person", PERSON_STUB),
    rel("family", &["far_record_id", "last_name", "first_name"]),
  ],
  list_fields:      &[
    "far_record_id",
    "facility",
    "family_number",
    "far_line_id",
    "last_name",
    "first_name",
    "other_names",
    "date_of_birth",
    "original_notes",
  ],
  agg_fields:       &[
    "facility",
    "sex",
    "marital_status",
    "citizenship",
    "alien_registration",
    "entry_type_code",
    "entry_type",
    "entry_category",
    "entry_facility",
    "pre_evacuation_state",
    "departure_type_code",
    "departure_type",
    "departure_category",
    "departure_facility",
    "departure_state",
    "camp_address_original",
    "camp_address_block",
    "camp_address_barracks",
    "camp_address_room",
  ],
  highlight_fields: &[],
  nested_filters:   &[],
  labels:           &[
    ("facility", "Camp"),
    ("sex", "Sex"),
    ("marital_status", "Marital Status"),
    ("citizenship", "Citizenship"),
    ("entry_type", "Entry Type"),
    ("departure_type", "Departure Type"),
    ("departure_state", "Departure State"),
  ],
  choices:          &[("facility", CAMPS), ("sex", GENDERS)],
};

// ─── WRA Form 26 record ──────────────────────────────────────────────────────

pub static WRA_RECORD: ModelCatalog = ModelCatalog {
  model:            Model::WraRecord,
  fields:           &[
    kw("wra_record_id"),
    kw("facility"),
    text("lastname"),
    text("firstname"),
    text("middleinitial"),
    kw("birthyear"),
    kw("gender"),
    kw("originalstate"),
    kw("familyno"),
    kw("individualno"),
    text("notes"),
    kw("assemblycenter"),
    kw("originaladdress"),
    kw("birthcountry"),
    kw("fatheroccupus"),
    kw("fatheroccupabr"),
    kw("yearsschooljapan"),
    kw("gradejapan"),
    kw("schooldegree"),
    kw("yearofusarrival"),
    kw("timeinjapan"),
    kw("ageinjapan"),
    kw("militaryservice"),
    kw("maritalstatus"),
    kw("ethnicity"),
    kw("birthplace"),
    kw("citizenshipstatus"),
    kw("highestgrade"),
    kw("language"),
    kw("religion"),
    kw("occupqual1"),
    kw("occupqual2"),
    kw("occupqual3"),
    kw("occupotn1"),
    kw("occupotn2"),
    kw("wra_filenumber"),
    date("timestamp"),
    rel("person", PERSON_STUB),
    rel("family", &["wra_record_id", "lastname", "firstname"]),
  ],
  list_fields:      &[
    "wra_record_id",
    "facility",
    "lastname",
    "firstname",
    "middleinitial",
    "familyno",
    "individualno",
  ],
  agg_fields:       &[
    "facility",
    "birthyear",
    "gender",
    "originalstate",
    "assemblycenter",
    "birthcountry",
    "fatheroccupus",
    "fatheroccupabr",
    "yearsschooljapan",
    "gradejapan",
    "schooldegree",
    "yearofusarrival",
    "timeinjapan",
    "ageinjapan",
    "militaryservice",
    "maritalstatus",
    "ethnicity",
    "birthplace",
    "citizenshipstatus",
    "highestgrade",
    "language",
    "religion",
    "occupqual1",
    "occupqual2",
    "occupqual3",
    "occupotn1",
    "occupotn2",
  ],
  highlight_fields: &[],
  nested_filters:   &[],
  labels:           &[
    ("facility", "Camp"),
    ("birthyear", "Birth Year"),
    ("gender", "Gender"),
    ("originalstate", "Home State"),
    ("assemblycenter", "Assembly Center"),
    ("birthcountry", "Birth Country"),
  ],
  choices:          &[("facility", CAMPS), ("gender", GENDERS)],
};

// ─── FAR ledger page ─────────────────────────────────────────────────────────

pub static FAR_PAGE: ModelCatalog = ModelCatalog {
  model:            Model::FarPage,
  fields:           &[
    kw("far_page_id"),
    kw("facility_id"),
    int("page"),
    kw("file_id"),
    text("file_label"),
  ],
  list_fields:      &["far_page_id", "facility_id", "page", "file_id", "file_label"],
  agg_fields:       &["facility_id"],
  highlight_fields: &[],
  nested_filters:   &[],
  labels:           &[("facility_id", "Camp")],
  choices:          &[("facility_id", CAMPS)],
};

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn shipped_catalogs_are_valid() { validate_all().unwrap(); }

  #[test]
  fn every_model_has_a_catalog_for_itself() {
    for model in Model::iter() {
      assert_eq!(catalog(model).model, model);
    }
  }

  #[test]
  fn fulltext_excludes_dates_and_relations() {
    for model in Model::iter() {
      let cat = catalog(model);
      for name in cat.fulltext_fields() {
        let kind = cat.kind(name).unwrap();
        assert!(
          !matches!(kind, FieldKind::Date | FieldKind::Relation(_)),
          "{model}.{name} is {kind:?}"
        );
      }
    }
    let person: Vec<_> = PERSON.fulltext_fields().collect();
    assert!(!person.contains(&"birth_date"));
    assert!(!person.contains(&"family"));
    assert!(person.contains(&"preferred_name"));
  }

  #[test]
  fn integers_filter_but_stay_out_of_fulltext() {
    assert_eq!(FAR_PAGE.kind("page"), Some(FieldKind::Integer));
    assert!(FAR_PAGE.filterable().any(|f| f == "page"));
    assert!(!FAR_PAGE.fulltext_fields().any(|f| f == "page"));
  }

  #[test]
  fn filterable_includes_nested_params_but_not_text() {
    let person: Vec<_> = PERSON.filterable().collect();
    assert!(person.contains(&"gender"));
    assert!(person.contains(&"birth_year"));
    assert!(person.contains(&"facility"));
    assert!(!person.contains(&"preferred_name"));
    assert!(!person.contains(&"birth_date"));
  }

  #[test]
  fn labels_fall_back_to_field_name() {
    assert_eq!(FAR_RECORD.label("facility"), "Camp");
    assert_eq!(FAR_RECORD.label("reference"), "reference");
    assert_eq!(WRA_RECORD.choice_label("facility", "9-rohwer"), Some("Rohwer"));
    assert_eq!(WRA_RECORD.choice_label("facility", "nowhere"), None);
  }

  #[test]
  fn validate_rejects_date_aggregation() {
    static BAD: ModelCatalog = ModelCatalog {
      model:            Model::FarPage,
      fields:           &[kw("far_page_id"), date("scanned")],
      list_fields:      &[],
      agg_fields:       &["scanned"],
      highlight_fields: &[],
      nested_filters:   &[],
      labels:           &[],
      choices:          &[],
    };
    assert!(matches!(BAD.validate(), Err(Error::Catalog(_))));
  }

  #[test]
  fn shared_nested_param_must_be_exact_elsewhere() {
    static NESTING: ModelCatalog = ModelCatalog {
      model:            Model::Person,
      fields:           &[kw("nr_id")],
      list_fields:      &[],
      agg_fields:       &[],
      highlight_fields: &[],
      nested_filters:   &["facility"],
      labels:           &[],
      choices:          &[],
    };
    static TEXTUAL: ModelCatalog = ModelCatalog {
      model:            Model::WraRecord,
      fields:           &[kw("wra_record_id"), text("facility")],
      list_fields:      &[],
      agg_fields:       &[],
      highlight_fields: &[],
      nested_filters:   &[],
      labels:           &[],
      choices:          &[],
    };
    assert!(validate_together(&[&NESTING, &FAR_RECORD]).is_ok());
    let err = validate_together(&[&NESTING, &TEXTUAL]).unwrap_err();
    assert!(err.to_string().contains("facility"), "{err}");
  }

  #[test]
  fn validate_rejects_unknown_projection_field() {
    static BAD: ModelCatalog = ModelCatalog {
      model:            Model::FarPage,
      fields:           &[kw("far_page_id")],
      list_fields:      &["missing"],
      agg_fields:       &[],
      highlight_fields: &[],
      nested_filters:   &[],
      labels:           &[],
      choices:          &[],
    };
    assert!(BAD.validate().is_err());
  }
}
