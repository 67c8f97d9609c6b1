//! Persisted resume record plus the pure, index-keyed edits the form applies to it.
//!
//! Every group is `#[serde(default)]` so that a record stored before a group
//! existed still loads: missing groups become empty, missing optional fields `None`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<SkillGroup>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub degree: String,
    pub university: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A labelled group of skills. `items` is free text, usually comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillGroup {
    pub category: String,
    pub items: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Editable fields of an education row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationField {
    Degree,
    University,
    Year,
    Gpa,
    Description,
}

/// Editable fields of an experience row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceField {
    Title,
    Company,
    Duration,
    Description,
}

/// Returns `Some(trimmed)` when the value carries visible text.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Same as [`non_blank`] for optional fields.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(non_blank)
}

/// One form edit, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormEdit {
    AddEducation,
    RemoveEducation { index: usize },
    SetEducation { index: usize, field: EducationField, value: String },
    AddExperience,
    RemoveExperience { index: usize },
    SetExperience { index: usize, field: ExperienceField, value: String },
}

impl FormEdit {
    pub fn apply(&self, data: &ResumeData) -> ResumeData {
        match self {
            FormEdit::AddEducation => data.with_education_added(),
            FormEdit::RemoveEducation { index } => data.with_education_removed(*index),
            FormEdit::SetEducation { index, field, value } => {
                data.with_education_field(*index, *field, value)
            }
            FormEdit::AddExperience => data.with_experience_added(),
            FormEdit::RemoveExperience { index } => data.with_experience_removed(*index),
            FormEdit::SetExperience { index, field, value } => {
                data.with_experience_field(*index, *field, value)
            }
        }
    }
}

impl ResumeData {
    /// The record a fresh form starts from: one blank education and one blank
    /// experience row.
    pub fn form_template() -> Self {
        ResumeData {
            education: vec![Education::default()],
            experience: vec![Experience::default()],
            ..Default::default()
        }
    }

    /// Display name, if one was entered.
    pub fn display_name(&self) -> Option<&str> {
        present(&self.personal_info.name)
    }

    pub fn with_education_added(&self) -> Self {
        let mut next = self.clone();
        next.education.push(Education::default());
        next
    }

    /// Removes the row at `index`. The last remaining row is kept, and an
    /// out-of-range index leaves the record unchanged.
    pub fn with_education_removed(&self, index: usize) -> Self {
        let mut next = self.clone();
        if next.education.len() > 1 && index < next.education.len() {
            next.education.remove(index);
        }
        next
    }

    pub fn with_education_field(&self, index: usize, field: EducationField, value: &str) -> Self {
        let mut next = self.clone();
        if let Some(row) = next.education.get_mut(index) {
            let value = value.to_string();
            match field {
                EducationField::Degree => row.degree = value,
                EducationField::University => row.university = value,
                EducationField::Year => row.year = value,
                EducationField::Gpa => row.gpa = Some(value),
                EducationField::Description => row.description = Some(value),
            }
        }
        next
    }

    pub fn with_experience_added(&self) -> Self {
        let mut next = self.clone();
        next.experience.push(Experience::default());
        next
    }

    /// Removes the row at `index`, keeping at least one row.
    pub fn with_experience_removed(&self, index: usize) -> Self {
        let mut next = self.clone();
        if next.experience.len() > 1 && index < next.experience.len() {
            next.experience.remove(index);
        }
        next
    }

    pub fn with_experience_field(
        &self,
        index: usize,
        field: ExperienceField,
        value: &str,
    ) -> Self {
        let mut next = self.clone();
        if let Some(row) = next.experience.get_mut(index) {
            let value = value.to_string();
            match field {
                ExperienceField::Title => row.title = value,
                ExperienceField::Company => row.company = value,
                ExperienceField::Duration => row.duration = value,
                ExperienceField::Description => row.description = Some(value),
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_template_has_one_placeholder_row_each() {
        let data = ResumeData::form_template();
        assert_eq!(data.education.len(), 1);
        assert_eq!(data.experience.len(), 1);
        assert!(data.skills.is_empty());
    }

    #[test]
    fn test_minimal_legacy_json_fills_defaults() {
        let raw = r#"{"education":[{"degree":"BSc","university":"MIT","year":"2020"}],"experience":[]}"#;
        let data: ResumeData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.education[0].degree, "BSc");
        assert_eq!(data.education[0].gpa, None);
        assert!(data.experience.is_empty());
        assert!(data.projects.is_empty());
        assert!(data.certifications.is_empty());
        assert_eq!(data.personal_info, PersonalInfo::default());
    }

    #[test]
    fn test_camel_case_personal_info_key() {
        let raw = r#"{"personalInfo":{"name":"Ada Lovelace","email":"ada@example.com"}}"#;
        let data: ResumeData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.display_name(), Some("Ada Lovelace"));
        assert!(data.education.is_empty());
    }

    #[test]
    fn test_blank_name_is_not_a_display_name() {
        let mut data = ResumeData::default();
        data.personal_info.name = Some("   ".to_string());
        assert_eq!(data.display_name(), None);
    }

    #[test]
    fn test_remove_keeps_last_education_row() {
        let data = ResumeData::form_template();
        let next = data.with_education_removed(0);
        assert_eq!(next.education.len(), 1);
    }

    #[test]
    fn test_add_then_remove_by_index() {
        let data = ResumeData::form_template()
            .with_experience_added()
            .with_experience_field(1, ExperienceField::Title, "Engineer");
        assert_eq!(data.experience.len(), 2);

        let next = data.with_experience_removed(0);
        assert_eq!(next.experience.len(), 1);
        assert_eq!(next.experience[0].title, "Engineer");
    }

    #[test]
    fn test_field_update_does_not_mutate_original() {
        let data = ResumeData::form_template();
        let next = data.with_education_field(0, EducationField::Gpa, "3.9");
        assert_eq!(data.education[0].gpa, None);
        assert_eq!(next.education[0].gpa.as_deref(), Some("3.9"));
    }

    #[test]
    fn test_form_edit_parses_tagged_json() {
        let edit: FormEdit = serde_json::from_str(
            r#"{"op":"set_experience","index":0,"field":"company","value":"Acme"}"#,
        )
        .unwrap();
        let next = edit.apply(&ResumeData::form_template());
        assert_eq!(next.experience[0].company, "Acme");

        let edit: FormEdit = serde_json::from_str(r#"{"op":"add_education"}"#).unwrap();
        assert_eq!(edit.apply(&next).education.len(), 2);
    }

    #[test]
    fn test_field_update_out_of_range_is_noop() {
        let data = ResumeData::form_template();
        let next = data.with_education_field(5, EducationField::Degree, "PhD");
        assert_eq!(next, data);
    }
}
