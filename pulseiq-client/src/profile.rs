//! Editable profile record

use config_engine::ProfileDefaults;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub email: String,
    pub blood_type: String,
    pub phone: String,
    pub age: String,
}

impl From<&ProfileDefaults> for ProfileRecord {
    fn from(defaults: &ProfileDefaults) -> Self {
        Self {
            name: defaults.name.clone(),
            email: defaults.email.clone(),
            blood_type: defaults.blood_type.clone(),
            phone: defaults.phone.clone(),
            age: defaults.age.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Email,
    BloodType,
    Phone,
    Age,
}

impl ProfileRecord {
    fn field_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::BloodType => &mut self.blood_type,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Age => &mut self.age,
        }
    }
}

/// Committed record plus an optional draft being edited
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    committed: ProfileRecord,
    draft: Option<ProfileRecord>,
}

impl ProfileEditor {
    pub fn new(record: ProfileRecord) -> Self {
        Self { committed: record, draft: None }
    }

    pub fn committed(&self) -> &ProfileRecord {
        &self.committed
    }

    pub fn draft(&self) -> Option<&ProfileRecord> {
        self.draft.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Start editing from the committed copy; an open draft is kept
    pub fn begin_edit(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(self.committed.clone());
        }
    }

    /// Returns false when no edit is in progress
    pub fn update_draft(&mut self, field: ProfileField, value: impl Into<String>) -> bool {
        match self.draft.as_mut() {
            Some(draft) => {
                *draft.field_mut(field) = value.into();
                true
            }
            None => false,
        }
    }

    pub fn save(&mut self) -> &ProfileRecord {
        if let Some(draft) = self.draft.take() {
            self.committed = draft;
            tracing::info!("profile saved");
        }
        &self.committed
    }

    pub fn cancel(&mut self) {
        if self.draft.take().is_some() {
            tracing::debug!("profile edit discarded");
        }
    }
}
