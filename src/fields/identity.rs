//! Field ids of the citizen identity card personal data group (DG13).

use {
    num_enum::{IntoPrimitive, TryFromPrimitive},
    std::fmt::{self, Display, Formatter},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum IdentityField {
    DocumentNumber = 1,
    FullName = 2,
    DateOfBirth = 3,
    Sex = 4,
    Nationality = 5,
    Ethnicity = 6,
    Religion = 7,
    PlaceOfOrigin = 8,
    PlaceOfResidence = 9,
    IdentifyingMarks = 10,
    DateOfIssue = 11,
    DateOfExpiry = 12,
    /// Father's then mother's full name.
    ParentNames = 13,
    SpouseName = 14,
    PreviousDocumentNumber = 15,
    CardIdentifier = 16,
}

impl IdentityField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DocumentNumber => "document_number",
            Self::FullName => "full_name",
            Self::DateOfBirth => "date_of_birth",
            Self::Sex => "sex",
            Self::Nationality => "nationality",
            Self::Ethnicity => "ethnicity",
            Self::Religion => "religion",
            Self::PlaceOfOrigin => "place_of_origin",
            Self::PlaceOfResidence => "place_of_residence",
            Self::IdentifyingMarks => "identifying_marks",
            Self::DateOfIssue => "date_of_issue",
            Self::DateOfExpiry => "date_of_expiry",
            Self::ParentNames => "parent_names",
            Self::SpouseName => "spouse_name",
            Self::PreviousDocumentNumber => "previous_document_number",
            Self::CardIdentifier => "card_identifier",
        }
    }

    /// Label for a raw field id, falling back to the number itself.
    pub fn label(id: i32) -> String {
        Self::try_from(id).map_or_else(|_| id.to_string(), |field| field.as_str().to_owned())
    }
}

impl Display for IdentityField {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
