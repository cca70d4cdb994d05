use std::path::Path;

use reqnorm_model::{CanonicalField, RequirementRecord};

use crate::error::Result;
use crate::format::WriteOptions;
use crate::writer::write_records;

/// The sample row written under the template header.
pub fn sample_record() -> RequirementRecord {
    RequirementRecord::from_pairs([
        (CanonicalField::ParentId, "REQ-001"),
        (CanonicalField::RequirementId, "REQ-001-01"),
        (CanonicalField::Type, "Functional"),
        (CanonicalField::SubType, "Performance"),
        (CanonicalField::Title, "Sample Requirement Title"),
        (
            CanonicalField::Definition,
            "The system shall perform X within Y timeframe.",
        ),
        (CanonicalField::Notes, "Additional implementation notes"),
        (CanonicalField::Remarks, "Review comments"),
        (CanonicalField::Responsibility, "Engineering Team"),
        (CanonicalField::Applicability, "All subsystems"),
        (CanonicalField::Compliance, "C"),
        (CanonicalField::ComplianceNotes, "Fully compliant"),
        (CanonicalField::Verification, "Test"),
        (CanonicalField::VerificationNotes, "Verified by unit test"),
        (CanonicalField::ReferenceDocument, "REF-DOC-001"),
        (CanonicalField::OriginalIdentifier, "ESA-REQ-001"),
    ])
}

/// Writes the canonical header and one sample row to `path`.
pub fn write_template(path: &Path, options: &WriteOptions) -> Result<()> {
    write_records(path, &[sample_record()], options)
}
