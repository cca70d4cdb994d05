//! Applying a resolved mapping and the value normalizer to raw rows.

use std::path::Path;

use reqnorm_ingest::SheetData;
use reqnorm_model::{
    CanonicalField, ColumnMapping, ProcessingWarning, RequirementRecord, WarningKind,
};
use reqnorm_normalization::{
    ComplianceOutcome, NormalizationOptions, REPLACEMENT_CHAR, normalize_compliance_with,
    normalize_text_with,
};

/// Records built from one sheet, plus field-level warnings.
#[derive(Debug, Clone, Default)]
pub struct BuiltRecords {
    pub records: Vec<RequirementRecord>,
    pub warnings: Vec<ProcessingWarning>,
}

/// Builds one record per row, in row order.
///
/// Every field reads the cell of the label mapped to it; unmapped fields and
/// missing cells are empty. Compliance goes through the compliance
/// normalizer, everything else through the text normalizer.
pub fn build_records(
    document: &Path,
    sheet: &SheetData,
    mapping: &ColumnMapping,
    options: &NormalizationOptions,
) -> BuiltRecords {
    let sources = mapping.sources_by_field();
    let mut built = BuiltRecords::default();

    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_number = idx + 1;
        let record = RequirementRecord::from_fn(|field| {
            let Some(label) = sources.get(&field).copied() else {
                return String::new();
            };
            let raw = sheet.cell(row, label);
            if raw.contains(REPLACEMENT_CHAR) {
                built.warnings.push(
                    ProcessingWarning::new(
                        WarningKind::MalformedText,
                        document,
                        "cell contains undecodable bytes",
                    )
                    .at_cell(row_number, label, field),
                );
            }
            normalize_field(field, raw, options, |outcome_text| {
                built.warnings.push(
                    ProcessingWarning::new(
                        WarningKind::UnrecognizedCompliance,
                        document,
                        format!("compliance value '{outcome_text}' kept as written"),
                    )
                    .at_cell(row_number, label, field),
                );
            })
        });
        built.records.push(record);
    }
    built
}

fn normalize_field(
    field: CanonicalField,
    raw: &str,
    options: &NormalizationOptions,
    on_unrecognized: impl FnOnce(&str),
) -> String {
    if field.is_compliance() {
        match normalize_compliance_with(raw, &options.compliance) {
            ComplianceOutcome::Unrecognized(text) => {
                on_unrecognized(&text);
                if options.text.ascii_fold {
                    // Folding may strip a non-ASCII value entirely; keep it as written then.
                    let folded = normalize_text_with(&text, &options.text).text;
                    if !folded.is_empty() {
                        return folded;
                    }
                }
                text
            }
            recognized => recognized.into_text(),
        }
    } else {
        normalize_text_with(raw, &options.text).text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqnorm_ingest::RawRow;
    use reqnorm_model::ColumnTarget;

    fn sheet() -> SheetData {
        let mut sheet = SheetData::new("s", vec!["ID".into(), "Status".into(), "Extra".into()]);
        let row: RawRow = [
            ("ID".to_string(), " R-9 ".to_string()),
            ("Status".to_string(), "TBD".to_string()),
            ("Extra".to_string(), "ignored".to_string()),
        ]
        .into_iter()
        .collect();
        sheet.rows.push(row);
        sheet
    }

    #[test]
    fn unrecognized_compliance_is_kept_and_reported() {
        let mut mapping = ColumnMapping::new();
        mapping
            .insert("ID", ColumnTarget::Field(CanonicalField::RequirementId))
            .unwrap();
        mapping
            .insert("Status", ColumnTarget::Field(CanonicalField::Compliance))
            .unwrap();
        mapping.insert("Extra", ColumnTarget::Skip).unwrap();

        let built = build_records(
            Path::new("doc.csv"),
            &sheet(),
            &mapping,
            &NormalizationOptions::default(),
        );
        let record = &built.records[0];
        assert_eq!(record.get(CanonicalField::RequirementId), "R-9");
        assert_eq!(record.get(CanonicalField::Compliance), "TBD");
        assert_eq!(built.warnings.len(), 1);
        assert_eq!(built.warnings[0].row, Some(1));
        assert_eq!(built.warnings[0].column.as_deref(), Some("Status"));
    }

    #[test]
    fn folding_never_empties_an_unrecognized_compliance_value() {
        let mut mapping = ColumnMapping::new();
        mapping
            .insert("Status", ColumnTarget::Field(CanonicalField::Compliance))
            .unwrap();
        let mut sheet = SheetData::new("s", vec!["Status".into()]);
        sheet
            .rows
            .push([("Status".to_string(), "未定".to_string())].into_iter().collect());
        let mut options = NormalizationOptions::default();
        options.text.ascii_fold = true;

        let built = build_records(Path::new("doc.csv"), &sheet, &mapping, &options);
        assert_eq!(built.records[0].get(CanonicalField::Compliance), "未定");
        assert_eq!(built.warnings.len(), 1);
        assert_eq!(built.warnings[0].kind, WarningKind::UnrecognizedCompliance);
        assert!(built.warnings[0].message.contains("未定"));
    }
}
