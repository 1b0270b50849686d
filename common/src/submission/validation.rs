use crate::model::form_data::{FieldErrors, FormData};
use crate::model::template::{FieldDefinition, FormTemplate};

fn is_filled(field: &FieldDefinition, data: &FormData) -> bool {
    data.get(&field.name).is_some_and(|value| !value.is_empty())
}

/// Checks every required field of `template` against `data`.
///
/// Returns one message per violated field. Optional fields are never
/// reported, whatever their value.
pub fn validate(template: &FormTemplate, data: &FormData) -> Result<(), FieldErrors> {
    let errors: FieldErrors = template
        .required_fields()
        .filter(|field| !is_filled(field, data))
        .map(|field| (field.name.clone(), format!("{} is required", field.label)))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Percentage of required fields holding a non-empty value, rounded down.
///
/// A template without required fields reports 0, not 100. Rounding down
/// means 100 is reached only once the last required field is filled.
pub fn progress(template: &FormTemplate, data: &FormData) -> u8 {
    let required = template.required_fields().count();
    if required == 0 {
        return 0;
    }
    let filled = template
        .required_fields()
        .filter(|field| is_filled(field, data))
        .count();
    (filled * 100 / required) as u8
}
