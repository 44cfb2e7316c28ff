use std::cmp::Ordering;

use super::super::domain::{
    Agreement, Application, NewCompany, PartneredCompany, CONTACT_PLACEHOLDER,
};
use super::super::error::InternshipError;

/// Directory names match case-insensitively; punctuation and spacing must agree exactly.
pub fn names_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

pub fn find_by_name<'a>(
    directory: &'a [PartneredCompany],
    name: Option<&str>,
) -> Option<&'a PartneredCompany> {
    let name = name.filter(|name| !name.trim().is_empty())?;
    directory
        .iter()
        .find(|company| names_match(&company.name, name))
}

/// Directory ordering: by lowercased name, ties broken by the raw name.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// Insert keeping the directory sorted by name.
pub fn insert_sorted(directory: &mut Vec<PartneredCompany>, company: PartneredCompany) {
    let index = directory
        .partition_point(|existing| compare_names(&existing.name, &company.name).is_lt());
    directory.insert(index, company);
}

/// Build the quick-register entry for an application that matched nothing.
pub fn registration_from(
    application: &Application,
    agreement: Option<&Agreement>,
) -> Result<NewCompany, InternshipError> {
    let name = application
        .company_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            InternshipError::validation("the application does not name a company to register")
        })?;

    let contact = |value: Option<&String>| {
        value
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| CONTACT_PLACEHOLDER.to_string())
    };

    Ok(NewCompany {
        name: name.to_string(),
        email: contact(agreement.and_then(|agreement| agreement.supervisor_email.as_ref())),
        phone: contact(agreement.and_then(|agreement| agreement.supervisor_phone.as_ref())),
        address: contact(agreement.and_then(|agreement| agreement.company_address.as_ref())),
        supervisors: Vec::new(),
    })
}
