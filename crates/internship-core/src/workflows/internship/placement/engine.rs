use serde::Serialize;

use super::super::domain::{
    Agreement, Application, CompanyId, PartneredCompany, PlacementFields, SupervisorContact,
    CONTACT_PLACEHOLDER, NOT_AVAILABLE,
};
use super::directory::find_by_name;

/// Everything reconciliation reads, loaded up front so the merge stays pure.
#[derive(Debug, Clone, Copy)]
pub struct PlacementSources<'a> {
    pub application: &'a Application,
    pub agreement: Option<&'a Agreement>,
    pub directory: &'a [PartneredCompany],
}

/// Where the proposed placement fields came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementSource {
    /// The application's company name matched a directory entry.
    SmartLink { company_id: CompanyId },
    /// An admin picked the directory entry explicitly.
    Override { company_id: CompanyId },
    /// No directory entry; raw application and agreement values.
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementProposal {
    #[serde(flatten)]
    pub fields: PlacementFields,
    pub needs_registration: bool,
    pub source: PlacementSource,
}

/// Merge application, agreement, and directory data into one placement proposal.
pub fn reconcile(sources: PlacementSources<'_>) -> PlacementProposal {
    match find_by_name(sources.directory, sources.application.company_name.as_deref()) {
        Some(company) => {
            let fields = linked_fields(company, sources.application, sources.agreement);
            PlacementProposal {
                fields,
                needs_registration: false,
                source: PlacementSource::SmartLink {
                    company_id: company.id.clone(),
                },
            }
        }
        None => PlacementProposal {
            fields: unmatched_fields(sources.application, sources.agreement),
            needs_registration: true,
            source: PlacementSource::Unmatched,
        },
    }
}

/// Recompute the linked fields against a company the admin chose directly.
pub fn apply_company(
    company: &PartneredCompany,
    application: &Application,
    agreement: Option<&Agreement>,
) -> PlacementProposal {
    PlacementProposal {
        fields: linked_fields(company, application, agreement),
        needs_registration: false,
        source: PlacementSource::Override {
            company_id: company.id.clone(),
        },
    }
}

fn linked_fields(
    company: &PartneredCompany,
    application: &Application,
    agreement: Option<&Agreement>,
) -> PlacementFields {
    let representative = company.supervisors.first();
    let company_email = known_contact(&company.email);
    let company_phone = known_contact(&company.phone);

    PlacementFields {
        assigned_company: company.name.clone(),
        assigned_position: first_present([application.position.as_deref()]),
        site_supervisor_name: first_present([
            representative.map(|rep| rep.name.as_str()),
            agreement.and_then(|agreement| agreement.supervisor_name.as_deref()),
        ]),
        site_supervisor_email: first_present([
            representative.map(|rep| rep.email.as_str()),
            company_email,
            agreement.and_then(|agreement| agreement.supervisor_email.as_deref()),
        ]),
        site_supervisor_phone: first_present([
            company_phone,
            agreement.and_then(|agreement| agreement.supervisor_phone.as_deref()),
        ]),
    }
}

fn unmatched_fields(application: &Application, agreement: Option<&Agreement>) -> PlacementFields {
    let declared: Option<&SupervisorContact> = application.self_found_supervisor.as_ref();

    PlacementFields {
        assigned_company: first_present([application.company_name.as_deref()]),
        assigned_position: first_present([application.position.as_deref()]),
        site_supervisor_name: first_present([
            agreement.and_then(|agreement| agreement.supervisor_name.as_deref()),
            declared.and_then(|contact| contact.name.as_deref()),
        ]),
        site_supervisor_email: first_present([
            agreement.and_then(|agreement| agreement.supervisor_email.as_deref()),
            declared.and_then(|contact| contact.email.as_deref()),
        ]),
        site_supervisor_phone: first_present([
            agreement.and_then(|agreement| agreement.supervisor_phone.as_deref()),
            declared.and_then(|contact| contact.phone.as_deref()),
        ]),
    }
}

fn known_contact(value: &str) -> Option<&str> {
    (value.trim() != CONTACT_PLACEHOLDER).then_some(value)
}

/// First non-blank candidate, verbatim, or `N/A`.
fn first_present<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}
